pub mod app;
pub mod check_area;
pub mod controls_panel;
pub mod glossary_modal;
pub mod intro_overlay;
pub mod page_view;
pub mod progress_header;
pub mod results_overlay;

pub use app::App;
