mod components;
mod content;
mod error;
mod geometry;
mod model;
mod narration;
mod render;
mod resolver;
mod scoring;
mod session;
mod settings;
mod state;
mod util;
mod web;

use components::App;

fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("meet-the-clock starting");
    yew::Renderer::<App>::new().render();
}
