pub mod slots;
pub mod visual;

pub use slots::{SlotEntry, pick_missing};
pub use visual::{ClickFeedback, ClockVisualState};
