//! Browser bindings for the lesson core.

pub mod audio;
pub mod paint;
pub mod storage;
pub mod timers;

pub use audio::WebAudio;
pub use timers::WebScheduler;

use crate::session::LessonSession;

pub type WebSession = LessonSession<WebAudio, WebScheduler>;
