use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;

use crate::session::{Alarm, Scheduler};

pub type AlarmSink = Rc<dyn Fn(Alarm)>;

/// `setTimeout`-backed scheduler. Dropping the returned [`Timeout`]
/// clears the browser timer.
pub struct WebScheduler {
    sink: AlarmSink,
}

impl WebScheduler {
    pub fn new(sink: AlarmSink) -> Self {
        Self { sink }
    }
}

impl Scheduler for WebScheduler {
    type Handle = Timeout;

    fn after(&mut self, delay_ms: u32, alarm: Alarm) -> Timeout {
        let sink = Rc::clone(&self.sink);
        // The session drops this handle while handling the alarm, so the
        // delivery runs outside the timer's own callback.
        Timeout::new(delay_ms, move || spawn_local(async move { sink(alarm) }))
    }
}
