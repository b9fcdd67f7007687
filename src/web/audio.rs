use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{DomException, HtmlAudioElement};

use crate::error::PlaybackError;
use crate::model::AudioId;
use crate::narration::{AudioOutput, ClipOutcome, Ticket};

/// Receives clip completions. Always invoked from a fresh task, never from
/// inside the element's own handler.
pub type ClipSink = Rc<dyn Fn(Ticket, ClipOutcome)>;

pub fn clip_url(clip: &AudioId) -> String {
    format!("voice/{}.mp3", clip.as_str())
}

/// Narration output backed by one reusable `<audio>` element.
pub struct WebAudio {
    element: Option<HtmlAudioElement>,
    sink: ClipSink,
    on_ended: Option<Closure<dyn FnMut()>>,
    on_error: Option<Closure<dyn FnMut()>>,
}

impl WebAudio {
    pub fn new(sink: ClipSink) -> Self {
        let element = match HtmlAudioElement::new() {
            Ok(el) => Some(el),
            Err(e) => {
                warn!("audio element unavailable, narration disabled: {e:?}");
                None
            }
        };
        Self { element, sink, on_ended: None, on_error: None }
    }

    fn report(sink: &ClipSink, ticket: Ticket, outcome: ClipOutcome) {
        let sink = Rc::clone(sink);
        spawn_local(async move { sink(ticket, outcome) });
    }

    fn detach(&mut self) {
        if let Some(el) = &self.element {
            el.set_onended(None);
            el.set_onerror(None);
        }
        self.on_ended = None;
        self.on_error = None;
    }
}

/// Maps a rejected `play()` promise. `None` means the request was
/// interrupted by a pause or a new source and needs no report.
fn rejection(err: JsValue) -> Option<PlaybackError> {
    match err.dyn_into::<DomException>() {
        Ok(ex) if ex.name() == "AbortError" => None,
        Ok(ex) if ex.name() == "NotAllowedError" => Some(PlaybackError::AutoplayBlocked),
        Ok(ex) => Some(PlaybackError::Media(format!("{}: {}", ex.name(), ex.message()))),
        Err(other) => Some(PlaybackError::Media(format!("{other:?}"))),
    }
}

impl AudioOutput for WebAudio {
    fn start(&mut self, ticket: Ticket, clip: &AudioId) {
        let Some(el) = self.element.clone() else {
            Self::report(&self.sink, ticket, ClipOutcome::Failed(PlaybackError::Media("no audio element".into())));
            return;
        };
        self.detach();
        let url = clip_url(clip);
        debug!("loading {url}");
        el.set_src(&url);

        let on_ended = {
            let sink = Rc::clone(&self.sink);
            Closure::wrap(Box::new(move || Self::report(&sink, ticket, ClipOutcome::Ended)) as Box<dyn FnMut()>)
        };
        let on_error = {
            let sink = Rc::clone(&self.sink);
            let el = el.clone();
            Closure::wrap(Box::new(move || {
                let reason = el
                    .error()
                    .map(|e| format!("media error code {}", e.code()))
                    .unwrap_or_else(|| "media error".into());
                Self::report(&sink, ticket, ClipOutcome::Failed(PlaybackError::Media(reason)));
            }) as Box<dyn FnMut()>)
        };
        el.set_onended(Some(on_ended.as_ref().unchecked_ref()));
        el.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        self.on_ended = Some(on_ended);
        self.on_error = Some(on_error);

        match el.play() {
            Ok(promise) => {
                let sink = Rc::clone(&self.sink);
                spawn_local(async move {
                    if let Err(err) = JsFuture::from(promise).await {
                        if let Some(e) = rejection(err) {
                            sink(ticket, ClipOutcome::Failed(e));
                        }
                    }
                });
            }
            Err(err) => {
                let e = rejection(err).unwrap_or_else(|| PlaybackError::Media("play() failed".into()));
                Self::report(&self.sink, ticket, ClipOutcome::Failed(e));
            }
        }
    }

    fn halt(&mut self, detach: bool) {
        if let Some(el) = &self.element {
            let _ = el.pause();
            el.set_current_time(0.0);
        }
        if detach {
            self.detach();
        }
    }
}

impl Drop for WebAudio {
    fn drop(&mut self) {
        self.halt(true);
    }
}
