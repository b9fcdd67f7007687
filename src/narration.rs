//! Narration sequencing over a single audio output.
//!
//! Every [`Narrator::play`] call hands over a continuation `K`. The
//! continuation comes back out of the narrator exactly once: from
//! [`Narrator::finish`] when the platform reports the clip's ticket, or
//! from [`Narrator::take_ready`] when there was nothing to play. A later
//! `play` supersedes the in-flight clip and drops its continuation
//! unfired. Completion reports carry the [`Ticket`] issued at start, so a
//! late `ended`/`error` from an abandoned clip is recognised and ignored.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::error::PlaybackError;
use crate::model::AudioId;

/// Identifies one started clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipOutcome {
    Ended,
    Failed(PlaybackError),
}

/// The single shared playback resource.
pub trait AudioOutput {
    /// Loads and starts `clip`. Completion must later be reported to
    /// [`Narrator::finish`] with the same ticket.
    fn start(&mut self, ticket: Ticket, clip: &AudioId);
    /// Pauses and rewinds. With `detach`, completion handlers are removed.
    fn halt(&mut self, detach: bool);
}

struct InFlight<K> {
    ticket: Ticket,
    clip: AudioId,
    then: K,
}

pub struct Narrator<O, K> {
    output: O,
    muted: bool,
    current: Option<InFlight<K>>,
    ready: VecDeque<K>,
    next_ticket: u64,
    last_clip: Option<AudioId>,
}

impl<O: AudioOutput, K> Narrator<O, K> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            muted: false,
            current: None,
            ready: VecDeque::new(),
            next_ticket: 1,
            last_clip: None,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    /// Plays `clip`, or completes immediately when there is no clip or
    /// narration is muted. Returns the ticket of a started clip.
    pub fn play(&mut self, clip: Option<&AudioId>, then: K) -> Option<Ticket> {
        if let Some(old) = self.current.take() {
            debug!("narration {} superseded", old.clip);
            self.output.halt(true);
        }
        let Some(clip) = clip else {
            self.ready.push_back(then);
            return None;
        };
        self.last_clip = Some(clip.clone());
        if self.muted {
            self.ready.push_back(then);
            return None;
        }
        Some(self.launch(clip.clone(), then))
    }

    fn launch(&mut self, clip: AudioId, then: K) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        debug!("narration {clip} started ({ticket:?})");
        self.output.start(ticket, &clip);
        self.current = Some(InFlight { ticket, clip, then });
        ticket
    }

    /// Platform report for a started clip. Returns the continuation when
    /// `ticket` is the in-flight clip; any other report is stale.
    pub fn finish(&mut self, ticket: Ticket, outcome: ClipOutcome) -> Option<K> {
        match &self.current {
            Some(f) if f.ticket == ticket => {}
            _ => {
                debug!("ignoring stale completion for {ticket:?}");
                return None;
            }
        }
        let done = self.current.take()?;
        match outcome {
            ClipOutcome::Ended => debug!("narration {} ended", done.clip),
            ClipOutcome::Failed(PlaybackError::AutoplayBlocked) => {
                warn!("narration {} blocked by autoplay policy", done.clip)
            }
            ClipOutcome::Failed(e) => warn!("narration {} failed: {e}", done.clip),
        }
        Some(done.then)
    }

    /// Next continuation that completed without playing.
    pub fn take_ready(&mut self) -> Option<K> {
        self.ready.pop_front()
    }

    /// Pauses the output. With `clear_pending`, every continuation still
    /// held is dropped unfired and there is nothing left to replay;
    /// otherwise the in-flight one stays pending until a
    /// [`replay`](Self::replay) finishes it.
    pub fn stop(&mut self, clear_pending: bool) {
        self.output.halt(clear_pending);
        if clear_pending {
            self.current = None;
            self.ready.clear();
            self.last_clip = None;
        }
    }

    /// Muting silences the in-flight clip and completes its request so the
    /// lesson keeps moving.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            if let Some(f) = self.current.take() {
                self.output.halt(true);
                self.ready.push_back(f.then);
            }
        }
    }

    /// Restarts the current clip under its own ticket, or plays the last
    /// clip again with `otherwise` as its continuation.
    pub fn replay(&mut self, otherwise: K) -> Option<Ticket> {
        if self.muted {
            return None;
        }
        if let Some(f) = &self.current {
            let (ticket, clip) = (f.ticket, f.clip.clone());
            self.output.halt(false);
            self.output.start(ticket, &clip);
            return Some(ticket);
        }
        let clip = self.last_clip.clone()?;
        Some(self.launch(clip, otherwise))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Output that records what it was asked to do.
    #[derive(Default)]
    pub struct RecordingOutput {
        pub started: Vec<(Ticket, String)>,
        pub halts: usize,
    }

    impl AudioOutput for RecordingOutput {
        fn start(&mut self, ticket: Ticket, clip: &AudioId) {
            self.started.push((ticket, clip.to_string()));
        }

        fn halt(&mut self, _detach: bool) {
            self.halts += 1;
        }
    }

    fn clip(id: &str) -> AudioId {
        AudioId::new(id)
    }

    #[test]
    fn superseded_clip_never_completes() {
        let mut n = Narrator::new(RecordingOutput::default());
        let t1 = n.play(Some(&clip("clip")), "cb").unwrap();
        let t2 = n.play(Some(&clip("other")), "cb2").unwrap();
        assert_eq!(n.finish(t1, ClipOutcome::Ended), None);
        assert_eq!(n.finish(t2, ClipOutcome::Ended), Some("cb2"));
        assert_eq!(n.finish(t2, ClipOutcome::Ended), None);
        assert_eq!(n.take_ready(), None);
    }

    #[test]
    fn error_and_rejection_fire_once() {
        let mut n = Narrator::new(RecordingOutput::default());
        let t = n.play(Some(&clip("broken")), 7).unwrap();
        let media = ClipOutcome::Failed(PlaybackError::Media("decode".into()));
        assert_eq!(n.finish(t, media), Some(7));
        assert_eq!(n.finish(t, ClipOutcome::Failed(PlaybackError::AutoplayBlocked)), None);
    }

    #[test]
    fn missing_clip_completes_without_output() {
        let mut n = Narrator::new(RecordingOutput::default());
        assert_eq!(n.play(None, 1), None);
        assert!(n.output().started.is_empty());
        assert_eq!(n.take_ready(), Some(1));
        assert_eq!(n.take_ready(), None);
    }

    #[test]
    fn muting_completes_in_flight_and_later_clips() {
        let mut n = Narrator::new(RecordingOutput::default());
        n.play(Some(&clip("a")), 1);
        n.set_muted(true);
        assert!(!n.is_playing());
        assert_eq!(n.take_ready(), Some(1));
        assert_eq!(n.play(Some(&clip("b")), 2), None);
        assert_eq!(n.take_ready(), Some(2));
        assert_eq!(n.output().started.len(), 1);
    }

    #[test]
    fn stop_with_clear_drops_everything() {
        let mut n = Narrator::new(RecordingOutput::default());
        let t = n.play(Some(&clip("a")), 1).unwrap();
        n.play(None, 2);
        let t2 = n.play(Some(&clip("c")), 3).unwrap();
        n.stop(true);
        assert_eq!(n.finish(t, ClipOutcome::Ended), None);
        assert_eq!(n.finish(t2, ClipOutcome::Ended), None);
        assert_eq!(n.take_ready(), None);
        assert_eq!(n.replay(4), None);
    }

    #[test]
    fn paused_clip_resumes_under_same_ticket() {
        let mut n = Narrator::new(RecordingOutput::default());
        let t = n.play(Some(&clip("a")), 1).unwrap();
        n.stop(false);
        assert_eq!(n.replay(9), Some(t));
        assert_eq!(n.finish(t, ClipOutcome::Ended), Some(1));
        let again = n.replay(9).unwrap();
        assert_ne!(again, t);
        assert_eq!(n.output().started.last().map(|s| s.1.as_str()), Some("a"));
        assert_eq!(n.finish(again, ClipOutcome::Ended), Some(9));
    }
}
