//! Per-page lesson session: the step state machine.
//!
//! A [`LessonSession`] owns everything mutable about one page visit: the
//! step cursor, the armed check, the clock's visual state, the narrator and
//! the pending timers. Platform callbacks come back in through
//! [`LessonSession::on_clip_finished`] and [`LessonSession::on_alarm`];
//! operations that can leave the page return a [`Move`] for the caller to
//! act on.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::LessonError;
use crate::geometry::Point;
use crate::model::{
    Answer, AudioId, Choice, ClockConfig, Direction, ElementRef, Highlight, InteractionKind, LessonPage,
    LessonStep, PageId, PageMode, Target,
};
use crate::narration::{AudioOutput, ClipOutcome, Narrator, Ticket};
use crate::render::{self, ClockLayout, RenderPlan};
use crate::resolver;
use crate::scoring::{AssessmentScorer, ScoreReport};
use crate::settings::Timing;
use crate::state::{ClickFeedback, ClockVisualState, SlotEntry, pick_missing};

/// Timer primitive. Dropping a handle cancels its timer.
pub trait Scheduler {
    type Handle;
    fn after(&mut self, delay_ms: u32, alarm: Alarm) -> Self::Handle;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlarmKind {
    Rearm,
    NextCheck,
    Unlock,
    AutoAdvance,
    ClearFeedback,
    Blink,
    Sweep,
}

/// A scheduled wake-up, stamped with the step instance that asked for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alarm {
    epoch: u64,
    pub kind: AlarmKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CueKind {
    Opening,
    Beat(usize),
    Idle,
}

/// Narration continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cue {
    epoch: u64,
    kind: CueKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    /// Page intro still showing; no step loaded yet.
    Waiting,
    Presenting,
    Checking,
    Correct,
    Incorrect,
    /// Assessment answer stored, waiting to move on.
    Recorded,
    Done,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveInteraction {
    pub target: Target,
    pub expected: Answer,
    pub check_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub is_correct: bool,
}

/// Where the learner ended up after a navigation operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Step(usize),
    Page(PageId),
    /// Assessment finished; the score report is ready.
    Completed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Caption {
    pub title: String,
    pub instruction: String,
    pub counter: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackLine {
    pub text: String,
    pub correct: bool,
}

/// Render-ready snapshot for the UI layer.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionView {
    pub page: PageId,
    pub step_index: usize,
    pub step_count: usize,
    pub kind: InteractionKind,
    pub phase: StepPhase,
    pub caption: Option<Caption>,
    pub beat_text: Option<String>,
    pub prompt: Option<String>,
    pub feedback: Option<FeedbackLine>,
    pub hint: Option<String>,
    pub choices: Vec<Choice>,
    /// Arrow checks are answered on the canvas instead of with buttons.
    pub canvas_arrows: bool,
    pub input_enabled: bool,
    pub can_advance: bool,
    pub slots: Vec<(u8, Option<u8>)>,
    pub selected_slot: Option<u8>,
    pub new_terms: Vec<String>,
    pub muted: bool,
    pub attempts: u32,
    /// Current part and part count of a multi-part check group.
    pub part: Option<(usize, usize)>,
    pub report: Option<ScoreReport>,
}

pub struct LessonSession<O: AudioOutput, S: Scheduler> {
    page: Rc<LessonPage>,
    step_index: usize,
    completed: BTreeSet<String>,
    active: Option<ActiveInteraction>,
    input_enabled: bool,
    attempts: u32,
    check_index: usize,
    phase: StepPhase,
    unlocked: bool,
    visual: ClockVisualState,
    /// The step's clock with its blanks settled for this visit.
    clock: ClockConfig,
    slots: SlotEntry,
    caption: Option<Caption>,
    beat_text: Option<String>,
    prompt: Option<String>,
    feedback: Option<FeedbackLine>,
    hint: Option<String>,
    scorer: Option<AssessmentScorer>,
    report: Option<ScoreReport>,
    narrator: Narrator<O, Cue>,
    scheduler: S,
    timers: BTreeMap<AlarmKind, S::Handle>,
    epoch: u64,
    timing: Timing,
    layout: ClockLayout,
    rng: StdRng,
}

impl<O: AudioOutput, S: Scheduler> LessonSession<O, S> {
    pub fn new(page: Rc<LessonPage>, output: O, scheduler: S, timing: Timing) -> Self {
        let scorer = match page.mode {
            PageMode::Assessment { pass_threshold, .. } => Some(AssessmentScorer::new(pass_threshold)),
            PageMode::Practice => None,
        };
        let clock = page.steps.first().map(|s| s.clock.clone()).unwrap_or_default();
        let slots = SlotEntry::new(&clock.blank_numbers);
        Self {
            page,
            step_index: 0,
            completed: BTreeSet::new(),
            active: None,
            input_enabled: false,
            attempts: 0,
            check_index: 0,
            phase: StepPhase::Waiting,
            unlocked: false,
            visual: ClockVisualState::default(),
            clock,
            slots,
            caption: None,
            beat_text: None,
            prompt: None,
            feedback: None,
            hint: None,
            scorer,
            report: None,
            narrator: Narrator::new(output),
            scheduler,
            timers: BTreeMap::new(),
            epoch: 0,
            timing,
            layout: ClockLayout::fit(400.0, 400.0),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn page(&self) -> &LessonPage {
        &self.page
    }

    pub fn step(&self) -> &LessonStep {
        &self.page.steps[self.step_index]
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn active(&self) -> Option<&ActiveInteraction> {
        self.active.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn check_index(&self) -> usize {
        self.check_index
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn visual(&self) -> &ClockVisualState {
        &self.visual
    }

    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed.contains(step_id)
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Assessment score so far: questions whose latest answer is right.
    pub fn score(&self) -> usize {
        self.scorer.as_ref().map_or(0, AssessmentScorer::score)
    }

    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn narrator_output(&self) -> &O {
        self.narrator.output()
    }

    pub fn set_layout(&mut self, layout: ClockLayout) {
        self.layout = layout;
    }

    pub fn can_advance(&self) -> bool {
        self.page.is_assessment() || self.unlocked
    }

    fn is_assessment(&self) -> bool {
        self.scorer.is_some()
    }

    // ---- step lifecycle ----

    /// Narrates the page intro while its overlay is showing. Loading the
    /// first step cuts it off.
    pub fn play_intro(&mut self) {
        let page = Rc::clone(&self.page);
        self.narrate(page.intro.audio.as_ref(), CueKind::Idle);
        self.pump();
    }

    pub fn load_step(&mut self, index: usize) -> Result<(), LessonError> {
        let len = self.page.steps.len();
        if index >= len {
            return Err(LessonError::OutOfRange { index, len });
        }
        self.narrator.stop(true);
        self.timers.clear();
        self.epoch += 1;

        self.step_index = index;
        self.visual.reset();
        self.active = None;
        self.input_enabled = false;
        self.attempts = 0;
        self.check_index = 0;
        self.caption = None;
        self.beat_text = None;
        self.prompt = None;
        self.feedback = None;
        self.hint = None;
        self.phase = StepPhase::Presenting;

        let page = Rc::clone(&self.page);
        let step = &page.steps[index];
        self.clock = step.clock.clone();
        if let Some(missing) = &step.clock.missing {
            self.clock.blank_numbers = pick_missing(missing, &mut self.rng);
            debug!("{}: hiding {:?}", step.id, self.clock.blank_numbers);
        }
        self.slots = SlotEntry::new(&self.clock.blank_numbers);
        self.unlocked = self.completed.contains(&step.id);
        info!("{:?}: loading step {} ({}) of {len}", page.id, index + 1, step.id);

        self.set_motion(step.clock.motion);
        self.apply_highlight(step.highlight.as_ref());
        self.narrate(step.narration.as_ref(), CueKind::Opening);
        self.pump();
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Move, LessonError> {
        if !self.can_advance() {
            return Err(LessonError::StepIncomplete { step: self.step().id.clone() });
        }
        self.step_forward()
    }

    /// Like [`advance`](Self::advance) without the completion gate.
    pub fn skip(&mut self) -> Result<Move, LessonError> {
        self.step_forward()
    }

    pub fn retreat(&mut self) -> Result<Move, LessonError> {
        match self.step_index.checked_sub(1) {
            Some(prev) => {
                self.load_step(prev)?;
                Ok(Move::Step(prev))
            }
            _ => {
                self.leave();
                Ok(Move::Page(self.page.id.prev()))
            }
        }
    }

    pub fn retry(&mut self) -> Result<Move, LessonError> {
        self.load_step(self.step_index)?;
        Ok(Move::Step(self.step_index))
    }

    /// Starts the page over, dropping recorded assessment answers.
    pub fn restart(&mut self) -> Result<Move, LessonError> {
        if let Some(scorer) = self.scorer.as_mut() {
            scorer.clear();
        }
        self.report = None;
        self.completed.clear();
        self.load_step(0)?;
        Ok(Move::Step(0))
    }

    /// Silences narration and invalidates every pending timer.
    pub fn leave(&mut self) {
        self.narrator.stop(true);
        self.timers.clear();
        self.epoch += 1;
        self.active = None;
        self.input_enabled = false;
        self.visual.clear_hover();
    }

    fn step_forward(&mut self) -> Result<Move, LessonError> {
        let next = self.step_index + 1;
        if next < self.page.steps.len() {
            self.load_step(next)?;
            return Ok(Move::Step(next));
        }
        self.leave();
        if self.is_assessment() {
            self.finish_assessment();
            return Ok(Move::Completed);
        }
        Ok(Move::Page(self.page.id.next()))
    }

    fn finish_assessment(&mut self) {
        let Some(scorer) = self.scorer.as_ref() else {
            return;
        };
        let report = scorer.finalize(&self.page.steps);
        let clip = match &self.page.mode {
            PageMode::Assessment { pass_audio, review_audio, .. } => {
                if report.passed { pass_audio.clone() } else { review_audio.clone() }
            }
            PageMode::Practice => None,
        };
        self.report = Some(report);
        self.phase = StepPhase::Done;
        self.narrate(clip.as_ref(), CueKind::Idle);
        self.pump();
    }

    // ---- setup sequence ----

    fn narrate(&mut self, clip: Option<&AudioId>, kind: CueKind) {
        let cue = Cue { epoch: self.epoch, kind };
        self.narrator.play(clip, cue);
    }

    /// Runs continuations that completed without audio.
    fn pump(&mut self) {
        while let Some(cue) = self.narrator.take_ready() {
            self.on_cue(cue);
        }
    }

    fn on_cue(&mut self, cue: Cue) {
        if cue.epoch != self.epoch {
            debug!("dropping narration cue from an earlier step");
            return;
        }
        match cue.kind {
            CueKind::Opening => {
                self.reveal_caption();
                self.start_beat(0);
            }
            CueKind::Beat(i) => self.start_beat(i + 1),
            CueKind::Idle => {}
        }
    }

    fn reveal_caption(&mut self) {
        let page = Rc::clone(&self.page);
        let step = &page.steps[self.step_index];
        self.caption = Some(Caption {
            title: step.title.clone(),
            instruction: step.instruction.clone(),
            counter: format!("Step {} of {}", self.step_index + 1, self.page.steps.len()),
        });
    }

    fn start_beat(&mut self, i: usize) {
        let page = Rc::clone(&self.page);
        let step = &page.steps[self.step_index];
        match step.beats.get(i) {
            Some(beat) => {
                self.beat_text = Some(beat.text.clone());
                if beat.highlight.is_some() {
                    self.clear_callouts();
                    self.apply_highlight(beat.highlight.as_ref());
                }
                let motion = if beat.animate {
                    Some(step.clock.motion.unwrap_or(Direction::Clockwise))
                } else {
                    step.clock.motion
                };
                self.set_motion(motion);
                self.narrate(beat.audio.as_ref(), CueKind::Beat(i));
            }
            None => {
                self.clear_callouts();
                self.set_motion(step.clock.motion);
                self.begin_checks();
            }
        }
    }

    fn set_motion(&mut self, motion: Option<Direction>) {
        if motion.is_none() {
            self.visual.animation_offset = 0.0;
        }
        self.visual.motion = motion;
    }

    fn apply_highlight(&mut self, highlight: Option<&Highlight>) {
        match highlight {
            None => {}
            Some(Highlight::Sweep) => {
                self.visual.sweep = Some(1);
                self.schedule(AlarmKind::Sweep, self.timing.sweep_ms);
            }
            Some(other) => {
                self.visual.start_blink(other.clone());
                self.schedule(AlarmKind::Blink, self.timing.blink_ms);
            }
        }
    }

    fn clear_callouts(&mut self) {
        self.visual.blinking = None;
        self.visual.blink_visible = false;
        self.visual.sweep = None;
        self.timers.remove(&AlarmKind::Blink);
        self.timers.remove(&AlarmKind::Sweep);
    }

    fn begin_checks(&mut self) {
        if self.step().checks.is_empty() {
            self.phase = StepPhase::Done;
            self.unlocked = true;
            self.mark_completed();
            return;
        }
        self.set_active(0);
        self.arm();
    }

    fn set_active(&mut self, check_index: usize) {
        let mut expected = self.step().checks[check_index].expected.clone();
        if let (Answer::Slots(_), Some(_)) = (&expected, &self.clock.missing) {
            expected = Answer::Slots(self.clock.blank_numbers.iter().map(|&n| (n, n)).collect());
        }
        self.check_index = check_index;
        self.active = Some(ActiveInteraction {
            target: Target::for_answer(&expected),
            expected,
            check_index,
        });
    }

    /// Opens the current check for input and plays its prompt.
    fn arm(&mut self) {
        let page = Rc::clone(&self.page);
        let check = &page.steps[self.step_index].checks[self.check_index];
        self.input_enabled = true;
        self.phase = StepPhase::Checking;
        self.prompt = Some(check.prompt.clone());
        self.narrate(check.audio.as_ref(), CueKind::Idle);
    }

    fn mark_completed(&mut self) {
        let id = self.step().id.clone();
        if self.completed.insert(id.clone()) {
            info!("{:?}: step {id} completed", self.page.id);
        }
    }

    // ---- timers ----

    fn schedule(&mut self, kind: AlarmKind, delay_ms: u32) {
        let handle = self.scheduler.after(delay_ms, Alarm { epoch: self.epoch, kind });
        // Replacing an entry drops, and so cancels, the previous timer.
        self.timers.insert(kind, handle);
    }

    /// Timer callback. Alarms from a previous step instance are ignored.
    pub fn on_alarm(&mut self, alarm: Alarm) -> Option<Move> {
        if alarm.epoch != self.epoch {
            debug!("ignoring stale {:?} alarm", alarm.kind);
            return None;
        }
        self.timers.remove(&alarm.kind);
        let mut outcome = None;
        match alarm.kind {
            AlarmKind::Blink => {
                self.visual.toggle_blink();
                if self.visual.blinking.is_some() {
                    self.schedule(AlarmKind::Blink, self.timing.blink_ms);
                }
            }
            AlarmKind::Sweep => {
                if self.visual.step_sweep() {
                    self.schedule(AlarmKind::Sweep, self.timing.sweep_ms);
                }
            }
            AlarmKind::Rearm => {
                self.visual.click_feedback = None;
                self.feedback = None;
                if self.active.is_some() {
                    self.input_enabled = true;
                    self.phase = StepPhase::Checking;
                }
            }
            AlarmKind::NextCheck => {
                self.visual.click_feedback = None;
                self.feedback = None;
                if self.active.is_some() {
                    self.arm();
                }
            }
            AlarmKind::Unlock => self.unlocked = true,
            AlarmKind::ClearFeedback => self.visual.click_feedback = None,
            AlarmKind::AutoAdvance => match self.skip() {
                Ok(m) => outcome = Some(m),
                Err(e) => warn!("auto-advance failed: {e}"),
            },
        }
        self.pump();
        outcome
    }

    // ---- narration ----

    /// Platform report that a narration clip stopped.
    pub fn on_clip_finished(&mut self, ticket: Ticket, outcome: ClipOutcome) {
        if let Some(cue) = self.narrator.finish(ticket, outcome) {
            self.on_cue(cue);
        }
        self.pump();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.narrator.set_muted(muted);
        self.pump();
    }

    pub fn is_muted(&self) -> bool {
        self.narrator.is_muted()
    }

    /// Page lost focus. The clip's continuation stays pending and Replay
    /// resumes it.
    pub fn pause_narration(&mut self) {
        self.narrator.stop(false);
    }

    /// Footer replay button.
    pub fn replay_narration(&mut self) {
        let cue = Cue { epoch: self.epoch, kind: CueKind::Idle };
        if self.narrator.replay(cue).is_none() {
            debug!("nothing to replay");
        }
    }

    // ---- answers ----

    pub fn submit_answer(&mut self, candidate: Answer) -> Result<Verdict, LessonError> {
        let Some(active) = self.active.clone() else {
            warn!("answer submitted with nothing armed");
            return Err(LessonError::InvalidAnswerSubmission);
        };
        self.attempts += 1;
        let is_correct = candidate == active.expected;
        let page = Rc::clone(&self.page);
        let step = &page.steps[self.step_index];
        let check = &step.checks[active.check_index];
        debug!("{}: attempt {} correct={is_correct}", step.id, self.attempts);

        self.visual.clear_hover();
        self.input_enabled = false;

        if self.is_assessment() {
            let index = self.step_index;
            if let Some(scorer) = self.scorer.as_mut() {
                scorer.record(index, candidate, is_correct);
            }
            if is_correct {
                self.mark_completed();
            }
            self.active = None;
            self.phase = StepPhase::Recorded;
            self.schedule(AlarmKind::AutoAdvance, self.timing.auto_advance_ms);
            return Ok(Verdict { is_correct });
        }

        if let Some(element) = candidate.element() {
            self.visual.click_feedback = Some(ClickFeedback { element, correct: is_correct });
        }
        if let Answer::Slots(expected) = &active.expected {
            self.slots.mark(expected);
        }

        if is_correct {
            self.feedback = Some(FeedbackLine { text: check.feedback.correct.clone(), correct: true });
            self.hint = None;
            self.phase = StepPhase::Correct;
            self.narrate(check.feedback.correct_audio.as_ref(), CueKind::Idle);
            if active.check_index + 1 < step.checks.len() {
                self.set_active(active.check_index + 1);
                self.schedule(AlarmKind::NextCheck, self.timing.next_check_ms);
            } else {
                self.active = None;
                self.mark_completed();
                if self.timing.unlock_ms == 0 {
                    self.unlocked = true;
                } else {
                    self.schedule(AlarmKind::Unlock, self.timing.unlock_ms);
                }
                self.schedule(AlarmKind::ClearFeedback, self.timing.feedback_clear_ms);
            }
        } else {
            self.feedback = Some(FeedbackLine { text: check.feedback.incorrect.clone(), correct: false });
            self.hint = self
                .slots
                .slots()
                .iter()
                .find(|s| self.slots.verdict(**s) == Some(false))
                .map(|s| self.slots.hint(*s));
            self.phase = StepPhase::Incorrect;
            self.narrate(check.feedback.incorrect_audio.as_ref(), CueKind::Idle);
            self.schedule(AlarmKind::Rearm, self.timing.rearm_ms);
        }
        self.pump();
        Ok(Verdict { is_correct })
    }

    /// Button answers (yes/no, choices, direction buttons).
    pub fn choose(&mut self, answer: Answer) -> Option<Verdict> {
        if !self.input_enabled {
            return None;
        }
        self.submit_answer(answer).ok()
    }

    // ---- pointer and keypad input ----

    pub fn frame(&self) -> RenderPlan {
        render::compute_frame(&self.clock, &self.visual, &self.slots, self.layout)
    }

    /// Pointer click in canvas coordinates.
    pub fn click(&mut self, point: Point) -> Option<Verdict> {
        if !self.input_enabled {
            return None;
        }
        let target = self.active.as_ref()?.target.clone();
        let hit = resolver::hit_test(point, &target, &self.frame());
        debug!("click at ({:.0}, {:.0}) hit {hit:?}", point.x, point.y);
        match (target, hit?) {
            (Target::Slots, ElementRef::Number(n)) => {
                self.slots.select(n);
                None
            }
            (_, ElementRef::Number(n)) => self.submit_answer(Answer::Number(n)).ok(),
            (_, ElementRef::Hand(h)) => self.submit_answer(Answer::Hand(h)).ok(),
            (_, ElementRef::Arrow(d)) => self.submit_answer(Answer::Direction(d)).ok(),
        }
    }

    /// Updates hover state; returns whether it changed.
    pub fn pointer_moved(&mut self, point: Point) -> bool {
        let before = self.visual.hovered;
        self.visual.hovered = if self.input_enabled {
            resolver::resolve_hover(point, self.active.as_ref().map(|a| &a.target), &self.frame())
        } else {
            None
        };
        before != self.visual.hovered
    }

    fn slots_open(&self) -> bool {
        self.input_enabled && matches!(self.active.as_ref().map(|a| &a.target), Some(Target::Slots))
    }

    pub fn select_slot(&mut self, slot: u8) -> bool {
        self.slots_open() && self.slots.select(slot)
    }

    pub fn deselect_slot(&mut self) {
        self.slots.deselect();
    }

    /// Keypad button: a whole number for the selected slot.
    pub fn enter_number(&mut self, value: u8) -> Option<Verdict> {
        if !self.slots_open() {
            return None;
        }
        self.slots.enter(value)?;
        self.check_when_filled()
    }

    /// Keyboard digit for the selected slot.
    pub fn enter_digit(&mut self, digit: u8) -> Option<Verdict> {
        if !self.slots_open() {
            return None;
        }
        let slot = self.slots.push_digit(digit)?;
        // A lone 1 may still become 10, 11 or 12.
        if self.slots.value(slot) == Some(1) {
            return None;
        }
        self.check_when_filled()
    }

    pub fn clear_slot(&mut self) {
        if self.slots_open() {
            self.slots.clear_selected();
        }
    }

    /// Explicit "check" of the slots as they stand.
    pub fn check_slots(&mut self) -> Option<Verdict> {
        if !self.slots_open() {
            return None;
        }
        self.submit_answer(self.slots.answer()).ok()
    }

    fn check_when_filled(&mut self) -> Option<Verdict> {
        let filled = self.slots.slots().iter().all(|s| self.slots.value(*s).is_some());
        if filled { self.check_slots() } else { None }
    }

    // ---- animation ----

    pub fn is_animating(&self) -> bool {
        self.visual.is_animating()
    }

    /// Per-frame hook while animating.
    pub fn tick(&mut self) -> bool {
        self.visual.step_animation()
    }

    pub fn view(&self) -> SessionView {
        let step = self.step();
        SessionView {
            page: self.page.id,
            step_index: self.step_index,
            step_count: self.page.steps.len(),
            kind: step.kind,
            phase: self.phase,
            caption: self.caption.clone(),
            beat_text: self.beat_text.clone(),
            prompt: self.prompt.clone(),
            feedback: self.feedback.clone(),
            hint: self.hint.clone(),
            choices: step.choices.clone(),
            canvas_arrows: !self.clock.arrows.is_empty(),
            input_enabled: self.input_enabled,
            can_advance: self.can_advance(),
            slots: self.slots.slots().iter().map(|s| (*s, self.slots.value(*s))).collect(),
            selected_slot: self.slots.selected(),
            new_terms: step.glossary.clone(),
            muted: self.narrator.is_muted(),
            attempts: self.attempts,
            part: step.is_multi_part().then(|| (self.check_index + 1, step.checks.len())),
            report: self.report.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Hand;
    use crate::narration::tests::RecordingOutput;
    use crate::render::NumeralKind;
    use serde_json::json;
    use std::cell::Cell;

    pub struct ManualHandle(Rc<Cell<bool>>);

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    /// Scheduler that only records; tests fire alarms by hand.
    #[derive(Default)]
    pub struct ManualScheduler {
        pub scheduled: Vec<(Alarm, Rc<Cell<bool>>)>,
    }

    impl ManualScheduler {
        fn pending(&self, kind: AlarmKind) -> Option<Alarm> {
            self.scheduled
                .iter()
                .rev()
                .find(|(a, cancelled)| a.kind == kind && !cancelled.get())
                .map(|(a, _)| *a)
        }
    }

    impl Scheduler for ManualScheduler {
        type Handle = ManualHandle;

        fn after(&mut self, _delay_ms: u32, alarm: Alarm) -> ManualHandle {
            let cancelled = Rc::new(Cell::new(false));
            self.scheduled.push((alarm, cancelled.clone()));
            ManualHandle(cancelled)
        }
    }

    type TestSession = LessonSession<RecordingOutput, ManualScheduler>;

    fn practice_page() -> LessonPage {
        serde_json::from_value(json!({
            "id": "learn-it",
            "title": "Learn It",
            "mode": "practice",
            "steps": [
                {
                    "id": "face", "title": "Clock Face", "instruction": "This is a clock face.",
                    "kind": "click-target", "narration": "this_is_a_clock_face_it",
                    "checks": [{ "prompt": "Click the 9.", "expected": { "type": "number", "value": 9 } }]
                },
                {
                    "id": "hour-only", "title": "Hour Hand", "instruction": "Find the hour hand.",
                    "kind": "click-hand", "clock": { "hour": 3, "minute": 0 },
                    "checks": [{ "prompt": "Click the hour hand.", "expected": { "type": "hand", "value": "hour" },
                                 "feedback": { "correct": "Yes!", "incorrect": "Try again", "incorrect_audio": "not_quite_right_try_again" } }]
                },
                {
                    "id": "hands", "title": "Both Hands", "instruction": "Find each hand.",
                    "kind": "click-hand", "clock": { "hour": 3, "minute": 0 },
                    "highlight": { "element": { "hand": "hour" } },
                    "checks": [
                        { "prompt": "Click the hour hand.", "audio": "click_on_the_hour_hand_the", "expected": { "type": "hand", "value": "hour" } },
                        { "prompt": "Now the minute hand.", "audio": "now_click_on_the_minute_hand", "expected": { "type": "hand", "value": "minute" } }
                    ]
                },
                {
                    "id": "arrows", "title": "Direction", "instruction": "Which way?",
                    "kind": "click-arrow", "clock": { "arrows": ["clockwise", "counterclockwise"] },
                    "checks": [{ "prompt": "Click the clockwise arrow.", "expected": { "type": "direction", "value": "clockwise" } }]
                },
                {
                    "id": "numbers", "title": "Missing Numbers", "instruction": "Fill the boxes.",
                    "kind": "number-input", "clock": { "blank_numbers": [2, 5, 11] },
                    "checks": [{ "prompt": "Type the missing numbers.",
                                 "expected": { "type": "slots", "value": { "2": 2, "5": 5, "11": 11 } } }]
                },
                {
                    "id": "watch", "title": "Watch", "instruction": "Watch the hands move.",
                    "kind": "animation-only",
                    "beats": [{ "text": "Round and round.", "audio": "watch_how_the_hands_move_they", "animate": true }]
                }
            ]
        }))
        .unwrap()
    }

    fn assessment_page() -> LessonPage {
        let hand = |id: &str, h: &str, hour: u8| json!({
            "id": id, "title": id, "instruction": "", "kind": "click-hand",
            "clock": { "hour": hour },
            "checks": [{ "prompt": format!("Click the {h} hand."), "expected": { "type": "hand", "value": h } }]
        });
        serde_json::from_value(json!({
            "id": "show-it",
            "title": "Show It",
            "mode": { "assessment": { "pass_threshold": 3 } },
            "steps": [
                hand("q1", "hour", 5),
                hand("q2", "minute", 8),
                {
                    "id": "q3", "title": "q3", "instruction": "", "kind": "multiple-choice",
                    "choices": [{ "id": "hour", "label": "Hour hand" }, { "id": "minute", "label": "Minute hand" }],
                    "checks": [{ "prompt": "Which hand is longer?", "expected": { "type": "choice", "value": "minute" } }]
                },
                {
                    "id": "q4", "title": "q4", "instruction": "", "kind": "yes-no",
                    "clock": { "motion": "clockwise" },
                    "checks": [{ "prompt": "Clockwise?", "expected": { "type": "yes-no", "value": true } }]
                }
            ]
        }))
        .unwrap()
    }

    fn session(page: LessonPage) -> TestSession {
        let mut s = LessonSession::new(
            Rc::new(page),
            RecordingOutput::default(),
            ManualScheduler::default(),
            Timing::default(),
        );
        s.set_layout(ClockLayout { center: Point::new(200.0, 200.0), diameter: 300.0 });
        s
    }

    /// Completes whatever clip is playing.
    fn end_clip(s: &mut TestSession) {
        let ticket = s.narrator_output().started.last().map(|(t, _)| *t).unwrap();
        s.on_clip_finished(ticket, ClipOutcome::Ended);
    }

    fn fire(s: &mut TestSession, kind: AlarmKind) -> Option<Move> {
        let alarm = s.scheduler().pending(kind).expect("alarm pending");
        s.on_alarm(alarm)
    }

    // 3:00 on a 300px clock centred at (200, 200).
    const ON_HOUR: Point = Point::new(260.0, 203.0);
    const ON_MINUTE: Point = Point::new(198.0, 100.0);

    #[test]
    fn load_step_rejects_out_of_range() {
        let mut s = session(practice_page());
        let err = s.load_step(6).unwrap_err();
        assert!(matches!(err, LessonError::OutOfRange { index: 6, len: 6 }));
        assert_eq!(s.phase(), StepPhase::Waiting);
    }

    #[test]
    fn caption_waits_for_opening_narration() {
        let mut s = session(practice_page());
        s.load_step(0).unwrap();
        assert!(s.view().caption.is_none());
        assert!(s.active().is_none());
        end_clip(&mut s);
        let caption = s.view().caption.unwrap();
        assert_eq!(caption.counter, "Step 1 of 6");
        assert_eq!(s.active().unwrap().target, Target::Number(9));
        assert!(s.input_enabled());
    }

    #[test]
    fn step_without_narration_shows_caption_immediately() {
        let mut s = session(practice_page());
        s.load_step(1).unwrap();
        assert!(s.view().caption.is_some());
        assert_eq!(s.phase(), StepPhase::Checking);
    }

    #[test]
    fn load_step_resets_session_state() {
        let mut s = session(practice_page());
        s.load_step(1).unwrap();
        assert!(s.pointer_moved(ON_HOUR));
        s.click(ON_MINUTE);
        assert_eq!(s.attempts(), 1);
        let (_, rearm_cancelled) = s.scheduler().scheduled.last().cloned().unwrap();

        s.load_step(0).unwrap();
        assert!(rearm_cancelled.get());
        assert!(s.active().is_none());
        assert_eq!(s.attempts(), 0);
        assert_eq!(s.check_index(), 0);
        assert_eq!(s.visual(), &ClockVisualState::default());
        assert!(s.view().feedback.is_none());
    }

    #[test]
    fn hour_hand_step_verdicts() {
        let mut s = session(practice_page());
        s.load_step(1).unwrap();
        let wrong = s.click(ON_MINUTE).unwrap();
        assert!(!wrong.is_correct);
        assert_eq!(s.active().unwrap().expected, Answer::Hand(Hand::Hour));
        assert_eq!(s.phase(), StepPhase::Incorrect);
        assert_eq!(
            s.visual().click_feedback,
            Some(ClickFeedback { element: ElementRef::Hand(Hand::Minute), correct: false })
        );
        assert_eq!(s.narrator_output().started.last().unwrap().1, "not_quite_right_try_again");
        // Input stays closed until the re-arm delay passes.
        assert_eq!(s.click(ON_HOUR), None);
        fire(&mut s, AlarmKind::Rearm);
        assert!(s.input_enabled());
        assert!(s.visual().click_feedback.is_none());

        let right = s.click(ON_HOUR).unwrap();
        assert!(right.is_correct);
        assert!(s.is_completed("hour-only"));
        assert!(s.active().is_none());
        assert!(s.can_advance());
        assert_eq!(s.attempts(), 2);
    }

    #[test]
    fn wrong_arrow_does_not_unlock() {
        let mut s = session(practice_page());
        s.load_step(3).unwrap();
        let verdict = s.click(Point::new(125.0, 200.0)).unwrap();
        assert!(!verdict.is_correct);
        assert!(!s.can_advance());
        assert!(matches!(s.advance(), Err(LessonError::StepIncomplete { .. })));
        assert_eq!(s.step_index(), 3);
        fire(&mut s, AlarmKind::Rearm);
        assert!(s.click(Point::new(275.0, 200.0)).unwrap().is_correct);
        assert_eq!(s.advance().unwrap(), Move::Step(4));
    }

    #[test]
    fn multi_part_group_unlocks_after_last_part() {
        let mut s = session(practice_page());
        s.load_step(2).unwrap();
        // The blink call-out ends once the checks begin.
        assert_eq!(s.visual().blinking, None);
        assert!(s.scheduler().pending(AlarmKind::Blink).is_none());

        assert_eq!(s.view().part, Some((1, 2)));
        assert!(s.click(ON_HOUR).unwrap().is_correct);
        assert_eq!(s.view().part, Some((2, 2)));
        let active = s.active().unwrap();
        assert_eq!(active.expected, Answer::Hand(Hand::Minute));
        assert_eq!(active.check_index, 1);
        assert!(!s.can_advance());
        assert!(!s.is_completed("hands"));
        assert!(!s.input_enabled());

        fire(&mut s, AlarmKind::NextCheck);
        assert!(s.input_enabled());
        assert_eq!(s.view().prompt.as_deref(), Some("Now the minute hand."));
        assert_eq!(s.narrator_output().started.last().unwrap().1, "now_click_on_the_minute_hand");

        assert!(s.click(ON_MINUTE).unwrap().is_correct);
        assert!(s.can_advance());
        assert!(s.is_completed("hands"));
    }

    #[test]
    fn single_check_steps_have_no_parts() {
        let mut s = session(practice_page());
        s.load_step(1).unwrap();
        assert_eq!(s.view().part, None);
    }

    #[test]
    fn number_slots_must_all_match() {
        let mut s = session(practice_page());
        s.load_step(4).unwrap();
        let fill = |s: &mut TestSession, slot: u8, value: u8| {
            assert!(s.select_slot(slot));
            s.enter_number(value)
        };
        assert_eq!(fill(&mut s, 2, 2), None);
        assert_eq!(fill(&mut s, 5, 5), None);
        let verdict = fill(&mut s, 11, 12).unwrap();
        assert!(!verdict.is_correct);
        assert!(!s.is_completed("numbers"));
        assert_eq!(s.view().hint.as_deref(), Some("What number comes between 10 and 12?"));

        fire(&mut s, AlarmKind::Rearm);
        assert!(s.select_slot(11));
        assert_eq!(s.enter_digit(1), None);
        let verdict = s.enter_digit(1).unwrap();
        assert!(verdict.is_correct);
        assert!(s.is_completed("numbers"));
        assert_eq!(s.attempts(), 2);
    }

    #[test]
    fn random_blanks_are_drawn_per_visit_and_answered_by_position() {
        let page: LessonPage = serde_json::from_value(json!({
            "id": "warm-up", "title": "Warm-Up", "mode": "practice",
            "steps": [{
                "id": "random", "title": "Missing", "instruction": "", "kind": "number-input",
                "clock": { "hands": [], "missing": { "anchors": [1, 3, 6, 9, 12], "count": 3 } },
                "checks": [{ "prompt": "Fill them in.", "expected": { "type": "slots", "value": {} } }]
            }]
        }))
        .unwrap();
        let mut s = session(page);
        for _ in 0..20 {
            s.load_step(0).unwrap();
            let blanks: Vec<u8> = s.view().slots.iter().map(|(slot, _)| *slot).collect();
            assert_eq!(blanks.len(), 3);
            assert!(blanks.iter().all(|n| ![1, 3, 6, 9, 12].contains(n)));
            let boxes = s.frame().numbers.iter().filter(|n| matches!(n.kind, NumeralKind::Slot { .. })).count();
            assert_eq!(boxes, 3);
        }
        let blanks: Vec<u8> = s.view().slots.iter().map(|(slot, _)| *slot).collect();
        let mut verdict = None;
        for n in blanks {
            assert!(s.select_slot(n));
            verdict = s.enter_number(n);
        }
        assert!(verdict.unwrap().is_correct);
        assert!(s.is_completed("random"));
    }

    #[test]
    fn clicking_a_blank_box_selects_it() {
        let mut s = session(practice_page());
        s.load_step(4).unwrap();
        let five = s.frame().numbers.iter().find(|n| n.value == 5).unwrap().pos;
        assert_eq!(s.click(five), None);
        assert_eq!(s.view().selected_slot, Some(5));
        assert_eq!(s.attempts(), 0);
    }

    #[test]
    fn submit_without_armed_check_is_a_no_op() {
        let mut s = session(practice_page());
        s.load_step(0).unwrap();
        let err = s.submit_answer(Answer::Number(9)).unwrap_err();
        assert!(matches!(err, LessonError::InvalidAnswerSubmission));
        assert_eq!(s.attempts(), 0);
        assert_eq!(s.choose(Answer::Number(9)), None);
    }

    #[test]
    fn every_submission_counts_one_attempt() {
        let mut s = session(practice_page());
        s.load_step(1).unwrap();
        for n in 1..=3 {
            s.submit_answer(Answer::Hand(Hand::Minute)).unwrap();
            assert_eq!(s.attempts(), n);
        }
        s.submit_answer(Answer::Hand(Hand::Hour)).unwrap();
        assert_eq!(s.attempts(), 4);
    }

    #[test]
    fn stale_alarm_after_step_change_is_ignored() {
        let mut s = session(practice_page());
        s.load_step(1).unwrap();
        s.click(ON_MINUTE);
        let stale = s.scheduler().pending(AlarmKind::Rearm).unwrap();
        s.load_step(0).unwrap();
        assert_eq!(s.on_alarm(stale), None);
        assert!(!s.input_enabled());
        assert!(s.active().is_none());
    }

    #[test]
    fn hover_is_cleared_while_input_is_closed() {
        let mut s = session(practice_page());
        s.load_step(1).unwrap();
        assert!(s.pointer_moved(ON_HOUR));
        assert_eq!(s.visual().hovered, Some(ElementRef::Hand(Hand::Hour)));
        s.click(ON_MINUTE);
        assert!(s.visual().hovered.is_none());
        assert!(!s.pointer_moved(ON_HOUR));
        assert!(s.visual().hovered.is_none());
    }

    #[test]
    fn navigation_at_page_bounds() {
        let mut s = session(practice_page());
        s.load_step(0).unwrap();
        assert_eq!(s.retreat().unwrap(), Move::Page(PageId::WarmUp));
        s.load_step(0).unwrap();
        assert_eq!(s.skip().unwrap(), Move::Step(1));
        assert_eq!(s.retreat().unwrap(), Move::Step(0));
        s.load_step(5).unwrap();
        assert_eq!(s.skip().unwrap(), Move::Page(PageId::TryIt));
        assert!(!s.narrator_output().started.is_empty());
    }

    #[test]
    fn animation_only_step_unlocks_after_its_beats() {
        let mut s = session(practice_page());
        s.load_step(5).unwrap();
        assert!(s.is_animating());
        assert!(s.tick());
        assert_eq!(s.view().beat_text.as_deref(), Some("Round and round."));
        assert!(!s.can_advance());
        end_clip(&mut s);
        assert!(!s.is_animating());
        assert_eq!(s.visual().animation_offset, 0.0);
        assert!(s.can_advance());
        assert_eq!(s.phase(), StepPhase::Done);
    }

    #[test]
    fn intro_narration_is_cut_off_by_the_first_step() {
        let mut page = practice_page();
        page.intro.audio = Some(AudioId::new("welcome_time_explorers_lets_quickly_check"));
        let mut s = session(page);
        s.play_intro();
        let (intro, _) = s.narrator_output().started[0].clone();
        s.load_step(1).unwrap();
        s.on_clip_finished(intro, ClipOutcome::Ended);
        assert_eq!(s.phase(), StepPhase::Checking);
        assert_eq!(s.narrator_output().started.len(), 1);
    }

    #[test]
    fn replay_on_a_silent_step_plays_nothing() {
        let mut s = session(practice_page());
        s.load_step(0).unwrap();
        end_clip(&mut s);
        s.load_step(1).unwrap();
        let before = s.narrator_output().started.len();
        s.replay_narration();
        assert_eq!(s.narrator_output().started.len(), before);
    }

    #[test]
    fn paused_opening_resumes_on_replay() {
        let mut s = session(practice_page());
        s.load_step(0).unwrap();
        let (opening, _) = s.narrator_output().started[0].clone();
        s.pause_narration();
        assert_eq!(s.phase(), StepPhase::Presenting);
        s.replay_narration();
        let (resumed, clip) = s.narrator_output().started.last().cloned().unwrap();
        assert_eq!((resumed, clip.as_str()), (opening, "this_is_a_clock_face_it"));
        s.on_clip_finished(opening, ClipOutcome::Ended);
        assert!(s.view().caption.is_some());
        assert_eq!(s.phase(), StepPhase::Checking);
    }

    #[test]
    fn muting_mid_clip_keeps_the_lesson_moving() {
        let mut s = session(practice_page());
        s.load_step(0).unwrap();
        assert!(s.active().is_none());
        s.set_muted(true);
        assert!(s.view().muted);
        assert!(s.active().is_some());
    }

    #[test]
    fn blink_alarm_toggles_and_reschedules() {
        let mut s = session(practice_page());
        s.load_step(0).unwrap();
        s.apply_highlight(Some(&Highlight::Face));
        assert!(s.visual().face_called_out());
        fire(&mut s, AlarmKind::Blink);
        assert!(!s.visual().face_called_out());
        assert!(s.scheduler().pending(AlarmKind::Blink).is_some());
    }

    #[test]
    fn assessment_scores_after_last_question() {
        let mut s = session(assessment_page());
        s.load_step(0).unwrap();
        // q1: hour hand at 5:00 is correct.
        let hour_tip = s.frame().hand(Hand::Hour).unwrap().tip;
        assert!(s.click(hour_tip).unwrap().is_correct);
        assert_eq!(s.phase(), StepPhase::Recorded);
        assert!(s.visual().click_feedback.is_none());
        assert_eq!(fire(&mut s, AlarmKind::AutoAdvance), Some(Move::Step(1)));
        // q2: minute hand.
        s.submit_answer(Answer::Hand(Hand::Minute)).unwrap();
        fire(&mut s, AlarmKind::AutoAdvance);
        // q3 and q4 wrong.
        assert!(!s.choose(Answer::Choice("hour".into())).unwrap().is_correct);
        fire(&mut s, AlarmKind::AutoAdvance);
        assert!(s.is_animating());
        s.choose(Answer::YesNo(false));
        assert_eq!(s.score(), 2);
        assert_eq!(fire(&mut s, AlarmKind::AutoAdvance), Some(Move::Completed));

        let report = s.report().unwrap();
        assert_eq!(report.score, 2);
        assert!(!report.passed);
        assert_eq!(report.review.len(), 2);

        assert_eq!(s.restart().unwrap(), Move::Step(0));
        assert!(s.report().is_none());
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn assessment_navigation_is_never_gated() {
        let mut s = session(assessment_page());
        s.load_step(0).unwrap();
        assert!(s.can_advance());
        assert_eq!(s.advance().unwrap(), Move::Step(1));
    }
}
