//! Lesson content model.
//! Everything here is static data loaded once from the lesson file and
//! shared read-only by every page session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageId {
    Home,
    WarmUp,
    LearnIt,
    TryIt,
    DoIt,
    ShowIt,
}

impl PageId {
    pub const ORDER: [PageId; 6] = [
        PageId::Home,
        PageId::WarmUp,
        PageId::LearnIt,
        PageId::TryIt,
        PageId::DoIt,
        PageId::ShowIt,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|p| *p == self).unwrap_or(0)
    }

    /// Page reached by advancing past the last step. The assessment wraps
    /// back to the home page.
    pub fn next(self) -> PageId {
        Self::ORDER.get(self.position() + 1).copied().unwrap_or(PageId::Home)
    }

    pub fn prev(self) -> PageId {
        self.position()
            .checked_sub(1)
            .and_then(|i| Self::ORDER.get(i).copied())
            .unwrap_or(PageId::Home)
    }

    pub fn label(self) -> &'static str {
        match self {
            PageId::Home => "Meet the Clock",
            PageId::WarmUp => "Warm-Up",
            PageId::LearnIt => "Learn It",
            PageId::TryIt => "Try It",
            PageId::DoIt => "Do It",
            PageId::ShowIt => "Show It",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Hour,
    Minute,
}

impl Hand {
    pub fn label(self) -> &'static str {
        match self {
            Hand::Hour => "hour hand",
            Hand::Minute => "minute hand",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Clockwise,
    Counterclockwise,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Clockwise => "clockwise",
            Direction::Counterclockwise => "counterclockwise",
        }
    }

    /// +1 for clockwise motion, -1 otherwise.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::Counterclockwise => -1.0,
        }
    }
}

/// Opaque narration clip identifier; resolved to a playable locator by the
/// platform layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioId(pub String);

impl AudioId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionKind {
    NumberInput,
    ClickTarget,
    ClickHand,
    ClickArrow,
    YesNo,
    /// Answered by clicking an arrow; there is no drag tracking.
    DragArrow,
    MultipleChoice,
    AnimationOnly,
}

/// Expected or candidate answer. The variant must agree with the step's
/// [`InteractionKind`]; see [`Answer::fits`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    Number(u8),
    Hand(Hand),
    Direction(Direction),
    YesNo(bool),
    Choice(String),
    /// Input slot (the blanked clock position) to the number it must hold.
    Slots(BTreeMap<u8, u8>),
}

impl Answer {
    pub fn fits(&self, kind: InteractionKind) -> bool {
        use InteractionKind as K;
        matches!(
            (self, kind),
            (Answer::Number(_), K::ClickTarget)
                | (Answer::Hand(_), K::ClickHand)
                | (Answer::Direction(_), K::ClickArrow | K::DragArrow)
                | (Answer::YesNo(_), K::YesNo)
                | (Answer::Choice(_), K::MultipleChoice)
                | (Answer::Slots(_), K::NumberInput)
        )
    }

    /// Learner-facing wording, used by the assessment review.
    pub fn label(&self, choices: &[Choice]) -> String {
        match self {
            Answer::Number(n) => n.to_string(),
            Answer::Hand(h) => h.label().to_string(),
            Answer::Direction(d) => d.label().to_string(),
            Answer::YesNo(true) => "Yes".to_string(),
            Answer::YesNo(false) => "No".to_string(),
            Answer::Choice(id) => choices
                .iter()
                .find(|c| &c.id == id)
                .map(|c| c.label.clone())
                .unwrap_or_else(|| id.clone()),
            Answer::Slots(slots) => slots
                .values()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Clock element this answer points at, when it names one.
    pub fn element(&self) -> Option<ElementRef> {
        match self {
            Answer::Number(n) => Some(ElementRef::Number(*n)),
            Answer::Hand(h) => Some(ElementRef::Hand(*h)),
            Answer::Direction(d) => Some(ElementRef::Arrow(*d)),
            _ => None,
        }
    }
}

/// A drawable, clickable element of the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementRef {
    Number(u8),
    Hand(Hand),
    Arrow(Direction),
}

/// What the resolver looks for on the canvas while a check is armed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Number(u8),
    Hand(Hand),
    Arrow(Direction),
    /// Blank input boxes of a number-input step.
    Slots,
    /// Answered through buttons, nothing on the canvas is clickable.
    None,
}

impl Target {
    pub fn for_answer(answer: &Answer) -> Target {
        match answer {
            Answer::Number(n) => Target::Number(*n),
            Answer::Hand(h) => Target::Hand(*h),
            Answer::Direction(d) => Target::Arrow(*d),
            Answer::Slots(_) => Target::Slots,
            Answer::YesNo(_) | Answer::Choice(_) => Target::None,
        }
    }
}

/// Call-out emphasis applied while a narration beat plays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Highlight {
    Face,
    /// Numbers 1 to 12 light up one after another.
    Sweep,
    /// One element blinks.
    Element(ElementRef),
    BothHands,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_hour")]
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
    #[serde(default = "default_true")]
    pub numbers: bool,
    #[serde(default = "default_hands")]
    pub hands: Vec<Hand>,
    /// Positions drawn as empty input boxes instead of numerals.
    #[serde(default)]
    pub blank_numbers: Vec<u8>,
    #[serde(default)]
    pub arrows: Vec<Direction>,
    /// Continuous hand motion for the whole step.
    #[serde(default)]
    pub motion: Option<Direction>,
    /// Blanks drawn at random each time the step loads, replacing
    /// `blank_numbers`.
    #[serde(default)]
    pub missing: Option<MissingNumbers>,
}

/// Random blank selection: `count` numbers, never an anchor and never two
/// neighbours on the dial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingNumbers {
    pub anchors: Vec<u8>,
    pub count: usize,
}

fn default_hour() -> u8 {
    12
}

fn default_true() -> bool {
    true
}

fn default_hands() -> Vec<Hand> {
    vec![Hand::Hour, Hand::Minute]
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            hour: default_hour(),
            minute: 0,
            numbers: true,
            hands: default_hands(),
            blank_numbers: Vec::new(),
            arrows: Vec::new(),
            motion: None,
            missing: None,
        }
    }
}

impl ClockConfig {
    pub fn shows_hand(&self, hand: Hand) -> bool {
        self.hands.contains(&hand)
    }

    pub fn is_blank(&self, n: u8) -> bool {
        self.blank_numbers.contains(&n)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub correct: String,
    #[serde(default)]
    pub incorrect: String,
    #[serde(default)]
    pub correct_audio: Option<AudioId>,
    #[serde(default)]
    pub incorrect_audio: Option<AudioId>,
}

/// One narrated instruction shown after the opening narration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    pub text: String,
    #[serde(default)]
    pub audio: Option<AudioId>,
    #[serde(default)]
    pub highlight: Option<Highlight>,
    /// Hands sweep while this beat plays.
    #[serde(default)]
    pub animate: bool,
}

/// One question of a step. Steps with several checks form a multi-part
/// group that must be answered in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub prompt: String,
    #[serde(default)]
    pub audio: Option<AudioId>,
    pub expected: Answer,
    #[serde(default)]
    pub feedback: Feedback,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LessonStep {
    pub id: String,
    pub title: String,
    pub instruction: String,
    #[serde(default)]
    pub task: String,
    pub kind: InteractionKind,
    #[serde(default)]
    pub clock: ClockConfig,
    /// Opening narration; the caption is revealed when it finishes.
    #[serde(default)]
    pub narration: Option<AudioId>,
    #[serde(default)]
    pub highlight: Option<Highlight>,
    #[serde(default)]
    pub beats: Vec<Beat>,
    #[serde(default)]
    pub checks: Vec<Check>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Glossary terms introduced by this step.
    #[serde(default)]
    pub glossary: Vec<String>,
}

impl LessonStep {
    pub fn is_multi_part(&self) -> bool {
        self.checks.len() > 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageMode {
    Practice,
    /// Answers are recorded without feedback and scored at the end.
    Assessment {
        pass_threshold: usize,
        #[serde(default)]
        pass_audio: Option<AudioId>,
        #[serde(default)]
        review_audio: Option<AudioId>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Intro {
    pub heading: String,
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(default)]
    pub audio: Option<AudioId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LessonPage {
    pub id: PageId,
    pub title: String,
    #[serde(default)]
    pub intro: Intro,
    pub mode: PageMode,
    pub steps: Vec<LessonStep>,
}

impl LessonPage {
    pub fn is_assessment(&self) -> bool {
        matches!(self.mode, PageMode::Assessment { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub term: String,
    pub definition: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    #[serde(default)]
    pub glossary: Vec<GlossaryTerm>,
    pub pages: Vec<LessonPage>,
}

impl Lesson {
    pub fn page(&self, id: PageId) -> Option<&LessonPage> {
        self.pages.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_order_wraps_to_home() {
        assert_eq!(PageId::Home.next(), PageId::WarmUp);
        assert_eq!(PageId::DoIt.next(), PageId::ShowIt);
        assert_eq!(PageId::ShowIt.next(), PageId::Home);
        assert_eq!(PageId::LearnIt.prev(), PageId::WarmUp);
        assert_eq!(PageId::Home.prev(), PageId::Home);
    }

    #[test]
    fn answer_json_shape() {
        let a: Answer = serde_json::from_str(r#"{"type":"hand","value":"minute"}"#).unwrap();
        assert_eq!(a, Answer::Hand(Hand::Minute));
        let s: Answer =
            serde_json::from_str(r#"{"type":"slots","value":{"2":2,"11":11}}"#).unwrap();
        assert_eq!(s, Answer::Slots(BTreeMap::from([(2, 2), (11, 11)])));
    }

    #[test]
    fn answer_fits_its_interaction_kind() {
        assert!(Answer::Hand(Hand::Hour).fits(InteractionKind::ClickHand));
        assert!(Answer::Direction(Direction::Clockwise).fits(InteractionKind::DragArrow));
        assert!(!Answer::Number(9).fits(InteractionKind::ClickHand));
        assert!(!Answer::YesNo(true).fits(InteractionKind::AnimationOnly));
    }

    #[test]
    fn choice_label_falls_back_to_id() {
        let choices = vec![Choice { id: "minute".into(), label: "The minute hand".into() }];
        assert_eq!(Answer::Choice("minute".into()).label(&choices), "The minute hand");
        assert_eq!(Answer::Choice("other".into()).label(&choices), "other");
    }

    #[test]
    fn clock_config_defaults_fill_missing_fields() {
        let c: ClockConfig = serde_json::from_str(r#"{"hour":5}"#).unwrap();
        assert_eq!(c.minute, 0);
        assert!(c.numbers);
        assert!(c.shows_hand(Hand::Hour) && c.shows_hand(Hand::Minute));
        assert!(c.arrows.is_empty());
    }
}
