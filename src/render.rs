//! Clock render model.
//!
//! [`compute_frame`] turns a step's clock configuration plus the transient
//! visual state into a flat list of draw primitives. It has no side effects;
//! the canvas painter and the hit-tester both consume the same plan.

use crate::geometry::{self, Point};
use crate::model::{ClockConfig, Direction, ElementRef, Hand};
use crate::state::{ClockVisualState, SlotEntry};

/// Placement of the clock on the drawing surface. All radii and
/// tolerances scale with the diameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockLayout {
    pub center: Point,
    pub diameter: f64,
}

impl ClockLayout {
    const NUMBER_RADIUS: f64 = 0.38;
    const HOUR_LENGTH: f64 = 0.28;
    const MINUTE_LENGTH: f64 = 0.40;
    const ARROW_OFFSET: f64 = 0.25;
    const ARROW_SIZE: f64 = 0.08;
    const NUMBER_TOLERANCE: f64 = 0.08;
    const HAND_TOLERANCE: f64 = 0.04;

    /// Fits the clock into a `width` x `height` surface with some margin.
    pub fn fit(width: f64, height: f64) -> Self {
        let diameter = (width.min(height) * 0.85).clamp(120.0, 520.0);
        Self {
            center: Point::new(width / 2.0, height / 2.0),
            diameter,
        }
    }

    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    pub fn number_radius(&self) -> f64 {
        self.diameter * Self::NUMBER_RADIUS
    }

    pub fn hand_length(&self, hand: Hand) -> f64 {
        match hand {
            Hand::Hour => self.diameter * Self::HOUR_LENGTH,
            Hand::Minute => self.diameter * Self::MINUTE_LENGTH,
        }
    }

    pub fn hand_width(&self, hand: Hand) -> f64 {
        match hand {
            Hand::Hour => self.diameter * 0.03,
            Hand::Minute => self.diameter * 0.02,
        }
    }

    pub fn arrow_anchor(&self, dir: Direction) -> Point {
        let dx = self.diameter * Self::ARROW_OFFSET;
        match dir {
            Direction::Clockwise => Point::new(self.center.x + dx, self.center.y),
            Direction::Counterclockwise => Point::new(self.center.x - dx, self.center.y),
        }
    }

    pub fn arrow_size(&self) -> f64 {
        self.diameter * Self::ARROW_SIZE
    }

    pub fn number_tolerance(&self) -> f64 {
        self.diameter * Self::NUMBER_TOLERANCE
    }

    pub fn hand_tolerance(&self) -> f64 {
        self.diameter * Self::HAND_TOLERANCE
    }
}

/// Visual state of a primitive after precedence is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    Hover,
    CallOut,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub center: Point,
    pub radius: f64,
    pub rim_width: f64,
    pub emphasis: Emphasis,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub from: Point,
    pub to: Point,
    pub major: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NumeralKind {
    Text,
    /// Blank position drawn as an input box.
    Slot {
        entry: Option<u8>,
        selected: bool,
        verdict: Option<bool>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Numeral {
    pub value: u8,
    pub pos: Point,
    pub size: f64,
    pub kind: NumeralKind,
    pub emphasis: Emphasis,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandStroke {
    pub hand: Hand,
    pub angle: f64,
    pub tip: Point,
    pub length: f64,
    pub width: f64,
    pub emphasis: Emphasis,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowGlyph {
    pub direction: Direction,
    pub anchor: Point,
    pub size: f64,
    pub emphasis: Emphasis,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    pub layout: ClockLayout,
    pub face: Face,
    pub ticks: Vec<Tick>,
    pub numbers: Vec<Numeral>,
    /// Draw order: hour first, minute on top.
    pub hands: Vec<HandStroke>,
    pub arrows: Vec<ArrowGlyph>,
    pub center_dot: (Point, f64),
}

impl RenderPlan {
    pub fn hand(&self, hand: Hand) -> Option<&HandStroke> {
        self.hands.iter().find(|h| h.hand == hand)
    }
}

/// Hand angles for a time given in clock minutes past 12:00.
pub fn hand_angles(total_minutes: f64) -> (f64, f64) {
    let hour = geometry::normalize_degrees(total_minutes * 0.5);
    let minute = geometry::normalize_degrees(total_minutes * 6.0);
    (hour, minute)
}

fn emphasis_for(visual: &ClockVisualState, element: ElementRef) -> Emphasis {
    if let Some(fb) = visual.click_feedback {
        if fb.element == element {
            return if fb.correct { Emphasis::Correct } else { Emphasis::Incorrect };
        }
    }
    if visual.calls_out(element) {
        return Emphasis::CallOut;
    }
    if visual.hovered == Some(element) {
        return Emphasis::Hover;
    }
    Emphasis::Normal
}

pub fn compute_frame(
    config: &ClockConfig,
    visual: &ClockVisualState,
    slots: &SlotEntry,
    layout: ClockLayout,
) -> RenderPlan {
    let center = layout.center;
    let radius = layout.radius();

    let face = Face {
        center,
        radius,
        rim_width: (layout.diameter * 0.025).max(2.0),
        emphasis: if visual.face_called_out() { Emphasis::CallOut } else { Emphasis::Normal },
    };

    let ticks = (0..60)
        .map(|i| {
            let major = i % 5 == 0;
            let angle = i as f64 * 6.0;
            let outer = radius - face.rim_width;
            let inner = outer - layout.diameter * if major { 0.05 } else { 0.025 };
            Tick {
                from: geometry::polar(center, inner, angle),
                to: geometry::polar(center, outer, angle),
                major,
            }
        })
        .collect();

    let numbers = if config.numbers {
        (1..=12u8)
            .map(|n| {
                let kind = if config.is_blank(n) {
                    NumeralKind::Slot {
                        entry: slots.value(n),
                        selected: slots.selected() == Some(n),
                        verdict: slots.verdict(n),
                    }
                } else {
                    NumeralKind::Text
                };
                Numeral {
                    value: n,
                    pos: geometry::polar(center, layout.number_radius(), geometry::number_angle(n)),
                    size: layout.diameter * 0.075,
                    kind,
                    emphasis: emphasis_for(visual, ElementRef::Number(n)),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let base = (config.hour % 12) as f64 * 60.0 + config.minute as f64;
    let (hour_deg, minute_deg) = hand_angles(base + visual.animation_offset);
    let hands = [(Hand::Hour, hour_deg), (Hand::Minute, minute_deg)]
        .into_iter()
        .filter(|(hand, _)| config.shows_hand(*hand))
        .map(|(hand, angle)| {
            let length = layout.hand_length(hand);
            HandStroke {
                hand,
                angle,
                tip: geometry::polar(center, length, angle),
                length,
                width: layout.hand_width(hand),
                emphasis: emphasis_for(visual, ElementRef::Hand(hand)),
            }
        })
        .collect();

    let arrows = config
        .arrows
        .iter()
        .map(|&direction| ArrowGlyph {
            direction,
            anchor: layout.arrow_anchor(direction),
            size: layout.arrow_size(),
            emphasis: emphasis_for(visual, ElementRef::Arrow(direction)),
        })
        .collect();

    RenderPlan {
        layout,
        face,
        ticks,
        numbers,
        hands,
        arrows,
        center_dot: (center, layout.diameter * 0.03),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Highlight;
    use crate::state::ClickFeedback;

    fn layout() -> ClockLayout {
        ClockLayout { center: Point::new(200.0, 200.0), diameter: 300.0 }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn frame_has_sixty_ticks_and_twelve_numbers() {
        let plan = compute_frame(&ClockConfig::default(), &ClockVisualState::default(), &SlotEntry::default(), layout());
        assert_eq!(plan.ticks.len(), 60);
        assert_eq!(plan.ticks.iter().filter(|t| t.major).count(), 12);
        assert_eq!(plan.numbers.len(), 12);
        assert_eq!(plan.hands.len(), 2);
        assert_eq!(plan.hands[1].hand, Hand::Minute);
    }

    #[test]
    fn hands_point_at_configured_time() {
        let cfg = ClockConfig { hour: 3, minute: 30, ..Default::default() };
        let plan = compute_frame(&cfg, &ClockVisualState::default(), &SlotEntry::default(), layout());
        assert!(close(plan.hand(Hand::Hour).unwrap().angle, 105.0));
        let minute = plan.hand(Hand::Minute).unwrap();
        assert!(close(minute.angle, 180.0));
        assert!(close(minute.tip.x, 200.0) && close(minute.tip.y, 200.0 + 120.0));
    }

    #[test]
    fn animation_offset_moves_both_hands() {
        let cfg = ClockConfig { hour: 12, minute: 0, ..Default::default() };
        let visual = ClockVisualState { animation_offset: 15.0, ..Default::default() };
        let plan = compute_frame(&cfg, &visual, &SlotEntry::default(), layout());
        assert!(close(plan.hand(Hand::Minute).unwrap().angle, 90.0));
        assert!(close(plan.hand(Hand::Hour).unwrap().angle, 7.5));
    }

    #[test]
    fn click_feedback_beats_callout_beats_hover() {
        let hour = ElementRef::Hand(Hand::Hour);
        let mut visual = ClockVisualState { hovered: Some(hour), ..Default::default() };
        let frame = |v: &ClockVisualState| {
            compute_frame(&ClockConfig::default(), v, &SlotEntry::default(), layout())
                .hand(Hand::Hour)
                .unwrap()
                .emphasis
        };
        assert_eq!(frame(&visual), Emphasis::Hover);
        visual.start_blink(Highlight::Element(hour));
        assert_eq!(frame(&visual), Emphasis::CallOut);
        visual.click_feedback = Some(ClickFeedback { element: hour, correct: false });
        assert_eq!(frame(&visual), Emphasis::Incorrect);
        visual.click_feedback = None;
        visual.toggle_blink();
        assert_eq!(frame(&visual), Emphasis::Hover);
    }

    #[test]
    fn blank_numbers_become_slots_with_entries() {
        let cfg = ClockConfig { blank_numbers: vec![2, 5], ..Default::default() };
        let mut slots = SlotEntry::new(&[2, 5]);
        slots.select(5);
        slots.enter(5);
        let plan = compute_frame(&cfg, &ClockVisualState::default(), &slots, layout());
        let five = plan.numbers.iter().find(|n| n.value == 5).unwrap();
        assert_eq!(five.kind, NumeralKind::Slot { entry: Some(5), selected: true, verdict: None });
        let three = plan.numbers.iter().find(|n| n.value == 3).unwrap();
        assert_eq!(three.kind, NumeralKind::Text);
    }

    #[test]
    fn hidden_parts_are_left_out() {
        let cfg = ClockConfig {
            numbers: false,
            hands: vec![Hand::Hour],
            arrows: vec![Direction::Clockwise, Direction::Counterclockwise],
            ..Default::default()
        };
        let plan = compute_frame(&cfg, &ClockVisualState::default(), &SlotEntry::default(), layout());
        assert!(plan.numbers.is_empty());
        assert!(plan.hand(Hand::Minute).is_none());
        assert_eq!(plan.arrows.len(), 2);
        assert!(plan.arrows[0].anchor.x > plan.arrows[1].anchor.x);
    }
}
