// Transient per-frame render inputs for the active step
use crate::model::{Direction, ElementRef, Highlight};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickFeedback {
    pub element: ElementRef,
    pub correct: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClockVisualState {
    pub hovered: Option<ElementRef>,
    pub click_feedback: Option<ClickFeedback>,
    /// Call-out that toggles on the blink interval.
    pub blinking: Option<Highlight>,
    pub blink_visible: bool,
    /// Numeral currently lit by a sequential sweep.
    pub sweep: Option<u8>,
    /// Animated hand position, in clock minutes past the configured time.
    pub animation_offset: f64,
    pub motion: Option<Direction>,
}

impl ClockVisualState {
    /// Minutes of clock time covered per rendered frame while animating.
    pub const MINUTES_PER_FRAME: f64 = 1.0;

    pub fn reset(&mut self) {
        *self = ClockVisualState::default();
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    pub fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    /// Advances the hand animation by one frame. Returns false when no
    /// motion is requested.
    pub fn step_animation(&mut self) -> bool {
        let Some(dir) = self.motion else {
            return false;
        };
        self.animation_offset = (self.animation_offset + dir.sign() * Self::MINUTES_PER_FRAME) % 720.0;
        true
    }

    pub fn start_blink(&mut self, callout: Highlight) {
        self.blinking = Some(callout);
        self.blink_visible = true;
    }

    pub fn toggle_blink(&mut self) {
        if self.blinking.is_some() {
            self.blink_visible = !self.blink_visible;
        }
    }

    /// Moves the sweep to the next numeral; returns false once 12 is done.
    pub fn step_sweep(&mut self) -> bool {
        match self.sweep {
            Some(n) if n < 12 => {
                self.sweep = Some(n + 1);
                true
            }
            _ => {
                self.sweep = None;
                false
            }
        }
    }

    /// Whether the call-out currently emphasises `element`.
    pub fn calls_out(&self, element: ElementRef) -> bool {
        if let (Some(n), ElementRef::Number(m)) = (self.sweep, element) {
            if n == m {
                return true;
            }
        }
        if !self.blink_visible {
            return false;
        }
        match (&self.blinking, element) {
            (Some(Highlight::Element(e)), _) => *e == element,
            (Some(Highlight::BothHands), ElementRef::Hand(_)) => true,
            _ => false,
        }
    }

    pub fn face_called_out(&self) -> bool {
        self.blink_visible && matches!(self.blinking, Some(Highlight::Face))
    }
}
