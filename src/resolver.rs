//! Pointer hit-testing against a [`RenderPlan`].
//!
//! The resolver only reports *what* lies under the pointer among the
//! elements of the target's category; whether that is the right answer is
//! decided by the session.

use crate::geometry::{self, Point};
use crate::model::{ElementRef, Hand, Target};
use crate::render::{NumeralKind, RenderPlan};

/// Arrow hit radius as a multiple of the glyph size.
const ARROW_REACH: f64 = 1.5;

pub fn hit_test(point: Point, target: &Target, plan: &RenderPlan) -> Option<ElementRef> {
    match target {
        Target::Number(_) => hit_number(point, plan, false),
        Target::Slots => hit_number(point, plan, true),
        Target::Hand(_) => hit_hand(point, plan),
        Target::Arrow(_) => plan
            .arrows
            .iter()
            .find(|a| point.distance(a.anchor) < a.size * ARROW_REACH)
            .map(|a| ElementRef::Arrow(a.direction)),
        Target::None => None,
    }
}

/// Hover lookup; nothing is hovered unless a target is armed.
pub fn resolve_hover(point: Point, armed: Option<&Target>, plan: &RenderPlan) -> Option<ElementRef> {
    armed.and_then(|t| hit_test(point, t, plan))
}

fn hit_number(point: Point, plan: &RenderPlan, slots: bool) -> Option<ElementRef> {
    let tolerance = plan.layout.number_tolerance();
    plan.numbers
        .iter()
        .filter(|n| matches!(n.kind, NumeralKind::Slot { .. }) == slots)
        .find(|n| point.distance(n.pos) < tolerance)
        .map(|n| ElementRef::Number(n.value))
}

fn hit_hand(point: Point, plan: &RenderPlan) -> Option<ElementRef> {
    let tolerance = plan.layout.hand_tolerance();
    let center = plan.layout.center;
    // Minute hand is drawn on top, so it wins where the two overlap.
    [Hand::Minute, Hand::Hour].into_iter().find_map(|hand| {
        let stroke = plan.hand(hand)?;
        let near_shaft = geometry::distance_to_segment(point, center, stroke.tip) < tolerance;
        let within_reach = point.distance(center) <= stroke.length + tolerance;
        (near_shaft && within_reach).then_some(ElementRef::Hand(hand))
    })
}
