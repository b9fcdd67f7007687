use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::geometry::{self, Point};
use crate::model::{Direction, Hand};
use crate::render::{ArrowGlyph, Emphasis, HandStroke, Numeral, NumeralKind, RenderPlan};

const BACKGROUND: &str = "#FFFFFF";
const FACE: &str = "#FDF8E1";
const RIM: &str = "#0077CC";
const NUMBERS: &str = "#005999";
const CENTER: &str = "#FFA500";
const HOUR: &str = "#005999";
const MINUTE: &str = "#E63946";
const ARROW: &str = "#3A7D44";
const HOVER: &str = "#4DA3FF";
const HIGHLIGHT: &str = "#FDB813";
const CORRECT: &str = "#5CB85C";
const INCORRECT: &str = "#E63946";

fn tint(emphasis: Emphasis, base: &'static str) -> &'static str {
    match emphasis {
        Emphasis::Normal => base,
        Emphasis::Hover => HOVER,
        Emphasis::CallOut => HIGHLIGHT,
        Emphasis::Correct => CORRECT,
        Emphasis::Incorrect => INCORRECT,
    }
}

/// Canvas radians for a clock angle (0 at 12, clockwise).
fn radians(deg: f64) -> f64 {
    (deg - 90.0).to_radians()
}

pub fn paint(ctx: &CanvasRenderingContext2d, plan: &RenderPlan, width: f64, height: f64) -> Result<(), JsValue> {
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, width, height);

    let face = &plan.face;
    ctx.begin_path();
    ctx.arc(face.center.x, face.center.y, face.radius - face.rim_width / 2.0, 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str(FACE);
    ctx.fill();
    ctx.set_line_width(if face.emphasis == Emphasis::Normal { face.rim_width } else { face.rim_width * 1.8 });
    ctx.set_stroke_style_str(tint(face.emphasis, RIM));
    ctx.stroke();

    ctx.set_stroke_style_str(NUMBERS);
    for tick in &plan.ticks {
        ctx.set_line_width(if tick.major { 3.0 } else { 1.0 });
        ctx.begin_path();
        ctx.move_to(tick.from.x, tick.from.y);
        ctx.line_to(tick.to.x, tick.to.y);
        ctx.stroke();
    }

    for numeral in &plan.numbers {
        paint_numeral(ctx, numeral)?;
    }
    for arrow in &plan.arrows {
        paint_arrow(ctx, arrow)?;
    }
    for hand in &plan.hands {
        paint_hand(ctx, plan.layout.center, hand);
    }

    let (center, r) = plan.center_dot;
    ctx.begin_path();
    ctx.arc(center.x, center.y, r, 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str(CENTER);
    ctx.fill();
    Ok(())
}

fn paint_numeral(ctx: &CanvasRenderingContext2d, n: &Numeral) -> Result<(), JsValue> {
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    match &n.kind {
        NumeralKind::Text => {
            if n.emphasis != Emphasis::Normal {
                ctx.begin_path();
                ctx.arc(n.pos.x, n.pos.y, n.size * 0.85, 0.0, 2.0 * PI)?;
                ctx.set_fill_style_str(tint(n.emphasis, FACE));
                ctx.fill();
            }
            ctx.set_font(&format!("bold {:.0}px sans-serif", n.size));
            ctx.set_fill_style_str(NUMBERS);
            ctx.fill_text(&n.value.to_string(), n.pos.x, n.pos.y)
        }
        NumeralKind::Slot { entry, selected, verdict } => {
            let side = n.size * 1.4;
            let (x, y) = (n.pos.x - side / 2.0, n.pos.y - side / 2.0);
            ctx.set_fill_style_str(match verdict {
                Some(true) => "#DFF0D8",
                Some(false) => "#F8D7DA",
                None => "#FFFFFF",
            });
            ctx.fill_rect(x, y, side, side);
            let rim = match verdict {
                Some(true) => CORRECT,
                Some(false) => INCORRECT,
                None if *selected => HIGHLIGHT,
                None => tint(n.emphasis, RIM),
            };
            ctx.set_line_width(if *selected { 3.0 } else { 2.0 });
            ctx.set_stroke_style_str(rim);
            ctx.stroke_rect(x, y, side, side);
            match entry {
                Some(v) => {
                    ctx.set_font(&format!("bold {:.0}px sans-serif", n.size));
                    ctx.set_fill_style_str(NUMBERS);
                    ctx.fill_text(&v.to_string(), n.pos.x, n.pos.y)
                }
                None => Ok(()),
            }
        }
    }
}

fn paint_hand(ctx: &CanvasRenderingContext2d, center: Point, hand: &HandStroke) {
    let base = match hand.hand {
        Hand::Hour => HOUR,
        Hand::Minute => MINUTE,
    };
    ctx.set_line_cap("round");
    if hand.emphasis != Emphasis::Normal {
        ctx.set_line_width(hand.width * 2.2);
        ctx.set_stroke_style_str(tint(hand.emphasis, base));
        ctx.begin_path();
        ctx.move_to(center.x, center.y);
        ctx.line_to(hand.tip.x, hand.tip.y);
        ctx.stroke();
    }
    ctx.set_line_width(hand.width);
    ctx.set_stroke_style_str(base);
    ctx.begin_path();
    ctx.move_to(center.x, center.y);
    ctx.line_to(hand.tip.x, hand.tip.y);
    ctx.stroke();
    ctx.set_line_cap("butt");
}

/// Curved arrow around its anchor, head pointing in the arrow's direction.
fn paint_arrow(ctx: &CanvasRenderingContext2d, arrow: &ArrowGlyph) -> Result<(), JsValue> {
    let r = arrow.size;
    let c = arrow.anchor;
    let (from, to) = (-120.0, 120.0);
    let (start, end, anticlockwise) = match arrow.direction {
        Direction::Clockwise => (radians(from), radians(to), false),
        Direction::Counterclockwise => (radians(-from), radians(-to), true),
    };
    let color = tint(arrow.emphasis, ARROW);
    ctx.set_line_width((r * 0.28).max(2.0));
    ctx.set_stroke_style_str(color);
    ctx.begin_path();
    ctx.arc_with_anticlockwise(c.x, c.y, r, start, end, anticlockwise)?;
    ctx.stroke();

    // Arrow head at the end of the arc, along its tangent.
    let tip_deg = match arrow.direction {
        Direction::Clockwise => to,
        Direction::Counterclockwise => -to,
    };
    let tip = geometry::polar(c, r, tip_deg);
    let tangent = radians(tip_deg) + arrow.direction.sign() * PI / 2.0;
    let head = r * 0.55;
    ctx.set_fill_style_str(color);
    ctx.begin_path();
    ctx.move_to(tip.x + head * tangent.cos(), tip.y + head * tangent.sin());
    for spread in [2.5_f64, -2.5] {
        let a = tangent + spread;
        ctx.line_to(tip.x + head * 0.7 * a.cos(), tip.y + head * 0.7 * a.sin());
    }
    ctx.close_path();
    ctx.fill();
    Ok(())
}
