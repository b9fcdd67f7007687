// Small helpers shared by the components

use web_sys::HtmlCanvasElement;

use crate::geometry::Point;

/// Converts client (viewport) coordinates to canvas pixels.
pub fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Point {
    let rect = canvas.get_bounding_client_rect();
    let sx = if rect.width() > 0.0 { canvas.width() as f64 / rect.width() } else { 1.0 };
    let sy = if rect.height() > 0.0 { canvas.height() as f64 / rect.height() } else { 1.0 };
    Point::new((client_x as f64 - rect.left()) * sx, (client_y as f64 - rect.top()) * sy)
}

/// "3/4 (75%)" style score line.
pub fn score_line(score: usize, total: usize, percent: u32) -> String {
    format!("{score}/{total} ({percent}%)")
}

/// Keyboard digit, if the key is one.
pub fn digit_key(key: &str) -> Option<u8> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_single_digit_keys_count() {
        assert_eq!(digit_key("7"), Some(7));
        assert_eq!(digit_key("0"), Some(0));
        assert_eq!(digit_key("F1"), None);
        assert_eq!(digit_key("a"), None);
        assert_eq!(digit_key(""), None);
    }

    #[test]
    fn score_line_format() {
        assert_eq!(score_line(3, 4, 75), "3/4 (75%)");
    }
}
