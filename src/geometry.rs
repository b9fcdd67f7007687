//! Clock-face geometry.
//!
//! Angles are in degrees with 12 o'clock pointing up and increasing
//! clockwise. Canvas coordinates have y growing downwards.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Wraps any angle into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg % 360.0;
    if d < 0.0 { d + 360.0 } else { d }
}

/// Hour-hand angle: `(hour mod 12) + minute/60` over 0..12 mapped to 0..360.
pub fn hour_angle(hour: u8, minute: u8) -> f64 {
    ((hour % 12) as f64 + minute as f64 / 60.0) * 30.0
}

/// Minute-hand angle: 0..60 mapped to 0..360.
pub fn minute_angle(minute: u8) -> f64 {
    (minute % 60) as f64 * 6.0
}

/// Angle at which the numeral `n` (1..=12) sits on the dial.
pub fn number_angle(n: u8) -> f64 {
    (n % 12) as f64 * 30.0
}

/// Point at `radius` from `center` along a clock angle.
pub fn polar(center: Point, radius: f64, angle_deg: f64) -> Point {
    let rad = angle_deg.to_radians();
    Point::new(center.x + radius * rad.sin(), center.y - radius * rad.cos())
}

/// Distance from `p` to the closed segment `a..b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
