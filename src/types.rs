#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Unit vector pointing along `angle` (radians, y grows downward).
    pub fn from_angle(angle: f64) -> Self {
        Vector2D::new(angle.cos(), angle.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }
}

/// Axis-aligned rectangle stored by its centre, like a sprite rect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub center: Vector2D,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn centered(center: Vector2D, width: f64, height: f64) -> Self {
        Rect { center, width, height }
    }

    pub fn left(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.center.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center.y + self.height / 2.0
    }

    /// Edges that merely touch do not count as overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

pub fn circles_touch(a: Vector2D, a_radius: f64, b: Vector2D, b_radius: f64) -> bool {
    let reach = a_radius + b_radius;
    a.sub(b).length_squared() <= reach * reach
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::centered(Vector2D::new(0.0, 0.0), 10.0, 10.0);
        let b = Rect::centered(Vector2D::new(8.0, 8.0), 10.0, 10.0);
        let c = Rect::centered(Vector2D::new(10.0, 0.0), 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Sharing an edge is not an overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_circles_touch() {
        let a = Vector2D::new(0.0, 0.0);
        assert!(circles_touch(a, 5.0, Vector2D::new(9.0, 0.0), 5.0));
        assert!(!circles_touch(a, 5.0, Vector2D::new(7.0, 8.0), 5.0));
    }

    #[test]
    fn test_from_angle_points_down_at_half_pi() {
        let v = Vector2D::from_angle(std::f64::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 1.0).abs() < 1e-9);
    }
}
