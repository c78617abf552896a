use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in surface pixels; `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.left
            && point.x < self.right
            && point.y >= self.top
            && point.y < self.bottom
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Shrinks by `dx`/`dy` on each side; negative values grow the rect.
    pub fn inset(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right - dx,
            self.bottom - dy,
        )
    }

    /// Smallest rect enclosing both; an empty operand contributes nothing.
    pub fn union(&self, other: &Rect) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    pub fn round(&self) -> IntRect {
        IntRect::new(
            self.left.round() as i32,
            self.top.round() as i32,
            self.right.round() as i32,
            self.bottom.round() as i32,
        )
    }
}

/// Whole-pixel rectangle, used for complication slots and highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl IntRect {
    pub const EMPTY: IntRect = IntRect {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left as f32,
            self.top as f32,
            self.right as f32,
            self.bottom as f32,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        self.to_rect().contains(point)
    }

    pub fn intersects(&self, other: &IntRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Rotates `point` by `degrees` about `center`, in y-down surface
/// coordinates (positive angles turn clockwise on screen).
pub fn rotate_point(point: Point, center: Point, degrees: f32) -> Point {
    let radians = f64::from(degrees).to_radians();
    let (sin, cos) = radians.sin_cos();
    let dx = f64::from(point.x - center.x);
    let dy = f64::from(point.y - center.y);
    Point::new(
        center.x + (dx * cos - dy * sin) as f32,
        center.y + (dx * sin + dy * cos) as f32,
    )
}

/// Highlight outline: a rect with rounded corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundedOutline {
    pub rect: IntRect,
    pub corner_radius: f32,
}

impl RoundedOutline {
    pub const CORNER_RADIUS: f32 = 10.0;

    pub fn new(rect: IntRect) -> Self {
        Self {
            rect,
            corner_radius: Self::CORNER_RADIUS,
        }
    }

    /// Corner radius clamped so opposite corners never overlap.
    pub fn effective_radius(&self) -> f32 {
        let limit = (self.rect.width().min(self.rect.height()) as f32 / 2.0).max(0.0);
        self.corner_radius.min(limit)
    }
}
