/// Common geometry primitives shared across layout, the renderer and the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    /// Creates a new rectangle located at `(x, y)` with the given dimensions.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> usize {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> usize {
        self.y.saturating_add(self.height)
    }

    /// Returns the overlapping region between two rectangles.
    ///
    /// The resulting rectangle collapses to zero width or height when the inputs
    /// do not overlap on a given axis.
    pub fn intersection(self, other: Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);

        let width = self.right().min(other.right()).saturating_sub(x);
        let height = self.bottom().min(other.bottom()).saturating_sub(y);

        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrinks the rectangle by the given amounts on each side.
    pub fn inset(self, top: usize, right: usize, bottom: usize, left: usize) -> Self {
        let width = self.width.saturating_sub(left + right);
        let height = self.height.saturating_sub(top + bottom);
        Self {
            x: self.x + left.min(self.width),
            y: self.y + top.min(self.height),
            width,
            height,
        }
    }

    pub fn contains(self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Indicates whether the rectangle encloses any area.
    pub fn has_area(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_disjoint_rects_has_no_area() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(10, 10, 2, 2);

        assert!(!a.intersection(b).has_area());
    }

    #[test]
    fn inset_saturates_on_small_rects() {
        let rect = Rect::new(2, 3, 2, 1).inset(1, 1, 1, 1);

        assert_eq!(rect.width, 0);
        assert_eq!(rect.height, 0);
    }

    #[test]
    fn contains_excludes_far_edges() {
        let rect = Rect::new(1, 1, 3, 2);

        assert!(rect.contains(Point::new(1, 1)));
        assert!(rect.contains(Point::new(3, 2)));
        assert!(!rect.contains(Point::new(4, 1)));
        assert!(!rect.contains(Point::new(1, 3)));
    }
}
