use std::fmt;

/// Scroll position of a scrollable surface, in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScrollOffset {
    /// Rows scrolled past the top edge.
    pub y: usize,
    /// Columns scrolled past the left edge.
    pub x: usize,
}

impl ScrollOffset {
    pub const ZERO: Self = Self { y: 0, x: 0 };

    pub const fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }

    /// Applies a signed delta, saturating at zero and at `max` on each axis.
    pub fn offset_by(self, delta: ScrollDelta, max: ScrollOffset) -> Self {
        Self {
            y: apply_delta(self.y, delta.dy, max.y),
            x: apply_delta(self.x, delta.dx, max.x),
        }
    }

    pub fn clamp(self, max: ScrollOffset) -> Self {
        Self {
            y: self.y.min(max.y),
            x: self.x.min(max.x),
        }
    }
}

impl fmt::Display for ScrollOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.y, self.x)
    }
}

/// Signed scroll request, in rows (`dy`) and columns (`dx`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollDelta {
    pub dy: i32,
    pub dx: i32,
}

impl ScrollDelta {
    pub const fn new(dy: i32, dx: i32) -> Self {
        Self { dy, dx }
    }

    pub fn is_zero(self) -> bool {
        self.dy == 0 && self.dx == 0
    }
}

/// Largest offset that keeps a viewport inside its content on one axis.
pub fn max_offset(content: usize, viewport: usize) -> usize {
    content.saturating_sub(viewport)
}

/// Smallest adjustment of `offset` that brings `[start, start + len)` into a
/// viewport of `viewport` cells.
pub fn reveal(offset: usize, viewport: usize, start: usize, len: usize) -> usize {
    if viewport == 0 {
        return offset;
    }
    let end = start + len.max(1);
    if start < offset {
        start
    } else if end > offset + viewport {
        end.saturating_sub(viewport)
    } else {
        offset
    }
}

fn apply_delta(current: usize, delta: i32, max: usize) -> usize {
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        current.saturating_add(delta as usize)
    };
    next.min(max)
}
