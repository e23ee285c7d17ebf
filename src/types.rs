//! Core types for spark-layout.
//!
//! Geometry shared by the layout resolver and the window stack. All
//! coordinates are signed terminal cells relative to the parent's content
//! area; sizes are never negative.

// =============================================================================
// Size
// =============================================================================

/// A width/height pair in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a size, clamping negative inputs to 0.
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    pub const ZERO: Self = Self { width: 0, height: 0 };

    /// Extent along one axis.
    #[inline]
    pub const fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

// =============================================================================
// Rect
// =============================================================================

/// A resolved rectangle (the element's "frame").
///
/// Invariant: `width >= 0 && height >= 0`. Every constructor clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a rect, clamping negative width/height to 0.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Check if a point is inside this rect.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by an adornment thickness, never below zero size.
    pub fn inset(&self, thickness: Thickness) -> Self {
        Self::new(
            self.x.saturating_add(thickness.left),
            self.y.saturating_add(thickness.top),
            self.width.saturating_sub(thickness.horizontal()),
            self.height.saturating_sub(thickness.vertical()),
        )
    }
}

// =============================================================================
// Thickness - border / margin / padding
// =============================================================================

/// Per-side thickness of an adornment (margin, border or padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Thickness {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Thickness {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Same thickness on every side.
    pub const fn uniform(n: i32) -> Self {
        Self::new(n, n, n, n)
    }

    pub const ZERO: Self = Self::uniform(0);

    #[inline]
    pub const fn horizontal(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    #[inline]
    pub const fn vertical(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }
}

impl std::ops::Add for Thickness {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

// =============================================================================
// Axis / Side
// =============================================================================

/// Layout axis. Position-X and Width resolve on `Horizontal`, Y and Height on
/// `Vertical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Edge of another element's frame that a relative position anchors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// `x`
    Left,
    /// `y`
    Top,
    /// `x + width`
    Right,
    /// `y + height`
    Bottom,
}

impl Side {
    /// Read this side off a resolved frame.
    #[inline]
    pub const fn of(self, frame: &Rect) -> i32 {
        match self {
            Side::Left => frame.x,
            Side::Top => frame.y,
            Side::Right => frame.right(),
            Side::Bottom => frame.bottom(),
        }
    }
}
