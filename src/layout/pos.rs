//! Position expressions.
//!
//! A [`Pos`] describes where an element sits along one axis, relative to its
//! container's content area or to a sibling's resolved frame. Expressions
//! compose with `+` and `-`:
//!
//! ```ignore
//! use spark_layout::layout::Pos;
//!
//! // One cell to the right of `label`
//! let x = Pos::right(label) + 1;
//! // Three cells from the bottom edge
//! let y = Pos::anchor_end(3);
//! ```

use std::ops::{Add, Sub};

use crate::engine::{ElementId, ElementTree};
use crate::error::LayoutError;
use crate::types::Side;

/// How the two operands of a `Combine` expression are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Subtract,
}

impl Op {
    #[inline]
    pub const fn apply(self, left: i32, right: i32) -> i32 {
        match self {
            Op::Add => left.saturating_add(right),
            Op::Subtract => left.saturating_sub(right),
        }
    }
}

/// Position expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Pos {
    /// Fixed offset from the container origin.
    Absolute(i32),
    /// `offset` cells before the container's far edge.
    AnchorEnd(i32),
    /// Centered; the resolver sizes the element first, then centers it.
    Center,
    /// Percentage (0-100) of the container extent. With `from_remaining`, of
    /// the extent left after the running offset.
    Percent { percent: f32, from_remaining: bool },
    /// A side of another element's resolved frame.
    Relative { target: ElementId, side: Side },
    Combine(Box<Pos>, Box<Pos>, Op),
}

impl Default for Pos {
    fn default() -> Self {
        Pos::Absolute(0)
    }
}

impl From<i32> for Pos {
    fn from(value: i32) -> Self {
        Pos::Absolute(value)
    }
}

impl Pos {
    pub const fn at(n: i32) -> Self {
        Pos::Absolute(n)
    }

    pub const fn anchor_end(offset: i32) -> Self {
        Pos::AnchorEnd(offset)
    }

    pub const fn center() -> Self {
        Pos::Center
    }

    pub const fn percent(percent: f32) -> Self {
        Pos::Percent {
            percent,
            from_remaining: false,
        }
    }

    pub const fn percent_of_remaining(percent: f32) -> Self {
        Pos::Percent {
            percent,
            from_remaining: true,
        }
    }

    pub const fn left(target: ElementId) -> Self {
        Pos::Relative {
            target,
            side: Side::Left,
        }
    }

    pub const fn top(target: ElementId) -> Self {
        Pos::Relative {
            target,
            side: Side::Top,
        }
    }

    pub const fn right(target: ElementId) -> Self {
        Pos::Relative {
            target,
            side: Side::Right,
        }
    }

    pub const fn bottom(target: ElementId) -> Self {
        Pos::Relative {
            target,
            side: Side::Bottom,
        }
    }

    #[inline]
    pub fn is_absolute(&self) -> bool {
        matches!(self, Pos::Absolute(_))
    }

    /// Evaluate against a container extent.
    ///
    /// `offset` is the location already accumulated by an enclosing additive
    /// `Combine` (0 at the top level); only `Percent { from_remaining: true }`
    /// reads it. `Center` yields `container / 2` here; centering an element of
    /// known size is the resolver's job.
    pub fn resolve(&self, container: i32, offset: i32, tree: &ElementTree) -> Result<i32, LayoutError> {
        Ok(match self {
            Pos::Absolute(n) => *n,
            Pos::AnchorEnd(offset_from_end) => container.saturating_sub(*offset_from_end),
            Pos::Center => container.div_euclid(2),
            Pos::Percent {
                percent,
                from_remaining,
            } => {
                let base = if *from_remaining {
                    container.saturating_sub(offset)
                } else {
                    container
                };
                percent_of(base, *percent)
            }
            Pos::Relative { target, side } => side.of(&tree.require(*target)?.frame()),
            Pos::Combine(left, right, op) => {
                let l = left.resolve(container, offset, tree)?;
                let right_offset = match op {
                    Op::Add => offset.saturating_add(l),
                    Op::Subtract => offset,
                };
                let r = right.resolve(container, right_offset, tree)?;
                op.apply(l, r)
            }
        })
    }

    /// Collect every element this expression reads, recursing into `Combine`.
    pub fn collect_references(&self, out: &mut Vec<ElementId>) {
        match self {
            Pos::Relative { target, .. } => out.push(*target),
            Pos::Combine(left, right, _) => {
                left.collect_references(out);
                right.collect_references(out);
            }
            Pos::Absolute(_) | Pos::AnchorEnd(_) | Pos::Center | Pos::Percent { .. } => {}
        }
    }
}

/// `floor(size * percent / 100)`.
#[inline]
pub(crate) fn percent_of(size: i32, percent: f32) -> i32 {
    (size as f32 * percent / 100.0).floor() as i32
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::Combine(Box::new(self), Box::new(rhs), Op::Add)
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos::Combine(Box::new(self), Box::new(rhs), Op::Subtract)
    }
}

impl Add<i32> for Pos {
    type Output = Pos;

    fn add(self, rhs: i32) -> Pos {
        self + Pos::Absolute(rhs)
    }
}

impl Sub<i32> for Pos {
    type Output = Pos;

    fn sub(self, rhs: i32) -> Pos {
        self - Pos::Absolute(rhs)
    }
}
