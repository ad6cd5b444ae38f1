//! Geometric primitives for widget bounds.
//!
//! Uses screen coordinates (origin at top-left). Bounds coming from UI-tree
//! snapshots may be missing or degenerate; [`get_rect`] normalizes both cases
//! to the shared [`rect_zero`] sentinel so callers never branch on absence.

use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::hash::{mix64, ContentHasher, HashCode, HashNode};

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl HashNode for Point {
    /// Packs both coordinates into one word before mixing, so distinct points
    /// never collide.
    fn hash_code(&self) -> HashCode {
        let packed = (u64::from(self.x as u32) << 32) | u64::from(self.y as u32);
        mix64(packed)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// An axis-aligned bounding box.
///
/// Edges are stored as absolute coordinates. `right`/`bottom` are part of the
/// box for [`Rect::contains`], matching how UI trees report bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// The "no rectangle" value.
    pub const ZERO: Rect = Rect::new(0, 0, 0, 0);

    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// True when the box has no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Boundary-inclusive containment test.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        self.left <= point.x
            && point.x <= self.right
            && self.top <= point.y
            && point.y <= self.bottom
    }

    /// Midpoint of the box, truncating toward zero.
    ///
    /// Computed in 64-bit so edges near `i32::MAX` cannot overflow.
    #[must_use]
    pub const fn center(&self) -> Point {
        let x = (self.left as i64 + self.right as i64) / 2;
        let y = (self.top as i64 + self.bottom as i64) / 2;
        Point::new(x as i32, y as i32)
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }
}

impl HashNode for Rect {
    fn hash_code(&self) -> HashCode {
        ContentHasher::new()
            .write_i32(self.left)
            .write_i32(self.top)
            .write_i32(self.right)
            .write_i32(self.bottom)
            .finish()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}][{},{}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

static RECT_ZERO: LazyLock<Arc<Rect>> = LazyLock::new(|| Arc::new(Rect::ZERO));

/// The shared zero-rectangle sentinel.
///
/// Every call returns a handle to the same allocation.
#[must_use]
pub fn rect_zero() -> Arc<Rect> {
    Arc::clone(&RECT_ZERO)
}

/// Normalize optional bounds.
///
/// Returns the zero sentinel when `rect` is absent or empty, otherwise the
/// given handle itself (no copy).
#[must_use]
pub fn get_rect(rect: Option<&Arc<Rect>>) -> Arc<Rect> {
    match rect {
        Some(rect) if !rect.is_empty() => Arc::clone(rect),
        _ => rect_zero(),
    }
}
