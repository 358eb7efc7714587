//! Cursor walking over the item set.
use serde::{Deserialize, Serialize};

/// Position of the cursor and the step size of its walk.
///
/// The walk resembles a binary search: the stride halves on every move, and
/// when it collapses below 2 the cursor is re-centered at `n / 2`. The
/// displacement accumulated from the center is at most `n / 2 - 1`, so the
/// index always stays in `[0, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Index of the item pointed at.
    pub index: usize,

    /// Current step size.
    pub stride: usize,
}

impl Cursor {
    /// `{index: 0, stride: 0}`.
    pub fn origin() -> Self {
        Self::default()
    }

    /// `{index: n / 2, stride: n / 2}`.
    pub fn midpoint(n: usize) -> Self {
        Self {
            index: n / 2,
            stride: n / 2,
        }
    }

    /// Moves the cursor left or right over `n` items.
    pub fn advance(&mut self, left: bool, n: usize) {
        if self.stride < 2 {
            *self = Self::midpoint(n);
        }
        let stride = self.stride / 2;
        self.index = if left {
            self.index - stride
        } else {
            self.index + stride
        };
        self.stride = stride;

        debug_assert!(self.index < n.max(1));
    }
}
