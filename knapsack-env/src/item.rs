//! Items of the knapsack game.
use serde::{Deserialize, Serialize};

/// An item of the game. Its identity is its position in the item set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Cost, counted against the budget when the item is in the knapsack.
    pub cost: f32,

    /// Value, counted when the item is in the knapsack.
    pub value: f32,

    /// Whether the item is in the knapsack.
    pub in_knapsack: bool,

    /// The number of steps the cursor has been on this item.
    pub visit_count: u32,
}

impl Item {
    /// Creates an item outside the knapsack that has never been visited.
    pub fn new(cost: f32, value: f32) -> Self {
        Self {
            cost,
            value,
            in_knapsack: false,
            visit_count: 0,
        }
    }

    /// Return on investment, `value / cost`.
    ///
    /// # Panics
    ///
    /// Panics if the cost is zero.
    pub fn roi(&self) -> f32 {
        assert!(self.cost != 0.0, "return on investment of an item with zero cost");
        self.value / self.cost
    }
}
