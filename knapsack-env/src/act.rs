//! Action of the knapsack game.
use knapsack_core::Act;

/// A pair of signals, each interpreted by its sign.
///
/// `move_signal > 0` moves the cursor left, otherwise right.
/// `membership_signal > 0` puts the current item in the knapsack, otherwise
/// takes it out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnapsackAct {
    /// Direction of the cursor move.
    pub move_signal: f32,

    /// Membership of the current item.
    pub membership_signal: f32,
}

impl KnapsackAct {
    /// Constructs an action.
    pub fn new(move_signal: f32, membership_signal: f32) -> Self {
        Self {
            move_signal,
            membership_signal,
        }
    }

    /// Returns `true` if the cursor moves left.
    pub fn moves_left(&self) -> bool {
        self.move_signal > 0.0
    }

    /// Returns `true` if the current item is put in the knapsack.
    pub fn puts_in(&self) -> bool {
        self.membership_signal > 0.0
    }
}

impl Act for KnapsackAct {
    fn len(&self) -> usize {
        2
    }
}

impl From<[f32; 2]> for KnapsackAct {
    fn from([move_signal, membership_signal]: [f32; 2]) -> Self {
        Self::new(move_signal, membership_signal)
    }
}

impl From<KnapsackAct> for [f32; 2] {
    fn from(act: KnapsackAct) -> Self {
        [act.move_signal, act.membership_signal]
    }
}
