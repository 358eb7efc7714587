//! Observation of the knapsack game.
use knapsack_core::Obs;
use ndarray::{s, Array3, Array4, Axis};

/// Stacked observation frames, `[history_size, 2 sides, 2 membership, n_features]`.
///
/// Side `0` aggregates the items left of the cursor and side `1` the item
/// under the cursor and those right of it. Membership `0` aggregates items in
/// the knapsack and `1` those out of it. Frame `0` is the most recent one.
#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackObs(pub Array4<f32>);

impl KnapsackObs {
    /// Shape of the observation.
    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    /// The most recent frame.
    pub fn latest(&self) -> Array3<f32> {
        self.0.index_axis(Axis(0), 0).to_owned()
    }
}

impl Obs for KnapsackObs {
    fn flat_dim(&self) -> usize {
        self.0.len()
    }

    fn to_flat_vec(&self) -> Vec<f32> {
        self.0.iter().copied().collect()
    }
}

impl From<Array4<f32>> for KnapsackObs {
    fn from(arr: Array4<f32>) -> Self {
        Self(arr)
    }
}

/// A buffer of the most recent observation frames.
#[derive(Debug, Clone)]
pub(crate) struct ObsHistory {
    buffer: Array4<f32>,
}

impl ObsHistory {
    pub fn new(history_size: usize, n_features: usize) -> Self {
        Self {
            buffer: Array4::zeros((history_size, 2, 2, n_features)),
        }
    }

    /// Fills every slot with `frame`, invoked when resetting.
    pub fn fill(&mut self, frame: &Array3<f32>) {
        for mut dst in self.buffer.outer_iter_mut() {
            dst.assign(frame);
        }
    }

    /// Shifts frames `j <- j - 1` and puts `frame` in slot `0`.
    pub fn push(&mut self, frame: &Array3<f32>) {
        let n = self.buffer.len_of(Axis(0));
        for j in (1..n).rev() {
            let (mut dst, src) = self.buffer.multi_slice_mut((s![j, .., .., ..], s![j - 1, .., .., ..]));
            dst.assign(&src);
        }
        self.buffer.index_axis_mut(Axis(0), 0).assign(frame);
    }

    pub fn obs(&self) -> KnapsackObs {
        KnapsackObs(self.buffer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_shifts_frames() {
        let mut history = ObsHistory::new(3, 2);
        history.fill(&Array3::from_elem((2, 2, 2), 1.0));
        history.push(&Array3::from_elem((2, 2, 2), 2.0));
        history.push(&Array3::from_elem((2, 2, 2), 3.0));

        let obs = history.obs();
        assert_eq!(obs.shape(), &[3, 2, 2, 2]);
        assert_eq!(obs.latest(), Array3::from_elem((2, 2, 2), 3.0));
        assert_eq!(obs.0[[1, 0, 0, 0]], 2.0);
        assert_eq!(obs.0[[2, 1, 1, 1]], 1.0);
        assert_eq!(obs.flat_dim(), 24);
    }
}
