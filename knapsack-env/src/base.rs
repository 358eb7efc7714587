//! The knapsack game.
use crate::{
    obs::ObsHistory, util::pad_zeros, Cursor, CursorStart, Item, KnapsackAct, KnapsackConfig,
    KnapsackObs, ObsFeatures, ValuePolicy,
};
use anyhow::Result;
use knapsack_core::{
    record::{Record, RecordValue},
    Env, Step,
};
use log::trace;
use ndarray::{s, Array2, Array3, Axis};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// The sequential knapsack game.
///
/// At every step the agent decides whether the item under the cursor is in the
/// knapsack and whether the cursor moves left or right. The episode terminates
/// once the agent has not changed any membership for long enough, relative to
/// the depth of a binary search over the items. See [`Knapsack::step`] for
/// the details of a step.
///
/// The reward of a step is the change of [`Knapsack::value`] it caused, so the
/// undiscounted return of an episode equals its final score.
pub struct Knapsack {
    config: KnapsackConfig,
    rng: SmallRng,
    items: Vec<Item>,
    cursor: Cursor,
    idle_count: usize,
    total_visits: u32,
    tree_depth: usize,
    steps: usize,
    done: bool,
    history: ObsHistory,
}

impl Knapsack {
    /// Draws a new item set with the configured distributions.
    fn draw_items(&mut self) -> Vec<Item> {
        let range = self.config.item_count_range;
        let n = self.rng.gen_range(range.min..=range.max);
        let scale = self.config.cost_value_multiplier.map_or(1.0, |m| m / n as f32);
        let (cost_lo, cost_hi) = self.config.cost_range;
        let (value_lo, value_hi) = self.config.value_range;

        (0..n)
            .map(|_| {
                let cost = self.rng.gen_range(cost_lo..cost_hi) * scale;
                let value = self.rng.gen_range(value_lo..value_hi) * scale;
                Item::new(cost, value)
            })
            .collect()
    }

    /// Starts a new episode with the given items.
    ///
    /// Every counter and the cursor are reset, while the items are taken as
    /// they are, including their membership and visit counts.
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty.
    pub fn reset_with_items(&mut self, items: Vec<Item>) -> KnapsackObs {
        assert!(!items.is_empty(), "a knapsack game needs at least one item");
        let n = items.len();

        self.items = items;
        self.cursor = match self.config.cursor_start {
            CursorStart::Origin => Cursor::origin(),
            CursorStart::Midpoint => Cursor::midpoint(n),
        };
        self.idle_count = 0;
        self.total_visits = 0;
        self.tree_depth = (n as f64).ln().floor() as usize;
        self.steps = 0;
        self.done = false;
        self.history.fill(&self.frame());

        self.history.obs()
    }

    /// Per-item feature rows, `[n, n_features + 1]`.
    ///
    /// The last column is the membership flag of each item.
    fn feature_rows(&self) -> Array2<f32> {
        let n = self.items.len();
        let n_features = self.config.features.n_features();
        let mut rows = Array2::zeros((n, n_features + 1));
        let index = self.cursor.index as f32;
        let total_visits = self.total_visits.max(1) as f32;

        for (i, (item, mut row)) in self.items.iter().zip(rows.outer_iter_mut()).enumerate() {
            row[0] = item.cost;
            row[1] = item.value;
            if self.config.features == ObsFeatures::Extended {
                let roi = item.roi();
                let distance = (i as f32 - index).abs();
                row[2] = roi;
                row[3] = roi * (-distance / (n as f32 * self.config.roi_decay)).exp();
                row[4] = item.visit_count as f32 / total_visits;
            }
            row[n_features] = if item.in_knapsack { 1.0 } else { 0.0 };
        }

        rows
    }

    /// Aggregates the items into a single observation frame, `[2, 2, n_features]`.
    ///
    /// Items are split at the cursor and each side is padded back to the full
    /// number of items with zero rows, then features are summed separately
    /// over the items in and out of the knapsack.
    pub fn frame(&self) -> Array3<f32> {
        let n = self.items.len();
        let n_features = self.config.features.n_features();
        let index = self.cursor.index;
        let rows = self.feature_rows();

        let left = pad_zeros(rows.slice(s![..index, ..]), [(0, n - index), (0, 0)]);
        let right = pad_zeros(rows.slice(s![index.., ..]), [(index, 0), (0, 0)]);
        assert_eq!(left.dim(), right.dim());

        let mut frame = Array3::zeros((2, 2, n_features));
        for (side, rows) in [left, right].iter().enumerate() {
            let features = rows.slice(s![.., ..n_features]);
            let in_flags = rows.index_axis(Axis(1), n_features);
            let out_flags = in_flags.mapv(|f| 1.0 - f);
            frame
                .slice_mut(s![side, 0, ..])
                .assign(&features.t().dot(&in_flags));
            frame
                .slice_mut(s![side, 1, ..])
                .assign(&features.t().dot(&out_flags));
        }

        frame
    }

    /// The current observation, the most recent frames stacked.
    pub fn observe(&self) -> KnapsackObs {
        self.history.obs()
    }

    /// Applies an action and returns if the episode is done.
    ///
    /// The membership of the item under the cursor is set by the sign of
    /// `membership_signal` and its visit count incremented. If the membership
    /// did not change the idle counter is incremented, otherwise it is reset.
    /// Then the cursor moves by half of its stride, left if `move_signal > 0`.
    pub fn apply(&mut self, act: &KnapsackAct) -> bool {
        let put_in = act.puts_in();
        let item = &mut self.items[self.cursor.index];

        if item.in_knapsack == put_in {
            self.idle_count += 1;
        } else {
            self.idle_count = 0;
        }
        item.in_knapsack = put_in;
        item.visit_count += 1;
        self.total_visits += 1;

        self.cursor.advance(act.moves_left(), self.items.len());
        self.steps += 1;

        if self.idle_count as f32 > self.tree_depth as f32 * self.config.idle_threshold {
            self.done = true;
        }
        self.history.push(&self.frame());

        self.done
    }

    /// Returns `true` once the agent stayed idle for more than
    /// `floor(ln n) * idle_threshold` consecutive steps.
    ///
    /// It stays `true` until the next reset.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Total value of the items in the knapsack under the cost budget.
    pub fn value(&self) -> f32 {
        let budget = self.config.budget;
        let in_knapsack = self.items.iter().filter(|item| item.in_knapsack);

        match self.config.value_policy {
            ValuePolicy::ZeroIfOverBudget => {
                let (cost, value) = in_knapsack.fold((0.0, 0.0), |(c, v), item| {
                    (c + item.cost, v + item.value)
                });
                if cost > budget {
                    0.0
                } else {
                    value
                }
            }
            ValuePolicy::CumulativeInOrder => {
                let mut cost = 0.0;
                let mut value = 0.0;
                for item in in_knapsack {
                    cost += item.cost;
                    if cost > budget {
                        break;
                    }
                    value += item.value;
                }
                value
            }
        }
    }

    /// `(cost, value, in_knapsack)` of every item, in order.
    pub fn items(&self) -> Vec<(f32, f32, bool)> {
        self.items
            .iter()
            .map(|item| (item.cost, item.value, item.in_knapsack))
            .collect()
    }

    /// The items of the current episode.
    pub fn item_slice(&self) -> &[Item] {
        &self.items
    }

    /// The number of items of the current episode.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there is no item, which only holds before the first reset.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The cursor.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The number of consecutive steps without a membership change.
    pub fn idle_count(&self) -> usize {
        self.idle_count
    }

    /// The number of steps applied in the current episode.
    pub fn total_visits(&self) -> u32 {
        self.total_visits
    }

    /// `floor(ln n)`.
    pub fn tree_depth(&self) -> usize {
        self.tree_depth
    }

    /// The number of steps of the current episode.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The configuration.
    pub fn config(&self) -> &KnapsackConfig {
        &self.config
    }
}

impl Env for Knapsack {
    type Config = KnapsackConfig;
    type Obs = KnapsackObs;
    type Act = KnapsackAct;

    /// Builds the game and draws the items of a first episode.
    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        config.validate()?;

        let mut env = Self {
            config: config.clone(),
            rng: SmallRng::seed_from_u64(seed as u64),
            items: vec![],
            cursor: Cursor::origin(),
            idle_count: 0,
            total_visits: 0,
            tree_depth: 0,
            steps: 0,
            done: false,
            history: ObsHistory::new(config.history_size, config.features.n_features()),
        };
        env.reset()?;

        Ok(env)
    }

    fn reset(&mut self) -> Result<KnapsackObs> {
        let items = self.draw_items();
        trace!("Reset with {} items", items.len());
        Ok(self.reset_with_items(items))
    }

    fn step(&mut self, a: &KnapsackAct) -> (Step<Self>, Record) {
        let before = self.value();
        let is_done = self.apply(a);
        let value = self.value();
        let reward = value - before;

        let record = Record::from_slice(&[
            ("cursor_index", RecordValue::Scalar(self.cursor.index as f32)),
            ("idle_count", RecordValue::Scalar(self.idle_count as f32)),
            ("value", RecordValue::Scalar(value)),
        ]);

        (Step::new(self.observe(), *a, reward, is_done), record)
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn score(&self) -> f32 {
        self.value()
    }
}
