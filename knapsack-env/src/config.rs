//! Configuration of [`Knapsack`](crate::Knapsack).
use anyhow::Result;
use knapsack_core::error::KnapsackError;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Inclusive range of the number of items drawn at every reset.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct ItemCountRange {
    /// Minimum number of items.
    pub min: usize,

    /// Maximum number of items.
    pub max: usize,
}

/// Per-item features aggregated into an observation.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum ObsFeatures {
    /// Cost and value.
    #[default]
    Basic,

    /// Cost, value, return on investment, return on investment weighted by the
    /// distance to the cursor, and the normalized visit count.
    Extended,
}

impl ObsFeatures {
    /// The number of features per item.
    pub fn n_features(&self) -> usize {
        match self {
            Self::Basic => 2,
            Self::Extended => 5,
        }
    }
}

/// How the value of the knapsack is computed under its cost budget.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum ValuePolicy {
    /// The value is zero as soon as the total cost of the items in the knapsack
    /// exceeds the budget.
    ZeroIfOverBudget,

    /// Items in the knapsack are accumulated in order. The item whose cost
    /// overflows the budget and every later one contribute nothing.
    #[default]
    CumulativeInOrder,
}

/// Initial position of the cursor after a reset.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum CursorStart {
    /// `{index: 0, stride: 0}`. The first step re-centers the cursor.
    #[default]
    Origin,

    /// `{index: n / 2, stride: n / 2}`.
    Midpoint,
}

/// Configuration of [`Knapsack`](crate::Knapsack).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct KnapsackConfig {
    /// Range of the number of items.
    pub item_count_range: ItemCountRange,

    /// Half-open range `[lo, hi)` of item costs before scaling.
    pub cost_range: (f32, f32),

    /// Half-open range `[lo, hi)` of item values before scaling.
    pub value_range: (f32, f32),

    /// If `Some(m)`, costs and values are scaled by `m / n` where `n` is the
    /// number of items, so that the total cost does not grow with `n`.
    pub cost_value_multiplier: Option<f32>,

    /// An episode terminates when the number of consecutive steps without a
    /// membership change exceeds `floor(ln n) * idle_threshold`.
    pub idle_threshold: f32,

    /// The number of most recent frames stacked in an observation.
    pub history_size: usize,

    /// Per-item features.
    pub features: ObsFeatures,

    /// Budget semantics of [`Knapsack::value`](crate::Knapsack::value).
    pub value_policy: ValuePolicy,

    /// Initial cursor position.
    pub cursor_start: CursorStart,

    /// Cost budget of the knapsack.
    pub budget: f32,

    /// Decay of the distance-weighted return on investment, relative to the
    /// number of items.
    pub roi_decay: f32,
}

impl Default for KnapsackConfig {
    fn default() -> Self {
        Self {
            item_count_range: ItemCountRange { min: 50, max: 1000 },
            cost_range: (0.01, 1.0),
            value_range: (0.0, 1.0),
            cost_value_multiplier: Some(2.0),
            idle_threshold: 2.0,
            history_size: 1,
            features: ObsFeatures::Basic,
            value_policy: ValuePolicy::CumulativeInOrder,
            cursor_start: CursorStart::Origin,
            budget: 1.0,
            roi_decay: 0.1,
        }
    }
}

impl KnapsackConfig {
    /// Sets the range of the number of items.
    pub fn item_count_range(mut self, min: usize, max: usize) -> Self {
        self.item_count_range = ItemCountRange { min, max };
        self
    }

    /// Sets the range of item costs.
    pub fn cost_range(mut self, lo: f32, hi: f32) -> Self {
        self.cost_range = (lo, hi);
        self
    }

    /// Sets the range of item values.
    pub fn value_range(mut self, lo: f32, hi: f32) -> Self {
        self.value_range = (lo, hi);
        self
    }

    /// Sets the multiplier of costs and values.
    pub fn cost_value_multiplier(mut self, v: Option<f32>) -> Self {
        self.cost_value_multiplier = v;
        self
    }

    /// Sets the idle threshold.
    pub fn idle_threshold(mut self, v: f32) -> Self {
        self.idle_threshold = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn history_size(mut self, v: usize) -> Self {
        self.history_size = v;
        self
    }

    /// Sets the per-item features.
    pub fn features(mut self, v: ObsFeatures) -> Self {
        self.features = v;
        self
    }

    /// Sets the value policy.
    pub fn value_policy(mut self, v: ValuePolicy) -> Self {
        self.value_policy = v;
        self
    }

    /// Sets the initial cursor position.
    pub fn cursor_start(mut self, v: CursorStart) -> Self {
        self.cursor_start = v;
        self
    }

    /// Sets the cost budget.
    pub fn budget(mut self, v: f32) -> Self {
        self.budget = v;
        self
    }

    /// Sets the decay of the distance-weighted return on investment.
    pub fn roi_decay(mut self, v: f32) -> Self {
        self.roi_decay = v;
        self
    }

    /// Shape of an observation, `[history_size, 2, 2, n_features]`.
    pub fn obs_shape(&self) -> [usize; 4] {
        [self.history_size, 2, 2, self.features.n_features()]
    }

    /// The number of scalar elements of an observation.
    pub fn obs_dim(&self) -> usize {
        self.obs_shape().iter().product()
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), KnapsackError> {
        let invalid = |msg: String| Err(KnapsackError::InvalidConfig(msg));
        let ItemCountRange { min, max } = self.item_count_range;
        let (cost_lo, cost_hi) = self.cost_range;
        let (value_lo, value_hi) = self.value_range;

        if min == 0 {
            return invalid("item_count_range.min must be greater than 0".into());
        }
        if min > max {
            return invalid(format!("item_count_range is inverted: {} > {}", min, max));
        }
        if !(cost_lo < cost_hi) {
            return invalid(format!("cost_range is empty: [{}, {})", cost_lo, cost_hi));
        }
        if !(cost_lo > 0.0) {
            return invalid(format!("cost_range must be positive, got lower bound {}", cost_lo));
        }
        if !(value_lo < value_hi) {
            return invalid(format!("value_range is empty: [{}, {})", value_lo, value_hi));
        }
        if let Some(m) = self.cost_value_multiplier {
            if !(m > 0.0) {
                return invalid(format!("cost_value_multiplier must be positive, got {}", m));
            }
        }
        if !(self.idle_threshold > 0.0) {
            return invalid(format!(
                "idle_threshold must be positive, got {}",
                self.idle_threshold
            ));
        }
        if self.history_size == 0 {
            return invalid("history_size must be greater than 0".into());
        }
        if !(self.budget > 0.0) {
            return invalid(format!("budget must be positive, got {}", self.budget));
        }
        if !(self.roi_decay > 0.0) {
            return invalid(format!("roi_decay must be positive, got {}", self.roi_decay));
        }

        Ok(())
    }

    /// Constructs [`KnapsackConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`KnapsackConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_knapsack_config() -> Result<()> {
        let config = KnapsackConfig::default()
            .item_count_range(5, 10)
            .features(ObsFeatures::Extended)
            .value_policy(ValuePolicy::ZeroIfOverBudget)
            .cursor_start(CursorStart::Midpoint)
            .history_size(3);

        let dir = TempDir::new("knapsack_config")?;
        let path = dir.path().join("knapsack_config.yaml");
        config.save(&path)?;
        assert_eq!(config, KnapsackConfig::load(&path)?);
        Ok(())
    }

    #[test]
    fn test_obs_shape() {
        let config = KnapsackConfig::default();
        assert_eq!(config.obs_shape(), [1, 2, 2, 2]);
        assert_eq!(config.obs_dim(), 8);

        let config = config.features(ObsFeatures::Extended).history_size(4);
        assert_eq!(config.obs_shape(), [4, 2, 2, 5]);
        assert_eq!(config.obs_dim(), 80);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(KnapsackConfig::default().validate().is_ok());

        let cases = [
            KnapsackConfig::default().item_count_range(0, 10),
            KnapsackConfig::default().item_count_range(10, 5),
            KnapsackConfig::default().cost_range(0.5, 0.5),
            KnapsackConfig::default().cost_range(0.0, 1.0),
            KnapsackConfig::default().value_range(1.0, 0.0),
            KnapsackConfig::default().cost_value_multiplier(Some(0.0)),
            KnapsackConfig::default().idle_threshold(0.0),
            KnapsackConfig::default().history_size(0),
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(KnapsackError::InvalidConfig(_))
            ));
        }
    }
}
