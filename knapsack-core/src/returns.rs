//! Discounted returns and their normalization across a batch of episodes.

/// Added to the standard deviation when normalizing returns.
pub const NORMALIZATION_EPS: f64 = 1e-8;

/// Computes discounted returns backward from the last step of an episode.
///
/// `G[t] = r[t] + discount_rate * G[t + 1]`, where the return of the last step is
/// its reward.
pub fn discounted_returns(rewards: &[f32], discount_rate: f64) -> Vec<f32> {
    let mut returns = vec![0f32; rewards.len()];
    let mut running = 0f64;

    for t in (0..rewards.len()).rev() {
        running = rewards[t] as f64 + discount_rate * running;
        returns[t] = running as f32;
    }

    returns
}

/// Returns of a batch of episodes, standardized over all of their steps.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReturns {
    /// Standardized returns, with the same layout as the input.
    pub returns: Vec<Vec<f32>>,

    /// Mean of the raw returns.
    pub mean: f32,

    /// Standard deviation of the raw returns.
    pub std: f32,

    /// `true` if there were no steps or all returns were equal. All
    /// standardized returns are zero in that case.
    pub degenerate: bool,
}

impl NormalizedReturns {
    /// Standardized returns of all episodes, concatenated in episode order.
    pub fn flatten(&self) -> Vec<f32> {
        self.returns.iter().flatten().copied().collect()
    }
}

/// Standardizes returns over every step of every episode:
/// `(G - mean) / (std + NORMALIZATION_EPS)`.
///
/// Episodes without any step keep an empty entry. A batch without steps, or
/// whose returns are all equal, yields zeros rather than dividing by zero.
pub fn normalize_returns(returns: &[Vec<f32>]) -> NormalizedReturns {
    let all = returns.iter().flatten().map(|&g| g as f64).collect::<Vec<_>>();
    let zeros = || returns.iter().map(|ep| vec![0f32; ep.len()]).collect();

    if all.is_empty() {
        return NormalizedReturns {
            returns: zeros(),
            mean: 0.0,
            std: 0.0,
            degenerate: true,
        };
    }

    let n = all.len() as f64;
    let mean = all.iter().sum::<f64>() / n;

    if all.iter().all(|&g| g == all[0]) {
        return NormalizedReturns {
            returns: zeros(),
            mean: mean as f32,
            std: 0.0,
            degenerate: true,
        };
    }

    let std = (all.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n).sqrt();
    let scale = std + NORMALIZATION_EPS;

    NormalizedReturns {
        returns: returns
            .iter()
            .map(|ep| {
                ep.iter()
                    .map(|&g| ((g as f64 - mean) / scale) as f32)
                    .collect()
            })
            .collect(),
        mean: mean as f32,
        std: std as f32,
        degenerate: false,
    }
}
