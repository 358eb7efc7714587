//! Utilities.
use candle_core::Tensor;
use knapsack_core::error::KnapsackError;

/// Element-wise `log(sigmoid(x)) = -softplus(-x)`, stable for large `|x|`.
pub fn log_sigmoid(xs: &Tensor) -> candle_core::Result<Tensor> {
    // softplus(-x) = relu(-x) + log(1 + exp(-|x|))
    let tail = xs.abs()?.neg()?.exp()?.affine(1.0, 1.0)?.log()?;
    xs.neg()?.relu()?.add(&tail)?.neg()
}

/// Scalar version of [`log_sigmoid`].
pub fn log_sigmoid_f32(x: f32) -> f32 {
    -((-x).max(0.0) + (-x.abs()).exp().ln_1p())
}

/// Logistic function.
pub fn sigmoid_f32(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Parses comma-separated hidden layer sizes such as `"128, 64"`.
///
/// Every size must be a positive integer.
pub fn parse_hidden_layer_sizes(s: &str) -> Result<Vec<usize>, KnapsackError> {
    let invalid = || KnapsackError::InvalidConfig(format!("Invalid hidden layer sizes string: {}", s));

    s.trim()
        .split(',')
        .map(|v| match v.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(invalid()),
        })
        .collect()
}
