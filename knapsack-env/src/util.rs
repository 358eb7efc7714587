//! Utilities.
use ndarray::{s, Array2, ArrayView2};

/// Pads a 2-dimensional array with a constant.
///
/// `paddings[axis] = (before, after)` is the number of elements added at the
/// start and the end of each axis. An input with an empty axis yields an array
/// of the padded shape filled with `constant`.
pub fn pad<T: Clone>(x: ArrayView2<T>, paddings: [(usize, usize); 2], constant: T) -> Array2<T> {
    let (rows, cols) = x.dim();
    let [(top, bottom), (left, right)] = paddings;
    let mut padded = Array2::from_elem((top + rows + bottom, left + cols + right), constant);

    if rows > 0 && cols > 0 {
        padded
            .slice_mut(s![top..top + rows, left..left + cols])
            .assign(&x);
    }

    padded
}

/// Pads a 2-dimensional array with zeros.
pub fn pad_zeros<T: Clone + num_traits::Zero>(
    x: ArrayView2<T>,
    paddings: [(usize, usize); 2],
) -> Array2<T> {
    pad(x, paddings, T::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pad_empty_fills_with_constant() {
        let x = Array2::<f32>::ones((0, 3));
        let padded = pad(x.view(), [(5, 6), (0, 0)], 12.0);
        assert_eq!(padded, Array2::from_elem((11, 3), 12.0));
    }

    #[test]
    fn test_pad_without_padding_is_identity() {
        let x = array![[1.0f32, 2.0], [3.0, 4.0]];
        assert_eq!(pad(x.view(), [(0, 0), (0, 0)], 12.0), x);

        let x = Array2::<f32>::ones((430, 3));
        assert_eq!(pad_zeros(x.view(), [(0, 0), (0, 0)]), x);
    }

    #[test]
    fn test_pad_places_input() {
        let x = array![[1.0f32, 2.0]];
        let padded = pad_zeros(x.view(), [(1, 2), (0, 1)]);
        assert_eq!(
            padded,
            array![[0.0, 0.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]
        );
    }
}
