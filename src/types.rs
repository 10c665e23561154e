//! Core tensor types for the MPS classifier

use mdarray::DTensor;

/// A 2D tensor (matrix or batch of feature vectors), shape (rows, cols)
pub type Tensor2<T> = DTensor<T, 2>;

/// A 3D tensor. Used for embedded batches (batch, site, local) and for
/// batched matrices (batch, row, col).
pub type Tensor3<T> = DTensor<T, 3>;

/// A 4D tensor. Used for the half-chain weight banks
/// (local, site, bond_row, bond_col).
pub type Tensor4<T> = DTensor<T, 4>;

/// Create a zero-filled Tensor2
pub fn tensor2_zeros<T: Clone + Default>(rows: usize, cols: usize) -> Tensor2<T> {
    Tensor2::from_elem([rows, cols], T::default())
}

/// Create a zero-filled Tensor3
pub fn tensor3_zeros<T: Clone + Default>(d0: usize, d1: usize, d2: usize) -> Tensor3<T> {
    Tensor3::from_elem([d0, d1, d2], T::default())
}

/// Create a zero-filled Tensor4
pub fn tensor4_zeros<T: Clone + Default>(d0: usize, d1: usize, d2: usize, d3: usize) -> Tensor4<T> {
    Tensor4::from_elem([d0, d1, d2, d3], T::default())
}

/// Create a Tensor2 from flat data (row-major order)
pub fn tensor2_from_data<T: Clone>(data: Vec<T>, rows: usize, cols: usize) -> Tensor2<T> {
    assert_eq!(data.len(), rows * cols);
    Tensor2::from_fn([rows, cols], |idx| data[idx[0] * cols + idx[1]].clone())
}

/// Create a Tensor3 from flat data (row-major order)
pub fn tensor3_from_data<T: Clone>(data: Vec<T>, d0: usize, d1: usize, d2: usize) -> Tensor3<T> {
    assert_eq!(data.len(), d0 * d1 * d2);
    Tensor3::from_fn([d0, d1, d2], |idx| {
        data[(idx[0] * d1 + idx[1]) * d2 + idx[2]].clone()
    })
}

/// Create a Tensor4 from flat data (row-major order)
pub fn tensor4_from_data<T: Clone>(
    data: Vec<T>,
    d0: usize,
    d1: usize,
    d2: usize,
    d3: usize,
) -> Tensor4<T> {
    assert_eq!(data.len(), d0 * d1 * d2 * d3);
    Tensor4::from_fn([d0, d1, d2, d3], |idx| {
        data[((idx[0] * d1 + idx[1]) * d2 + idx[2]) * d3 + idx[3]].clone()
    })
}

/// Format a shape as `[d0, d1, ...]` for error messages
pub(crate) fn shape_string(dims: &[usize]) -> String {
    let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor2_from_data() {
        let t = tensor2_from_data(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert_eq!(t.dim(0), 2);
        assert_eq!(t.dim(1), 3);
        assert_eq!(t[[0, 0]], 1.0);
        assert_eq!(t[[0, 2]], 3.0);
        assert_eq!(t[[1, 0]], 4.0);
        assert_eq!(t[[1, 2]], 6.0);
    }

    #[test]
    fn test_tensor3_zeros_and_data() {
        let z: Tensor3<f64> = tensor3_zeros(2, 3, 4);
        assert_eq!(z.dim(0), 2);
        assert_eq!(z.dim(2), 4);
        assert_eq!(z[[1, 2, 3]], 0.0);

        let data: Vec<f64> = (0..24).map(|x| x as f64).collect();
        let t = tensor3_from_data(data, 2, 3, 4);
        assert_eq!(t[[0, 0, 1]], 1.0);
        assert_eq!(t[[0, 1, 0]], 4.0);
        assert_eq!(t[[1, 0, 0]], 12.0);
        assert_eq!(t[[1, 2, 3]], 23.0);
    }

    #[test]
    fn test_tensor4_from_data() {
        let data: Vec<f64> = (0..16).map(|x| x as f64).collect();
        let t = tensor4_from_data(data, 2, 2, 2, 2);
        assert_eq!(t[[0, 0, 0, 0]], 0.0);
        assert_eq!(t[[0, 0, 0, 1]], 1.0);
        assert_eq!(t[[0, 1, 0, 0]], 4.0);
        assert_eq!(t[[1, 0, 0, 0]], 8.0);
        assert_eq!(t[[1, 1, 1, 1]], 15.0);
    }

    #[test]
    fn test_shape_string() {
        assert_eq!(shape_string(&[2, 3, 4]), "[2, 3, 4]");
        assert_eq!(shape_string(&[7]), "[7]");
    }
}
