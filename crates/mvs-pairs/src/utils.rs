/// Utility function to convert a 3D array to a faer column vector.
///
/// # Arguments
///
/// * `array` - A 3D array.
///
/// # Returns
///
/// A faer column vector.
pub fn array3_to_faer_col(array: &[f64; 3]) -> faer::ColRef<'_, f64> {
    faer::col::from_slice(array.as_slice())
}

/// Utility function to view the rotation block of a 4x4 extrinsic as a faer matrix 3x3.
///
/// # Arguments
///
/// * `extrinsic` - A row-major 4x4 rigid transform.
///
/// # Returns
///
/// An owned faer matrix 3x3 with the rotation.
pub fn extrinsic_rotation_to_faer_mat33(extrinsic: &[[f64; 4]; 4]) -> faer::Mat<f64> {
    faer::Mat::<f64>::from_fn(3, 3, |i, j| extrinsic[i][j])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extrinsic_rotation_to_mat33() {
        let extrinsic = [
            [1.0, 2.0, 3.0, 10.0],
            [4.0, 5.0, 6.0, 11.0],
            [7.0, 8.0, 9.0, 12.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let mat = extrinsic_rotation_to_faer_mat33(&extrinsic);
        assert_eq!(mat.nrows(), 3);
        assert_eq!(mat.ncols(), 3);
        assert_eq!(mat.read(0, 0), 1.0);
        assert_eq!(mat.read(0, 2), 3.0);
        assert_eq!(mat.read(1, 1), 5.0);
        assert_eq!(mat.read(2, 0), 7.0);
        assert_eq!(mat.read(2, 2), 9.0);
    }
}
