use std::collections::HashMap;

use mvs_pairs_colmap::{CameraModelId, ColmapCamera, ColmapImage};

use crate::utils;

/// A 3x3 pinhole intrinsic matrix `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`.
pub type Intrinsic = [[f64; 3]; 3];

/// A 4x4 world-to-camera transform `[[R | t], [0, 0, 0, 1]]`.
pub type Extrinsic = [[f64; 4]; 4];

/// Error types for the intrinsics and extrinsics extraction.
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    /// The number of parameters does not match the camera model layout
    #[error("Camera {camera_id} ({model}) expects {expected} parameters, got {actual}")]
    InvalidNumCameraParams {
        /// Camera id
        camera_id: u32,
        /// Camera model
        model: CameraModelId,
        /// Number of parameters of the model layout
        expected: usize,
        /// Number of parameters found
        actual: usize,
    },

    /// The image quaternion has zero norm
    #[error("Image {0} has a zero-norm rotation quaternion")]
    DegenerateQuaternion(u32),
}

/// Compute the intrinsic matrix of a camera from its model parameters.
///
/// Every model layout starts with `f, cx, cy` or `fx, fy, cx, cy`. Single
/// focal length models use `f` for both `fx` and `fy`. Distortion
/// coefficients are not part of the matrix.
///
/// # Arguments
///
/// * `camera` - The COLMAP camera.
///
/// # Returns
///
/// The 3x3 intrinsic matrix.
pub fn intrinsic_matrix(camera: &ColmapCamera) -> Result<Intrinsic, PoseError> {
    let model = camera.model_id;
    let p = camera.params.as_slice();

    if p.len() != model.num_params() {
        return Err(PoseError::InvalidNumCameraParams {
            camera_id: camera.camera_id,
            model,
            expected: model.num_params(),
            actual: p.len(),
        });
    }

    let (fx, fy, cx, cy) = match model.has_single_focal_length() {
        true => (p[0], p[0], p[1], p[2]),
        false => (p[0], p[1], p[2], p[3]),
    };

    Ok([[fx, 0.0, cx], [0.0, fy, cy], [0.0, 0.0, 1.0]])
}

/// Compute the rotation matrix from a quaternion.
///
/// # Arguments
///
/// * `qvec` - The quaternion as `[qw, qx, qy, qz]`. It is normalized first.
///
/// # Returns
///
/// The rotation matrix, or `None` if the quaternion has zero norm.
///
/// Example:
///
/// ```
/// use mvs_pairs::pose::quaternion_to_rotation_matrix;
///
/// let rotation = quaternion_to_rotation_matrix(&[1.0, 0.0, 0.0, 0.0]).unwrap();
/// assert_eq!(rotation, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn quaternion_to_rotation_matrix(qvec: &[f64; 4]) -> Option<[[f64; 3]; 3]> {
    let norm = qvec.iter().map(|q| q * q).sum::<f64>().sqrt();
    if norm < 1e-12 {
        return None;
    }

    let [w, x, y, z] = qvec.map(|q| q / norm);

    Some([
        [
            1.0 - 2.0 * y * y - 2.0 * z * z,
            2.0 * x * y - 2.0 * w * z,
            2.0 * z * x + 2.0 * w * y,
        ],
        [
            2.0 * x * y + 2.0 * w * z,
            1.0 - 2.0 * x * x - 2.0 * z * z,
            2.0 * y * z - 2.0 * w * x,
        ],
        [
            2.0 * z * x - 2.0 * w * y,
            2.0 * y * z + 2.0 * w * x,
            1.0 - 2.0 * x * x - 2.0 * y * y,
        ],
    ])
}

/// Compute the world-to-camera extrinsic matrix of an image.
///
/// # Arguments
///
/// * `image` - The COLMAP image with its rotation quaternion and translation.
///
/// # Returns
///
/// The 4x4 extrinsic matrix.
pub fn extrinsic_matrix(image: &ColmapImage) -> Result<Extrinsic, PoseError> {
    let rotation = quaternion_to_rotation_matrix(&image.rotation)
        .ok_or(PoseError::DegenerateQuaternion(image.image_id))?;
    let t = image.translation;

    let mut extrinsic = [[0.0; 4]; 4];
    for (row, (r, t)) in extrinsic.iter_mut().zip(rotation.iter().zip(t)) {
        row[..3].copy_from_slice(r);
        row[3] = t;
    }
    extrinsic[3][3] = 1.0;

    Ok(extrinsic)
}

/// Compute the camera center in world coordinates, `-R^T * t`.
///
/// # Arguments
///
/// * `extrinsic` - The world-to-camera transform.
///
/// # Returns
///
/// The position of the camera in the world frame.
pub fn camera_center(extrinsic: &Extrinsic) -> [f64; 3] {
    let rotation = utils::extrinsic_rotation_to_faer_mat33(extrinsic);
    let translation = [extrinsic[0][3], extrinsic[1][3], extrinsic[2][3]];
    let translation = utils::array3_to_faer_col(&translation);

    let rotated = rotation.transpose() * translation;
    let rotated = rotated.as_ref();
    [-rotated.read(0), -rotated.read(1), -rotated.read(2)]
}

/// Compute the intrinsic matrix of every camera and the extrinsic matrix of
/// every image of a sparse model.
///
/// # Arguments
///
/// * `cameras` - The cameras by camera id.
/// * `images` - The images by image id.
///
/// # Returns
///
/// The intrinsics by camera id and the extrinsics by image id. The first
/// malformed camera or image aborts the extraction.
#[allow(clippy::type_complexity)]
pub fn read_colmap_cameras(
    cameras: &HashMap<u32, ColmapCamera>,
    images: &HashMap<u32, ColmapImage>,
) -> Result<(HashMap<u32, Intrinsic>, HashMap<u32, Extrinsic>), PoseError> {
    let intrinsics = cameras
        .iter()
        .map(|(&camera_id, camera)| Ok((camera_id, intrinsic_matrix(camera)?)))
        .collect::<Result<HashMap<_, _>, PoseError>>()?;

    let extrinsics = images
        .iter()
        .map(|(&image_id, image)| Ok((image_id, extrinsic_matrix(image)?)))
        .collect::<Result<HashMap<_, _>, PoseError>>()?;

    Ok((intrinsics, extrinsics))
}
