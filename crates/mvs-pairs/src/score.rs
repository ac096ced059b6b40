use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{error::ViewSelectionError, pose, scene::Scene};

/// Score returned for a pair whose shared geometry gives a non finite score.
pub const DEGENERATE_SCORE: f64 = -1.0;

/// Parameters of the triangulation angle weighting, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreParams {
    /// The preferred triangulation angle.
    pub theta0: f64,
    /// Spread for angles up to `theta0`.
    pub sigma1: f64,
    /// Spread for angles above `theta0`.
    pub sigma2: f64,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            theta0: 5.0,
            sigma1: 1.0,
            sigma2: 10.0,
        }
    }
}

/// Compute the angle at `point` between the rays to two camera centers.
///
/// # Arguments
///
/// * `center_i` - The first camera center.
/// * `center_j` - The second camera center.
/// * `point` - The 3D point.
///
/// # Returns
///
/// The triangulation angle in degrees. NaN when the point coincides with a
/// camera center.
pub fn triangulation_angle(center_i: &[f64; 3], center_j: &[f64; 3], point: &[f64; 3]) -> f64 {
    let ray_i = [
        center_i[0] - point[0],
        center_i[1] - point[1],
        center_i[2] - point[2],
    ];
    let ray_j = [
        center_j[0] - point[0],
        center_j[1] - point[1],
        center_j[2] - point[2],
    ];

    let dot = ray_i[0] * ray_j[0] + ray_i[1] * ray_j[1] + ray_i[2] * ray_j[2];
    let norm_i = (ray_i[0].powi(2) + ray_i[1].powi(2) + ray_i[2].powi(2)).sqrt();
    let norm_j = (ray_j[0].powi(2) + ray_j[1].powi(2) + ray_j[2].powi(2)).sqrt();

    (dot / (norm_i * norm_j)).acos().to_degrees()
}

/// Weight a triangulation angle with an asymmetric Gaussian peaking at `theta0`.
///
/// # Arguments
///
/// * `theta` - The triangulation angle in degrees.
/// * `params` - The weighting parameters.
///
/// Example:
///
/// ```
/// use mvs_pairs::score::{angle_weight, ScoreParams};
///
/// let params = ScoreParams::default();
/// assert_eq!(angle_weight(params.theta0, &params), 1.0);
/// ```
pub fn angle_weight(theta: f64, params: &ScoreParams) -> f64 {
    let sigma = match theta <= params.theta0 {
        true => params.sigma1,
        false => params.sigma2,
    };
    let diff = theta - params.theta0;
    (-diff * diff / (2.0 * sigma * sigma)).exp()
}

/// Sum the angle weights of the points seen from two camera centers.
///
/// # Arguments
///
/// * `center_i` - The first camera center.
/// * `center_j` - The second camera center.
/// * `points` - The points both cameras observe.
/// * `params` - The weighting parameters.
///
/// # Returns
///
/// The score, `0` without points and [`DEGENERATE_SCORE`] if the sum is not finite.
pub fn score_from_centers<'a>(
    center_i: &[f64; 3],
    center_j: &[f64; 3],
    points: impl IntoIterator<Item = &'a [f64; 3]>,
    params: &ScoreParams,
) -> f64 {
    let score = points
        .into_iter()
        .map(|point| angle_weight(triangulation_angle(center_i, center_j, point), params))
        .sum::<f64>();

    match score.is_finite() {
        true => score,
        false => DEGENERATE_SCORE,
    }
}

/// Compute the baseline quality score of a pair of views in a scene.
///
/// View `i` is the image with id `i + 1`. The score sums the angle weights of
/// the 3D points both images observe.
///
/// # Arguments
///
/// * `scene` - The scene poses and point tracks.
/// * `pair` - The (reference, source) view indices.
/// * `params` - The weighting parameters.
///
/// # Returns
///
/// The pair score. Missing images or points are errors.
pub fn pair_score(
    scene: &Scene,
    pair: (usize, usize),
    params: &ScoreParams,
) -> Result<f64, ViewSelectionError> {
    let (view_i, view_j) = pair;
    let (image_id, center_i, ids_i) = view_geometry(scene, view_i)?;
    let (_, center_j, ids_j) = view_geometry(scene, view_j)?;

    let shared = shared_point_ids(ids_i, ids_j);

    let points = shared
        .into_iter()
        .map(|point_id| {
            u64::try_from(point_id)
                .ok()
                .and_then(|id| scene.points.get(&id))
                .ok_or(ViewSelectionError::MissingPoint { image_id, point_id })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(score_from_centers(&center_i, &center_j, points, params))
}

/// Intersect the point ids of two images, skipping the -1 sentinel.
///
/// The ids come back sorted and each id appears once.
pub fn shared_point_ids(ids_i: &[i64], ids_j: &[i64]) -> Vec<i64> {
    let lookup = ids_j.iter().copied().collect::<HashSet<_>>();
    let mut shared = ids_i
        .iter()
        .copied()
        .filter(|&id| id != -1 && lookup.contains(&id))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    shared.sort_unstable();
    shared
}

fn view_geometry(
    scene: &Scene,
    view: usize,
) -> Result<(u32, [f64; 3], &[i64]), ViewSelectionError> {
    let missing = || ViewSelectionError::MissingImage { view };

    let image_id = Scene::image_id(view).ok_or_else(missing)?;
    let extrinsic = scene.extrinsics.get(&image_id).ok_or_else(missing)?;
    let ids = scene.observations.get(&image_id).ok_or_else(missing)?;

    Ok((image_id, pose::camera_center(extrinsic), ids.as_slice()))
}
