use std::{
    ops::{Index, IndexMut},
    path::Path,
};

use rayon::prelude::*;

use crate::{
    error::ViewSelectionError,
    scene::{self, Scene},
    score::{self, ScoreParams, DEGENERATE_SCORE},
};

/// A dense row-major [reference x source] matrix of pair scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ScoreMatrix {
    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create a matrix from row-major data of length `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, ViewSelectionError> {
        if data.len() != rows * cols {
            return Err(ViewSelectionError::DataLength {
                shape: (rows, cols),
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// The (rows, cols) of the matrix.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// The scores of one reference view against every source view.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Get as reference the row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Add another matrix of the same shape element-wise.
    pub fn add_assign(&mut self, other: &ScoreMatrix) -> Result<(), ViewSelectionError> {
        if self.shape() != other.shape() {
            return Err(ViewSelectionError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        self.data
            .iter_mut()
            .zip(other.data.iter())
            .for_each(|(a, b)| *a += b);
        Ok(())
    }

    /// Multiply every element by a factor.
    pub fn scale(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }
}

impl Index<(usize, usize)> for ScoreMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.rows && col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for ScoreMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(row < self.rows && col < self.cols);
        &mut self.data[row * self.cols + col]
    }
}

/// Score every (reference, source) pair of one scene.
///
/// # Arguments
///
/// * `scene` - The scene poses and point tracks.
/// * `ref_views` - The reference view indices, one row each.
/// * `src_views` - The source view indices, one column each.
/// * `params` - The weighting parameters.
///
/// # Returns
///
/// The [ref_views x src_views] score matrix. Errors carry the scene name.
pub fn scene_score_matrix(
    scene: &Scene,
    ref_views: &[usize],
    src_views: &[usize],
    params: &ScoreParams,
) -> Result<ScoreMatrix, ViewSelectionError> {
    let mut matrix = ScoreMatrix::zeros(ref_views.len(), src_views.len());

    for (row, &ref_view) in ref_views.iter().enumerate() {
        for (col, &src_view) in src_views.iter().enumerate() {
            matrix[(row, col)] = score::pair_score(scene, (ref_view, src_view), params)
                .map_err(|e| e.in_scene(&scene.name))?;
        }
    }

    log::debug!(
        "scene {}: scored {}x{} pairs",
        scene.name,
        ref_views.len(),
        src_views.len()
    );

    let num_degenerate = matrix
        .as_slice()
        .iter()
        .filter(|&&s| s == DEGENERATE_SCORE)
        .count();
    if num_degenerate > 0 {
        log::warn!(
            "scene {}: {} pairs without usable shared geometry",
            scene.name,
            num_degenerate
        );
    }

    Ok(matrix)
}

/// Average the pair scores over a batch of scenes.
///
/// Scenes are scored in parallel; any failing scene fails the batch.
///
/// # Arguments
///
/// * `scenes` - The scenes of the batch.
/// * `ref_views` - The reference view indices.
/// * `src_views` - The source view indices.
/// * `params` - The weighting parameters.
///
/// # Returns
///
/// The mean [ref_views x src_views] score matrix.
pub fn aggregate_scores(
    scenes: &[Scene],
    ref_views: &[usize],
    src_views: &[usize],
    params: &ScoreParams,
) -> Result<ScoreMatrix, ViewSelectionError> {
    if scenes.is_empty() {
        return Err(ViewSelectionError::EmptyBatch);
    }

    let total = scenes
        .par_iter()
        .map(|scene| -> Result<ScoreMatrix, ViewSelectionError> {
            log::info!("start to process scene {}", scene.name);
            let matrix = scene_score_matrix(scene, ref_views, src_views, params)?;
            log::info!("scene {} done", scene.name);
            Ok(matrix)
        })
        .try_reduce(
            || ScoreMatrix::zeros(ref_views.len(), src_views.len()),
            sum_matrices,
        )?;

    Ok(mean(total, scenes.len()))
}

/// Load and score the scenes of `<root>/scan<ID>/sparse/0` for each scene id.
///
/// Every scene is loaded inside its own task so that reading and scoring
/// overlap across scenes. A missing or malformed scene fails the batch.
///
/// # Arguments
///
/// * `root` - The directory holding the `scan<ID>` reconstructions.
/// * `scene_ids` - The scenes to average over.
/// * `ref_views` - The reference view indices.
/// * `src_views` - The source view indices.
/// * `params` - The weighting parameters.
///
/// # Returns
///
/// The mean [ref_views x src_views] score matrix.
pub fn aggregate_scene_dirs(
    root: impl AsRef<Path>,
    scene_ids: &[u32],
    ref_views: &[usize],
    src_views: &[usize],
    params: &ScoreParams,
) -> Result<ScoreMatrix, ViewSelectionError> {
    if scene_ids.is_empty() {
        return Err(ViewSelectionError::EmptyBatch);
    }

    let root = root.as_ref();
    let total = scene_ids
        .par_iter()
        .map(|&scene_id| -> Result<ScoreMatrix, ViewSelectionError> {
            let name = format!("scan{scene_id}");
            log::info!("start to process scene {scene_id:03}");
            let scene = Scene::load(name, scene::scene_model_dir(root, scene_id))?;
            let matrix = scene_score_matrix(&scene, ref_views, src_views, params)?;
            log::info!("scene {scene_id:03} done");
            Ok(matrix)
        })
        .try_reduce(
            || ScoreMatrix::zeros(ref_views.len(), src_views.len()),
            sum_matrices,
        )?;

    Ok(mean(total, scene_ids.len()))
}

fn sum_matrices(
    mut acc: ScoreMatrix,
    other: ScoreMatrix,
) -> Result<ScoreMatrix, ViewSelectionError> {
    acc.add_assign(&other)?;
    Ok(acc)
}

fn mean(mut total: ScoreMatrix, count: usize) -> ScoreMatrix {
    total.scale(1.0 / count as f64);
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn extrinsic_at(center: [f64; 3]) -> crate::pose::Extrinsic {
        [
            [1.0, 0.0, 0.0, -center[0]],
            [0.0, 1.0, 0.0, -center[1]],
            [0.0, 0.0, 1.0, -center[2]],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    /// Three cameras around a small cluster of points at the origin.
    fn scene(name: &str, offset: f64) -> Scene {
        let centers = [[0.0, 0.0, 10.0], [offset, 0.0, 10.0], [0.0, 5.0, 8.0]];
        let observations = [vec![0, 1, -1], vec![0, 1], vec![2, -1]];
        let points = [[0.0, 0.0, 0.0], [0.2, -0.1, 0.3], [-0.3, 0.4, 0.1]];
        Scene {
            name: name.to_string(),
            extrinsics: centers
                .iter()
                .enumerate()
                .map(|(v, c)| (Scene::image_id(v).unwrap(), extrinsic_at(*c)))
                .collect(),
            observations: observations
                .iter()
                .enumerate()
                .map(|(v, ids)| (Scene::image_id(v).unwrap(), ids.clone()))
                .collect(),
            points: points
                .iter()
                .enumerate()
                .map(|(p, xyz)| (p as u64, *xyz))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_score_matrix_ops() -> Result<(), ViewSelectionError> {
        let mut a = ScoreMatrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0])?;
        let b = ScoreMatrix::from_vec(2, 2, vec![1.0, 1.0, 1.0, 1.0])?;
        a.add_assign(&b)?;
        a.scale(0.5);
        assert_eq!(a.as_slice(), &[1.0, 1.5, 2.0, 2.5]);
        assert_eq!(a.row(1), &[2.0, 2.5]);
        assert_eq!(a[(0, 1)], 1.5);

        let c = ScoreMatrix::zeros(3, 2);
        assert!(matches!(
            a.add_assign(&c),
            Err(ViewSelectionError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            ScoreMatrix::from_vec(2, 2, vec![0.0; 3]),
            Err(ViewSelectionError::DataLength {
                shape: (2, 2),
                len: 3
            })
        ));
        Ok(())
    }

    #[test]
    fn test_scene_score_matrix_shape() -> Result<(), ViewSelectionError> {
        let s = scene("scan1", 1.0);
        let matrix = scene_score_matrix(&s, &[0, 1, 2], &[0, 2], &ScoreParams::default())?;
        assert_eq!(matrix.shape(), (3, 2));
        // views 0 and 2 share no point
        assert_eq!(matrix[(0, 1)], 0.0);
        assert_eq!(matrix[(2, 0)], 0.0);
        assert!(matrix[(1, 0)] > 0.0);
        Ok(())
    }

    #[test]
    fn test_aggregate_duplicated_scene() -> Result<(), ViewSelectionError> {
        let params = ScoreParams::default();
        let (refs, srcs) = ([0, 1, 2], [0, 1, 2]);

        let s = scene("scan1", 1.0);
        let once = aggregate_scores(std::slice::from_ref(&s), &refs, &srcs, &params)?;
        let twice = aggregate_scores(&[s.clone(), s], &refs, &srcs, &params)?;

        for (a, b) in once.as_slice().iter().zip(twice.as_slice()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_aggregate_mean() -> Result<(), ViewSelectionError> {
        let params = ScoreParams::default();
        let (refs, srcs) = ([0, 1], [1]);

        let s1 = scene("scan1", 1.0);
        let s2 = scene("scan2", 2.0);
        let m1 = scene_score_matrix(&s1, &refs, &srcs, &params)?;
        let m2 = scene_score_matrix(&s2, &refs, &srcs, &params)?;

        let mean = aggregate_scores(&[s1, s2], &refs, &srcs, &params)?;
        for i in 0..2 {
            assert_relative_eq!(
                mean[(i, 0)],
                (m1[(i, 0)] + m2[(i, 0)]) / 2.0,
                epsilon = 1e-12
            );
        }
        Ok(())
    }

    #[test]
    fn test_aggregate_empty_batch() {
        let res = aggregate_scores(&[], &[0], &[0], &ScoreParams::default());
        assert!(matches!(res, Err(ViewSelectionError::EmptyBatch)));
    }

    #[test]
    fn test_aggregate_failing_scene() {
        let params = ScoreParams::default();
        let good = scene("scan1", 1.0);
        let mut bad = scene("scan2", 1.0);
        bad.extrinsics.remove(&2);

        let res = aggregate_scores(&[good, bad], &[0, 1], &[0, 1], &params);
        match res {
            Err(ViewSelectionError::Scene { scene, source }) => {
                assert_eq!(scene, "scan2");
                assert!(matches!(*source, ViewSelectionError::MissingImage { view: 1, .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_scene_dirs_missing_scene() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let res = aggregate_scene_dirs(dir.path(), &[1], &[0], &[0], &ScoreParams::default());
        match res {
            Err(ViewSelectionError::Scene { scene, .. }) => assert_eq!(scene, "scan1"),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }
}
