use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use mvs_pairs_colmap::ColmapModel;

use crate::{
    error::ViewSelectionError,
    pose::{self, Extrinsic},
};

/// The reconstruction data the pairwise score reads for one scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Name used in logs and errors
    pub name: String,
    /// World-to-camera transforms by image id
    pub extrinsics: HashMap<u32, Extrinsic>,
    /// 3D point ids seen by each image, -1 for keypoints without a point
    pub observations: HashMap<u32, Vec<i64>>,
    /// 3D point positions by point id
    pub points: HashMap<u64, [f64; 3]>,
}

impl Scene {
    /// Build a scene from a sparse model.
    ///
    /// Every camera is validated even though the score only reads the poses,
    /// so a malformed camera fails the scene.
    ///
    /// # Arguments
    ///
    /// * `name` - The scene name.
    /// * `model` - The sparse model.
    pub fn from_model(
        name: impl Into<String>,
        model: &ColmapModel,
    ) -> Result<Self, ViewSelectionError> {
        let name = name.into();

        let (_intrinsics, extrinsics) = pose::read_colmap_cameras(&model.cameras, &model.images)
            .map_err(|e| ViewSelectionError::from(e).in_scene(&name))?;

        let observations = model
            .images
            .iter()
            .map(|(&image_id, image)| (image_id, image.point3d_ids().collect()))
            .collect();

        let points = model
            .points3d
            .iter()
            .map(|(&point_id, point)| (point_id, point.xyz))
            .collect();

        Ok(Self {
            name,
            extrinsics,
            observations,
            points,
        })
    }

    /// Read a scene from a sparse model directory in COLMAP text format.
    ///
    /// # Arguments
    ///
    /// * `name` - The scene name.
    /// * `dir` - The directory with `cameras.txt`, `images.txt` and `points3D.txt`.
    pub fn load(
        name: impl Into<String>,
        dir: impl AsRef<Path>,
    ) -> Result<Self, ViewSelectionError> {
        let name = name.into();
        let model = mvs_pairs_colmap::read_model_txt(dir.as_ref())
            .map_err(|e| ViewSelectionError::from(e).in_scene(&name))?;
        Self::from_model(name, &model)
    }

    /// The image id a view index maps to, `None` past the last valid id.
    #[inline]
    pub fn image_id(view: usize) -> Option<u32> {
        u32::try_from(view).ok().and_then(|v| v.checked_add(1))
    }
}

/// The sparse model directory of a scene, `<root>/scan<ID>/sparse/0`.
pub fn scene_model_dir(root: impl AsRef<Path>, scene_id: u32) -> PathBuf {
    scene_dir(root, scene_id).join("sparse").join("0")
}

/// The working directory of a scene, `<root>/scan<ID>`.
pub fn scene_dir(root: impl AsRef<Path>, scene_id: u32) -> PathBuf {
    root.as_ref().join(format!("scan{scene_id}"))
}
