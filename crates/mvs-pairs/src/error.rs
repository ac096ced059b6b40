use mvs_pairs_colmap::ColmapError;

use crate::pose::PoseError;

/// Error types for the view selection.
#[derive(Debug, thiserror::Error)]
pub enum ViewSelectionError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    Io(#[from] std::io::Error),

    /// Error reading the sparse model
    #[error(transparent)]
    Colmap(#[from] ColmapError),

    /// Error extracting the camera intrinsics or extrinsics
    #[error(transparent)]
    Pose(#[from] PoseError),

    /// A view has no image with id `view + 1` in the scene
    #[error("no image for view {view}")]
    MissingImage {
        /// The view index
        view: usize,
    },

    /// An image references a 3D point that is not in the point table
    #[error("image {image_id} references missing 3D point {point_id}")]
    MissingPoint {
        /// The observing image
        image_id: u32,
        /// The referenced point id
        point_id: i64,
    },

    /// No scenes to aggregate over
    #[error("no scenes to aggregate")]
    EmptyBatch,

    /// Matrix data that does not fill the requested shape
    #[error("{len} values cannot fill a {shape:?} score matrix")]
    DataLength {
        /// Requested (rows, cols)
        shape: (usize, usize),
        /// Number of values given
        len: usize,
    },

    /// Score matrices of different shapes
    #[error("score matrix shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected (rows, cols)
        expected: (usize, usize),
        /// Actual (rows, cols)
        actual: (usize, usize),
    },

    /// A scene of the batch failed
    #[error("scene {scene} failed")]
    Scene {
        /// The scene name
        scene: String,
        /// The scene error
        #[source]
        source: Box<ViewSelectionError>,
    },

    /// Malformed pair file
    #[error("invalid pair file: {0}")]
    PairFile(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Error parsing a configuration file
    #[error("failed to parse configuration")]
    Json(#[from] serde_json::Error),
}

impl ViewSelectionError {
    /// Attach the name of the scene the error happened in.
    pub fn in_scene(self, scene: impl Into<String>) -> Self {
        match self {
            err @ ViewSelectionError::Scene { .. } => err,
            err => ViewSelectionError::Scene {
                scene: scene.into(),
                source: Box::new(err),
            },
        }
    }
}
