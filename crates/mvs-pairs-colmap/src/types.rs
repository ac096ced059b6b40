use std::collections::HashMap;

/// Represents a Colmap camera model id.
///
/// The discriminants are the integer codes COLMAP stores in its database and
/// binary model files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraModelId {
    /// Simple pinhole camera model
    SimplePinhole = 0,
    /// Pinhole camera model
    Pinhole = 1,
    /// Simplified radial camera model
    SimpleRadial = 2,
    /// Radial camera model
    Radial = 3,
    /// OpenCV camera model
    OpenCV = 4,
    /// OpenCV fisheye camera model
    OpenCVFisheye = 5,
    /// Full OpenCV camera model
    FullOpenCV = 6,
    /// Field of view camera model
    Fov = 7,
    /// Simple radial fisheye camera model
    SimpleRadialFisheye = 8,
    /// Radial fisheye camera model
    RadialFisheye = 9,
    /// Thin prism fisheye camera model
    ThinPrismFisheye = 10,
}

impl CameraModelId {
    /// All the camera models, ordered by their COLMAP code.
    pub const ALL: [CameraModelId; 11] = [
        CameraModelId::SimplePinhole,
        CameraModelId::Pinhole,
        CameraModelId::SimpleRadial,
        CameraModelId::Radial,
        CameraModelId::OpenCV,
        CameraModelId::OpenCVFisheye,
        CameraModelId::FullOpenCV,
        CameraModelId::Fov,
        CameraModelId::SimpleRadialFisheye,
        CameraModelId::RadialFisheye,
        CameraModelId::ThinPrismFisheye,
    ];

    /// The model tag as written in `cameras.txt`.
    pub fn name(&self) -> &'static str {
        match self {
            CameraModelId::SimplePinhole => "SIMPLE_PINHOLE",
            CameraModelId::Pinhole => "PINHOLE",
            CameraModelId::SimpleRadial => "SIMPLE_RADIAL",
            CameraModelId::Radial => "RADIAL",
            CameraModelId::OpenCV => "OPENCV",
            CameraModelId::OpenCVFisheye => "OPENCV_FISHEYE",
            CameraModelId::FullOpenCV => "FULL_OPENCV",
            CameraModelId::Fov => "FOV",
            CameraModelId::SimpleRadialFisheye => "SIMPLE_RADIAL_FISHEYE",
            CameraModelId::RadialFisheye => "RADIAL_FISHEYE",
            CameraModelId::ThinPrismFisheye => "THIN_PRISM_FISHEYE",
        }
    }

    /// Look up a model by its `cameras.txt` tag.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.name() == name)
    }

    /// The COLMAP integer code of the model.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Look up a model by its COLMAP integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    /// The ordered names of the model parameters.
    ///
    /// Models with a single focal length name it `f`.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            CameraModelId::SimplePinhole => &["f", "cx", "cy"],
            CameraModelId::Pinhole => &["fx", "fy", "cx", "cy"],
            CameraModelId::SimpleRadial | CameraModelId::SimpleRadialFisheye => {
                &["f", "cx", "cy", "k"]
            }
            CameraModelId::Radial | CameraModelId::RadialFisheye => &["f", "cx", "cy", "k1", "k2"],
            CameraModelId::OpenCV => &["fx", "fy", "cx", "cy", "k1", "k2", "p1", "p2"],
            CameraModelId::OpenCVFisheye => &["fx", "fy", "cx", "cy", "k1", "k2", "k3", "k4"],
            CameraModelId::FullOpenCV => &[
                "fx", "fy", "cx", "cy", "k1", "k2", "p1", "p2", "k3", "k4", "k5", "k6",
            ],
            CameraModelId::Fov => &["fx", "fy", "cx", "cy", "omega"],
            CameraModelId::ThinPrismFisheye => &[
                "fx", "fy", "cx", "cy", "k1", "k2", "p1", "p2", "k3", "k4", "sx1", "sy1",
            ],
        }
    }

    /// The number of parameters the model expects.
    #[inline]
    pub fn num_params(&self) -> usize {
        self.param_names().len()
    }

    /// Whether the model shares one focal length between both axes.
    #[inline]
    pub fn has_single_focal_length(&self) -> bool {
        self.param_names()[0] == "f"
    }
}

impl std::fmt::Display for CameraModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a camera in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapCamera {
    /// Camera id
    pub camera_id: u32,
    /// Camera model id
    pub model_id: CameraModelId,
    /// Image width
    pub width: usize,
    /// Image height
    pub height: usize,
    /// Camera parameters
    pub params: Vec<f64>,
}

/// Represents an image in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapImage {
    /// Image name
    pub name: String,
    /// Image id
    pub image_id: u32,
    /// Camera id
    pub camera_id: u32,
    /// Rotation
    pub rotation: [f64; 4], // qw, qx, qy, qz
    /// Translation
    pub translation: [f64; 3], // x, y, z
    /// Points2d as (x, y, point3d_id), -1 when the keypoint has no 3D point.
    pub points2d: Vec<(f64, f64, i64)>,
}

impl ColmapImage {
    /// The 3D point ids of the keypoints, -1 for keypoints without a 3D point.
    pub fn point3d_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.points2d.iter().map(|&(_, _, id)| id)
    }
}

/// Represents a 3D point in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapPoint3d {
    /// Point3d id
    pub point3d_id: u64,
    /// x, y, z coordinates
    pub xyz: [f64; 3],
    /// rgb color
    pub rgb: [u8; 3],
    /// Error
    pub error: f64,
    /// Track as (image_id, point2d_idx)
    pub track: Vec<(u32, u32)>,
}

/// A full sparse reconstruction, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ColmapModel {
    /// Cameras by camera id
    pub cameras: HashMap<u32, ColmapCamera>,
    /// Images by image id
    pub images: HashMap<u32, ColmapImage>,
    /// 3D points by point id
    pub points3d: HashMap<u64, ColmapPoint3d>,
}
