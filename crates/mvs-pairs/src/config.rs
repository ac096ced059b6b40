use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{error::ViewSelectionError, pairs::RankingPolicy, score::ScoreParams};

/// Number of views of a DTU scan.
pub const DEFAULT_NUM_VIEWS: usize = 49;

/// Stride between the default source views.
pub const DEFAULT_SRC_STRIDE: usize = 6;

/// Configuration of a view selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSelectionConfig {
    /// Directory holding the `scan<ID>/sparse/0` reconstructions
    pub colmap_dir: PathBuf,
    /// Scenes to average the scores over
    pub scene_ids: Vec<u32>,
    /// Triangulation angle weighting
    pub score: ScoreParams,
    /// Reference view indices
    pub ref_views: Vec<usize>,
    /// Source view indices
    pub src_views: Vec<usize>,
    /// Entries left out of the rankings
    pub ranking: RankingPolicy,
    /// Output pair file, `<colmap_dir>/pairs.txt` when unset
    pub output: Option<PathBuf>,
    /// Also write the sparse points of every scene as `scan<ID>/makeply.ply`
    pub export_ply: bool,
}

impl Default for ViewSelectionConfig {
    fn default() -> Self {
        let (ref_views, src_views) = default_views(DEFAULT_NUM_VIEWS, DEFAULT_SRC_STRIDE);
        Self {
            colmap_dir: PathBuf::from("./results"),
            scene_ids: Vec::new(),
            score: ScoreParams::default(),
            ref_views,
            src_views,
            ranking: RankingPolicy::default(),
            output: None,
            export_ply: false,
        }
    }
}

impl ViewSelectionConfig {
    /// Read a configuration from a JSON file. Missing fields take their default.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ViewSelectionError> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }

    /// The pair file to write.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.colmap_dir.join("pairs.txt"))
    }

    /// Check the configuration before running.
    pub fn validate(&self) -> Result<(), ViewSelectionError> {
        if self.scene_ids.is_empty() {
            return Err(ViewSelectionError::Config("no scene ids".to_string()));
        }
        if self.ref_views.is_empty() || self.src_views.is_empty() {
            return Err(ViewSelectionError::Config(
                "reference and source views must not be empty".to_string(),
            ));
        }

        let ScoreParams {
            theta0,
            sigma1,
            sigma2,
        } = self.score;
        if !theta0.is_finite() {
            return Err(ViewSelectionError::Config(format!(
                "theta0 must be finite, got {theta0}"
            )));
        }
        for (name, sigma) in [("sigma1", sigma1), ("sigma2", sigma2)] {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(ViewSelectionError::Config(format!(
                    "{name} must be positive, got {sigma}"
                )));
            }
        }

        Ok(())
    }
}

/// All views as reference views and every `stride`-th view as source view.
///
/// Example:
///
/// ```
/// use mvs_pairs::config::default_views;
///
/// let (refs, srcs) = default_views(13, 6);
/// assert_eq!(refs.len(), 13);
/// assert_eq!(srcs, vec![0, 6, 12]);
/// ```
pub fn default_views(num_views: usize, stride: usize) -> (Vec<usize>, Vec<usize>) {
    let ref_views = (0..num_views).collect();
    let src_views = (0..num_views).step_by(stride.max(1)).collect();
    (ref_views, src_views)
}
