#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Score aggregation over a batch of scenes.
pub mod aggregate;

/// Run configuration.
pub mod config;

mod error;
pub use error::ViewSelectionError;

/// Ranking of source views and pair file I/O.
pub mod pairs;

/// Camera intrinsics and extrinsics from sparse models.
pub mod pose;

/// Scene data read by the pairwise score.
pub mod scene;

/// Pairwise view score.
pub mod score;

/// Conversions between arrays and faer types.
pub mod utils;

pub use aggregate::{aggregate_scene_dirs, aggregate_scores, ScoreMatrix};
pub use pairs::{view_selection, write_pair_file, RankingPolicy, ViewPairs};
pub use scene::Scene;
pub use score::{pair_score, ScoreParams};
