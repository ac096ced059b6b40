use argh::FromArgs;
use std::path::PathBuf;

use mvs_pairs::{
    aggregate_scene_dirs,
    config::{default_views, ViewSelectionConfig, DEFAULT_NUM_VIEWS, DEFAULT_SRC_STRIDE},
    scene, view_selection, write_pair_file,
};

#[derive(FromArgs)]
/// Rank the source views of every reference view from COLMAP sparse models
/// and write an MVS pair file.
struct Args {
    /// path to a JSON configuration file, the flags below override its values
    #[argh(option)]
    config: Option<PathBuf>,

    /// directory holding the scan<ID>/sparse/0 reconstructions
    #[argh(option)]
    colmap_dir: Option<PathBuf>,

    /// scene to average the scores over, repeat for several scenes
    #[argh(option)]
    scene_id: Vec<u32>,

    /// preferred triangulation angle in degrees
    #[argh(option)]
    theta0: Option<f64>,

    /// spread in degrees for angles below theta0
    #[argh(option)]
    sigma1: Option<f64>,

    /// spread in degrees for angles above theta0
    #[argh(option)]
    sigma2: Option<f64>,

    /// number of views per scene, all of them are reference views
    #[argh(option)]
    num_views: Option<usize>,

    /// stride between source views
    #[argh(option)]
    src_stride: Option<usize>,

    /// output pair file, defaults to <colmap-dir>/pairs.txt
    #[argh(option)]
    output: Option<PathBuf>,

    /// also drop the lowest scoring source view of every reference view
    #[argh(switch)]
    drop_lowest: bool,

    /// keep a reference view among its own source views
    #[argh(switch)]
    keep_self: bool,

    /// write the sparse points of every scene to scan<ID>/makeply.ply
    #[argh(switch)]
    export_ply: bool,
}

impl Args {
    fn into_config(self) -> Result<ViewSelectionConfig, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => ViewSelectionConfig::from_json_file(path)?,
            None => ViewSelectionConfig::default(),
        };
        Ok(self.apply_overrides(config))
    }

    /// Merge the flags over a configuration.
    ///
    /// Options replace the configured value when given. `--num-views` or
    /// `--src-stride` rebuild both view lists, the missing one taking its
    /// default. Switches can only turn their setting away from the default,
    /// `--keep-self` clears `exclude_self`.
    fn apply_overrides(self, mut config: ViewSelectionConfig) -> ViewSelectionConfig {
        if let Some(colmap_dir) = self.colmap_dir {
            config.colmap_dir = colmap_dir;
        }
        if !self.scene_id.is_empty() {
            config.scene_ids = self.scene_id;
        }
        if let Some(theta0) = self.theta0 {
            config.score.theta0 = theta0;
        }
        if let Some(sigma1) = self.sigma1 {
            config.score.sigma1 = sigma1;
        }
        if let Some(sigma2) = self.sigma2 {
            config.score.sigma2 = sigma2;
        }
        if self.num_views.is_some() || self.src_stride.is_some() {
            (config.ref_views, config.src_views) = default_views(
                self.num_views.unwrap_or(DEFAULT_NUM_VIEWS),
                self.src_stride.unwrap_or(DEFAULT_SRC_STRIDE),
            );
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        config.ranking.drop_lowest |= self.drop_lowest;
        config.ranking.exclude_self &= !self.keep_self;
        config.export_ply |= self.export_ply;

        config
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    let config = args.into_config()?;
    config.validate()?;

    log::info!(
        "scoring {} reference x {} source views over {} scenes (theta0={}, sigma1={}, sigma2={})",
        config.ref_views.len(),
        config.src_views.len(),
        config.scene_ids.len(),
        config.score.theta0,
        config.score.sigma1,
        config.score.sigma2,
    );

    let scores = aggregate_scene_dirs(
        &config.colmap_dir,
        &config.scene_ids,
        &config.ref_views,
        &config.src_views,
        &config.score,
    )?;

    let rankings = view_selection(
        &scores,
        &config.ref_views,
        &config.src_views,
        &config.ranking,
    )?;

    let output = config.output_path();
    write_pair_file(&output, &rankings)?;
    log::info!("wrote {} rankings to {}", rankings.len(), output.display());

    if config.export_ply {
        for &scene_id in &config.scene_ids {
            let points = mvs_pairs_colmap::read_points3d_txt(
                scene::scene_model_dir(&config.colmap_dir, scene_id).join("points3D.txt"),
            )?;
            let ply_path = scene::scene_dir(&config.colmap_dir, scene_id).join("makeply.ply");
            mvs_pairs_colmap::ply::write_points3d_ply(&points, &ply_path)?;
            log::info!("ply file generated for scene {scene_id:03}");
        }
    }

    Ok(())
}
