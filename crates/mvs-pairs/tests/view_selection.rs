use std::{fs, path::Path};

use approx::assert_relative_eq;
use mvs_pairs::{
    aggregate_scene_dirs, pairs, scene::scene_model_dir, view_selection, RankingPolicy,
    ScoreParams, ViewSelectionError,
};

const HALF_BASELINE: f64 = 0.5;

/// Writes a three-view scene: views 0 and 1 share two points seen under 3 and
/// 5 degrees, view 2 sees only a point of its own.
fn write_scene(root: &Path, scene_id: u32, focal: &str) -> std::io::Result<()> {
    let dir = scene_model_dir(root, scene_id);
    fs::create_dir_all(&dir)?;

    fs::write(
        dir.join("cameras.txt"),
        format!(
            "# Camera list with one line of data per camera:\n\
             #   CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[]\n\
             # Number of cameras: 1\n\
             1 PINHOLE 1600 1200 {focal} 800 600\n"
        ),
    )?;

    // cameras on the x axis with identity rotation, t = -c
    let d = HALF_BASELINE;
    fs::write(
        dir.join("images.txt"),
        format!(
            "# Image list with two lines of data per image:\n\
             #   IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME\n\
             #   POINTS2D[] as (X, Y, POINT3D_ID)\n\
             # Number of images: 3\n\
             1 1 0 0 0 {d} 0 0 1 00000000.jpg\n\
             10 10 1 20 20 2 30 30 -1\n\
             2 1 0 0 0 {} 0 0 1 00000001.jpg\n\
             11 11 2 21 21 1\n\
             3 1 0 0 0 0 -50 0 1 00000002.jpg\n\
             12 12 3 40 40 -1\n",
            -d
        ),
    )?;

    // points on the z axis subtending 3 and 5 degrees
    let h1 = d / 1.5f64.to_radians().tan();
    let h2 = d / 2.5f64.to_radians().tan();
    fs::write(
        dir.join("points3D.txt"),
        format!(
            "# 3D point list with one line of data per point:\n\
             #   POINT3D_ID, X, Y, Z, R, G, B, ERROR, TRACK[] as (IMAGE_ID, POINT2D_IDX)\n\
             # Number of points: 3\n\
             1 0 0 {h1} 255 0 0 0.5 1 0 2 1\n\
             2 0 0 {h2} 0 255 0 0.5 1 1 2 0\n\
             3 0 60 0 0 0 255 0.5 3 0\n"
        ),
    )?;

    Ok(())
}

#[test]
fn two_shared_points_rank_above_empty_pair() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();

    let root = tempfile::tempdir()?;
    write_scene(root.path(), 1, "1500 1500")?;

    let params = ScoreParams::default();
    let (refs, srcs) = ([0, 1], [0, 1, 2]);
    let scores = aggregate_scene_dirs(root.path(), &[1], &refs, &srcs, &params)?;

    let expected = (-2.0f64).exp() + 1.0;
    assert_relative_eq!(scores[(0, 1)], expected, epsilon = 1e-6);
    assert_relative_eq!(scores[(1, 0)], expected, epsilon = 1e-6);
    assert_eq!(scores[(0, 2)], 0.0);
    assert_eq!(scores[(1, 2)], 0.0);

    let rankings = view_selection(&scores, &refs, &srcs, &RankingPolicy::default())?;
    assert_eq!(rankings.len(), 2);
    for (ranking, other) in rankings.iter().zip([1, 0]) {
        assert_eq!(ranking.sources.len(), 2);
        assert_eq!(ranking.sources[0].0, other);
        assert_relative_eq!(ranking.sources[0].1, expected, epsilon = 1e-6);
        assert_eq!(ranking.sources[1], (2, 0.0));
    }

    let output = root.path().join("pairs.txt");
    pairs::write_pair_file(&output, &rankings)?;
    let contents = fs::read_to_string(&output)?;
    assert_eq!(
        contents,
        "2\n0\n2 1 1.135335 2 0.000000\n1\n2 0 1.135335 2 0.000000\n"
    );
    Ok(())
}

#[test]
fn duplicated_scene_gives_same_mean() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    write_scene(root.path(), 1, "1500 1500")?;

    let params = ScoreParams::default();
    let (refs, srcs) = ([0, 1, 2], [0, 1, 2]);
    let once = aggregate_scene_dirs(root.path(), &[1], &refs, &srcs, &params)?;
    let twice = aggregate_scene_dirs(root.path(), &[1, 1], &refs, &srcs, &params)?;

    for (a, b) in once.as_slice().iter().zip(twice.as_slice()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn malformed_scene_fails_the_batch() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    write_scene(root.path(), 1, "1500 1500")?;
    // PINHOLE with a single focal length
    write_scene(root.path(), 2, "1500")?;

    let res = aggregate_scene_dirs(
        root.path(),
        &[1, 2],
        &[0, 1],
        &[0, 1, 2],
        &ScoreParams::default(),
    );
    match res {
        Err(ViewSelectionError::Scene { scene, .. }) => assert_eq!(scene, "scan2"),
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn missing_scene_fails_the_batch() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    write_scene(root.path(), 1, "1500 1500")?;

    let res = aggregate_scene_dirs(root.path(), &[1, 3], &[0], &[0], &ScoreParams::default());
    assert!(matches!(res, Err(ViewSelectionError::Scene { scene, .. }) if scene == "scan3"));
    Ok(())
}
