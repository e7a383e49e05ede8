//! End-to-end tests over a synthetic DTU-layout dataset on disk.

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use mvs_core::{DepthMap, DepthMode};
use mvs_io::{
    write_pfm, DatasetConfig, DatasetLayout, DtuLayout, InsufficientViewsPolicy,
    LightingSelector, MvsDataset, MvsIoError, SampleSource,
};

const PAIR_TABLE: &str = "2\n0\n3 1 10 2 9 3 8\n1\n3 0 10 2 9 3 8\n";
const WIDTH: u32 = 8;
const HEIGHT: u32 = 4;

fn camera_text(depth_min: f32, interval: f32, tx: f32) -> String {
    format!(
        "extrinsic\n1 0 0 {tx}\n0 1 0 0\n0 0 1 0\n0 0 0 1\n\nintrinsic\n2 0 4\n0 2 2\n0 0 1\n\n{depth_min} {interval}\n"
    )
}

fn write_dataset(root: &Path, pair_table: &str, image_size: impl Fn(u32) -> (u32, u32)) {
    let layout = DtuLayout::new(root);
    fs::create_dir_all(root.join("Cameras/train")).unwrap();
    fs::create_dir_all(root.join("Rectified/scan1_train")).unwrap();
    fs::create_dir_all(root.join("Depths/scan1_train")).unwrap();
    fs::write(layout.pair_path(), pair_table).unwrap();

    for view in 0..4u32 {
        fs::write(
            layout.camera_path("scan1", view),
            camera_text(10.0, 1.0, view as f32),
        )
        .unwrap();

        let (w, h) = image_size(view);
        for light in 0..7u32 {
            let img = RgbImage::from_fn(w, h, |x, _| Rgb([(x * 30) as u8, light as u8 * 10, 255]));
            img.save(layout.image_path("scan1", view, light)).unwrap();
        }

        // Row y holds depth 10 + 2y: 10 and 16 sit on/below the band, 12 and 14 inside
        let mut depth = DepthMap::new(WIDTH as usize, HEIGHT as usize);
        for y in 0..HEIGHT as usize {
            for x in 0..WIDTH as usize {
                depth.set(x, y, 10.0 + 2.0 * y as f32);
            }
        }
        write_pfm(&layout.depth_path("scan1", view), &depth).unwrap();
    }
}

fn config() -> DatasetConfig {
    DatasetConfig::default()
        .with_view_count(3)
        .with_ndepths(8)
        .with_interval_scale(1.0)
        .with_lighting(LightingSelector::Fixed(2))
}

#[test]
fn test_reference_views_select_leading_neighbors() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), PAIR_TABLE, |_| (WIDTH, HEIGHT));

    let dataset =
        MvsDataset::open(DtuLayout::new(dir.path()), &["scan1".to_string()], config()).unwrap();
    assert_eq!(dataset.len(), 2);

    let first = dataset.meta(0).unwrap();
    assert_eq!(first.ref_view, 0);
    assert_eq!(&first.neighbors[..2], &[1, 2]);

    let second = dataset.meta(1).unwrap();
    assert_eq!(second.ref_view, 1);
    assert_eq!(&second.neighbors[..2], &[0, 2]);

    // Stacking order follows selection order: view 1 then 0 then 2
    let sample = dataset.sample(1).unwrap();
    let translations: Vec<f32> = sample
        .projections
        .iter()
        .map(|p| p.matrix()[(0, 3)] / 2.0)
        .collect();
    assert_eq!(translations, vec![1.0, 0.0, 2.0]);
}

#[test]
fn test_sample_contents() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), PAIR_TABLE, |_| (WIDTH, HEIGHT));

    let dataset = MvsDataset::open(
        DtuLayout::new(dir.path()),
        &["scan1".to_string()],
        config().with_depth_mode(DepthMode::Linear),
    )
    .unwrap();
    let sample = dataset.sample(0).unwrap();

    assert_eq!(sample.view_count(), 3);
    assert_eq!(sample.image_size(), (HEIGHT as usize, WIDTH as usize));
    assert_eq!(sample.hypotheses.len(), 8);
    assert_eq!(sample.hypotheses.first(), Some(10.0));
    assert_eq!(sample.depth_min, 10.0);
    assert_eq!(sample.depth_interval, 1.0);
    assert!(sample.name.ends_with("Depths/scan1_train/depth_map_0000.pfm"));

    // Band (11, 16): rows at 12 and 14 are supervised
    assert_eq!(sample.mask.valid_count(), 2 * WIDTH as usize);
    assert!(!sample.mask.is_valid(0, 0));
    assert!(sample.mask.is_valid(0, 1));
    assert!(!sample.mask.is_valid(0, 3));

    // Blue channel is saturated, red ramps with x
    let plane = (WIDTH * HEIGHT) as usize;
    let image = &sample.images[0];
    assert_eq!(image.data[2 * plane], 1.0);
    assert!((image.data[1] - 30.0 / 255.0).abs() < 1e-6);
    // Fixed lighting 2 shows up in the green channel
    assert!((image.data[plane] - 20.0 / 255.0).abs() < 1e-6);
}

#[test]
fn test_all_lightings_and_parallel_batch() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), PAIR_TABLE, |_| (WIDTH, HEIGHT));

    let dataset = MvsDataset::open(
        DtuLayout::new(dir.path()),
        &["scan1".to_string()],
        config().with_lighting(LightingSelector::All),
    )
    .unwrap();
    assert_eq!(dataset.len(), 14);

    let indices: Vec<usize> = (0..dataset.len()).rev().collect();
    let batch = dataset
        .assemble_batch(&indices, InsufficientViewsPolicy::Fail)
        .unwrap();
    assert_eq!(batch.len(), 14);
    // Order of `indices` is preserved: last sample is view 1, first is view 0
    assert!(batch[0].name.ends_with("depth_map_0001.pfm"));
    assert!(batch[13].name.ends_with("depth_map_0000.pfm"));
}

#[test]
fn test_insufficient_views_policy() {
    let dir = TempDir::new().unwrap();
    let table = "2\n0\n1 1 10\n1\n3 0 10 2 9 3 8\n";
    write_dataset(dir.path(), table, |_| (WIDTH, HEIGHT));

    let dataset =
        MvsDataset::open(DtuLayout::new(dir.path()), &["scan1".to_string()], config()).unwrap();

    assert!(matches!(
        dataset.assemble_batch(&[0, 1], InsufficientViewsPolicy::Fail),
        Err(MvsIoError::InsufficientViews { .. })
    ));

    let batch = dataset
        .assemble_batch(&[0, 1], InsufficientViewsPolicy::Skip)
        .unwrap();
    assert_eq!(batch.len(), 1);
    assert!(batch[0].name.ends_with("depth_map_0001.pfm"));
}

#[test]
fn test_view_size_mismatch() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), PAIR_TABLE, |view| {
        if view == 2 {
            (WIDTH / 2, HEIGHT)
        } else {
            (WIDTH, HEIGHT)
        }
    });

    let dataset =
        MvsDataset::open(DtuLayout::new(dir.path()), &["scan1".to_string()], config()).unwrap();
    assert!(matches!(
        dataset.sample(0),
        Err(MvsIoError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_open_dtu_reads_scan_list() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), PAIR_TABLE, |_| (WIDTH, HEIGHT));
    let list = dir.path().join("train.txt");
    fs::write(&list, "scan1\n").unwrap();

    let dataset = MvsDataset::open_dtu(dir.path(), &list, config()).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.meta(0).unwrap().scan, "scan1");
}

#[test]
fn test_malformed_pair_table_is_config_error() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), "3\n0\n1 1 10\n", |_| (WIDTH, HEIGHT));
    let err = MvsDataset::open(DtuLayout::new(dir.path()), &["scan1".to_string()], config())
        .unwrap_err();
    assert!(matches!(err, MvsIoError::InvalidConfig { .. }));
}
