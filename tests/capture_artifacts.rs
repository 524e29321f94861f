//! Artifact-level tests: the stitch pipeline over real part files, the
//! temp-file cleanup invariant, and the filename plumbing that ties them
//! together.

use image::{Rgba, RgbaImage};
use std::path::PathBuf;

use tallshot::capture::metadata::{sanitize_filename, PageMetadata};
use tallshot::capture::{remove_temp_parts, scroll_positions, stitch::stitch_vertical};

fn write_part(dir: &std::path::Path, name: &str, w: u32, h: u32, px: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(w, h, Rgba(px)).save(&path).unwrap();
    path
}

#[test]
fn stitch_then_cleanup_leaves_only_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let idx = 1;

    // Header + two scroll parts, the way the capture loop lays them out.
    let parts = vec![
        write_part(dir.path(), &format!("tmp_{idx}_header.png"), 1920, 1080, [1, 1, 1, 255]),
        write_part(dir.path(), &format!("tmp_{idx}_part1.png"), 1920, 1080, [2, 2, 2, 255]),
        write_part(dir.path(), &format!("tmp_{idx}_part2.png"), 1920, 1080, [3, 3, 3, 255]),
    ];

    let stitched = stitch_vertical(&parts).unwrap();
    assert_eq!((stitched.width(), stitched.height()), (1920, 3240));

    let meta = PageMetadata {
        publication: "Example".into(),
        title: "A Tall Story".into(),
        date: "05 Aug 2026".into(),
    };
    let out_path = dir.path().join(format!("{}.png", meta.file_stem()));
    stitched.save(&out_path).unwrap();

    remove_temp_parts(&parts);

    // Zero temp files for this index remain; the artifact does.
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with(&format!("tmp_{idx}_")))
        .collect();
    assert!(leftovers.is_empty(), "temp parts left behind: {leftovers:?}");
    assert!(out_path.exists());

    // Cleanup is idempotent.
    remove_temp_parts(&parts);
}

#[test]
fn stitched_geometry_matches_capture_order() {
    let dir = tempfile::tempdir().unwrap();
    let parts = vec![
        write_part(dir.path(), "a.png", 800, 100, [255, 0, 0, 255]),
        write_part(dir.path(), "b.png", 800, 200, [0, 255, 0, 255]),
        write_part(dir.path(), "c.png", 800, 150, [0, 0, 255, 255]),
    ];

    let canvas = stitch_vertical(&parts).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (800, 450));
    assert_eq!(canvas.get_pixel(400, 50), &Rgba([255, 0, 0, 255]));
    assert_eq!(canvas.get_pixel(400, 250), &Rgba([0, 255, 0, 255]));
    assert_eq!(canvas.get_pixel(400, 400), &Rgba([0, 0, 255, 255]));
}

#[test]
fn scroll_plan_and_stitch_agree_on_part_count() {
    // A 3-viewport document plans 2 scroll stops; with the header shot
    // that makes 3 stitched parts.
    let positions = scroll_positions(3240, 1080, 3);
    assert_eq!(positions, vec![1080, 2160]);

    let dir = tempfile::tempdir().unwrap();
    let mut parts = vec![write_part(dir.path(), "tmp_9_header.png", 640, 360, [8, 8, 8, 255])];
    for (i, _) in positions.iter().enumerate() {
        parts.push(write_part(
            dir.path(),
            &format!("tmp_9_part{}.png", i + 1),
            640,
            360,
            [9, 9, 9, 255],
        ));
    }

    let canvas = stitch_vertical(&parts).unwrap();
    assert_eq!(canvas.height(), 360 * 3);
}

#[test]
fn artifact_names_are_filesystem_safe() {
    let meta = PageMetadata {
        publication: "Example".into(),
        title: r#"Title: "Big News"?"#.into(),
        date: "05 Aug 2026".into(),
    };
    let stem = meta.file_stem();
    assert_eq!(stem, "Example_Title_ Big News_05 Aug 2026");
    assert_eq!(stem, sanitize_filename(&stem), "stem must already be clean");
}
