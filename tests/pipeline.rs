//! End-to-end checks of the adjustment pipeline through the public API.
//!
//! Pixel assertions use small in-memory buffers; the last tests go through
//! the real `image` backend and write into a temp directory.

use image::{ImageEncoder, Rgba, RgbaImage};
use phototone::export::{ExportRequest, ExportSettings, export_batch, export_image};
use phototone::imaging::filters;
use phototone::imaging::render::{apply_color_matrix, render};
use phototone::imaging::{
    AdjustmentState, Amount, BufferLedger, ImageBackend, OrientationCode, OutputFormat,
    PixelBuffer, Rotation, RustBackend, build_combined_matrix, resolve_rotation,
};
use phototone::preview::Preview;
use phototone::storage::DirectoryStorage;
use std::path::Path;

fn solid(width: u32, height: u32, pixel: [u8; 4]) -> PixelBuffer {
    PixelBuffer::from_image(RgbaImage::from_pixel(width, height, Rgba(pixel)))
}

fn pixels(buffer: &PixelBuffer) -> Vec<[u8; 4]> {
    buffer.image().pixels().map(|p| p.0).collect()
}

fn write_png(path: &Path, image: &RgbaImage) {
    let mut bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn contrast_keeps_mid_gray_through_rotation() {
    let state = AdjustmentState {
        contrast: Amount::new(50),
        ..Default::default()
    };
    let rotation = resolve_rotation(OrientationCode::ROTATE_90);
    assert_eq!(rotation, Rotation::Clockwise90);

    let mut ledger = BufferLedger::new();
    let source = solid(2, 2, [128, 128, 128, 255]);
    ledger.track(&source);
    let out = render(source, rotation, &build_combined_matrix(&state), &mut ledger);

    assert_eq!(out.dimensions(), (2, 2));
    assert!(pixels(&out).iter().all(|p| *p == [128, 128, 128, 255]));
    assert_eq!(ledger.outstanding(), 1);
}

#[test]
fn neutral_state_is_identity_on_pixels() {
    let state = AdjustmentState::default();
    let matrix = build_combined_matrix(&state);
    assert!(matrix.is_identity());

    let source = solid(3, 2, [12, 200, 77, 140]);
    let out = apply_color_matrix(&source, &matrix);
    assert_eq!(pixels(&out), pixels(&source));
}

#[test]
fn full_grayscale_equalizes_channels() {
    let state = AdjustmentState {
        gray: Amount::FULL,
        ..Default::default()
    };
    let out = apply_color_matrix(
        &solid(1, 1, [200, 100, 50, 255]),
        &build_combined_matrix(&state),
    );
    let [r, g, b, a] = pixels(&out)[0];
    assert_eq!(r, g);
    assert_eq!(g, b);
    assert_eq!(r, 118);
    assert_eq!(a, 255);
}

#[test]
fn negative_twice_restores_pixels() {
    let state = AdjustmentState {
        negative: true,
        ..Default::default()
    };
    let matrix = build_combined_matrix(&state);
    let source = solid(2, 1, [0, 64, 255, 9]);
    let once = apply_color_matrix(&source, &matrix);
    assert_eq!(pixels(&once)[0], [255, 191, 0, 9]);
    let twice = apply_color_matrix(&once, &matrix);
    assert_eq!(pixels(&twice), pixels(&source));
}

#[test]
fn full_brightness_clamps_instead_of_wrapping() {
    let state = AdjustmentState {
        brightness: Amount::FULL,
        ..Default::default()
    };
    let out = apply_color_matrix(
        &solid(1, 1, [250, 100, 0, 255]),
        &build_combined_matrix(&state),
    );
    assert_eq!(pixels(&out)[0], [255, 200, 0, 255]);
}

#[test]
fn combined_matrix_clamps_once_at_the_end() {
    let state = AdjustmentState {
        brightness: Amount::FULL,
        contrast: Amount::new(10),
        ..Default::default()
    };
    let source = solid(1, 1, [200, 100, 0, 255]);

    // 200 doubles to 400 and contrast pulls it back to ~206.9 before clamping.
    let combined = apply_color_matrix(&source, &build_combined_matrix(&state));
    assert_eq!(pixels(&combined)[0], [207, 149, 91, 255]);

    // Clamping between filters loses the headroom: 255 maps to ~164.8.
    let brightened = apply_color_matrix(&source, &filters::brightness(Amount::FULL));
    let stepwise = apply_color_matrix(&brightened, &filters::contrast(Amount::new(10)));
    assert_eq!(pixels(&stepwise)[0], [165, 149, 91, 255]);
}

#[test]
fn rotation_moves_pixels_clockwise() {
    let mut image = RgbaImage::new(2, 1);
    image.put_pixel(0, 0, Rgba([10, 0, 0, 255]));
    image.put_pixel(1, 0, Rgba([0, 10, 0, 255]));
    let mut ledger = BufferLedger::new();

    let out = render(
        PixelBuffer::from_image(image),
        Rotation::Clockwise90,
        &build_combined_matrix(&AdjustmentState::default()),
        &mut ledger,
    );
    assert_eq!(out.dimensions(), (1, 2));
    assert_eq!(pixels(&out), vec![[10, 0, 0, 255], [0, 10, 0, 255]]);
}

#[test]
fn export_writes_filtered_png() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = tmp.path().join("001-Pier.png");
    write_png(&source, &RgbaImage::from_pixel(3, 2, Rgba([0, 64, 255, 255])));

    let settings = ExportSettings {
        format: OutputFormat::Png,
        ..Default::default()
    };
    let state = AdjustmentState {
        negative: true,
        ..Default::default()
    };
    let request = ExportRequest::new(&source, state, settings).with_file_name("pier.png");
    let storage = DirectoryStorage::new(tmp.path().join("out"));
    let backend = RustBackend::new();

    let outcome = export_image(&backend, &storage, &request).unwrap();
    assert_eq!(outcome.handle.path(), tmp.path().join("out/pier.png"));
    assert_eq!((outcome.width, outcome.height), (3, 2));
    assert_eq!(outcome.rotation_degrees, 0);

    let written = backend
        .decode(&std::fs::read(outcome.handle.path()).unwrap())
        .unwrap();
    assert!(pixels(&written).iter().all(|p| *p == [255, 191, 0, 255]));
}

#[test]
fn batch_export_keeps_going_after_failure() {
    let tmp = tempfile::TempDir::new().unwrap();
    let good = tmp.path().join("good.png");
    let bad = tmp.path().join("bad.png");
    write_png(&good, &RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])));
    std::fs::write(&bad, b"not an image").unwrap();

    let settings = ExportSettings {
        format: OutputFormat::Png,
        ..Default::default()
    };
    let requests = vec![
        ExportRequest::new(&bad, AdjustmentState::default(), settings.clone())
            .with_file_name("bad-out.png"),
        ExportRequest::new(&good, AdjustmentState::default(), settings)
            .with_file_name("good-out.png"),
    ];
    let storage = DirectoryStorage::new(tmp.path().join("out"));

    let (results, summary) = export_batch(&RustBackend::new(), &storage, &requests, None);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failed, 1);
    assert!(results[0].is_err());
    assert!(results[1].is_ok());
    assert!(tmp.path().join("out/good-out.png").exists());
    assert!(!tmp.path().join("out/bad-out.png").exists());
}

#[test]
fn preview_and_export_share_the_same_filter() {
    let state = AdjustmentState {
        sepia: Amount::new(60),
        contrast: Amount::new(30),
        ..Default::default()
    };
    let gradient = RgbaImage::from_fn(4, 4, |x, y| Rgba([(x * 60) as u8, (y * 60) as u8, 90, 255]));
    let preview = Preview::new(PixelBuffer::from_image(gradient.clone()));

    let mut ledger = BufferLedger::new();
    let exported = render(
        PixelBuffer::from_image(gradient),
        Rotation::None,
        &build_combined_matrix(&state),
        &mut ledger,
    );
    assert_eq!(pixels(&preview.render(&state)), pixels(&exported));
}
