mod common;

use approx::assert_abs_diff_eq;
use common::{black_frame, init_logging, lattice, tiles_at, SyntheticVision};
use gridscan_core::{ColorImageView, Point2, Rect};
use gridscan_detector::{
    BailReason, FrameError, FrameOutput, GridScanParams, GridScanner, PaddingViolation,
    QuadDefect, Stage, VisionError,
};

const FRAME: usize = 400;

fn run(blobs: Vec<Rect>, params: GridScanParams) -> (FrameOutput, SyntheticVision) {
    init_logging();
    let vision = SyntheticVision::new(blobs);
    let scanner = GridScanner::new(vision.clone(), params);
    let data = black_frame(FRAME, FRAME);
    let frame = ColorImageView::new(FRAME, FRAME, 3, &data).expect("frame");
    let output = scanner.process_frame(&frame).expect("no frame error");
    (output, vision)
}

fn expect_bail(output: &FrameOutput) -> &BailReason {
    assert_eq!(output.rendered().width, 400);
    assert_eq!(output.rendered().height, 400);
    output.bail_reason().expect("frame should bail")
}

#[test]
fn well_framed_grid_is_rectified() {
    let mut blobs = tiles_at(&lattice(&[60.0, 200.0, 340.0], &[60.0, 200.0, 340.0]), 40.0);
    blobs.reverse();
    // two UI text strips, too elongated to be tiles
    blobs.push(Rect::new(10.0, 385.0, 150.0, 12.0));
    blobs.push(Rect::new(240.0, 385.0, 150.0, 12.0));

    let (output, vision) = run(blobs, GridScanParams::default());
    assert_eq!(vision.issued_contours(), 11);
    assert_eq!(vision.live_contours(), 0);

    let frame = output.rectified().expect("rectified");
    assert_eq!(frame.grid_size, 3);
    assert_eq!(frame.corners.top_left, Point2::new(60.0, 60.0));
    assert_eq!(frame.corners.bottom_right, Point2::new(340.0, 340.0));
    assert_abs_diff_eq!(frame.tile_width, 140.0, epsilon = 1e-12);

    // 280 px square padded by 70 px per side (in destination pixels)
    assert_eq!(frame.image.width, 421);
    assert_eq!(frame.image.height, 421);
    assert_eq!(frame.rendered.width, 400);
    assert!(frame.padded_quad.top_left.x < 0.0);
    assert!(frame.padded_quad.bottom_right.x > 400.0);

    assert_eq!(frame.columns.len(), 3);
    assert_eq!(frame.columns[0], 0.0);
    assert_abs_diff_eq!(frame.columns[1], 140.0 * 400.0 / 421.0, epsilon = 1e-9);
    assert_abs_diff_eq!(frame.columns[2], 280.0 * 400.0 / 421.0, epsilon = 1e-9);

    // centre of the middle tile lands in the middle of the rectified image
    let centre = frame.image.get(210, 210).expect("pixel");
    assert_eq!(centre, 255);
}

#[test]
fn missing_tile_bails_with_insufficient_candidates() {
    let mut centres = lattice(&[60.0, 200.0, 340.0], &[60.0, 200.0, 340.0]);
    centres.remove(4);
    let mut blobs = tiles_at(&centres, 40.0);
    blobs.push(Rect::new(10.0, 385.0, 150.0, 12.0));
    blobs.push(Rect::new(240.0, 385.0, 150.0, 12.0));

    let (output, vision) = run(blobs, GridScanParams::default());
    assert_eq!(vision.live_contours(), 0);
    assert_eq!(output.grid_size(), 3);
    assert_eq!(
        expect_bail(&output),
        &BailReason::InsufficientCandidates {
            found: 8,
            expected: 9
        }
    );
}

#[test]
fn sheared_grid_is_rejected_by_quality_gate() {
    let centres = vec![
        (20.0, 60.0),
        (140.0, 60.0),
        (260.0, 60.0),
        (70.0, 200.0),
        (190.0, 200.0),
        (310.0, 200.0),
        (120.0, 340.0),
        (240.0, 340.0),
        (360.0, 340.0),
    ];
    let (output, vision) = run(tiles_at(&centres, 30.0), GridScanParams::default());
    assert_eq!(vision.live_contours(), 0);
    let reason = expect_bail(&output);
    assert_eq!(
        reason,
        &BailReason::QuadRejected {
            defects: vec![QuadDefect::Parallelogram]
        }
    );
    assert_eq!(reason.stage(), Stage::QualityGate);
}

#[test]
fn grid_too_close_to_camera_fails_padding_validation() {
    let blobs = tiles_at(&lattice(&[20.0, 200.0, 380.0], &[20.0, 200.0, 380.0]), 30.0);
    let (output, vision) = run(blobs, GridScanParams::default());
    assert_eq!(vision.live_contours(), 0);
    assert!(matches!(
        expect_bail(&output),
        BailReason::PaddedQuadRejected {
            violation: PaddingViolation::Oversized { .. }
        }
    ));
}

#[test]
fn two_by_two_grid_is_too_small() {
    let blobs = tiles_at(&lattice(&[100.0, 300.0], &[100.0, 300.0]), 40.0);
    let (output, _) = run(blobs, GridScanParams::default());
    assert_eq!(
        expect_bail(&output),
        &BailReason::GridTooSmall {
            size: 2,
            minimum: 3
        }
    );
}

#[test]
fn empty_frame_bails_quietly() {
    let (output, vision) = run(Vec::new(), GridScanParams::default());
    assert_eq!(vision.issued_contours(), 0);
    assert_eq!(output.grid_size(), 0);
    assert!(matches!(
        expect_bail(&output),
        BailReason::GridTooSmall { size: 0, .. }
    ));
}

#[test]
fn exhausted_budget_bails_after_preprocess() {
    let blobs = tiles_at(&lattice(&[60.0, 200.0, 340.0], &[60.0, 200.0, 340.0]), 40.0);
    let params = GridScanParams {
        frame_budget_ms: Some(0),
        ..GridScanParams::default()
    };
    let (output, vision) = run(blobs, params);
    assert_eq!(vision.issued_contours(), 9);
    assert_eq!(vision.live_contours(), 0);
    assert!(matches!(
        expect_bail(&output),
        BailReason::DeadlineExceeded {
            stage: Stage::Preprocess,
            ..
        }
    ));
}

#[test]
fn tile_outlines_only_touch_the_rendered_image() {
    let blobs = tiles_at(&lattice(&[60.0, 200.0, 340.0], &[60.0, 200.0, 340.0]), 40.0);
    let mut params = GridScanParams::default();
    params.output.draw_tiles = true;
    let (output, _) = run(blobs.clone(), params);
    let annotated = output.rectified().expect("rectified").clone();
    let (plain, _) = run(blobs, GridScanParams::default());
    let plain = plain.rectified().expect("rectified").clone();

    assert_eq!(annotated.image, plain.image);
    assert_ne!(annotated.rendered, plain.rendered);
}

#[test]
fn unsupported_channel_count_is_a_frame_error() {
    let vision = SyntheticVision::new(Vec::new());
    let scanner = GridScanner::new(vision, GridScanParams::default());
    let data = vec![0u8; 16 * 16 * 2];
    let frame = ColorImageView {
        width: 16,
        height: 16,
        channels: 2,
        data: &data,
    };
    let err = scanner.process_frame(&frame).unwrap_err();
    assert!(matches!(err, FrameError::Vision(VisionError::Buffer(_))));
}

#[test]
fn degenerate_frame_is_a_frame_error() {
    let scanner = GridScanner::new(SyntheticVision::default(), GridScanParams::default());
    let data = [0u8; 3];
    let frame = ColorImageView::new(1, 1, 3, &data).expect("frame");
    assert!(matches!(
        scanner.process_frame(&frame),
        Err(FrameError::EmptyFrame {
            width: 1,
            height: 1
        })
    ));
}
