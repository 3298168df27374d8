mod common;

use assert_cmd::Command;
use common::{lattice, render_tiles};
use gridscan::ScanReport;
use predicates::prelude::*;

fn gridscan() -> Command {
    Command::cargo_bin("gridscan").expect("binary")
}

#[test]
fn print_config_emits_defaults() {
    gridscan()
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"render_size\": 400"))
        .stdout(predicate::str::contains("\"min_grid_size\": 3"));
}

#[test]
fn no_inputs_is_an_error() {
    gridscan()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input images"));
}

#[test]
fn scans_images_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let grid = dir.path().join("grid.png");
    render_tiles(400, 400, &lattice(&[60, 200, 340], &[60, 200, 340]), 40)
        .save(&grid)
        .unwrap();
    let empty = dir.path().join("empty.png");
    render_tiles(200, 200, &[], 10).save(&empty).unwrap();
    let out = dir.path().join("out");
    let report = dir.path().join("report.json");

    gridscan()
        .arg(&grid)
        .arg(&empty)
        .arg("--output-dir")
        .arg(&out)
        .arg("--report")
        .arg(&report)
        .arg("--draw-tiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rectified, 1 bailed, 0 failed"));

    assert!(out.join("grid_rendered.png").exists());
    assert!(out.join("grid_rectified.png").exists());
    assert!(out.join("empty_rendered.png").exists());
    assert!(!out.join("empty_rectified.png").exists());

    let parsed = ScanReport::load_json(&report).unwrap();
    assert_eq!(parsed.frames.len(), 2);
    assert!(parsed.params.output.draw_tiles);
    assert_eq!(parsed.frames[0].columns.as_ref().map(Vec::len), Some(3));
}

#[test]
fn config_file_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let grid = dir.path().join("grid.png");
    render_tiles(400, 400, &lattice(&[60, 200, 340], &[60, 200, 340]), 40)
        .save(&grid)
        .unwrap();
    let report = dir.path().join("from_config.json");
    let config = dir.path().join("scan.json");
    std::fs::write(
        &config,
        format!(
            r#"{{ "inputs": [{:?}], "report_path": {:?}, "params": {{ "frame_budget_ms": 0 }} }}"#,
            grid.to_string_lossy(),
            report.to_string_lossy()
        ),
    )
    .unwrap();

    gridscan()
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 rectified, 1 bailed"));

    let parsed = ScanReport::load_json(&report).unwrap();
    assert_eq!(parsed.params.frame_budget_ms, Some(0));
    assert!(!parsed.frames[0].rectified);
}
