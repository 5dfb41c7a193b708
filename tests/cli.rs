use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

fn demo_level() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("levels/demo.xml")
}

fn write_level(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp level");
    tmp.write_all(xml.as_bytes()).expect("write level");
    tmp
}

#[test]
fn summary_only_prints_level_summary() {
    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.arg(demo_level()).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded level 6x5 (29 wall segments, 2 markers)"));
}

#[test]
fn ascii_prints_wall_layout() {
    let level = write_level(r#"<level width="2" depth="2"><border-walls/></level>"#);
    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.arg(level.path()).arg("--ascii");
    cmd.assert()
        .success()
        .stdout(contains("Loaded level 2x2 (8 wall segments, 0 markers)"))
        .stdout(contains("|-  -|\n|_  _|\n"));
}

#[test]
fn render_to_writes_png_of_requested_size() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("demo.png");
    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.arg(demo_level())
        .arg("--render-to")
        .arg(&out)
        .arg("--size")
        .arg("96x64");
    cmd.assert().success().stdout(contains("Wrote"));

    let image = image::open(&out).expect("decodable png").to_rgba8();
    assert_eq!(image.dimensions(), (96, 64));
    // the level is centred, so the middle of the frame is floor, not sky
    assert_ne!(image.get_pixel(48, 32), &image::Rgba([0, 0, 255, 255]));
}

#[test]
fn config_file_changes_clear_colour() {
    let mut config = NamedTempFile::new().expect("temp config");
    writeln!(config, "[window]\nclear_color = [1.0, 0.0, 0.0, 1.0]").expect("write config");
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("red.png");

    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.arg(demo_level())
        .arg("--config")
        .arg(config.path())
        .arg("--render-to")
        .arg(&out)
        .arg("--size")
        .arg("32x32");
    cmd.assert().success();

    let image = image::open(&out).expect("decodable png").to_rgba8();
    // bottom corners lie below the floor diamond
    assert_eq!(image.get_pixel(0, 31), &image::Rgba([255, 0, 0, 255]));
}

#[test]
fn invalid_level_reports_error() {
    let level = write_level(r#"<level width="2" depth="2"><tile x="5" y="0" z="1"/></level>"#);
    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.arg(level.path()).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("Error:"))
        .stderr(contains("failed to parse level"));
}

#[test]
fn malformed_xml_reports_error() {
    let level = write_level("<level width=\"2\"");
    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.arg(level.path()).arg("--summary-only");
    cmd.assert().failure().stderr(contains("Error:"));
}

#[test]
fn missing_arguments_print_usage() {
    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.assert().failure().stderr(contains("Usage: isometric"));
}

#[test]
fn bad_size_is_rejected() {
    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.arg(demo_level()).arg("--size").arg("wide");
    cmd.assert()
        .failure()
        .stderr(contains("invalid size 'wide'"));
}

#[test]
fn unknown_flag_is_rejected() {
    let mut cmd = Command::cargo_bin("isometric").expect("binary exists");
    cmd.arg(demo_level()).arg("--fullscreen");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --fullscreen"));
}
