//! og-image rendering tests. Need a local Chrome or Chromium.
//!
//! Run with: `cargo test --test browser_og -- --ignored`

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Copy `fixtures/project/` into a temp dir and build it.
fn build_fixture_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_virgil"))
        .args(["build", "--root", tmp.path().to_str().unwrap()])
        .output()
        .expect("failed to run virgil");
    assert!(
        out.status.success(),
        "build failed:\n{}\n{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    tmp
}

fn manifest(root: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(root.join("virgil.manifest.json")).unwrap()).unwrap()
}

fn og_file(root: &Path, id: &str) -> PathBuf {
    let public = manifest(root)["og"][id]
        .as_str()
        .unwrap_or_else(|| panic!("no og entry for {id}"))
        .to_string();
    root.join("public").join(public.trim_start_matches('/'))
}

#[test]
#[ignore]
fn renders_default_card_at_open_graph_size() {
    let tmp = build_fixture_project();
    let png = og_file(tmp.path(), "home");

    let img = image::open(&png).unwrap();
    assert_eq!((img.width(), img.height()), (1200, 630));
}

#[test]
#[ignore]
fn renders_template_card() {
    let tmp = build_fixture_project();
    let png = og_file(tmp.path(), "docs");

    assert!(png.exists());
    let name = png.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("docs."));
    assert!(name.ends_with(".png"));
}

#[test]
#[ignore]
fn template_edit_produces_new_file_name() {
    let tmp = build_fixture_project();
    let before = og_file(tmp.path(), "docs");

    let template = tmp.path().join("templates/card.html");
    let html = fs::read_to_string(&template).unwrap();
    fs::write(&template, html.replace("72px", "64px")).unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_virgil"))
        .args(["build", "--root", tmp.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(out.status.success());

    let after = og_file(tmp.path(), "docs");
    assert_ne!(before, after);
    assert!(after.exists());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Generated 1, skipped 3, errors 0"));
}

#[test]
#[ignore]
fn configured_size_is_respected() {
    let tmp = TempDir::new().unwrap();
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    fs::write(
        tmp.path().join("virgil.toml"),
        "[og_image]\nwidth = 800\nheight = 418\n",
    )
    .unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_virgil"))
        .args(["build", "--root", tmp.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(out.status.success());

    let img = image::open(og_file(tmp.path(), "home")).unwrap();
    assert_eq!((img.width(), img.height()), (800, 418));
}
