//! Ensures all workspace crates use `version.workspace = true` and that
//! the workspace version matches the compiled crate version.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("crate lives two levels below the workspace root")
        .to_path_buf()
}

fn read_toml(path: &Path) -> toml::Value {
    let raw = std::fs::read_to_string(path).expect("read manifest");
    raw.parse().expect("parse manifest")
}

#[test]
fn all_crates_use_workspace_version() {
    let root = workspace_root();
    let doc = read_toml(&root.join("Cargo.toml"));
    let members = doc["workspace"]["members"]
        .as_array()
        .expect("workspace members");
    assert!(!members.is_empty());

    for member in members {
        let member = member.as_str().expect("member path");
        let manifest = read_toml(&root.join(member).join("Cargo.toml"));
        let version = &manifest["package"]["version"];
        assert_eq!(
            version.get("workspace").and_then(toml::Value::as_bool),
            Some(true),
            "{member} must use version.workspace = true"
        );
    }
}

#[test]
fn crate_version_matches_workspace() {
    let doc = read_toml(&workspace_root().join("Cargo.toml"));
    let version = doc["workspace"]["package"]["version"]
        .as_str()
        .expect("workspace version");
    assert_eq!(tracegrade_core::VERSION, version);
}
