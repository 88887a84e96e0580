//! Embeds the workspace `VERSION` file as `LAUNCHER_ACCOUNT_VERSION`.

use std::path::{Path, PathBuf};

fn read_version(path: &Path) -> Result<String, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|error| format!("unable to read {}: {error}", path.display()))?;
    let version = raw.trim().to_string();

    let numeric_parts = version
        .split('.')
        .filter(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        .count();
    if numeric_parts != 3 {
        return Err(format!("VERSION must look like MAJOR.MINOR.PATCH, got {version:?}"));
    }

    Ok(version)
}

fn main() {
    let version_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../VERSION");
    println!("cargo:rerun-if-changed={}", version_path.display());

    match read_version(&version_path) {
        Ok(version) => println!("cargo:rustc-env=LAUNCHER_ACCOUNT_VERSION={version}"),
        Err(message) => panic!("{message}"),
    }
}
