//! Dependency versions from a `package.json`-style manifest
//!
//! Every failure is reported as a [`PackageVersions::Diagnostic`] so that a
//! bad manifest never spoils the rest of a tool response.

use crate::results::PackageVersions;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Sections merged in order; later sections override earlier ones
const DEPENDENCY_SECTIONS: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// Reported when the caller did not ask for dependencies
pub const NO_DEPENDENCY_FILE_MESSAGE: &str = "No dependency file provided.";

/// Reads a manifest resolved against the current working directory
pub fn read_dependencies(path: &str) -> PackageVersions {
    match std::env::current_dir() {
        Ok(cwd) => read_dependencies_from(&cwd, path),
        Err(e) => PackageVersions::diagnostic(format!(
            "Could not determine the working directory to resolve {}: {}",
            path, e
        )),
    }
}

/// Reads a manifest resolved against `base_dir` (absolute paths are used as-is)
pub fn read_dependencies_from(base_dir: &Path, path: &str) -> PackageVersions {
    let resolved: PathBuf = base_dir.join(path);

    if !resolved.is_file() {
        ::log::warn!("Dependency file not found: {}", resolved.display());
        return PackageVersions::diagnostic(format!(
            "Dependency file not found at: {}",
            resolved.display()
        ));
    }

    let contents = match std::fs::read_to_string(&resolved) {
        Ok(contents) => contents,
        Err(e) => {
            return PackageVersions::diagnostic(format!(
                "Error reading dependency file {}: {}",
                resolved.display(),
                e
            ));
        }
    };

    let manifest: Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            return PackageVersions::diagnostic(format!(
                "Error parsing dependency file {}: {}",
                resolved.display(),
                e
            ));
        }
    };

    let versions = merge_sections(&manifest);
    if versions.is_empty() {
        return PackageVersions::diagnostic(format!("No dependencies found in {}", path));
    }

    ::log::debug!(
        "Read {} dependency versions from {}",
        versions.len(),
        resolved.display()
    );
    PackageVersions::Versions(versions)
}

fn merge_sections(manifest: &Value) -> BTreeMap<String, String> {
    let mut versions = BTreeMap::new();

    for section in DEPENDENCY_SECTIONS {
        let Some(entries) = manifest.get(section).and_then(Value::as_object) else {
            continue;
        };
        merge_section(entries, &mut versions);
    }

    versions
}

fn merge_section(entries: &Map<String, Value>, versions: &mut BTreeMap<String, String>) {
    for (name, value) in entries {
        if let Some(version) = value.as_str() {
            versions.insert(name.clone(), strip_range_modifier(version).to_string());
        }
    }
}

/// Drops one leading `^` or `~`
pub fn strip_range_modifier(version: &str) -> &str {
    version
        .strip_prefix('^')
        .or_else(|| version.strip_prefix('~'))
        .unwrap_or(version)
}
