//! Reading the name out of an external repository's package descriptor.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// npm-style descriptor.
pub const PACKAGE_JSON: &str = "package.json";

/// Cargo descriptor, consulted when there is no `package.json`.
pub const CARGO_TOML: &str = "Cargo.toml";

#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct CargoManifest {
    #[serde(default)]
    package: Option<CargoPackage>,
}

#[derive(Deserialize)]
struct CargoPackage {
    #[serde(default)]
    name: Option<String>,
}

/// Read the package name declared in `dir`.
///
/// # Errors
/// Returns `MissingPackageDescriptor` when neither descriptor exists,
/// `NoPackageName` when the name is absent or empty, and `PackageParse`
/// when the descriptor is malformed.
pub fn read_package_name(dir: &Path) -> Result<String> {
    let json_path = dir.join(PACKAGE_JSON);
    let cargo_path = dir.join(CARGO_TOML);

    let (path, name) = if json_path.is_file() {
        let content = fs::read_to_string(&json_path)?;
        let parsed: PackageJson =
            serde_json::from_str(&content).map_err(|e| Error::PackageParse {
                file: json_path.clone(),
                message: e.to_string(),
            })?;
        (json_path, parsed.name)
    } else if cargo_path.is_file() {
        let content = fs::read_to_string(&cargo_path)?;
        let parsed: CargoManifest = toml::from_str(&content).map_err(|e| Error::PackageParse {
            file: cargo_path.clone(),
            message: e.to_string(),
        })?;
        (cargo_path, parsed.package.and_then(|p| p.name))
    } else {
        return Err(Error::MissingPackageDescriptor(dir.to_path_buf()));
    };

    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(Error::NoPackageName(path)),
    }
}
