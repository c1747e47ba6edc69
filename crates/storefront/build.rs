//! Build script for the storefront crate.
//!
//! Fingerprints `static/css/main.css` so the stylesheet can be served with an
//! immutable cache lifetime. The hash is exported as `CSS_HASH` and the file is
//! copied to `static/css/derived/main.<hash>.css`, replacing older copies.

use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Hex characters of the SHA-256 digest kept in the file name.
const HASH_LEN: usize = 8;

fn main() -> Result<(), Box<dyn Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let css_path = manifest_dir.join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let Ok(content) = fs::read(&css_path) else {
        println!("cargo:warning=main.css not found, CSS_HASH left empty");
        println!("cargo:rustc-env=CSS_HASH=");
        return Ok(());
    };

    let hash = short_hash(&content);
    println!("cargo:rustc-env=CSS_HASH={hash}");

    publish(&manifest_dir.join("static/css/derived"), &hash, &content)
}

fn short_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let mut hex = format!("{digest:x}");
    hex.truncate(HASH_LEN);
    hex
}

/// Write `main.<hash>.css` and remove fingerprints of previous builds.
fn publish(derived_dir: &Path, hash: &str, content: &[u8]) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(derived_dir)?;
    let file_name = format!("main.{hash}.css");

    for entry in fs::read_dir(derived_dir)? {
        let path = entry?.path();
        let stale = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("main.") && n.ends_with(".css") && n != file_name);
        if stale {
            fs::remove_file(&path)?;
        }
    }

    fs::write(derived_dir.join(file_name), content)?;
    Ok(())
}
