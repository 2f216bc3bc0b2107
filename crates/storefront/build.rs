//! Build script for storefront crate.
//!
//! Fingerprints the stylesheet and publishes it as
//! `static/css/derived/main.<hash>.css`, exporting the hash as `CSS_HASH` for
//! the `css_hash` template filter. Stale fingerprinted copies are removed.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Hex characters of the SHA-256 digest kept in file names.
const FINGERPRINT_LEN: usize = 8;

fn main() {
    println!("cargo:rerun-if-changed=templates");

    let manifest_dir = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo"),
    );
    let css_dir = manifest_dir.join("static/css");
    let stylesheet = css_dir.join("main.css");
    println!("cargo:rerun-if-changed={}", stylesheet.display());

    let Some(fingerprint) = fingerprint(&stylesheet) else {
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };
    println!("cargo:rustc-env=CSS_HASH={fingerprint}");

    publish(&stylesheet, &css_dir.join("derived"), &fingerprint);
}

/// Truncated SHA-256 of a file, or `None` (with a build warning) if unreadable.
fn fingerprint(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(content) => {
            let mut digest = format!("{:x}", Sha256::digest(&content));
            digest.truncate(FINGERPRINT_LEN);
            Some(digest)
        }
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", path.display());
            None
        }
    }
}

/// Copy the stylesheet under its fingerprinted name and drop older copies.
fn publish(stylesheet: &Path, derived_dir: &Path, fingerprint: &str) {
    fs::create_dir_all(derived_dir).expect("Failed to create derived CSS directory");

    let current = format!("main.{fingerprint}.css");
    if let Ok(entries) = fs::read_dir(derived_dir) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("main.") && name.ends_with(".css") && name != current {
                let _ = fs::remove_file(entry.path());
            }
        }
    }

    fs::copy(stylesheet, derived_dir.join(&current))
        .expect("Failed to copy CSS to derived directory");
}
