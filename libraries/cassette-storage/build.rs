//! Build script for cassette-storage.
//!
//! Rebuilds the crate when the embedded schema migrations change.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
