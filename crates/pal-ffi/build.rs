//! Build script for pal-ffi.
//!
//! Regenerates `include/palisade.h`, the C header the iOS and desktop
//! hosts compile against, whenever the exported surface changes. The
//! header is committed so consumers never need cbindgen themselves.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")).unwrap_or_default();

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(crate_dir.join("include").join("palisade.h"));
        }
        Err(err) => {
            // Header staleness should not fail the library build itself.
            println!("cargo:warning=skipping header generation: {err}");
        }
    }
}
