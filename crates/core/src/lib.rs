//! sprite-core
//!
//! Core library for turning a directory of SVG icon files into one combined
//! sprite document and making the icons addressable by name at runtime.
//!
//! This crate holds the whole pipeline: the SVG optimizer, the sprite
//! assembler, the injection-script generators, and the build-tool plugin
//! adapter. The goal is to keep all substantive logic here so it is fully
//! testable and reusable from multiple frontends (CLI, bundler plugins).

pub mod optimize;
pub mod plugin;
pub mod script;
pub mod sprite;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
