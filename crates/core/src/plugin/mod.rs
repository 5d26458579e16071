//! Build-tool plugin adapter.
//!
//! Adapts the sprite pipeline to a bundler's hook surface: a virtual
//! importable module that resolves to the injection snippet, static-file
//! emission at build start, and page-markup patching. The delivery mode is
//! collapsed into a strategy exactly once, at construction; no hook
//! branches on the raw mode afterwards.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::optimize::OptimizeConfig;
use crate::script::{create_fetch_snippet, create_inline_script};
use crate::sprite::{generate_sprite, GenerateOptions, GenerateResult, SpriteError};

/// Importable identifier that resolves to the injection snippet.
pub const VIRTUAL_MODULE_ID: &str = "virtual:svg-sprite";

/// Placeholder module body served for the virtual id when the sprite is
/// delivered as a static file instead.
const STATIC_STUB: &str = "// sprite is emitted as a static file at build time\nexport {};\n";

/// Error type for plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Assembly failed; the build must fail with it.
    #[error(transparent)]
    Sprite(#[from] SpriteError),

    /// The sprite file could not be written.
    #[error("failed to write sprite to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Convenience result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// How the assembled sprite reaches the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteMode {
    /// Embedded by the virtual module at load time. Favors fast iterative
    /// rebuilds.
    #[default]
    Inline,
    /// Written to a static file at build start and fetched at runtime.
    File,
    /// `Inline` during interactive development, `File` otherwise.
    Hybrid,
}

/// Whether the host tool is serving interactively or producing a build.
/// Decides which strategy `Hybrid` resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Serve,
    Build,
}

/// Plugin configuration, deserializable from a bundler's JSON config.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    /// Directory of source icon files.
    pub icon_dir: PathBuf,
    #[serde(default)]
    pub mode: SpriteMode,
    /// Where the static sprite file lands in `File`/`Hybrid` delivery.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    /// Patch page markup automatically when a static file is emitted.
    #[serde(default = "default_auto_inject")]
    pub auto_inject: bool,
    /// Passed through to the sprite pipeline untouched.
    #[serde(default)]
    pub optimizer: OptimizeConfig,
}

fn default_output_file() -> PathBuf {
    PathBuf::from("dist/sprite.svg")
}

fn default_auto_inject() -> bool {
    true
}

impl PluginOptions {
    pub fn new(icon_dir: impl Into<PathBuf>) -> Self {
        Self {
            icon_dir: icon_dir.into(),
            mode: SpriteMode::default(),
            output_file: default_output_file(),
            auto_inject: default_auto_inject(),
            optimizer: OptimizeConfig::default(),
        }
    }

    /// Deserialize options from a JSON configuration object.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// The strategy a mode/phase pair collapses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// `load` answers with the inline snippet; nothing is written.
    Inline,
    /// `build_start` emits the file; `load` serves a stub and the HTML
    /// transform wires up the runtime fetch.
    Static,
}

/// Bundler-facing adapter around the sprite pipeline.
pub struct SpritePlugin {
    options: PluginOptions,
    delivery: Delivery,
}

impl SpritePlugin {
    pub fn new(options: PluginOptions, phase: BuildPhase) -> Self {
        let delivery = match (options.mode, phase) {
            (SpriteMode::Inline, _) => Delivery::Inline,
            (SpriteMode::File, _) => Delivery::Static,
            (SpriteMode::Hybrid, BuildPhase::Serve) => Delivery::Inline,
            (SpriteMode::Hybrid, BuildPhase::Build) => Delivery::Static,
        };
        Self { options, delivery }
    }

    /// Module-resolution hook: recognizes the virtual sprite module.
    pub fn resolve_id(&self, id: &str) -> Option<&'static str> {
        if id == VIRTUAL_MODULE_ID {
            Some(VIRTUAL_MODULE_ID)
        } else {
            None
        }
    }

    /// Module-load hook. Re-runs the assembler on every call, so edits to
    /// icon files are reflected without restarting the host tool.
    pub fn load(&self, id: &str) -> PluginResult<Option<String>> {
        if id != VIRTUAL_MODULE_ID {
            return Ok(None);
        }
        match self.delivery {
            Delivery::Inline => {
                let result = self.generate()?;
                Ok(Some(create_inline_script(&result.sprite)))
            }
            Delivery::Static => Ok(Some(STATIC_STUB.to_string())),
        }
    }

    /// Build-start hook. Under the static strategy, assembles the sprite
    /// and writes it to the configured output file, creating parent
    /// directories as needed. Returns the path when the file was
    /// (re)written; `None` when the existing content was already current or
    /// the strategy emits nothing.
    pub fn build_start(&self) -> PluginResult<Option<PathBuf>> {
        if self.delivery != Delivery::Static {
            return Ok(None);
        }
        let result = self.generate()?;
        let path = &self.options.output_file;

        // Leave an up-to-date file untouched so its mtime stays stable and
        // watch loops do not retrigger.
        if let Ok(existing) = fs::read(path) {
            if sha256_hex(&existing) == sha256_hex(result.sprite.as_bytes()) {
                return Ok(None);
            }
        }

        write_atomic(path, result.sprite.as_bytes())
            .map_err(|source| PluginError::Write { path: path.clone(), source })?;
        Ok(Some(path.clone()))
    }

    /// HTML-transform hook: under the static strategy with auto-injection
    /// enabled, inserts the runtime fetch snippet before the first
    /// `</head>`. Markup without a `</head>`, or any other strategy, passes
    /// through unchanged.
    pub fn transform_index_html(&self, html: &str) -> String {
        if self.delivery != Delivery::Static || !self.options.auto_inject {
            return html.to_string();
        }
        match html.find("</head>") {
            Some(pos) => {
                let url = format!("/{}", output_file_name(&self.options.output_file));
                let snippet = create_fetch_snippet(&url);
                format!("{}{}\n{}", &html[..pos], snippet, &html[pos..])
            }
            None => html.to_string(),
        }
    }

    fn generate(&self) -> PluginResult<GenerateResult> {
        let options = GenerateOptions {
            icon_dir: self.options.icon_dir.clone(),
            optimizer: self.options.optimizer.clone(),
        };
        Ok(generate_sprite(&options)?)
    }
}

fn output_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sprite.svg".to_string())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write via a sibling temp file and a rename, so a failed write never
/// leaves a truncated artifact at the final path.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_sibling(path);
    fs::write(&tmp, contents)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sprite".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}
