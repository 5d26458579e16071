//! Sprite assembly: directory traversal, icon naming, and symbol rewriting.
//!
//! The assembler reads every eligible file in one directory, optimizes it,
//! rewrites it into a named `<symbol>` fragment, and concatenates the
//! fragments into a single hidden sprite document. Each call is an
//! independent single pass; nothing is retained between invocations.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::optimize::{optimize, OptimizeConfig, OptimizeError};

/// Prefix of every symbol identifier. Consumers reference an injected icon
/// as `#icon-<name>`, so every delivery path depends on this convention.
pub const ICON_ID_PREFIX: &str = "icon-";

/// Opening tag of the sprite container: zero-sized and hidden so the sprite
/// renders nothing on its own when injected inline.
const SPRITE_OPEN: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"0\" height=\"0\" \
     style=\"position:absolute;width:0;height:0;overflow:hidden\" aria-hidden=\"true\">";

/// Error type for sprite assembly.
#[derive(Debug, Error)]
pub enum SpriteError {
    /// The icon directory does not exist (or is not a directory).
    #[error("icon directory not found: {}", .0.display())]
    DirNotFound(PathBuf),

    /// Reading the directory or one of its files failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One input file is not a well-formed SVG document. This aborts the
    /// whole run: a sprite silently missing an icon would be worse than a
    /// loud build failure.
    #[error("invalid svg in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Two files derive the same icon identifier. Fatal, since a silent
    /// overwrite would make one of the icons unreachable.
    #[error("duplicate icon name `{name}`: derived from both {first} and {second}")]
    NameCollision { name: String, first: String, second: String },
}

/// Convenience result type for assembly operations.
pub type SpriteResult<T> = Result<T, SpriteError>;

/// Input to [`generate_sprite`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Directory listed (non-recursively) for `.svg` files.
    pub icon_dir: PathBuf,
    /// Optimizer switches, passed through to the optimizer verbatim.
    pub optimizer: OptimizeConfig,
}

impl GenerateOptions {
    pub fn new(icon_dir: impl Into<PathBuf>) -> Self {
        Self { icon_dir: icon_dir.into(), optimizer: OptimizeConfig::default() }
    }
}

/// The assembler's sole output: the serialized sprite document and the
/// number of icons folded into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResult {
    pub sprite: String,
    pub icon_count: usize,
}

/// One eligible input file, read into memory before optimization.
struct IconSource {
    /// Derived public identifier (file name up to the first `.`).
    name: String,
    path: PathBuf,
    contents: String,
}

/// A named, non-rendering template unit: one icon's content re-parented
/// under a `<symbol>` carrying the `icon-<name>` identifier.
struct SymbolEntry {
    id: String,
    view_box: Option<String>,
    content: String,
}

/// Assemble the sprite for `options.icon_dir`.
///
/// Files are processed in byte-lexicographic file-name order, so the output
/// is byte-identical across runs and platforms for the same inputs. An
/// empty (or icon-free) directory yields a valid zero-entry sprite, not an
/// error.
pub fn generate_sprite(options: &GenerateOptions) -> SpriteResult<GenerateResult> {
    let sources = collect_icon_sources(&options.icon_dir)?;

    let mut entries = Vec::with_capacity(sources.len());
    for source in &sources {
        let optimized = match optimize(&source.contents, &options.optimizer) {
            Ok(text) => text,
            Err(OptimizeError::Parse(message)) => {
                return Err(SpriteError::Parse { path: source.path.clone(), message })
            }
        };
        entries.push(symbol_entry(source, &optimized)?);
    }

    Ok(GenerateResult { sprite: assemble(&entries), icon_count: entries.len() })
}

/// List, sort, name-check, and read every eligible file in `icon_dir`.
fn collect_icon_sources(icon_dir: &Path) -> SpriteResult<Vec<IconSource>> {
    if !icon_dir.is_dir() {
        return Err(SpriteError::DirNotFound(icon_dir.to_path_buf()));
    }

    let dir_io = |source: std::io::Error| SpriteError::Io { path: icon_dir.to_path_buf(), source };

    let mut file_names = Vec::new();
    for entry in fs::read_dir(icon_dir).map_err(dir_io)? {
        let entry = entry.map_err(dir_io)?;
        if !entry.file_type().map_err(dir_io)?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if is_eligible(&file_name) {
            file_names.push(file_name);
        }
    }
    // OS listing order is not trusted; sort for reproducible output.
    file_names.sort();

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut sources = Vec::with_capacity(file_names.len());
    for file_name in file_names {
        let name = icon_name(&file_name);
        if let Some(first) = seen.get(&name) {
            return Err(SpriteError::NameCollision {
                name,
                first: first.clone(),
                second: file_name,
            });
        }
        seen.insert(name.clone(), file_name.clone());

        let path = icon_dir.join(&file_name);
        let contents = fs::read_to_string(&path)
            .map_err(|source| SpriteError::Io { path: path.clone(), source })?;
        sources.push(IconSource { name, path, contents });
    }
    Ok(sources)
}

/// Plain `.svg` files only; dotfiles are skipped (which also keeps derived
/// names non-empty).
fn is_eligible(file_name: &str) -> bool {
    if file_name.starts_with('.') {
        return false;
    }
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Derive the icon's public identifier: everything up to the first `.`, so
/// `a.svg` and `a.symbol.svg` both resolve to `a` (and collide).
fn icon_name(file_name: &str) -> String {
    file_name.split('.').next().unwrap_or(file_name).to_string()
}

/// Root `<svg>` attributes relevant to the symbol rewrite.
#[derive(Default)]
struct RootAttrs {
    view_box: Option<String>,
    width: Option<String>,
    height: Option<String>,
}

/// Rewrite one optimized document into a [`SymbolEntry`]: extract the root
/// element's inner content and carry its viewBox over.
fn symbol_entry(source: &IconSource, optimized: &str) -> SpriteResult<SymbolEntry> {
    let mut reader = Reader::from_str(optimized);

    loop {
        match reader.read_event().map_err(|e| parse_error(source, e.to_string()))? {
            Event::Start(root) => {
                require_svg_root(source, &root)?;
                let attrs = root_attributes(source, &root)?;
                let content = inner_content(source, &mut reader)?;
                return Ok(build_entry(&source.name, attrs, content));
            }
            Event::Empty(root) => {
                require_svg_root(source, &root)?;
                let attrs = root_attributes(source, &root)?;
                return Ok(build_entry(&source.name, attrs, String::new()));
            }
            Event::Eof => return Err(parse_error(source, "missing root element".to_string())),
            // Anything the optimizer was configured to keep ahead of the
            // root (declaration, comments, whitespace) is not symbol
            // content.
            _ => continue,
        }
    }
}

fn parse_error(source: &IconSource, message: String) -> SpriteError {
    SpriteError::Parse { path: source.path.clone(), message }
}

fn require_svg_root(source: &IconSource, root: &BytesStart<'_>) -> SpriteResult<()> {
    if root.name().as_ref() != b"svg" {
        return Err(parse_error(
            source,
            format!(
                "root element is <{}>, expected <svg>",
                String::from_utf8_lossy(root.name().as_ref())
            ),
        ));
    }
    Ok(())
}

fn root_attributes(source: &IconSource, root: &BytesStart<'_>) -> SpriteResult<RootAttrs> {
    let mut attrs = RootAttrs::default();
    for attr in root.attributes() {
        let attr = attr.map_err(|e| parse_error(source, e.to_string()))?;
        let value = attr.unescape_value().map_err(|e| parse_error(source, e.to_string()))?;
        match attr.key.as_ref() {
            b"viewBox" => attrs.view_box = Some(value.into_owned()),
            b"width" => attrs.width = Some(value.into_owned()),
            b"height" => attrs.height = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(attrs)
}

/// Copy everything between the root's start and end tags, re-serialized
/// through an event writer.
fn inner_content(source: &IconSource, reader: &mut Reader<&[u8]>) -> SpriteResult<String> {
    let mut writer = Writer::new(Vec::new());
    let mut depth = 1usize;
    loop {
        match reader.read_event().map_err(|e| parse_error(source, e.to_string()))? {
            Event::Eof => return Err(parse_error(source, "unclosed <svg> root".to_string())),
            Event::Start(e) => {
                depth += 1;
                let _ = writer.write_event(Event::Start(e));
            }
            Event::End(e) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                let _ = writer.write_event(Event::End(e));
            }
            other => {
                let _ = writer.write_event(other);
            }
        }
    }
    String::from_utf8(writer.into_inner()).map_err(|e| parse_error(source, e.to_string()))
}

fn build_entry(name: &str, attrs: RootAttrs, content: String) -> SymbolEntry {
    SymbolEntry {
        id: format!("{ICON_ID_PREFIX}{name}"),
        view_box: resolve_view_box(attrs),
        content,
    }
}

/// Prefer an explicit `viewBox`; otherwise synthesize `0 0 <w> <h>` when
/// both dimensions are numeric. Non-numeric dimensions (`%`, `em`) leave
/// the symbol without a viewBox.
fn resolve_view_box(attrs: RootAttrs) -> Option<String> {
    if let Some(vb) = attrs.view_box {
        return Some(vb);
    }
    let width = numeric_dimension(attrs.width.as_deref())?;
    let height = numeric_dimension(attrs.height.as_deref())?;
    Some(format!("0 0 {width} {height}"))
}

fn numeric_dimension(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim().trim_end_matches("px").trim();
    trimmed.parse::<f64>().ok()?;
    Some(trimmed.to_string())
}

/// Concatenate all symbols inside the hidden container element.
fn assemble(entries: &[SymbolEntry]) -> String {
    let mut sprite = String::from(SPRITE_OPEN);
    for entry in entries {
        sprite.push_str("<symbol id=\"");
        sprite.push_str(&escape(entry.id.as_str()));
        sprite.push('"');
        if let Some(view_box) = &entry.view_box {
            sprite.push_str(" viewBox=\"");
            sprite.push_str(&escape(view_box.as_str()));
            sprite.push('"');
        }
        sprite.push('>');
        sprite.push_str(&entry.content);
        sprite.push_str("</symbol>");
    }
    sprite.push_str("</svg>");
    sprite
}
