//! SVG optimization pass.
//!
//! A streaming event rewrite that strips the parts of an icon file that
//! carry no visual meaning: comments, `<metadata>` subtrees, editor
//! bookkeeping, XML declarations, and inter-element whitespace. The pass
//! never touches renderable content, so the optimized document draws
//! exactly like the input.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Namespace prefixes used by vector editors for their own bookkeeping.
const EDITOR_PREFIXES: [&str; 2] = ["inkscape", "sodipodi"];

/// Error type for the optimizer pass.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The input is not well-formed XML.
    #[error("malformed svg: {0}")]
    Parse(String),
}

/// Convenience result type for optimizer operations.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Switches controlling what the optimizer strips.
///
/// Callers hand this to the sprite assembler, which passes it through to
/// [`optimize`] without interpreting it. Every switch defaults to on.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizeConfig {
    /// Drop `<!-- ... -->` comments.
    pub strip_comments: bool,
    /// Drop `<metadata>` elements and everything inside them.
    pub strip_metadata: bool,
    /// Drop elements and attributes in editor namespaces
    /// (`inkscape:`, `sodipodi:`) along with their `xmlns:` declarations.
    pub strip_editor_data: bool,
    /// Drop the XML declaration, DOCTYPE, and processing instructions.
    pub strip_declaration: bool,
    /// Drop whitespace-only text nodes between elements.
    pub collapse_whitespace: bool,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            strip_comments: true,
            strip_metadata: true,
            strip_editor_data: true,
            strip_declaration: true,
            collapse_whitespace: true,
        }
    }
}

/// Optimize one SVG document, returning the reduced text.
///
/// Pure function: no I/O, no state. Fails with [`OptimizeError::Parse`]
/// when the input is not a well-formed document (mismatched or unclosed
/// tags, bad attribute syntax, no root element).
pub fn optimize(raw: &str, config: &OptimizeConfig) -> OptimizeResult<String> {
    let mut reader = Reader::from_str(raw);
    let mut writer = Writer::new(Vec::new());

    let mut depth: usize = 0;
    // Depth of the element whose subtree is currently being dropped.
    let mut skip_depth: Option<usize> = None;
    let mut saw_element = false;

    loop {
        match reader.read_event().map_err(|e| OptimizeError::Parse(e.to_string()))? {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                saw_element = true;
                if skip_depth.is_some() {
                    continue;
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if should_drop_element(&name, config) {
                    skip_depth = Some(depth);
                    continue;
                }
                let rebuilt = filtered_start(&name, &e, config)?;
                let _ = writer.write_event(Event::Start(rebuilt));
            }
            Event::Empty(e) => {
                saw_element = true;
                if skip_depth.is_some() {
                    continue;
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if should_drop_element(&name, config) {
                    continue;
                }
                let rebuilt = filtered_start(&name, &e, config)?;
                let _ = writer.write_event(Event::Empty(rebuilt));
            }
            Event::End(e) => {
                if let Some(limit) = skip_depth {
                    if depth == limit {
                        skip_depth = None;
                    }
                    depth = depth.saturating_sub(1);
                    continue;
                }
                depth = depth.saturating_sub(1);
                let _ = writer.write_event(Event::End(e));
            }
            Event::Text(t) => {
                if skip_depth.is_some() {
                    continue;
                }
                if config.collapse_whitespace {
                    let unescaped =
                        t.unescape().map_err(|e| OptimizeError::Parse(e.to_string()))?;
                    if unescaped.trim().is_empty() {
                        continue;
                    }
                }
                let _ = writer.write_event(Event::Text(t));
            }
            Event::Comment(t) => {
                if skip_depth.is_some() || config.strip_comments {
                    continue;
                }
                let _ = writer.write_event(Event::Comment(t));
            }
            Event::Decl(d) => {
                if skip_depth.is_some() || config.strip_declaration {
                    continue;
                }
                let _ = writer.write_event(Event::Decl(d));
            }
            Event::DocType(d) => {
                if skip_depth.is_some() || config.strip_declaration {
                    continue;
                }
                let _ = writer.write_event(Event::DocType(d));
            }
            Event::PI(p) => {
                if skip_depth.is_some() || config.strip_declaration {
                    continue;
                }
                let _ = writer.write_event(Event::PI(p));
            }
            other => {
                if skip_depth.is_none() {
                    let _ = writer.write_event(other);
                }
            }
        }
    }

    if depth != 0 {
        return Err(OptimizeError::Parse("unclosed element at end of input".to_string()));
    }
    if !saw_element {
        return Err(OptimizeError::Parse("document has no root element".to_string()));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| OptimizeError::Parse(e.to_string()))
}

/// Rebuild a start tag with editor attributes filtered out.
fn filtered_start(
    name: &str,
    e: &BytesStart<'_>,
    config: &OptimizeConfig,
) -> OptimizeResult<BytesStart<'static>> {
    let mut out = BytesStart::new(name.to_string());
    for attr in e.attributes() {
        let attr = attr.map_err(|err| OptimizeError::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if config.strip_editor_data && is_editor_attribute(&key) {
            continue;
        }
        let value = attr.unescape_value().map_err(|err| OptimizeError::Parse(err.to_string()))?;
        out.push_attribute((key.as_str(), value.as_ref()));
    }
    Ok(out)
}

fn should_drop_element(name: &str, config: &OptimizeConfig) -> bool {
    if config.strip_metadata && name == "metadata" {
        return true;
    }
    config.strip_editor_data && has_editor_prefix(name)
}

fn has_editor_prefix(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, _)) => EDITOR_PREFIXES.contains(&prefix),
        None => false,
    }
}

fn is_editor_attribute(key: &str) -> bool {
    if has_editor_prefix(key) {
        return true;
    }
    match key.strip_prefix("xmlns:") {
        Some(rest) => EDITOR_PREFIXES.contains(&rest),
        None => false,
    }
}
