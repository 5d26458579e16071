//! Generators for the runtime code that injects a sprite into a page.
//!
//! Pure string-to-string transforms: no I/O and no domain errors. Sprite
//! text is embedded as an escaped JS string literal and never validated
//! here; a malformed sprite is the assembler's problem, not the generators'.

/// DOM id of the container element every injection routine creates. The
/// routines check for it before inserting, so the sprite lands in the page
/// at most once no matter how often a script re-runs (hot reload included).
pub const SPRITE_CONTAINER_ID: &str = "__svg_sprite_container__";

/// Produce a module snippet whose evaluation inserts the sprite into the
/// page once. Safe to re-evaluate: the marker check makes repeat runs
/// no-ops.
pub fn create_inline_script(sprite: &str) -> String {
    let literal = js_string_literal(sprite);
    format!(
        "const sprite = {literal};\n\
         if (typeof document !== \"undefined\" && !document.getElementById(\"{id}\")) {{\n\
         \x20 const container = document.createElement(\"div\");\n\
         \x20 container.id = \"{id}\";\n\
         \x20 container.innerHTML = sprite;\n\
         \x20 document.body.insertBefore(container, document.body.firstChild);\n\
         }}\n",
        literal = literal,
        id = SPRITE_CONTAINER_ID,
    )
}

/// Produce a self-executing wrapper with no module dependencies, suitable
/// for a plain `<script src>` reference. Same guarded insertion as the
/// inline variant.
pub fn create_iife_script(sprite: &str) -> String {
    let literal = js_string_literal(sprite);
    format!(
        "(function() {{\n\
         \x20 \"use strict\";\n\
         \x20 if (typeof document === \"undefined\") return;\n\
         \x20 if (document.getElementById(\"{id}\")) return;\n\
         \x20 var container = document.createElement(\"div\");\n\
         \x20 container.id = \"{id}\";\n\
         \x20 container.innerHTML = {literal};\n\
         \x20 document.body.insertBefore(container, document.body.firstChild);\n\
         }})();\n",
        literal = literal,
        id = SPRITE_CONTAINER_ID,
    )
}

/// Produce a `<script>` block that fetches the sprite from `sprite_url` at
/// runtime and performs the guarded insertion. The guard runs twice: once
/// before the fetch is issued and once in the response handler, since
/// another injection path may have won the race while the request was in
/// flight.
pub fn create_fetch_snippet(sprite_url: &str) -> String {
    let literal = js_string_literal(sprite_url);
    format!(
        "<script>\n\
         if (!document.getElementById(\"{id}\")) {{\n\
         \x20 fetch({literal})\n\
         \x20   .then(function (res) {{ return res.text(); }})\n\
         \x20   .then(function (sprite) {{\n\
         \x20     if (document.getElementById(\"{id}\")) return;\n\
         \x20     var container = document.createElement(\"div\");\n\
         \x20     container.id = \"{id}\";\n\
         \x20     container.innerHTML = sprite;\n\
         \x20     document.body.insertBefore(container, document.body.firstChild);\n\
         \x20   }});\n\
         }}\n\
         </script>",
        literal = literal,
        id = SPRITE_CONTAINER_ID,
    )
}

/// Render text as a double-quoted JS string literal. `</` becomes `<\/` so
/// the literal stays inert inside an inline `<script>` block, and the JS
/// line separators U+2028/U+2029 are escaped because string literals may
/// not contain them raw.
fn js_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '/' if out.ends_with('<') => out.push_str("\\/"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
