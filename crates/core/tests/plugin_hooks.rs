use std::fs;
use std::path::Path;

use sprite_core::plugin::{
    BuildPhase, PluginError, PluginOptions, SpriteMode, SpritePlugin, VIRTUAL_MODULE_ID,
};
use sprite_core::sprite::{generate_sprite, GenerateOptions, SpriteError};
use tempfile::tempdir;

const HOME_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
  <path d="M10 20v-6h4v6h5v-8h3L12 3 2 12h3v8z"/>
</svg>"#;

const STAR_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
  <path d="M12 17.27 18.18 21l-1.64-7.03L22 9.24l-7.19-.61L12 2 9.19 8.63 2 9.24l5.46 4.73L5.82 21z"/>
</svg>"#;

fn write_icon(dir: &Path, file_name: &str, body: &str) {
    fs::write(dir.join(file_name), body).expect("write icon");
}

fn inline_plugin(icon_dir: &Path) -> SpritePlugin {
    SpritePlugin::new(PluginOptions::new(icon_dir), BuildPhase::Serve)
}

fn file_plugin(icon_dir: &Path, output_file: &Path) -> SpritePlugin {
    let mut options = PluginOptions::new(icon_dir);
    options.mode = SpriteMode::File;
    options.output_file = output_file.to_path_buf();
    SpritePlugin::new(options, BuildPhase::Build)
}

#[test]
fn resolves_only_the_virtual_module_id() {
    let dir = tempdir().expect("tempdir");
    let plugin = inline_plugin(dir.path());

    assert_eq!(plugin.resolve_id(VIRTUAL_MODULE_ID), Some(VIRTUAL_MODULE_ID));
    assert_eq!(plugin.resolve_id("./icons.js"), None);
}

#[test]
fn inline_load_returns_the_injection_snippet() {
    let dir = tempdir().expect("tempdir");
    write_icon(dir.path(), "home.svg", HOME_SVG);
    let plugin = inline_plugin(dir.path());

    let code = plugin.load(VIRTUAL_MODULE_ID).expect("load").expect("virtual module");
    assert!(code.contains("icon-home"));
    assert!(code.contains("innerHTML"));

    assert!(plugin.load("./something-else.js").expect("load").is_none());
}

/// The assembler runs fresh on every load, so icon edits show up without a
/// restart.
#[test]
fn load_reflects_new_icons() {
    let dir = tempdir().expect("tempdir");
    write_icon(dir.path(), "home.svg", HOME_SVG);
    let plugin = inline_plugin(dir.path());

    let before = plugin.load(VIRTUAL_MODULE_ID).expect("load").expect("code");
    assert!(!before.contains("icon-star"));

    write_icon(dir.path(), "star.svg", STAR_SVG);
    let after = plugin.load(VIRTUAL_MODULE_ID).expect("load").expect("code");
    assert!(after.contains("icon-star"));
}

#[test]
fn inline_mode_emits_no_file() {
    let dir = tempdir().expect("tempdir");
    write_icon(dir.path(), "home.svg", HOME_SVG);
    let plugin = inline_plugin(dir.path());

    assert!(plugin.build_start().expect("build_start").is_none());

    let html = "<html><head></head><body></body></html>";
    assert_eq!(plugin.transform_index_html(html), html);
}

#[test]
fn file_mode_writes_the_sprite_document() {
    let dir = tempdir().expect("tempdir");
    let icons = dir.path().join("icons");
    fs::create_dir_all(&icons).expect("icons dir");
    write_icon(&icons, "home.svg", HOME_SVG);

    // Parent directories of the output are created on demand.
    let out = dir.path().join("dist").join("assets").join("sprite.svg");
    let plugin = file_plugin(&icons, &out);

    let written = plugin.build_start().expect("build_start");
    assert_eq!(written.as_deref(), Some(out.as_path()));

    let expected = generate_sprite(&GenerateOptions::new(&icons)).expect("generate").sprite;
    assert_eq!(fs::read_to_string(&out).expect("read sprite"), expected);
}

/// An up-to-date output file is left untouched; a content change rewrites it.
#[test]
fn file_mode_skips_unchanged_output() {
    let dir = tempdir().expect("tempdir");
    let icons = dir.path().join("icons");
    fs::create_dir_all(&icons).expect("icons dir");
    write_icon(&icons, "home.svg", HOME_SVG);

    let out = dir.path().join("sprite.svg");
    let plugin = file_plugin(&icons, &out);

    assert!(plugin.build_start().expect("first").is_some());
    assert!(plugin.build_start().expect("second").is_none());

    write_icon(&icons, "star.svg", STAR_SVG);
    assert!(plugin.build_start().expect("after edit").is_some());
}

#[test]
fn file_mode_load_serves_a_stub_module() {
    let dir = tempdir().expect("tempdir");
    write_icon(dir.path(), "home.svg", HOME_SVG);
    let plugin = file_plugin(dir.path(), &dir.path().join("sprite.svg"));

    let code = plugin.load(VIRTUAL_MODULE_ID).expect("load").expect("stub");
    assert!(code.contains("static file"));
    assert!(!code.contains("icon-home"));
}

#[test]
fn file_mode_patches_html_before_head_close() {
    let dir = tempdir().expect("tempdir");
    let plugin = file_plugin(dir.path(), Path::new("dist/sprite.svg"));

    let html = "<html><head><title>t</title></head><body></body></html>";
    let patched = plugin.transform_index_html(html);

    let snippet_at = patched.find("<script>").expect("snippet");
    let head_close = patched.find("</head>").expect("head");
    assert!(snippet_at < head_close);
    assert!(patched.contains("sprite.svg"));

    // Markup without a head is passed through untouched.
    let headless = "<body>no head</body>";
    assert_eq!(plugin.transform_index_html(headless), headless);
}

#[test]
fn auto_inject_can_be_disabled() {
    let dir = tempdir().expect("tempdir");
    let mut options = PluginOptions::new(dir.path());
    options.mode = SpriteMode::File;
    options.auto_inject = false;
    let plugin = SpritePlugin::new(options, BuildPhase::Build);

    let html = "<html><head></head><body></body></html>";
    assert_eq!(plugin.transform_index_html(html), html);
}

/// Hybrid behaves as inline while serving and as file while building.
#[test]
fn hybrid_mode_follows_the_build_phase() {
    let dir = tempdir().expect("tempdir");
    let icons = dir.path().join("icons");
    fs::create_dir_all(&icons).expect("icons dir");
    write_icon(&icons, "home.svg", HOME_SVG);
    let out = dir.path().join("sprite.svg");

    let mut options = PluginOptions::new(&icons);
    options.mode = SpriteMode::Hybrid;
    options.output_file = out.clone();

    let serving = SpritePlugin::new(options.clone(), BuildPhase::Serve);
    let code = serving.load(VIRTUAL_MODULE_ID).expect("load").expect("code");
    assert!(code.contains("icon-home"));
    assert!(serving.build_start().expect("build_start").is_none());
    assert!(!out.exists());

    let building = SpritePlugin::new(options, BuildPhase::Build);
    assert!(building.build_start().expect("build_start").is_some());
    assert!(out.exists());
    let html = "<head></head>";
    assert!(building.transform_index_html(html).contains("fetch"));
}

#[test]
fn assembly_failures_propagate_to_the_host() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("no-icons");
    let plugin = inline_plugin(&missing);

    let err = plugin.load(VIRTUAL_MODULE_ID).unwrap_err();
    assert!(matches!(err, PluginError::Sprite(SpriteError::DirNotFound(_))));
}

#[test]
fn options_deserialize_from_json() {
    let options = PluginOptions::from_json(
        r#"{"iconDir": "assets/icons", "mode": "file", "autoInject": false}"#,
    )
    .expect("json");

    assert_eq!(options.icon_dir, Path::new("assets/icons"));
    assert_eq!(options.mode, SpriteMode::File);
    assert!(!options.auto_inject);
    assert_eq!(options.output_file, Path::new("dist/sprite.svg"));

    let defaults = PluginOptions::from_json(r#"{"iconDir": "icons"}"#).expect("json");
    assert_eq!(defaults.mode, SpriteMode::Inline);
    assert!(defaults.auto_inject);
}
