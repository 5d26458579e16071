use std::env;
use std::fs;

use sprite_cli::{display_path, write_atomic};
use tempfile::tempdir;

#[test]
fn write_atomic_creates_parent_directories() {
    let tmp = tempdir().expect("tempdir");
    let target = tmp.path().join("a").join("b").join("out.txt");

    write_atomic(&target, "hello").expect("write");

    assert_eq!(fs::read_to_string(&target).expect("read"), "hello");
}

#[test]
fn write_atomic_replaces_existing_content() {
    let tmp = tempdir().expect("tempdir");
    let target = tmp.path().join("out.txt");

    write_atomic(&target, "first").expect("write first");
    write_atomic(&target, "second").expect("write second");

    assert_eq!(fs::read_to_string(&target).expect("read"), "second");
}

#[test]
fn write_atomic_leaves_no_temp_file_behind() {
    let tmp = tempdir().expect("tempdir");
    let target = tmp.path().join("out.txt");

    write_atomic(&target, "data").expect("write");

    let leftovers: Vec<_> = fs::read_dir(tmp.path())
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "unexpected temp files: {leftovers:?}");
}

#[test]
fn display_path_strips_the_current_directory() {
    let cwd = env::current_dir().expect("cwd");
    assert_eq!(display_path(&cwd.join("dist").join("sprite.js")), "dist/sprite.js");
}

#[test]
fn display_path_keeps_paths_outside_the_current_directory() {
    let tmp = tempdir().expect("tempdir");
    let outside = tmp.path().join("sprite.js");
    assert_eq!(display_path(&outside), outside.display().to_string());
}
