use assert_fs::prelude::*;
use std::fs;

use fstools::{ConflictPolicy, FsToolsError, copy_tree};

fn setup() -> (assert_fs::TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = temp.child("A");
    let b = temp.child("B");
    a.child("x.txt").write_str("hello").unwrap();
    a.child("y.txt").write_str("only in A").unwrap();
    a.child("nested/z.txt").write_str("deep").unwrap();
    b.child("x.txt").write_str("world").unwrap();
    b.child("unrelated.txt").write_str("mine").unwrap();
    let (a, b) = (a.path().to_path_buf(), b.path().to_path_buf());
    (temp, a, b)
}

#[test]
fn fail_on_conflict_names_colliding_path_and_keeps_target() {
    let (_temp, a, b) = setup();

    let err = copy_tree(&a, &b, ConflictPolicy::FailOnConflict).unwrap_err();
    match err {
        FsToolsError::Conflict { ref path } => assert_eq!(path, &b.join("x.txt")),
        other => panic!("expected Conflict, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(b.join("x.txt")).unwrap(), "world");
    assert_eq!(fs::read_to_string(b.join("unrelated.txt")).unwrap(), "mine");
}

#[test]
fn skip_on_conflict_keeps_existing_and_adds_the_rest() {
    let (_temp, a, b) = setup();

    let out = copy_tree(&a, &b, ConflictPolicy::SkipOnConflict).unwrap();
    assert_eq!(out, b);
    assert_eq!(fs::read_to_string(b.join("x.txt")).unwrap(), "world");
    assert_eq!(fs::read_to_string(b.join("y.txt")).unwrap(), "only in A");
    assert_eq!(fs::read_to_string(b.join("nested/z.txt")).unwrap(), "deep");
    assert_eq!(fs::read_to_string(b.join("unrelated.txt")).unwrap(), "mine");
}

#[test]
fn overwrite_replaces_target_contents_entirely() {
    let (_temp, a, b) = setup();

    copy_tree(&a, &b, ConflictPolicy::Overwrite).unwrap();
    assert_eq!(fs::read_to_string(b.join("x.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(b.join("y.txt")).unwrap(), "only in A");
    assert!(!b.join("unrelated.txt").exists(), "top-level target is emptied first");
}

#[test]
fn policy_applies_to_nested_collisions() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = temp.child("A");
    let b = temp.child("B");
    a.child("sub/inner.txt").write_str("new").unwrap();
    b.child("sub/inner.txt").write_str("old").unwrap();
    b.child("sub/extra.txt").write_str("extra").unwrap();

    let err = copy_tree(a.path(), b.path(), ConflictPolicy::FailOnConflict).unwrap_err();
    assert_eq!(err.path(), Some(b.child("sub/inner.txt").path()));

    copy_tree(a.path(), b.path(), ConflictPolicy::SkipOnConflict).unwrap();
    b.child("sub/inner.txt").assert("old");
    b.child("sub/extra.txt").assert("extra");
}

#[test]
fn missing_target_is_created_for_every_policy() {
    for policy in [
        ConflictPolicy::Overwrite,
        ConflictPolicy::FailOnConflict,
        ConflictPolicy::SkipOnConflict,
    ] {
        let temp = assert_fs::TempDir::new().unwrap();
        let a = temp.child("A");
        a.child("f.txt").write_str("f").unwrap();
        let target = temp.child("out/deeper/B");

        copy_tree(a.path(), target.path(), policy).unwrap();
        target.child("f.txt").assert("f");
    }
}

#[test]
fn copying_into_itself_is_refused() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = temp.child("A");
    a.child("f.txt").write_str("f").unwrap();

    let err = copy_tree(a.path(), &a.path().join("inside"), ConflictPolicy::SkipOnConflict).unwrap_err();
    assert!(matches!(err, FsToolsError::Overlap { .. }), "{err}");
    assert!(!a.path().join("inside").exists());

    let err = copy_tree(a.path(), a.path(), ConflictPolicy::SkipOnConflict).unwrap_err();
    assert!(matches!(err, FsToolsError::Overlap { .. }), "{err}");
}

#[test]
fn overwrite_into_ancestor_is_refused_and_source_survives() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = temp.child("parent/A");
    a.child("f.txt").write_str("f").unwrap();

    let err = copy_tree(a.path(), temp.child("parent").path(), ConflictPolicy::Overwrite).unwrap_err();
    assert!(matches!(err, FsToolsError::Overlap { .. }), "{err}");
    a.child("f.txt").assert("f");
}

#[test]
fn target_reaching_source_through_dotdot_is_refused() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = temp.child("A");
    a.child("precious.txt").write_str("keep").unwrap();
    let target = temp.path().join("not_yet").join("..").join("A");

    for policy in [ConflictPolicy::Overwrite, ConflictPolicy::SkipOnConflict] {
        let err = copy_tree(a.path(), &target, policy).unwrap_err();
        assert!(matches!(err, FsToolsError::Overlap { .. }), "{policy}: {err}");
    }
    a.child("precious.txt").assert("keep");
}
