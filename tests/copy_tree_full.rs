use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use walkdir::WalkDir;

use fstools::{ConflictPolicy, CopyOptions, copy_tree, copy_tree_with};

fn build_tree(root: &Path) -> Vec<PathBuf> {
    let mut rel_files = Vec::new();
    // Deep-ish hierarchy with hidden, spaced, empty and binary entries
    let layout: [(&str, &[u8]); 7] = [
        ("a.txt", b"alpha".as_slice()),
        ("empty", b"".as_slice()),
        ("sub1/b.log", b"log line\n".as_slice()),
        ("sub1/sub2/c.bin", [0u8, 159, 146, 150, 255].as_slice()),
        ("sub1/sub 2/d.dat", b"spaced".as_slice()),
        (".hidden/e.cfg", b"k=v".as_slice()),
        ("sub1/.hidden_inner/f.txt", b"inner".as_slice()),
    ];
    for (rel, bytes) in layout {
        let p = root.join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&p, bytes).unwrap();
        rel_files.push(PathBuf::from(rel));
    }
    fs::create_dir_all(root.join("only/empty/dirs")).unwrap();
    rel_files
}

fn collect_relative_files(root: &Path) -> HashSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

#[test]
fn overwrite_copy_reproduces_every_file_byte_for_byte() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    let expected: HashSet<_> = build_tree(&src).into_iter().collect();

    // Pre-existing junk must disappear under Overwrite.
    fs::create_dir_all(dst.join("junk")).unwrap();
    fs::write(dst.join("junk/old.txt"), b"old").unwrap();

    let out = copy_tree(&src, &dst, ConflictPolicy::Overwrite).unwrap();
    assert_eq!(out, dst);

    let copied = collect_relative_files(&dst);
    assert_eq!(expected, copied);
    for rel in &copied {
        assert_eq!(
            fs::read(src.join(rel)).unwrap(),
            fs::read(dst.join(rel)).unwrap(),
            "content mismatch for {rel:?}"
        );
    }
    assert!(dst.join("only/empty/dirs").is_dir(), "empty directories are recreated");
    assert!(!dst.join("junk").exists());
}

#[test]
fn overwrite_twice_is_stable() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    build_tree(&src);

    copy_tree(&src, &dst, ConflictPolicy::Overwrite).unwrap();
    copy_tree(&src, &dst, ConflictPolicy::Overwrite).unwrap();
    assert_eq!(collect_relative_files(&src), collect_relative_files(&dst));
}

#[test]
fn fail_policy_leaves_partial_copy_without_rollback() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    fs::create_dir_all(src.join("later")).unwrap();
    fs::write(src.join("first.txt"), b"1").unwrap();
    fs::write(src.join("later/clash.txt"), b"new").unwrap();
    fs::create_dir_all(dst.join("later")).unwrap();
    fs::write(dst.join("later/clash.txt"), b"old").unwrap();

    // Files are handled before subdirectories, so first.txt lands before the clash.
    let err = copy_tree(&src, &dst, ConflictPolicy::FailOnConflict).unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(fs::read(dst.join("first.txt")).unwrap(), b"1");
    assert_eq!(fs::read(dst.join("later/clash.txt")).unwrap(), b"old");
}

#[cfg(unix)]
#[test]
fn preserve_metadata_copies_mtime_and_mode() {
    use filetime::FileTime;
    use std::os::unix::fs::PermissionsExt;

    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    let f = src.join("meta.txt");
    fs::write(&f, b"contents").unwrap();
    fs::set_permissions(&f, fs::Permissions::from_mode(0o640)).unwrap();
    let old = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_times(&f, old, old).unwrap();

    let opts = CopyOptions {
        policy: ConflictPolicy::FailOnConflict,
        preserve_metadata: true,
    };
    copy_tree_with(&src, &dst, &opts).unwrap();

    let meta = fs::metadata(dst.join("meta.txt")).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o640);
    assert_eq!(FileTime::from_last_modification_time(&meta).unix_seconds(), 1_000_000_000);
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("real.txt"), b"r").unwrap();
    // A link back to the source root would recurse forever if followed.
    std::os::unix::fs::symlink(&src, src.join("loop")).unwrap();
    std::os::unix::fs::symlink(src.join("real.txt"), src.join("alias.txt")).unwrap();

    copy_tree(&src, &dst, ConflictPolicy::Overwrite).unwrap();
    assert_eq!(fs::read(dst.join("real.txt")).unwrap(), b"r");
    assert_eq!(fs::read(dst.join("alias.txt")).unwrap(), b"r");
    assert!(!dst.join("loop").exists());
}
