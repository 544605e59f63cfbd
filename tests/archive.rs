use std::fs;

use pretty_assertions::assert_eq;
use quickstart_util::{AppError, PathErrorKind, unzip, zip_path};
use walkdir::WalkDir;

fn tree(root: &std::path::Path) -> Vec<(String, Option<String>)> {
    WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.unwrap())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
            let content = e.file_type().is_file().then(|| fs::read_to_string(e.path()).unwrap());
            (rel, content)
        })
        .collect()
}

#[test]
fn directory_round_trip_keeps_structure() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("assets/textures")).unwrap();
    fs::create_dir_all(src.join("empty")).unwrap();
    fs::write(src.join("readme.md"), "# hello\n").unwrap();
    fs::write(src.join("assets/textures/stone.png"), "not really a png").unwrap();
    fs::write(src.join("assets/中文.txt"), "内容").unwrap();

    let archive = dir.path().join("out.zip");
    zip_path(&src, &archive).unwrap();

    let dst = dir.path().join("dst");
    unzip(&archive, &dst).unwrap();

    assert_eq!(tree(&dst), tree(&src));
}

#[test]
fn archive_inside_source_is_not_packed_into_itself() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    let archive = dir.path().join("self.zip");

    zip_path(dir.path(), &archive).unwrap();

    let dst = tempfile::tempdir().unwrap();
    unzip(&archive, dst.path()).unwrap();
    assert_eq!(tree(dst.path()), vec![("a.txt".to_string(), Some("a".to_string()))]);
}

#[test]
fn zipping_missing_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = zip_path(&dir.path().join("nope"), &dir.path().join("x.zip")).unwrap_err();
    assert!(matches!(err, AppError::Path { kind: PathErrorKind::NotFound, .. }));
}

#[test]
fn archive_reached_through_another_spelling_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    let archive = dir.path().join("sub").join("..").join("self.zip");

    zip_path(dir.path(), &archive).unwrap();

    let dst = tempfile::tempdir().unwrap();
    unzip(&dir.path().join("self.zip"), dst.path()).unwrap();
    assert_eq!(
        tree(dst.path()),
        vec![("a.txt".to_string(), Some("a".to_string())), ("sub".to_string(), None)]
    );
}

#[cfg(unix)]
#[test]
fn symlinks_are_stored_with_their_target_content() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("real_dir")).unwrap();
    fs::write(src.join("real.txt"), "payload").unwrap();
    fs::write(src.join("real_dir/inner.txt"), "inner").unwrap();
    std::os::unix::fs::symlink(src.join("real.txt"), src.join("link.txt")).unwrap();
    std::os::unix::fs::symlink(src.join("real_dir"), src.join("linked_dir")).unwrap();

    let archive = dir.path().join("out.zip");
    zip_path(&src, &archive).unwrap();
    let dst = dir.path().join("dst");
    unzip(&archive, &dst).unwrap();

    assert_eq!(fs::read_to_string(dst.join("link.txt")).unwrap(), "payload");
    assert_eq!(fs::read_to_string(dst.join("linked_dir/inner.txt")).unwrap(), "inner");
    assert_eq!(tree(&dst), tree(&src));
}

#[cfg(unix)]
#[test]
fn sockets_in_a_tree_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    let _listener = std::os::unix::net::UnixListener::bind(src.join("agent.sock")).unwrap();

    let err = zip_path(&src, &dir.path().join("out.zip")).unwrap_err();
    assert!(matches!(err, AppError::Path { kind: PathErrorKind::UnsupportedType, .. }));
}
