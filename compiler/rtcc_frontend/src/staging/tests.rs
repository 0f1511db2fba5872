#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_stage_writes_text() {
    let dir = tempfile::tempdir().unwrap();
    let staged = SourceFile::stage(b"int f(void) { return 1; }", Some(dir.path()), "cpp").unwrap();

    assert_eq!(staged.path().parent(), Some(dir.path()));
    assert_eq!(
        std::fs::read(staged.path()).unwrap(),
        b"int f(void) { return 1; }"
    );
}

#[test]
fn test_stage_naming() {
    let dir = tempfile::tempdir().unwrap();
    let staged = SourceFile::stage(b"", Some(dir.path()), ".c").unwrap();

    let name = staged.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("rtcc_"), "{name}");
    assert_eq!(staged.path().extension().unwrap(), "c");
}

#[test]
fn test_stage_paths_are_unique() {
    let dir = tempfile::tempdir().unwrap();
    let a = SourceFile::stage(b"a", Some(dir.path()), "cpp").unwrap();
    let b = SourceFile::stage(b"b", Some(dir.path()), "cpp").unwrap();
    assert_ne!(a.path(), b.path());
}

#[test]
fn test_drop_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let staged = SourceFile::stage(b"x", Some(dir.path()), "cpp").unwrap();
    let path = staged.path().to_path_buf();
    assert!(path.exists());

    drop(staged);
    assert!(!path.exists());
}

#[test]
fn test_stage_missing_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let err = SourceFile::stage(b"x", Some(&missing), "cpp").unwrap_err();
    assert!(matches!(err, FrontendError::Staging { .. }));
}
