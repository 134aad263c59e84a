use crate::services::fs_utils::file_utils::move_file_cross_device;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_move_file_basic() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src.jpg");
    let dst = dir.path().join("flat").join("dst.jpg");
    fs::write(&src, b"content").unwrap();
    fs::create_dir(dir.path().join("flat")).unwrap();

    move_file_cross_device(&src, &dst).unwrap();

    assert!(!src.exists());
    assert_eq!(fs::read(&dst).unwrap(), b"content");
}

#[test]
fn test_move_file_missing_source() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("absent.jpg");
    let dst = dir.path().join("dst.jpg");

    let result = move_file_cross_device(&src, &dst);

    assert!(result.is_err());
}
