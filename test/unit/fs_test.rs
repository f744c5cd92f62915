use pager_report::common::errors::AppError;
use pager_report::common::fs::FsUtil;
use std::path::Path;

#[test]
fn resolve_xlsx_path_requires_xlsx_extension() {
    let err = FsUtil::resolve_xlsx_path("report.ods").expect_err("should fail");
    assert!(matches!(err, AppError::InvalidPath(_)));
}

#[test]
fn resolve_xlsx_path_makes_relative_paths_absolute() {
    let path = FsUtil::resolve_xlsx_path("output/Completed_Output.XLSX").expect("should work");
    assert!(path.is_absolute());
    assert!(path.ends_with("output/Completed_Output.XLSX"));
}

#[test]
fn resolve_xlsx_path_rejects_empty_path() {
    let err = FsUtil::resolve_xlsx_path("   ").expect_err("should fail");
    assert!(matches!(err, AppError::InvalidPath(_)));
}

#[test]
fn upload_names_keep_only_the_file_name() {
    assert_eq!(
        FsUtil::upload_file_name("../../etc/Non Cricket Input.xlsx").expect("name"),
        "Non Cricket Input.xlsx"
    );
    assert!(FsUtil::upload_file_name("..").is_err());
    assert!(FsUtil::upload_file_name("  ").is_err());
}

#[test]
fn require_file_names_the_role() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = FsUtil::require_file("Skeleton", &dir.path().join("missing.xlsx"))
        .expect_err("missing");
    assert!(err.to_string().starts_with("Skeleton file not found at path:"));
    assert!(FsUtil::require_file("Skeleton", dir.path()).is_err());
}

#[test]
fn ensure_parent_dir_creates_nested_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("a/b/out.xlsx");
    FsUtil::ensure_parent_dir(&target).expect("mkdir");
    assert!(Path::new(&dir.path().join("a/b")).is_dir());
}
