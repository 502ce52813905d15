use super::*;
use tempfile::tempdir;

fn create_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn labels_are_file_name_safe() {
    assert_eq!(sanitize_label("r1234"), "r1234");
    assert_eq!(sanitize_label("2024/01/02 10:00"), "2024_01_02 10_00");
    assert_eq!(sanitize_label(r"a\b"), "a_b");
}

#[test]
fn artifact_names_append_label() {
    let dir = Path::new("/tmp/sc");
    assert_eq!(
        artifact_path(dir, "x.py", "r10"),
        PathBuf::from("/tmp/sc/x.py.r10")
    );
    assert_eq!(
        artifact_path(dir, "x.py", PREVIOUS_LABEL),
        PathBuf::from("/tmp/sc/x.py.previous")
    );
}

#[test]
fn revision_wins_over_date() {
    assert!(matches!(side(Some("r1"), Some("2024-01-01")), Some(Selector::Rev("r1"))));
    assert!(matches!(side(None, Some("2024-01-01")), Some(Selector::Date("2024-01-01"))));
    assert!(side(None, None).is_none());
}

#[test]
fn selector_labels() {
    assert_eq!(Selector::Rev("r7").label(), "r7");
    assert_eq!(Selector::Date("2024/01/01").label(), "2024_01_01");
    assert_eq!(Selector::Previous.label(), "previous");
}

#[test]
fn list_files_skips_subdirectories() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("y.py"), "y").unwrap();
    std::fs::write(dir.path().join("x.py"), "x").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub").join("z.py"), "z").unwrap();

    let rt = create_runtime();
    let files = rt.block_on(list_files(dir.path()));
    assert_eq!(
        files,
        vec![dir.path().join("x.py"), dir.path().join("y.py")]
    );
}

#[test]
fn list_files_of_missing_dir_is_empty() {
    let dir = tempdir().unwrap();
    let rt = create_runtime();
    assert!(rt.block_on(list_files(&dir.path().join("gone"))).is_empty());
}

#[test]
fn write_revision_uses_label() {
    let dir = tempdir().unwrap();
    let rt = create_runtime();
    let fetched = Fetched {
        content: "old".to_string(),
        label: "r3".to_string(),
    };
    let artifact = rt
        .block_on(write_revision(dir.path(), "a.py", &fetched))
        .unwrap();
    assert_eq!(artifact.path, dir.path().join("a.py.r3"));
    assert_eq!(artifact.label, "r3");
    assert_eq!(std::fs::read_to_string(&artifact.path).unwrap(), "old");
}
