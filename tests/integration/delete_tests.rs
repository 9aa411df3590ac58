use dedup_drive::actions::{delete_batch, DeleteConfig, NoCallback};
use dedup_drive::duplicates::{DuplicateFinder, FinderConfig};
use dedup_drive::scanner::WalkerConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn contents_by_value(root: &Path) -> BTreeMap<Vec<u8>, usize> {
    let mut counts = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            *counts.entry(fs::read(entry.path()).unwrap()).or_insert(0) += 1;
        }
    }
    counts
}

#[test]
fn test_delete_leaves_one_copy_per_content() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"world").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/a copy.txt"), b"hello").unwrap();
    fs::write(dir.path().join("sub/empty1"), b"").unwrap();
    fs::write(dir.path().join("sub/empty2"), b"").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
    let report = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(report.duplicates.len(), 3);

    let result = delete_batch::<NoCallback>(
        &report.duplicate_paths(),
        &DeleteConfig::permanent(),
        None,
    );

    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 3);
    assert_eq!(result.bytes_freed, 10);

    let remaining = contents_by_value(dir.path());
    assert_eq!(remaining.len(), 3);
    assert!(remaining.values().all(|&count| count == 1));

    for dup in &report.duplicates {
        assert!(!dup.path.exists());
        assert!(dup.original.exists());
    }

    let rerun = finder.find_duplicates(dir.path()).unwrap();
    assert!(rerun.duplicates.is_empty());
    assert_eq!(rerun.summary.total_files, 3);
}

#[test]
fn test_delete_continues_past_vanished_file() {
    let dir = tempdir().unwrap();
    for name in ["1", "2", "3", "4"] {
        fs::write(dir.path().join(name), b"same").unwrap();
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_workers(1));
    let report = finder.find_duplicates(dir.path()).unwrap();
    let paths = report.duplicate_paths();
    assert_eq!(paths.len(), 3);

    fs::remove_file(&paths[0]).unwrap();
    let result = delete_batch::<NoCallback>(&paths, &DeleteConfig::permanent(), None);

    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].0, paths[0]);
    assert_eq!(result.success_count(), 2);
    assert!(dir.path().join("1").exists());
}

#[test]
fn test_no_duplicates_nothing_deleted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"x").unwrap();
    fs::write(dir.path().join("y"), b"y").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let result = delete_batch::<NoCallback>(
        &report.duplicate_paths(),
        &DeleteConfig::permanent(),
        None,
    );

    assert_eq!(result.total_count(), 0);
    assert!(dir.path().join("x").exists());
    assert!(dir.path().join("y").exists());
}

#[cfg(unix)]
#[test]
fn test_symlink_never_replaces_its_target() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("z_report.pdf");
    fs::write(&real, b"only copy").unwrap();
    let alias = dir.path().join("a_alias");
    std::os::unix::fs::symlink(&real, &alias).unwrap();

    for follow in [false, true] {
        let finder = DuplicateFinder::new(
            FinderConfig::default()
                .with_workers(1)
                .with_walker_config(WalkerConfig::new(follow)),
        );
        let report = finder.find_duplicates(dir.path()).unwrap();
        assert!(report.duplicates.is_empty(), "follow = {}", follow);
        assert_eq!(report.summary.total_files, 1);

        let result = delete_batch::<NoCallback>(
            &report.duplicate_paths(),
            &DeleteConfig::permanent(),
            None,
        );
        assert_eq!(result.total_count(), 0);
        assert_eq!(fs::read(&real).unwrap(), b"only copy");
        assert_eq!(fs::read(&alias).unwrap(), b"only copy");
    }
}

#[cfg(unix)]
#[test]
fn test_linked_directory_keeps_one_physical_copy() {
    let dir = tempdir().unwrap();
    let real_dir = dir.path().join("z_photos");
    fs::create_dir(&real_dir).unwrap();
    fs::write(real_dir.join("img.jpg"), b"jpeg").unwrap();
    fs::write(dir.path().join("copy.jpg"), b"jpeg").unwrap();
    std::os::unix::fs::symlink(&real_dir, dir.path().join("a_photos")).unwrap();

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_workers(1)
            .with_walker_config(WalkerConfig::new(true)),
    );
    let report = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.duplicates.len(), 1);

    let result = delete_batch::<NoCallback>(
        &report.duplicate_paths(),
        &DeleteConfig::permanent(),
        None,
    );
    assert!(result.all_succeeded());
    assert_eq!(contents_by_value(dir.path()).get(&b"jpeg".to_vec()), Some(&1));
    assert!(report.duplicates[0].original.exists());
}
