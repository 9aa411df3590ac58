use dedup_drive::duplicates::{DuplicateFinder, FinderConfig, FinderError, ScanReport};
use dedup_drive::scanner::{DigestAlgorithm, Hasher, ScanError};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn finder(workers: usize) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_workers(workers))
}

/// Every file grouped by digest: (originals, duplicates).
fn groups(report: &ScanReport) -> BTreeMap<[u8; 32], (BTreeSet<PathBuf>, BTreeSet<PathBuf>)> {
    let mut map: BTreeMap<_, (BTreeSet<PathBuf>, BTreeSet<PathBuf>)> = BTreeMap::new();
    for dup in &report.duplicates {
        let entry = map.entry(dup.digest).or_default();
        entry.0.insert(dup.original.clone());
        entry.1.insert(dup.path.clone());
    }
    map
}

#[test]
fn test_scan_hello_world() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"hello");
    let b = write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");

    let report = finder(16).find_duplicates(dir.path()).unwrap();

    assert!(report.errors.is_empty());
    assert_eq!(report.duplicates.len(), 1);
    let dup = &report.duplicates[0];
    let pair: BTreeSet<_> = [dup.path.clone(), dup.original.clone()].into();
    assert_eq!(pair, [a, b].into());
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.unique_files, 2);
}

#[test]
fn test_single_worker_keeps_first_in_scan_order() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"hello");
    let b = write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");

    let report = finder(1).find_duplicates(dir.path()).unwrap();

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].path, b);
    assert_eq!(report.duplicates[0].original, a);
    assert_eq!(report.summary.workers, 1);
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let report = finder(4).find_duplicates(dir.path()).unwrap();

    assert!(report.duplicates.is_empty());
    assert!(report.errors.is_empty());
    assert_eq!(report.summary.total_files, 0);
}

#[test]
fn test_scan_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = finder(4).find_duplicates(&missing).unwrap_err();

    assert!(matches!(err, FinderError::Scan(ScanError::NotFound(_))));
}

#[test]
fn test_scan_nested_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "photos/2019/img.jpg", b"jpeg bytes");
    write(dir.path(), "backup/photos/2019/img.jpg", b"jpeg bytes");
    write(dir.path(), "backup/old/img (1).jpg", b"jpeg bytes");
    write(dir.path(), "docs/notes.txt", b"notes");

    let report = finder(3).find_duplicates(dir.path()).unwrap();

    assert_eq!(report.summary.total_files, 4);
    assert_eq!(report.duplicates.len(), 2);
    assert_eq!(report.summary.unique_files, 2);
    let grouped = groups(&report);
    assert_eq!(grouped.len(), 1);
    let (originals, dups) = grouped.values().next().unwrap();
    assert_eq!(originals.len(), 1);
    assert!(originals.is_disjoint(dups));
}

#[test]
fn test_worker_count_does_not_change_outcome() {
    let dir = tempdir().unwrap();
    for i in 0..60 {
        write(dir.path(), &format!("f{:02}.bin", i), format!("content {}", i % 7).as_bytes());
    }

    for workers in [1, 2, 8, 16, 100] {
        let report = finder(workers).find_duplicates(dir.path()).unwrap();

        assert_eq!(report.duplicates.len(), 53, "workers = {}", workers);
        assert_eq!(report.summary.unique_files, 7, "workers = {}", workers);
        assert!(report.errors.is_empty());
    }
}

#[test]
fn test_repeated_runs_agree_on_groups() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        write(dir.path(), &format!("d{}/f{}.txt", i % 4, i), format!("v{}", i % 5).as_bytes());
    }

    let first = finder(8).find_duplicates(dir.path()).unwrap();
    let second = finder(8).find_duplicates(dir.path()).unwrap();

    // Which file survives may differ; the members of each group may not.
    let members = |report: &ScanReport| -> BTreeMap<[u8; 32], BTreeSet<PathBuf>> {
        groups(report)
            .into_iter()
            .map(|(digest, (originals, dups))| (digest, originals.union(&dups).cloned().collect()))
            .collect()
    };
    assert_eq!(members(&first), members(&second));
    assert_eq!(first.duplicates.len(), second.duplicates.len());
}

#[test]
fn test_duplicate_digest_matches_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");

    let report = DuplicateFinder::new(
        FinderConfig::default()
            .with_workers(2)
            .with_algorithm(DigestAlgorithm::Sha256),
    )
    .find_duplicates(dir.path())
    .unwrap();

    let expected = Hasher::with_algorithm(DigestAlgorithm::Sha256)
        .digest_reader(&b"same"[..])
        .unwrap();
    assert_eq!(report.duplicates[0].digest, expected);
    assert_eq!(report.summary.algorithm, DigestAlgorithm::Sha256);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported_and_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    let locked = write(dir.path(), "locked.txt", b"hello");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&locked).is_ok() {
        // Running with privileges that ignore file modes.
        return;
    }

    let report = finder(4).find_duplicates(dir.path()).unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path(), locked.as_path());
    assert_eq!(report.duplicates.len(), 1);
    assert!(report
        .duplicates
        .iter()
        .all(|d| d.path != locked && d.original != locked));

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
