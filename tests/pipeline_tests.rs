//! End-to-end scans over temporary directory trees.

use dupehash::config::ScanConfig;
use dupehash::duplicates::{CollisionTable, Pipeline, ScanReport};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn scan(root: &Path, workers: usize, min_bytes: u64, thorough: bool) -> ScanReport {
    let config = ScanConfig::new(root)
        .with_workers(workers)
        .with_min_bytes(min_bytes)
        .with_thorough(thorough);
    Pipeline::new(config).run().unwrap()
}

/// Buckets as sets of paths, independent of bucket and insertion order.
fn bucket_sets(table: &CollisionTable) -> BTreeSet<BTreeSet<PathBuf>> {
    table
        .iter()
        .map(|(_, paths)| paths.iter().cloned().collect())
        .collect()
}

fn create_tree(root: &Path) {
    let content_a = vec![b'a'; 1000];
    let content_b = vec![b'b'; 2000];

    fs::create_dir_all(root.join("x/y")).unwrap();
    fs::create_dir_all(root.join("z")).unwrap();

    fs::write(root.join("a1.bin"), &content_a).unwrap();
    fs::write(root.join("x/a2.bin"), &content_a).unwrap();
    fs::write(root.join("x/y/a3.bin"), &content_a).unwrap();
    fs::write(root.join("b1.bin"), &content_b).unwrap();
    fs::write(root.join("z/b2.bin"), &content_b).unwrap();
    fs::write(root.join("z/unique.bin"), vec![b'u'; 700]).unwrap();
    fs::write(root.join("x/small1.txt"), b"tiny").unwrap();
    fs::write(root.join("z/small2.txt"), b"tiny").unwrap();
    fs::write(root.join("empty"), b"").unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let report = scan(dir.path(), 4, 256, false);

    assert!(report.collisions.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert_eq!(report.summary.hashing_files, 0);
    assert_eq!(report.summary.duplicates, 0);
}

#[test]
fn test_identical_pair_and_one_byte_difference() {
    let dir = tempdir().unwrap();
    let content = vec![7u8; 512];
    let mut different = content.clone();
    different[511] = 8;

    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    let c = dir.path().join("c.bin");
    fs::write(&a, &content).unwrap();
    fs::write(&b, &content).unwrap();
    fs::write(&c, &different).unwrap();

    let report = scan(dir.path(), 3, 256, false);

    assert_eq!(report.collisions.len(), 1);
    let (_, paths) = report.collisions.iter().next().unwrap();
    let paths: BTreeSet<PathBuf> = paths.iter().cloned().collect();
    assert_eq!(paths, BTreeSet::from([a, b]));
    assert!(report
        .collisions
        .iter()
        .all(|(_, paths)| !paths.contains(&c)));
    assert_eq!(report.summary.singles, 1);
    assert_eq!(report.summary.duplicates, 1);
}

#[test]
fn test_undersized_files_never_bucketed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.txt"), [1u8; 10]).unwrap();
    fs::write(dir.path().join("two.txt"), [1u8; 10]).unwrap();

    let report = scan(dir.path(), 2, 256, false);

    assert!(report.collisions.is_empty());
    assert_eq!(report.summary.undersized_files, 2);
    assert_eq!(report.summary.hashing_files, 0);
}

#[test]
fn test_zero_minimum_includes_small_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.txt"), [1u8; 10]).unwrap();
    fs::write(dir.path().join("two.txt"), [1u8; 10]).unwrap();
    fs::write(dir.path().join("empty1"), b"").unwrap();
    fs::write(dir.path().join("empty2"), b"").unwrap();

    let report = scan(dir.path(), 2, 0, false);

    assert_eq!(report.collisions.len(), 1);
    assert_eq!(report.summary.undersized_files, 2);
}

#[test]
fn test_counters_add_up() {
    let dir = tempdir().unwrap();
    create_tree(dir.path());

    let summary = scan(dir.path(), 4, 256, false).summary;

    assert_eq!(summary.total_files, 9);
    assert_eq!(summary.undersized_files, 3);
    assert_eq!(summary.hashing_files, 6);
    assert_eq!(summary.access_errors, 0);
    assert_eq!(
        summary.total_files,
        summary.undersized_files + summary.hashing_files + summary.access_errors
    );
    assert_eq!(summary.singles, 1);
    assert_eq!(summary.collision_groups, 2);
    assert_eq!(summary.colliding_files, 5);
    assert_eq!(summary.duplicates, 3);
}

#[test]
fn test_worker_count_does_not_change_result() {
    let dir = tempdir().unwrap();
    create_tree(dir.path());

    let single = scan(dir.path(), 1, 256, false);
    let many = scan(dir.path(), 8, 256, false);

    assert_eq!(bucket_sets(&single.collisions), bucket_sets(&many.collisions));
    assert_eq!(single.summary.duplicates, many.summary.duplicates);
}

#[test]
fn test_thorough_keeps_buckets_and_extends_fingerprints() {
    let dir = tempdir().unwrap();
    create_tree(dir.path());

    let plain = scan(dir.path(), 4, 256, false);
    let thorough = scan(dir.path(), 4, 256, true);

    assert_eq!(bucket_sets(&plain.collisions), bucket_sets(&thorough.collisions));
    for (fingerprint, _) in plain.collisions.iter() {
        assert_eq!(fingerprint.split('.').count(), 2);
    }
    for (fingerprint, _) in thorough.collisions.iter() {
        assert_eq!(fingerprint.split('.').count(), 3);
    }
}

#[test]
fn test_same_content_different_size_prefix() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), vec![0u8; 300]).unwrap();
    fs::write(dir.path().join("b"), vec![0u8; 301]).unwrap();

    let report = scan(dir.path(), 2, 256, false);
    assert!(report.collisions.is_empty());
    assert_eq!(report.summary.singles, 2);
}

#[test]
fn test_many_files_exceed_reply_capacity() {
    let dir = tempdir().unwrap();
    for i in 0..200u32 {
        let sub = dir.path().join(format!("d{}", i % 7));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("f{}.bin", i)), vec![(i % 10) as u8; 300]).unwrap();
    }

    let report = scan(dir.path(), 2, 256, false);

    assert_eq!(report.summary.hashing_files, 200);
    assert_eq!(report.collisions.len(), 10);
    assert_eq!(report.collisions.colliding_files(), 200);
    assert!(report.collisions.iter().all(|(_, paths)| paths.len() == 20));
}

#[test]
fn test_root_may_be_a_single_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("only.bin");
    fs::write(&file, vec![3u8; 400]).unwrap();

    let report = scan(&file, 2, 256, false);
    assert_eq!(report.summary.total_files, 1);
    assert_eq!(report.summary.hashing_files, 1);
    assert!(report.collisions.is_empty());
}
