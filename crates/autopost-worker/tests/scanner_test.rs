use std::fs;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, SystemTime};

use autopost_core::WatchConfig;
use autopost_worker::{DirectoryScanner, ScanError};
use tempfile::TempDir;

// Longer than the coarsest filesystem mtime resolution we expect
const MTIME_TICK: Duration = Duration::from_millis(1100);

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"data").unwrap();
    path
}

fn names(files: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<_> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn scanner_from_epoch(config: WatchConfig) -> DirectoryScanner {
    DirectoryScanner::with_last_check(config, SystemTime::UNIX_EPOCH)
}

#[test]
fn test_finds_new_files_once() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.gif");
    touch(dir.path(), "a.jpg");
    touch(dir.path(), "a.png");

    let mut scanner = scanner_from_epoch(WatchConfig::new(dir.path(), ""));
    assert_eq!(
        names(&scanner.scan().unwrap()),
        vec!["a.gif", "a.jpg", "a.png"]
    );
    assert!(scanner.scan().unwrap().is_empty());

    sleep(MTIME_TICK);
    touch(dir.path(), "b.gif");
    assert_eq!(names(&scanner.scan().unwrap()), vec!["b.gif"]);
    assert!(scanner.scan().unwrap().is_empty());
}

#[test]
fn test_exclusions_still_advance_high_water_mark() {
    let dir = TempDir::new().unwrap();
    let mut config = WatchConfig::new(dir.path(), "");
    config.exclude = vec!["thumb".into(), "tiny".into()];

    let mut scanner = scanner_from_epoch(config);
    assert!(scanner.scan().unwrap().is_empty());

    sleep(MTIME_TICK);
    touch(dir.path(), "b.gif");
    touch(dir.path(), "b_thumb.gif");
    touch(dir.path(), "tiny_b.jpg");

    assert_eq!(names(&scanner.scan().unwrap()), vec!["b.gif"]);
    let mark = scanner.last_check();
    assert!(mark > SystemTime::UNIX_EPOCH);

    assert!(scanner.scan().unwrap().is_empty());
    assert_eq!(scanner.last_check(), mark);
}

#[test]
fn test_only_eligible_extensions_reported() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "photo.jpeg");
    touch(dir.path(), "archive.png.zip");
    touch(dir.path(), "SHOT.PNG");
    touch(dir.path(), "Clip.Gif");

    let mut scanner = scanner_from_epoch(WatchConfig::new(dir.path(), ""));
    assert_eq!(
        names(&scanner.scan().unwrap()),
        vec!["Clip.Gif", "SHOT.PNG"]
    );
}

#[test]
fn test_walks_subdirectories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("2024").join("june");
    fs::create_dir_all(&nested).unwrap();
    touch(&nested, "deep.png");
    // A directory with an eligible name is not a file
    fs::create_dir(dir.path().join("folder.png")).unwrap();

    let mut scanner = scanner_from_epoch(WatchConfig::new(dir.path(), ""));
    assert_eq!(names(&scanner.scan().unwrap()), vec!["deep.png"]);
}

#[test]
fn test_recovers_after_directory_removed() {
    let root = TempDir::new().unwrap();
    let watched = root.path().join("shots");
    fs::create_dir(&watched).unwrap();
    touch(&watched, "a.png");

    let mut scanner = scanner_from_epoch(WatchConfig::new(&watched, ""));
    assert_eq!(scanner.scan().unwrap().len(), 1);
    let mark = scanner.last_check();

    fs::remove_dir_all(&watched).unwrap();
    assert!(matches!(scanner.scan(), Err(ScanError::MissingPath(_))));
    assert_eq!(scanner.last_check(), mark);

    sleep(MTIME_TICK);
    fs::create_dir(&watched).unwrap();
    touch(&watched, "b.png");
    assert_eq!(names(&scanner.scan().unwrap()), vec!["b.png"]);
}

#[test]
fn test_fresh_scanner_ignores_existing_files() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "old.png");
    sleep(MTIME_TICK);

    let mut scanner = DirectoryScanner::new(WatchConfig::new(dir.path(), ""));
    assert!(scanner.scan().unwrap().is_empty());

    sleep(MTIME_TICK);
    touch(dir.path(), "new.png");
    assert_eq!(names(&scanner.scan().unwrap()), vec!["new.png"]);
}
