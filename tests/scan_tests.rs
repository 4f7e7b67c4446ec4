//! End-to-end tests for the scan engine against real directory trees

#![cfg(unix)]

use crossbeam::channel::{bounded, unbounded};
use pathrun::config::{OutputMode, ScanJobSpec};
use pathrun::scan::{CompiledJob, JobDescriptor, ScanOptions, Scanner, walker};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn job(name: &str, pattern: &str, command: &[&str]) -> ScanJobSpec {
    ScanJobSpec {
        name: name.to_string(),
        pattern: pattern.to_string(),
        command: command.iter().map(|s| s.to_string()).collect(),
    }
}

fn scanner(workers: usize) -> Scanner {
    Scanner::new(ScanOptions {
        workers,
        output: OutputMode::Captured,
        ..ScanOptions::default()
    })
    .unwrap()
}

/// `a/requirements.txt`, `b/c/requirements.txt` and `README.md`
fn requirements_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b/c")).unwrap();
    fs::write(root.join("a/requirements.txt"), "requests\n").unwrap();
    fs::write(root.join("b/c/requirements.txt"), "flask\n").unwrap();
    fs::write(root.join("README.md"), "# readme\n").unwrap();
    temp
}

fn matched_paths(root: &Path, spec: &ScanJobSpec) -> BTreeSet<PathBuf> {
    let compiled = CompiledJob::compile(spec).unwrap();
    let (tx, rx) = bounded::<JobDescriptor>(0);
    let collector = std::thread::spawn(move || rx.iter().map(|d| d.trigger_path).collect::<BTreeSet<_>>());

    walker::walk(root, &compiled, &tx).unwrap();
    drop(tx);
    collector.join().unwrap()
}

#[test]
fn test_requirements_scenario_runs_one_command_per_match() {
    let tree = requirements_tree();
    let log_dir = TempDir::new().unwrap();
    let log = log_dir.path().join("invocations.log");

    let append = format!("echo $1 >> {}", log.display());
    let jobs = vec![job("deps", r"^(.*requirements\.txt)$", &["sh", "-c", &append])];

    let summary = scanner(2).run(tree.path(), &jobs).unwrap();

    let report = summary.report("deps").unwrap();
    assert_eq!(report.walk.matched, 2);
    assert_eq!(report.commands.succeeded, 2);
    assert_eq!(report.commands.failed, 0);

    let logged: BTreeSet<String> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    let expected: BTreeSet<String> = [
        tree.path().join("a/requirements.txt"),
        tree.path().join("b/c/requirements.txt"),
    ]
    .iter()
    .map(|p| p.display().to_string())
    .collect();
    assert_eq!(logged, expected);
}

#[test]
fn test_cat_template_through_bash() {
    let tree = requirements_tree();
    let jobs = vec![job("deps", r"^(.*requirements\.txt)$", &["bash", "-c", "cat $1"])];

    let summary = scanner(2).run(tree.path(), &jobs).unwrap();

    let report = summary.report("deps").unwrap();
    assert_eq!(report.commands.received, 2);
    assert_eq!(report.commands.succeeded, 2);
}

#[test]
fn test_invalid_pattern_skips_only_that_job() {
    let tree = requirements_tree();
    let jobs = vec![
        job("first", r"\.txt$", &["true"]),
        job("broken", "(", &["true"]),
        job("third", r"\.md$", &["true"]),
    ];

    let summary = scanner(2).run(tree.path(), &jobs).unwrap();

    let names: Vec<&str> = summary.reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["first", "third"]);
    assert_eq!(summary.report("first").unwrap().commands.succeeded, 2);
    assert_eq!(summary.report("third").unwrap().commands.succeeded, 1);

    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "broken");
}

#[test]
fn test_failing_command_does_not_affect_other_jobs() {
    let tree = requirements_tree();
    let jobs = vec![
        job("failing", r"requirements\.txt$", &["sh", "-c", "exit 4"]),
        job("passing", r"requirements\.txt$", &["true"]),
    ];

    let summary = scanner(1).run(tree.path(), &jobs).unwrap();

    let failing = summary.report("failing").unwrap();
    assert_eq!(failing.commands.failed, 2);
    assert_eq!(failing.commands.succeeded, 0);

    let passing = summary.report("passing").unwrap();
    assert_eq!(passing.commands.succeeded, 2);
    assert_eq!(summary.total_failed(), 2);
}

#[test]
fn test_missing_program_is_a_failed_command() {
    let tree = requirements_tree();
    let jobs = vec![job("missing", r"README\.md$", &["/no/such/program", "$0"])];

    let summary = scanner(1).run(tree.path(), &jobs).unwrap();

    assert_eq!(summary.report("missing").unwrap().commands.failed, 1);
}

#[test]
fn test_match_count_equals_matching_entries() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let mut expected = BTreeSet::new();

    for a in 0..3 {
        for b in 0..3 {
            let dir = root.join(format!("d{a}/e{b}/f"));
            fs::create_dir_all(&dir).unwrap();
            for n in 0..2 {
                let file = dir.join(format!("file{n}.dat"));
                fs::write(&file, "").unwrap();
                expected.insert(file);
            }
            fs::write(dir.join("skip.txt"), "").unwrap();
        }
    }

    let paths = matched_paths(root, &job("dat", r"\.dat$", &["true"]));

    assert_eq!(paths, expected);
}

#[test]
fn test_repeated_runs_are_idempotent() {
    let tree = requirements_tree();
    let spec = job("all", ".*", &["true"]);

    let first = matched_paths(tree.path(), &spec);
    let second = matched_paths(tree.path(), &spec);
    assert_eq!(first, second);
    // a, a/requirements.txt, b, b/c, b/c/requirements.txt, README.md
    assert_eq!(first.len(), 6);

    let scanner = scanner(3);
    let one = scanner.run(tree.path(), &[spec.clone()]).unwrap();
    let two = scanner.run(tree.path(), &[spec]).unwrap();
    let (one, two) = (one.report("all").unwrap(), two.report("all").unwrap());
    assert_eq!(one.commands, two.commands);
    assert_eq!(one.walk.matched, two.walk.matched);
    assert_eq!(one.walk.entries, 6);
}

#[test]
fn test_deep_tree_terminates_with_single_worker() {
    let temp = TempDir::new().unwrap();
    let mut dir = temp.path().to_path_buf();
    for depth in 0..6 {
        dir = dir.join(format!("level{depth}"));
        for sibling in 0..3 {
            fs::create_dir_all(dir.with_file_name(format!("side{depth}_{sibling}"))).unwrap();
        }
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("leaf.txt"), "").unwrap();
    }

    let root = temp.path().to_path_buf();
    let (done_tx, done_rx) = unbounded();
    std::thread::spawn(move || {
        let summary = scanner(1).run(&root, &[job("every", ".*", &["true"])]);
        let _ = done_tx.send(summary);
    });

    let summary = done_rx
        .recv_timeout(Duration::from_secs(60))
        .expect("scan did not terminate")
        .unwrap();
    let report = summary.report("every").unwrap();

    // 6 levels, 3 side directories and 1 leaf file per level
    assert_eq!(report.walk.matched, 6 * 5);
    assert_eq!(report.commands.succeeded, report.walk.matched);
    assert_eq!(report.walk.directories, 1 + 6 * 4);
    assert!(report.walk.peak_walkers >= 1);
}

#[test]
fn test_dry_run_runs_nothing() {
    let tree = requirements_tree();
    let marker_dir = TempDir::new().unwrap();
    let marker = marker_dir.path().join("touched");

    let scanner = Scanner::new(ScanOptions {
        workers: 2,
        output: OutputMode::Captured,
        dry_run: true,
        job_filter: None,
    })
    .unwrap();
    let marker_arg = marker.display().to_string();
    let jobs = vec![job("deps", r"requirements\.txt$", &["touch", &marker_arg])];

    let summary = scanner.run(tree.path(), &jobs).unwrap();

    assert_eq!(summary.report("deps").unwrap().commands.skipped, 2);
    assert!(!marker.exists());
}

#[test]
fn test_non_utf8_path_reaches_command_unchanged() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tree = TempDir::new().unwrap();
    let bad = tree.path().join(OsStr::from_bytes(b"bad\xff.txt"));
    if fs::write(&bad, "raw bytes\n").is_err() {
        // Filesystem only accepts UTF-8 names
        return;
    }
    fs::write(tree.path().join("good.txt"), "").unwrap();

    let out_dir = TempDir::new().unwrap();
    let copy = out_dir.path().join("copy");
    let copy_arg = copy.display().to_string();
    let jobs = vec![
        job("count", r"\.txt$", &["true"]),
        job("copy", r"(?-u)^(.*bad.\.txt)$", &["cp", "$1", &copy_arg]),
    ];

    let summary = scanner(2).run(tree.path(), &jobs).unwrap();

    let count = summary.report("count").unwrap();
    assert_eq!(count.walk.matched, 2);
    assert_eq!(count.walk.errors, 0);

    let copied = summary.report("copy").unwrap();
    assert_eq!(copied.commands.succeeded, 1);
    assert_eq!(fs::read_to_string(&copy).unwrap(), "raw bytes\n");
}
