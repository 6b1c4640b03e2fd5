//! Black-box tests against the built `sysbatch` binary.

use std::fs::File;
use std::path::Path;
use std::process::{Command, Output};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn sysbatch(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sysbatch"))
        .args(args)
        .current_dir(workdir)
        .env_remove("SYSBATCH_CLEANUP_DIR")
        .env_remove("SYSBATCH_CLEANUP_MAX_AGE_DAYS")
        .env_remove("SYSBATCH_LOW_STOCK_THRESHOLD")
        .env_remove("SYSBATCH_INVENTORY_FILE")
        .env("SYSBATCH_LOG_FORMAT", "json")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn touch(dir: &Path, name: &str, age: Duration) {
    let file = File::create(dir.join(name)).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

#[test]
fn list_shows_registered_jobs() {
    let work = TempDir::new().unwrap();
    let output = sysbatch(work.path(), &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for job in ["delete-old-files", "system-destruction", "terminator-quest", "daily-inventory-report"] {
        assert!(stdout.contains(job), "missing {job} in {stdout}");
    }
}

#[test]
fn delete_old_files_sweeps_the_given_directory() {
    let work = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    touch(target.path(), "a.log", DAY * 40);
    touch(target.path(), "b.log", DAY * 2);

    let path_param = format!("cleanup.path={}", target.path().display());
    let output = sysbatch(work.path(), &["run", "delete-old-files", &path_param]);

    assert_eq!(output.status.code(), Some(0));
    let execution: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(execution["status"], "completed");
    assert_eq!(execution["step_executions"][0]["execution_context"]["deleted"], serde_json::json!(["a.log"]));
    assert!(!target.path().join("a.log").exists());
    assert!(target.path().join("b.log").exists());
}

#[test]
fn env_file_configures_the_cleanup_directory() {
    let work = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    touch(target.path(), "stale.tmp", DAY * 3);

    let env_file = work.path().join("ops.env");
    std::fs::write(
        &env_file,
        format!(
            "SYSBATCH_CLEANUP_DIR={}\nSYSBATCH_CLEANUP_MAX_AGE_DAYS=1\n",
            target.path().display()
        ),
    )
    .unwrap();

    let output = sysbatch(
        work.path(),
        &["--env-file", env_file.to_str().unwrap(), "run", "delete-old-files"],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(!target.path().join("stale.tmp").exists());
}

#[test]
fn destruction_level_ten_is_rejected() {
    let work = TempDir::new().unwrap();
    let output = sysbatch(work.path(), &["run", "system-destruction", "system.destruction.level=10,long"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("exceeds the allowed maximum of 9"), "{stderr}");
}

#[test]
fn unknown_job_is_rejected() {
    let work = TempDir::new().unwrap();
    let output = sysbatch(work.path(), &["run", "reticulate-splines"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn failing_collaborator_exits_with_one() {
    let work = TempDir::new().unwrap();
    let inventory = work.path().join("stock.json");
    std::fs::write(&inventory, "{ not an array").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_sysbatch"))
        .args(["run", "daily-inventory-report"])
        .current_dir(work.path())
        .env("SYSBATCH_INVENTORY_FILE", &inventory)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let execution: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(execution["status"], "failed");
}
