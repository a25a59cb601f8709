#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn rdd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rdd").unwrap();
    cmd.current_dir(dir.path())
        .env("RDD_ROOT", dir.path())
        .env("NO_COLOR", "1")
        .env_remove("RDD_REVEAL_ENH")
        .env_remove("DEBUG")
        .env_remove("RUST_LOG");
    cmd
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let out = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

/// A repository on `main` with one commit.
fn init_repo(dir: &TempDir) {
    let p = dir.path();
    git(p, &["init", "-q"]);
    git(p, &["config", "user.name", "Test User"]);
    git(p, &["config", "user.email", "test@example.com"]);
    git(p, &["checkout", "-q", "-b", "main"]);
    std::fs::write(p.join("README.md"), "# Test\n").unwrap();
    git(p, &["add", "-A"]);
    git(p, &["commit", "-q", "-m", "Initial commit"]);
}

/// A repository configured for local-only work with `main` as the default.
fn init_local_project(dir: &TempDir) {
    init_repo(dir);
    rdd(dir)
        .args(["config", "set", "defaultBranch", "main"])
        .assert()
        .success();
    rdd(dir)
        .args(["config", "set", "localOnly", "true"])
        .assert()
        .success();
    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "-q", "-m", "rdd config"]);
}

/// A repository with `main` as the default but no `origin` and no local-only flag.
fn init_remoteless_project(dir: &TempDir) {
    init_repo(dir);
    rdd(dir)
        .args(["config", "set", "defaultBranch", "main"])
        .assert()
        .success();
    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "-q", "-m", "rdd config"]);
}

/// Check out `branch` and commit one new file on it.
fn commit_on_branch(dir: &TempDir, branch: &str, file: &str) {
    let p = dir.path();
    git(p, &["checkout", "-q", "-b", branch]);
    std::fs::write(p.join(file), "work\n").unwrap();
    git(p, &["add", file]);
    git(p, &["commit", "-q", "-m", &format!("add {file}")]);
}

fn execution_log(dir: &TempDir) -> Vec<serde_json::Value> {
    std::fs::read_to_string(dir.path().join(".rdd-docs/workspace/log.jsonl"))
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn journal(dir: &TempDir) -> String {
    std::fs::read_to_string(
        dir.path()
            .join(".rdd-docs/workspace/.rdd.copilot-prompts.md"),
    )
    .unwrap()
}

fn workspace_entries(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path().join(".rdd-docs/workspace"))
        .map(|it| it.count())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// rdd --version / --help
// ---------------------------------------------------------------------------

#[test]
fn version_flag_prints_version() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_change_kind_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    rdd(&dir)
        .args(["branch", "create", "feat", "my-thing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("hint: run 'rdd branch --help'"));
}

// ---------------------------------------------------------------------------
// rdd config
// ---------------------------------------------------------------------------

#[test]
fn config_set_get_show() {
    let dir = TempDir::new().unwrap();

    rdd(&dir)
        .args(["config", "set", "defaultBranch", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration updated: defaultBranch = dev"));

    rdd(&dir)
        .args(["config", "set", "localOnly", "true"])
        .assert()
        .success();

    rdd(&dir)
        .args(["config", "get", "defaultBranch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("defaultBranch: dev"));

    rdd(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"localOnly\": true"))
        .stdout(predicate::str::contains("lastModified"));

    let out = rdd(&dir)
        .args(["--json", "config", "get", "localOnly"])
        .output()
        .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["value"], serde_json::Value::Bool(true));
}

#[test]
fn config_get_missing_key_fails() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["config", "set", "defaultBranch", "main"])
        .assert()
        .success();
    rdd(&dir)
        .args(["config", "get", "nope"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Configuration key 'nope' not found"));
}

#[test]
fn config_show_without_document_fails() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["config", "show"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Config file not found"));
}

// ---------------------------------------------------------------------------
// rdd workspace
// ---------------------------------------------------------------------------

#[test]
fn workspace_init_fix_copies_templates() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "init", "fix"])
        .assert()
        .success();

    let ws = dir.path().join(".rdd-docs/workspace");
    assert!(ws.join("fix.md").is_file());
    assert!(ws.join(".rdd.copilot-prompts.md").is_file());

    rdd(&dir)
        .args(["workspace", "init", "change"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not empty"));
}

#[test]
fn workspace_init_change_has_no_fix_document() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "init", "change"])
        .assert()
        .success();
    let ws = dir.path().join(".rdd-docs/workspace");
    assert!(!ws.join("fix.md").exists());
    assert!(ws.join(".rdd.copilot-prompts.md").is_file());
}

#[test]
fn workspace_clear_empty_is_noop() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "clear"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("already empty"));
}

#[test]
fn workspace_clear_declined_keeps_files() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "init", "fix"])
        .assert()
        .success();
    rdd(&dir)
        .args(["workspace", "clear"])
        .write_stdin("n\n")
        .assert()
        .code(1);
    assert_eq!(workspace_entries(&dir), 2);

    rdd(&dir)
        .args(["workspace", "clear"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace cleared (2 entries removed)"));
    assert_eq!(workspace_entries(&dir), 0);
}

#[test]
fn workspace_status_json() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "init", "change"])
        .assert()
        .success();
    rdd(&dir)
        .args(["prompt", "mark-completed", "P02"])
        .assert()
        .success();

    let out = rdd(&dir)
        .args(["--json", "workspace", "status"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["state"], "populated");
    assert_eq!(v["prompts"]["total"], 3);
    assert_eq!(v["prompts"]["completed"], 1);
}

#[test]
fn workspace_archive_keep_then_declined_overwrite() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    git(dir.path(), &["checkout", "-q", "-b", "fix/20250101-0101-notes"]);
    rdd(&dir)
        .args(["workspace", "init", "fix"])
        .assert()
        .success();

    rdd(&dir)
        .args(["workspace", "archive", "--keep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace directory kept as requested"));
    assert_eq!(workspace_entries(&dir), 2);

    let archive = dir.path().join(".rdd-docs/archive/fix-20250101-0101-notes");
    assert!(archive.join("fix.md").is_file());
    assert!(archive.join(".rdd.copilot-prompts.md").is_file());
    let raw_meta = std::fs::read_to_string(archive.join(".archive-metadata")).unwrap();
    let meta: serde_json::Value = serde_json::from_str(&raw_meta).unwrap();
    assert_eq!(meta["branch"], "fix/20250101-0101-notes");
    assert_eq!(meta["archivedBy"], "Test User <test@example.com>");
    assert_eq!(meta["lastCommit"], git(dir.path(), &["rev-parse", "HEAD"]).as_str());
    assert_eq!(meta["lastCommitMessage"], "rdd config");
    assert!(meta["archivedAt"].is_string());

    rdd(&dir)
        .args(["workspace", "archive"])
        .write_stdin("n\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Archive directory already exists"))
        .stdout(predicate::str::contains("by Test User <test@example.com>"))
        .stdout(predicate::str::contains("Archive cancelled by user"));
    assert_eq!(
        std::fs::read_to_string(archive.join(".archive-metadata")).unwrap(),
        raw_meta
    );
    assert_eq!(workspace_entries(&dir), 2);

    rdd(&dir)
        .args(["workspace", "archive"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace directory cleared"));
    assert_eq!(workspace_entries(&dir), 0);
    assert!(archive.join("fix.md").is_file());
}

#[test]
fn workspace_archive_empty_fails() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    rdd(&dir)
        .args(["workspace", "archive"])
        .assert()
        .code(1);
    assert!(!dir.path().join(".rdd-docs/archive").exists());
}

// ---------------------------------------------------------------------------
// rdd prompt
// ---------------------------------------------------------------------------

#[test]
fn prompt_mark_completed_twice_warns() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "init", "change"])
        .assert()
        .success();

    rdd(&dir)
        .args(["prompt", "mark-completed", "P01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked prompt P01 as completed"));
    let after_first = journal(&dir);
    assert!(after_first.contains("- [x] [P01]"));

    rdd(&dir)
        .args(["prompt", "mark-completed", "P01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already marked as completed"));
    assert_eq!(journal(&dir), after_first);
    assert_eq!(journal(&dir).matches("[x]").count(), 1);
}

#[test]
fn prompt_mark_unknown_id_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "init", "change"])
        .assert()
        .success();
    let before = journal(&dir);

    rdd(&dir)
        .args(["prompt", "mark-completed", "P99"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("P99"));
    assert_eq!(journal(&dir), before);
}

#[test]
fn prompt_without_journal_fails() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["prompt", "mark-completed", "P01"])
        .assert()
        .code(1);
}

#[test]
fn prompt_list_and_status() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "init", "change"])
        .assert()
        .success();
    rdd(&dir)
        .args(["prompt", "mark-completed", "P01"])
        .assert()
        .success();

    rdd(&dir)
        .args(["prompt", "list", "--status", "unchecked"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P02"))
        .stdout(predicate::str::contains("P03"))
        .stdout(predicate::str::contains("P01").not());

    let out = rdd(&dir)
        .args(["--json", "prompt", "list", "--status", "checked"])
        .output()
        .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 1);
    assert_eq!(v[0]["id"], "P01");

    rdd(&dir)
        .args(["prompt", "status", "P01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P01: checked"));

    rdd(&dir)
        .args(["prompt", "status", "P42"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("P42: absent"));
}

#[test]
fn prompt_list_rejects_unknown_filter() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["prompt", "list", "--status", "done"])
        .assert()
        .failure();
}

#[test]
fn prompt_log_execution_appends_json_lines() {
    let dir = TempDir::new().unwrap();
    rdd(&dir)
        .args(["workspace", "init", "change"])
        .assert()
        .success();

    for details in ["first run", "second run"] {
        rdd(&dir)
            .args(["prompt", "log-execution", "P01", details])
            .assert()
            .success();
    }

    let log = std::fs::read_to_string(dir.path().join(".rdd-docs/workspace/log.jsonl")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    let rec: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(rec["promptId"], "P01");
    assert_eq!(rec["executionDetails"], "second run");
    assert!(rec["sessionId"].as_str().unwrap().starts_with("exec-"));

    let out = rdd(&dir)
        .args(["--json", "workspace", "status"])
        .output()
        .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["executions"], 2);
}

// ---------------------------------------------------------------------------
// rdd fix / change
// ---------------------------------------------------------------------------

#[test]
fn fix_init_creates_branch_docs_and_workspace() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);

    rdd(&dir)
        .args(["fix", "init", "Login Crash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Local-only mode: skipping pull"))
        .stdout(predicate::str::contains("Change created successfully!"));

    let branch = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
    assert!(branch.starts_with("fix/"), "unexpected branch {branch}");
    assert!(branch.ends_with("-login-crash"));

    let docs = dir.path().join(".rdd-docs");
    for name in ["requirements.md", "tech-spec.md", "backlog.md"] {
        assert!(docs.join(name).is_file(), "{name} missing");
    }
    assert!(docs.join("workspace/fix.md").is_file());
    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert!(gitignore.contains(".rdd-docs/workspace/"));
}

#[test]
fn fix_init_off_default_branch_is_refused() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    git(dir.path(), &["checkout", "-q", "-b", "side"]);

    rdd(&dir)
        .args(["fix", "init", "anything"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("git checkout main"));
    assert_eq!(workspace_entries(&dir), 0);
}

#[test]
fn change_create_refuses_populated_workspace() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    rdd(&dir)
        .args(["workspace", "init", "change"])
        .assert()
        .success();

    rdd(&dir)
        .args(["change", "create", "fix", "--name", "x", "--description", "d"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("rdd change wrap-up"));
}

#[test]
fn change_create_with_flags_then_wrap_up() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);

    rdd(&dir)
        .args([
            "change",
            "create",
            "enh",
            "--name",
            "Add User Auth",
            "--description",
            "Add authentication",
        ])
        .assert()
        .success();

    let branch = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
    assert!(branch.starts_with("enh/"));
    assert!(branch.ends_with("-add-user-auth"));
    assert!(!dir.path().join(".rdd-docs/workspace/fix.md").exists());

    let log = execution_log(&dir);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["promptId"], "description");
    assert_eq!(log[0]["executionDetails"], "Add authentication");

    rdd(&dir)
        .args(["change", "wrap-up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Local-only mode: skipping push"))
        .stdout(predicate::str::contains("Change wrapped up successfully!"));

    assert_eq!(workspace_entries(&dir), 0);
    let archive = dir
        .path()
        .join(".rdd-docs/archive")
        .join(branch.replace('/', "-"));
    assert!(archive.join(".rdd.copilot-prompts.md").is_file());
    let meta: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(archive.join(".archive-metadata")).unwrap())
            .unwrap();
    assert_eq!(meta["branch"], branch.as_str());
    assert_eq!(meta["archivedBy"], "Test User <test@example.com>");

    let subject = git(dir.path(), &["log", "-1", "--format=%s"]);
    assert_eq!(subject, format!("wrap up {branch}"));
}

#[test]
fn change_create_interactive_name_and_menu() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);

    // description, name, confirm name, type menu (only Fix is offered)
    rdd(&dir)
        .args(["change", "create"])
        .write_stdin("Fix the flaky login\nflaky login\ny\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Normalized name: flaky-login"));

    let branch = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
    assert!(branch.starts_with("fix/"));
    assert!(branch.ends_with("-flaky-login"));
    assert_eq!(execution_log(&dir)[0]["executionDetails"], "Fix the flaky login");
}

#[test]
fn change_create_cancelled_on_eof() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);

    rdd(&dir)
        .args(["change", "create"])
        .write_stdin("")
        .assert()
        .code(130);
    assert_eq!(git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
}

#[cfg(unix)]
#[test]
fn interrupt_at_prompt_exits_130() {
    use std::io::Read;
    use std::process::Stdio;

    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("rdd"))
        .args(["change", "create"])
        .current_dir(dir.path())
        .env("RDD_ROOT", dir.path())
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdout = child.stdout.take().unwrap();

    // Wait until rdd is blocked on the description question.
    let mut seen = Vec::new();
    let mut buf = [0u8; 256];
    while !String::from_utf8_lossy(&seen).contains("short description") {
        let n = stdout.read(&mut buf).unwrap();
        assert!(n > 0, "rdd exited before asking: {}", String::from_utf8_lossy(&seen));
        seen.extend_from_slice(&buf[..n]);
    }

    let pid = child.id().to_string();
    let killed = std::process::Command::new("kill")
        .args(["-INT", &pid])
        .status()
        .unwrap();
    assert!(killed.success());
    stdout.read_to_end(&mut seen).unwrap();
    let status = child.wait().unwrap();

    assert_eq!(status.code(), Some(130));
    assert!(String::from_utf8_lossy(&seen).contains("Operation cancelled by user"));
    assert_eq!(git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
}

#[test]
fn wrap_up_on_default_branch_is_refused() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    rdd(&dir)
        .args(["fix", "wrap-up"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("enh/20241101-1234-my-enhancement"));
}

// ---------------------------------------------------------------------------
// rdd branch
// ---------------------------------------------------------------------------

#[test]
fn branch_create_list_delete() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);

    rdd(&dir)
        .args(["branch", "create", "fix", "typo"])
        .assert()
        .success();
    let branch = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);

    let out = rdd(&dir)
        .args(["--json", "branch", "list", "fix/"])
        .output()
        .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v[0]["name"], branch.as_str());
    assert_eq!(v[0]["current"], true);

    rdd(&dir)
        .args(["branch", "delete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Local branch deleted"));
    assert_eq!(git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
    assert!(git(dir.path(), &["branch", "--list", &branch]).is_empty());
}

#[test]
fn branch_create_rejects_bad_name() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    rdd(&dir)
        .args(["branch", "create", "fix", "Has Spaces"])
        .assert()
        .code(1);
}

#[test]
fn branch_delete_refuses_protected() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    rdd(&dir)
        .args(["branch", "delete", "main"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("main"));
    assert_eq!(git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
}

#[test]
fn branch_delete_refuses_dirty_tree() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    git(dir.path(), &["checkout", "-q", "-b", "fix/20250101-0101-dirty"]);
    std::fs::write(dir.path().join("README.md"), "# Changed\n").unwrap();

    rdd(&dir)
        .args(["branch", "delete"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("README.md"));
}

#[test]
fn branch_delete_force_removes_unmerged_branch() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    let branch = "fix/20250101-0101-wip";
    commit_on_branch(&dir, branch, "WIP.md");

    rdd(&dir)
        .args(["branch", "delete", branch])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to delete local branch"));
    assert_eq!(git(dir.path(), &["branch", "--list", branch]), branch);

    rdd(&dir)
        .args(["branch", "delete", branch, "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Local branch force-deleted"))
        .stdout(predicate::str::contains("Local-only mode: skipping remote deletion"));
    assert!(git(dir.path(), &["branch", "--list", branch]).is_empty());
}

#[test]
fn branch_cleanup_offers_force_delete_in_local_only_mode() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    let branch = "fix/20250101-0101-stale";
    commit_on_branch(&dir, branch, "STALE.md");

    rdd(&dir)
        .args(["branch", "cleanup", branch])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to 'main'"))
        .stdout(predicate::str::contains("Local-only mode: skipping fetch"))
        .stdout(predicate::str::contains("Local-only mode: skipping pull"))
        .stdout(predicate::str::contains("Branch not fully merged"))
        .stdout(predicate::str::contains("Local branch kept"));
    assert_eq!(git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
    assert!(!git(dir.path(), &["branch", "--list", branch]).is_empty());

    rdd(&dir)
        .args(["branch", "cleanup", branch])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already on 'main'"))
        .stdout(predicate::str::contains("Local branch force-deleted"))
        .stdout(predicate::str::contains("Fetched and pulled").not());
    assert!(git(dir.path(), &["branch", "--list", branch]).is_empty());
}

// ---------------------------------------------------------------------------
// rdd git
// ---------------------------------------------------------------------------

#[test]
fn git_push_in_local_only_mode_is_noop() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    rdd(&dir)
        .args(["git", "push"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Local-only mode: skipping push"));
}

#[test]
fn git_modified_files_against_local_default() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    git(dir.path(), &["checkout", "-q", "-b", "enh/20250101-0101-docs"]);
    std::fs::write(dir.path().join("NOTES.md"), "notes\n").unwrap();
    std::fs::write(dir.path().join("README.md"), "# Changed\n").unwrap();
    git(dir.path(), &["add", "README.md", "NOTES.md"]);
    git(dir.path(), &["commit", "-q", "-m", "docs"]);

    rdd(&dir)
        .args(["git", "modified-files"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+ NOTES.md (added)"))
        .stdout(predicate::str::contains("~ README.md (modified)"))
        .stdout(predicate::str::contains("Found 2 modified file(s)"));

    let out = rdd(&dir)
        .args(["--json", "git", "compare"])
        .output()
        .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["base"], "main");
    assert_eq!(v["ahead"], 1);
    assert_eq!(v["files"].as_array().unwrap().len(), 2);
}

#[test]
fn update_from_main_merges_and_restores_stash() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    let p = dir.path();

    git(p, &["checkout", "-q", "-b", "fix/20250101-0101-sync"]);
    rdd(&dir)
        .args(["git", "update-from-main"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Already up to date"));

    git(p, &["checkout", "-q", "main"]);
    std::fs::write(p.join("CHANGELOG.md"), "v1\n").unwrap();
    git(p, &["add", "CHANGELOG.md"]);
    git(p, &["commit", "-q", "-m", "changelog"]);
    git(p, &["checkout", "-q", "fix/20250101-0101-sync"]);
    std::fs::write(p.join("README.md"), "# Local edit\n").unwrap();

    rdd(&dir)
        .args(["git", "update-from-main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merging 1 commit(s) from main"));

    assert!(p.join("CHANGELOG.md").is_file());
    assert_eq!(
        std::fs::read_to_string(p.join("README.md")).unwrap(),
        "# Local edit\n"
    );
    assert!(git(p, &["stash", "list"]).is_empty());
}

#[test]
fn update_from_main_reports_conflicts() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    let p = dir.path();

    git(p, &["checkout", "-q", "-b", "fix/20250101-0101-clash"]);
    std::fs::write(p.join("README.md"), "# Branch\n").unwrap();
    git(p, &["commit", "-q", "-am", "branch edit"]);
    git(p, &["checkout", "-q", "main"]);
    std::fs::write(p.join("README.md"), "# Main\n").unwrap();
    git(p, &["commit", "-q", "-am", "main edit"]);
    git(p, &["checkout", "-q", "fix/20250101-0101-clash"]);

    rdd(&dir)
        .args(["git", "update-from-main"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("README.md"))
        .stdout(predicate::str::contains("git merge --abort"));
}

#[test]
fn git_compare_reports_commits_ahead() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_local_project(&dir);
    commit_on_branch(&dir, "enh/20250101-0101-docs", "NOTES.md");

    rdd(&dir)
        .args(["git", "compare"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Local-only mode: skipping fetch"))
        .stdout(predicate::str::contains("COMPARISON: enh/20250101-0101-docs vs main"))
        .stdout(predicate::str::contains("This branch is 1 commit(s) ahead of main"))
        .stdout(predicate::str::contains("add NOTES.md"))
        .stdout(predicate::str::contains("+ NOTES.md (added)"));
}

#[test]
fn git_compare_without_remote_is_an_error() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_remoteless_project(&dir);
    commit_on_branch(&dir, "fix/20250101-0101-offline", "OFFLINE.md");

    rdd(&dir)
        .args(["git", "compare"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("commit(s) ahead").not())
        .stderr(predicate::str::contains("origin/main"))
        .stderr(predicate::str::contains("localOnly"));

    rdd(&dir)
        .args(["--json", "git", "compare"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("fetch from origin/main failed"));

    rdd(&dir)
        .args(["git", "modified-files"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No files modified").not());
}

#[test]
fn update_from_main_without_remote_fails_and_restores_stash() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_remoteless_project(&dir);
    let p = dir.path();
    commit_on_branch(&dir, "fix/20250101-0101-offline", "OFFLINE.md");
    std::fs::write(p.join("README.md"), "# Local edit\n").unwrap();

    rdd(&dir)
        .args(["git", "update-from-main"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Already up to date").not())
        .stderr(predicate::str::contains("origin/main"));

    assert_eq!(
        git(p, &["rev-parse", "--abbrev-ref", "HEAD"]),
        "fix/20250101-0101-offline"
    );
    assert_eq!(
        std::fs::read_to_string(p.join("README.md")).unwrap(),
        "# Local edit\n"
    );
    assert!(git(p, &["stash", "list"]).is_empty());
}
