#![cfg(unix)]

mod common;

use std::fs;

use pretty_assertions::assert_eq;
use quickstart_util::GitClient;

use common::{calls, config, fake_tool};

#[test]
fn get_clean_clones_missing_checkout() {
    let dir = tempfile::tempdir().unwrap();
    let git = fake_tool(dir.path(), "git", "exit 0");
    let client = GitClient::new(&config(dir.path()).with_git_program(git.display().to_string()));
    let target = dir.path().join("repo");

    client.get_clean("https://git.example.com/repo.git", &target, "main", None).unwrap();

    assert_eq!(
        calls(dir.path()),
        vec![format!("clone -b main https://git.example.com/repo.git {}", target.display())]
    );
}

#[test]
fn get_clean_refreshes_existing_checkout() {
    let dir = tempfile::tempdir().unwrap();
    let git = fake_tool(dir.path(), "git", "exit 0");
    let client = GitClient::new(&config(dir.path()).with_git_program(git.display().to_string()));
    let target = dir.path().join("repo");
    fs::create_dir_all(&target).unwrap();

    client.get_clean("https://git.example.com/repo.git", &target, "release", Some("abc123")).unwrap();

    let t = target.display().to_string();
    assert_eq!(
        calls(dir.path()),
        vec![
            format!("-C {t} reset --hard"),
            format!("-C {t} fetch origin"),
            format!("-C {t} checkout release"),
            format!("-C {t} merge origin/release"),
            format!("-C {t} reset --hard abc123"),
        ]
    );
}

#[test]
fn get_clean_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let git = fake_tool(dir.path(), "git", "if [ \"$3\" = fetch ]; then exit 128; fi");
    let client = GitClient::new(&config(dir.path()).with_git_program(git.display().to_string()));
    let target = dir.path().join("repo");
    fs::create_dir_all(&target).unwrap();

    let err = client.get_clean("https://git.example.com/repo.git", &target, "main", None).unwrap_err();
    assert_eq!(err.exit_code(), Some(128));
    assert_eq!(calls(dir.path()).len(), 2);
}
