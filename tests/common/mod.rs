//! Fake `svn` / `git` executables for driving the wrappers without a server.

#![allow(dead_code)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::Arc,
};

use quickstart_util::{Config, PosixShell};

pub const CALLS: &str = "calls.log";

/// Write an executable shell script that appends its arguments to `calls.log`
/// before running `body`.
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let log = dir.join(CALLS);
    let script = format!("#!/bin/sh\necho \"$@\" >> '{}'\n{}\n", log.display(), body);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Recorded invocations, one line per call.
pub fn calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join(CALLS))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn config(dir: &Path) -> Config {
    fs::create_dir_all(dir.join("tmp")).unwrap();
    Config::new()
        .with_platform(Arc::new(PosixShell))
        .with_temp_dir(dir.join("tmp"))
}

pub fn info_xml(path: &str, revision: u64, lock: Option<(&str, &str, &str)>) -> String {
    let lock = lock
        .map(|(owner, comment, created)| {
            format!(
                "<lock>\n<token>opaquelocktoken:1234</token>\n<owner>{}</owner>\n<comment>{}</comment>\n<created>{}</created>\n</lock>\n",
                owner, comment, created
            )
        })
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<info>
<entry kind="file" path="{path}" revision="{revision}">
<url>https://svn.example.com/repo/trunk/{path}</url>
<repository>
<root>https://svn.example.com/repo</root>
<uuid>0a1b2c3d-0000-1111-2222-333344445555</uuid>
</repository>
<commit revision="{revision}">
<author>alice</author>
<date>2024-03-01T08:00:00.000000Z</date>
</commit>
{lock}</entry>
</info>"#
    )
}
