//! Wrappers around the `svn`, `git` and platform file tools, plus zip helpers.
//!
//! Every wrapper is built from an explicit [`Config`]; nothing is global.

pub mod commands;
pub mod core;
pub mod ui;

pub use crate::core::{
    archive::{unzip, zip_path},
    config::Config,
    error::{AppError, AppResult, PathErrorKind},
    git::GitClient,
    models::{ChangedPath, CommitInfo, GitHead, InfoRecord, LockInfo, LogEntry, NodeKind, RepositoryInfo, WcInfo},
    path::{ChangeDirectory, PathHelper, is_directory, is_file, path_exists},
    platform::{Platform, PosixShell, WindowsShell},
    process::{CommandLine, CommandResult, RunMode, Runner},
    svn::{Credentials, LogOptions, SvnClient},
    utils::{Revision, RevisionRange},
};
