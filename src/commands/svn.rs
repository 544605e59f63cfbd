//! ### svn 相关的指令
//!

use std::path::{Path, PathBuf};

use crossterm::style::Stylize;

use crate::core::{app::App, error::{AppError, AppResult}, svn::LogOptions, utils::{parse_revision_arg, parse_revision_range}};

/// 查看信息
pub fn handle_info(app: &App, target: &str, revision: Option<&str>) -> AppResult<()> {
    let revision = revision.map(parse_revision_arg).transpose()?;
    app.ui.update_step(&format!("Querying {}", target));
    let info = app.svn().info(target, revision.as_ref())?;
    app.ui.finish_step();
    app.ui.show_info(&info);
    Ok(())
}

/// 查看日志
pub fn handle_log(app: &App, target: &str, revisions: Option<&str>, limit: Option<u32>, verbose: bool, search: Option<&str>) -> AppResult<()> {
    let options = LogOptions {
        revisions: revisions.map(parse_revision_range).transpose()?,
        limit,
        verbose,
        search: search.map(str::to_string),
    };

    app.ui.update_step(&format!("Fetching log of {}", target));
    let entries = app.svn().log(target, &options)?;
    app.ui.finish_step();

    if entries.is_empty() {
        app.ui.info("No log entries");
        return Ok(());
    }
    app.ui.show_log(&entries, verbose);
    Ok(())
}

/// 已有工作副本则 update，否则 checkout
pub fn handle_checkout(app: &App, url: &str, path: &Path, revision: Option<&str>) -> AppResult<()> {
    let revision = revision.map(parse_revision_arg).transpose()?;
    app.ui.update_step(&format!("Syncing {}", path.display()));
    app.svn().update_or_checkout(url, path, revision.as_ref())?;
    app.ui.success(&format!("{} is up to date", path.display().to_string().green()));
    Ok(())
}

pub fn handle_update(app: &App, path: &Path, revision: Option<&str>) -> AppResult<()> {
    let revision = revision.map(parse_revision_arg).transpose()?;
    app.ui.update_step(&format!("Updating {}", path.display()));
    app.svn().update(path, revision.as_ref())?;
    app.ui.success("Update finished");
    Ok(())
}

pub fn handle_status(app: &App, path: &Path) -> AppResult<()> {
    let status = app.svn().status(path)?;
    if status.is_empty() {
        app.ui.info("Working copy is clean");
    } else {
        println!("{}", status);
    }
    Ok(())
}

/// 提交，未提供信息时提示输入
pub fn handle_commit(app: &App, paths: &[PathBuf], message: Option<&str>) -> AppResult<()> {
    let message = match message {
        Some(m) => m.to_string(),
        None => app.ui.input_commit_message()?,
    };
    let paths: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();

    app.ui.update_step("Committing");
    let svn = app.svn();
    svn.add(&paths)?;
    svn.commit(&paths, &message)?;
    app.ui.success("Changes committed");
    Ok(())
}

pub fn handle_lock(app: &App, path: &str, message: &str) -> AppResult<()> {
    // 已被锁定时错误信息里带有锁的持有者、时间和备注
    app.svn().lock(path, message)?;
    app.ui.success(&format!("{} locked", path.yellow().bold()));
    Ok(())
}

pub fn handle_unlock(app: &App, path: &str, force: bool) -> AppResult<()> {
    app.svn().unlock(path, force)?;
    app.ui.success(&format!("{} unlocked", path.yellow().bold()));
    Ok(())
}

pub fn handle_branch(app: &App, src: &str, dst: &str, message: &str) -> AppResult<()> {
    app.ui.update_step(&format!("Creating branch {}", dst));
    app.svn().branch(src, dst, message)?;
    app.ui.success(&format!("Branch {} created from {}", dst.green().bold(), src));
    Ok(())
}

/// 撤销一个版本或一个区间的修改
pub fn handle_rollback(app: &App, path: &Path, revisions: &str) -> AppResult<()> {
    let range = parse_revision_range(revisions)?;
    app.ui.update_step(&format!("Rolling back {} in {}", range, path.display()));
    app.svn().rollback(path, &range)?;
    app.ui.success(&format!("Rolled back {}, review and commit the result", range.to_string().yellow().bold()));
    Ok(())
}

/// 丢弃所有本地修改和未版本控制的文件
pub fn handle_clear(app: &App, path: &Path, yes: bool) -> AppResult<()> {
    if !yes && !app.ui.selector_yes_or_no(&format!("Discard ALL local changes in {}?", path.display()))? {
        return Err(AppError::OperationCancelled);
    }
    app.ui.update_step("Clearing working copy");
    app.svn().clear_all(path)?;
    app.ui.success("Working copy is clean");
    Ok(())
}

/// externals 参数格式为 source=target
pub fn handle_externals(app: &App, dir: &Path, definitions: &[String]) -> AppResult<()> {
    let mut pairs = Vec::with_capacity(definitions.len());
    for def in definitions {
        let (source, target) = def
            .split_once('=')
            .ok_or_else(|| AppError::Validation(format!("Expected SOURCE=TARGET, got {}", def)))?;
        pairs.push((source.trim(), target.trim()));
    }

    app.svn().propset_externals(dir, &pairs)?;
    app.ui.success(&format!("svn:externals set on {}", dir.display()));
    Ok(())
}
