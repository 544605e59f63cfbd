//! ### 执行 SVN 相关操作
//!
//! 单个函数应该只执行一个操作，返回相应的结果；组合操作（update_or_checkout、
//! clear_all、branch、rollback）放在最后

use std::{path::Path, sync::LazyLock};

use regex::Regex;
use tracing::{info, warn};

use super::{
    config::Config,
    error::{AppError, AppResult},
    models::{InfoRecord, LogEntry},
    path::PathHelper,
    process::{CommandLine, CommandResult, RunMode, Runner},
    svn_xml::{parse_info_xml, parse_log_xml},
    utils::{Revision, RevisionRange, write_temp_lines},
};

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `svn log` 的可选参数
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub revisions: Option<RevisionRange>,
    pub limit: Option<u32>,
    /// Include changed paths (`-v`).
    pub verbose: bool,
    /// Glob matched by svn against author, date, message and changed paths.
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SvnClient {
    runner: Runner,
    paths: PathHelper,
    global_args: Vec<String>,
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn require_message(message: &str, operation: &'static str) -> AppResult<()> {
    if message.trim().is_empty() {
        return Err(AppError::MessageRequired { operation });
    }
    Ok(())
}

/// svn 可能以 0 退出但输出以 "svn:" 开头的错误行
fn has_error_line(output: &str) -> bool {
    output.lines().any(|line| line.starts_with("svn:"))
}

/// 倒序合并的区间：start 取较大值，end 减一
pub fn rollback_merge_range(a: u64, b: u64) -> (u64, u64) {
    let (start, end) = if a >= b { (a, b) } else { (b, a) };
    (start, end.saturating_sub(1))
}

static UNVERSIONED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\?\s+(.+)$").expect("static regex"));

/// Paths of `svn status` lines that start with `?`.
pub fn parse_unversioned(status: &str) -> Vec<String> {
    status
        .lines()
        .filter_map(|line| UNVERSIONED_LINE.captures(line.trim_end()))
        .map(|caps| caps[1].to_string())
        .collect()
}

impl SvnClient {
    pub fn new(config: &Config, credentials: Option<Credentials>) -> Self {
        let mut global_args = vec!["--non-interactive".to_string(), "--no-auth-cache".to_string()];
        if let Some(credentials) = credentials {
            if let Some(user) = credentials.username {
                global_args.push("--username".to_string());
                global_args.push(user);
            }
            if let Some(pass) = credentials.password {
                global_args.push("--password".to_string());
                global_args.push(pass);
            }
        }

        SvnClient {
            runner: Runner::new(config),
            paths: PathHelper::new(config),
            global_args,
        }
    }

    fn command(&self, subcommand: &str) -> CommandLine {
        CommandLine::new(&self.runner.config().svn_program)
            .arg(subcommand)
            .args(self.global_args.iter().cloned())
    }

    fn execute(&self, cmd: CommandLine) -> AppResult<CommandResult> {
        let _span = self.runner.config().span().entered();
        self.runner.run_default(&cmd)
    }

    fn execute_output(&self, cmd: CommandLine) -> AppResult<String> {
        let _span = self.runner.config().span().entered();
        self.runner.output(&cmd)
    }

    /// ### svn checkout
    pub fn checkout(&self, url: &str, path: &Path, revision: Option<&Revision>) -> AppResult<()> {
        let mut cmd = self.command("checkout");
        if let Some(rev) = revision {
            cmd = cmd.arg("-r").arg(rev.to_string());
        }
        self.execute(cmd.arg(url).arg(path_arg(path)))?;
        Ok(())
    }

    /// ### svn update
    pub fn update(&self, path: &Path, revision: Option<&Revision>) -> AppResult<()> {
        let mut cmd = self.command("update");
        if let Some(rev) = revision {
            cmd = cmd.arg("-r").arg(rev.to_string());
        }
        self.execute(cmd.arg(path_arg(path)))?;
        Ok(())
    }

    /// ### svn add
    /// 添加新文件到版本控制
    pub fn add(&self, paths: &[&Path]) -> AppResult<()> {
        let cmd = self
            .command("add")
            .args(["--force", "--parents"])
            .args(paths.iter().map(|p| path_arg(p)));
        self.execute(cmd)?;
        Ok(())
    }

    /// ### svn commit
    pub fn commit(&self, paths: &[&Path], message: &str) -> AppResult<()> {
        require_message(message, "commit")?;
        let cmd = self
            .command("commit")
            .arg("-m")
            .arg(message)
            .args(paths.iter().map(|p| path_arg(p)));
        self.execute(cmd)?;
        Ok(())
    }

    /// ### svn resolve
    /// 解决冲突，`accept` 例如 "working"、"theirs-full"
    pub fn resolve(&self, path: &Path, accept: &str) -> AppResult<()> {
        let cmd = self.command("resolve").args(["--accept", accept, "-R"]).arg(path_arg(path));
        self.execute(cmd)?;
        Ok(())
    }

    /// ### svn cleanup
    pub fn cleanup(&self, path: &Path) -> AppResult<()> {
        self.execute(self.command("cleanup").arg(path_arg(path)))?;
        Ok(())
    }

    /// ### svn revert
    /// 递归恢复工作副本的更改
    pub fn revert(&self, path: &Path) -> AppResult<()> {
        self.execute(self.command("revert").arg("-R").arg(path_arg(path)))?;
        Ok(())
    }

    /// ### svn status
    pub fn status(&self, path: &Path) -> AppResult<String> {
        self.execute_output(self.command("status").arg(path_arg(path)))
    }

    /// ### svn propset
    pub fn propset(&self, name: &str, value: &str, path: &Path) -> AppResult<()> {
        self.execute(self.command("propset").arg(name).arg(value).arg(path_arg(path)))?;
        Ok(())
    }

    /// ### svn propset svn:externals
    /// 每个 (source, target) 写成一行 "target source"
    pub fn propset_externals(&self, dir: &Path, externals: &[(&str, &str)]) -> AppResult<()> {
        let config = self.runner.config();
        let lines = externals.iter().map(|(source, target)| format!("{} {}", target, source));
        let file = write_temp_lines(config.temp_dir.as_deref(), "qsu-externals-", lines)?;

        let cmd = self
            .command("propset")
            .args(["svn:externals", "-F"])
            .arg(path_arg(&file))
            .arg(path_arg(dir));
        self.execute(cmd)?;
        Ok(())
    }

    /// ### svn lock
    ///
    /// 已被他人锁定时 svn 打印 "svn: warning" 行，退出码可能是 0 也可能非 0，需要检查输出
    pub fn lock(&self, path: &str, message: &str) -> AppResult<()> {
        require_message(message, "lock")?;
        let cmd = self.command("lock").arg("-m").arg(message).arg(path);
        let run = {
            let _span = self.runner.config().span().entered();
            self.runner.run(&cmd, RunMode::Capture)
        };

        let output = match run {
            Ok(result) => result.combined(),
            Err(AppError::Exec { output, .. }) if has_error_line(&output) => output,
            Err(e) => return Err(e),
        };
        if !has_error_line(&output) {
            return Ok(());
        }

        warn!("svn lock reported an error for {}", path);
        let info = self.info(path, None)?;
        match info.lock {
            Some(lock) => Err(AppError::AlreadyLocked {
                path: path.to_string(),
                owner: lock.owner,
                comment: lock.comment,
                created: lock.created,
            }),
            None => Err(AppError::LockFailed { path: path.to_string(), output }),
        }
    }

    /// ### svn unlock
    pub fn unlock(&self, path: &str, force: bool) -> AppResult<()> {
        let mut cmd = self.command("unlock");
        if force {
            cmd = cmd.arg("--force");
        }
        self.execute(cmd.arg(path))?;
        Ok(())
    }

    /// ### svn move
    pub fn move_path(&self, src: &str, dst: &str, message: &str) -> AppResult<()> {
        require_message(message, "move")?;
        self.execute(self.command("move").arg("-m").arg(message).arg(src).arg(dst))?;
        Ok(())
    }

    /// ### svn copy
    pub fn copy(&self, src: &str, dst: &str, message: Option<&str>) -> AppResult<()> {
        let mut cmd = self.command("copy");
        if let Some(msg) = message {
            cmd = cmd.arg("-m").arg(msg);
        }
        self.execute(cmd.arg(src).arg(dst))?;
        Ok(())
    }

    /// ### svn merge
    pub fn merge(&self, args: &[&str]) -> AppResult<()> {
        self.execute(self.command("merge").args(args.iter().copied()))?;
        Ok(())
    }

    /// ### svn info --xml
    pub fn info(&self, target: &str, revision: Option<&Revision>) -> AppResult<InfoRecord> {
        let mut cmd = self.command("info").arg("--xml");
        if let Some(rev) = revision {
            cmd = cmd.arg("-r").arg(rev.to_string());
        }
        let xml = self.execute_output(cmd.arg(target))?;
        parse_info_xml(&xml)
    }

    /// ### svn log --xml
    /// 区间按传入顺序交给 svn，结果顺序与 svn 输出一致
    pub fn log(&self, target: &str, options: &LogOptions) -> AppResult<Vec<LogEntry>> {
        let mut cmd = self.command("log").arg("--xml");
        if let Some(range) = &options.revisions {
            cmd = cmd.arg("-r").arg(range.to_string());
        }
        if let Some(limit) = options.limit {
            cmd = cmd.arg("-l").arg(limit.to_string());
        }
        if options.verbose {
            cmd = cmd.arg("-v");
        }
        if let Some(pattern) = &options.search {
            cmd = cmd.arg("--search").arg(pattern);
        }
        let xml = self.execute_output(cmd.arg(target))?;
        parse_log_xml(&xml)
    }

    /// 已是工作副本则 update，否则 checkout
    pub fn update_or_checkout(&self, url: &str, path: &Path, revision: Option<&Revision>) -> AppResult<()> {
        if !path.exists() {
            return self.checkout(url, path, revision);
        }
        // 只有 svn 本身报错才说明不是工作副本，解析失败等错误直接返回
        match self.info(&path_arg(path), None) {
            Ok(_) => self.update(path, revision),
            Err(AppError::Exec { .. }) => self.checkout(url, path, revision),
            Err(e) => Err(e),
        }
    }

    /// 删除所有未纳入版本控制的文件
    pub fn remove_not_versioned(&self, path: &Path) -> AppResult<()> {
        let status = self.status(path)?;
        for item in parse_unversioned(&status) {
            self.paths.remove_if_exists(Path::new(&item))?;
        }
        Ok(())
    }

    /// cleanup + revert + 删除未版本控制的文件
    pub fn clear_all(&self, path: &Path) -> AppResult<()> {
        self.cleanup(path)?;
        self.revert(path)?;
        self.remove_not_versioned(path)
    }

    /// 创建分支，目标已存在时报错
    pub fn branch(&self, src: &str, dst: &str, message: &str) -> AppResult<()> {
        require_message(message, "branch")?;
        match self.info(dst, None) {
            Ok(_) => return Err(AppError::BranchExists { destination: dst.to_string() }),
            Err(AppError::Exec { .. }) => {}
            Err(e) => return Err(e),
        }
        self.copy(src, dst, Some(message))
    }

    /// 撤销指定版本引入的修改，不改写历史
    pub fn rollback(&self, path: &Path, revisions: &RevisionRange) -> AppResult<()> {
        let target = path_arg(path);
        match revisions {
            RevisionRange::Single(rev) => {
                let number = self.resolve_revision(&target, rev)?;
                info!("rollback r{} in {}", number, target);
                let change = format!("-{}", number);
                self.merge(&["-c", change.as_str(), target.as_str()])
            }
            RevisionRange::Range(a, b) => {
                let a = self.resolve_revision(&target, a)?;
                let b = self.resolve_revision(&target, b)?;
                let (start, end) = rollback_merge_range(a, b);
                info!("rollback r{}:{} in {}", start, end, target);
                let range = format!("{}:{}", start, end);
                self.merge(&["-r", range.as_str(), target.as_str()])
            }
        }
    }

    fn resolve_revision(&self, target: &str, revision: &Revision) -> AppResult<u64> {
        match revision.as_number() {
            Some(n) => Ok(n),
            None => Ok(self.info(target, Some(revision))?.revision),
        }
    }
}
