//! ### 执行 GIT 相关操作
//!
//! 当前分支直接读取 .git 下的元数据文件，不调用 git

use std::{fs, path::Path};

use tracing::info;

use super::{
    config::Config,
    error::{AppError, AppResult},
    models::GitHead,
    process::{CommandLine, Runner},
};

#[derive(Debug, Clone)]
pub struct GitClient {
    runner: Runner,
}

fn is_commit_id(s: &str) -> bool {
    (s.len() == 40 || s.len() == 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// 在 packed-refs 中查找引用
fn find_packed_ref(packed: &str, refname: &str) -> Option<String> {
    packed
        .lines()
        .filter(|line| !line.starts_with('#') && !line.starts_with('^'))
        .filter_map(|line| line.split_once(' '))
        .find(|(_, name)| name.trim() == refname)
        .map(|(id, _)| id.to_string())
}

/// 读取 HEAD 及其指向的引用
pub fn read_current_head(repo: &Path) -> AppResult<GitHead> {
    let git_dir = repo.join(".git");
    let head_path = git_dir.join("HEAD");
    let head = fs::read_to_string(&head_path).map_err(|e| AppError::metadata(&head_path, e.to_string()))?;

    let refname = match head.trim().strip_prefix("ref:") {
        Some(name) => name.trim(),
        None if is_commit_id(head.trim()) => return Err(AppError::metadata(&head_path, "detached HEAD")),
        None => return Err(AppError::metadata(&head_path, "expected 'ref: <name>'")),
    };
    if refname.is_empty() || refname.contains("..") {
        return Err(AppError::metadata(&head_path, format!("invalid ref name '{}'", refname)));
    }

    let branch = refname.strip_prefix("refs/heads/").unwrap_or(refname).to_string();
    let ref_path = git_dir.join(refname);

    let revision = match fs::read_to_string(&ref_path) {
        Ok(content) => content.trim().to_string(),
        Err(_) => {
            let packed_path = git_dir.join("packed-refs");
            let packed = fs::read_to_string(&packed_path)
                .map_err(|_| AppError::metadata(&ref_path, "ref file is missing"))?;
            find_packed_ref(&packed, refname)
                .ok_or_else(|| AppError::metadata(&ref_path, "ref not found in packed-refs"))?
        }
    };

    if !is_commit_id(&revision) {
        return Err(AppError::metadata(&ref_path, format!("'{}' is not a commit id", revision)));
    }

    Ok(GitHead { branch, revision })
}

impl GitClient {
    pub fn new(config: &Config) -> Self {
        GitClient { runner: Runner::new(config) }
    }

    fn command(&self) -> CommandLine {
        CommandLine::new(&self.runner.config().git_program)
    }

    fn in_repo(&self, path: &Path) -> CommandLine {
        self.command().arg("-C").arg(path.display().to_string())
    }

    fn execute(&self, cmd: CommandLine) -> AppResult<()> {
        let _span = self.runner.config().span().entered();
        self.runner.run_default(&cmd)?;
        Ok(())
    }

    pub fn current_head(&self, repo: &Path) -> AppResult<GitHead> {
        read_current_head(repo)
    }

    /// ### git clone
    pub fn clone(&self, url: &str, path: &Path, branch: Option<&str>) -> AppResult<()> {
        let mut cmd = self.command().arg("clone");
        if let Some(branch) = branch {
            cmd = cmd.arg("-b").arg(branch);
        }
        self.execute(cmd.arg(url).arg(path.display().to_string()))
    }

    /// 目标不存在时 clone，返回是否执行了 clone
    pub fn clone_if_absent(&self, url: &str, path: &Path, branch: Option<&str>) -> AppResult<bool> {
        if path.exists() {
            return Ok(false);
        }
        self.clone(url, path, branch)?;
        Ok(true)
    }

    /// 获取一个干净的指定分支（可选指定版本）
    pub fn get_clean(&self, url: &str, path: &Path, branch: &str, revision: Option<&str>) -> AppResult<()> {
        if !self.clone_if_absent(url, path, Some(branch))? {
            info!("refreshing {} on {}", path.display(), branch);
            self.execute(self.in_repo(path).args(["reset", "--hard"]))?;
            self.execute(self.in_repo(path).args(["fetch", "origin"]))?;
            self.execute(self.in_repo(path).args(["checkout", branch]))?;
            self.execute(self.in_repo(path).arg("merge").arg(format!("origin/{}", branch)))?;
        }

        if let Some(rev) = revision {
            self.execute(self.in_repo(path).args(["reset", "--hard", rev]))?;
        }
        Ok(())
    }
}
