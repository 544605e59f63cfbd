//! ### 路径相关操作
//!
//! 删除、复制、创建目录都交给平台命令执行

use std::path::{Path, PathBuf};

use tracing::info;

use super::{
    config::Config,
    error::{AppError, AppResult, PathErrorKind},
    process::Runner,
    utils::write_temp_lines,
};

pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

#[derive(Debug, Clone)]
pub struct PathHelper {
    runner: Runner,
}

impl PathHelper {
    pub fn new(config: &Config) -> Self {
        PathHelper { runner: Runner::new(config) }
    }

    /// 强制删除文件或目录，不存在时什么也不做
    pub fn remove_if_exists(&self, path: &Path) -> AppResult<()> {
        let _span = self.runner.config().span().entered();
        if !path_exists(path) {
            return Ok(());
        }

        let platform = &self.runner.config().platform;
        let cmd = if is_directory(path) {
            platform.remove_dir_command(path)
        } else if is_file(path) {
            platform.remove_file_command(path)
        } else {
            return Err(AppError::path(path, PathErrorKind::UnsupportedType));
        };

        self.runner.run_default(&cmd)?;
        Ok(())
    }

    /// 复制目录内容到目标目录，目标不存在时自动创建
    ///
    /// `excludes` 中的每个模式写入临时文件交给复制工具，调用结束后临时文件一定会被删除
    pub fn copy_directory(&self, src: &Path, dst: &Path, excludes: Option<&[&str]>) -> AppResult<()> {
        let _span = self.runner.config().span().entered();
        if !is_directory(src) {
            return Err(AppError::path(src, PathErrorKind::NotFound));
        }

        let config = self.runner.config();
        let excludes_file = match excludes {
            Some(patterns) => Some(write_temp_lines(config.temp_dir.as_deref(), "qsu-excludes-", patterns)?),
            None => None,
        };

        let cmd = config.platform.copy_dir_command(src, dst, excludes_file.as_deref());
        self.runner.run_default(&cmd)?;
        Ok(())
    }

    /// 递归创建目录；`strict` 时已存在会报错
    pub fn make_directory_recursive(&self, path: &Path, strict: bool) -> AppResult<()> {
        let _span = self.runner.config().span().entered();
        if path_exists(path) {
            if strict {
                return Err(AppError::path(path, PathErrorKind::AlreadyExists));
            }
            return Ok(());
        }

        let cmd = self.runner.config().platform.make_dir_command(path);
        self.runner.run_default(&cmd)?;
        Ok(())
    }
}

/// Switches the process working directory until dropped.
#[derive(Debug)]
pub struct ChangeDirectory {
    old_cwd: PathBuf,
}

impl ChangeDirectory {
    pub fn enter(target: &Path) -> AppResult<Self> {
        let old_cwd = std::env::current_dir()?;
        info!(">>> cd {}", target.display());
        std::env::set_current_dir(target)?;
        Ok(ChangeDirectory { old_cwd })
    }
}

impl Drop for ChangeDirectory {
    fn drop(&mut self) {
        info!(">>> cd {}", self.old_cwd.display());
        std::env::set_current_dir(&self.old_cwd).ok();
    }
}
