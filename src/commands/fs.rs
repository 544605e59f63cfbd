//! ### 文件与压缩相关的指令
//!

use std::path::Path;

use crate::core::{app::App, archive, error::AppResult};

pub fn handle_remove(app: &App, path: &Path) -> AppResult<()> {
    app.paths().remove_if_exists(path)?;
    app.ui.success(&format!("Removed {}", path.display()));
    Ok(())
}

pub fn handle_copy(app: &App, src: &Path, dst: &Path, excludes: &[String]) -> AppResult<()> {
    let patterns: Vec<&str> = excludes.iter().map(String::as_str).collect();
    let excludes = if patterns.is_empty() { None } else { Some(patterns.as_slice()) };

    app.ui.update_step(&format!("Copying {}", src.display()));
    app.paths().copy_directory(src, dst, excludes)?;
    app.ui.success(&format!("Copied {} -> {}", src.display(), dst.display()));
    Ok(())
}

pub fn handle_mkdir(app: &App, path: &Path, strict: bool) -> AppResult<()> {
    app.paths().make_directory_recursive(path, strict)?;
    app.ui.success(&format!("{} ready", path.display()));
    Ok(())
}

pub fn handle_zip(app: &App, src: &Path, dst: &Path) -> AppResult<()> {
    app.ui.update_step(&format!("Compressing {}", src.display()));
    archive::zip_path(src, dst)?;
    app.ui.success(&format!("Created {}", dst.display()));
    Ok(())
}

pub fn handle_unzip(app: &App, src: &Path, dst: &Path) -> AppResult<()> {
    app.ui.update_step(&format!("Extracting {}", src.display()));
    archive::unzip(src, dst)?;
    app.ui.success(&format!("Extracted to {}", dst.display()));
    Ok(())
}
