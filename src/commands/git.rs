//! ### git 相关的指令
//!

use std::path::Path;

use crossterm::style::Stylize;

use crate::core::{app::App, error::AppResult};

/// 显示当前分支和提交
pub fn handle_head(app: &App, repo: &Path) -> AppResult<()> {
    let head = app.git().current_head(repo)?;
    app.ui.show_head(&head);
    Ok(())
}

pub fn handle_get_clean(app: &App, url: &str, path: &Path, branch: &str, revision: Option<&str>) -> AppResult<()> {
    app.ui.update_step(&format!("Preparing {} ({})", path.display(), branch));
    app.git().get_clean(url, path, branch, revision)?;
    app.ui.success(&format!("{} is clean on {}", path.display(), branch.green().bold()));
    Ok(())
}
