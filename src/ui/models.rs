//! UI 相关的数据模型

use std::{io, time::Duration};

use crossterm::execute;
use indicatif::{ProgressBar, ProgressStyle};

pub struct SpinnerInfo {
    pub pb: ProgressBar,
}

impl SpinnerInfo {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        let frames = ["[=   ]","[==  ]","[=== ]","[ ===]","[  ==]","[   =]","[    ]","[   =]","[  ==]","[ ===]","[====]","[=== ]","[==  ]","[=   ]", "[    ]","    "];

        // 模板是常量，失败时退回默认样式
        let style = ProgressStyle::default_spinner()
            .tick_strings(&frames)
            .template("{spinner:.blue.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);

        pb.enable_steady_tick(Duration::from_millis(50));
        SpinnerInfo { pb }
    }
}

/// 隐藏光标，drop 时恢复
pub struct CursorGuard;

impl CursorGuard {
    pub fn new() -> Self {
        execute!(io::stdout(), crossterm::cursor::Hide).ok();
        execute!(io::stderr(), crossterm::cursor::Hide).ok();
        CursorGuard
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        execute!(io::stdout(), crossterm::cursor::Show).ok();
        execute!(io::stderr(), crossterm::cursor::Show).ok();
    }
}
