//! ### 运行配置
//!
//! 所有 wrapper 在构造时接收一份 `Config`，不存在进程级的全局状态。

use std::{path::PathBuf, sync::Arc};

use encoding_rs::Encoding;

use super::{
    error::{AppError, AppResult},
    platform::{self, Platform},
    process::RunMode,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub platform: Arc<dyn Platform>,
    /// Tried in order after UTF-8 when decoding tool output.
    pub encodings: Vec<&'static Encoding>,
    /// Where exclude lists and externals files are written. System temp dir if `None`.
    pub temp_dir: Option<PathBuf>,
    pub svn_program: String,
    pub git_program: String,
    /// Mode for commands whose output the wrapper does not consume.
    pub run_mode: RunMode,
    /// Name of the tracing span wrappers log under.
    pub label: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            platform: platform::host(),
            encodings: Vec::new(),
            temp_dir: None,
            svn_program: "svn".to_string(),
            git_program: "git".to_string(),
            run_mode: RunMode::Capture,
            label: "quickstartutil".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = platform;
        self
    }

    /// 通过 WHATWG 标签设置后备编码，例如 "gbk"、"shift_jis"
    pub fn with_encoding_labels(mut self, labels: &[&str]) -> AppResult<Self> {
        let mut encodings = Vec::with_capacity(labels.len());
        for label in labels {
            let encoding = Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| AppError::Validation(format!("Unknown encoding label: {}", label)))?;
            encodings.push(encoding);
        }
        self.encodings = encodings;
        Ok(self)
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_svn_program(mut self, program: impl Into<String>) -> Self {
        self.svn_program = program.into();
        self
    }

    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    pub fn with_run_mode(mut self, mode: RunMode) -> Self {
        self.run_mode = mode;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub(crate) fn span(&self) -> tracing::Span {
        tracing::info_span!("qsu", label = %self.label, platform = self.platform.name())
    }
}
