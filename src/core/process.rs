//! ### 执行外部命令
//!
//! 同步执行，失败时返回带退出码和输出的 `AppError::Exec`

use std::{
    fmt,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use tracing::{debug, info};

use super::{
    config::Config,
    error::{AppError, AppResult},
    utils::decode_output,
};

/// Whether the child shares our console or has its output captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Inherit,
    Capture,
}

/// A program plus its arguments, rendered as one line for logs and errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        CommandLine { program: program.into(), args: Vec::new(), cwd: None }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Normalized exit code.
    pub code: i32,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// stdout followed by stderr, the way a merged console would show them.
    pub fn combined(&self) -> String {
        [self.stdout.as_deref(), self.stderr.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(unix)]
fn raw_status(status: &ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.into_raw()
}

#[cfg(not(unix))]
fn raw_status(status: &ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: &Config) -> Self {
        Runner { config: config.clone() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run with the configured default mode.
    pub fn run_default(&self, cmd: &CommandLine) -> AppResult<CommandResult> {
        self.run(cmd, self.config.run_mode)
    }

    pub fn run(&self, cmd: &CommandLine, mode: RunMode) -> AppResult<CommandResult> {
        info!(">>> {}", cmd);
        let mut command = cmd.to_command();

        let result = match mode {
            RunMode::Inherit => {
                let status = command.status()?;
                CommandResult { code: self.exit_code(&status), stdout: None, stderr: None }
            }
            RunMode::Capture => {
                let output = command.stdin(Stdio::null()).output()?;
                let stdout = decode_output(&output.stdout, &self.config.encodings)?;
                let stderr = decode_output(&output.stderr, &self.config.encodings)?;
                if !stdout.is_empty() {
                    debug!(target: "quickstart_util::output", "{}", stdout);
                }
                if !stderr.is_empty() {
                    debug!(target: "quickstart_util::output", "{}", stderr);
                }
                CommandResult { code: self.exit_code(&output.status), stdout: Some(stdout), stderr: Some(stderr) }
            }
        };

        if !result.success() {
            return Err(AppError::Exec {
                command: cmd.to_string(),
                code: result.code,
                output: result.combined(),
            });
        }

        Ok(result)
    }

    /// Capture and return stdout.
    pub fn output(&self, cmd: &CommandLine) -> AppResult<String> {
        let result = self.run(cmd, RunMode::Capture)?;
        Ok(result.stdout.unwrap_or_default())
    }

    fn exit_code(&self, status: &ExitStatus) -> i32 {
        if status.success() {
            return 0;
        }
        let code = self.config.platform.normalize_exit_code(raw_status(status));
        // 被信号终止时高位为 0，仍然要报告失败
        if code == 0 { -1 } else { code }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::platform::PosixShell;

    fn runner() -> Runner {
        Runner::new(&Config::new().with_platform(Arc::new(PosixShell)))
    }

    #[test]
    fn captures_stdout() {
        let out = runner().output(&CommandLine::new("sh").args(["-c", "echo hello"])).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn failure_reports_shifted_code_and_output() {
        let cmd = CommandLine::new("sh").args(["-c", "echo boom >&2; exit 3"]);
        let err = runner().run(&cmd, RunMode::Capture).unwrap_err();
        match err {
            AppError::Exec { command, code, output } => {
                assert_eq!(code, 3);
                assert_eq!(output, "boom");
                assert!(command.starts_with("sh -c"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inherit_mode_reports_code_too() {
        let cmd = CommandLine::new("sh").args(["-c", "exit 7"]);
        let err = runner().run(&cmd, RunMode::Inherit).unwrap_err();
        assert_eq!(err.exit_code(), Some(7));
    }

    #[test]
    fn missing_program_is_io_error() {
        let err = runner().output(&CommandLine::new("qsu-definitely-not-installed")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = runner().output(&CommandLine::new("pwd").current_dir(dir.path())).unwrap();
        assert_eq!(
            std::fs::canonicalize(out).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }
}
