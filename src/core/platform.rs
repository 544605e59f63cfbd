//! ### 平台相关的命令语法
//!
//! 每个平台一个实现，在构造 `Config` 时选定，之后不再分支判断。

use std::{fmt::Debug, path::Path, sync::Arc};

use crate::core::process::CommandLine;

/// OS-specific command syntax and exit-code convention.
pub trait Platform: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Turn the raw status reported by the OS into the exit code we report.
    fn normalize_exit_code(&self, raw: i32) -> i32;

    fn remove_dir_command(&self, path: &Path) -> CommandLine;

    fn remove_file_command(&self, path: &Path) -> CommandLine;

    /// Must create every missing intermediate directory.
    fn make_dir_command(&self, path: &Path) -> CommandLine;

    /// Copy the contents of `src` into `dst`, creating `dst` if needed.
    /// `excludes_file` holds one pattern per line.
    fn copy_dir_command(&self, src: &Path, dst: &Path, excludes_file: Option<&Path>) -> CommandLine;
}

/// `cmd.exe` builtins and `xcopy`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsShell;

impl Platform for WindowsShell {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn normalize_exit_code(&self, raw: i32) -> i32 {
        raw
    }

    fn remove_dir_command(&self, path: &Path) -> CommandLine {
        CommandLine::new("cmd").args(["/C", "rd", "/s/q"]).arg(path.display().to_string())
    }

    fn remove_file_command(&self, path: &Path) -> CommandLine {
        CommandLine::new("cmd").args(["/C", "del", "/f/q"]).arg(path.display().to_string())
    }

    fn make_dir_command(&self, path: &Path) -> CommandLine {
        // cmd 的 mkdir 默认会创建中间目录
        CommandLine::new("cmd").args(["/C", "mkdir"]).arg(path.display().to_string())
    }

    fn copy_dir_command(&self, src: &Path, dst: &Path, excludes_file: Option<&Path>) -> CommandLine {
        let mut flags = String::from("/r/i/c/k/h/e/q/y");
        if let Some(file) = excludes_file {
            flags.push_str(&format!("/exclude:{}", file.display()));
        }
        CommandLine::new("xcopy")
            .arg(format!("{}\\*", src.display()))
            .arg(dst.display().to_string())
            .arg(flags)
    }
}

/// `rm`, `mkdir -p` and a `tar` pipeline through `sh`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixShell;

impl Platform for PosixShell {
    fn name(&self) -> &'static str {
        "posix"
    }

    /// The raw value is a wait status; the exit code lives in the high byte.
    fn normalize_exit_code(&self, raw: i32) -> i32 {
        raw >> 8
    }

    fn remove_dir_command(&self, path: &Path) -> CommandLine {
        CommandLine::new("rm").arg("-rf").arg(path.display().to_string())
    }

    fn remove_file_command(&self, path: &Path) -> CommandLine {
        CommandLine::new("rm").arg("-f").arg(path.display().to_string())
    }

    fn make_dir_command(&self, path: &Path) -> CommandLine {
        CommandLine::new("mkdir").arg("-p").arg(path.display().to_string())
    }

    fn copy_dir_command(&self, src: &Path, dst: &Path, excludes_file: Option<&Path>) -> CommandLine {
        let exclude = match excludes_file {
            Some(file) => format!(" -X {}", sh_quote(&file.display().to_string())),
            None => String::new(),
        };
        let dst = sh_quote(&dst.display().to_string());
        let script = format!(
            "mkdir -p {dst} && tar -C {src}{exclude} -cf - . | tar -C {dst} -xf -",
            src = sh_quote(&src.display().to_string()),
        );
        CommandLine::new("sh").arg("-c").arg(script)
    }
}

fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// The capability for the platform this binary was built for.
pub fn host() -> Arc<dyn Platform> {
    if cfg!(windows) {
        Arc::new(WindowsShell)
    } else {
        Arc::new(PosixShell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posix_code_is_high_byte_of_wait_status() {
        assert_eq!(PosixShell.normalize_exit_code(3 << 8), 3);
        assert_eq!(PosixShell.normalize_exit_code(1 << 8), 1);
        assert_eq!(PosixShell.normalize_exit_code(0), 0);
    }

    #[test]
    fn windows_code_is_passed_through() {
        assert_eq!(WindowsShell.normalize_exit_code(3), 3);
        assert_eq!(WindowsShell.normalize_exit_code(256), 256);
    }

    #[test]
    fn xcopy_carries_exclude_file() {
        let cmd = WindowsShell.copy_dir_command(Path::new("a"), Path::new("b"), Some(Path::new("x.txt")));
        assert_eq!(cmd.to_string(), "xcopy a\\* b /r/i/c/k/h/e/q/y/exclude:x.txt");
    }

    #[test]
    fn tar_pipeline_quotes_paths() {
        let cmd = PosixShell.copy_dir_command(Path::new("it's"), Path::new("out"), None);
        assert_eq!(cmd.program(), "sh");
        assert_eq!(
            cmd.arguments()[1],
            r"mkdir -p 'out' && tar -C 'it'\''s' -cf - . | tar -C 'out' -xf -"
        );
    }
}
