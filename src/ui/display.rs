use std::{cell::RefCell, io};

use chrono::{DateTime, FixedOffset, Local};
use comfy_table::{Cell, ContentArrangement, Table, presets};
use crossterm::{cursor, execute, style::{self, SetForegroundColor, Stylize}};
use dialoguer::{Select, theme};
use unicode_width::UnicodeWidthStr;

use crate::{core::{error::{AppError, AppResult}, models::{GitHead, InfoRecord, LogEntry}}, ui::models::{CursorGuard, SpinnerInfo}};

/// 日志消息在表格中最多显示的宽度
const MESSAGE_WIDTH: usize = 72;

pub struct AppUI {
    spinner: RefCell<Option<SpinnerInfo>>,
    dialoguer_color_theme: theme::ColorfulTheme,
    _cursor_guard: CursorGuard,
}

/// 格式化相对时间显示
pub fn format_relative_time(dt: &DateTime<FixedOffset>) -> String {
    let dt = dt.with_timezone(&Local);
    let secs = Local::now().signed_duration_since(dt).num_seconds();

    if secs < 60 {
        "just now".to_string()
    }
    else if secs < 3600 {
        format!("{} mins ago", secs / 60)
    }
    else if secs < 86400 {
        format!("{} hours ago", secs / 3600)
    }
    else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// 取第一行并按显示宽度截断
fn first_line_truncated(message: &str, width: usize) -> String {
    let line = message.lines().next().unwrap_or("");
    if line.width() <= width {
        return line.to_string();
    }
    let mut out = String::new();
    for ch in line.chars() {
        if out.width() + 2 > width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

impl AppUI {
    pub fn new() -> Self {
        let mut color_theme = dialoguer::theme::ColorfulTheme::default();
        color_theme.success_prefix = dialoguer::console::style(String::from("[ OK ]")).green().bold().bright();
        color_theme.error_prefix = dialoguer::console::style(String::from("[ERR!]")).red().bright().bold();
        color_theme.prompt_prefix = dialoguer::console::style(String::from("[INFO]")).blue().bright().bold();
        color_theme.active_item_style = dialoguer::console::Style::new().for_stderr().green();
        color_theme.success_suffix = dialoguer::console::style(String::new());
        color_theme.prompt_style = dialoguer::console::Style::new().for_stderr();
        color_theme.prompt_suffix = dialoguer::console::style(String::new()).for_stderr().black().bright();
        color_theme.active_item_prefix = dialoguer::console::style(">".to_string()).for_stderr().green();

        AppUI {
            spinner: RefCell::new(None),
            dialoguer_color_theme: color_theme,
            _cursor_guard: CursorGuard::new(),
        }
    }

    /// 打印普通信息
    pub fn info(&self, msg: &str) {
        self.print_safe(format!("{} {}", "[INFO]".blue().bold(), msg));
    }

    /// 打印警告信息
    pub fn warn(&self, msg: &str) {
        self.print_safe(format!("{} {}", "[WARN]".dark_yellow().bold(), msg.yellow()));
    }

    /// 打印成功信息
    pub fn success(&self, msg: &str) {
        self.finish_step();
        self.print_safe(format!("{} {}", "[ OK ]".green().bold(), msg));
    }

    /// 打印错误 (Red cross)
    pub fn error(&self, msg: &str) {
        self.finish_step();

        let style_prefix = format!("{}", SetForegroundColor(style::Color::Red));
        let reset_all = format!("{}", style::Attribute::Reset);
        let reset_fg = format!("{}", SetForegroundColor(style::Color::Reset));
        let restore_patch = format!("{}{}", reset_all, style_prefix);
        let fixed_msg = msg.replace(&reset_all, &restore_patch).replace(&reset_fg, &restore_patch);

        self.print_safe(format!("{} {}{}{}", "[ERR!]".red().bold(), style_prefix, fixed_msg, reset_all));
    }

    /// 更新 spinner
    pub fn update_step(&self, msg: &str) {
        if let Some(pb_info) = self.spinner.borrow().as_ref() {
            pb_info.pb.set_message(msg.to_string());
            return;
        }
        self.start_step(msg);
    }

    /// info 显示
    pub fn show_info(&self, info: &InfoRecord) {
        let mut table = self.create_clean_table();
        let mut row = |key: &str, value: String| {
            table.add_row([Cell::new(key).fg(comfy_table::Color::DarkGrey), Cell::new(value)]);
        };

        row("Path", info.path.clone());
        row("URL", info.decoded_url().unwrap_or_else(|_| info.url.clone()));
        if let Some(rel) = &info.relative_url {
            row("Relative URL", rel.clone());
        }
        row("Repository Root", info.repository.root.clone());
        row("Repository UUID", info.repository.uuid.clone());
        row("Revision", info.revision.to_string());
        row("Node Kind", format!("{:?}", info.kind).to_lowercase());
        if let Some(wc) = &info.wc_info {
            if let Some(root) = &wc.wcroot_abspath {
                row("Working Copy Root", root.clone());
            }
            if let Some(schedule) = &wc.schedule {
                row("Schedule", schedule.clone());
            }
        }
        if let Some(commit) = &info.commit {
            row("Last Changed Rev", commit.revision.to_string());
            row("Last Changed Author", commit.author.clone().unwrap_or_default());
            row("Last Changed Date", commit.date.as_ref().map(format_relative_time).unwrap_or_default());
        }
        if let Some(lock) = &info.lock {
            row("Lock Owner", lock.owner.clone());
            row("Lock Comment", lock.comment.clone());
            row("Lock Created", lock.created.clone());
        }

        self.print_safe(format!("{}", table));
    }

    /// log 显示
    pub fn show_log(&self, log_entries: &[LogEntry], verbose: bool) {
        let mut table = self.create_clean_table();

        let hander_cell1 = Cell::new("  REV").fg(comfy_table::Color::DarkGrey).add_attribute(comfy_table::Attribute::Bold);
        let hander_cell2 = Cell::new("AUTHOR").fg(comfy_table::Color::DarkGrey).add_attribute(comfy_table::Attribute::Bold);
        let hander_cell3 = Cell::new("DATE").fg(comfy_table::Color::DarkGrey).add_attribute(comfy_table::Attribute::Bold);
        let hander_cell4 = Cell::new("MESSAGE").fg(comfy_table::Color::DarkGrey).add_attribute(comfy_table::Attribute::Bold);

        table.set_header([hander_cell1, hander_cell2, hander_cell3, hander_cell4]);

        for column in table.column_iter_mut() {
            column.set_padding((0, 3));
        }

        for log in log_entries {
            let c_rev = Cell::new(format!("r{}", log.revision)).fg(comfy_table::Color::Yellow);
            let c_author = Cell::new(log.author.clone().unwrap_or_else(|| "(no author)".to_string()));
            // 时间 灰色
            let c_date = Cell::new(log.date.as_ref().map(format_relative_time).unwrap_or_default())
                .fg(comfy_table::Color::DarkGrey);
            let c_msg = Cell::new(first_line_truncated(&log.message, MESSAGE_WIDTH));

            table.add_row([c_rev, c_author, c_date, c_msg]);

            if verbose {
                for path in &log.paths {
                    let c_path = Cell::new(format!("{} {}", path.action, path.path)).fg(comfy_table::Color::DarkCyan);
                    table.add_row([Cell::new(""), Cell::new(""), Cell::new(""), c_path]);
                }
            }
        }

        self.print_safe(format!("{}", table));
    }

    /// git 当前分支显示
    pub fn show_head(&self, head: &GitHead) {
        self.print_safe(format!("{} {}", head.branch.as_str().yellow().bold(), head.revision.as_str().dark_grey()));
    }

    /// 选择 yes/no
    pub fn selector_yes_or_no(&self, prompt: &str) -> AppResult<bool> {
        let items = vec!["Yes", "No"];
        let result = if let Some(pb_info) = &self.spinner.borrow().as_ref() {
            pb_info.pb.suspend(|| self.get_selector_result(prompt, items))?
        } else {
            self.get_selector_result(prompt, items)?
        };
        Ok(result == 0)
    }

    /// 输入提交信息，不会返回空字符串
    pub fn input_commit_message(&self) -> AppResult<String> {
        let msg = self.input("Input commit message:")?;
        if msg.trim().is_empty() {
            return Err(AppError::OperationCancelled);
        }
        Ok(msg)
    }

    /// 开启一个 Input，返回输入结果，可以为空 String
    pub fn input(&self, prompt: &str) -> AppResult<String> {
        if let Some(pb_info) = &self.spinner.borrow().as_ref() {
            return pb_info.pb.suspend(|| self.get_input_result(prompt));
        }
        self.get_input_result(prompt)
    }

    /// 开启一个 Input
    fn get_input_result(&self, prompt: &str) -> AppResult<String> {
        let mut stderr_io = io::stderr();
        execute!(stderr_io, cursor::Show).ok();

        let result = dialoguer::Input::<String>::with_theme(&self.dialoguer_color_theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AppError::Validation(e.to_string()));

        execute!(stderr_io, cursor::Hide).ok();
        result
    }

    /// 开启一个 selector
    fn get_selector_result(&self, prompt: &str, items: Vec<&str>) -> AppResult<usize> {
        println!("{} {}", "[INFO]".blue().bold(), prompt);
        let result = Select::with_theme(&self.dialoguer_color_theme)
            .default(0)
            .items(&items)
            .interact()
            .map_err(|e| AppError::Validation(e.to_string()));

        if let Ok(index) = &result {
            println!("{} Choose: {}", "[ OK ]".green().bold(), items[*index]);
        }
        execute!(io::stderr(), cursor::Hide).ok();

        result
    }

    /// 开启一个 spinner
    fn start_step(&self, msg: &str) {
        let has_spinner = self.spinner.borrow().is_some();
        if has_spinner { self.finish_step(); }

        let spinner_info = SpinnerInfo::new();
        spinner_info.pb.set_message(msg.to_string());
        *self.spinner.borrow_mut() = Some(spinner_info);
    }

    /// 结束 spinner
    pub fn finish_step(&self) {
        if let Some(pb_info) = self.spinner.borrow_mut().take() {
            pb_info.pb.finish_and_clear();
        }
    }

    fn print_safe(&self, msg: String) {
        if let Some(pb_info) = &self.spinner.borrow().as_ref() {
            pb_info.pb.suspend(|| println!("{}", msg));
        } else {
            println!("{}", msg);
        }
    }

    /// 创建一个无边框且动态宽度的表格
    fn create_clean_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING) // 无边框
            .set_content_arrangement(ContentArrangement::Dynamic); // 动态宽度
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_display_width() {
        assert_eq!(first_line_truncated("short\nsecond line", 20), "short");
        let long = "x".repeat(30);
        let cut = first_line_truncated(&long, 10);
        assert!(cut.ends_with('…'));
        assert!(cut.width() <= 10);
    }
}
