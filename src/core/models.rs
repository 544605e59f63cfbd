//! 存放 svn / git 返回结果的数据模型
//!

use chrono::{DateTime, FixedOffset};

use super::error::AppResult;

/// 节点类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
    Other(String),
}

impl NodeKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "file" => NodeKind::File,
            "dir" => NodeKind::Dir,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub root: String,
    pub uuid: String,
}

/// 工作副本信息，查询远程 URL 时不存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WcInfo {
    pub wcroot_abspath: Option<String>,
    pub schedule: Option<String>,
    pub depth: Option<String>,
    pub checksum: Option<String>,
}

/// 最后一次提交
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub revision: u64,
    pub author: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockInfo {
    pub token: String,
    pub owner: String,
    pub comment: String,
    /// As reported by svn (ISO 8601).
    pub created: String,
}

impl LockInfo {
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.created).ok()
    }
}

/// Parsed `svn info --xml` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRecord {
    pub kind: NodeKind,
    pub path: String,
    pub revision: u64,
    pub url: String,
    pub relative_url: Option<String>,
    pub repository: RepositoryInfo,
    pub wc_info: Option<WcInfo>,
    pub commit: Option<CommitInfo>,
    pub lock: Option<LockInfo>,
}

impl InfoRecord {
    /// URL with percent-escapes resolved; fails when the escapes are not UTF-8.
    pub fn decoded_url(&self) -> AppResult<String> {
        Ok(urlencoding::decode(&self.url)?.into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub path: String,
    pub kind: NodeKind,
    /// A / M / D / R
    pub action: String,
    pub prop_mods: bool,
    pub text_mods: bool,
    pub copy_from: Option<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub revision: u64,
    pub author: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub message: String,
    pub paths: Vec<ChangedPath>,
}

/// 当前分支及其提交
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHead {
    pub branch: String,
    pub revision: String,
}
