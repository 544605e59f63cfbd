use std::{fmt, path::PathBuf};

/// 路径错误的具体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorKind {
    NotFound,
    AlreadyExists,
    /// Exists, but is neither a regular file nor a directory.
    UnsupportedType,
}

impl fmt::Display for PathErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathErrorKind::NotFound => write!(f, "path does not exist"),
            PathErrorKind::AlreadyExists => write!(f, "path already exists"),
            PathErrorKind::UnsupportedType => write!(f, "not a valid file or directory path"),
        }
    }
}

/// The error type for this library.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An I/O error occurred (including failing to spawn a tool).
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    /// An external command ran to completion with a non-zero exit code.
    #[error("Command failed({code}): {command}")]
    Exec {
        command: String,
        code: i32,
        output: String,
    },

    #[error("Path error: '{}' {kind}", path.display())]
    Path { path: PathBuf, kind: PathErrorKind },

    /// commit / lock / move / branch 需要提交信息
    #[error("A message is required for svn {operation}")]
    MessageRequired { operation: &'static str },

    #[error("'{path}' is already locked by '{owner}' since {created}: {comment}")]
    AlreadyLocked {
        path: String,
        owner: String,
        comment: String,
        created: String,
    },

    /// svn reported a lock problem but the path carries no lock afterwards.
    #[error("Failed to lock '{path}': {output}")]
    LockFailed { path: String, output: String },

    #[error("Branch destination already exists: {destination}")]
    BranchExists { destination: String },

    #[error("Malformed git metadata '{}': {reason}", path.display())]
    MetadataParse { path: PathBuf, reason: String },

    /// Output could not be decoded with UTF-8 or any fallback encoding.
    #[error("Undecodable output (tried {})", tried.join(", "))]
    Encoding { tried: Vec<String> },

    #[error("XML Parsing Error: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The XML parsed but lacks an element or attribute we rely on.
    #[error("Unexpected XML: {0}")]
    XmlShape(String),

    #[error("Failed to parse revision: {0}")]
    RevisionParse(String),

    #[error("Archive Error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Archive entry escapes the destination: {0}")]
    InvalidArchiveEntry(String),

    #[error("URL/Path Decoding Error: {0}")]
    UrlDecode(#[from] std::string::FromUtf8Error),

    #[error("Error: {0}")]
    Validation(String),

    #[error("Operation cancelled")]
    OperationCancelled,
}

impl AppError {
    pub fn path(path: impl Into<PathBuf>, kind: PathErrorKind) -> Self {
        AppError::Path { path: path.into(), kind }
    }

    pub fn metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AppError::MetadataParse { path: path.into(), reason: reason.into() }
    }

    /// Exit code of a failed command, if this is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            AppError::Exec { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::Io(err.into())
    }
}

// We will also define a uniform Result type for our application.
pub type AppResult<T> = Result<T, AppError>;
