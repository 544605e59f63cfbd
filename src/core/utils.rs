//! ### 工具函数
//!

use std::{fmt::Display, io::Write, path::Path};

use encoding_rs::Encoding;
use tempfile::TempPath;

use super::error::{AppError, AppResult};

/// A revision as accepted by `svn -r`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Number(u64),
    Head,
    Base,
    Committed,
    Prev,
    /// Anything else, passed through untouched (e.g. `{2024-01-01}`).
    Other(String),
}

impl Revision {
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Revision::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Number(n) => write!(f, "{}", n),
            Revision::Head => write!(f, "HEAD"),
            Revision::Base => write!(f, "BASE"),
            Revision::Committed => write!(f, "COMMITTED"),
            Revision::Prev => write!(f, "PREV"),
            Revision::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for Revision {
    fn from(n: u64) -> Self {
        Revision::Number(n)
    }
}

/// 解析版本号参数，支持 "100"、"r100" 以及 HEAD/BASE/COMMITTED/PREV
pub fn parse_revision_arg(input: &str) -> AppResult<Revision> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AppError::RevisionParse(input.to_string()));
    }

    match s.to_ascii_uppercase().as_str() {
        "HEAD" => return Ok(Revision::Head),
        "BASE" => return Ok(Revision::Base),
        "COMMITTED" => return Ok(Revision::Committed),
        "PREV" => return Ok(Revision::Prev),
        _ => {}
    }

    let digits = s.trim_start_matches(['r', 'R']);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return digits
            .parse()
            .map(Revision::Number)
            .map_err(|_| AppError::RevisionParse(input.to_string()));
    }

    Ok(Revision::Other(s.to_string()))
}

/// One revision or an inclusive pair, in the caller's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionRange {
    Single(Revision),
    Range(Revision, Revision),
}

impl Display for RevisionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevisionRange::Single(r) => write!(f, "{}", r),
            RevisionRange::Range(start, end) => write!(f, "{}:{}", start, end),
        }
    }
}

impl From<Revision> for RevisionRange {
    fn from(r: Revision) -> Self {
        RevisionRange::Single(r)
    }
}

/// "10" / "HEAD" / "10:5"
pub fn parse_revision_range(input: &str) -> AppResult<RevisionRange> {
    match input.split_once(':') {
        Some((start, end)) => Ok(RevisionRange::Range(parse_revision_arg(start)?, parse_revision_arg(end)?)),
        None => Ok(RevisionRange::Single(parse_revision_arg(input)?)),
    }
}

/// 解码命令输出：先 UTF-8，再依次尝试配置的编码，最后交给 chardetng 猜测
pub fn decode_output(input: &[u8], fallbacks: &[&'static Encoding]) -> AppResult<String> {
    if let Ok(s) = std::str::from_utf8(input) {
        return Ok(s.trim().to_string());
    }

    let mut tried = vec![encoding_rs::UTF_8.name().to_string()];
    for encoding in fallbacks {
        let (decoded, had_errors) = encoding.decode_without_bom_handling(input);
        if !had_errors {
            return Ok(decoded.trim().to_string());
        }
        tried.push(encoding.name().to_string());
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(input, true);
    let guess = detector.guess(None, true);
    let (decoded, had_errors) = guess.decode_without_bom_handling(input);
    if had_errors {
        tried.push(guess.name().to_string());
        return Err(AppError::Encoding { tried });
    }

    Ok(decoded.trim().to_string())
}

/// Write `lines` to a fresh temporary file. The file is deleted when the
/// returned path is dropped, whatever happens in between.
pub fn write_temp_lines<I, S>(dir: Option<&Path>, prefix: &str, lines: I) -> AppResult<TempPath>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix).suffix(".txt");
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };

    for line in lines {
        writeln!(file, "{}", line.as_ref())?;
    }
    file.flush()?;

    // 关闭句柄，xcopy / svn 在 Windows 上才能读取
    Ok(file.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_keywords() {
        assert_eq!(parse_revision_arg("100").unwrap(), Revision::Number(100));
        assert_eq!(parse_revision_arg(" r42 ").unwrap(), Revision::Number(42));
        assert_eq!(parse_revision_arg("head").unwrap(), Revision::Head);
        assert_eq!(parse_revision_arg("PREV").unwrap(), Revision::Prev);
        assert_eq!(
            parse_revision_arg("{2024-01-01}").unwrap(),
            Revision::Other("{2024-01-01}".to_string())
        );
        assert!(parse_revision_arg("  ").is_err());
    }

    #[test]
    fn range_keeps_caller_order() {
        let range = parse_revision_range("10:5").unwrap();
        assert_eq!(range, RevisionRange::Range(Revision::Number(10), Revision::Number(5)));
        assert_eq!(range.to_string(), "10:5");
        assert_eq!(parse_revision_range("BASE").unwrap().to_string(), "BASE");
    }

    #[test]
    fn decodes_with_configured_fallback() {
        // "中文" in GBK
        let gbk = [0xD6, 0xD0, 0xCE, 0xC4];
        let text = decode_output(&gbk, &[encoding_rs::GBK]).unwrap();
        assert_eq!(text, "中文");
    }

    #[test]
    fn utf8_is_trimmed() {
        assert_eq!(decode_output(b"  r12 \n", &[]).unwrap(), "r12");
    }

    #[test]
    fn temp_lines_are_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_lines(Some(dir.path()), "lines-", ["a", "b"]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
        let kept = path.to_path_buf();
        drop(path);
        assert!(!kept.exists());
    }
}
