//! ### 解析 svn --xml 输出
//!

use chrono::DateTime;
use roxmltree::Node;

use super::{
    error::{AppError, AppResult},
    models::{ChangedPath, CommitInfo, InfoRecord, LockInfo, LogEntry, NodeKind, RepositoryInfo, WcInfo},
};

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text(node: Node, tag: &str) -> Option<String> {
    child(node, tag).map(|n| n.text().unwrap_or("").to_string())
}

fn required_attr<'a>(node: Node<'a, '_>, name: &str) -> AppResult<&'a str> {
    node.attribute(name)
        .ok_or_else(|| AppError::XmlShape(format!("<{}> without '{}'", node.tag_name().name(), name)))
}

fn parse_u64(value: &str, what: &str) -> AppResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::XmlShape(format!("{} is not a number: {}", what, value)))
}

fn parse_date(node: Node) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    child_text(node, "date").and_then(|d| DateTime::parse_from_rfc3339(d.trim()).ok())
}

/// 解析 `svn info --xml` 的第一个 entry
pub fn parse_info_xml(xml: &str) -> AppResult<InfoRecord> {
    let doc = roxmltree::Document::parse(xml.trim())?;
    let entry = doc
        .descendants()
        .find(|n| n.has_tag_name("entry"))
        .ok_or_else(|| AppError::XmlShape("no <entry> in svn info output".to_string()))?;

    let repository = child(entry, "repository")
        .map(|repo| RepositoryInfo {
            root: child_text(repo, "root").unwrap_or_default(),
            uuid: child_text(repo, "uuid").unwrap_or_default(),
        })
        .ok_or_else(|| AppError::XmlShape("no <repository> in svn info output".to_string()))?;

    let wc_info = child(entry, "wc-info").map(|wc| WcInfo {
        wcroot_abspath: child_text(wc, "wcroot-abspath"),
        schedule: child_text(wc, "schedule"),
        depth: child_text(wc, "depth"),
        checksum: child_text(wc, "checksum"),
    });

    let commit = match child(entry, "commit") {
        Some(node) => Some(CommitInfo {
            revision: parse_u64(required_attr(node, "revision")?, "commit revision")?,
            author: child_text(node, "author"),
            date: parse_date(node),
        }),
        None => None,
    };

    let lock = child(entry, "lock").map(|node| LockInfo {
        token: child_text(node, "token").unwrap_or_default(),
        owner: child_text(node, "owner").unwrap_or_default(),
        comment: child_text(node, "comment").unwrap_or_default(),
        created: child_text(node, "created").unwrap_or_default(),
    });

    Ok(InfoRecord {
        kind: NodeKind::parse(required_attr(entry, "kind")?),
        path: required_attr(entry, "path")?.to_string(),
        revision: parse_u64(required_attr(entry, "revision")?, "entry revision")?,
        url: child_text(entry, "url").unwrap_or_default(),
        relative_url: child_text(entry, "relative-url"),
        repository,
        wc_info,
        commit,
        lock,
    })
}

/// 解析 `svn log --xml`，保持 svn 输出的顺序
///
/// `-g` 产生的嵌套 logentry 会被忽略
pub fn parse_log_xml(xml: &str) -> AppResult<Vec<LogEntry>> {
    let doc = roxmltree::Document::parse(xml.trim())?;
    let mut entries = Vec::new();

    for entry in doc.root_element().children().filter(|n| n.has_tag_name("logentry")) {
        let mut paths = Vec::new();
        if let Some(paths_node) = child(entry, "paths") {
            for path in paths_node.children().filter(|n| n.has_tag_name("path")) {
                let copy_from = match (path.attribute("copyfrom-path"), path.attribute("copyfrom-rev")) {
                    (Some(from), Some(rev)) => Some((from.to_string(), parse_u64(rev, "copyfrom-rev")?)),
                    _ => None,
                };
                paths.push(ChangedPath {
                    path: path.text().unwrap_or("").to_string(),
                    kind: NodeKind::parse(path.attribute("kind").unwrap_or("")),
                    action: path.attribute("action").unwrap_or("").to_string(),
                    prop_mods: path.attribute("prop-mods") == Some("true"),
                    text_mods: path.attribute("text-mods") == Some("true"),
                    copy_from,
                });
            }
        }

        entries.push(LogEntry {
            revision: parse_u64(required_attr(entry, "revision")?, "logentry revision")?,
            author: child_text(entry, "author"),
            date: parse_date(entry),
            message: child_text(entry, "msg").unwrap_or_default(),
            paths,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const WC_INFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<info>
<entry kind="dir" path="." revision="42">
<url>https://svn.example.com/repo/trunk/my%20dir</url>
<relative-url>^/trunk/my%20dir</relative-url>
<repository>
<root>https://svn.example.com/repo</root>
<uuid>0a1b2c3d-0000-1111-2222-333344445555</uuid>
</repository>
<wc-info>
<wcroot-abspath>/home/dev/wc</wcroot-abspath>
<schedule>normal</schedule>
<depth>infinity</depth>
</wc-info>
<commit revision="40">
<author>alice</author>
<date>2024-05-01T10:00:00.000000Z</date>
</commit>
<lock>
<token>opaquelocktoken:1234</token>
<owner>bob</owner>
<comment>editing the header</comment>
<created>2024-05-02T08:30:00.000000Z</created>
</lock>
</entry>
</info>"#;

    const REMOTE_INFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<info>
<entry kind="file" path="a.txt" revision="57">
<url>https://svn.example.com/repo/trunk/a.txt</url>
<repository>
<root>https://svn.example.com/repo</root>
<uuid>0a1b2c3d-0000-1111-2222-333344445555</uuid>
</repository>
<commit revision="55">
<author>carol</author>
<date>2024-06-01T00:00:00.000000Z</date>
</commit>
</entry>
</info>"#;

    #[test]
    fn parses_working_copy_info() {
        let info = parse_info_xml(WC_INFO).unwrap();
        assert_eq!(info.kind, NodeKind::Dir);
        assert_eq!(info.revision, 42);
        assert_eq!(info.relative_url.as_deref(), Some("^/trunk/my%20dir"));
        assert_eq!(info.decoded_url().unwrap(), "https://svn.example.com/repo/trunk/my dir");
        assert_eq!(
            info.wc_info,
            Some(WcInfo {
                wcroot_abspath: Some("/home/dev/wc".to_string()),
                schedule: Some("normal".to_string()),
                depth: Some("infinity".to_string()),
                checksum: None,
            })
        );
        let commit = info.commit.unwrap();
        assert_eq!(commit.revision, 40);
        assert_eq!(commit.author.as_deref(), Some("alice"));
        assert!(commit.date.is_some());

        let lock = info.lock.unwrap();
        assert_eq!(lock.owner, "bob");
        assert_eq!(lock.comment, "editing the header");
        assert!(lock.created_at().is_some());
    }

    #[test]
    fn remote_info_has_no_wc_subtree() {
        let info = parse_info_xml(REMOTE_INFO).unwrap();
        assert_eq!(info.kind, NodeKind::File);
        assert_eq!(info.wc_info, None);
        assert_eq!(info.lock, None);
        assert_eq!(info.relative_url, None);
        assert_eq!(info.repository.root, "https://svn.example.com/repo");
    }

    #[test]
    fn url_with_non_utf8_escape_fails_to_decode() {
        let mut info = parse_info_xml(REMOTE_INFO).unwrap();
        info.url = "https://svn.example.com/repo/%FF%FE".to_string();
        assert!(matches!(info.decoded_url(), Err(AppError::UrlDecode(_))));
    }

    #[test]
    fn info_without_entry_is_shape_error() {
        let err = parse_info_xml("<info></info>").unwrap_err();
        assert!(matches!(err, AppError::XmlShape(_)));
    }

    #[test]
    fn log_keeps_tool_order_and_paths() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<log>
<logentry revision="12">
<author>alice</author>
<date>2024-05-03T10:00:00.000000Z</date>
<paths>
<path prop-mods="false" text-mods="true" kind="file" action="M">/trunk/a.txt</path>
<path prop-mods="true" text-mods="false" kind="dir" action="A" copyfrom-path="/trunk" copyfrom-rev="9">/branches/x</path>
</paths>
<msg>second</msg>
</logentry>
<logentry revision="11">
<date>2024-05-02T10:00:00.000000Z</date>
<msg></msg>
<logentry revision="3">
<msg>merged child</msg>
</logentry>
</logentry>
</log>"#;
        let entries = parse_log_xml(xml).unwrap();
        assert_eq!(entries.iter().map(|e| e.revision).collect::<Vec<_>>(), vec![12, 11]);

        let first = &entries[0];
        assert_eq!(first.message, "second");
        assert_eq!(first.paths.len(), 2);
        assert_eq!(first.paths[0].action, "M");
        assert!(first.paths[0].text_mods);
        assert_eq!(first.paths[1].kind, NodeKind::Dir);
        assert!(first.paths[1].prop_mods);
        assert_eq!(first.paths[1].copy_from, Some(("/trunk".to_string(), 9)));

        assert_eq!(entries[1].author, None);
        assert_eq!(entries[1].message, "");
    }

    #[test]
    fn empty_log() {
        assert!(parse_log_xml("<log>\n</log>").unwrap().is_empty());
    }
}
