//! ### zip 压缩与解压
//!

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Component, Path, PathBuf},
};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use super::error::{AppError, AppResult, PathErrorKind};

fn options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// 把路径转换成 zip 中使用的名字（正斜杠分隔）
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// 压缩文件或目录
pub fn zip_path(src: &Path, dst: &Path) -> AppResult<()> {
    if src.is_file() {
        zip_file(src, dst)
    } else if src.is_dir() {
        zip_directory(src, dst)
    } else if src.exists() {
        Err(AppError::path(src, PathErrorKind::UnsupportedType))
    } else {
        Err(AppError::path(src, PathErrorKind::NotFound))
    }
}

fn zip_file(src: &Path, dst: &Path) -> AppResult<()> {
    info!(">>> zip {} -> {}", src.display(), dst.display());
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::path(src, PathErrorKind::UnsupportedType))?;

    let mut writer = ZipWriter::new(BufWriter::new(File::create(dst)?));
    writer.start_file(name, options())?;
    io::copy(&mut BufReader::new(File::open(src)?), &mut writer)?;
    writer.finish()?.flush()?;
    Ok(())
}

fn zip_directory(src: &Path, dst: &Path) -> AppResult<()> {
    info!(">>> zip {} -> {}", src.display(), dst.display());
    let mut writer = ZipWriter::new(BufWriter::new(File::create(dst)?));
    // 压缩包放在源目录里时不要把自己也装进去，比较规范化后的路径
    let dst_canonical = fs::canonicalize(dst)?;

    // 符号链接按其指向的内容打包
    for entry in WalkDir::new(src).min_depth(1).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let name = archive_name(relative);

        if entry.file_type().is_dir() {
            debug!("adding directory {}/", name);
            writer.add_directory(format!("{}/", name), options())?;
        } else if entry.file_type().is_file() {
            if Some(entry.file_name()) == dst_canonical.file_name()
                && fs::canonicalize(entry.path())? == dst_canonical
            {
                continue;
            }
            debug!("adding file {}", name);
            writer.start_file(name, options())?;
            io::copy(&mut BufReader::new(File::open(entry.path())?), &mut writer)?;
        } else {
            return Err(AppError::path(entry.path(), PathErrorKind::UnsupportedType));
        }
    }

    writer.finish()?.flush()?;
    Ok(())
}

/// entry 名字转换为 dst 下的相对路径，拒绝越界的名字
fn entry_path(name: &str) -> AppResult<(PathBuf, bool)> {
    let normalized = name.replace('\\', "/");
    let is_dir = normalized.ends_with('/');

    let mut relative = PathBuf::new();
    for component in Path::new(normalized.trim_end_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return Err(AppError::InvalidArchiveEntry(name.to_string())),
        }
    }
    Ok((relative, is_dir))
}

/// 解压到目标目录，重建完整的目录结构
pub fn unzip(archive: &Path, dst: &Path) -> AppResult<()> {
    info!(">>> unzip {} -> {}", archive.display(), dst.display());
    let mut archive = ZipArchive::new(BufReader::new(File::open(archive)?))?;
    fs::create_dir_all(dst)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let (relative, is_dir) = entry_path(file.name())?;
        let out_path = dst.join(&relative);

        if is_dir {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&out_path)?);
        io::copy(&mut file, &mut out)?;
        out.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_are_normalized() {
        assert_eq!(entry_path("a\\b\\c.txt").unwrap(), (PathBuf::from("a/b/c.txt"), false));
        assert_eq!(entry_path("dir\\").unwrap(), (PathBuf::from("dir"), true));
        assert_eq!(entry_path("./x/").unwrap(), (PathBuf::from("x"), true));
    }

    #[test]
    fn escaping_entries_are_rejected() {
        assert!(matches!(entry_path("../evil"), Err(AppError::InvalidArchiveEntry(_))));
        assert!(matches!(entry_path("/etc/passwd"), Err(AppError::InvalidArchiveEntry(_))));
    }

    #[test]
    fn single_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("report.txt");
        fs::write(&src, "hello zip").unwrap();
        let archive = dir.path().join("report.zip");

        zip_path(&src, &archive).unwrap();
        let out = dir.path().join("out");
        unzip(&archive, &out).unwrap();
        assert_eq!(fs::read_to_string(out.join("report.txt")).unwrap(), "hello zip");
    }

    #[test]
    fn backslash_entries_become_directories() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("win.zip");
        {
            let mut writer = ZipWriter::new(File::create(&archive).unwrap());
            writer.start_file("empty\\", options()).unwrap();
            writer.start_file("docs\\readme.txt", options()).unwrap();
            writer.write_all(b"from windows").unwrap();
            writer.finish().unwrap();
        }

        let out = dir.path().join("out");
        unzip(&archive, &out).unwrap();
        assert!(out.join("empty").is_dir());
        assert_eq!(fs::read_to_string(out.join("docs/readme.txt")).unwrap(), "from windows");
    }

    #[test]
    fn missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = zip_path(&dir.path().join("nope"), &dir.path().join("x.zip")).unwrap_err();
        assert!(matches!(err, AppError::Path { kind: PathErrorKind::NotFound, .. }));
    }
}
