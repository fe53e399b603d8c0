use crate::utils::error::TransferError;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> std::io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// 远程列表可能带目录前缀，只取最后一段
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(name)
}

// 展开 `~/`，其余路径原样返回
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match home::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

// 先写同目录的临时文件，成功后再改名覆盖；失败时原文件保持不变
pub fn replace_file<F>(target: &Path, write: F) -> Result<(), TransferError>
where
    F: FnOnce(&mut File) -> Result<(), TransferError>,
{
    let local_io = |source: std::io::Error| TransferError::LocalIo {
        path: target.to_path_buf(),
        source,
    };

    let partial = partial_path(target);
    let mut file = File::create(&partial).map_err(local_io)?;
    let written = write(&mut file).and_then(|()| file.sync_all().map_err(local_io));
    drop(file);

    let result = written.and_then(|()| std::fs::rename(&partial, target).map_err(local_io));
    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(".part");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn base_name_strips_remote_prefix() {
        assert_eq!(base_name("log/a_upload_log.csv"), "a_upload_log.csv");
        assert_eq!(base_name("plain.csv"), "plain.csv");
        assert_eq!(base_name("dir/sub/"), "sub");
        assert_eq!(base_name("C:\\logs\\x_upload_log"), "x_upload_log");
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        let p = Path::new("/etc/key");
        assert_eq!(expand_home(p), PathBuf::from("/etc/key"));
    }

    #[test]
    fn replace_file_swaps_in_complete_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a_upload_log");
        std::fs::write(&target, "old").unwrap();

        replace_file(&target, |file| {
            file.write_all(b"new")
                .map_err(|source| TransferError::LocalIo {
                    path: PathBuf::new(),
                    source,
                })
        })
        .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_keeps_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a_upload_log");
        std::fs::write(&target, "last known").unwrap();

        let err = replace_file(&target, |file| {
            file.write_all(b"half").unwrap();
            Err(TransferError::Get {
                name: "a_upload_log".to_string(),
                message: "connection reset".to_string(),
            })
        })
        .unwrap_err();

        assert!(matches!(err, TransferError::Get { .. }));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "last known");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn ensure_parent_dir_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/log.csv");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }
}
