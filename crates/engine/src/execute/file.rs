use super::error::{ErrorKind, Result};
use crate::plan::{LinkKind, PlannedOperation};
use filetime::FileTime;
use std::fs::Metadata;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

const HASH_BUFFER: usize = 64 * 1024;

/// Places one operation's source at `root/destination`.
///
/// Returns the mechanism actually used: a hardlink request falls back to a
/// copy on any failure other than the destination already existing. The
/// source is only ever opened for reading.
pub(crate) async fn apply_operation(root: &Path, op: &PlannedOperation, verify: bool) -> Result<LinkKind> {
    let destination = root.join(op.destination());
    if let Some(parent) = destination.parent() {
        match fs::create_dir_all(parent).await {
            Ok(()) => {},
            Err(err) if err.kind() == IoErrorKind::AlreadyExists => {},
            Err(err) => exn::bail!(ErrorKind::CreateDir(err)),
        }
    }
    // symlink_metadata so that a dangling symlink also counts as occupied.
    if fs::symlink_metadata(&destination).await.is_ok() {
        exn::bail!(ErrorKind::Exists);
    }

    if op.kind() == LinkKind::Hardlink {
        match fs::hard_link(op.source(), &destination).await {
            Ok(()) => return Ok(LinkKind::Hardlink),
            Err(err) if err.kind() == IoErrorKind::AlreadyExists => exn::bail!(ErrorKind::Exists),
            Err(err) => debug!(error = %err, "hardlink failed, copying instead"),
        }
    }

    let mut source = File::open(op.source()).await.map_err(ErrorKind::Source)?;
    let metadata = source.metadata().await.map_err(ErrorKind::Source)?;
    let target = match OpenOptions::new().write(true).create_new(true).open(&destination).await {
        Ok(target) => target,
        Err(err) if err.kind() == IoErrorKind::AlreadyExists => exn::bail!(ErrorKind::Exists),
        Err(err) => exn::bail!(ErrorKind::Copy(err)),
    };
    // From here on the destination is ours; never leave a partial copy behind.
    if let Err(err) = copy_contents(&mut source, target, &destination, &metadata, verify, op.source()).await {
        _ = fs::remove_file(&destination).await;
        return Err(err);
    }
    Ok(LinkKind::Copy)
}

async fn copy_contents(
    source: &mut File,
    mut target: File,
    destination: &Path,
    metadata: &Metadata,
    verify: bool,
    source_path: &Path,
) -> Result<()> {
    tokio::io::copy(source, &mut target).await.map_err(ErrorKind::Copy)?;
    target.flush().await.map_err(ErrorKind::Copy)?;
    target.sync_all().await.map_err(ErrorKind::Copy)?;
    drop(target);

    filetime::set_file_mtime(destination, FileTime::from_last_modification_time(metadata)).map_err(ErrorKind::Copy)?;
    fs::set_permissions(destination, metadata.permissions()).await.map_err(ErrorKind::Copy)?;

    if verify {
        let expected = hash_file(source_path).await.map_err(ErrorKind::Source)?;
        let actual = hash_file(destination).await.map_err(ErrorKind::Copy)?;
        if expected != actual {
            exn::bail!(ErrorKind::Verify);
        }
    }
    Ok(())
}

async fn hash_file(path: &Path) -> std::io::Result<blake3::Hash> {
    let mut file = File::open(path).await?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0; HASH_BUFFER];
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as sync_fs;
    use std::ops::Deref;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_hardlink() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        sync_fs::write(&source, b"hello").unwrap();
        let root = dir.path().join("out");
        let op = PlannedOperation::new(&source, "others/a.txt", LinkKind::Hardlink);
        assert_eq!(apply_operation(&root, &op, false).await.unwrap(), LinkKind::Hardlink);
        assert_eq!(sync_fs::read(root.join("others/a.txt")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_copy_keeps_mtime_and_verifies() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        sync_fs::write(&source, b"hello").unwrap();
        let mtime = FileTime::from_unix_time(1_700_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();
        let op = PlannedOperation::new(&source, "x/y/a.txt", LinkKind::Copy);
        assert_eq!(apply_operation(dir.path(), &op, true).await.unwrap(), LinkKind::Copy);
        let copied = dir.path().join("x/y/a.txt");
        assert_eq!(sync_fs::read(&copied).unwrap(), b"hello");
        let copied_mtime = FileTime::from_last_modification_time(&sync_fs::metadata(&copied).unwrap());
        assert_eq!(copied_mtime, mtime);
    }

    #[tokio::test]
    async fn test_never_overwrites() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        sync_fs::write(&source, b"new").unwrap();
        sync_fs::write(dir.path().join("taken.txt"), b"old").unwrap();
        for kind in [LinkKind::Hardlink, LinkKind::Copy] {
            let op = PlannedOperation::new(&source, "taken.txt", kind);
            let err = apply_operation(dir.path(), &op, false).await.unwrap_err();
            assert!(matches!(err.deref(), ErrorKind::Exists));
            assert_eq!(sync_fs::read(dir.path().join("taken.txt")).unwrap(), b"old");
        }
    }

    #[tokio::test]
    async fn test_missing_source_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let op = PlannedOperation::new(dir.path().join("gone.txt"), "out/gone.txt", LinkKind::Hardlink);
        let err = apply_operation(dir.path(), &op, false).await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Source(_)));
        assert!(!dir.path().join("out/gone.txt").exists());
    }
}
