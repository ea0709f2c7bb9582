use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

/// Filesystem capability used by stores.
/// Implementations can be the local disk, an in-memory fake, or a sandboxed host API.
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn exists(&self, path: &Path) -> io::Result<bool>;
    /// Create `path` and its parents. An existing directory is success.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;
    /// Replace the contents of `path`.
    async fn write_text(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Local disk through `tokio::fs`. Writes go to a sibling temp file which is
/// then renamed over the target, so readers never see a half-written document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl FileSystem for TokioFs {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        fs::try_exists(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        match fs::create_dir_all(path).await {
            Ok(()) => Ok(()),
            // lost a race with another creator
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let is_dir = fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false);
                if is_dir { Ok(()) } else { Err(e) }
            }
            Err(e) => Err(e),
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }

    async fn write_text(&self, path: &Path, contents: &str) -> io::Result<()> {
        let tmp = tmp_path(path);
        fs::write(&tmp, contents).await?;
        if let Err(e) = fs::rename(&tmp, path).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                debug!(path = %tmp.display(), error = %cleanup, "could not remove temp file");
            }
            return Err(e);
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn tmp_path_is_a_sibling() {
        assert_eq!(tmp_path(Path::new("/a/b/data.json")), PathBuf::from("/a/b/data.json.tmp"));
    }

    #[tokio::test]
    async fn tokio_fs_write_read_and_exists() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("tokio_fs_{}", Uuid::new_v4()));
        let file = dir.join("nested").join("doc.json");
        let fs = TokioFs;

        assert!(!fs.exists(&dir).await?);
        fs.create_dir_all(file.parent().unwrap()).await?;
        // second call on an existing directory is fine
        fs.create_dir_all(file.parent().unwrap()).await?;

        fs.write_text(&file, "{\"a\":1}").await?;
        fs.write_text(&file, "{\"a\":2}").await?;
        assert!(fs.exists(&file).await?);
        assert_eq!(fs.read_to_string(&file).await?, "{\"a\":2}");
        assert!(!fs.exists(&tmp_path(&file)).await?);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_create_dir_all_succeeds() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("tokio_fs_race_{}", Uuid::new_v4())).join("a").join("b");
        let fs = TokioFs;
        let (a, b, c) = tokio::join!(fs.create_dir_all(&dir), fs.create_dir_all(&dir), fs.create_dir_all(&dir));
        a?;
        b?;
        c?;
        assert!(fs.exists(&dir).await?);
        let _ = tokio::fs::remove_dir_all(dir.parent().unwrap().parent().unwrap()).await;
        Ok(())
    }
}
