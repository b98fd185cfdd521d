/// Media storage - uploaded post images on the local filesystem
use crate::config::MediaConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const POSTS_DIR: &str = "posts";

/// An uploaded image payload waiting to be stored
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            url_prefix: config.url_prefix.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `<root>/posts/` with a fresh name and return the
    /// storage key, relative to the root
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        let dir = self.root.join(POSTS_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = match original_name.and_then(extension_of) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        let key = format!("{}/{}", POSTS_DIR, file_name);
        tracing::debug!(key = %key, size = bytes.len(), "media saved");
        Ok(key)
    }

    /// Best-effort removal, used to roll back uploads of a failed post
    pub async fn remove(&self, key: &str) {
        if let Err(e) = tokio::fs::remove_file(self.root.join(key)).await {
            tracing::warn!(key = %key, error = %e, "failed to remove media file");
        }
    }

    /// `base` is `scheme://host` of the incoming request
    pub fn absolute_url(&self, base: &str, key: &str) -> String {
        format!("{}{}{}", base.trim_end_matches('/'), self.url_prefix, key)
    }
}

/// Lowercased alphanumeric extension of an uploaded file name
fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &Path) -> MediaStorage {
        MediaStorage::new(&MediaConfig {
            root: root.to_string_lossy().into_owned(),
            url_prefix: "/media/".to_string(),
        })
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("cat.JPG"), Some("jpg".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of("evil.p/hp"), None);
    }

    #[tokio::test]
    async fn test_save_writes_under_posts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let media = storage(dir.path());

        let key = media.save(Some("photo.png"), b"png-bytes").await.unwrap();

        assert!(key.starts_with("posts/"));
        assert!(key.ends_with(".png"));
        let written = std::fs::read(dir.path().join(&key)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let media = storage(dir.path());

        let key = media.save(None, b"x").await.unwrap();
        media.remove(&key).await;

        assert!(!dir.path().join(&key).exists());
    }

    #[test]
    fn test_absolute_url() {
        let media = storage(Path::new("/tmp"));
        assert_eq!(
            media.absolute_url("http://localhost:8000/", "posts/a.png"),
            "http://localhost:8000/media/posts/a.png"
        );
    }
}
