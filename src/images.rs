use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::errors::ApiError;

/// Accepted upload types and the extension their objects are stored with
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/avif", "avif"),
];

/// An object written in the image store
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub key: String,
    pub url: String,
    pub size: usize,
    pub content_type: String,
}

/// Object store for uploaded images, backed by a directory.
/// Objects are addressed by a `<uuid>.<extension>` key.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    public_prefix: String,
    max_size: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: &str, max_size: usize) -> Self {
        ImageStore {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_owned(),
            max_size,
        }
    }

    /// Create the storage directory if needed
    pub async fn init(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL of an object
    pub fn url_of(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix, key)
    }

    /// Store a new object and return its key
    #[tracing::instrument(skip(self, content), fields(size = content.len()))]
    pub async fn put(&self, content: &[u8], content_type: &str) -> Result<StoredImage, ApiError> {
        if content.is_empty() {
            return Err(ApiError::invalid("The image is empty"));
        }
        if content.len() > self.max_size {
            return Err(ApiError::PayloadTooLarge(self.max_size));
        }

        let content_type = normalize_content_type(content_type);
        let extension = extension_of(&content_type)
            .ok_or_else(|| ApiError::UnsupportedMediaType(content_type.clone()))?;

        let key = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.root.join(&key), content).await?;
        tracing::info!("Stored image {}", key);

        Ok(StoredImage {
            url: self.url_of(&key),
            key,
            size: content.len(),
            content_type,
        })
    }

    /// Path of an existing object. Unknown or malformed keys are reported as not found.
    pub async fn path_of(&self, key: &str) -> Result<PathBuf, ApiError> {
        if !is_valid_key(key) {
            return Err(ApiError::not_found("Image", key));
        }

        let path = self.root.join(key);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(path),
            Ok(_) => Err(ApiError::not_found("Image", key)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ApiError::not_found("Image", key)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an object
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), ApiError> {
        let path = self.path_of(key).await?;
        tokio::fs::remove_file(path).await?;
        tracing::info!("Deleted image {}", key);

        Ok(())
    }
}

/// Content type of an object, derived from its key
pub fn content_type_of(key: &str) -> Option<&'static str> {
    let (_, extension) = key.rsplit_once('.')?;
    CONTENT_TYPES
        .iter()
        .find(|(_, ext)| *ext == extension)
        .map(|(content_type, _)| *content_type)
}

fn extension_of(content_type: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
}

/// `image/PNG; charset=binary` -> `image/png`
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Keys are generated by the store, anything else (path separators, dots...) is rejected
fn is_valid_key(key: &str) -> bool {
    match key.split_once('.') {
        Some((id, extension)) => {
            Uuid::parse_str(id).is_ok()
                && id.len() == 36
                && CONTENT_TYPES.iter().any(|(_, ext)| *ext == extension)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    fn temp_store(max_size: usize) -> ImageStore {
        let root = std::env::temp_dir().join(format!("blog-api-images-{}", Uuid::new_v4()));
        ImageStore::new(root, "/images/", max_size)
    }

    #[test]
    fn keys() {
        assert!(is_valid_key("0b3c8c5e-5d0c-4f43-9d49-4c1f3e1f2f55.png"));
        assert!(!is_valid_key("0b3c8c5e-5d0c-4f43-9d49-4c1f3e1f2f55.exe"));
        assert!(!is_valid_key("../etc/passwd"));
        assert!(!is_valid_key("0b3c8c5e5d0c4f439d494c1f3e1f2f55.png"));
        assert!(!is_valid_key("0b3c8c5e-5d0c-4f43-9d49-4c1f3e1f2f55.png.png"));
    }

    #[test]
    fn content_types() {
        assert_eq!(normalize_content_type("Image/PNG; charset=binary"), "image/png");
        assert_eq!(extension_of("image/jpeg"), Some("jpg"));
        assert_eq!(extension_of("application/pdf"), None);
        assert_eq!(content_type_of("abc.svg"), Some("image/svg+xml"));
        assert_eq!(content_type_of("abc"), None);
    }

    #[tokio::test]
    async fn put_then_delete() {
        let store = temp_store(1024);
        store.init().await.unwrap();

        let image = store.put(b"\x89PNG fake", "image/png").await.unwrap();
        assert!(image.key.ends_with(".png"));
        assert_eq!(image.url, format!("/images/{}", image.key));
        assert_eq!(image.size, 9);
        assert_eq!(image.content_type, "image/png");

        let path = store.path_of(&image.key).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"\x89PNG fake");

        store.delete(&image.key).await.unwrap();
        assert_that!(store.path_of(&image.key).await).is_err();
        assert_that!(store.delete(&image.key).await).is_err();

        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_uploads() {
        let store = temp_store(4);
        store.init().await.unwrap();

        assert!(matches!(
            store.put(b"", "image/png").await,
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.put(b"too large", "image/png").await,
            Err(ApiError::PayloadTooLarge(4))
        ));
        assert!(matches!(
            store.put(b"pdf", "application/pdf").await,
            Err(ApiError::UnsupportedMediaType(_))
        ));

        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }
}
