//! Message images on local disk, served back under `/uploads`.

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use crate::domain::{GatewayError, ImageStore};

/// URL path the upload directory is mounted at
pub const UPLOADS_ROUTE: &str = "/uploads";

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Writes each image to `<dir>/<uuid>.<ext>`
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// File name behind one of our URLs, or `None` for anything else
    fn file_name_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        let name = url.strip_prefix(UPLOADS_ROUTE)?.strip_prefix('/')?;
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return None;
        }
        Some(name)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, GatewayError> {
        let extension = extension_for(content_type)
            .ok_or_else(|| GatewayError::UnsupportedImage(content_type.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        let name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&name), bytes)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        tracing::debug!("Stored image '{}'", name);
        Ok(format!("{UPLOADS_ROUTE}/{name}"))
    }

    async fn remove(&self, url: &str) -> Result<(), GatewayError> {
        let Some(name) = self.file_name_of(url) else {
            tracing::debug!("Ignoring removal of foreign image URL '{}'", url);
            return Ok(());
        };
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GatewayError::Storage(e.to_string())),
        }
    }
}
