use std::path::PathBuf;

use anyhow::Result;
use tokio::fs;
use tracing::{info, warn};

/// Public URL prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/uploads/images";

/// 2 MB upload limit for tweet images
pub const MAX_IMAGE_SIZE: usize = 2 * 1024 * 1024;

pub const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg"];

/// An image received in a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImageRejection {
    #[error("Invalid file type. Allowed types: {}", ALLOWED_TYPES.join(","))]
    UnsupportedType,
    #[error("File size exceeds the 2MB limit.")]
    TooLarge,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), ImageRejection> {
        if !ALLOWED_TYPES.contains(&self.content_type.as_str()) {
            return Err(ImageRejection::UnsupportedType);
        }
        if self.bytes.len() > MAX_IMAGE_SIZE {
            return Err(ImageRejection::TooLarge);
        }
        Ok(())
    }
}

/// Tweet images on local disk. Tweets store the public path
/// (`/uploads/images/{file}`), never the bytes.
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Image storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Write an already validated upload and return its public path.
    pub async fn save(&self, upload: &ImageUpload) -> Result<String> {
        let file_name = format!(
            "{}_{}_{}",
            chrono::Utc::now().timestamp_millis(),
            &uuid::Uuid::new_v4().simple().to_string()[..8],
            sanitize_file_name(&upload.file_name)
        );
        fs::write(self.dir.join(&file_name), &upload.bytes).await?;
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    /// Best-effort removal of a previously saved image. Paths outside the
    /// store are ignored.
    pub async fn remove(&self, public_path: &str) {
        let Some(name) = stored_file_name(public_path) else {
            warn!("Not removing image outside the store: {}", public_path);
            return;
        };
        if let Err(e) = fs::remove_file(self.dir.join(name)).await {
            warn!("Failed to remove image {}: {}", public_path, e);
        }
    }
}

/// Whitespace becomes `_`; anything but ASCII word characters, `.` and `-`
/// is dropped.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

fn stored_file_name(public_path: &str) -> Option<&str> {
    let name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return None;
    }
    Some(name)
}
