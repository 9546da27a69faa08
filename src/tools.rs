//! Image upload tools.
//!
//! Thin operations for a tool host: upload an image given as base64 text or
//! as a local path, and render the outcome as text. Base64 input is staged
//! under an images directory before it is uploaded.

use crate::error::Result;
use crate::response::{lookup_str, ResultMap};
use crate::rest::AdminClient;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Local;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory receiving staged base64 images
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Staged file names are the local time at one second resolution
const STAGED_NAME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Image upload operations backed by an [`AdminClient`]
#[derive(Debug, Clone)]
pub struct ImageTools {
    client: AdminClient,
    images_dir: PathBuf,
}

impl ImageTools {
    pub fn new(client: AdminClient) -> Self {
        ImageTools {
            client,
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
        }
    }

    /// Stage base64 images somewhere other than `./images`
    pub fn with_images_dir(mut self, images_dir: impl Into<PathBuf>) -> Self {
        self.images_dir = images_dir.into();
        self
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Decode standard base64 and write it to `<images_dir>/<timestamp>.png`.
    ///
    /// Two images staged within the same second share a name; the later one
    /// overwrites the earlier.
    pub fn stage_base64(&self, encoded: &str) -> Result<PathBuf> {
        let bytes = STANDARD.decode(encoded.trim())?;

        fs::create_dir_all(&self.images_dir)?;
        let name = format!("{}.png", Local::now().format(STAGED_NAME_FORMAT));
        let path = self.images_dir.join(name);
        fs::write(&path, &bytes)?;

        debug!(path = %path.display(), size = bytes.len(), "staged base64 image");
        Ok(path)
    }

    /// Upload an image given as base64 text
    pub fn upload_image_base64(&self, encoded: &str) -> Result<ResultMap> {
        let path = self.stage_base64(encoded)?;
        self.upload_path(&path)
    }

    /// Upload an image already on disk
    pub fn upload_image_local_path(&self, local_path: &str) -> Result<ResultMap> {
        self.upload_path(Path::new(local_path))
    }

    fn upload_path(&self, path: &Path) -> Result<ResultMap> {
        let result = self.client.upload_image(path)?;
        if let Some(url) = lookup_str(&result, "images/0/url") {
            info!(path = %path.display(), url, "image uploaded");
        }
        Ok(result)
    }
}

/// Text result handed back to a tool host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    /// Render a success as JSON text and a failure as its message.
    ///
    /// Error kinds are not distinguished.
    pub fn from_result(result: Result<ResultMap>) -> Self {
        match result {
            Ok(map) => ToolOutput {
                text: Value::Object(map).to_string(),
                is_error: false,
            },
            Err(e) => ToolOutput {
                text: e.to_string(),
                is_error: true,
            },
        }
    }
}
