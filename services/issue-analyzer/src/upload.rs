//! Gating for uploaded images: type allow-list and a size cap enforced while
//! the multipart stream is read.

use actix_multipart::{Multipart, MultipartError};
use futures_util::StreamExt as _;
use shared::model_client::ImagePayload;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const FILE_FIELD: &str = "file";

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("Invalid file type. Only images are allowed.")]
    InvalidType,
    #[error("File too large. Max size is 5MB.")]
    TooLarge,
    #[error("Uploaded file is empty.")]
    Empty,
    #[error("No file provided.")]
    MissingFile,
    #[error("Malformed upload.")]
    Multipart(#[from] MultipartError),
}

/// MIME type for an allowed file extension.
fn mime_for_extension(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn mime_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("image/jpeg"),
        "image/png" => Some("image/png"),
        "image/webp" => Some("image/webp"),
        _ => None,
    }
}

/// Decide the image type from the filename, or from the part's content type
/// when the filename carries no extension.
pub fn detect_mime(filename: Option<&str>, content_type: Option<&str>) -> Option<&'static str> {
    match filename.filter(|f| f.contains('.')) {
        Some(name) => mime_for_extension(name),
        None => content_type.and_then(mime_for_content_type),
    }
}

/// Read the `file` part into memory.
pub async fn read_image(mut payload: Multipart) -> Result<ImagePayload, UploadError> {
    while let Some(field_res) = payload.next().await {
        let mut field = field_res?;
        if field.name() != FILE_FIELD {
            continue;
        }

        let filename = field.content_disposition().get_filename().map(str::to_string);
        let content_type = field.content_type().map(|m| m.essence_str().to_string());
        let mime = detect_mime(filename.as_deref(), content_type.as_deref())
            .ok_or(UploadError::InvalidType)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if bytes.len() + data.len() > MAX_UPLOAD_BYTES {
                return Err(UploadError::TooLarge);
            }
            bytes.extend_from_slice(&data);
        }
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        return Ok(ImagePayload::new(bytes, mime));
    }
    Err(UploadError::MissingFile)
}
