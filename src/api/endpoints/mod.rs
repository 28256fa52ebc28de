//! Route handlers, one module per endpoint.

pub mod analyze;
pub mod health;
pub mod predict;
pub mod report;

use axum::extract::Multipart;

use crate::api::error::ApiError;

/// Read the required `file` field from a multipart body.
pub(crate) async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(ApiError::BadRequest("Missing required field `file`".into()))
}

/// Mime type of the upload, as forwarded to the generation API.
///
/// Uploads are overwhelmingly JPEG phone photos; PNG is the one other
/// format worth distinguishing by magic bytes.
pub(crate) fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else {
        "image/jpeg"
    }
}
