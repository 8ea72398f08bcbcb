//! HTTP handlers, one module per resource.

pub mod backgrounds;
pub mod predictions;
pub mod trainings;
pub mod users;

use std::collections::HashMap;

use axum::extract::Multipart;

use atelier_pipeline::submission::UploadedImage;

use crate::error::{AppError, AppResult};

/// Drain a multipart request into uploaded files plus text fields.
///
/// Every part named `files` becomes an [`UploadedImage`]; other parts
/// are collected as text fields keyed by part name.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
) -> AppResult<(Vec<UploadedImage>, HashMap<String, String>)> {
    let mut images = Vec::new();
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "files" {
            let file_name = field.file_name().unwrap_or("upload.bin").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            images.push(UploadedImage {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            fields.insert(name, text);
        }
    }

    Ok((images, fields))
}
