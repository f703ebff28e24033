//! Turns uploaded files into inline `data:` URLs. Nothing is written anywhere.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rb_core::envelope::UploadedFile;
use rb_core::error::{AppError, Result};

pub fn to_data_url(file: &UploadedFile, max_bytes: usize) -> Result<String> {
    if file.bytes.is_empty() {
        return Err(AppError::validation(format!("{} is empty", file.name)));
    }
    if file.bytes.len() > max_bytes {
        return Err(AppError::validation(format!(
            "{} is larger than the {} upload limit",
            file.name,
            human_size(max_bytes)
        )));
    }
    let mime = image_mime(file)
        .ok_or_else(|| AppError::validation(format!("{} is not an image", file.name)))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(&file.bytes)))
}

/// The declared type when it is an image type, else whatever the bytes look like.
fn image_mime(file: &UploadedFile) -> Option<String> {
    let declared = file
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|ct| ct.starts_with("image/"));
    match declared {
        Some(ct) => Some(ct.to_string()),
        None => image::guess_format(&file.bytes)
            .ok()
            .map(|format| format.to_mime_type().to_string()),
    }
}

fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} byte")
    }
}
