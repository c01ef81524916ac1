//! MIME type detection for uploads.

/// Resolve the MIME type for an upload: caller-supplied, then guessed from
/// the extension, then `application/octet-stream`.
pub fn resolve_mime(file_name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_string(),
        None => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string(),
    }
}
