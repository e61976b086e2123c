//! Upload filename conventions.
//!
//! Uploads are staged as `{uuid}_{basename}` inside a shared directory.
//! The random prefix is the only thing keeping concurrent requests apart,
//! so every staged name must be fresh.

use uuid::Uuid;

/// Fallback used when the client sends no usable filename.
pub const DEFAULT_UPLOAD_NAME: &str = "upload";

/// Reduce a client-supplied filename to a safe final path component.
///
/// Strips any directory part (both `/` and `\` separators), surrounding
/// whitespace, and rejects `.`/`..`.
///
/// ```
/// use winzaap_core::naming::sanitize_basename;
///
/// assert_eq!(sanitize_basename(Some("report.docx")), "report.docx");
/// assert_eq!(sanitize_basename(Some("../../etc/passwd")), "passwd");
/// assert_eq!(sanitize_basename(None), "upload");
/// ```
pub fn sanitize_basename(name: Option<&str>) -> String {
    let Some(name) = name else {
        return DEFAULT_UPLOAD_NAME.to_string();
    };

    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name)
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        DEFAULT_UPLOAD_NAME.to_string()
    } else {
        base.to_string()
    }
}

/// Generate a staged filename for an upload: `{uuid}_{basename}`.
pub fn staged_upload_name(original: Option<&str>) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_basename(original))
}
