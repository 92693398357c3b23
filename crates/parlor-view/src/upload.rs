use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use thiserror::Error;

use parlor_types::events::ClientIntent;
use parlor_types::models::FileKind;

/// 5 MiB upload limit, checked before the file is read.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("File too large! Maximum size is 5MB.")]
    TooLarge { size: u64 },
    #[error("Only images or archives (.zip, .rar, .7z) can be uploaded.")]
    Unsupported { filename: String },
}

fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Media kind by filename suffix only; no content sniffing.
pub fn classify(filename: &str) -> Option<FileKind> {
    let ext = extension(filename)?;
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Image)
    } else if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Archive)
    } else {
        None
    }
}

pub fn mime_type(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("zip") => "application/zip",
        Some("rar") => "application/vnd.rar",
        Some("7z") => "application/x-7z-compressed",
        _ => "application/octet-stream",
    }
}

/// Name given to a pasted clipboard image, e.g. `image/png` -> `image.png`.
pub fn paste_filename(mime: &str) -> Option<String> {
    let subtype = mime.trim().strip_prefix("image/")?;
    let ext = subtype.split(['+', ';']).next().unwrap_or(subtype).trim();
    if ext.is_empty() {
        return None;
    }
    Some(format!("image.{}", ext.to_ascii_lowercase()))
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, B64.encode(bytes))
}

/// A validated upload waiting for its bytes to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub filename: String,
    pub kind: FileKind,
    pub mime: String,
}

impl PendingUpload {
    /// Size is checked first, then the extension.
    pub fn new(filename: &str, size: u64) -> Result<Self, UploadError> {
        if size > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge { size });
        }
        let kind = classify(filename).ok_or_else(|| UploadError::Unsupported {
            filename: filename.to_string(),
        })?;
        Ok(Self {
            filename: filename.to_string(),
            kind,
            mime: mime_type(filename).to_string(),
        })
    }

    pub fn into_intent(self, bytes: &[u8]) -> Result<ClientIntent, UploadError> {
        let size = bytes.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge { size });
        }
        Ok(ClientIntent::UploadFile {
            file: data_url(&self.mime, bytes),
            filename: self.filename,
            file_type: self.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn classifies_by_suffix_case_insensitively() {
        assert_eq!(classify("Photo.JPG"), Some(FileKind::Image));
        assert_eq!(classify("drawing.svg"), Some(FileKind::Image));
        assert_eq!(classify("backup.7z"), Some(FileKind::Archive));
        assert_eq!(classify("setup.exe"), None);
        assert_eq!(classify("png"), None);
        assert_eq!(classify("archive.zip.exe"), None);
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(PendingUpload::new("a.png", MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            PendingUpload::new("a.png", MAX_UPLOAD_BYTES + 1),
            Err(UploadError::TooLarge { size: MAX_UPLOAD_BYTES + 1 })
        );
    }

    #[test]
    fn oversize_wins_over_bad_extension() {
        assert!(matches!(
            PendingUpload::new("virus.exe", 6 * MIB),
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn intent_carries_data_url() {
        let pending = PendingUpload::new("dot.png", 3).unwrap();
        let intent = pending.into_intent(&[1, 2, 3]).unwrap();
        assert_eq!(
            intent,
            ClientIntent::UploadFile {
                file: "data:image/png;base64,AQID".into(),
                filename: "dot.png".into(),
                file_type: FileKind::Image,
            }
        );
    }

    #[test]
    fn paste_names() {
        assert_eq!(paste_filename("image/png").as_deref(), Some("image.png"));
        assert_eq!(paste_filename("image/svg+xml").as_deref(), Some("image.svg"));
        assert_eq!(paste_filename("text/plain"), None);
    }
}
