use uuid::Uuid;

/// One image selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

/// Extension of `file_name` without the dot, if it has one.
pub fn extension_of(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains(['/', '\\']) {
        return None;
    }
    Some(ext)
}

/// Random object name for the blob store that keeps the original extension.
pub fn object_name_for(file_name: &str) -> String {
    let id = Uuid::new_v4();
    match extension_of(file_name) {
        Some(ext) => format!("{id}.{}", ext.to_ascii_lowercase()),
        None => id.to_string(),
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = extension_of(file_name).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_extension_and_randomizes_stem() {
        let a = object_name_for("IMG_0042.JPG");
        let b = object_name_for("IMG_0042.JPG");
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.trim_end_matches(".jpg")).is_ok());
    }

    #[test]
    fn extension_edge_cases() {
        assert_eq!(extension_of("photo.tar.png"), Some("png"));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
        assert!(!object_name_for("noext").contains('.'));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
        assert_eq!(ImageUpload::new("x.webp", vec![1]).content_type, "image/webp");
    }
}
