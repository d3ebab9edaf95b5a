use crate::domain::errors::{DomainError, DomainResult};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            "image/bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Detects the format from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            [b'B', b'M', ..] => Some(Self::Bmp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Local reference to a staged image, shaped `<name>.<ext>`.
///
/// The name is restricted to ASCII alphanumerics so a reference can be joined
/// onto the staging directory without escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    value: String,
    format: ImageFormat,
}

impl ImageRef {
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        let (stem, ext) = value
            .rsplit_once('.')
            .ok_or_else(|| DomainError::Validation(format!("image reference `{value}` has no extension")))?;
        if stem.is_empty() || stem.len() > 64 || !stem.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::Validation(format!(
                "image reference `{value}` is not a staged image name"
            )));
        }
        let format = ImageFormat::from_extension(ext).ok_or_else(|| {
            DomainError::Validation(format!("image reference `{value}` has an unknown extension"))
        })?;
        Ok(Self { value, format })
    }

    pub fn generate(format: ImageFormat) -> Self {
        Self {
            value: format!("{}.{}", Uuid::new_v4().simple(), format.extension()),
            format,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_staged_names() {
        let image = ImageRef::parse("3f2a9c.PNG").unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.as_str(), "3f2a9c.PNG");
    }

    #[test]
    fn rejects_traversal_and_unknown_extensions() {
        assert!(ImageRef::parse("../secret.png").is_err());
        assert!(ImageRef::parse("abc").is_err());
        assert!(ImageRef::parse("abc.tiff").is_err());
        assert!(ImageRef::parse(".png").is_err());
    }

    #[test]
    fn generated_reference_round_trips() {
        let image = ImageRef::generate(ImageFormat::Jpeg);
        assert_eq!(ImageRef::parse(image.as_str()).unwrap(), image);
    }

    #[test]
    fn sniffs_common_signatures() {
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(
            ImageFormat::sniff(b"\x89PNG\r\n\x1a\n0000"),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::sniff(b"RIFF0000WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"hello"), None);
    }

    #[test]
    fn mime_parameters_are_ignored() {
        assert_eq!(ImageFormat::from_mime("image/png; q=1"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("text/plain"), None);
    }
}
