use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;

/// Common error type for analysis submission.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Opaque handle to a source image. Either the encoded bytes themselves or a
/// locator (file path) the host knows how to load.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageRef {
    Bytes(Arc<[u8]>),
    Locator(String),
}

impl ImageRef {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Locator(path.as_ref().display().to_string())
    }

    /// Rejects references that cannot name an image. Content is only sniffed,
    /// never decoded.
    pub fn validate(&self) -> AnalysisResult<()> {
        match self {
            ImageRef::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(AnalysisError::InvalidInput("empty image buffer".into()));
                }
                image::guess_format(bytes).map_err(|_| {
                    AnalysisError::InvalidInput("buffer is not a recognised image format".into())
                })?;
                Ok(())
            }
            ImageRef::Locator(locator) => {
                if locator.trim().is_empty() {
                    return Err(AnalysisError::InvalidInput("blank image locator".into()));
                }
                ImageFormat::from_path(locator).map_err(|_| {
                    AnalysisError::InvalidInput(format!("{} is not an image file", locator))
                })?;
                Ok(())
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ImageRef::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            ImageRef::Locator(locator) => locator.clone(),
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageRef({})", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn empty_buffer_is_rejected() {
        let image = ImageRef::from_bytes(Vec::<u8>::new());
        assert!(matches!(
            image.validate(),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_image_bytes_are_rejected() {
        let image = ImageRef::from_bytes(b"plain text, not a scan".to_vec());
        assert!(image.validate().is_err());
    }

    #[test]
    fn png_signature_is_accepted() {
        let image = ImageRef::from_bytes(PNG_MAGIC.to_vec());
        assert!(image.validate().is_ok());
    }

    #[test]
    fn locator_needs_image_extension() {
        assert!(ImageRef::from_path("scans/pancreas.png").validate().is_ok());
        assert!(ImageRef::from_path("scans/notes.txt").validate().is_err());
        assert!(ImageRef::Locator("   ".into()).validate().is_err());
    }

    #[test]
    fn debug_output_hides_buffer_contents() {
        let image = ImageRef::from_bytes(PNG_MAGIC.to_vec());
        assert_eq!(format!("{:?}", image), "ImageRef(<10 bytes>)");
    }
}
