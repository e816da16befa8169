use std::fs;

use anyhow::Context;
use image::RgbaImage;
use scancore::ImageRef;

/// Decodes an image reference into pixels at its intrinsic size.
pub fn decode_image(image: &ImageRef) -> anyhow::Result<RgbaImage> {
    let bytes = match image {
        ImageRef::Bytes(bytes) => bytes.to_vec(),
        ImageRef::Locator(path) => {
            fs::read(path).with_context(|| format!("reading image {}", path))?
        }
    };
    let decoded = image::load_from_memory(&bytes)
        .with_context(|| format!("decoding image {}", image.describe()))?;
    Ok(decoded.to_rgba8())
}

/// Decodes on the blocking pool so the analysis keeps ticking meanwhile.
pub async fn load_image(image: ImageRef) -> anyhow::Result<RgbaImage> {
    tokio::task::spawn_blocking(move || decode_image(&image))
        .await
        .context("image loader task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::placeholder::{build_placeholder_scan, PlaceholderConfig};

    #[test]
    fn decodes_generated_scan_at_native_size() {
        let scan = build_placeholder_scan(&PlaceholderConfig {
            width: 40,
            height: 30,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(decode_image(&scan).unwrap().dimensions(), (40, 30));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_image(&ImageRef::from_path("missing/scan.png")).is_err());
    }
}
