use std::io::Cursor;

use anyhow::Context;
use image::{ImageFormat, Rgba, RgbaImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use scancore::ImageRef;
use serde::{Deserialize, Serialize};

/// Settings for the synthetic scan used when no image is supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub width: u32,
    pub height: u32,
    pub noise: f32,
    pub seed: u64,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            noise: 12.0,
            seed: 0,
        }
    }
}

impl PlaceholderConfig {
    fn normalized_size(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }
}

/// Greyscale "scan": dark field, a bright elliptical organ, a darker duct
/// band through it, and seeded speckle noise.
pub fn build_placeholder_image(config: &PlaceholderConfig) -> RgbaImage {
    let (width, height) = config.normalized_size();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = config.noise.abs();

    let (cx, cy) = (width as f32 * 0.45, height as f32 * 0.5);
    let (rx, ry) = (width as f32 * 0.32, height as f32 * 0.22);

    RgbaImage::from_fn(width, height, |x, y| {
        let nx = (x as f32 - cx) / rx;
        let ny = (y as f32 - cy) / ry;
        let inside = nx * nx + ny * ny;
        let mut level = if inside <= 1.0 {
            150.0 - 40.0 * inside
        } else {
            25.0 + 10.0 * (1.0 / inside.sqrt())
        };
        if inside <= 1.0 && (ny - 0.15 * nx).abs() < 0.08 {
            level -= 45.0;
        }
        if noise > 0.0 {
            level += rng.gen_range(-noise..noise);
        }
        let value = level.clamp(0.0, 255.0) as u8;
        Rgba([value, value, value, 255])
    })
}

pub fn encode_png(image: &RgbaImage) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .context("encoding placeholder scan as PNG")?;
    Ok(buffer.into_inner())
}

pub fn build_placeholder_scan(config: &PlaceholderConfig) -> anyhow::Result<ImageRef> {
    let image = build_placeholder_image(config);
    let bytes = encode_png(&image)?;
    Ok(ImageRef::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_requested_size() {
        let config = PlaceholderConfig {
            width: 64,
            height: 48,
            ..Default::default()
        };
        assert_eq!(build_placeholder_image(&config).dimensions(), (64, 48));
    }

    #[test]
    fn same_seed_reproduces_the_scan() {
        let config = PlaceholderConfig {
            width: 32,
            height: 32,
            noise: 20.0,
            seed: 7,
        };
        assert_eq!(
            build_placeholder_image(&config),
            build_placeholder_image(&config)
        );
        let other = PlaceholderConfig { seed: 8, ..config.clone() };
        assert_ne!(
            build_placeholder_image(&config),
            build_placeholder_image(&other)
        );
    }

    #[test]
    fn encoded_scan_is_an_accepted_image() {
        let scan = build_placeholder_scan(&PlaceholderConfig {
            width: 16,
            height: 16,
            ..Default::default()
        })
        .unwrap();
        assert!(scan.validate().is_ok());
    }
}
