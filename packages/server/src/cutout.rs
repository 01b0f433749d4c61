use std::io::Cursor;

use image::{GrayImage, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Which side of the thresholded mask survives into the cut-out.
///
/// Both policies shipped at different points in the product's history, so
/// the choice stays an explicit knob instead of a constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CutoutMode {
    /// Invert the mask and keep the dark (high-confidence) pixels, rendered
    /// in shades of the inverted intensity.
    DarkKeep,
    /// Keep pixels at or above the threshold, rendered solid black.
    WhiteKeep,
}

impl CutoutMode {
    pub fn default_threshold(self) -> u8 {
        match self {
            Self::DarkKeep => 128,
            Self::WhiteKeep => 80,
        }
    }
}

/// Threshold a single-channel mask into a transparent RGBA cut-out.
///
/// Pure: same mask, mode and threshold always produce the same image.
/// Output dimensions equal input dimensions; dropped pixels carry alpha 0.
pub fn cutout(mask: &GrayImage, mode: CutoutMode, threshold: u8) -> RgbaImage {
    let mut out = RgbaImage::new(mask.width(), mask.height());
    for (x, y, pixel) in mask.enumerate_pixels() {
        let v = pixel.0[0];
        let rgba = match mode {
            CutoutMode::DarkKeep => {
                let inverted = 255 - v;
                let alpha = if inverted < threshold { 255 } else { 0 };
                Rgba([inverted, inverted, inverted, alpha])
            }
            CutoutMode::WhiteKeep => {
                let alpha = if v >= threshold { 255 } else { 0 };
                Rgba([0, 0, 0, alpha])
            }
        };
        out.put_pixel(x, y, rgba);
    }
    out
}

/// Encode a cut-out as PNG for storage.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
