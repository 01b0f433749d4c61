use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::AppError;

/// Resolve an image reference to its raw bytes.
///
/// References are either `http(s)` URLs (fetched) or local paths (read
/// from disk), matching the two submission styles the product supports.
pub async fn fetch_image_bytes(
    client: &reqwest::Client,
    image_ref: &str,
) -> Result<Vec<u8>, AppError> {
    if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
        let response = client
            .get(image_ref)
            .send()
            .await
            .map_err(|e| AppError::Input(format!("Failed to fetch image: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Input(format!(
                "Image fetch answered with status {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Input(format!("Failed to read image body: {e}")))?;
        Ok(bytes.to_vec())
    } else {
        tokio::fs::read(image_ref)
            .await
            .map_err(|e| AppError::Input(format!("Failed to read image file: {e}")))
    }
}

/// Decode raw bytes into an RGB raster.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, AppError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| AppError::Input(format!("Image could not be decoded: {e}")))?;
    Ok(image.into_rgb8())
}

/// Expand a single-channel mask to RGB for capabilities that expect
/// three-channel input.
pub fn gray_to_rgb(mask: &GrayImage) -> RgbImage {
    DynamicImage::ImageLuma8(mask.clone()).into_rgb8()
}
