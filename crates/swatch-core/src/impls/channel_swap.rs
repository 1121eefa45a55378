//! ChannelSwap - 赤と緑のチャネルを入れ替える変換

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::SwatchError;
use crate::ports::ImageTransform;

/// Swaps red and green, keeps blue, forces full opacity. Output is PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelSwap;

impl ChannelSwap {
    pub fn swap(image: &RgbaImage) -> RgbaImage {
        let mut canvas = RgbaImage::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            let [r, g, b, _a] = pixel.0;
            canvas.put_pixel(x, y, image::Rgba([g, r, b, 255]));
        }
        canvas
    }
}

impl ImageTransform for ChannelSwap {
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, SwatchError> {
        let decoded = image::load_from_memory(input)
            .map_err(|e| SwatchError::MalformedInput(format!("image decode: {e}")))?
            .to_rgba8();

        let swapped = Self::swap(&decoded);

        let mut out = Vec::new();
        swapped
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(|e| SwatchError::MalformedInput(format!("png encode: {e}")))?;
        Ok(out)
    }
}
