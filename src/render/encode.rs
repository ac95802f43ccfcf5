//! Raster image encoding

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, RgbaImage};

use super::error::RenderResult;

/// An encoded page or thumbnail
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// JPEG bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PageImage {
    pub const MIME: &'static str = "image/jpeg";

    /// `data:image/jpeg;base64,...` for direct use as an `<img>` source
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            Self::MIME,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// Encode an RGBA raster as JPEG at `quality` (1-100)
///
/// JPEG carries no alpha, so transparent areas are composited over white,
/// the way a page looks on paper.
pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> RenderResult<PageImage> {
    let (width, height) = img.dimensions();
    let flattened = flatten_on_white(img);

    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
    flattened.write_with_encoder(encoder)?;

    Ok(PageImage {
        data: output,
        width,
        height,
    })
}

fn flatten_on_white(img: &RgbaImage) -> RgbImage {
    let (width, height) = img.dimensions();
    let mut out = RgbImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }

    out
}
