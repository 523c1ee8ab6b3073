// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::{BufMut, Bytes, BytesMut};
use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::{ColorType, RgbImage};
use tracing::trace;

#[cfg(feature = "mozjpeg")]
use mozjpeg::{ColorSpace, Compress};

use crate::error::RenderError;

/// Quality used when nothing else is configured.
pub(crate) const DEFAULT_QUALITY: u8 = 75;

#[cfg(feature = "mozjpeg")]
fn encode_jpeg_mozjpeg(image: &RgbImage, quality: u8) -> Result<Bytes, RenderError> {
    trace!("using mozjpeg to encode JPEG image");
    // To make it simpler to use from blocking tasks, we're creating a fresh encoder each time
    // this function is called. A little less efficient, but much easier to use.
    let mut jpeg_encoder = Compress::new(ColorSpace::JCS_RGB);
    jpeg_encoder.set_fastest_defaults();
    jpeg_encoder.set_quality(quality as f32);
    jpeg_encoder.set_mem_dest();
    jpeg_encoder.set_size(image.width() as usize, image.height() as usize);
    jpeg_encoder.start_compress();
    // Hope write_scanlines can process everything in one go.
    if !jpeg_encoder.write_scanlines(image.as_raw()) {
        return Err(RenderError::Encoder("mozjpeg did not accept all scanlines"));
    }
    jpeg_encoder.finish_compress();
    jpeg_encoder
        .data_to_vec()
        .map(Bytes::from)
        .map_err(|_| RenderError::Encoder("mozjpeg did not produce any data"))
}

fn encode_jpeg_image(image: &RgbImage, quality: u8) -> Result<Bytes, RenderError> {
    trace!("using image crate to encode JPEG image");
    let mut jpeg_buf = BytesMut::new().writer();
    let mut encoder = ImageJpegEncoder::new_with_quality(&mut jpeg_buf, quality);
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgb8,
        )
        .map_err(RenderError::Encode)?;
    Ok(jpeg_buf.into_inner().freeze())
}

#[cfg(not(feature = "mozjpeg"))]
pub(crate) fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Bytes, RenderError> {
    encode_jpeg_image(image, quality)
}

#[cfg(feature = "mozjpeg")]
pub(crate) fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Bytes, RenderError> {
    // The image crate is the fallback if mozjpeg trips over something.
    encode_jpeg_mozjpeg(image, quality).or_else(|_| encode_jpeg_image(image, quality))
}

/// Decode an image in any supported format and encode it again as a JPEG.
///
/// Any alpha channel is dropped, as JPEG has no way to represent it.
pub(crate) fn reencode_jpeg(data: &[u8], quality: u8) -> Result<Bytes, RenderError> {
    let decoded = image::load_from_memory(data).map_err(RenderError::Decode)?;
    encode_jpeg(&decoded.to_rgb8(), quality)
}
