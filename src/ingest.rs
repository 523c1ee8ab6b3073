// SPDX-License-Identifier: GPL-3.0-or-later
//! Checks applied to inbound payloads before they are allowed into the [`FrameStore`].
//!
//! [`FrameStore`]: crate::store::FrameStore
use anyhow::{ensure, Result};
use image::io::Reader as ImageReader;
use serde::Deserialize;
use tracing::instrument;

use std::io::Cursor;

use crate::error::IngestError;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub(crate) struct IngestSettings {
    /// Images must be strictly larger than this many bytes.
    #[serde(default = "IngestSettings::default_minimum_image_size")]
    pub(crate) minimum_image_size: usize,

    /// Images whose header claims more pixels than this are refused without being decoded.
    #[serde(default = "IngestSettings::default_maximum_pixels")]
    pub(crate) maximum_pixels: u64,
}

impl IngestSettings {
    fn default_minimum_image_size() -> usize {
        5000
    }

    /// Twice Pillow's `MAX_IMAGE_PIXELS`, where it gives up on an image as a decompression bomb.
    fn default_maximum_pixels() -> u64 {
        178_956_970
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(self.maximum_pixels > 0, "maximum_pixels must be at least 1");
        Ok(())
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            minimum_image_size: Self::default_minimum_image_size(),
            maximum_pixels: Self::default_maximum_pixels(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ImageValidator {
    minimum_size: usize,
    maximum_pixels: u64,
}

impl ImageValidator {
    pub(crate) fn new(minimum_size: usize, maximum_pixels: u64) -> Self {
        Self {
            minimum_size,
            maximum_pixels,
        }
    }

    /// Accept a payload if it is large enough and decodes as an image.
    ///
    /// The size check comes first, so small payloads are never decoded. Only the header is read
    /// before the pixel limit is checked, so oversized images are never decoded either.
    #[instrument(level = "trace", skip(payload), fields(size = payload.len()))]
    pub(crate) fn validate(&self, payload: &[u8]) -> Result<(), IngestError> {
        if payload.len() <= self.minimum_size {
            return Err(IngestError::TooSmall {
                size: payload.len(),
                minimum: self.minimum_size,
            });
        }
        let (width, height) = ImageReader::new(Cursor::new(payload))
            .with_guessed_format()
            .map_err(|err| IngestError::Undecodable(err.into()))?
            .into_dimensions()
            .map_err(IngestError::Undecodable)?;
        if u64::from(width) * u64::from(height) > self.maximum_pixels {
            return Err(IngestError::TooLarge {
                width,
                height,
                maximum: self.maximum_pixels,
            });
        }
        image::load_from_memory(payload).map_err(IngestError::Undecodable)?;
        Ok(())
    }
}

impl From<&IngestSettings> for ImageValidator {
    fn from(settings: &IngestSettings) -> Self {
        Self::new(settings.minimum_image_size, settings.maximum_pixels)
    }
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::from(&IngestSettings::default())
    }
}

/// Parse a JSON array of temperatures.
///
/// Anything other than a flat array of numbers is refused. The number of readings is checked when
/// they are turned into a [`TemperatureMatrix`].
///
/// [`TemperatureMatrix`]: crate::image_buffer::TemperatureMatrix
pub(crate) fn parse_thermal_readings(text: &str) -> Result<Vec<f32>, IngestError> {
    Ok(serde_json::from_str(text)?)
}
