// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use bytes::Bytes;
use image::{imageops, RgbImage};
use tracing::{debug, instrument, trace};

use super::color_map::{ColorMap, HEATMAP};
use super::resize::Resizer;
use super::settings::RenderSettings;
use crate::error::RenderError;
use crate::image_buffer::{check_frame_shape, SENSOR_HEIGHT, SENSOR_WIDTH};
use crate::stream::encode_jpeg;

/// Linearly map `x` from one range to another. The result is not clamped.
pub(crate) fn map_value(x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Turns temperature matrices into false-color JPEG images.
///
/// The color map is built once when the renderer is created and shared (read-only) between every
/// render after that.
#[derive(Clone, Debug)]
pub(crate) struct ThermalRenderer {
    color_map: Arc<ColorMap>,
    min_temperature: f64,
    max_temperature: f64,
    resizer: Resizer,
    jpeg_quality: u8,
}

impl ThermalRenderer {
    pub(crate) fn new(settings: &RenderSettings) -> Self {
        let color_map = ColorMap::new(settings.color_depth, &HEATMAP, 1.0);
        debug!(
            colors = color_map.len(),
            min = settings.min_temperature,
            max = settings.max_temperature,
            "created thermal renderer"
        );
        Self {
            color_map: Arc::new(color_map),
            min_temperature: settings.min_temperature as f64,
            max_temperature: settings.max_temperature as f64,
            resizer: Resizer::new(settings.scale, settings.scaling_method),
            jpeg_quality: settings.jpeg_quality,
        }
    }

    /// Find the color map index for a temperature.
    ///
    /// Temperatures outside of the configured range saturate to the nearest end of the map.
    pub(crate) fn color_index(&self, temperature: f32) -> usize {
        let max_index = self.color_map.max_index() as f64;
        let index = map_value(
            temperature as f64,
            self.min_temperature,
            self.max_temperature,
            0.0,
            max_index,
        );
        // `f64::max` ignores NaN, so unreadable pixels end up at the cold end.
        index.max(0.0).min(max_index) as usize
    }

    /// Map each reading to a color, producing an image the same size as the sensor.
    ///
    /// The image is flipped vertically, as the sensor's rows are stored bottom-up relative to how
    /// they should be displayed.
    pub(crate) fn colorize(&self, readings: &[f32]) -> Result<RgbImage, RenderError> {
        check_frame_shape(readings)?;
        let mut colors = RgbImage::new(SENSOR_WIDTH, SENSOR_HEIGHT);
        for (temperature, pixel) in readings.iter().zip(colors.pixels_mut()) {
            *pixel = self.color_map[self.color_index(*temperature)].into();
        }
        trace!("mapped temperatures to colors");
        imageops::flip_vertical_in_place(&mut colors);
        Ok(colors)
    }

    /// Colorize, enlarge, and JPEG encode a frame of temperatures.
    #[instrument(level = "trace", skip(self, readings), fields(readings = readings.len()))]
    pub(crate) fn render(&self, readings: &[f32]) -> Result<Bytes, RenderError> {
        let colors = self.colorize(readings)?;
        let enlarged = self.resizer.enlarge(&colors);
        encode_jpeg(&enlarged, self.jpeg_quality)
    }
}

impl Default for ThermalRenderer {
    fn default() -> Self {
        Self::new(&RenderSettings::default())
    }
}
