// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::{ensure, Result};
use serde::Deserialize;

use super::color_map::DEFAULT_COLOR_DEPTH;
use super::resize::Method;
use crate::stream::DEFAULT_QUALITY;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub(crate) struct RenderSettings {
    /// Temperatures at or below this (in degrees Celsius) get the first color of the color map.
    #[serde(default = "RenderSettings::default_min_temperature")]
    pub(crate) min_temperature: f32,

    /// Temperatures at or above this (in degrees Celsius) get the last color of the color map.
    #[serde(default = "RenderSettings::default_max_temperature")]
    pub(crate) max_temperature: f32,

    /// How many distinct colors the color map has.
    #[serde(default = "RenderSettings::default_color_depth")]
    pub(crate) color_depth: usize,

    /// The factor each dimension of the sensor image is enlarged by.
    #[serde(default = "RenderSettings::default_scale")]
    pub(crate) scale: u32,

    #[serde(default)]
    pub(crate) scaling_method: Method,

    #[serde(default = "RenderSettings::default_jpeg_quality")]
    pub(crate) jpeg_quality: u8,
}

impl RenderSettings {
    fn default_min_temperature() -> f32 {
        25.0
    }

    fn default_max_temperature() -> f32 {
        45.0
    }

    fn default_color_depth() -> usize {
        DEFAULT_COLOR_DEPTH
    }

    fn default_scale() -> u32 {
        10
    }

    fn default_jpeg_quality() -> u8 {
        DEFAULT_QUALITY
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.min_temperature < self.max_temperature,
            "min_temperature ({}) must be less than max_temperature ({})",
            self.min_temperature,
            self.max_temperature
        );
        ensure!(self.color_depth > 0, "color_depth must be at least 1");
        ensure!(self.scale > 0, "scale must be at least 1");
        ensure!(
            (1..=100).contains(&self.jpeg_quality),
            "jpeg_quality must be between 1 and 100, not {}",
            self.jpeg_quality
        );
        Ok(())
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            min_temperature: Self::default_min_temperature(),
            max_temperature: Self::default_max_temperature(),
            color_depth: Self::default_color_depth(),
            scale: Self::default_scale(),
            scaling_method: Method::default(),
            jpeg_quality: Self::default_jpeg_quality(),
        }
    }
}
