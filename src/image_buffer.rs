// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;

use image::{ImageBuffer, Luma};

use crate::error::InvalidFrameShape;

/// Width of the thermal sensor, in pixels.
pub(crate) const SENSOR_WIDTH: u32 = 32;

/// Height of the thermal sensor, in pixels.
pub(crate) const SENSOR_HEIGHT: u32 = 24;

/// Number of readings in one thermal frame.
pub(crate) const SENSOR_PIXELS: usize = (SENSOR_WIDTH * SENSOR_HEIGHT) as usize;

/// Images where each point is a temperature in degrees Celsius.
pub(crate) type ThermalImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Check that a slice of readings is exactly one sensor frame.
pub(crate) fn check_frame_shape(readings: &[f32]) -> Result<(), InvalidFrameShape> {
    if readings.len() == SENSOR_PIXELS {
        Ok(())
    } else {
        Err(InvalidFrameShape {
            expected: SENSOR_PIXELS,
            actual: readings.len(),
        })
    }
}

/// One full frame from the thermal sensor, row-major with the origin in the sensor's top left.
///
/// The only way to build one is through [`TryFrom`], so a `TemperatureMatrix` always holds
/// exactly [`SENSOR_PIXELS`] readings.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TemperatureMatrix(ThermalImage);

impl TemperatureMatrix {
    pub(crate) fn readings(&self) -> &[f32] {
        self.0.as_raw()
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

impl TryFrom<Vec<f32>> for TemperatureMatrix {
    type Error = InvalidFrameShape;

    fn try_from(readings: Vec<f32>) -> Result<Self, Self::Error> {
        check_frame_shape(&readings)?;
        let actual = readings.len();
        ImageBuffer::from_raw(SENSOR_WIDTH, SENSOR_HEIGHT, readings)
            .map(Self)
            .ok_or(InvalidFrameShape {
                expected: SENSOR_PIXELS,
                actual,
            })
    }
}
