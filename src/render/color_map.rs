// SPDX-License-Identifier: GPL-3.0-or-later
use std::ops::Index;

use tracing::{debug, instrument};

use super::color::Color;

/// A control point of a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ColorStop {
    /// Where along the gradient this stop sits, from 0.0 to 1.0.
    pub(crate) position: f64,

    /// Red, green and blue intensities, each from 0.0 to 1.0.
    pub(crate) color: [f64; 3],
}

impl ColorStop {
    pub(crate) const fn new(position: f64, color: [f64; 3]) -> Self {
        Self { position, color }
    }
}

/// Black, through blue, green, red and yellow to white.
pub(crate) const HEATMAP: [ColorStop; 7] = [
    ColorStop::new(0.00, [0.0, 0.0, 0.0]),
    ColorStop::new(0.20, [0.0, 0.0, 0.5]),
    ColorStop::new(0.40, [0.0, 0.5, 0.0]),
    ColorStop::new(0.60, [0.5, 0.0, 0.0]),
    ColorStop::new(0.80, [0.75, 0.75, 0.0]),
    ColorStop::new(0.90, [1.0, 0.75, 0.0]),
    ColorStop::new(1.00, [1.0, 1.0, 1.0]),
];

/// Number of entries in the default color map.
pub(crate) const DEFAULT_COLOR_DEPTH: usize = 1000;

fn gaussian(x: f64, amplitude: f64, mean: f64, std_dev: f64) -> f64 {
    amplitude * (-(x - mean).powi(2) / (2.0 * std_dev.powi(2))).exp()
}

/// Compute the color at `x` (from 0 to `width`) of a gradient.
///
/// Every stop contributes a Gaussian bump to each channel, centered on the stop's position and
/// with a standard deviation of `width / (spread * stops.len())`. Summing the bumps gives smooth
/// transitions even between closely spaced stops.
pub(crate) fn gradient(x: f64, width: f64, stops: &[ColorStop], spread: f64) -> Color {
    let std_dev = width / (spread * stops.len() as f64);
    let channel = |channel: usize| -> f64 {
        stops
            .iter()
            .map(|stop| gaussian(x, stop.color[channel], stop.position * width, std_dev))
            .sum()
    };
    Color::from_unit(channel(0), channel(1), channel(2))
}

/// A precomputed lookup table from an index to a color.
///
/// A color map is immutable once built, so it can be shared between threads freely.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ColorMap(Vec<Color>);

impl ColorMap {
    /// Build a color map with `depth` entries from a set of gradient stops.
    #[instrument(level = "debug", skip(stops))]
    pub(crate) fn new(depth: usize, stops: &[ColorStop], spread: f64) -> Self {
        let width = depth as f64;
        let colors: Vec<Color> = (0..depth)
            .map(|index| gradient(index as f64, width, stops, spread))
            .collect();
        if let (Some(first), Some(last)) = (colors.first(), colors.last()) {
            debug!(
                first = %format!("{:x}", first),
                last = %format!("{:x}", last),
                "built color map"
            );
        }
        Self(colors)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// The highest valid index, or 0 for an empty map.
    pub(crate) fn max_index(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR_DEPTH, &HEATMAP, 1.0)
    }
}

impl Index<usize> for ColorMap {
    type Output = Color;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
