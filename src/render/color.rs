// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::From;
use std::fmt;

/// An 8-bit per channel RGB color, as stored in a [`ColorMap`][super::ColorMap].
///
/// This type can be formatted as a hex code using the standard formatting syntax. The formatted
/// output will have a leading '#'.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl From<&image::Rgb<u8>> for Color {
    fn from(pixel: &image::Rgb<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        image::Rgb(color.as_array())
    }
}

impl fmt::LowerHex for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            self.red(),
            self.green(),
            self.blue()
        )
    }
}

impl Color {
    /// Create a new [Color] with the given 8-bit color values.
    pub(crate) const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a color from channel intensities in the range 0.0 to 1.0.
    ///
    /// Each channel is scaled to 0-255, clamped, then truncated (not rounded).
    pub(crate) fn from_unit(red: f64, green: f64, blue: f64) -> Self {
        let scale = |channel: f64| -> u8 {
            // `f64::max` ignores NaN, so a NaN channel becomes 0.
            (channel * u8::MAX as f64).max(0.0).min(u8::MAX as f64) as u8
        };
        Self::new(scale(red), scale(green), scale(blue))
    }

    pub(crate) fn red(&self) -> u8 {
        self.red
    }

    pub(crate) fn green(&self) -> u8 {
        self.green
    }

    pub(crate) fn blue(&self) -> u8 {
        self.blue
    }

    /// The red, green, and blue components as a 3 element array.
    pub(crate) fn as_array(&self) -> [u8; 3] {
        [self.red(), self.green(), self.blue()]
    }
}
