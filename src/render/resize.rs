// SPDX-License-Identifier: GPL-3.0-or-later
use image::{imageops, RgbImage};
use serde::Deserialize;
use tracing::trace;

/// Different resizing methods
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Method {
    /// Nearest neighbor sampling.
    Nearest,

    /// Triangle (aka linear) sampling.
    #[serde(alias = "linear")]
    Triangle,

    /// Catmull-Rom (aka bicubic) sampling.
    #[serde(alias = "bicubic")]
    CatmullRom,

    /// Gaussian sampling.
    Gaussian,

    /// Lanczos sampling with a window size of 3.
    #[serde(alias = "lanczos")]
    Lanczos3,
}

impl Default for Method {
    fn default() -> Self {
        Self::CatmullRom
    }
}

/// Enlarges a small image by an integer factor.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Resizer {
    /// Each source pixel becomes a `scale` sized square. Much faster than running a filter.
    Point(u32),

    /// Resample with one of the [`image::imageops`] filters.
    Filter {
        scale: u32,
        filter_type: imageops::FilterType,
    },
}

impl Resizer {
    pub(crate) fn new(scale: u32, method: Method) -> Self {
        let filter_type = match method {
            Method::Nearest => return Self::Point(scale),
            Method::Triangle => imageops::Triangle,
            Method::CatmullRom => imageops::CatmullRom,
            Method::Gaussian => imageops::Gaussian,
            Method::Lanczos3 => imageops::Lanczos3,
        };
        Self::Filter { scale, filter_type }
    }

    pub(crate) fn scale(&self) -> u32 {
        match self {
            Self::Point(scale) => *scale,
            Self::Filter { scale, .. } => *scale,
        }
    }

    pub(crate) fn enlarge(&self, colors: &RgbImage) -> RgbImage {
        let scale = self.scale();
        let new_width = colors.width() * scale;
        let new_height = colors.height() * scale;
        trace!(
            source_width = colors.width(),
            source_height = colors.height(),
            new_width,
            new_height,
            "enlarging image"
        );
        match self {
            Self::Point(_) => RgbImage::from_fn(new_width, new_height, |x, y| {
                *colors.get_pixel(x / scale, y / scale)
            }),
            Self::Filter { filter_type, .. } => {
                imageops::resize(colors, new_width, new_height, *filter_type)
            }
        }
    }
}

#[cfg(test)]
mod resize_test {
    use super::{Method, Resizer};
    use image::{Rgb, RgbImage};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        method: Method,
    }

    fn parse(name: &str) -> Result<Method, toml::de::Error> {
        toml::from_str::<Wrapper>(&format!("method = \"{}\"", name)).map(|w| w.method)
    }

    #[test]
    fn method_names() {
        assert_eq!(parse("nearest").unwrap(), Method::Nearest);
        assert_eq!(parse("linear").unwrap(), Method::Triangle);
        assert_eq!(parse("bicubic").unwrap(), Method::CatmullRom);
        assert_eq!(parse("catmull_rom").unwrap(), Method::CatmullRom);
        assert_eq!(parse("lanczos").unwrap(), Method::Lanczos3);
        assert!(parse("mitchell").is_err());
    }

    #[test]
    fn default_is_bicubic() {
        assert_eq!(Method::default(), Method::CatmullRom);
    }

    #[test]
    fn point_resize() {
        let mut source = RgbImage::new(2, 1);
        source.put_pixel(0, 0, Rgb([255, 0, 0]));
        source.put_pixel(1, 0, Rgb([0, 0, 255]));
        let resized = Resizer::new(3, Method::Nearest).enlarge(&source);
        assert_eq!(resized.dimensions(), (6, 3));
        assert_eq!(resized.get_pixel(2, 2), &Rgb([255, 0, 0]));
        assert_eq!(resized.get_pixel(3, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn bicubic_dimensions() {
        let source = RgbImage::from_pixel(32, 24, Rgb([10, 20, 30]));
        let resized = Resizer::new(10, Method::CatmullRom).enlarge(&source);
        assert_eq!(resized.dimensions(), (320, 240));
    }

    #[test]
    fn uniform_stays_uniform() {
        let color = Rgb([0, 2, 47]);
        let source = RgbImage::from_pixel(32, 24, color);
        let resized = Resizer::new(10, Method::CatmullRom).enlarge(&source);
        for pixel in resized.pixels() {
            for (actual, expected) in pixel.0.iter().zip(color.0.iter()) {
                assert!((*actual as i16 - *expected as i16).abs() <= 1);
            }
        }
    }
}
