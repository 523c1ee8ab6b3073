// SPDX-License-Identifier: GPL-3.0-or-later
use std::error::Error as StdError;
use std::fmt;

/// A temperature matrix did not have the number of readings the sensor produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct InvalidFrameShape {
    pub(crate) expected: usize,
    pub(crate) actual: usize,
}

impl fmt::Display for InvalidFrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} temperature readings, got {}",
            self.expected, self.actual
        )
    }
}

impl StdError for InvalidFrameShape {}

/// Errors turning a stored frame into an encoded image.
#[derive(Debug)]
pub(crate) enum RenderError {
    InvalidFrameShape(InvalidFrameShape),

    /// The stored image could not be decoded.
    Decode(image::ImageError),

    /// The image crate's JPEG encoder failed.
    Encode(image::ImageError),

    /// Any other encoder failure.
    Encoder(&'static str),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFrameShape(e) => write!(f, "invalid frame shape: {}", e),
            Self::Decode(e) => write!(f, "unable to decode stored image: {}", e),
            Self::Encode(e) => write!(f, "unable to encode JPEG: {}", e),
            Self::Encoder(msg) => write!(f, "unable to encode JPEG: {}", msg),
        }
    }
}

impl StdError for RenderError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidFrameShape(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Encoder(_) => None,
        }
    }
}

impl From<InvalidFrameShape> for RenderError {
    fn from(e: InvalidFrameShape) -> Self {
        Self::InvalidFrameShape(e)
    }
}

/// Reasons an inbound payload was refused.
#[derive(Debug)]
pub(crate) enum IngestError {
    /// The payload was not larger than the minimum image size.
    TooSmall { size: usize, minimum: usize },

    /// The image header claims more pixels than are allowed to be decoded.
    TooLarge { width: u32, height: u32, maximum: u64 },

    /// The payload is not an image in a supported format.
    Undecodable(image::ImageError),

    /// The payload was not a JSON array of numbers.
    Malformed(serde_json::Error),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { size, minimum } => write!(
                f,
                "payload of {} bytes is not larger than the {} byte minimum",
                size, minimum
            ),
            Self::TooLarge {
                width,
                height,
                maximum,
            } => write!(
                f,
                "{}x{} image is over the {} pixel limit",
                width, height, maximum
            ),
            Self::Undecodable(e) => write!(f, "payload is not a supported image: {}", e),
            Self::Malformed(e) => write!(f, "malformed thermal payload: {}", e),
        }
    }
}

impl StdError for IngestError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::TooSmall { .. } | Self::TooLarge { .. } => None,
            Self::Undecodable(e) => Some(e),
            Self::Malformed(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e)
    }
}
