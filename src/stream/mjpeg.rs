// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::{BufMut, Bytes, BytesMut};

/// Frames JPEG images as parts of a `multipart/x-mixed-replace` body.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MjpegFramer {
    boundary: String,
}

impl MjpegFramer {
    pub(crate) fn new(boundary: &str) -> Self {
        Self {
            boundary: boundary.to_string(),
        }
    }

    pub(crate) fn content_type(&self) -> String {
        format!("multipart/x-mixed-replace; boundary={}", self.boundary)
    }

    /// Wrap one encoded JPEG image in a multipart segment.
    pub(crate) fn segment(&self, jpeg: &[u8]) -> Bytes {
        let header = format!("--{}\r\nContent-Type: image/jpeg\r\n\r\n", self.boundary);
        let mut segment = BytesMut::with_capacity(header.len() + jpeg.len() + 2);
        segment.put_slice(header.as_bytes());
        segment.put_slice(jpeg);
        segment.put_slice(b"\r\n");
        segment.freeze()
    }
}

#[cfg(test)]
mod mjpeg_test {
    use super::MjpegFramer;

    #[test]
    fn content_type() {
        let framer = MjpegFramer::new("frame");
        assert_eq!(
            framer.content_type(),
            "multipart/x-mixed-replace; boundary=frame"
        );
    }

    #[test]
    fn segment_layout() {
        let framer = MjpegFramer::new("frame");
        let segment = framer.segment(&[0xFF, 0xD8, 0xFF, 0xD9]);
        let mut expected = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
        expected.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xD9]);
        expected.extend_from_slice(b"\r\n");
        assert_eq!(&segment[..], &expected[..]);
    }
}
