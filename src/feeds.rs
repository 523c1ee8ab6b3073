// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::Bytes;
use tracing::{debug, trace, warn};

use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;

use crate::error::RenderError;
use crate::image_buffer::TemperatureMatrix;
use crate::ingest::{parse_thermal_readings, ImageValidator, IngestSettings};
use crate::render::{RenderSettings, ThermalRenderer};
use crate::stats::Stats;
use crate::store::FrameStore;
use crate::stream::{reencode_jpeg, FrameSource};

/// The two kinds of frames being relayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Feed {
    /// The plain camera image.
    Normal,

    /// The thermal sensor.
    Thermal,
}

impl Feed {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Thermal => "thermal",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry points for producers and viewers.
///
/// Everything shared lives behind an [`Arc`], so a clone can be handed to every connection.
#[derive(Clone, Debug)]
pub(crate) struct Feeds {
    store: Arc<FrameStore>,
    validator: ImageValidator,
    renderer: Arc<ThermalRenderer>,
    jpeg_quality: u8,
    stats: Arc<Stats>,
}

impl Feeds {
    pub(crate) fn new(
        store: Arc<FrameStore>,
        validator: ImageValidator,
        renderer: ThermalRenderer,
        jpeg_quality: u8,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            store,
            validator,
            renderer: Arc::new(renderer),
            jpeg_quality,
            stats,
        }
    }

    pub(crate) fn from_settings(ingest: &IngestSettings, render: &RenderSettings) -> Self {
        Self::new(
            Arc::new(FrameStore::default()),
            ImageValidator::from(ingest),
            ThermalRenderer::new(render),
            render.jpeg_quality,
            Arc::new(Stats::default()),
        )
    }

    pub(crate) fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    /// Store a new camera image if it passes validation.
    ///
    /// Rejected images leave the stored image untouched.
    pub(crate) fn submit_image(&self, payload: Bytes) -> bool {
        match self.validator.validate(&payload) {
            Ok(()) => {
                trace!(size = payload.len(), "accepted image");
                self.store.image.replace(payload);
                self.stats.record_accepted(Feed::Normal);
                true
            }
            Err(err) => {
                debug!(error = %err, "rejected image");
                self.stats.record_rejected(Feed::Normal);
                false
            }
        }
    }

    /// Store a new thermal frame if it has the right number of readings.
    pub(crate) fn submit_thermal_matrix(&self, readings: Vec<f32>) -> bool {
        match TemperatureMatrix::try_from(readings) {
            Ok(matrix) => {
                self.accept_thermal(matrix);
                true
            }
            Err(err) => {
                debug!(error = %err, "rejected thermal frame");
                self.stats.record_rejected(Feed::Thermal);
                false
            }
        }
    }

    /// Parse and store a JSON encoded thermal frame.
    pub(crate) fn submit_thermal_message(&self, text: &str) -> bool {
        match parse_thermal_readings(text) {
            Ok(readings) => self.submit_thermal_matrix(readings),
            Err(err) => {
                debug!(error = %err, "rejected thermal message");
                self.stats.record_rejected(Feed::Thermal);
                false
            }
        }
    }

    fn accept_thermal(&self, matrix: TemperatureMatrix) {
        trace!(dimensions = ?matrix.dimensions(), "accepted thermal frame");
        self.store.thermal.replace(matrix);
        self.stats.record_accepted(Feed::Thermal);
    }

    /// Re-encode the latest camera image as a JPEG.
    ///
    /// `Ok(None)` means no image has been received yet.
    pub(crate) fn next_image_frame(&self) -> Result<Option<Bytes>, RenderError> {
        self.store
            .image
            .latest()
            .map(|image| reencode_jpeg(&image, self.jpeg_quality))
            .transpose()
    }

    /// Render the latest thermal frame.
    ///
    /// `Ok(None)` means no thermal frame has been received yet.
    pub(crate) fn next_thermal_frame(&self) -> Result<Option<Bytes>, RenderError> {
        self.store
            .thermal
            .latest()
            .map(|matrix| self.renderer.render(matrix.readings()))
            .transpose()
    }

    /// The next frame to send for a feed, counting (and logging) any failures.
    pub(crate) fn next_frame(&self, feed: Feed) -> Result<Option<Bytes>, RenderError> {
        let result = match feed {
            Feed::Normal => self.next_image_frame(),
            Feed::Thermal => self.next_thermal_frame(),
        };
        if let Err(err) = &result {
            warn!(%feed, error = %err, "unable to render frame");
            self.stats.record_render_failure(feed);
        }
        result
    }

    /// A [`FrameSource`] for one of the feeds.
    pub(crate) fn source(&self, feed: Feed) -> FeedSource {
        FeedSource {
            feeds: self.clone(),
            feed,
        }
    }
}

#[cfg(test)]
impl Feeds {
    pub(crate) fn store(&self) -> &FrameStore {
        &self.store
    }

    pub(crate) fn renderer(&self) -> &ThermalRenderer {
        &self.renderer
    }

    pub(crate) fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

impl Default for Feeds {
    fn default() -> Self {
        Self::from_settings(&IngestSettings::default(), &RenderSettings::default())
    }
}

/// One feed of a [`Feeds`], as seen by the viewer loop.
#[derive(Clone, Debug)]
pub(crate) struct FeedSource {
    feeds: Feeds,
    feed: Feed,
}

impl FrameSource for FeedSource {
    fn feed(&self) -> Feed {
        self.feed
    }

    fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.feeds.stats)
    }

    fn next_frame(&self) -> Result<Option<Bytes>, RenderError> {
        self.feeds.next_frame(self.feed)
    }
}

#[cfg(test)]
mod feeds_test {
    use super::{Feed, Feeds};
    use crate::ingest::ingest_test::noise_png;
    use crate::stream::reencode_jpeg;
    use bytes::Bytes;

    #[test]
    fn empty_feeds() {
        let feeds = Feeds::default();
        assert_eq!(feeds.next_frame(Feed::Normal).unwrap(), None);
        assert_eq!(feeds.next_frame(Feed::Thermal).unwrap(), None);
        assert_eq!(feeds.stats().snapshot().normal.render_failures, 0);
    }

    #[test]
    fn accepts_image() {
        let feeds = Feeds::default();
        let png = Bytes::from(noise_png(10));
        assert!(feeds.submit_image(png.clone()));
        assert_eq!(&feeds.store().image.latest().unwrap()[..], &png[..]);
        let frame = feeds.next_image_frame().unwrap().unwrap();
        assert_eq!(frame, reencode_jpeg(&png, feeds.jpeg_quality()).unwrap());
        assert_eq!(feeds.stats().snapshot().normal.accepted, 1);
    }

    #[test]
    fn rejected_image_keeps_previous() {
        let feeds = Feeds::default();
        let png = Bytes::from(noise_png(11));
        assert!(feeds.submit_image(png.clone()));
        assert!(!feeds.submit_image(png.slice(..4999)));
        assert!(!feeds.submit_image(Bytes::from(vec![7u8; 6000])));
        assert_eq!(&feeds.store().image.latest().unwrap()[..], &png[..]);
        let stats = feeds.stats().snapshot();
        assert_eq!(stats.normal.accepted, 1);
        assert_eq!(stats.normal.rejected, 2);
    }

    #[test]
    fn accepts_thermal_frame() {
        let feeds = Feeds::default();
        assert!(feeds.submit_thermal_matrix(vec![35.0; 768]));
        let frame = feeds.next_thermal_frame().unwrap().unwrap();
        assert_eq!(frame, feeds.renderer().render(&vec![35.0; 768]).unwrap());
    }

    #[test]
    fn rejects_wrong_sized_thermal_frames() {
        let feeds = Feeds::default();
        assert!(!feeds.submit_thermal_matrix(vec![35.0; 767]));
        assert!(!feeds.submit_thermal_matrix(vec![35.0; 769]));
        assert!(feeds.store().thermal.is_empty());
        assert!(feeds.submit_thermal_matrix(vec![35.0; 768]));
        assert!(!feeds.submit_thermal_matrix(vec![40.0; 769]));
        let stored = feeds.store().thermal.latest().unwrap();
        assert!(stored.readings().iter().all(|t| *t == 35.0));
        assert_eq!(feeds.stats().snapshot().thermal.rejected, 3);
    }

    #[test]
    fn thermal_message() {
        let feeds = Feeds::default();
        assert!(!feeds.submit_thermal_message("garbage"));
        let text = serde_json::to_string(&vec![30.5f32; 768]).unwrap();
        assert!(feeds.submit_thermal_message(&text));
        assert!(feeds.next_thermal_frame().unwrap().is_some());
        let stats = feeds.stats().snapshot();
        assert_eq!(stats.thermal.accepted, 1);
        assert_eq!(stats.thermal.rejected, 1);
    }

    #[test]
    fn rejects_wrong_sized_thermal_messages() {
        let feeds = Feeds::default();
        for length in [0usize, 767, 769].iter() {
            let text = serde_json::to_string(&vec![30.0f32; *length]).unwrap();
            assert!(!feeds.submit_thermal_message(&text));
        }
        assert!(feeds.store().thermal.is_empty());
        let stats = feeds.stats().snapshot();
        assert_eq!(stats.thermal.accepted, 0);
        assert_eq!(stats.thermal.rejected, 3);
    }

    #[test]
    fn feeds_are_independent() {
        let feeds = Feeds::default();
        let png = Bytes::from(noise_png(12));
        assert!(feeds.submit_image(png.clone()));
        assert!(feeds.submit_thermal_matrix(vec![30.0; 768]));
        assert!(feeds.submit_thermal_matrix(vec![40.0; 768]));
        assert_eq!(&feeds.store().image.latest().unwrap()[..], &png[..]);
        assert!(feeds.submit_image(Bytes::from(noise_png(13))));
        let stored = feeds.store().thermal.latest().unwrap();
        assert!(stored.readings().iter().all(|t| *t == 40.0));
    }

    #[test]
    fn feed_names() {
        assert_eq!(Feed::Normal.to_string(), "normal");
        assert_eq!(Feed::Thermal.as_str(), "thermal");
    }
}
