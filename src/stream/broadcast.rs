// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::Bytes;
use futures::future::FutureExt;
use futures::stream::{self, Stream, StreamExt};
use hyper::Body;
use tokio::task::spawn_blocking;
use tokio::time::{sleep, Duration};
use tracing::{debug, debug_span, trace};
use tracing_futures::Instrument;

use std::sync::Arc;

use super::mjpeg::MjpegFramer;
use super::settings::StreamSettings;
use crate::error::RenderError;
use crate::feeds::Feed;
use crate::stats::Stats;
use crate::util::flatten_join_result;

/// Something a viewer can pull encoded JPEG frames from.
///
/// `next_frame` may block (decoding and encoding images), so it is always called from a blocking
/// task.
pub(crate) trait FrameSource: Send + Sync + 'static {
    fn feed(&self) -> Feed;

    fn stats(&self) -> Arc<Stats>;

    /// The current frame, or `Ok(None)` if there is nothing to show yet.
    fn next_frame(&self) -> Result<Option<Bytes>, RenderError>;
}

/// Serves a [`FrameSource`] to any number of viewers as an MJPEG stream.
///
/// Every viewer runs its own loop, so a slow viewer only slows itself down.
#[derive(Debug)]
pub(crate) struct Broadcaster<S> {
    source: Arc<S>,
    framer: MjpegFramer,
    frame_interval: Duration,
    idle_interval: Duration,
}

impl<S> Clone for Broadcaster<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            framer: self.framer.clone(),
            frame_interval: self.frame_interval,
            idle_interval: self.idle_interval,
        }
    }
}

impl<S: FrameSource> Broadcaster<S> {
    pub(crate) fn new(
        source: S,
        framer: MjpegFramer,
        frame_interval: Duration,
        idle_interval: Duration,
    ) -> Self {
        Self {
            source: Arc::new(source),
            framer,
            frame_interval,
            idle_interval,
        }
    }

    pub(crate) fn with_settings(source: S, settings: &StreamSettings) -> Self {
        Self::new(
            source,
            MjpegFramer::new(&settings.boundary),
            settings.frame_interval(),
            settings.idle_interval(),
        )
    }

    pub(crate) fn content_type(&self) -> String {
        self.framer.content_type()
    }

    /// An endless stream of multipart segments for a single viewer.
    ///
    /// Nothing is yielded until the source has a frame. The viewer is counted as connected until
    /// the stream is dropped.
    pub(crate) fn viewer_stream(&self) -> impl Stream<Item = Bytes> + Send + 'static {
        let feed = self.source.feed();
        let stats = self.source.stats();
        stats.viewer_connected(feed);
        debug!(%feed, "viewer connected");
        let viewer = Viewer {
            source: Arc::clone(&self.source),
            framer: self.framer.clone(),
            frame_interval: self.frame_interval,
            idle_interval: self.idle_interval,
            pending_delay: None,
            _connection: ViewerGuard { feed, stats },
        };
        stream::unfold(viewer, Viewer::next_segment)
    }

    /// A response body streaming to a single viewer.
    pub(crate) fn body(&self) -> Body {
        let span = debug_span!("viewer", feed = %self.source.feed());
        let result_stream = self
            .viewer_stream()
            .instrument(span)
            .map(Result::<Bytes, hyper::http::Error>::Ok);
        Body::wrap_stream(result_stream)
    }
}

/// Decrements the viewer count when a viewer's stream goes away.
#[derive(Debug)]
struct ViewerGuard {
    feed: Feed,
    stats: Arc<Stats>,
}

impl Drop for ViewerGuard {
    fn drop(&mut self) {
        self.stats.viewer_disconnected(self.feed);
        debug!(feed = %self.feed, "viewer disconnected");
    }
}

struct Viewer<S> {
    source: Arc<S>,
    framer: MjpegFramer,
    frame_interval: Duration,
    idle_interval: Duration,
    /// How long to wait before looking for the next frame.
    pending_delay: Option<Duration>,
    _connection: ViewerGuard,
}

impl<S: FrameSource> Viewer<S> {
    async fn next_segment(mut self) -> Option<(Bytes, Self)> {
        loop {
            if let Some(delay) = self.pending_delay.take() {
                sleep(delay).await;
            }
            let source = Arc::clone(&self.source);
            let frame = spawn_blocking(move || source.next_frame())
                .map(flatten_join_result)
                .await;
            match frame {
                Ok(Some(jpeg)) => {
                    self.pending_delay = Some(self.frame_interval);
                    let feed = self.source.feed();
                    self.source.stats().record_frame_sent(feed);
                    trace!(%feed, size = jpeg.len(), "sending frame");
                    let segment = self.framer.segment(&jpeg);
                    return Some((segment, self));
                }
                Ok(None) => {
                    self.pending_delay = Some(self.idle_interval);
                }
                Err(err) => {
                    // Already counted by the source, just skip this frame.
                    debug!(error = %err, "skipping frame");
                    self.pending_delay = Some(self.frame_interval);
                }
            }
        }
    }
}
