// SPDX-License-Identifier: GPL-3.0-or-later
//! Counters for everything that happens to a feed.
//!
//! Each counter is kept locally (so it can be inspected through [`Stats::snapshot`]) and also
//! forwarded to the global [`metrics`] recorder, labelled by feed.
use metrics::{counter, gauge};
use serde::Serialize;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::feeds::Feed;

#[derive(Debug, Default)]
pub(crate) struct FeedStats {
    accepted: AtomicU64,
    rejected: AtomicU64,
    render_failures: AtomicU64,
    frames_sent: AtomicU64,
    viewers: AtomicU64,
}

impl FeedStats {
    fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            render_failures: self.render_failures.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            viewers: self.viewers.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct FeedSnapshot {
    /// Payloads that passed validation and replaced the stored frame.
    pub(crate) accepted: u64,

    /// Payloads that were dropped by validation.
    pub(crate) rejected: u64,

    /// Stored frames that could not be turned into a JPEG.
    pub(crate) render_failures: u64,

    /// Multipart segments handed to viewers.
    pub(crate) frames_sent: u64,

    /// Currently connected viewers.
    pub(crate) viewers: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct StatsSnapshot {
    pub(crate) normal: FeedSnapshot,
    pub(crate) thermal: FeedSnapshot,
}

#[derive(Debug, Default)]
pub(crate) struct Stats {
    normal: FeedStats,
    thermal: FeedStats,
}

impl Stats {
    fn feed(&self, feed: Feed) -> &FeedStats {
        match feed {
            Feed::Normal => &self.normal,
            Feed::Thermal => &self.thermal,
        }
    }

    pub(crate) fn record_accepted(&self, feed: Feed) {
        self.feed(feed).accepted.fetch_add(1, Ordering::Relaxed);
        counter!("frames_accepted_total", "feed" => feed.as_str()).increment(1);
    }

    pub(crate) fn record_rejected(&self, feed: Feed) {
        self.feed(feed).rejected.fetch_add(1, Ordering::Relaxed);
        counter!("frames_rejected_total", "feed" => feed.as_str()).increment(1);
    }

    pub(crate) fn record_render_failure(&self, feed: Feed) {
        self.feed(feed)
            .render_failures
            .fetch_add(1, Ordering::Relaxed);
        counter!("render_failures_total", "feed" => feed.as_str()).increment(1);
    }

    pub(crate) fn record_frame_sent(&self, feed: Feed) {
        self.feed(feed).frames_sent.fetch_add(1, Ordering::Relaxed);
        counter!("frames_sent_total", "feed" => feed.as_str()).increment(1);
    }

    pub(crate) fn viewer_connected(&self, feed: Feed) {
        self.feed(feed).viewers.fetch_add(1, Ordering::Relaxed);
        gauge!("viewers", "feed" => feed.as_str()).increment(1.0);
    }

    pub(crate) fn viewer_disconnected(&self, feed: Feed) {
        self.feed(feed).viewers.fetch_sub(1, Ordering::Relaxed);
        gauge!("viewers", "feed" => feed.as_str()).decrement(1.0);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            normal: self.normal.snapshot(),
            thermal: self.thermal.snapshot(),
        }
    }
}

#[cfg(test)]
mod stats_test {
    use super::{FeedSnapshot, Stats};
    use crate::feeds::Feed;

    #[test]
    fn counts_per_feed() {
        let stats = Stats::default();
        stats.record_accepted(Feed::Thermal);
        stats.record_rejected(Feed::Thermal);
        stats.record_rejected(Feed::Thermal);
        stats.record_render_failure(Feed::Normal);
        let snapshot = stats.snapshot();
        assert_eq!(
            snapshot.thermal,
            FeedSnapshot {
                accepted: 1,
                rejected: 2,
                ..FeedSnapshot::default()
            }
        );
        assert_eq!(snapshot.normal.render_failures, 1);
        assert_eq!(snapshot.normal.accepted, 0);
    }

    #[test]
    fn viewer_gauge() {
        let stats = Stats::default();
        stats.viewer_connected(Feed::Normal);
        stats.viewer_connected(Feed::Normal);
        stats.viewer_disconnected(Feed::Normal);
        assert_eq!(stats.snapshot().normal.viewers, 1);
    }

    #[test]
    fn serializes() {
        let stats = Stats::default();
        stats.record_frame_sent(Feed::Normal);
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["normal"]["frames_sent"], 1);
        assert_eq!(json["thermal"]["viewers"], 0);
    }
}
