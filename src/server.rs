// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::Bytes;
use futures::future::FutureExt;
use futures::stream::StreamExt;
use http::header::CONTENT_TYPE;
use http::Response;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::spawn_blocking;
use tracing::{debug, info, info_span, trace, warn};
use tracing_futures::Instrument;
use warp::ws::{WebSocket, Ws};
use warp::{Filter, Rejection, Reply};

use std::convert::Infallible;

use crate::feeds::{Feed, FeedSource, Feeds};
use crate::stream::{Broadcaster, StreamSettings};
use crate::util::flatten_join_result;

/// All of the HTTP and WebSocket routes.
pub(crate) fn routes(
    feeds: Feeds,
    settings: &StreamSettings,
    metrics: PrometheusHandle,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    producer_route(Feed::Normal, feeds.clone())
        .or(producer_route(Feed::Thermal, feeds.clone()))
        .or(viewer_route(Feed::Normal, &feeds, settings))
        .or(viewer_route(Feed::Thermal, &feeds, settings))
        .or(stats_route(feeds))
        .or(metrics_route(metrics))
}

fn with_feeds(feeds: Feeds) -> impl Filter<Extract = (Feeds,), Error = Infallible> + Clone {
    warp::any().map(move || feeds.clone())
}

/// `/normal` and `/thermal` take frames from producers over a WebSocket.
fn producer_route(
    feed: Feed,
    feeds: Feeds,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path(feed.as_str())
        .and(warp::path::end())
        .and(warp::ws())
        .and(with_feeds(feeds))
        .map(move |ws: Ws, feeds: Feeds| {
            ws.on_upgrade(move |socket| {
                receive_frames(feed, socket, feeds).instrument(info_span!("producer", %feed))
            })
        })
}

/// `/normal_stream` and `/thermal_stream` send MJPEG to viewers.
fn viewer_route(
    feed: Feed,
    feeds: &Feeds,
    settings: &StreamSettings,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let broadcaster: Broadcaster<FeedSource> =
        Broadcaster::with_settings(feeds.source(feed), settings);
    warp::path(format!("{}_stream", feed))
        .and(warp::path::end())
        .and(warp::get())
        .map(move || {
            Response::builder()
                .status(200)
                .header(CONTENT_TYPE, broadcaster.content_type())
                .body(broadcaster.body())
        })
}

fn stats_route(feeds: Feeds) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("stats")
        .and(warp::path::end())
        .and(warp::get())
        .map(move || warp::reply::json(&feeds.stats().snapshot()))
}

fn metrics_route(
    handle: PrometheusHandle,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .map(move || handle.render())
}

/// Hand every frame from a producer connection to the feed until the connection closes.
async fn receive_frames(feed: Feed, mut socket: WebSocket, feeds: Feeds) {
    info!("producer connected");
    while let Some(message) = socket.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "producer connection error");
                break;
            }
        };
        if message.is_close() {
            break;
        }
        match feed {
            Feed::Normal if message.is_binary() => {
                let payload = Bytes::from(message.into_bytes());
                let feeds = feeds.clone();
                // Decoding the image to validate it can take a while.
                let submitted = spawn_blocking(move || {
                    Ok::<_, Infallible>(feeds.submit_image(payload))
                })
                .map(flatten_join_result)
                .await;
                if let Err(err) = submitted {
                    warn!(error = %err, "image validation task failed");
                    break;
                }
            }
            Feed::Thermal if message.is_text() => {
                if let Ok(text) = message.to_str() {
                    feeds.submit_thermal_message(text);
                }
            }
            _ => trace!(?message, "ignoring message"),
        }
    }
    debug!(stats = ?feeds.stats().snapshot(), "connection finished");
    info!("producer disconnected");
}
