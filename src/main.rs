// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context as _;
use metrics_exporter_prometheus::PrometheusBuilder;
use structopt::StructOpt;
use tracing::{debug, info, info_span};
use tracing_futures::Instrument;
use tracing_subscriber::EnvFilter;

use std::net::SocketAddr;

mod error;
mod feeds;
mod image_buffer;
mod ingest;
mod render;
mod server;
mod settings;
mod stats;
mod store;
mod stream;
mod util;

use crate::feeds::Feeds;
use crate::settings::{Args, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::from_args();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::load(&args)?;
    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("Unable to install the metrics recorder")?;
    debug!("metrics recorder installed");

    let feeds = Feeds::from_settings(&settings.ingest, &settings.render);
    let routes = server::routes(feeds, &settings.streams, metrics);
    let bind_address: SocketAddr = (&settings.streams).into();
    info!(address = %bind_address, "starting server");
    warp::serve(routes)
        .run(bind_address)
        .instrument(info_span!("warp_server"))
        .await;
    Ok(())
}
