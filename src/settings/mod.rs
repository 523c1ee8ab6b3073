// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::{bail, Context as _};
use serde::Deserialize;
use tracing::{debug, info};

use std::fs;
use std::io;
use std::path::Path;

mod cli;

use crate::ingest::IngestSettings;
use crate::render::RenderSettings;
use crate::stream::StreamSettings;
pub(crate) use cli::Args;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Settings {
    /// Settings related to the HTTP server and the video streams.
    pub(crate) streams: StreamSettings,

    /// Checks applied to frames coming in from producers.
    pub(crate) ingest: IngestSettings,

    /// Settings related to how thermal frames are rendered.
    pub(crate) render: RenderSettings,
}

impl Settings {
    /// Load settings from the file given on the command line.
    ///
    /// If no path was given and `config.toml` does not exist, the defaults are used.
    pub(crate) fn load(args: &Args) -> anyhow::Result<Self> {
        let settings = match &args.config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(cli::DEFAULT_CONFIG_PATH);
                match fs::read_to_string(default_path) {
                    Ok(data) => Self::from_toml(&data).with_context(|| {
                        format!("Unable to parse {}", default_path.display())
                    })?,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {
                        info!("no configuration file found, using defaults");
                        Self::default()
                    }
                    Err(err) => {
                        return Err(err).with_context(|| {
                            format!("Unable to read {}", default_path.display())
                        })
                    }
                }
            }
        };
        settings.validate()?;
        debug!(?settings, "loaded settings");
        Ok(settings)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            bail!("Config file {} does not exist", path.display());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Unable to read {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("Unable to parse {}", path.display()))
    }

    pub(crate) fn from_toml(data: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(data)?)
    }

    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        self.streams
            .validate()
            .context("Invalid [streams] settings")?;
        self.ingest.validate().context("Invalid [ingest] settings")?;
        self.render.validate().context("Invalid [render] settings")?;
        Ok(())
    }
}
