// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::{ensure, Result};
use serde::Deserialize;

use std::net;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct StreamSettings {
    /// The address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "StreamSettings::default_address")]
    address: net::IpAddr,

    /// The port to bind the server to. Default to `9000`.
    #[serde(default = "StreamSettings::default_port")]
    port: u16,

    /// Milliseconds to wait after sending a frame to a viewer before sending the next one.
    #[serde(default = "StreamSettings::default_frame_interval")]
    pub(crate) frame_interval: u64,

    /// Milliseconds to wait before checking again when there is no frame to send.
    #[serde(default = "StreamSettings::default_idle_interval")]
    pub(crate) idle_interval: u64,

    /// The multipart boundary token.
    #[serde(default = "StreamSettings::default_boundary")]
    pub(crate) boundary: String,
}

impl StreamSettings {
    fn default_address() -> net::IpAddr {
        net::IpAddr::from([127u8, 0u8, 0u8, 1u8])
    }

    fn default_port() -> u16 {
        9000u16
    }

    fn default_frame_interval() -> u64 {
        50
    }

    fn default_idle_interval() -> u64 {
        100
    }

    fn default_boundary() -> String {
        "frame".to_string()
    }

    pub(crate) fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval)
    }

    pub(crate) fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(self.frame_interval > 0, "frame_interval must be at least 1ms");
        ensure!(self.idle_interval > 0, "idle_interval must be at least 1ms");
        ensure!(
            !self.boundary.is_empty()
                && self
                    .boundary
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "boundary must be a non-empty token of letters, digits, '-' or '_'"
        );
        Ok(())
    }
}

impl From<&StreamSettings> for net::SocketAddr {
    fn from(settings: &StreamSettings) -> Self {
        net::SocketAddr::new(settings.address, settings.port)
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
            port: Self::default_port(),
            frame_interval: Self::default_frame_interval(),
            idle_interval: Self::default_idle_interval(),
            boundary: Self::default_boundary(),
        }
    }
}

#[cfg(test)]
mod stream_test {
    use super::StreamSettings;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
    use std::time::Duration;

    #[test]
    fn default_settings() {
        let parsed: Result<StreamSettings, _> = toml::from_str("");
        assert!(parsed.is_ok(), "Failed to parse empty TOML");
        let parsed = parsed.unwrap();
        let expected = StreamSettings::default();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.frame_interval(), Duration::from_millis(50));
        assert_eq!(parsed.idle_interval(), Duration::from_millis(100));
        assert_eq!(parsed.boundary, "frame");
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn ipv4_wildcard_address() {
        let parsed: Result<StreamSettings, _> = toml::from_str("address = \"0.0.0.0\"");
        assert!(parsed.is_ok(), "Failed to parse IPv4 address");
        let parsed = parsed.unwrap();
        let expected = StreamSettings {
            address: IpAddr::from(Ipv4Addr::new(0, 0, 0, 0)),
            ..StreamSettings::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn ipv4_normal_address() {
        // Using an IP address from TEST-NET-1 (see RFC 5737)
        let parsed: Result<StreamSettings, _> = toml::from_str("address = \"192.0.2.20\"");
        assert!(parsed.is_ok(), "Failed to parse IPv4 address");
        let parsed = parsed.unwrap();
        let expected = StreamSettings {
            address: IpAddr::from(Ipv4Addr::new(192, 0, 2, 20)),
            ..StreamSettings::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn ipv6_local_address() {
        let parsed: Result<StreamSettings, _> = toml::from_str("address = \"::1\"");
        assert!(parsed.is_ok(), "Failed to parse IPv6 address");
        let parsed = parsed.unwrap();
        let expected = StreamSettings {
            address: IpAddr::from(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1)),
            ..StreamSettings::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn port() {
        let parsed: Result<StreamSettings, _> = toml::from_str("port = 1337");
        assert!(parsed.is_ok(), "Failed to parse port number");
        let parsed = parsed.unwrap();
        let expected = StreamSettings {
            port: 1337u16,
            ..StreamSettings::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn string_port() {
        let parsed: Result<StreamSettings, _> = toml::from_str("port = \"foo\"");
        assert!(parsed.is_err(), "Incorrectly parsed string as port number");
    }

    #[test]
    fn socket_address() {
        let settings = StreamSettings {
            port: 8000,
            ..StreamSettings::default()
        };
        let address: SocketAddr = (&settings).into();
        assert_eq!(address, "127.0.0.1:8000".parse().unwrap());
    }

    #[test]
    fn intervals() {
        let parsed: StreamSettings =
            toml::from_str("frame_interval = 100\nidle_interval = 250").unwrap();
        assert_eq!(parsed.frame_interval(), Duration::from_millis(100));
        assert_eq!(parsed.idle_interval(), Duration::from_millis(250));
    }

    #[test]
    fn zero_interval() {
        let parsed: StreamSettings = toml::from_str("frame_interval = 0").unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn bad_boundary() {
        let parsed: StreamSettings = toml::from_str("boundary = \"two words\"").unwrap();
        assert!(parsed.validate().is_err());
        let parsed: StreamSettings = toml::from_str("boundary = \"\"").unwrap();
        assert!(parsed.validate().is_err());
    }
}
