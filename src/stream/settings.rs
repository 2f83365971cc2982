// SPDX-License-Identifier: GPL-3.0-or-later
use serde::Deserialize;

use std::net;

/// Settings for the HTTP server the rendered heatmap is served from.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub(crate) struct StreamSettings {
    /// Whether to run the HTTP server at all.
    #[serde(default = "StreamSettings::default_enabled")]
    pub(crate) enabled: bool,

    /// The address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "StreamSettings::default_address")]
    address: net::IpAddr,

    /// The port to bind the server to. Defaults to `9000`.
    #[serde(default = "StreamSettings::default_port")]
    port: u16,

    #[serde(default)]
    pub(crate) mjpeg: MjpegSettings,
}

impl StreamSettings {
    fn default_enabled() -> bool {
        true
    }

    fn default_address() -> net::IpAddr {
        net::IpAddr::from([127u8, 0u8, 0u8, 1u8])
    }

    fn default_port() -> u16 {
        9000u16
    }

    pub(crate) fn bind_address(&self) -> net::SocketAddr {
        net::SocketAddr::new(self.address, self.port)
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            address: Self::default_address(),
            port: Self::default_port(),
            mjpeg: MjpegSettings::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub(crate) struct MjpegSettings {
    /// Whether or not the `/mjpeg` video stream should be served.
    #[serde(default = "MjpegSettings::default_enabled")]
    pub(crate) enabled: bool,

    /// JPEG quality, from 1 to 100.
    #[serde(default = "MjpegSettings::default_quality")]
    pub(crate) quality: u8,
}

impl MjpegSettings {
    fn default_enabled() -> bool {
        true
    }

    fn default_quality() -> u8 {
        75
    }
}

impl Default for MjpegSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            quality: Self::default_quality(),
        }
    }
}

#[cfg(test)]
mod stream_test {
    use super::{MjpegSettings, StreamSettings};
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

    #[test]
    fn default_settings() {
        let parsed: Result<StreamSettings, _> = toml::from_str("");
        assert!(parsed.is_ok(), "Failed to parse empty TOML");
        let parsed = parsed.unwrap();
        assert_eq!(parsed, StreamSettings::default());
        assert_eq!(
            parsed.bind_address(),
            SocketAddr::from((Ipv4Addr::new(127, 0, 0, 1), 9000))
        );
    }

    #[test]
    fn ipv4_wildcard_address() {
        let parsed: Result<StreamSettings, _> = toml::from_str("address = \"0.0.0.0\"");
        assert!(parsed.is_ok(), "Failed to parse IPv4 address");
        let expected = StreamSettings {
            address: IpAddr::from(Ipv4Addr::new(0, 0, 0, 0)),
            ..StreamSettings::default()
        };
        assert_eq!(parsed.unwrap(), expected);
    }

    #[test]
    fn ipv6_address() {
        // Using a documentation IP address (see RFC 3849)
        let parsed: Result<StreamSettings, _> =
            toml::from_str("address = \"2001:db8:dead:beef::1\"\nport = 8080");
        assert!(parsed.is_ok(), "Failed to parse IPv6 address");
        let parsed = parsed.unwrap();
        let ip = IpAddr::from(Ipv6Addr::new(0x2001, 0xdb8, 0xdead, 0xbeef, 0, 0, 0, 1));
        assert_eq!(parsed.bind_address(), SocketAddr::new(ip, 8080));
    }

    #[test]
    fn string_port() {
        let parsed: Result<StreamSettings, _> = toml::from_str("port = \"foo\"");
        assert!(parsed.is_err(), "Incorrectly parsed string as port number");
    }

    #[test]
    fn server_disabled() {
        let parsed: Result<StreamSettings, _> = toml::from_str("enabled = false");
        assert!(parsed.is_ok(), "Failed to parse enabled flag");
        assert!(!parsed.unwrap().enabled);
    }

    #[test]
    fn mjpeg_options() {
        let parsed: Result<StreamSettings, _> =
            toml::from_str("[mjpeg]\nenabled = false\nquality = 90");
        assert!(parsed.is_ok(), "Failed to parse MJPEG settings");
        let expected = StreamSettings {
            mjpeg: MjpegSettings {
                enabled: false,
                quality: 90,
            },
            ..StreamSettings::default()
        };
        assert_eq!(parsed.unwrap(), expected);
    }

    #[test]
    fn mjpeg_invalid() {
        let parsed: Result<StreamSettings, _> = toml::from_str("mjpeg.enabled = \"foo\"");
        assert!(
            parsed.is_err(),
            "Incorrectly parsed bad MJPEG configuration"
        );
    }
}
