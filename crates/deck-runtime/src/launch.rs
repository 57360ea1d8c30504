//! Launch parameters passed by the host.
//!
//! The host spawns every plugin as
//! `<binary> -port <u16> -pluginUUID <id> -registerEvent <name> -info <json>`.
//! Those single-dash long flags are the host's contract, not ours, and no
//! argv-parsing crate expresses them, so the four flags are matched by
//! hand. The info blob stays an opaque string.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("missing required flag {0}")]
    MissingFlag(&'static str),
    #[error("flag {0} expects a value")]
    MissingValue(String),
    #[error("invalid port `{value}`: {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },
    #[error("unrecognized argument `{0}`")]
    Unrecognized(String),
}

/// The four startup parameters supplied by the host at launch.
#[derive(Debug, Clone)]
pub struct LaunchArgs {
    /// WebSocket port on the local loopback.
    pub port: u16,
    /// Identity to register under.
    pub plugin_uuid: String,
    /// Event name to use in the registration frame.
    pub register_event: String,
    /// Opaque host/environment description, as received.
    pub info: String,
}

impl LaunchArgs {
    /// Parse from the process arguments (without the binary name).
    pub fn from_env() -> Result<Self, LaunchError> {
        Self::parse(std::env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut port = None;
        let mut plugin_uuid = None;
        let mut register_event = None;
        let mut info = None;

        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            if flag == "-port" {
                let value = args.next().ok_or(LaunchError::MissingValue(flag))?;
                port = Some(
                    value
                        .parse()
                        .map_err(|source| LaunchError::InvalidPort { value, source })?,
                );
            } else if flag == "-pluginUUID" {
                plugin_uuid = Some(args.next().ok_or(LaunchError::MissingValue(flag))?);
            } else if flag == "-registerEvent" {
                register_event = Some(args.next().ok_or(LaunchError::MissingValue(flag))?);
            } else if flag == "-info" {
                info = Some(args.next().ok_or(LaunchError::MissingValue(flag))?);
            } else {
                return Err(LaunchError::Unrecognized(flag));
            }
        }

        Ok(Self {
            port: port.ok_or(LaunchError::MissingFlag("-port"))?,
            plugin_uuid: plugin_uuid.ok_or(LaunchError::MissingFlag("-pluginUUID"))?,
            register_event: register_event.ok_or(LaunchError::MissingFlag("-registerEvent"))?,
            info: info.ok_or(LaunchError::MissingFlag("-info"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_the_host_launch_line() {
        let args = LaunchArgs::parse(argv(&[
            "-port",
            "28196",
            "-pluginUUID",
            "com.example.volume",
            "-registerEvent",
            "registerPlugin",
            "-info",
            "{\"application\":{}}",
        ]))
        .unwrap();
        assert_eq!(args.port, 28196);
        assert_eq!(args.plugin_uuid, "com.example.volume");
        assert_eq!(args.register_event, "registerPlugin");
        assert_eq!(args.info, "{\"application\":{}}");
    }

    #[test]
    fn flag_order_does_not_matter() {
        let args = LaunchArgs::parse(argv(&[
            "-info",
            "{}",
            "-registerEvent",
            "registerPlugin",
            "-port",
            "9000",
            "-pluginUUID",
            "com.example.volume",
        ]))
        .unwrap();
        assert_eq!(args.port, 9000);
    }

    #[test]
    fn missing_flag_is_reported() {
        let err = LaunchArgs::parse(argv(&[
            "-port",
            "9000",
            "-pluginUUID",
            "com.example.volume",
            "-info",
            "{}",
        ]))
        .unwrap_err();
        assert!(matches!(err, LaunchError::MissingFlag("-registerEvent")));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = LaunchArgs::parse(argv(&["-port", "not-a-port"])).unwrap_err();
        assert!(matches!(err, LaunchError::InvalidPort { .. }));
    }

    #[test]
    fn trailing_flag_without_value_is_reported() {
        let err = LaunchArgs::parse(argv(&["-port", "9000", "-info"])).unwrap_err();
        assert!(matches!(err, LaunchError::MissingValue(flag) if flag == "-info"));
    }

    #[test]
    fn unknown_flag_is_reported() {
        let err = LaunchArgs::parse(argv(&["--port", "9000"])).unwrap_err();
        assert!(matches!(err, LaunchError::Unrecognized(flag) if flag == "--port"));
    }
}
