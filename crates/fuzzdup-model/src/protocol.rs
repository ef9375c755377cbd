use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Network transport used by a locally started cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain TCP between workers.
    #[default]
    Tcp,
    /// UCX transport; the only one that can be restricted to NVLink.
    Ucx,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Ucx => "ucx",
        }
    }

    /// Whether a local cluster on this transport can run NVLink-only.
    #[inline]
    pub fn supports_nvlink(&self) -> bool {
        matches!(self, Protocol::Ucx)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ucx_supports_nvlink() {
        assert!(!Protocol::Tcp.supports_nvlink());
        assert!(Protocol::Ucx.supports_nvlink());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Protocol::Ucx).unwrap(), "\"ucx\"");
        let back: Protocol = serde_json::from_str("\"tcp\"").unwrap();
        assert_eq!(back, Protocol::Tcp);
    }

    #[test]
    fn parses_from_cli_value() {
        assert_eq!(Protocol::from_str("ucx", true).unwrap(), Protocol::Ucx);
        assert!(Protocol::from_str("rdma", true).is_err());
    }
}
