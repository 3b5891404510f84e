//! Serialization options.

use serde::{Deserialize, Serialize};

/// Largest transaction the ledger accepts: 1280 byte IPv6 MTU minus the
/// 40 byte IP header and 8 byte UDP header.
pub const PACKET_DATA_SIZE: usize = 1280 - 40 - 8;

/// How [`Transaction::serialize`](crate::Transaction::serialize) treats
/// incomplete or suspicious signature tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeConfig {
    /// Fail on an empty signature slot. Turning this off writes all-zero
    /// placeholders, for multisig drafts passed between co-signers.
    pub require_all_signatures: bool,
    /// Reject present signatures that do not verify against the message.
    pub verify_signatures: bool,
    pub max_packet_size: usize,
}

impl SerializeConfig {
    /// Partially signed output: empty slots become zero placeholders.
    pub fn partial() -> Self {
        Self {
            require_all_signatures: false,
            ..Self::default()
        }
    }
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            require_all_signatures: true,
            verify_signatures: true,
            max_packet_size: PACKET_DATA_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_size_is_1232() {
        assert_eq!(PACKET_DATA_SIZE, 1232);
        assert_eq!(SerializeConfig::default().max_packet_size, 1232);
    }

    #[test]
    fn defaults_are_strict() {
        let config = SerializeConfig::default();
        assert!(config.require_all_signatures);
        assert!(config.verify_signatures);
        assert!(!SerializeConfig::partial().require_all_signatures);
    }

    #[test]
    fn missing_json_fields_take_defaults() {
        let config: SerializeConfig =
            serde_json::from_str(r#"{ "require_all_signatures": false }"#).unwrap();
        assert_eq!(
            config,
            SerializeConfig {
                require_all_signatures: false,
                verify_signatures: true,
                max_packet_size: PACKET_DATA_SIZE,
            }
        );
    }
}
