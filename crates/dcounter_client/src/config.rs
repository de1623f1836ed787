//! # Client Configuration
//!
//! Startup configuration, loadable from an external TOML file. Every
//! field has a default matching the deployed contract, so an absent or
//! empty config file yields the production setup.

use alloy_primitives::Address;
use serde::Deserialize;

use dcounter_contract::{ContractBinding, COUNTER_ADDRESS};

use crate::error::{ClientError, ClientResult};
use crate::sync::DEFAULT_MARKER_MESSAGE;

/// Client startup configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Contract address to bind, as a hex string.
    pub contract_address: String,
    /// Message written by the set-initial-number flow.
    pub marker_message: String,
    /// Capacity of the session event channel.
    pub event_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            contract_address: COUNTER_ADDRESS.to_string(),
            marker_message: DEFAULT_MARKER_MESSAGE.to_string(),
            event_buffer: 64,
        }
    }
}

impl AppConfig {
    /// Parses a TOML document. Unknown keys are rejected.
    pub fn from_toml_str(raw: &str) -> ClientResult<Self> {
        toml::from_str(raw).map_err(|error| ClientError::InvalidConfig(error.to_string()))
    }

    /// Builds the contract binding for the configured address.
    pub fn binding(&self) -> ClientResult<ContractBinding> {
        let address: Address = self
            .contract_address
            .parse()
            .map_err(|error| ClientError::InvalidConfig(format!("bad contract address: {error}")))?;
        Ok(ContractBinding::counter().with_address(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_bind_the_deployment() {
        let config = AppConfig::default();
        let binding = config.binding().unwrap();
        assert_eq!(binding.address(), COUNTER_ADDRESS);
        assert_eq!(config.marker_message, DEFAULT_MARKER_MESSAGE);
    }

    #[test]
    fn test_empty_toml_is_the_default() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides() {
        let raw = r#"
            contract_address = "0x00000000000000000000000000000000000000aa"
            marker_message = "seeded"
        "#;
        let config = AppConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.marker_message, "seeded");
        assert_eq!(
            config.binding().unwrap().address(),
            Address::with_last_byte(0xaa)
        );
    }

    #[test]
    fn test_bad_address_is_invalid_config() {
        let config = AppConfig {
            contract_address: "not-an-address".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.binding(),
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("gas_limit = 21000"),
            Err(ClientError::InvalidConfig(_))
        ));
    }
}
