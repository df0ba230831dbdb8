use std::sync::Arc;

use adaptive_provider::testing::PlatformMock;
use adaptive_provider::{
    AttributeBag, InstantSleeper, OperationContext, Provider, ProviderConfig, ProviderOptions,
    ResourceData,
};

pub const TOKEN: &str = "svc-token";
pub const WORKSPACE: &str = "https://acme.example";

/// Options with every real wait removed.
pub fn options() -> ProviderOptions {
    ProviderOptions::default().with_sleeper(Arc::new(InstantSleeper))
}

pub fn provider(mock: &PlatformMock) -> Provider {
    provider_with(mock, options())
}

pub fn provider_with(mock: &PlatformMock, options: ProviderOptions) -> Provider {
    let config = ProviderConfig::from_parts(TOKEN, Some(WORKSPACE)).expect("config");
    Provider::with_transport(config, Arc::new(mock.clone()), options).expect("provider")
}

pub fn ctx() -> OperationContext {
    OperationContext::new()
}

pub fn data(attributes: AttributeBag) -> ResourceData {
    ResourceData::new(attributes)
}

pub fn existing(id: &str, attributes: AttributeBag) -> ResourceData {
    ResourceData::with_id(id, attributes)
}

/// Parse a YAML config string into ordered `(key, value)` pairs.
pub fn yaml_pairs(config: &str) -> Vec<(String, serde_yaml::Value)> {
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(config).expect("yaml");
    mapping
        .into_iter()
        .map(|(k, v)| (k.as_str().expect("string key").to_owned(), v))
        .collect()
}
