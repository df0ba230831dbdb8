//! Integration registry.
//!
//! Each [`IntegrationKind`] owns a static schema: an ordered list of [`Field`]s, each naming the
//! YAML key the Platform expects and where its value comes from in the host's attribute bag.
//! [`build`] is the single entry point; it is pure and never touches the network.
//!
//! Rules applied while building:
//! - absent attributes become empty strings unless the field is required;
//! - certificate and key material marked [`Source::Trimmed`] loses surrounding whitespace;
//! - [`Source::JoinedLines`] joins a list of strings with single newlines, keeping order;
//! - [`Source::Choice`] rejects values outside its closed set before any request is made.

mod cloud;
mod compute;
mod databases;
mod identity;
mod kind;
mod network;
mod observability;

pub use kind::IntegrationKind;

use serde_yaml::{Mapping, Value};

use crate::attributes::AttributeBag;
use crate::error::{ProviderError, ProviderResult};
use crate::validation;

/// Where a field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A scalar attribute, copied verbatim.
    Attr(&'static str),
    /// A scalar attribute with leading and trailing whitespace removed.
    Trimmed(&'static str),
    /// A scalar attribute restricted to a closed set.
    Choice(&'static str, &'static [&'static str]),
    /// A fixed value.
    Constant(&'static str),
    /// A list of strings joined with `\n`.
    JoinedLines(&'static str),
    /// `true` when the attribute is absent or empty.
    IsEmpty(&'static str),
}

/// One entry of a kind's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub source: Source,
    pub required: bool,
}

impl Field {
    /// `key ← attribute`.
    pub const fn attr(key: &'static str, attribute: &'static str) -> Self {
        Self { key, source: Source::Attr(attribute), required: false }
    }

    /// Key and attribute share a name.
    pub const fn same(key: &'static str) -> Self {
        Self::attr(key, key)
    }

    pub const fn trimmed(key: &'static str, attribute: &'static str) -> Self {
        Self { key, source: Source::Trimmed(attribute), required: false }
    }

    pub const fn choice(
        key: &'static str,
        attribute: &'static str,
        allowed: &'static [&'static str],
    ) -> Self {
        Self { key, source: Source::Choice(attribute, allowed), required: false }
    }

    pub const fn constant(key: &'static str, value: &'static str) -> Self {
        Self { key, source: Source::Constant(value), required: false }
    }

    pub const fn joined(key: &'static str, attribute: &'static str) -> Self {
        Self { key, source: Source::JoinedLines(attribute), required: false }
    }

    pub const fn is_empty(key: &'static str, attribute: &'static str) -> Self {
        Self { key, source: Source::IsEmpty(attribute), required: false }
    }

    /// Reject the build when the value is empty.
    pub const fn required(self) -> Self {
        Self { key: self.key, source: self.source, required: true }
    }

    /// Host attribute this field reads, if any.
    pub fn attribute(&self) -> Option<&'static str> {
        match self.source {
            Source::Attr(a)
            | Source::Trimmed(a)
            | Source::Choice(a, _)
            | Source::JoinedLines(a)
            | Source::IsEmpty(a) => Some(a),
            Source::Constant(_) => None,
        }
    }

    fn resolve(&self, attributes: &AttributeBag) -> ProviderResult<Value> {
        let value = match self.source {
            Source::Attr(attribute) => attributes.string(attribute)?,
            Source::Trimmed(attribute) => attributes.string(attribute)?.trim().to_owned(),
            Source::Choice(attribute, allowed) => {
                let value = attributes.string(attribute)?;
                validation::choice(attribute, &value, allowed)?;
                value
            }
            Source::Constant(value) => value.to_owned(),
            Source::JoinedLines(attribute) => {
                if self.required && !attributes.contains(attribute) {
                    return Err(ProviderError::invalid_attribute(
                        attribute,
                        "must be a list of strings",
                    ));
                }
                attributes.string_list(attribute)?.join("\n")
            }
            Source::IsEmpty(attribute) => {
                return Ok(Value::Bool(attributes.string(attribute)?.is_empty()));
            }
        };

        if self.required && value.is_empty() {
            let attribute = self.attribute().unwrap_or(self.key);
            return Err(ProviderError::invalid_attribute(attribute, "must not be empty"));
        }
        Ok(Value::String(value))
    }
}

/// Every kind starts with its name.
pub(crate) const NAME: Field = Field::same("name").required();

impl IntegrationKind {
    /// Ordered payload schema for this kind.
    pub fn schema(&self) -> &'static [Field] {
        use IntegrationKind::*;
        match self {
            CockroachDb | YugabyteDb => databases::COCKROACHDB,
            Postgres => databases::POSTGRES,
            MySql | SqlServer | ClickHouse | AwsRedshift => databases::SQL,
            AwsDocumentDb => databases::AWS_DOCUMENTDB,
            AzureSqlServer => databases::AZURE_SQL_SERVER,
            MongoDb => databases::MONGODB,
            MongoDbAtlas => databases::MONGODB_ATLAS,
            Elasticsearch => databases::ELASTICSEARCH,
            RabbitMq => databases::RABBITMQ,
            Snowflake => databases::SNOWFLAKE,
            Keyspaces => databases::KEYSPACES,
            AzureCosmosNoSql => databases::AZURE_COSMOS_NOSQL,
            PostgresAwsSecretsManager => databases::POSTGRES_AWS_SECRETS_MANAGER,
            MySqlAwsSecretsManager | SqlServerAwsSecretsManager => {
                databases::SQL_AWS_SECRETS_MANAGER
            }
            MongoDbAwsSecretsManager => databases::MONGODB_AWS_SECRETS_MANAGER,
            SnowflakeAwsSecretsManager => databases::SNOWFLAKE_AWS_SECRETS_MANAGER,
            Aws | AwsSecretsManager => cloud::AWS,
            Azure => cloud::AZURE,
            Gcp => cloud::GCP,
            AzureActiveDirectory => identity::AZURE_ACTIVE_DIRECTORY,
            Google => identity::GOOGLE,
            Okta => identity::OKTA,
            OneLogin => identity::ONELOGIN,
            JumpCloud => identity::JUMPCLOUD,
            ZeroTier => network::ZEROTIER,
            ArubaInstantOn => network::ARUBA_INSTANT_ON,
            ArubaSw | HpeSwitch | CiscoNgfw => network::SWITCH,
            FortinetNgfw | PaloAltoNgfw => network::FIREWALL_API,
            Coralogix => observability::CORALOGIX,
            CustomSiemWebhook => observability::CUSTOM_SIEM_WEBHOOK,
            Datadog => observability::DATADOG,
            Splunk => observability::SPLUNK,
            Syslog => observability::SYSLOG,
            MsTeams => observability::MSTEAMS,
            Kubernetes => compute::KUBERNETES,
            Ssh => compute::SSH,
            RdpWindows => compute::RDP_WINDOWS,
            ServerList => compute::SERVERLIST,
            Services => compute::SERVICES,
            CustomIntegration => compute::CUSTOM_INTEGRATION,
        }
    }
}

/// Typed configuration for one integration, ready to be serialised.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationConfig {
    kind: IntegrationKind,
    fields: Mapping,
}

impl IntegrationConfig {
    pub fn kind(&self) -> IntegrationKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Top-level keys in payload order.
    pub fn keys(&self) -> Vec<&str> {
        self.fields.keys().filter_map(Value::as_str).collect()
    }

    /// YAML document carried in the `config` field of resource requests.
    pub fn to_yaml(&self) -> ProviderResult<String> {
        Ok(serde_yaml::to_string(&self.fields)?)
    }
}

/// Build the payload for `kind` from the host's attributes.
pub fn build(
    kind: IntegrationKind,
    attributes: &AttributeBag,
) -> ProviderResult<IntegrationConfig> {
    let mut fields = Mapping::new();
    for field in kind.schema() {
        fields.insert(Value::String(field.key.to_owned()), field.resolve(attributes)?);
    }
    Ok(IntegrationConfig { kind, fields })
}

/// Parse the host's `type` attribute, then [`build`].
pub fn build_named(kind: &str, attributes: &AttributeBag) -> ProviderResult<IntegrationConfig> {
    build(kind.parse()?, attributes)
}
