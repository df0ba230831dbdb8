use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

macro_rules! integration_kinds {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Closed set of integration kinds the Platform brokers access to.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum IntegrationKind {
            $($variant),+
        }

        impl IntegrationKind {
            /// Every kind, in alphabetical order of its host-facing name.
            pub const ALL: &'static [IntegrationKind] = &[$(IntegrationKind::$variant),+];

            /// Host-facing name (the value of the `type` attribute).
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(IntegrationKind::$variant => $name),+
                }
            }
        }

        impl FromStr for IntegrationKind {
            type Err = ProviderError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(IntegrationKind::$variant),)+
                    other => Err(ProviderError::InvalidKind(other.to_owned())),
                }
            }
        }
    };
}

integration_kinds! {
    Aws => "aws",
    AwsDocumentDb => "awsdocumentdb",
    AwsRedshift => "awsredshift",
    AwsSecretsManager => "awssecretsmanager",
    ArubaInstantOn => "aruba_instant_on",
    ArubaSw => "aruba_sw",
    Azure => "azure",
    AzureActiveDirectory => "azureactivedirectory",
    AzureCosmosNoSql => "azurecosmosnosql",
    AzureSqlServer => "azuresqlserver",
    CiscoNgfw => "cisco_ngfw",
    ClickHouse => "clickhouse",
    CockroachDb => "cockroachdb",
    Coralogix => "coralogix",
    CustomSiemWebhook => "custom_siem_webhook",
    CustomIntegration => "customintegration",
    Datadog => "datadog",
    Elasticsearch => "elasticsearch",
    FortinetNgfw => "fortinet_ngfw",
    Gcp => "gcp",
    Google => "google",
    HpeSwitch => "hpe_switch",
    JumpCloud => "jumpcloud",
    Keyspaces => "keyspaces",
    Kubernetes => "kubernetes",
    MongoDb => "mongodb",
    MongoDbAtlas => "mongodb_atlas",
    MongoDbAwsSecretsManager => "mongodb_aws_secrets_manager",
    MsTeams => "msteams",
    MySql => "mysql",
    MySqlAwsSecretsManager => "mysql_aws_secrets_manager",
    Okta => "okta",
    OneLogin => "onelogin",
    PaloAltoNgfw => "paloalto_ngfw",
    Postgres => "postgres",
    PostgresAwsSecretsManager => "postgres_aws_secrets_manager",
    RabbitMq => "rabbitmq",
    RdpWindows => "rdp_windows",
    ServerList => "serverlist",
    Services => "services",
    Snowflake => "snowflake",
    SnowflakeAwsSecretsManager => "snowflake_aws_secrets_manager",
    Splunk => "splunk",
    SqlServer => "sql_server",
    SqlServerAwsSecretsManager => "sqlserver_aws_secrets_manager",
    Ssh => "ssh",
    Syslog => "syslog",
    YugabyteDb => "yugabytedb",
    ZeroTier => "zerotier",
}

impl IntegrationKind {
    /// Name sent as `integrationType`. Only `services` differs from the host-facing name.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Services => "servicelist",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
