//! Databases, warehouses and their AWS Secrets Manager variants.

use super::{Field, NAME};
use crate::validation::SSL_MODE_CHOICES;

pub(super) const COCKROACHDB: &[Field] = &[
    NAME,
    Field::same("username"),
    Field::same("password"),
    Field::attr("databaseName", "database_name"),
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::choice("sslMode", "ssl_mode", SSL_MODE_CHOICES),
    Field::trimmed("rootCert", "root_cert"),
];

pub(super) const POSTGRES: &[Field] = &[
    NAME,
    Field::same("username"),
    Field::same("password"),
    Field::attr("databaseName", "database_name"),
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::choice("sslMode", "ssl_mode", SSL_MODE_CHOICES),
    Field::trimmed("rootCert", "root_cert"),
    Field::attr("crtText", "tls_cert_file"),
    Field::attr("keyText", "tls_key_file"),
];

/// mysql, sql_server, clickhouse and awsredshift.
pub(super) const SQL: &[Field] = &[
    NAME,
    Field::same("username"),
    Field::same("password"),
    Field::attr("databaseName", "database_name"),
    Field::attr("hostname", "host"),
    Field::same("port"),
];

pub(super) const AWS_DOCUMENTDB: &[Field] = &[
    NAME,
    Field::same("username"),
    Field::same("password"),
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::trimmed("rootCert", "root_cert"),
];

pub(super) const AZURE_SQL_SERVER: &[Field] = &[
    NAME,
    Field::same("hostname").required(),
    Field::same("port").required(),
    Field::same("username").required(),
    Field::same("password").required(),
    Field::attr("databaseName", "database_name").required(),
];

pub(super) const MONGODB: &[Field] = &[NAME, Field::same("uri")];

pub(super) const MONGODB_ATLAS: &[Field] =
    &[NAME, Field::same("uri"), Field::same("username"), Field::same("password")];

pub(super) const ELASTICSEARCH: &[Field] = &[
    NAME,
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::same("username"),
    Field::same("password"),
    Field::attr("apiKey", "api_key"),
];

pub(super) const RABBITMQ: &[Field] = &[
    NAME,
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::same("username"),
    Field::same("password"),
];

pub(super) const SNOWFLAKE: &[Field] = &[
    NAME,
    Field::attr("account", "account_id"),
    Field::same("username"),
    Field::same("password"),
    Field::attr("databaseName", "database_name"),
    Field::same("warehouse"),
    Field::same("role"),
];

pub(super) const KEYSPACES: &[Field] = &[
    NAME,
    Field::attr("aws_region_name", "region_name"),
    Field::attr("aws_access_key_id", "access_key_id"),
    Field::attr("aws_secret_access_key", "secret_access_key"),
    Field::same("keyspace"),
];

pub(super) const AZURE_COSMOS_NOSQL: &[Field] = &[
    NAME,
    Field::same("endpoint"),
    Field::attr("primaryKey", "primary_key"),
    Field::attr("databaseName", "database_name"),
];

pub(super) const POSTGRES_AWS_SECRETS_MANAGER: &[Field] = &[
    NAME,
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::attr("databaseName", "database_name"),
    Field::choice("sslMode", "ssl_mode", SSL_MODE_CHOICES),
    Field::attr("secretsManager", "secrets_manager"),
    Field::attr("secretId", "secret_id"),
];

/// mysql and sqlserver variants share a shape.
pub(super) const SQL_AWS_SECRETS_MANAGER: &[Field] = &[
    NAME,
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::attr("databaseName", "database_name"),
    Field::attr("secretsManager", "secrets_manager"),
    Field::attr("secretId", "secret_id"),
];

pub(super) const MONGODB_AWS_SECRETS_MANAGER: &[Field] = &[
    NAME,
    Field::same("uri"),
    Field::attr("secretsManager", "secrets_manager"),
    Field::attr("secretId", "secret_id"),
];

pub(super) const SNOWFLAKE_AWS_SECRETS_MANAGER: &[Field] = &[
    NAME,
    Field::attr("account", "account_id"),
    Field::attr("databaseName", "database_name"),
    Field::same("warehouse"),
    Field::same("role"),
    Field::attr("secretsManager", "secrets_manager"),
    Field::attr("secretId", "secret_id"),
];
