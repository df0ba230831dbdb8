use super::{Field, NAME};

/// aws and awssecretsmanager.
pub(super) const AWS: &[Field] = &[
    NAME,
    Field::constant("version", "1.0"),
    Field::attr("aws_region_name", "region_name"),
    Field::attr("aws_access_key_id", "access_key_id"),
    Field::attr("aws_secret_access_key", "secret_access_key"),
];

pub(super) const AZURE: &[Field] = &[
    NAME,
    Field::attr("tenantId", "tenant_id"),
    Field::attr("applicationId", "application_id"),
    Field::attr("clientSecret", "client_secret"),
    Field::attr("subscriptionId", "subscription_id"),
];

/// The service-account key is JSON pasted by users, usually with a trailing newline.
pub(super) const GCP: &[Field] =
    &[NAME, Field::attr("projectId", "project_id"), Field::trimmed("keyFile", "key_file")];
