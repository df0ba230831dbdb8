//! Identity providers.

use super::{Field, NAME};

pub(super) const AZURE_ACTIVE_DIRECTORY: &[Field] = &[
    NAME,
    Field::attr("tenantId", "tenant_id"),
    Field::attr("applicationId", "application_id"),
    Field::attr("clientSecret", "client_secret"),
];

// key_file is forwarded as-is here, unlike gcp.
pub(super) const GOOGLE: &[Field] = &[
    NAME,
    Field::same("domain"),
    Field::attr("adminEmail", "admin_email"),
    Field::attr("keyFile", "key_file"),
];

pub(super) const OKTA: &[Field] =
    &[NAME, Field::same("domain"), Field::attr("apiToken", "api_token")];

pub(super) const ONELOGIN: &[Field] = &[
    NAME,
    Field::same("domain"),
    Field::attr("clientId", "client_id"),
    Field::attr("clientSecret", "client_secret"),
];

pub(super) const JUMPCLOUD: &[Field] =
    &[NAME, Field::attr("apiKey", "api_key"), Field::attr("orgId", "org_id")];
