//! SIEM, log and notification sinks.

use super::{Field, NAME};

pub(super) const CORALOGIX: &[Field] =
    &[NAME, Field::same("domain"), Field::attr("apiKey", "api_key")];

pub(super) const CUSTOM_SIEM_WEBHOOK: &[Field] = &[NAME, Field::same("url"), Field::same("token")];

pub(super) const DATADOG: &[Field] = &[
    NAME,
    Field::attr("apiKey", "api_key"),
    Field::attr("appKey", "app_key"),
    Field::same("site"),
];

pub(super) const SPLUNK: &[Field] =
    &[NAME, Field::same("url"), Field::same("token"), Field::same("index")];

pub(super) const SYSLOG: &[Field] =
    &[NAME, Field::attr("hostname", "host"), Field::same("port"), Field::same("protocol")];

pub(super) const MSTEAMS: &[Field] = &[NAME, Field::attr("webhookUrl", "webhook_url")];
