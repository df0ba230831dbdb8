//! Switches, firewalls and overlay networks.

use super::{Field, NAME};

pub(super) const ZEROTIER: &[Field] =
    &[NAME, Field::attr("apiToken", "api_token"), Field::attr("networkId", "network_id")];

pub(super) const ARUBA_INSTANT_ON: &[Field] = &[
    NAME,
    Field::same("username"),
    Field::same("password"),
    Field::attr("siteId", "site_id"),
];

/// aruba_sw, hpe_switch and cisco_ngfw log in with a username and password.
pub(super) const SWITCH: &[Field] = &[
    NAME,
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::same("username"),
    Field::same("password"),
];

/// fortinet_ngfw and paloalto_ngfw authenticate with an API key.
pub(super) const FIREWALL_API: &[Field] = &[
    NAME,
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::attr("apiKey", "api_key"),
];
