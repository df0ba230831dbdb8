//! Clusters, hosts and service lists.

use super::{Field, NAME};

pub(super) const KUBERNETES: &[Field] = &[
    NAME,
    Field::attr("apiserver", "api_server"),
    Field::trimmed("token", "cluster_token"),
    Field::trimmed("cacrt", "cluster_cert"),
    Field::same("namespace"),
    Field::attr("tolerationsBytes", "tolerations"),
    Field::attr("annotationsBytes", "annotations"),
    Field::attr("nodeSelectorBytes", "node_selector"),
    Field::attr("affinityBytes", "affinity"),
];

/// Without a key the Platform falls back to password login; the key doubles as either.
pub(super) const SSH: &[Field] = &[
    NAME,
    Field::same("username"),
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::is_empty("usePassword", "key"),
    Field::attr("password", "key"),
    Field::attr("sshKey", "key"),
];

pub(super) const RDP_WINDOWS: &[Field] = &[
    NAME,
    Field::attr("hostname", "host"),
    Field::same("port"),
    Field::same("username"),
    Field::same("password"),
];

pub(super) const SERVERLIST: &[Field] = &[
    NAME,
    Field::joined("hosts", "hosts").required(),
    Field::same("username"),
    Field::attr("sshKey", "key"),
];

pub(super) const SERVICES: &[Field] = &[NAME, Field::joined("hosts", "hosts")];

pub(super) const CUSTOM_INTEGRATION: &[Field] = &[NAME, Field::same("uri"), Field::same("token")];
