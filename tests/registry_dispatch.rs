use adaptive_provider::registry::{build, Source};
use adaptive_provider::{AttributeBag, IntegrationKind};
use serde_yaml::{Mapping, Value};

/// Bag satisfying every required field of `kind`.
fn minimal_bag(kind: IntegrationKind) -> AttributeBag {
    let mut bag = AttributeBag::new().with("name", format!("{}-1", kind));
    for field in kind.schema().iter().filter(|f| f.required) {
        match field.source {
            Source::JoinedLines(attribute) => bag.insert(attribute, vec!["host-a"]),
            _ => {
                if let Some(attribute) = field.attribute() {
                    if !bag.contains(attribute) {
                        bag.insert(attribute, "value");
                    }
                }
            }
        }
    }
    bag
}

fn top_level_keys(yaml: &str) -> Vec<String> {
    let mapping: Mapping = serde_yaml::from_str(yaml).expect("yaml");
    mapping.keys().map(|k| k.as_str().expect("string key").to_owned()).collect()
}

#[test]
fn every_kind_builds_from_a_minimal_bag() {
    for kind in IntegrationKind::ALL {
        let config =
            build(*kind, &minimal_bag(*kind)).unwrap_or_else(|e| panic!("{}: {}", kind, e));
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.trim().is_empty(), "{}", kind);

        let expected: Vec<String> = kind.schema().iter().map(|f| f.key.to_owned()).collect();
        assert_eq!(top_level_keys(&yaml), expected, "{}", kind);
        assert_eq!(expected[0], "name", "{}", kind);
    }
}

#[test]
fn documented_payload_shapes() {
    let cases: &[(IntegrationKind, &[&str])] = &[
        (
            IntegrationKind::CockroachDb,
            &[
                "name",
                "username",
                "password",
                "databaseName",
                "hostname",
                "port",
                "sslMode",
                "rootCert",
            ],
        ),
        (
            IntegrationKind::Postgres,
            &[
                "name",
                "username",
                "password",
                "databaseName",
                "hostname",
                "port",
                "sslMode",
                "rootCert",
                "crtText",
                "keyText",
            ],
        ),
        (
            IntegrationKind::Kubernetes,
            &[
                "name",
                "apiserver",
                "token",
                "cacrt",
                "namespace",
                "tolerationsBytes",
                "annotationsBytes",
                "nodeSelectorBytes",
                "affinityBytes",
            ],
        ),
        (
            IntegrationKind::Aws,
            &["name", "version", "aws_region_name", "aws_access_key_id", "aws_secret_access_key"],
        ),
        (
            IntegrationKind::Ssh,
            &["name", "username", "hostname", "port", "usePassword", "password", "sshKey"],
        ),
    ];
    for (kind, keys) in cases {
        let config = build(*kind, &minimal_bag(*kind)).unwrap();
        assert_eq!(config.keys(), keys.to_vec(), "{}", kind);
    }
}

#[test]
fn certificate_material_is_trimmed() {
    let cases = [
        (IntegrationKind::CockroachDb, "root_cert", "rootCert"),
        (IntegrationKind::YugabyteDb, "root_cert", "rootCert"),
        (IntegrationKind::Postgres, "root_cert", "rootCert"),
        (IntegrationKind::AwsDocumentDb, "root_cert", "rootCert"),
        (IntegrationKind::Kubernetes, "cluster_cert", "cacrt"),
        (IntegrationKind::Kubernetes, "cluster_token", "token"),
        (IntegrationKind::Gcp, "key_file", "keyFile"),
    ];
    for (kind, attribute, key) in cases {
        let bag =
            minimal_bag(kind).with(attribute, "\n\t  -----BEGIN-----\nbody\n-----END-----  \n");
        let config = build(kind, &bag).unwrap();
        assert_eq!(
            config.get(key),
            Some(&Value::from("-----BEGIN-----\nbody\n-----END-----")),
            "{} {}",
            kind,
            attribute
        );
    }
}

#[test]
fn google_key_file_is_forwarded_verbatim() {
    let bag =
        minimal_bag(IntegrationKind::Google).with("key_file", " {\"type\": \"service_account\"}\n");
    let config = build(IntegrationKind::Google, &bag).unwrap();
    assert_eq!(config.get("keyFile"), Some(&Value::from(" {\"type\": \"service_account\"}\n")));
}

#[test]
fn unset_attributes_become_empty_strings() {
    let config = build(IntegrationKind::Datadog, &AttributeBag::new().with("name", "dd")).unwrap();
    for key in ["apiKey", "appKey", "site"] {
        assert_eq!(config.get(key), Some(&Value::from("")), "{}", key);
    }
}

#[test]
fn unknown_attributes_are_ignored() {
    let bag =
        AttributeBag::new().with("name", "m").with("uri", "mongodb://x").with("colour", "blue");
    let config = build(IntegrationKind::MongoDb, &bag).unwrap();
    assert_eq!(config.keys(), vec!["name", "uri"]);
}

#[test]
fn host_lists_join_with_newlines_in_order() {
    for kind in [IntegrationKind::ServerList, IntegrationKind::Services] {
        let bag = AttributeBag::new().with("name", "fleet").with("hosts", vec!["c", "a", "b"]);
        let config = build(kind, &bag).unwrap();
        assert_eq!(config.get("hosts"), Some(&Value::from("c\na\nb")), "{}", kind);
    }
}
