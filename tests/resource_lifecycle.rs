mod common;

use adaptive_provider::testing::PlatformMock;
use adaptive_provider::{
    AttributeBag, Entity, Method, ObjectKind, PollSettings, ProviderError, TrackingSleeper,
};
use serde_json::json;
use serde_yaml::Value;
use std::sync::Arc;
use std::time::Duration;

use common::test_helpers::{ctx, data, existing, options, provider, provider_with, yaml_pairs};

const CREATE: &str = "/terraform/resource/create";
const READ_R1: &str = "/terraform/resource/read/r1";

fn cockroach() -> AttributeBag {
    AttributeBag::new()
        .with("type", "cockroachdb")
        .with("name", "db1")
        .with("host", "h.example")
        .with("port", "26257")
        .with("username", "u")
        .with("password", "p")
        .with("ssl_mode", "verify-full")
        .with("root_cert", " -----BEGIN CERT-----\n  ")
}

#[tokio::test]
async fn cockroachdb_create_sends_yaml_config_and_waits_for_created() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, CREATE, 200, json!({"id": "r1"}));
    mock.statuses(READ_R1, 202, &["creating", "creating", "created"]);

    let mut resource = data(cockroach());
    let diagnostics =
        provider(&mock).create(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();

    assert!(diagnostics.is_empty());
    assert_eq!(resource.id(), Some("r1"));
    assert_eq!(mock.calls(Method::Get, READ_R1), 3);

    let bodies = mock.bodies(Method::Post, CREATE);
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["integrationType"], "cockroachdb");
    assert_eq!(body["name"], "db1");
    assert_eq!(body["userTags"], json!([]));
    assert_eq!(body["defaultCluster"], "");

    let config = yaml_pairs(body["config"].as_str().unwrap());
    let expected: Vec<(String, Value)> = [
        ("name", "db1"),
        ("username", "u"),
        ("password", "p"),
        ("databaseName", ""),
        ("hostname", "h.example"),
        ("port", "26257"),
        ("sslMode", "verify-full"),
        ("rootCert", "-----BEGIN CERT-----"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), Value::from(v)))
    .collect();
    assert_eq!(config, expected);

    let documented = "name: db1\nusername: u\npassword: p\ndatabaseName: \"\"\n\
                      hostname: h.example\nport: \"26257\"\nsslMode: verify-full\n\
                      rootCert: -----BEGIN CERT-----\n";
    assert_eq!(config, yaml_pairs(documented));
}

#[tokio::test]
async fn status_comparison_ignores_case() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, CREATE, 200, json!({"id": "r1"}));
    mock.statuses(READ_R1, 202, &["Creating", "CREATING", "creating", "Created"]);

    let mut resource = data(cockroach());
    provider(&mock).create(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();
    assert_eq!(mock.calls(Method::Get, READ_R1), 4);
}

#[tokio::test]
async fn wait_succeeds_only_below_the_retry_limit() {
    let limit = 5;
    for creating in [0usize, 1, 4, 5, 8] {
        let mock = PlatformMock::new();
        mock.respond(Method::Post, CREATE, 200, json!({"id": "r1"}));
        let mut statuses = vec!["creating"; creating];
        statuses.push("created");
        mock.statuses(READ_R1, 202, &statuses);

        let mut opts = options();
        opts.resource_poll = PollSettings::new(limit, Duration::from_secs(10));
        let mut resource = data(cockroach());
        let result =
            provider_with(&mock, opts).create(ObjectKind::Resource, &ctx(), &mut resource).await;

        if creating < limit {
            assert!(result.is_ok(), "creating x{}: {:?}", creating, result);
        } else {
            assert!(
                matches!(
                    result,
                    Err(ProviderError::AsyncTimeout { entity: Entity::Resource, attempts: 5, .. })
                ),
                "creating x{}: {:?}",
                creating,
                result
            );
            // the id is already recorded when the wait gives up
            assert_eq!(resource.id(), Some("r1"));
        }
    }
}

#[tokio::test]
async fn failed_status_fails_without_further_polling() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, CREATE, 200, json!({"id": "r1"}));
    mock.statuses(READ_R1, 202, &["failed"]);

    let mut resource = data(cockroach());
    let err =
        provider(&mock).create(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap_err();

    assert!(matches!(err, ProviderError::AsyncFailed { ref status, .. } if status == "failed"));
    assert_eq!(mock.calls(Method::Get, READ_R1), 1);
    assert_eq!(resource.id(), Some("r1"));
}

#[tokio::test]
async fn poll_sleeps_ten_seconds_between_reads() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, CREATE, 200, json!({"id": "r1"}));
    mock.statuses(READ_R1, 202, &["creating", "creating", "created"]);

    let sleeper = TrackingSleeper::new();
    let opts = options().with_sleeper(Arc::new(sleeper.clone()));
    let mut resource = data(cockroach());
    provider_with(&mock, opts).create(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();

    assert_eq!(sleeper.calls(), 2);
    assert_eq!(sleeper.total(), Duration::from_secs(20));
}

#[tokio::test]
async fn services_kind_is_sent_as_servicelist() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, CREATE, 200, json!({"id": "r1"}));
    mock.statuses(READ_R1, 202, &["created"]);

    let attributes = AttributeBag::new()
        .with("type", "services")
        .with("name", "svc")
        .with("hosts", vec!["a.internal", "b.internal"])
        .with("tags", vec!["prod"])
        .with("default_cluster", "eu");
    let mut resource = data(attributes);
    provider(&mock).create(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();

    let body = &mock.bodies(Method::Post, CREATE)[0];
    assert_eq!(body["integrationType"], "servicelist");
    assert_eq!(body["userTags"], json!(["prod"]));
    assert_eq!(body["defaultCluster"], "eu");
    let config = yaml_pairs(body["config"].as_str().unwrap());
    assert_eq!(config[1], ("hosts".to_owned(), Value::from("a.internal\nb.internal")));
    // the host keeps seeing the original kind
    assert_eq!(resource.attributes().string("type").unwrap(), "services");
}

#[tokio::test]
async fn invalid_input_never_reaches_the_platform() {
    let mock = PlatformMock::new();
    let provider = provider(&mock);

    let mut unknown = data(AttributeBag::new().with("type", "mainframe").with("name", "m"));
    let err = provider.create(ObjectKind::Resource, &ctx(), &mut unknown).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidKind(_)));

    let mut bad_ssl = data(cockroach().with("ssl_mode", "sometimes"));
    let err = provider.create(ObjectKind::Resource, &ctx(), &mut bad_ssl).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidEnum { .. }));

    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn update_posts_new_config_without_waiting() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, "/terraform/resource/update/r1", 200, json!({"id": "r1"}));

    let mut resource = existing("r1", cockroach().with("password", "rotated"));
    provider(&mock).update(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();

    let body = &mock.bodies(Method::Post, "/terraform/resource/update/r1")[0];
    assert!(body.get("name").is_none());
    assert_eq!(body["integrationType"], "cockroachdb");
    let config = yaml_pairs(body["config"].as_str().unwrap());
    assert!(config.contains(&("password".to_owned(), Value::from("rotated"))));
    assert_eq!(mock.calls(Method::Get, READ_R1), 0);
}

#[tokio::test]
async fn delete_clears_the_id_and_surfaces_platform_errors() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, "/terraform/resource/delete/r1", 200, json!({}));
    let path = "/terraform/resource/delete/r2";
    mock.respond(Method::Post, path, 400, json!({"error": "resource in use"}));
    let provider = provider(&mock);

    let mut first = existing("r1", cockroach());
    provider.delete(ObjectKind::Resource, &ctx(), &mut first).await.unwrap();
    assert_eq!(first.id(), None);

    let mut second = existing("r2", cockroach());
    let err = provider.delete(ObjectKind::Resource, &ctx(), &mut second).await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Platform { status: 400, ref reason, .. } if reason == "resource in use"
    ));
    assert_eq!(second.id(), Some("r2"));
}

#[tokio::test]
async fn duplicate_name_and_bad_token_are_not_retried() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, CREATE, 409, json!({"error": "duplicate"}));
    let mut resource = data(cockroach());
    let err =
        provider(&mock).create(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap_err();
    assert!(matches!(err, ProviderError::DuplicateName { ref name } if name == "db1"));
    assert_eq!(resource.id(), None);

    let mock = PlatformMock::new();
    mock.respond(Method::Post, CREATE, 200, json!({"id": "r1"}));
    mock.respond(Method::Get, READ_R1, 401, json!({"error": "expired"}));
    let mut resource = data(cockroach());
    let err =
        provider(&mock).create(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap_err();
    assert!(matches!(err, ProviderError::AuthenticationFailed));
    assert_eq!(mock.calls(Method::Get, READ_R1), 1);
}

#[tokio::test]
async fn transient_read_errors_are_polled_through() {
    let mock = PlatformMock::new();
    mock.respond(Method::Post, CREATE, 200, json!({"id": "r1"}));
    mock.fail(Method::Get, READ_R1, "connection reset");
    mock.respond(Method::Get, READ_R1, 502, json!({"error": "bad gateway"}));
    mock.respond(Method::Get, READ_R1, 202, json!({"Status": "created"}));

    let mut resource = data(cockroach());
    provider(&mock).create(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();
    assert_eq!(mock.calls(Method::Get, READ_R1), 3);
}

#[tokio::test]
async fn read_is_a_no_op_unless_refresh_is_enabled() {
    let mock = PlatformMock::new();
    mock.statuses(READ_R1, 202, &["created"]);

    let mut resource = existing("r1", cockroach());
    provider(&mock).read(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();
    assert!(mock.requests().is_empty());

    let refreshing = provider_with(&mock, options().with_refresh_on_read(true));
    refreshing.read(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();
    assert_eq!(resource.attributes().string("status").unwrap(), "created");
    assert_eq!(resource.id(), Some("r1"));
}

#[tokio::test]
async fn refresh_forgets_resources_the_platform_lost() {
    let mock = PlatformMock::new();
    mock.respond(Method::Get, "/terraform/resource/read/gone", 404, json!({"error": "not found"}));

    let refreshing = provider_with(&mock, options().with_refresh_on_read(true));
    let mut resource = existing("gone", cockroach());
    refreshing.read(ObjectKind::Resource, &ctx(), &mut resource).await.unwrap();
    assert_eq!(resource.id(), None);
}
