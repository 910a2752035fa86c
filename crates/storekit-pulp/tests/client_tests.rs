//! Pulp client against a mock server

use serde_json::json;
use storekit_core::StoreError;
use storekit_pulp::{
    PulpClient, PulpConfig, RepositoryDetails, SessionCertificate, UploadRequest, UploadRequests,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// `test:test`
const BASIC_AUTH: &str = "Basic dGVzdDp0ZXN0";

fn client(server: &MockServer) -> PulpClient {
    PulpClient::new(PulpConfig::new(server.uri(), "test", "test")).unwrap()
}

fn fixture_certificate() -> SessionCertificate {
    SessionCertificate {
        certificate: include_str!("fixtures/session-cert.pem").to_string(),
        key: include_str!("fixtures/session-key.pem").to_string(),
    }
}

/// Responds with the request body, like a server echoing the created object
struct Echo;

impl Respond for Echo {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(201)
            .insert_header("Content-Type", "application/json")
            .set_body_bytes(request.body.clone())
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/pulp/api/v2/actions/login/"))
        .and(header("Authorization", BASIC_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_certificate()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_caches_certificate() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let c = client(&server);
    assert!(!c.is_authenticated());
    assert!(c.session_certificate().is_none());

    c.login().await.unwrap();
    assert!(c.is_authenticated());
    assert_eq!(c.session_certificate(), Some(fixture_certificate()));

    c.logout();
    assert!(!c.is_authenticated());
}

#[tokio::test]
async fn test_calls_after_login_use_session_not_basic_auth() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/pulp/api/v2/repositories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let c = client(&server);
    c.list_repositories().await.unwrap();
    c.login().await.unwrap();
    c.list_repositories().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    // Before login: basic credentials
    assert_eq!(requests[0].headers.get("Authorization").unwrap(), BASIC_AUTH);
    // Login itself: basic credentials
    assert_eq!(requests[1].headers.get("Authorization").unwrap(), BASIC_AUTH);
    // After login: session only
    assert!(requests[2].headers.get("Authorization").is_none());
}

#[tokio::test]
async fn test_failed_first_login_stays_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pulp/api/v2/actions/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "certificate": "pkiCert",
            "key": "key"
        })))
        .mount(&server)
        .await;

    let c = client(&server);
    let err = c.login().await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidCertificate { .. }));
    assert!(!c.is_authenticated());
}

#[tokio::test]
async fn test_failed_login_keeps_previous_session() {
    let server = MockServer::start().await;
    // First login succeeds, the second returns garbage, later ones are rejected
    Mock::given(method("POST"))
        .and(path("/pulp/api/v2/actions/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_certificate()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pulp/api/v2/actions/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "certificate": "pkiCert",
            "key": "key"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pulp/api/v2/actions/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "http_status": 401,
            "error_message": "Invalid username or password"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pulp/api/v2/repositories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let c = client(&server);
    c.login().await.unwrap();

    let err = c.login().await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidCertificate { .. }));
    assert!(c.is_authenticated());
    assert_eq!(c.session_certificate(), Some(fixture_certificate()));

    let err = c.login().await.unwrap_err();
    assert!(matches!(err, StoreError::AuthFailed(_)));
    assert_eq!(c.session_certificate(), Some(fixture_certificate()));

    c.list_repositories().await.unwrap();
    let requests = server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert_eq!(last.url.path(), "/pulp/api/v2/repositories/");
    assert!(last.headers.get("Authorization").is_none());
}

#[tokio::test]
async fn test_rejected_login_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pulp/api/v2/actions/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "http_status": 401,
            "error_message": "Invalid username or password",
            "traceback": null
        })))
        .mount(&server)
        .await;

    let err = client(&server).login().await.unwrap_err();
    match err {
        StoreError::AuthFailed(e) => {
            assert_eq!(e.status, 401);
            assert_eq!(e.message, "Invalid username or password");
        }
        other => panic!("Expected auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_repositories() {
    let server = MockServer::start().await;
    let expected = vec![
        RepositoryDetails::new("test")
            .with_display_name("test-unit")
            .with_description("test repo"),
    ];
    let mut body = serde_json::to_value(&expected).unwrap();
    body[0]["_href"] = json!("/pulp/api/v2/repositories/test/");

    Mock::given(method("GET"))
        .and(path("/pulp/api/v2/repositories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let repos = client(&server).list_repositories().await.unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].id, "test");
    assert_eq!(repos[0].display_name.as_deref(), Some("test-unit"));
    assert_eq!(repos[0].href.as_deref(), Some("/pulp/api/v2/repositories/test/"));
}

#[tokio::test]
async fn test_get_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pulp/api/v2/repositories/test/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "test",
            "description": "test repo",
            "content_unit_counts": {"docker_blob": 2, "docker_image": 1}
        })))
        .mount(&server)
        .await;

    let repo = client(&server).get_repository("test").await.unwrap();
    assert_eq!(repo.description.as_deref(), Some("test repo"));
    assert_eq!(repo.content_unit_counts.get("docker_blob"), Some(&2));
    assert_eq!(repo.total_units(), 3);
}

#[tokio::test]
async fn test_missing_repository_is_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pulp/api/v2/repositories/ghost/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"http_status":404,"error_message":"not found"}"#),
        )
        .mount(&server)
        .await;

    let err = client(&server).get_repository("ghost").await.unwrap_err();
    match err {
        StoreError::Service(e) => {
            assert_eq!(e.status, 404);
            assert_eq!(e.message, "not found");
        }
        other => panic!("Expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_repository_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pulp/api/v2/repositories/"))
        .and(header("Content-Type", "application/json"))
        .respond_with(Echo)
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = RepositoryDetails::new("test")
        .with_display_name("test-unit")
        .with_description("test repo");
    repo.href = Some("/pulp/api/v2/repositories/test".to_string());
    repo.notes.insert("_repo-type".to_string(), json!("docker-repo"));
    repo.content_unit_counts.insert("docker_blob".to_string(), 3);

    let created = client(&server).create_repository(&repo).await.unwrap();
    assert_eq!(created, repo);
    assert_eq!(created.repo_type(), Some("docker-repo"));
}

#[tokio::test]
async fn test_create_repository_requires_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let repo = RepositoryDetails {
        description: Some("no id".to_string()),
        ..Default::default()
    };
    let err = client(&server).create_repository(&repo).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[tokio::test]
async fn test_upload_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pulp/api/v2/content/uploads/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"upload_ids": ["abc123", "def456"]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pulp/api/v2/content/uploads/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_href": "/pulp/api/v2/content/uploads/abc123/",
            "upload_id": "abc123"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/pulp/api/v2/content/uploads/abc123/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;

    let c = client(&server);
    assert_eq!(
        c.list_upload_requests().await.unwrap(),
        UploadRequests {
            upload_ids: vec!["abc123".to_string(), "def456".to_string()]
        }
    );
    assert_eq!(
        c.create_upload_request().await.unwrap(),
        UploadRequest {
            href: "/pulp/api/v2/content/uploads/abc123/".to_string(),
            upload_id: "abc123".to_string()
        }
    );
    c.delete_upload_request("abc123").await.unwrap();
}

#[tokio::test]
async fn test_empty_500_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).create_upload_request().await.unwrap_err();
    let service = err.service_error().unwrap();
    assert_eq!(service.status, 500);
    assert_eq!(service.message, "Internal Server Error");
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"not": "a list"})))
        .mount(&server)
        .await;

    let err = client(&server).list_repositories().await.unwrap_err();
    assert!(matches!(err, StoreError::Decode { .. }));
}
