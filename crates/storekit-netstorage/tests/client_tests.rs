//! NetStorage client against a mock upload host

use futures::TryStreamExt;
use storekit_core::StoreError;
use storekit_netstorage::{
    EntryKind, NetStorageClient, NetStorageConfig, Signer, UploadOptions, ACTION_HEADER,
    AUTH_DATA_HEADER, AUTH_SIGN_HEADER,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const KEY_NAME: &str = "upload-key";
const SECRET: &str = "abcdEFGH1234";

fn client(server: &MockServer) -> NetStorageClient {
    let host = server.uri().trim_start_matches("http://").to_string();
    let config = NetStorageConfig::new(host, "123456", KEY_NAME, SECRET).with_insecure_http(true);
    NetStorageClient::new(config).unwrap()
}

fn header_value<'a>(request: &'a Request, name: &str) -> &'a str {
    request
        .headers
        .get(name)
        .unwrap_or_else(|| panic!("missing header {}", name))
        .to_str()
        .unwrap()
}

/// Recompute the signature the way the server does and compare
fn assert_signed(request: &Request, expected_path: &str) {
    let action = header_value(request, ACTION_HEADER);
    let auth_data = header_value(request, AUTH_DATA_HEADER);
    let auth_sign = header_value(request, AUTH_SIGN_HEADER);

    let fields: Vec<&str> = auth_data.split(", ").collect();
    assert_eq!(fields.len(), 6, "auth-data: {}", auth_data);
    assert_eq!(&fields[..3], &["5", "0.0.0.0", "0.0.0.0"]);
    assert_eq!(fields[4], expected_path);
    assert_eq!(fields[5], KEY_NAME);

    let timestamp: i64 = fields[3].parse().unwrap();
    let now = chrono::Utc::now().timestamp();
    assert!((now - timestamp).abs() < 60, "stale timestamp {}", timestamp);

    let expected =
        Signer::new(KEY_NAME, SECRET).sign(action, expected_path, expected_path, timestamp);
    assert_eq!(auth_sign, expected.auth_sign);
}

#[tokio::test]
async fn test_dir_is_signed_and_decoded() {
    let server = MockServer::start().await;
    let body = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<stat directory="/123456/test">
<file type="file" name="a.txt" size="5" md5="5d41402abc4b2a76b9719d911017c592" mtime="1700000000"/>
</stat>"#;

    Mock::given(method("GET"))
        .and(path("/123456/test"))
        .and(header(ACTION_HEADER, "version=1&action=dir&format=xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client(&server).dir("/test/").await.unwrap();
    assert_eq!(listing.directory, "/123456/test");
    assert_eq!(listing.entries.len(), 1);
    let entry = &listing.entries[0];
    assert_eq!(entry.kind, EntryKind::File);
    assert_eq!(entry.name, "a.txt");
    assert_eq!(entry.size, Some(5));
    assert_eq!(entry.md5.as_deref(), Some("5d41402abc4b2a76b9719d911017c592"));
    assert_eq!(entry.mtime, Some(1700000000));

    let requests = server.received_requests().await.unwrap();
    assert_signed(&requests[0], "123456/test");
}

#[tokio::test]
async fn test_du_reports_usage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/123456"))
        .and(header(ACTION_HEADER, "version=1&action=du&format=xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<du directory="/123456"><du-info files="3" bytes="300"/></du>"#,
        ))
        .mount(&server)
        .await;

    let listing = client(&server).du("").await.unwrap();
    let usage = listing.usage.unwrap();
    assert_eq!(usage.files, 3);
    assert_eq!(usage.bytes, 300);
}

#[tokio::test]
async fn test_stat_with_unexpected_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server).stat("/a.txt").await.unwrap_err();
    assert!(matches!(err, StoreError::Decode { .. }));
}

#[tokio::test]
async fn test_upload_sends_body_and_options() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/123456/docs/a.txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let data = b"hello".to_vec();
    let options = UploadOptions::default().with_checksums(&data).with_mtime(1700000000);
    client(&server)
        .upload("/docs/a.txt", data.clone(), options)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert_eq!(request.body, data);
    let action = header_value(request, ACTION_HEADER);
    assert!(action.starts_with("version=1&action=upload&mtime=1700000000&size=5&md5="));
    assert!(action.contains(
        "&sha256=2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    ));
    assert_signed(request, "123456/docs/a.txt");
}

#[tokio::test]
async fn test_mutations_use_post_and_fixed_tokens() {
    let server = MockServer::start().await;
    for action in [
        "version=1&action=mkdir",
        "version=1&action=rmdir",
        "version=1&action=delete",
        "version=1&action=rename&destination=%2F123456%2Fnew.txt",
        "version=1&action=symlink&target=%2F123456%2Fnew.txt",
        "version=1&action=mtime&mtime=1600000000",
        "version=1&action=quick-delete&quick-delete=imreallyreallysure",
    ] {
        Mock::given(method("POST"))
            .and(header(ACTION_HEADER, action))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let c = client(&server);
    c.mkdir("/dir").await.unwrap();
    c.rmdir("/dir").await.unwrap();
    c.delete("/old.txt").await.unwrap();
    c.rename("/old.txt", "/new.txt").await.unwrap();
    c.symlink("/link", "/new.txt").await.unwrap();
    c.set_mtime("/new.txt", 1600000000).await.unwrap();
    c.quick_delete("/tree", "imreallyreallysure").await.unwrap();

    for request in server.received_requests().await.unwrap() {
        let expected = request.url.path().trim_start_matches('/').to_string();
        assert_signed(&request, &expected);
    }
}

#[tokio::test]
async fn test_quick_delete_without_confirmation_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).quick_delete("/tree", "yes").await.unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[tokio::test]
async fn test_download_streams_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/123456/a.bin"))
        .and(header(ACTION_HEADER, "version=1&action=download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
        .mount(&server)
        .await;

    let c = client(&server);
    let chunks: Vec<bytes::Bytes> = c
        .download("/a.bin")
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    let total: usize = chunks.iter().map(|c| c.len()).sum();
    assert_eq!(total, 4096);

    let data = c.download_bytes("/a.bin").await.unwrap();
    assert_eq!(data.len(), 4096);
}

#[tokio::test]
async fn test_rejected_signature_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden: bad signature"))
        .mount(&server)
        .await;

    let err = client(&server).dir("/").await.unwrap_err();
    match err {
        StoreError::AuthFailed(e) => {
            assert_eq!(e.status, 403);
            assert_eq!(e.message, "Forbidden: bad signature");
        }
        other => panic!("Expected auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_file_is_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = match client(&server).download("/nope").await {
        Ok(_) => panic!("Expected error"),
        Err(e) => e,
    };
    let service = err.service_error().unwrap();
    assert_eq!(service.status, 404);
    assert_eq!(service.message, "Not Found");
}
