use jira_panel_api::models::{AttachmentFile, IssueRef};
use jira_panel_api::{ApiError, AppCredentials, Identity, JiraClient};
use serde_json::json;
use wiremock::matchers::{any, body_json, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> AppCredentials {
    AppCredentials::new("X", "Y", "Z", "attachment-secret").unwrap()
}

fn abc1() -> IssueRef {
    IssueRef::parse("ABC-1").unwrap()
}

#[tokio::test]
async fn test_multipart_upload_is_signed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue/ABC-1/attachments"))
        .and(header("X-Atlassian-Token", "no-check"))
        .and(header_regex("authorization", "^JWT [A-Za-z0-9_-]+\\.[A-Za-z0-9_-]+\\.[A-Za-z0-9_-]+$"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("filename=\"build.log\""))
        .and(body_string_contains("all green"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "10000" }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The client's own identity is a user; the upload still signs as the app.
    let client =
        JiraClient::new(mock_server.uri(), Identity::basic("dev@example.com", "tok")).unwrap();
    let file = AttachmentFile::new("build.log", b"all green".to_vec()).with_mime("text/plain");
    client
        .upload_attachment(&abc1(), file, &credentials())
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let auth = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    let claims = credentials()
        .verify(auth.strip_prefix("JWT ").unwrap())
        .unwrap();
    assert_eq!((claims.iss.as_str(), claims.sub.as_str(), claims.aud.as_str()), ("X", "Y", "Z"));
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_multipart_upload_forbidden() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue/ABC-1/attachments"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JiraClient::new(mock_server.uri(), Identity::bearer("tok")).unwrap();
    let err = client
        .upload_attachment(&abc1(), AttachmentFile::new("a.txt", b"x".to_vec()), &credentials())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("ABC-1"));
}

#[tokio::test]
async fn test_invalid_mime_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = JiraClient::new(mock_server.uri(), Identity::bearer("tok")).unwrap();
    let file = AttachmentFile::new("a.bin", vec![0u8, 1, 2]).with_mime("not a mime");
    let err = client
        .upload_attachment(&abc1(), file, &credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_json_attachment_uses_client_identity() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue/ABC-1/attachments"))
        .and(header("X-Atlassian-Token", "no-check"))
        .and(header("authorization", "Bearer user-token"))
        .and(body_json(json!({ "filename": "hi.txt", "content": "aGk=" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JiraClient::new(mock_server.uri(), Identity::bearer("user-token")).unwrap();
    client
        .add_attachment(&abc1(), &AttachmentFile::new("hi.txt", b"hi".to_vec()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_json_attachment_failure_names_issue() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue/ABC-1/attachments"))
        .respond_with(ResponseTemplate::new(413).set_body_string("too large"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JiraClient::new(mock_server.uri(), Identity::bearer("user-token")).unwrap();
    let err = client
        .add_attachment(&abc1(), &AttachmentFile::new("big.bin", vec![0u8; 16]))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to add attachment to issue ABC-1 (HTTP 413)"
    );
}

#[tokio::test]
async fn test_delete_attachment_failure_names_attachment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/3/attachment/10000"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JiraClient::new(mock_server.uri(), Identity::bearer("tok")).unwrap();
    let err = client.delete_attachment("10000").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to delete attachment 10000 (HTTP 404)");
}

#[tokio::test]
async fn test_blank_attachment_id_rejected() {
    let client = JiraClient::new("https://acme.atlassian.net", Identity::bearer("tok")).unwrap();
    let err = client.delete_attachment("  ").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest { .. }));
}
