//! Wire contract of `ApiClient` against a mock review service.

use pretty_assertions::assert_eq;
use serde_json::json;
use smartcode_core::api::{ApiClient, ReviewBackend};
use smartcode_core::chat::ChatSession;
use smartcode_core::types::{Language, ProfileUpdate, ReviewResult};
use smartcode_core::upload::FileUpload;
use smartcode_core::Error;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn review_body() -> serde_json::Value {
    json!({
        "score": 6,
        "issues": ["unused import"],
        "suggestions": ["remove it"],
        "reasoning": "Mostly fine.",
        "language": "python",
        "session_id": "sess-42"
    })
}

fn api_message(err: Error) -> (u16, String) {
    match err {
        Error::Api { status, message } => (status, message),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn review_posts_code_and_language_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/review"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({ "code": "import os", "language": "python" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), Some("tok-1".to_owned()));
    let review = client.review_code("import os", "python").await.unwrap();
    assert_eq!(review.score, 6);
    assert_eq!(review.session_id.as_deref(), Some("sess-42"));
}

#[tokio::test]
async fn anonymous_review_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body()))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), None);
    client.review_code("x = 1", "python").await.unwrap();

    let request = &server.received_requests().await.unwrap()[0];
    assert!(request.headers.get("authorization").is_none());
}

#[tokio::test]
async fn error_detail_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(
            ResponseTemplate::new(413).set_body_json(json!({ "detail": "Code exceeds 10000 characters" })),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), None);
    let err = client.review_code("...", "javascript").await.unwrap_err();
    assert_eq!(api_message(err), (413, "Code exceeds 10000 characters".to_owned()));
}

#[tokio::test]
async fn non_json_error_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), None);
    let err = client.generate_code("a parser", "c").await.unwrap_err();
    assert_eq!(api_message(err), (502, "Failed to generate code".to_owned()));
}

#[tokio::test]
async fn file_review_is_multipart_without_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/review/file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body()))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), Some("tok-1".to_owned()));
    let upload = FileUpload::from_bytes("script.py", b"print('hi')\n".to_vec()).unwrap();
    assert_eq!(upload.language, Language::Python);
    client.review_file(&upload).await.unwrap();

    let request = &server.received_requests().await.unwrap()[0];
    let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    assert!(request.headers.get("authorization").is_none());
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains(r#"name="file"; filename="script.py""#));
    assert!(body.contains("print('hi')"));
}

#[tokio::test]
async fn generate_returns_code_and_explanation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "prompt": "factorial", "language": "typescript" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "const f = (n: number): number => n <= 1 ? 1 : n * f(n - 1);",
            "explanation": "Recursive factorial.",
            "language": "typescript"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), None);
    let generation = client.generate_code("factorial", "typescript").await.unwrap();
    assert_eq!(generation.explanation, "Recursive factorial.");
    assert!(generation.code.starts_with("const f"));
}

#[tokio::test]
async fn chat_body_carries_transcript_and_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": "Use pathlib." })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), Some("tok-1".to_owned()));
    let review: ReviewResult = serde_json::from_value(review_body()).unwrap();
    let mut chat = ChatSession::new(&review, "import os");
    assert!(chat.send("How do I fix it?", &client).await);
    assert_eq!(chat.transcript()[1].content, "Use pathlib.");

    let request = &server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["code"], "import os");
    assert_eq!(body["language"], "python");
    assert_eq!(body["session_id"], "sess-42");
    assert_eq!(body["messages"], json!([{ "role": "user", "content": "How do I fix it?" }]));
    assert!(body["review_context"].as_str().unwrap().starts_with("Score: 6/10"));
}

#[tokio::test]
async fn sessions_list_detail_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "language": "python", "created_at": "2025-01-02T10:00:00", "message_count": 2 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "code": "import os",
            "score": 6,
            "review_context": "Score: 6/10",
            "language": "python",
            "messages": [
                { "role": "user", "content": "why?" },
                { "role": "assistant", "content": "because" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sessions/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), Some("tok-1".to_owned()));
    let sessions = client.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].message_count, 2);

    let detail = client.session_detail("s1").await.unwrap();
    assert_eq!(detail.code.as_deref(), Some("import os"));
    assert_eq!(detail.messages.len(), 2);
    assert_eq!(detail.review().reasoning, "Score: 6/10");

    client.delete_session("s1").await.unwrap();
}

#[tokio::test]
async fn session_failures_use_fixed_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), None);
    let err = client.list_sessions().await.unwrap_err();
    assert_eq!(api_message(err), (401, "Failed to fetch sessions".to_owned()));
}

#[tokio::test]
async fn signin_sends_email_local_part_as_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signin"))
        .and(body_partial_json(json!({ "email": "ada@example.com", "username": "ada" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "jwt-1" })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), None);
    let auth = client.sign_in("ada@example.com", "pw").await.unwrap();
    assert_eq!(auth.access_token, "jwt-1");
}

#[tokio::test]
async fn signin_failure_ignores_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signin"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "User not found" })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), None);
    let err = client.sign_in("ghost@example.com", "pw").await.unwrap_err();
    assert_eq!(api_message(err), (401, "Invalid credentials".to_owned()));
}

#[tokio::test]
async fn signup_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "Email already registered" })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), None);
    let err = client.sign_up("ada", "ada@example.com", "pw").await.unwrap_err();
    assert_eq!(api_message(err).1, "Email already registered");
}

#[tokio::test]
async fn profile_get_and_partial_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "ada@example.com",
            "username": "ada",
            "full_name": null,
            "avatar_url": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "ada@example.com",
            "username": "ada",
            "full_name": "Ada Lovelace"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), Some("tok-1".to_owned()));
    let profile = client.profile().await.unwrap();
    assert_eq!(profile.username, "ada");
    assert_eq!(profile.full_name, None);

    let update = ProfileUpdate { full_name: Some("Ada Lovelace".to_owned()), ..Default::default() };
    let updated = client.update_profile(&update).await.unwrap();
    assert_eq!(updated.full_name.as_deref(), Some("Ada Lovelace"));

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body, json!({ "full_name": "Ada Lovelace" }));
}

#[tokio::test]
async fn avatar_upload_signs_then_posts_to_image_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/cloudinary/signature"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_key": "key",
            "timestamp": 1700000000,
            "signature": "sig",
            "folder": "avatars",
            "cloud_name": "demo"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://res.example.com/demo/avatars/a.png"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let avatar = dir.path().join("a.png");
    std::fs::write(&avatar, [0x89, b'P', b'N', b'G']).unwrap();

    let client = ApiClient::new(server.uri(), Some("tok-1".to_owned())).with_upload_host(server.uri());
    let url = client.upload_avatar(&avatar).await.unwrap();
    assert_eq!(url, "https://res.example.com/demo/avatars/a.png");

    let requests = server.received_requests().await.unwrap();
    let form = String::from_utf8_lossy(&requests[1].body);
    assert!(form.contains(r#"name="signature""#));
    assert!(form.contains(r#"name="api_key""#));
    assert!(form.contains("avatars"));
}

#[tokio::test]
async fn avatar_upload_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/cloudinary/signature"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let avatar = dir.path().join("a.png");
    std::fs::write(&avatar, b"png").unwrap();

    let client = ApiClient::new(server.uri(), Some("tok-1".to_owned()));
    let err = client.upload_avatar(&avatar).await.unwrap_err();
    assert_eq!(api_message(err).1, "Failed to get upload signature");
}
