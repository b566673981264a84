use linkmgmt_engine::{ApiError, ApiSettings, LinkApi, LinkChanges, NewLink, ReqwestLinkApi};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer, api_key: Option<&str>) -> ReqwestLinkApi {
    ReqwestLinkApi::new(ApiSettings {
        base_url: format!("{}/", server.uri()),
        api_key: api_key.map(str::to_string),
        ..ApiSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn list_links_sends_bearer_and_parses_lenient_timestamps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/links"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "5b7c8e1a-0000-4000-8000-000000000001",
                "url": "https://a.example.com",
                "title": "A",
                "created_at": "2025-11-20T05:28:45.444128",
                "updated_at": "2025-11-20T05:28:45Z"
            },
            { "id": 42, "url": "https://b.example.com" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let links = api_for(&server, Some("secret")).list_links().await.expect("list");

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].title.as_deref(), Some("A"));
    assert_eq!(
        links[0].created_at.map(|t| t.to_rfc3339()),
        Some("2025-11-20T05:28:45.444128+00:00".to_string())
    );
    assert!(links[0].updated_at.is_some());
    assert_eq!(links[1].id, "42");
    assert_eq!(links[1].title, None);
    assert_eq!(links[1].created_at, None);
}

#[tokio::test]
async fn create_and_update_send_only_present_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/links"))
        .and(body_json(json!({ "url": "https://c.example.com", "title": "C" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "c", "url": "https://c.example.com", "title": "C"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/links/c"))
        .and(body_json(json!({ "text": "body" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c", "url": "https://c.example.com", "title": "C", "text": "body"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server, None);
    let created = api
        .create_link(&NewLink {
            url: "https://c.example.com".to_string(),
            title: Some("C".to_string()),
            ..NewLink::default()
        })
        .await
        .expect("create");
    assert_eq!(created.id, "c");

    let updated = api
        .update_link(
            "c",
            &LinkChanges {
                text: Some("body".to_string()),
                ..LinkChanges::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.text.as_deref(), Some("body"));
}

#[tokio::test]
async fn error_status_uses_error_field_or_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/links/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "link not found" })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/links/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/links/gone"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = api_for(&server, None);
    let err = api.delete_link("missing").await.unwrap_err();
    assert_eq!(err.to_string(), "API error (404): link not found");

    let err = api.delete_link("broken").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Status { status: 500, ref message } if message == "database down"
    ));

    api.delete_link("gone").await.expect("delete");
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/links"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api_for(&server, None).list_links().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn create_user_posts_email_and_returns_the_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users"))
        .and(body_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "9f0c2d1e-0000-4000-8000-000000000007",
            "email": "ada@example.com",
            "api_key": "lm_1234abcd",
            "created_at": "2025-11-20T05:28:45Z",
            "updated_at": "2025-11-20T05:28:45Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = api_for(&server, None)
        .create_user("ada@example.com")
        .await
        .expect("register");

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.api_key, "lm_1234abcd");
    assert_eq!(user.id, "9f0c2d1e-0000-4000-8000-000000000007");
    assert!(user.created_at.is_some());
}

#[tokio::test]
async fn create_user_surfaces_conflicts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "email already registered" })),
        )
        .mount(&server)
        .await;

    let err = api_for(&server, None)
        .create_user("ada@example.com")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API error (409): email already registered");
}
