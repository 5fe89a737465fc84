use recetas_proxy::config;
use recetas_proxy::notion::{
    CreatePageRequest, Icon, NotionClient, NotionError, NotionService, Parent,
};
use serde_json::{json, Map};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> NotionClient {
    let cfg = config::Notion {
        token: "secret_test".into(),
        base_url: server.uri(),
        ..Default::default()
    };
    NotionClient::from_config(&cfg).unwrap()
}

#[tokio::test]
async fn query_database_posts_to_query_endpoint() {
    let server = MockServer::start().await;
    let response = json!({ "object": "list", "results": [], "has_more": false });

    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .and(header("Authorization", "Bearer secret_test"))
        .and(header("Notion-Version", "2022-06-28"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(response.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let got = client_for(&server).query_database("db-1").await.unwrap();
    assert_eq!(got, response);
}

#[tokio::test]
async fn retrieve_page_returns_body_unchanged() {
    let server = MockServer::start().await;
    let page = json!({
        "object": "page",
        "id": "page-1",
        "properties": { "Nombre": { "title": [ { "plain_text": "Tarta" } ] } }
    });

    Mock::given(method("GET"))
        .and(path("/v1/pages/page-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let got = client_for(&server).retrieve_page("page-1").await.unwrap();
    assert_eq!(got, page);
}

#[tokio::test]
async fn list_block_children_sends_page_size() {
    let server = MockServer::start().await;
    let blocks = json!({ "object": "list", "results": [ { "object": "block", "id": "b1" } ] });

    Mock::given(method("GET"))
        .and(path("/v1/blocks/page-1/children"))
        .and(query_param("page_size", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(blocks.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let got = client_for(&server).list_block_children("page-1", 50).await.unwrap();
    assert_eq!(got, blocks);
}

#[tokio::test]
async fn create_page_posts_payload() {
    let server = MockServer::start().await;
    let mut properties = Map::new();
    properties.insert("Name".into(), json!({ "title": [ { "text": { "content": "Cake" } } ] }));
    let body = CreatePageRequest {
        parent: Parent::DatabaseId {
            database_id: "d1".into(),
        },
        icon: Some(Icon::Emoji { emoji: "🍨".into() }),
        properties,
        children: vec![],
    };

    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(body_json(json!({
            "parent": { "type": "database_id", "database_id": "d1" },
            "icon": { "type": "emoji", "emoji": "🍨" },
            "properties": { "Name": { "title": [ { "text": { "content": "Cake" } } ] } },
            "children": []
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "object": "page", "id": "new" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let got = client_for(&server).create_page(&body).await.unwrap();
    assert_eq!(got["id"], "new");
}

#[tokio::test]
async fn vendor_error_body_is_kept() {
    let server = MockServer::start().await;
    let error = json!({
        "object": "error",
        "status": 401,
        "code": "unauthorized",
        "message": "API token is invalid."
    });

    Mock::given(method("GET"))
        .and(path("/v1/pages/page-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error.clone()))
        .mount(&server)
        .await;

    let err = client_for(&server).retrieve_page("page-1").await.unwrap_err();
    match &err {
        NotionError::Api { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, &error);
        }
        other => panic!("wrong error: {other:?}"),
    }
    assert_eq!(err.to_raw(), error);
}

#[tokio::test]
async fn non_json_error_is_wrapped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client_for(&server).query_database("db-1").await.unwrap_err();
    assert_eq!(err.to_raw(), json!({ "status": 502, "body": "Bad Gateway" }));
}

#[tokio::test]
async fn invalid_success_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/pages/page-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).retrieve_page("page-1").await.unwrap_err();
    assert!(matches!(err, NotionError::Decode(_)));
    assert_eq!(err.to_raw()["code"], "invalid_json");
}

#[tokio::test]
async fn unreachable_vendor_is_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cfg = config::Notion {
        token: "secret_test".into(),
        base_url: format!("http://{addr}/"),
        ..Default::default()
    };
    let client = NotionClient::from_config(&cfg).unwrap();

    let err = client.retrieve_page("page-1").await.unwrap_err();
    assert!(matches!(err, NotionError::Request(_)));
    assert_eq!(err.to_raw()["code"], "request_failed");
}
