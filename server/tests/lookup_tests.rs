use std::time::Duration;

use axum::{routing::get, Router};
use etherscan_parse::{routes::routes, Answer, AppState, Config};
use fixtures::{explorer_router, spawn_server, TokenCatalog};
use reqwest::header::CONTENT_TYPE;

const ERC20: &str = "0xcf39b7793512f03f2893c16459fd72e65d2ed00c";

async fn start_service(explorer_base_url: String, fetch_timeout: Duration) -> String {
    let config = Config {
        explorer_base_url,
        fetch_timeout,
        ..Default::default()
    };
    let state = AppState::from_config(&config).unwrap();

    let addr = spawn_server(routes(state)).await.unwrap();
    format!("http://{addr}")
}

async fn start(catalog: TokenCatalog) -> String {
    let explorer = spawn_server(explorer_router(catalog)).await.unwrap();

    start_service(format!("http://{explorer}/token/"), Duration::from_secs(5)).await
}

async fn answer(response: reqwest::Response) -> Answer {
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_every_request_shape_resolves_every_token() {
    let catalog = TokenCatalog::from_csv(include_str!("../../fixtures/tokens.csv")).unwrap();
    let tokens = [
        (ERC20, "[ERC-20]"),
        ("0x2af75676692817d85121353f0d6e8e9ae6ad5576", "[ERC-1155]"),
        ("0x57f1887a8bf19b14fc0df6fd9b2acc9af147ea85", "[ERC-721]"),
    ];
    let service = start(catalog).await;
    let client = reqwest::Client::new();

    for (token, standard) in tokens {
        let requests = [
            client.get(&service).query(&[("token", token)]),
            client
                .get(&service)
                .header(CONTENT_TYPE, "application/json")
                .body(format!("\"{token}\"")),
            client.post(&service).json(&serde_json::json!({ "token": token })),
            client
                .post(&service)
                .multipart(reqwest::multipart::Form::new().text("token", token.to_string())),
            client.post(&service).form(&[("token", token)]),
        ];

        for request in requests {
            let answer = answer(request.send().await.unwrap()).await;

            assert_eq!(answer.error, "");
            assert_eq!(answer.token, token);
            assert_eq!(answer.token_type, standard);
        }
    }
}

#[tokio::test]
async fn test_successful_lookup_body() {
    let service = start(TokenCatalog::new().with_token(ERC20, "[ERC-20]")).await;

    let response = reqwest::get(format!("{service}/?token={ERC20}")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

    assert_eq!(
        response.text().await.unwrap(),
        format!(r#"{{"error":"","token":"{ERC20}","tokenType":"[ERC-20]"}}"#)
    );
}

#[tokio::test]
async fn test_page_for_another_token_is_rejected() {
    let mut catalog = TokenCatalog::new();
    catalog.insert("0xaaa", "0xbbb", "[ERC-20]");
    let service = start(catalog).await;

    let answer = answer(reqwest::get(format!("{service}/?token=0xaaa")).await.unwrap()).await;

    assert_eq!(
        answer,
        Answer::failed("Requested (0xaaa) and received (0xbbb) token do not match.")
    );
}

#[tokio::test]
async fn test_unknown_token_reports_schema_mismatch() {
    let service = start(TokenCatalog::new()).await;

    let answer = answer(reqwest::get(format!("{service}/?token=0xdead")).await.unwrap()).await;

    assert_eq!(
        answer.error,
        "(0xdead) The response does not contain information about the token or the response format has been changed or timeOut."
    );
    assert!(answer.token.is_empty());
    assert!(answer.token_type.is_empty());
}

#[tokio::test]
async fn test_missing_token_is_reported_without_prefix() {
    let service = start(TokenCatalog::new()).await;
    let client = reqwest::Client::new();

    let requests = [
        client.get(&service),
        client.post(&service).form(&[("other", "value")]),
        client.post(&service).json(&serde_json::json!({ "token": "" })),
        client.delete(format!("{service}/?token={ERC20}")),
    ];

    for request in requests {
        let answer = answer(request.send().await.unwrap()).await;
        assert_eq!(answer, Answer::failed("Not input params"));
    }
}

#[tokio::test]
async fn test_unreachable_explorer_is_reported_with_prefix() {
    // Grab a free port and release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = start_service(format!("http://{addr}/token/"), Duration::from_secs(5)).await;

    let answer = answer(reqwest::get(format!("{service}/?token=0xabc")).await.unwrap()).await;

    assert!(answer.error.starts_with("(0xabc) "), "{}", answer.error);
    assert!(answer.token.is_empty());
}

#[tokio::test]
async fn test_slow_explorer_times_out_with_prefix() {
    let slow = Router::new().route(
        "/token/:token",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            fixtures::render_token_page(ERC20, "[ERC-20]")
        }),
    );
    let explorer = spawn_server(slow).await.unwrap();
    let service = start_service(
        format!("http://{explorer}/token/"),
        Duration::from_secs(1),
    )
    .await;

    let answer = answer(reqwest::get(format!("{service}/?token={ERC20}")).await.unwrap()).await;

    assert!(answer.error.starts_with(&format!("({ERC20}) ")), "{}", answer.error);
    assert!(answer.token.is_empty());
    assert!(answer.token_type.is_empty());
}
