use price_feed::transport::{HttpRequest, HttpTransport, ReqwestTransport, TransportError};
use std::time::Duration;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn transport(attempts: u32) -> ReqwestTransport {
    ReqwestTransport::with_retry(attempts, Duration::from_millis(10)).unwrap()
}

#[tokio::test]
async fn test_retries_until_success() {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ajax.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ajax.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"current":{}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let request = HttpRequest::get(format!("{}/ajax.json", server.uri()), Duration::from_secs(5));
    let response = transport(3).get(&request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"current":{}}"#);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_gives_up_after_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/XAU/USD"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"Invalid API Key"}"#))
        .expect(2)
        .mount(&server)
        .await;

    let request = HttpRequest::get(format!("{}/XAU/USD", server.uri()), Duration::from_secs(5));
    let response = transport(2).get(&request).await.unwrap();
    assert_eq!(response.status, 401);
    assert!(!response.is_success());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_sends_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Api/Market/Cryptocurrency.php"))
        .and(query_param("key", "secret value"))
        .and(header("x-access-token", "goldapi-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let request = HttpRequest::get(
        format!("{}/Api/Market/Cryptocurrency.php", server.uri()),
        Duration::from_secs(5),
    )
    .query("key", "secret value")
    .header("x-access-token", "goldapi-token");
    let response = transport(1).get(&request).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.body, "[]");
}

#[tokio::test]
async fn test_request_timeout_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let request = HttpRequest::get(format!("{}/slow", server.uri()), Duration::from_millis(50));
    let err = transport(2).get(&request).await.unwrap_err();
    assert!(matches!(err, TransportError::Request { .. }));
}

#[tokio::test]
async fn test_rejects_invalid_header() {
    let request = HttpRequest::get("http://127.0.0.1:9/", Duration::from_secs(1))
        .header("bad header", "value");
    let err = transport(1).get(&request).await.unwrap_err();
    assert!(matches!(err, TransportError::InvalidHeader(name) if name == "bad header"));
}
