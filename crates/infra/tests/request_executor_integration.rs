//! Authenticated request pipeline against a mock partner API.
//!
//! Clients use a mock clock, so retry backoff is recorded instead of slept.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::json;
use support::{unreachable_url, MockApi, TOKEN_PATH};
use tourist_esim_domain::{ErrorKind, EsimError, ResponseBody};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, Request, ResponseTemplate};

fn count(api: &MockApi, request_path: &str) -> usize {
    api.requests_to(request_path).len()
}

#[test]
fn get_sends_bearer_token_and_query_parameters() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    let (client, _) = api.client();

    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .and(query_param("country", "FR"))
            .and(query_param("page", "2"))
            .and(query_param("unlimited", "1"))
            .and(header("authorization", "Bearer abc"))
            .and(header("accept", "application/json"))
            .and(header("user-agent", client.config().user_agent.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 7}]}))),
    );

    let body = client
        .get("plans", Some(&json!({"country": "FR", "page": 2, "unlimited": true, "skip": null})))
        .unwrap();

    assert_eq!(body.get("data"), Some(&json!([{"id": 7}])));
}

#[test]
fn non_object_query_payload_is_rejected_before_sending() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    let (client, _) = api.client();

    let err = client.get("plans", Some(&json!(["FR", "DE"]))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("an array"), "unexpected message: {err}");

    let err = client.execute(Method::DELETE, "webhooks/3", Some(&json!("id=3"))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    assert!(api.requests().is_empty());
}

#[test]
fn null_query_payload_is_ignored() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []}))),
    );
    let (client, _) = api.client();

    assert!(client.get("plans", Some(&json!(null))).is_ok());
}

#[test]
fn post_sends_json_body() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .and(header("content-type", "application/json"))
            .and(header("authorization", "Bearer abc"))
            .and(body_json(json!({"plan_id": 12, "quantity": 1})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"order_id": "ord-1"}))),
    );
    let (client, _) = api.client();

    let body = client.post("/orders", &json!({"plan_id": 12, "quantity": 1})).unwrap();

    assert_eq!(body.get("order_id"), Some(&json!("ord-1")));
}

#[test]
fn put_and_delete_reach_their_endpoints() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("PUT"))
            .and(path("/v1/webhooks/3"))
            .and(body_json(json!({"url": "https://example.test/hook"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": true}))),
    );
    api.mount(
        Mock::given(method("DELETE"))
            .and(path("/v1/webhooks/3"))
            .respond_with(ResponseTemplate::new(204)),
    );
    let (client, _) = api.client();

    let updated = client.put("webhooks/3", &json!({"url": "https://example.test/hook"})).unwrap();
    assert_eq!(updated.get("updated"), Some(&json!(true)));

    let deleted = client.delete("webhooks/3").unwrap();
    assert_eq!(deleted, ResponseBody::Json(json!({})));
}

#[test]
fn token_is_acquired_once_across_calls_and_retries() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/balance"))
            .respond_with(ResponseTemplate::new(502)),
    );
    let (client, _) = api.client();

    let _ = client.get("balance", None);
    let _ = client.get("balance", None);

    assert_eq!(count(&api, TOKEN_PATH), 1);
    assert_eq!(count(&api, "/v1/balance"), 6);
}

#[test]
fn maintenance_is_retried_with_linear_backoff() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"message": "maintenance"}))
                    .insert_header("X-Request-ID", "req-503"),
            ),
    );
    let (client, clock) = api.client();

    let err = client.get("plans", None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.request_id(), Some("req-503"));
    assert_eq!(count(&api, "/v1/plans"), 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(100), Duration::from_millis(200)]);
}

#[test]
fn attempts_and_backoff_follow_configuration() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .respond_with(ResponseTemplate::new(503)),
    );
    let config = api
        .config()
        .max_attempts(4)
        .retry_base_delay(Duration::from_millis(250))
        .build()
        .unwrap();
    let (client, clock) = api.client_with(config);

    client.get("plans", None).unwrap_err();

    assert_eq!(count(&api, "/v1/plans"), 4);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_millis(250), Duration::from_millis(500), Duration::from_millis(750)]
    );
}

#[test]
fn validation_failure_is_not_retried() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "The given data was invalid.",
                "errors": {"email": ["The email field is required."]}
            }))),
    );
    let (client, clock) = api.client();

    let err = client.post("orders", &json!({})).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Validation failed: The email field is required.");
    let fields = err.field_errors().unwrap();
    assert_eq!(fields["email"], vec!["The email field is required.".to_string()]);
    assert_eq!(count(&api, "/v1/orders"), 1);
    assert!(clock.sleeps().is_empty());
}

#[test]
fn rate_limit_defaults_to_sixty_seconds() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .respond_with(ResponseTemplate::new(429)),
    );
    let (client, _) = api.client();

    let err = client.get("plans", None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(err.retry_after(), Some(60));
    assert_eq!(count(&api, "/v1/plans"), 1);
}

#[test]
fn rate_limit_honours_retry_after_header() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30")),
    );
    let (client, _) = api.client();

    let err = client.get("plans", None).unwrap_err();

    assert_eq!(err.retry_after(), Some(30));
}

#[test]
fn maintenance_page_text_is_preserved() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .respond_with(
                ResponseTemplate::new(503).set_body_string("<html>maintenance until 04:00</html>"),
            ),
    );
    let (client, _) = api.client();

    let err = client.get("plans", None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    assert!(err.body().is_none());
    assert_eq!(err.raw_body(), Some("<html>maintenance until 04:00</html>"));
}

#[test]
fn validation_message_uses_first_listed_field() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(422).set_body_string(
                r#"{"errors":{"plan_id":["Plan is invalid"],"email":["Email required"]}}"#,
            )),
    );
    let (client, _) = api.client();

    let err = client.post("orders", &json!({})).unwrap_err();

    assert_eq!(err.to_string(), "Validation failed: Plan is invalid");
}

#[test]
fn missing_resource_is_not_found() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/orders/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"message": "Order not found"}))
                    .insert_header("X-Request-ID", "req-404"),
            ),
    );
    let (client, _) = api.client();

    let err = client.get("orders/missing", None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Order not found");
    assert_eq!(err.request_id(), Some("req-404"));
    assert_eq!(count(&api, "/v1/orders/missing"), 1);
}

#[test]
fn resource_unauthorized_is_an_authentication_failure() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .respond_with(ResponseTemplate::new(401)),
    );
    let (client, _) = api.client();

    let err = client.get("plans", None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.status(), Some(401));
    assert_eq!(count(&api, "/v1/plans"), 1);
}

#[test]
fn exhausted_server_errors_surface_the_last_response() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_string("upstream exploded")
                    .insert_header("X-Request-ID", "req-500"),
            ),
    );
    let (client, _) = api.client();

    let err = client.get("plans", None).unwrap_err();

    match err {
        EsimError::Api { status, raw_body, request_id, .. } => {
            assert_eq!(status, 500);
            assert_eq!(raw_body.as_deref(), Some("upstream exploded"));
            assert_eq!(request_id.as_deref(), Some("req-500"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(count(&api, "/v1/plans"), 3);
}

#[test]
fn transient_server_error_recovers_on_retry() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    api.mount(Mock::given(method("GET")).and(path("/v1/plans")).respond_with(
        move |_: &Request| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(500)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({"data": []}))
            }
        },
    ));
    let (client, clock) = api.client();

    let body = client.get("plans", None).unwrap();

    assert_eq!(body.get("data"), Some(&json!([])));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(100)]);
}

#[test]
fn refused_connection_is_retried_then_reported() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    let config = api.config().base_url(format!("{}/v1", unreachable_url())).build().unwrap();
    let (client, clock) = api.client_with(config);

    let err = client.get("plans", None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.to_string().starts_with("Connection failed: "), "unexpected message: {err}");
    assert_eq!(clock.sleeps().len(), 2);
}

#[test]
fn token_failure_skips_the_resource_call() {
    let api = MockApi::start();
    api.mount(
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401)),
    );
    let (client, _) = api.client();

    let err = client.get("plans", None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(count(&api, "/v1/plans"), 0);
}

#[test]
fn non_json_success_is_kept_verbatim() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong")),
    );
    let (client, _) = api.client();

    let body = client.execute(Method::GET, "ping", None).unwrap();

    assert_eq!(body.raw(), Some("pong"));
    assert_eq!(body.into_json(), json!({"raw_response": "pong"}));
}

#[test]
fn empty_success_body_is_an_empty_object() {
    let api = MockApi::start();
    api.grant_token("abc", 3600);
    api.mount(
        Mock::given(method("POST"))
            .and(path("/v1/orders/1/cancel"))
            .respond_with(ResponseTemplate::new(200)),
    );
    let (client, _) = api.client();

    let body = client.post("orders/1/cancel", &json!({})).unwrap();

    assert_eq!(body, ResponseBody::Json(json!({})));
}
