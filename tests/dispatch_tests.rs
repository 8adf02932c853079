//! End-to-end dispatch tests: Message -> translation -> provider HTTP call,
//! with both providers replaced by mock servers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nova_push::apns::ApnsClient;
use nova_push::fcm::{AccessToken, FCMClient, FCMError, TokenSource};
use nova_push::{
    AppleSender, Destination, Dispatcher, ErrorKind, GoogleSender, Message, Platform, Priority,
    PushError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APPLE_DEVICE: &str = "740f4707bebcf74f9b7c25d48e3358945f6aa01da5ddb387462c7eaf61bb78ad";

struct CountingTokenSource {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenSource for CountingTokenSource {
    async fn fetch_token(&self) -> Result<AccessToken, FCMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken {
            access_token: "ya29.dispatch".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn hello(apple: Option<Destination>, google: Option<Destination>) -> Message {
    Message {
        apple,
        google,
        title: "Hello".to_string(),
        body: "Hello from the other side".to_string(),
        priority: Priority::HIGH,
        ..Default::default()
    }
}

fn apple_dispatcher(server: &MockServer) -> Dispatcher {
    let client = ApnsClient::with_http_client(reqwest::Client::new(), server.uri());
    Dispatcher::new().with_apple(AppleSender::new(client))
}

fn google_dispatcher(server: &MockServer) -> (Dispatcher, Arc<CountingTokenSource>) {
    let source = Arc::new(CountingTokenSource {
        calls: AtomicUsize::new(0),
    });
    let client = FCMClient::with_token_source("nova-push-test".to_string(), source.clone())
        .with_endpoint(server.uri());
    (Dispatcher::new().with_google(GoogleSender::new(client)), source)
}

#[tokio::test]
async fn test_apple_send_returns_message_id() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/3/device/{APPLE_DEVICE}")))
        .and(header("apns-priority", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "apns-message-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let message = hello(Some(Destination::device(APPLE_DEVICE)), None);
    let receipt = apple_dispatcher(&server).send_apple(&message).await.unwrap();

    assert_eq!(receipt.status, 200);
    assert!(!receipt.message_id.is_empty());
    assert_eq!(receipt.message_id, "apns-message-1");
}

#[tokio::test]
async fn test_apple_zero_ttl_omits_expiration_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).insert_header("apns-id", "apns-message-3"))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = apple_dispatcher(&server);
    let mut message = hello(Some(Destination::device(APPLE_DEVICE)), None);
    dispatcher.send_apple(&message).await.unwrap();

    message.ttl = Duration::from_secs(3600);
    dispatcher.send_apple(&message).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("apns-expiration").is_none());

    let expiration: i64 = requests[1]
        .headers
        .get("apns-expiration")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(expiration > chrono::Utc::now().timestamp());
}

#[tokio::test]
async fn test_apple_rejection_is_provider_rejected() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"reason": "BadDeviceToken"})))
        .expect(1)
        .mount(&server)
        .await;

    let message = hello(Some(Destination::device(APPLE_DEVICE)), None);
    let err = apple_dispatcher(&server).send_apple(&message).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProviderRejected);
    assert_eq!(err.status(), 400);
    assert!(err.to_string().contains("BadDeviceToken"));
}

#[tokio::test]
async fn test_apple_payload_carries_data_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("apns-collapse-id", "thread-7"))
        .and(body_partial_json(json!({
            "aps": {"badge": 2, "thread": "t-7"},
            "her": {"thread": "t-7"}
        })))
        .respond_with(ResponseTemplate::new(200).insert_header("apns-id", "apns-message-2"))
        .expect(1)
        .mount(&server)
        .await;

    let mut message = hello(Some(Destination::device(APPLE_DEVICE)), None);
    message.collapse_id = "thread-7".to_string();
    message.data.insert("badge".to_string(), json!(2));
    message.data.insert("thread".to_string(), json!("t-7"));

    let receipt = apple_dispatcher(&server).send_apple(&message).await.unwrap();
    assert_eq!(receipt.message_id, "apns-message-2");
}

#[tokio::test]
async fn test_google_send_translates_message() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/nova-push-test/messages:send"))
        .and(header("authorization", "Bearer ya29.dispatch"))
        .and(body_partial_json(json!({
            "message": {
                "topic": "news",
                "android": {
                    "priority": "high",
                    "ttl": "3600s",
                    "data": {"a": "1", "n": "7"},
                    "notification": {"title": "Hello", "body": "Hello from the other side"}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/nova-push-test/messages/42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut message = hello(None, Some(Destination::topic("news")));
    message.ttl = Duration::from_secs(3600);
    message.data.insert("a".to_string(), json!("1"));
    message.data.insert("b".to_string(), serde_json::Value::Null);
    message.data.insert("n".to_string(), json!(7));

    let (dispatcher, source) = google_dispatcher(&server);
    let receipt = dispatcher.send_google(&message).await.unwrap();

    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.message_id, "projects/nova-push-test/messages/42");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["message"]["android"]["data"].get("b").is_none());
}

#[tokio::test]
async fn test_google_rejection_keeps_provider_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Quota exceeded for quota metric",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;

    let (dispatcher, _) = google_dispatcher(&server);
    let message = hello(None, Some(Destination::device("fcm-token")));
    let err = dispatcher.send_google(&message).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProviderRejected);
    assert_eq!(err.status(), 429);
    match err {
        PushError::Google(FCMError::ApiError { error, .. }) => {
            assert_eq!(error.message, "Quota exceeded for quota metric");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_no_destination_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ApnsClient::with_http_client(reqwest::Client::new(), server.uri());
    let (dispatcher, source) = google_dispatcher(&server);
    let dispatcher = dispatcher.with_apple(AppleSender::new(client));

    let apple_only = hello(Some(Destination::device(APPLE_DEVICE)), None);
    let err = dispatcher.send_google(&apple_only).await.unwrap_err();
    assert!(matches!(err, PushError::NoDestination(Platform::Google)));

    let google_only = hello(None, Some(Destination::device("fcm-token")));
    let err = dispatcher.send_apple(&google_only).await.unwrap_err();
    assert!(matches!(err, PushError::NoDestination(Platform::Apple)));

    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_caller_deadline_cancels_send() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("apns-id", "late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let dispatcher = apple_dispatcher(&server);
    let message = hello(Some(Destination::device(APPLE_DEVICE)), None);

    let outcome =
        tokio::time::timeout(Duration::from_millis(100), dispatcher.send_apple(&message)).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_dispatcher_is_shareable_across_tasks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "projects/p/messages/1"})))
        .expect(8)
        .mount(&server)
        .await;

    let (dispatcher, _) = google_dispatcher(&server);
    let dispatcher = Arc::new(dispatcher);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let message = hello(None, Some(Destination::device(format!("fcm-token-{i}"))));
                dispatcher.send_google(&message).await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().status, 200);
    }
}
