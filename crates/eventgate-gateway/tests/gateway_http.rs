//! End-to-end tests over a real socket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eventgate_gateway::{
    GatewayConfig, GatewayError, GatewayServer, GatewayState, ShutdownHandle,
};
use eventgate_upstream::{
    Authenticator, Credentials, LoginResponse, UnconfiguredEventSource, UpstreamConfig,
};

const ORIGIN: &str = "https://app.example.com";

type RunningGateway = (
    String,
    ShutdownHandle,
    JoinHandle<Result<(), GatewayError>>,
);

fn config(upstream: UpstreamConfig, drain_timeout_seconds: u64) -> GatewayConfig {
    GatewayConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        cors_origins: vec!["*".to_string()],
        drain_timeout_seconds,
        upstream,
        ..GatewayConfig::default()
    }
}

fn spawn(server: GatewayServer) -> RunningGateway {
    let base = format!("http://{}", server.local_addr().unwrap());
    let shutdown = server.shutdown_handle();
    let task = tokio::spawn(server.run());
    (base, shutdown, task)
}

async fn start(upstream: UpstreamConfig, drain_timeout_seconds: u64) -> RunningGateway {
    let server = GatewayServer::from_config(config(upstream, drain_timeout_seconds))
        .await
        .unwrap();
    spawn(server)
}

async fn start_with(
    authenticator: Arc<dyn Authenticator>,
    config: GatewayConfig,
) -> RunningGateway {
    let state = GatewayState::new(authenticator, Arc::new(UnconfiguredEventSource), config);
    spawn(GatewayServer::bind(state).await.unwrap())
}

/// Answers after `delay`, recording whether it got that far.
struct SlowAuthenticator {
    delay: Duration,
    finished: Arc<AtomicBool>,
}

#[async_trait]
impl Authenticator for SlowAuthenticator {
    async fn login(&self, _credentials: Credentials) -> eventgate_upstream::Result<LoginResponse> {
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(LoginResponse::new(json!({ "token": "late" })))
    }
}

async fn stopped(task: JoinHandle<Result<(), GatewayError>>, within: Duration) {
    tokio::time::timeout(within, task)
        .await
        .expect("run() must return in time")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn login_and_events_are_forwarded_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "user": "a", "pass": "b" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(query_param("limit", "2"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": 2 }])),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let (base, shutdown, task) = start(
        UpstreamConfig {
            login_url: Some(format!("{}/login", upstream.uri())),
            events_url: Some(format!("{}/events", upstream.uri())),
            timeout_seconds: 5,
        },
        5,
    )
    .await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/auth/login"))
        .header("origin", ORIGIN)
        .json(&json!({ "user": "a", "pass": "b" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], ORIGIN);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "token": "abc" }));

    let response = client
        .get(format!("{base}/events?limit=2"))
        .header("authorization", "Bearer abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "events": [{ "id": 1 }, { "id": 2 }] }));

    shutdown.shutdown();
    stopped(task, Duration::from_secs(10)).await;
}

#[tokio::test]
async fn unconfigured_upstreams_answer_not_implemented() {
    let (base, shutdown, task) = start(UpstreamConfig::default(), 5).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/auth/login"))
        .header("origin", ORIGIN)
        .json(&json!({ "user": "a", "pass": "b" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 501);
    assert_eq!(response.headers()["access-control-allow-origin"], ORIGIN);

    let response = client.get(format!("{base}/events")).send().await.unwrap();
    assert_eq!(response.status(), 501);

    let response = client.get(format!("{base}/auth/login")).send().await.unwrap();
    assert_eq!(response.status(), 404);

    shutdown.shutdown();
    stopped(task, Duration::from_secs(10)).await;
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_requests() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "slow" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&upstream)
        .await;

    let (base, shutdown, task) = start(
        UpstreamConfig {
            login_url: Some(upstream.uri()),
            ..UpstreamConfig::default()
        },
        5,
    )
    .await;

    let in_flight = tokio::spawn(async move {
        reqwest::Client::new()
            .post(format!("{base}/auth/login"))
            .json(&json!({ "user": "a" }))
            .send()
            .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.shutdown();

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);

    stopped(task, Duration::from_secs(10)).await;
}

#[tokio::test]
async fn drain_timeout_cancels_in_flight_requests() {
    let finished = Arc::new(AtomicBool::new(false));
    let authenticator = Arc::new(SlowAuthenticator {
        delay: Duration::from_secs(3),
        finished: Arc::clone(&finished),
    });
    let (base, shutdown, task) =
        start_with(authenticator, config(UpstreamConfig::default(), 1)).await;

    let in_flight = tokio::spawn(async move {
        reqwest::Client::new()
            .post(format!("{base}/auth/login"))
            .header("origin", ORIGIN)
            .json(&json!({ "user": "a" }))
            .send()
            .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.shutdown();
    stopped(task, Duration::from_secs(3)).await;

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.status(), 503);
    assert_eq!(response.headers()["access-control-allow-origin"], ORIGIN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "shutting_down");

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(
        !finished.load(Ordering::SeqCst),
        "handler kept running after cancellation"
    );
}

#[tokio::test]
async fn oversized_body_gets_json_error() {
    let config = GatewayConfig {
        max_body_bytes: 16,
        ..config(UpstreamConfig::default(), 1)
    };
    let server = GatewayServer::from_config(config).await.unwrap();
    let (base, shutdown, task) = spawn(server);

    let response = reqwest::Client::new()
        .post(format!("{base}/auth/login"))
        .header("origin", ORIGIN)
        .json(&json!({ "user": "someone", "pass": "something long" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 413);
    assert_eq!(response.headers()["access-control-allow-origin"], ORIGIN);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "payload_too_large");

    shutdown.shutdown();
    stopped(task, Duration::from_secs(10)).await;
}

#[tokio::test]
async fn slow_request_gets_json_timeout() {
    let authenticator = Arc::new(SlowAuthenticator {
        delay: Duration::from_secs(3),
        finished: Arc::new(AtomicBool::new(false)),
    });
    let config = GatewayConfig {
        request_timeout_seconds: 1,
        ..config(UpstreamConfig::default(), 1)
    };
    let (base, shutdown, task) = start_with(authenticator, config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/auth/login"))
        .json(&json!({ "user": "a" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 408);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "request_timeout");

    shutdown.shutdown();
    stopped(task, Duration::from_secs(10)).await;
}
