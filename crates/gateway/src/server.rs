use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        body::Bytes,
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Json, Response},
        routing::get,
    },
    secrecy::ExposeSecret,
    serde::Deserialize,
    tower_http::trace::TraceLayer,
    tracing::{debug, info, warn},
};

use {
    omniai_config::AppConfig,
    omniai_routing::{AppContext, route_event},
    omniai_whatsapp::{
        WebhookPayload, extract_text_messages, verify_signature, verify_webhook_subscription,
    },
};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ctx: Arc<AppContext>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the webhook router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/webhook", get(verify_handler).post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the webhook HTTP server and block until it exits.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        state.config.server.bind, state.config.server.port
    )
    .parse()?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

#[derive(Debug, Deserialize)]
struct VerifyParams {
    mode: Option<String>,
    token: Option<String>,
    challenge: Option<String>,
}

async fn verify_handler(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    match verify_webhook_subscription(
        params.mode.as_deref(),
        params.token.as_deref(),
        params.challenge.as_deref(),
        &state.config.whatsapp,
    ) {
        Some(challenge) => {
            info!("webhook subscription verified");
            challenge.into_response()
        },
        None => {
            warn!("webhook subscription verification failed");
            StatusCode::FORBIDDEN.into_response()
        },
    }
}

/// Inbound message webhook.
///
/// Replies 200 `{"ok": true}` no matter how individual messages fare;
/// the platform only needs delivery acknowledged. The one exception is
/// a signature mismatch, which is rejected before any processing.
async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(app_secret) = state.config.whatsapp.app_secret.as_ref() {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_signature(&body, signature, app_secret.expose_secret()) {
            warn!("webhook signature mismatch");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "unparseable webhook body, treating as empty");
            WebhookPayload::default()
        },
    };

    let messages = extract_text_messages(&payload);
    route_event(&state.ctx, &messages).await;

    Json(serde_json::json!({ "ok": true })).into_response()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {
        axum::routing::post,
        hmac::{Hmac, Mac},
        secrecy::Secret,
        sha2::Sha256,
    };

    use {
        omniai_config::{OpenAiConfig, ServerConfig, WhatsAppConfig},
        omniai_llm::OpenAiClient,
        omniai_routing::GREETING,
        omniai_tools::{PageFetcher, WeatherClient},
        omniai_whatsapp::WhatsAppClient,
    };

    use super::*;

    type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn start_llm_mock(reply: &str) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();
        let reply = reply.to_string();

        let app = Router::new().route(
            "/chat/completions",
            post(move |Json(body): Json<serde_json::Value>| {
                let cap = captured_clone.clone();
                let reply = reply.clone();
                async move {
                    cap.lock().unwrap().push(body);
                    Json(serde_json::json!({
                        "choices": [{ "message": { "role": "assistant", "content": reply } }],
                    }))
                }
            }),
        );
        (spawn(app).await, captured)
    }

    async fn start_weather_mock(line: &str) -> String {
        let line = line.to_string();
        let app = Router::new().route("/{city}", get(move || async move { line }));
        spawn(app).await
    }

    async fn start_page_mock(path: &'static str, html: &'static str) -> String {
        let app = Router::new().route(path, get(move || async move { html }));
        spawn(app).await
    }

    async fn start_graph_mock() -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();

        let app = Router::new().route(
            "/{phone_id}/messages",
            post(move |Json(body): Json<serde_json::Value>| {
                let cap = captured_clone.clone();
                async move {
                    cap.lock().unwrap().push(body);
                    Json(serde_json::json!({ "messages": [{ "id": "wamid.X" }] }))
                }
            }),
        );
        (spawn(app).await, captured)
    }

    // Unroutable base URL for collaborators a test expects to stay silent
    // or fail fast.
    const NO_SERVER: &str = "http://127.0.0.1:1";

    fn test_state(
        llm_base: &str,
        weather_base: &str,
        graph_base: &str,
        app_secret: Option<&str>,
    ) -> AppState {
        let config = AppConfig {
            openai: OpenAiConfig {
                api_key: Secret::new("test-key".to_string()),
                model: "gpt-4o-mini".to_string(),
                base_url: llm_base.to_string(),
            },
            whatsapp: WhatsAppConfig {
                phone_id: "555001".to_string(),
                token: Secret::new("graph-token".to_string()),
                verify_token: Secret::new("secret-token".to_string()),
                app_secret: app_secret.map(|s| Secret::new(s.to_string())),
                graph_base_url: graph_base.to_string(),
            },
            server: ServerConfig::default(),
            home_city: "Dubai".to_string(),
        };
        let ctx = AppContext {
            home_city: config.home_city.clone(),
            llm: OpenAiClient::new(
                config.openai.api_key.clone(),
                config.openai.model.clone(),
                config.openai.base_url.clone(),
            ),
            weather: WeatherClient::new(weather_base.to_string()),
            fetcher: PageFetcher::new(),
            sender: WhatsAppClient::from_config(&config.whatsapp),
        };
        AppState {
            config: Arc::new(config),
            ctx: Arc::new(ctx),
        }
    }

    async fn spawn_gateway(state: AppState) -> String {
        spawn(build_app(state)).await
    }

    fn text_message_payload(from: &str, body: &str) -> serde_json::Value {
        serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "123",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": { "phone_number_id": "555001" },
                        "messages": [{
                            "from": from,
                            "id": "wamid.1",
                            "timestamp": "1724300000",
                            "type": "text",
                            "text": { "body": body }
                        }]
                    }
                }]
            }]
        })
    }

    async fn post_webhook(base: &str, payload: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{base}/webhook"))
            .json(payload)
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let base = spawn_gateway(test_state(NO_SERVER, NO_SERVER, NO_SERVER, None)).await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn verification_handshake_returns_challenge() {
        let base = spawn_gateway(test_state(NO_SERVER, NO_SERVER, NO_SERVER, None)).await;

        let resp = reqwest::get(format!(
            "{base}/webhook?mode=subscribe&token=secret-token&challenge=abc123"
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn verification_handshake_rejects_bad_token() {
        let base = spawn_gateway(test_state(NO_SERVER, NO_SERVER, NO_SERVER, None)).await;

        let resp = reqwest::get(format!(
            "{base}/webhook?mode=subscribe&token=wrong&challenge=abc123"
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 403);
    }

    #[tokio::test]
    async fn verification_handshake_rejects_bad_mode() {
        let base = spawn_gateway(test_state(NO_SERVER, NO_SERVER, NO_SERVER, None)).await;

        let resp = reqwest::get(format!(
            "{base}/webhook?mode=unsubscribe&token=secret-token&challenge=abc123"
        ))
        .await
        .unwrap();
        assert_eq!(resp.status(), 403);

        let resp = reqwest::get(format!("{base}/webhook")).await.unwrap();
        assert_eq!(resp.status(), 403);
    }

    #[tokio::test]
    async fn non_text_messages_send_nothing() {
        let (graph_base, sends) = start_graph_mock().await;
        let base = spawn_gateway(test_state(NO_SERVER, NO_SERVER, &graph_base, None)).await;

        let payload = serde_json::json!({
            "entry": [{
                "changes": [{
                    "field": "messages",
                    "value": { "messages": [{ "from": "111", "type": "image" }] }
                }]
            }]
        });
        let resp = post_webhook(&base, &payload).await;

        assert_eq!(resp.status(), 200);
        assert!(sends.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn greeting_round_trip() {
        let (llm_base, llm_requests) = start_llm_mock("should not be called").await;
        let (graph_base, sends) = start_graph_mock().await;
        let base = spawn_gateway(test_state(&llm_base, NO_SERVER, &graph_base, None)).await;

        let resp = post_webhook(&base, &text_message_payload("15551234567", "Hi")).await;
        assert_eq!(resp.status(), 200);

        let sends = sends.lock().unwrap();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0]["to"], "15551234567");
        assert_eq!(sends[0]["text"]["body"], GREETING);
        assert!(llm_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn brief_round_trip() {
        let (llm_base, llm_requests) = start_llm_mock("sunny start to the day").await;
        let weather_base = start_weather_mock("Dubai: ☀️ +38°C\n").await;
        let (graph_base, sends) = start_graph_mock().await;
        let base = spawn_gateway(test_state(&llm_base, &weather_base, &graph_base, None)).await;

        let resp = post_webhook(&base, &text_message_payload("111", "brief")).await;
        assert_eq!(resp.status(), 200);

        let prompt = {
            let requests = llm_requests.lock().unwrap();
            requests[0]["messages"][0]["content"]
                .as_str()
                .unwrap()
                .to_string()
        };
        assert!(prompt.contains("Dubai: ☀️ +38°C"));

        let sends = sends.lock().unwrap();
        assert_eq!(sends[0]["text"]["body"], "sunny start to the day");
    }

    #[tokio::test]
    async fn summarize_preserves_url_case() {
        let (llm_base, llm_requests) = start_llm_mock("- summary").await;
        let page_base = start_page_mock("/Mixed/CasePage", "CASE PAGE CONTENT").await;
        let (graph_base, _sends) = start_graph_mock().await;
        let base = spawn_gateway(test_state(&llm_base, NO_SERVER, &graph_base, None)).await;

        let text = format!("Summarize {page_base}/Mixed/CasePage");
        let resp = post_webhook(&base, &text_message_payload("111", &text)).await;
        assert_eq!(resp.status(), 200);

        let requests = llm_requests.lock().unwrap();
        let prompt = requests[0]["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.starts_with("Summarize in 5 bullets:\n"));
        assert!(prompt.contains("CASE PAGE CONTENT"));
    }

    #[tokio::test]
    async fn long_replies_are_truncated_before_send() {
        let long_reply = "y".repeat(5000);
        let (llm_base, _llm_requests) = start_llm_mock(&long_reply).await;
        let (graph_base, sends) = start_graph_mock().await;
        let base = spawn_gateway(test_state(&llm_base, NO_SERVER, &graph_base, None)).await;

        let resp = post_webhook(&base, &text_message_payload("111", "hello there")).await;
        assert_eq!(resp.status(), 200);

        let sends = sends.lock().unwrap();
        let body = sends[0]["text"]["body"].as_str().unwrap();
        assert_eq!(body.len(), 4096);
    }

    #[tokio::test]
    async fn unparseable_body_still_returns_ok() {
        let (graph_base, sends) = start_graph_mock().await;
        let base = spawn_gateway(test_state(NO_SERVER, NO_SERVER, &graph_base, None)).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/webhook"))
            .body("this is not json")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true }));
        assert!(sends.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn collaborator_failure_still_returns_ok() {
        let (graph_base, sends) = start_graph_mock().await;
        // Weather collaborator unreachable, so the brief branch fails.
        let base = spawn_gateway(test_state(NO_SERVER, NO_SERVER, &graph_base, None)).await;

        let resp = post_webhook(&base, &text_message_payload("111", "brief")).await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true }));
        assert!(sends.lock().unwrap().is_empty());
    }

    fn sign(body: &str, app_secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()).unwrap();
        mac.update(body.as_bytes());
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[tokio::test]
    async fn signed_webhook_is_processed() {
        let (graph_base, sends) = start_graph_mock().await;
        let base =
            spawn_gateway(test_state(NO_SERVER, NO_SERVER, &graph_base, Some("app-secret"))).await;

        let body = text_message_payload("111", "hi").to_string();
        let resp = reqwest::Client::new()
            .post(format!("{base}/webhook"))
            .header("X-Hub-Signature-256", sign(&body, "app-secret"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(sends.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_without_processing() {
        let (graph_base, sends) = start_graph_mock().await;
        let base =
            spawn_gateway(test_state(NO_SERVER, NO_SERVER, &graph_base, Some("app-secret"))).await;

        let body = text_message_payload("111", "hi").to_string();
        let resp = reqwest::Client::new()
            .post(format!("{base}/webhook"))
            .header("X-Hub-Signature-256", sign(&body, "wrong-secret"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 403);
        assert!(sends.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_signature_is_rejected_when_secret_configured() {
        let (graph_base, sends) = start_graph_mock().await;
        let base =
            spawn_gateway(test_state(NO_SERVER, NO_SERVER, &graph_base, Some("app-secret"))).await;

        let resp = post_webhook(&base, &text_message_payload("111", "hi")).await;

        assert_eq!(resp.status(), 403);
        assert!(sends.lock().unwrap().is_empty());
    }
}
