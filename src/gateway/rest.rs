//! HTTP clients for the clinic service.
//!
//! `RestGateway` speaks the collection contract (`GET/POST {base}/{collection}`,
//! `PUT/DELETE {base}/{collection}/{id}`), `HttpAssistant` the chat contract
//! (`POST {base}/chat/message`). Both decode JSON and map transport failures
//! to `GatewayError`, preferring the server's `detail` message when one is
//! present in an error body.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{AssistantReply, AssistantTransport, CollectionTransport, GatewayError};
use crate::collection::Resource;
use crate::config;

/// Everything a gateway needs to know about where it talks to and as whom.
///
/// Constructed once (at sign-in) and handed to each controller's transport
/// explicitly; nothing reads ambient global state.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub base_url: String,
    /// Opaque bearer credential. Attached verbatim when present; obtaining
    /// it is the caller's concern.
    pub auth_token: Option<String>,
}

impl ClientContext {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    /// Context for the configured backend (`SMARTCLINIC_API_URL` or the
    /// localhost default).
    pub fn from_env() -> Self {
        Self::new(&config::default_api_base_url())
    }

    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }
}

/// Error body shape the clinic service uses for failures.
#[derive(Deserialize)]
struct ServerDetail {
    detail: String,
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to create HTTP client")
}

/// Resolve a non-success response to an error, preferring the server's
/// detail message over the generic per-operation one.
async fn status_error(
    response: reqwest::Response,
    fallback: impl FnOnce() -> String,
) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ServerDetail>(&body)
        .map(|d| d.detail)
        .unwrap_or_else(|_| fallback());
    GatewayError::Status { status, message }
}

/// Typed wrapper over the remote collection service.
pub struct RestGateway {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl RestGateway {
    pub fn new(context: &ClientContext) -> Self {
        Self::with_timeout(context, config::DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn with_timeout(context: &ClientContext, timeout_secs: u64) -> Self {
        Self {
            base_url: context.base_url.clone(),
            auth_token: context.auth_token.clone(),
            client: build_client(timeout_secs),
            timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_connect() {
            GatewayError::Connection(self.base_url.clone())
        } else if err.is_timeout() {
            GatewayError::Timeout(self.timeout_secs)
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl<R: Resource> CollectionTransport<R> for RestGateway {
    async fn list(&self) -> Result<Vec<R>, GatewayError> {
        let url = format!("{}/{}", self.base_url, R::COLLECTION);
        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(status_error(response, || format!("Failed to fetch {}", R::COLLECTION)).await);
        }

        response
            .json::<Vec<R>>()
            .await
            .map_err(|e| GatewayError::ResponseParsing(e.to_string()))
    }

    async fn create(&self, fields: &R::Draft) -> Result<R, GatewayError> {
        let url = format!("{}/{}", self.base_url, R::COLLECTION);
        let response = self
            .request(Method::POST, &url)
            .json(fields)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(status_error(response, || format!("Failed to create {}", R::LABEL)).await);
        }

        response
            .json::<R>()
            .await
            .map_err(|e| GatewayError::ResponseParsing(e.to_string()))
    }

    async fn update(&self, id: &str, fields: &R::Patch) -> Result<R, GatewayError> {
        let url = format!("{}/{}/{}", self.base_url, R::COLLECTION, id);
        let response = self
            .request(Method::PUT, &url)
            .json(fields)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(status_error(response, || format!("Failed to update {}", R::LABEL)).await);
        }

        response
            .json::<R>()
            .await
            .map_err(|e| GatewayError::ResponseParsing(e.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let url = format!("{}/{}/{}", self.base_url, R::COLLECTION, id);
        let response = self
            .request(Method::DELETE, &url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(status_error(response, || format!("Failed to delete {}", R::LABEL)).await);
        }

        // The service answers with an acknowledgement body; the contract is
        // fire-and-forget, so it is discarded.
        Ok(())
    }
}

/// Outgoing chat message. `session_id` is omitted entirely on the first
/// turn, before the service has assigned one.
#[derive(Serialize)]
struct AssistantRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

/// HTTP client for the chat completion service.
pub struct HttpAssistant {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpAssistant {
    pub fn new(context: &ClientContext) -> Self {
        Self::with_timeout(context, config::DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn with_timeout(context: &ClientContext, timeout_secs: u64) -> Self {
        Self {
            base_url: context.base_url.clone(),
            auth_token: context.auth_token.clone(),
            client: build_client(timeout_secs),
            timeout_secs,
        }
    }
}

impl AssistantTransport for HttpAssistant {
    async fn send(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<AssistantReply, GatewayError> {
        let url = format!("{}/chat/message", self.base_url);
        let body = AssistantRequest {
            message,
            session_id,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                GatewayError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                GatewayError::Timeout(self.timeout_secs)
            } else {
                GatewayError::Transport(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(
                status_error(response, || "Failed to get a response from the assistant".into())
                    .await,
            );
        }

        response
            .json::<AssistantReply>()
            .await
            .map_err(|e| GatewayError::ResponseParsing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::models::test_fixtures::{appointment, patient};
    use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, Patient};

    /// Serve a router on an ephemeral local port; returns its base URL.
    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn gateway(base_url: &str) -> RestGateway {
        RestGateway::new(&ClientContext::new(base_url))
    }

    // ── Construction ──

    #[test]
    fn context_trims_trailing_slash() {
        let ctx = ClientContext::new("http://localhost:8000/api/");
        assert_eq!(ctx.base_url, "http://localhost:8000/api");
    }

    #[test]
    fn auth_token_is_optional_and_chainable() {
        let ctx = ClientContext::new("http://localhost:8000/api");
        assert!(ctx.auth_token.is_none());
        let ctx = ctx.with_auth_token("tok-1");
        assert_eq!(ctx.auth_token.as_deref(), Some("tok-1"));
    }

    // ── List / decode ──

    #[tokio::test]
    async fn list_decodes_the_collection() {
        let records = vec![patient("p1", "Amira", "Haddad"), patient("p2", "Nadia", "Osei")];
        let payload = serde_json::to_value(&records).unwrap();
        let app = Router::new().route("/patients", get(move || async move { Json(payload) }));

        let gw = gateway(&spawn_server(app).await);
        let listed: Vec<Patient> = CollectionTransport::<Patient>::list(&gw).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "p1");
        assert_eq!(listed[1].full_name(), "Nadia Osei");
    }

    // ── Error mapping ──

    #[tokio::test]
    async fn server_detail_is_preferred_over_generic_message() {
        let app = Router::new().route(
            "/patients",
            get(move || async move {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "detail": "Patient not found" })),
                )
            }),
        );

        let gw = gateway(&spawn_server(app).await);
        let err = CollectionTransport::<Patient>::list(&gw).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Status {
                status: 404,
                message: "Patient not found".into(),
            }
        );
    }

    #[tokio::test]
    async fn generic_message_when_server_gives_no_detail() {
        let app = Router::new().route(
            "/patients",
            get(move || async move { StatusCode::INTERNAL_SERVER_ERROR }),
        );

        let gw = gateway(&spawn_server(app).await);
        let err = CollectionTransport::<Patient>::list(&gw).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Status {
                status: 500,
                message: "Failed to fetch patients".into(),
            }
        );
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connection_error() {
        // Bind to learn a free port, then drop the listener so nothing answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let gw = gateway(&base);
        let err = CollectionTransport::<Patient>::list(&gw).await.unwrap_err();
        assert_eq!(err, GatewayError::Connection(base));
    }

    // ── Partial update wire shape ──

    #[tokio::test]
    async fn update_sends_only_supplied_fields() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let seen_by_handler = seen.clone();
        let reply = serde_json::to_value(appointment("a1", "p1")).unwrap();

        let app = Router::new().route(
            "/appointments/:id",
            put(move |Json(body): Json<Value>| async move {
                *seen_by_handler.lock().unwrap() = Some(body);
                Json(reply)
            }),
        );

        let gw = gateway(&spawn_server(app).await);
        let patch = AppointmentPatch::status_only(AppointmentStatus::Cancelled);
        let updated: Appointment = CollectionTransport::<Appointment>::update(&gw, "a1", &patch)
            .await
            .unwrap();
        assert_eq!(updated.id, "a1");

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body, json!({ "status": "cancelled" }));
    }

    // ── Bearer credential ──

    #[tokio::test]
    async fn bearer_token_travels_when_present() {
        let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let seen_by_handler = seen.clone();

        let app = Router::new().route(
            "/patients",
            get(move |headers: HeaderMap| async move {
                *seen_by_handler.lock().unwrap() = headers
                    .get("authorization")
                    .map(|v| v.to_str().unwrap().to_string());
                Json(Value::Array(vec![]))
            }),
        );

        let ctx = ClientContext::new(&spawn_server(app).await).with_auth_token("tok-9");
        let gw = RestGateway::new(&ctx);
        let _: Vec<Patient> = CollectionTransport::<Patient>::list(&gw).await.unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("Bearer tok-9"));
    }

    // ── Assistant ──

    #[tokio::test]
    async fn assistant_round_trip_echoes_session() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let seen_by_handler = seen.clone();

        let app = Router::new().route(
            "/chat/message",
            post(move |Json(body): Json<Value>| async move {
                *seen_by_handler.lock().unwrap() = Some(body);
                Json(json!({ "response": "Drink water.", "session_id": "s-42" }))
            }),
        );

        let assistant = HttpAssistant::new(&ClientContext::new(&spawn_server(app).await));
        let reply = assistant.send("Any hydration tips?", Some("s-42")).await.unwrap();
        assert_eq!(reply.response, "Drink water.");
        assert_eq!(reply.session_id, "s-42");

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(
            body,
            json!({ "message": "Any hydration tips?", "session_id": "s-42" })
        );
    }

    #[tokio::test]
    async fn assistant_first_turn_omits_session_id() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let seen_by_handler = seen.clone();

        let app = Router::new().route(
            "/chat/message",
            post(move |Json(body): Json<Value>| async move {
                *seen_by_handler.lock().unwrap() = Some(body);
                Json(json!({ "response": "Hello!", "session_id": "s-1" }))
            }),
        );

        let assistant = HttpAssistant::new(&ClientContext::new(&spawn_server(app).await));
        assistant.send("Hi", None).await.unwrap();

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body, json!({ "message": "Hi" }));
    }
}
