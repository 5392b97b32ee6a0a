use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::SyncError;
use super::store::StatusStore;
use super::types::UpdateStatusRequest;
use crate::workflow::{ItemId, WorkflowItem};

/// REST-backed [`StatusStore`] for one resource (`hallazgos`, `acciones`).
pub struct HttpStatusStore {
    client: Client,
    base_url: String,
    resource: String,
    token: Option<String>,
}

impl HttpStatusStore {
    pub fn new(base_url: &str, resource: &str) -> Result<Self, SyncError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            resource: resource.trim_matches('/').to_string(),
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request. Empty tokens are ignored.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = (!token.is_empty()).then(|| token.to_string());
        self
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.resource)
    }

    fn item_url(&self, item_id: &ItemId) -> String {
        format!("{}/{}/{}", self.base_url, self.resource, item_id)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

impl StatusStore for HttpStatusStore {
    async fn update_status(
        &self,
        item_id: &ItemId,
        new_status: &str,
    ) -> Result<WorkflowItem, SyncError> {
        let request_id = Uuid::new_v4();
        debug!(%item_id, new_status, %request_id, "PUT status");

        let response = self
            .authorize(self.client.put(self.item_url(item_id)))
            .header("x-request-id", request_id.to_string())
            .json(&UpdateStatusRequest { estado: new_status })
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound(item_id.clone()));
        }

        read_body(response).await
    }

    async fn fetch_items(&self) -> Result<Vec<WorkflowItem>, SyncError> {
        let response = self
            .authorize(self.client.get(self.collection_url()))
            .send()
            .await?;
        read_body(response).await
    }
}

/// Some endpoints wrap their payload in `{"data": ...}`, others return it bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

async fn read_body<T: DeserializeOwned>(response: Response) -> Result<T, SyncError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        warn!(status = status.as_u16(), %message, "backend returned an error");
        return Err(SyncError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.json::<Envelope<T>>().await?;
    Ok(body.into_inner())
}

/// Extracts a human-readable message from an error body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| json.get(key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn store(server: &MockServer) -> HttpStatusStore {
        HttpStatusStore::new(&format!("{}/api/", server.uri()), "hallazgos").unwrap()
    }

    #[tokio::test]
    async fn update_status_puts_estado() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/hallazgos/12"))
            .and(body_json(serde_json::json!({"estado": "t1_en_analisis"})))
            .and(header_exists("x-request-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 12,
                "estado": "t1_en_analisis",
                "descripcion": "Equipo sin calibrar"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updated = store(&server)
            .await
            .update_status(&ItemId::from("12"), "t1_en_analisis")
            .await
            .unwrap();
        assert_eq!(updated.id.as_str(), "12");
        assert_eq!(updated.status, "t1_en_analisis");
        assert_eq!(updated.title.as_deref(), Some("Equipo sin calibrar"));
    }

    #[tokio::test]
    async fn bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/hallazgos"))
            .and(header("authorization", "Bearer secreto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let items = store(&server).await.with_token("secreto").fetch_items().await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn fetch_items_accepts_data_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/hallazgos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": 1, "estado": "d1_iniciado"},
                    {"id": "2", "estado": "c3_en_verificacion"}
                ]
            })))
            .mount(&server)
            .await;

        let items = store(&server).await.fetch_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id.as_str(), "2");
        assert_eq!(items[1].status, "c3_en_verificacion");
    }

    #[tokio::test]
    async fn server_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/hallazgos/5"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Falta el análisis de causa raíz"
            })))
            .mount(&server)
            .await;

        let err = store(&server)
            .await
            .update_status(&ItemId::from("5"), "c1_pendiente_de_verificacion")
            .await
            .unwrap_err();
        match err {
            SyncError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Falta el análisis de causa raíz");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_item_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/hallazgos/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = store(&server)
            .await
            .update_status(&ItemId::from("99"), "t1_en_analisis")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotFound(id) if id.as_str() == "99"));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let store = HttpStatusStore::new("http://127.0.0.1:1", "hallazgos").unwrap();
        let err = store.fetch_items().await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(error_message(r#"{"error":"conflicto"}"#).as_deref(), Some("conflicto"));
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message(r#"{"code":7}"#).as_deref(), Some(r#"{"code":7}"#));
        assert_eq!(error_message("   "), None);
    }
}
