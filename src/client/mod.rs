//! Typed client for the gateway backend's REST API.
//!
//! One method per endpoint family, all returning
//! [`ConsoleResult`](crate::error::ConsoleResult). Every non-streaming
//! endpoint except `/api/pricing` wraps its payload in the standard
//! `{success, message, data}` envelope; `success: false` surfaces as
//! [`ConsoleError::Api`] so callers treat backend-reported failures and
//! transport failures the same way.
//!
//! A 401 on any response clears the cached `user` entry from the injected
//! store and returns [`ConsoleError::SessionExpired`] carrying the request
//! path, so the embedding UI can round-trip a post-login return. No request
//! is ever retried.

mod options;

pub use options::{OptionEntry, OptionsService};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::analytics::Granularity;
use crate::api_types::{
    ApiEnvelope, CreatePlan, GroupInfo, PlanOrderPage, PricingResponse,
    SubscriptionPlan, UsageQuery, UsageRecord, UserPlanOrder, UserSelf,
};
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::store::{LocalStore, StoreKey};

/// HTTP client for the gateway backend.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
    user_header: String,
    user_id: Option<String>,
    timeout: Duration,
    store: Arc<dyn LocalStore>,
}

impl GatewayClient {
    pub fn new(
        config: &ConsoleConfig,
        store: Arc<dyn LocalStore>,
    ) -> ConsoleResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: Url::parse(&config.base_url)?,
            user_header: config.user_header.clone(),
            user_id: config.user_id.clone(),
            timeout: config.timeout(),
            store,
        })
    }

    /// Opaque user identifier for the per-request header: the configured
    /// override if set, else the `id` of the cached user snapshot.
    fn user_identifier(&self) -> Option<String> {
        if let Some(id) = &self.user_id {
            return Some(id.clone());
        }
        let user: serde_json::Value = self.store.get_json(StoreKey::User)?;
        match user.get("id")? {
            serde_json::Value::String(id) => Some(id.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Request with common headers but no total-duration timeout. Streaming
    /// calls use this directly; everything else goes through [`request`].
    fn base_request(
        &self,
        method: Method,
        path: &str,
    ) -> ConsoleResult<RequestBuilder> {
        let url = self.base_url.join(path)?;
        let mut builder = self
            .http
            .request(method, url)
            .header("X-Request-Id", Uuid::new_v4().to_string());
        if let Some(user) = self.user_identifier() {
            builder = builder.header(&self.user_header, user);
        }
        Ok(builder)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> ConsoleResult<RequestBuilder> {
        Ok(self.base_request(method, path)?.timeout(self.timeout))
    }

    fn session_expired(&self, path: &str) -> ConsoleError {
        self.store.remove(StoreKey::User);
        tracing::warn!(path, "session expired, cleared cached user");
        ConsoleError::SessionExpired {
            return_to: path.to_string(),
        }
    }

    /// Map 401 and other non-2xx statuses before the body is consumed.
    async fn accept(
        &self,
        response: Response,
        path: &str,
    ) -> ConsoleResult<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.session_expired(path));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .and_then(|body| {
                    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(
                        &body,
                    )
                    .ok()
                })
                .map(|envelope| envelope.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("unexpected status {status}"));
            tracing::debug!(path, %status, "request failed");
            return Err(ConsoleError::Api { message });
        }
        tracing::debug!(path, %status, "request ok");
        Ok(response)
    }

    async fn get_enveloped<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> ConsoleResult<T> {
        let response = self.request(Method::GET, path)?.send().await?;
        let response = self.accept(response, path).await?;
        response.json::<ApiEnvelope<T>>().await?.into_result()
    }

    // ---- pricing ----

    /// `GET /api/pricing`. Flat response, not enveloped.
    pub async fn pricing(&self) -> ConsoleResult<PricingResponse> {
        let path = "/api/pricing";
        let response = self.request(Method::GET, path)?.send().await?;
        let response = self.accept(response, path).await?;
        let pricing: PricingResponse = response.json().await?;
        if !pricing.success {
            return Err(ConsoleError::Api {
                message: pricing.message,
            });
        }
        Ok(pricing)
    }

    // ---- usage data ----

    /// `GET /api/data/` (admin view, optionally filtered by username).
    pub async fn usage(
        &self,
        query: &UsageQuery,
        granularity: Granularity,
    ) -> ConsoleResult<Vec<UsageRecord>> {
        self.usage_at(
            "/api/data/",
            Some(query.username.as_str()),
            query,
            granularity,
        )
        .await
    }

    /// `GET /api/data/self/` (the calling user's own records).
    pub async fn usage_self(
        &self,
        query: &UsageQuery,
        granularity: Granularity,
    ) -> ConsoleResult<Vec<UsageRecord>> {
        self.usage_at("/api/data/self/", None, query, granularity).await
    }

    async fn usage_at(
        &self,
        path: &str,
        username: Option<&str>,
        query: &UsageQuery,
        granularity: Granularity,
    ) -> ConsoleResult<Vec<UsageRecord>> {
        let mut builder = self.request(Method::GET, path)?.query(&[
            ("start_timestamp", query.start_timestamp.to_string().as_str()),
            ("end_timestamp", query.end_timestamp.to_string().as_str()),
            ("default_time", granularity.as_str()),
        ]);
        if let Some(username) = username {
            builder = builder.query(&[("username", username)]);
        }
        let response = builder.send().await?;
        let response = self.accept(response, path).await?;
        response
            .json::<ApiEnvelope<Vec<UsageRecord>>>()
            .await?
            .into_result()
    }

    // ---- account metadata ----

    pub async fn user_self(&self) -> ConsoleResult<UserSelf> {
        self.get_enveloped("/api/user/self").await
    }

    pub async fn user_models(&self) -> ConsoleResult<Vec<String>> {
        self.get_enveloped("/api/user/models").await
    }

    pub async fn user_groups(
        &self,
    ) -> ConsoleResult<HashMap<String, GroupInfo>> {
        self.get_enveloped("/api/user/self/groups").await
    }

    // ---- options ----

    pub async fn options(&self) -> ConsoleResult<Vec<OptionEntry>> {
        self.get_enveloped("/api/option/").await
    }

    pub async fn update_option(
        &self,
        key: &str,
        value: &str,
    ) -> ConsoleResult<()> {
        let path = "/api/option/";
        let response = self
            .request(Method::PUT, path)?
            .json(&serde_json::json!({ "key": key, "value": value }))
            .send()
            .await?;
        let response = self.accept(response, path).await?;
        response
            .json::<ApiEnvelope<serde_json::Value>>()
            .await?
            .into_ack()
    }

    // ---- subscription plans ----

    /// Probe whether the plan API is deployed. Only a 404 means absent;
    /// any other answer (including an in-band failure) means the routes
    /// exist.
    pub(crate) async fn plan_api_deployed(&self) -> ConsoleResult<bool> {
        let path = "/api/plan/purchase";
        let response = self.request(Method::GET, path)?.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.session_expired(path));
        }
        Ok(true)
    }

    pub(crate) async fn plans(&self) -> ConsoleResult<Vec<SubscriptionPlan>> {
        self.get_enveloped("/api/plan/").await
    }

    pub(crate) async fn admin_plans(
        &self,
    ) -> ConsoleResult<Vec<SubscriptionPlan>> {
        self.get_enveloped("/api/plan/admin/").await
    }

    pub(crate) async fn create_plan(
        &self,
        plan: &CreatePlan,
    ) -> ConsoleResult<SubscriptionPlan> {
        let path = "/api/plan/admin/";
        let response = self
            .request(Method::POST, path)?
            .json(plan)
            .send()
            .await?;
        let response = self.accept(response, path).await?;
        response
            .json::<ApiEnvelope<SubscriptionPlan>>()
            .await?
            .into_result()
    }

    /// Updates replace the whole plan; the body carries the id.
    pub(crate) async fn update_plan(
        &self,
        plan: &SubscriptionPlan,
    ) -> ConsoleResult<SubscriptionPlan> {
        let path = "/api/plan/admin/";
        let response =
            self.request(Method::PUT, path)?.json(plan).send().await?;
        let response = self.accept(response, path).await?;
        response
            .json::<ApiEnvelope<SubscriptionPlan>>()
            .await?
            .into_result()
    }

    pub(crate) async fn delete_plan(&self, id: i64) -> ConsoleResult<()> {
        let path = format!("/api/plan/admin/{id}");
        let response = self.request(Method::DELETE, &path)?.send().await?;
        let response = self.accept(response, &path).await?;
        response
            .json::<ApiEnvelope<serde_json::Value>>()
            .await?
            .into_ack()
    }

    pub(crate) async fn purchase_plan(
        &self,
        plan_id: i64,
    ) -> ConsoleResult<UserPlanOrder> {
        let path = "/api/plan/purchase";
        let response = self
            .request(Method::POST, path)?
            .json(&serde_json::json!({ "plan_id": plan_id }))
            .send()
            .await?;
        let response = self.accept(response, path).await?;
        response
            .json::<ApiEnvelope<UserPlanOrder>>()
            .await?
            .into_result()
    }

    pub(crate) async fn plan_orders(
        &self,
        page: u32,
        page_size: u32,
    ) -> ConsoleResult<PlanOrderPage> {
        let path = "/api/plan/self";
        let response = self
            .request(Method::GET, path)?
            .query(&[("p", page), ("page_size", page_size)])
            .send()
            .await?;
        let response = self.accept(response, path).await?;
        response
            .json::<ApiEnvelope<PlanOrderPage>>()
            .await?
            .into_result()
    }

    // ---- chat playground ----

    /// `POST /pg/chat/completions`, returning the raw streaming response.
    /// Exempt from the total-duration timeout; the playground applies its
    /// own idle timeout between chunks.
    pub(crate) async fn chat_completions(
        &self,
        payload: &serde_json::Value,
    ) -> ConsoleResult<Response> {
        let path = "/pg/chat/completions";
        let response = self
            .base_request(Method::POST, path)?
            .json(payload)
            .send()
            .await?;
        self.accept(response, path).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::MemoryStore;

    async fn client_for(server: &MockServer) -> (GatewayClient, Arc<dyn LocalStore>) {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let config = ConsoleConfig {
            base_url: server.uri(),
            user_id: Some("42".to_string()),
            ..ConsoleConfig::default()
        };
        let client = GatewayClient::new(&config, Arc::clone(&store)).unwrap();
        (client, store)
    }

    #[tokio::test]
    async fn enveloped_success_unwraps_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/models"))
            .and(header_exists("X-Request-Id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "data": ["gpt-4o"]}),
            ))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        assert_eq!(client.user_models().await.unwrap(), vec!["gpt-4o"]);
    }

    #[tokio::test]
    async fn in_band_failure_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": false, "message": "no such user"}),
            ))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        match client.user_self().await {
            Err(ConsoleError::Api { message }) => {
                assert_eq!(message, "no such user")
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_clears_user_and_reports_session_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/self"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (client, store) = client_for(&server).await;
        store.set(StoreKey::User, r#"{"id": 42}"#.to_string());

        match client.user_self().await {
            Err(ConsoleError::SessionExpired { return_to }) => {
                assert_eq!(return_to, "/api/user/self");
            }
            other => panic!("expected SessionExpired, got {other:?}"),
        }
        assert_eq!(store.get(StoreKey::User), None);
    }

    #[tokio::test]
    async fn usage_query_carries_window_and_granularity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/"))
            .and(query_param("username", "amy"))
            .and(query_param("start_timestamp", "100"))
            .and(query_param("end_timestamp", "200"))
            .and(query_param("default_time", "day"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "data": [
                    {"model_name": "gpt-4o", "quota": 5, "count": 1,
                     "token_used": 12, "created_at": 150}
                ]}),
            ))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        let query = UsageQuery {
            username: "amy".to_string(),
            start_timestamp: 100,
            end_timestamp: 200,
        };
        let records =
            client.usage(&query, Granularity::Day).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].model_name, "gpt-4o");
    }

    #[tokio::test]
    async fn user_header_carries_the_cached_user_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/models"))
            .and(wiremock::matchers::header("Gateway-User", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "data": []}),
            ))
            .mount(&server)
            .await;

        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        store.set(StoreKey::User, r#"{"id": 7}"#.to_string());
        let config = ConsoleConfig {
            base_url: server.uri(),
            ..ConsoleConfig::default()
        };
        let client = GatewayClient::new(&config, store).unwrap();
        assert!(client.user_models().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pricing_parses_the_flat_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pricing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "success": true,
                    "data": [{"model_name": "gpt-4o", "model_ratio": 2.5}],
                    "group_ratio": {"default": 1.0},
                    "usable_group": {}
                }),
            ))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        let pricing = client.pricing().await.unwrap();
        assert_eq!(pricing.data[0].model_name, "gpt-4o");
        assert_eq!(pricing.group_ratio["default"], 1.0);
    }

    #[tokio::test]
    async fn plan_probe_maps_404_to_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plan/purchase"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        assert!(!client.plan_api_deployed().await.unwrap());
    }

    #[tokio::test]
    async fn plan_probe_treats_any_other_answer_as_deployed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plan/purchase"))
            .respond_with(ResponseTemplate::new(405).set_body_json(
                serde_json::json!({"success": false, "message": "GET not allowed"}),
            ))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server).await;
        assert!(client.plan_api_deployed().await.unwrap());
    }
}
