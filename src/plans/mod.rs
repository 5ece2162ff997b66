//! Subscription plans as a probed capability.
//!
//! Not every gateway deployment ships the plan subsystem; its routes
//! simply 404 when absent. Rather than letting every caller special-case
//! that, the service probes once per lifetime and caches the answer. When
//! the probe says [`PlanCapability::Unavailable`], every operation
//! short-circuits to [`ConsoleError::FeatureUnavailable`] — an
//! informational state the UI renders as "not offered here", not as an
//! error.
//!
//! Purchase semantics follow the backend: a plan's `price` is deducted
//! from the pay-as-you-go quota and `total_quota` is granted to the
//! subscription balance; `duration_days == 0` means the grant never
//! expires.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::api_types::{
    CreatePlan, PlanOrderPage, SubscriptionPlan, UserPlanOrder,
};
use crate::client::GatewayClient;
use crate::error::{ConsoleError, ConsoleResult};

const FEATURE: &str = "subscription plans";

/// Whether the backend deploys the plan API at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanCapability {
    Available,
    Unavailable,
}

/// Plan catalog, purchase, and order-history operations.
pub struct PlanService {
    client: Arc<GatewayClient>,
    capability: OnceCell<PlanCapability>,
}

impl PlanService {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self {
            client,
            capability: OnceCell::new(),
        }
    }

    /// Probe result, determined once per service lifetime. Only a 404
    /// from the probe endpoint means the feature is absent; transport
    /// errors propagate without poisoning the cache.
    pub async fn capability(&self) -> ConsoleResult<PlanCapability> {
        self.capability
            .get_or_try_init(|| async {
                let deployed = self.client.plan_api_deployed().await?;
                if !deployed {
                    tracing::debug!("plan API absent on this backend");
                }
                Ok::<_, ConsoleError>(if deployed {
                    PlanCapability::Available
                } else {
                    PlanCapability::Unavailable
                })
            })
            .await
            .copied()
    }

    async fn ensure_available(&self) -> ConsoleResult<()> {
        match self.capability().await? {
            PlanCapability::Available => Ok(()),
            PlanCapability::Unavailable => {
                Err(ConsoleError::FeatureUnavailable(FEATURE))
            }
        }
    }

    /// Plans visible to users (enabled only).
    pub async fn plans(&self) -> ConsoleResult<Vec<SubscriptionPlan>> {
        self.ensure_available().await?;
        self.client.plans().await
    }

    /// All plans including disabled ones, for the admin console.
    pub async fn admin_plans(&self) -> ConsoleResult<Vec<SubscriptionPlan>> {
        self.ensure_available().await?;
        self.client.admin_plans().await
    }

    pub async fn create(
        &self,
        plan: &CreatePlan,
    ) -> ConsoleResult<SubscriptionPlan> {
        self.ensure_available().await?;
        self.client.create_plan(plan).await
    }

    /// Full replace; the backend overwrites every field from the body.
    pub async fn update(
        &self,
        plan: &SubscriptionPlan,
    ) -> ConsoleResult<SubscriptionPlan> {
        self.ensure_available().await?;
        self.client.update_plan(plan).await
    }

    pub async fn delete(&self, id: i64) -> ConsoleResult<()> {
        self.ensure_available().await?;
        self.client.delete_plan(id).await
    }

    pub async fn purchase(&self, plan_id: i64) -> ConsoleResult<UserPlanOrder> {
        self.ensure_available().await?;
        self.client.purchase_plan(plan_id).await
    }

    /// The calling user's purchase history, paged.
    pub async fn orders(
        &self,
        page: u32,
        page_size: u32,
    ) -> ConsoleResult<PlanOrderPage> {
        self.ensure_available().await?;
        self.client.plan_orders(page, page_size).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ConsoleConfig;
    use crate::store::{LocalStore, MemoryStore};

    fn service_for(server: &MockServer) -> PlanService {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let config = ConsoleConfig {
            base_url: server.uri(),
            ..ConsoleConfig::default()
        };
        PlanService::new(Arc::new(
            GatewayClient::new(&config, store).unwrap(),
        ))
    }

    async fn mount_probe(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/plan/purchase"))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn absent_backend_degrades_to_feature_unavailable() {
        let server = MockServer::start().await;
        mount_probe(&server, 404).await;

        let service = service_for(&server);
        assert_eq!(
            service.capability().await.unwrap(),
            PlanCapability::Unavailable
        );
        match service.plans().await {
            Err(error @ ConsoleError::FeatureUnavailable(_)) => {
                assert!(error.is_informational());
            }
            other => panic!("expected FeatureUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn the_probe_runs_once_per_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plan/purchase"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let _ = service.capability().await.unwrap();
        let _ = service.capability().await.unwrap();
        let _ = service.plans().await;
    }

    #[tokio::test]
    async fn available_backend_lists_and_purchases() {
        let server = MockServer::start().await;
        mount_probe(&server, 405).await;
        Mock::given(method("GET"))
            .and(path("/api/plan/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "data": [
                    {"id": 1, "name": "starter", "price": 500000,
                     "total_quota": 2000000, "duration_days": 30}
                ]}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/plan/purchase"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "data": {
                    "id": 9, "plan_id": 1, "plan_name": "starter",
                    "price": 500000, "granted_quota": 2000000,
                    "duration_days": 30, "start_time": 1700000000,
                    "expire_time": 1702592000, "status": 1
                }}),
            ))
            .mount(&server)
            .await;

        let service = service_for(&server);
        let plans = service.plans().await.unwrap();
        assert_eq!(plans.len(), 1);
        assert!(plans[0].is_enabled());
        assert!(!plans[0].never_expires());

        let order = service.purchase(1).await.unwrap();
        assert_eq!(order.plan_id, 1);
        assert!(order.is_active());
    }

    #[tokio::test]
    async fn orders_are_paged() {
        let server = MockServer::start().await;
        mount_probe(&server, 405).await;
        Mock::given(method("GET"))
            .and(path("/api/plan/self"))
            .and(query_param("p", "2"))
            .and(query_param("page_size", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "data": {
                    "items": [], "total": 37
                }}),
            ))
            .mount(&server)
            .await;

        let page = service_for(&server).orders(2, 20).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 37);
    }

    #[tokio::test]
    async fn only_404_reads_as_absent() {
        let server = MockServer::start().await;
        mount_probe(&server, 500).await;
        assert_eq!(
            service_for(&server).capability().await.unwrap(),
            PlanCapability::Available
        );
    }

    #[tokio::test]
    async fn probe_transport_errors_propagate_uncached() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let config = ConsoleConfig {
            // Nothing listens here; the probe fails at the transport layer.
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..ConsoleConfig::default()
        };
        let service = PlanService::new(Arc::new(
            GatewayClient::new(&config, store).unwrap(),
        ));
        assert!(matches!(
            service.capability().await,
            Err(ConsoleError::Transport(_))
        ));
        // The failure was not cached as an answer.
        assert!(service.capability().await.is_err());
    }
}
