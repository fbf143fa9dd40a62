//! Seams between the poller and the outside world: where status snapshots
//! come from and how the loop waits between checks.

use std::time::Duration;

use async_trait::async_trait;
use ato_api::{ClientError, OrchestratorClient};
use ato_types::TestPlan;

/// Fetch the current status snapshot of a plan.
#[async_trait]
pub trait PlanStatusSource: Send + Sync {
    async fn fetch_plan(&self, plan_id: &str) -> Result<TestPlan, ClientError>;
}

#[async_trait]
impl PlanStatusSource for OrchestratorClient {
    async fn fetch_plan(&self, plan_id: &str) -> Result<TestPlan, ClientError> {
        self.get_plan(plan_id).await
    }
}

#[async_trait]
impl<T: PlanStatusSource + ?Sized> PlanStatusSource for &T {
    async fn fetch_plan(&self, plan_id: &str) -> Result<TestPlan, ClientError> {
        (**self).fetch_plan(plan_id).await
    }
}

/// Wait between two status checks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl<T: Sleeper + ?Sized> Sleeper for &T {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}
