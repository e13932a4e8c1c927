use async_trait::async_trait;
use platform_api::{ApiResult, RestClient};
use serde_json::Value;

use crate::employee::EmployeeDraft;

/// Remote side of the directory. Bodies are returned raw so the directory can
/// normalize whatever shape the server sends.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    async fn list(&self) -> ApiResult<Value>;

    async fn create(&self, draft: &EmployeeDraft) -> ApiResult<Value>;
}

/// `GET`/`POST` against a single employees endpoint.
#[derive(Clone, Debug)]
pub struct RestEmployeeApi {
    client: RestClient,
    endpoint: String,
}

impl RestEmployeeApi {
    pub fn new(client: RestClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmployeeApi for RestEmployeeApi {
    async fn list(&self) -> ApiResult<Value> {
        self.client.get_json(&self.endpoint).await
    }

    async fn create(&self, draft: &EmployeeDraft) -> ApiResult<Value> {
        self.client
            .post_json(&self.endpoint, &draft.to_unassigned())
            .await
    }
}
