use async_trait::async_trait;
use reqwest::RequestBuilder;
use tracing::debug;
use uuid::Uuid;

use super::{expect_success, read_json, SupabaseClient};
use crate::error::GatewayError;
use crate::gateway::{Record, RecordGateway};

impl SupabaseClient {
    async fn table_request(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.access_token().await;
        self.authorize(builder, token.as_deref())
    }
}

#[async_trait]
impl<R: Record> RecordGateway<R> for SupabaseClient {
    async fn list(&self, scope_id: Uuid) -> Result<Vec<R>, GatewayError> {
        let scope_filter = format!("eq.{scope_id}");
        let order = R::order_param();
        let builder = self.http().get(self.rest_url(R::TABLE)).query(&[
            ("select", "*"),
            (R::SCOPE_COLUMN, scope_filter.as_str()),
            ("order", order.as_str()),
        ]);
        let request = self.table_request(builder).await;
        let rows: Vec<R> = read_json(self.send(request, true).await?).await?;
        debug!(table = R::TABLE, %scope_id, rows = rows.len(), "listed rows");
        Ok(rows)
    }

    async fn create(&self, new: &R::New) -> Result<R, GatewayError> {
        let builder = self
            .http()
            .post(self.rest_url(R::TABLE))
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(&[new]);
        let request = self.table_request(builder).await;
        let rows: Vec<R> = read_json(self.send(request, false).await?).await?;
        rows.into_iter()
            .next()
            .ok_or(GatewayError::EmptyResponse(R::TABLE))
    }

    async fn update(&self, id: Uuid, patch: &R::Patch) -> Result<R, GatewayError> {
        let id_filter = format!("eq.{id}");
        let builder = self
            .http()
            .patch(self.rest_url(R::TABLE))
            .query(&[("id", id_filter.as_str()), ("select", "*")])
            .header("Prefer", "return=representation")
            .json(patch);
        let request = self.table_request(builder).await;
        let rows: Vec<R> = read_json(self.send(request, true).await?).await?;
        rows.into_iter().next().ok_or(GatewayError::NotFound {
            table: R::TABLE,
            id,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError> {
        let id_filter = format!("eq.{id}");
        let builder = self
            .http()
            .delete(self.rest_url(R::TABLE))
            .query(&[("id", id_filter.as_str())]);
        let request = self.table_request(builder).await;
        expect_success(self.send(request, true).await?).await?;
        debug!(table = R::TABLE, %id, "deleted row");
        Ok(())
    }
}
