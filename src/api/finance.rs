//! Finance movement endpoints.

use tracing::{debug, info, instrument};

use super::client::{segment, StayHubClient};
use super::error::Result;
use super::types::{
    ensure_unique_ids, FinanceMovement, PaginatedResponse, PaginationParams,
    RecordMovementRequest,
};

/// Whether a movement is money going out or coming in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    Expense,
    Revenue,
}

impl MovementKind {
    fn path(self) -> &'static str {
        match self {
            MovementKind::Expense => "/finance/expenses",
            MovementKind::Revenue => "/finance/revenues",
        }
    }
}

impl StayHubClient {
    /// Get one page of a property's finance movements.
    #[instrument(skip(self))]
    pub async fn property_movements(
        &self,
        property_id: &str,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<FinanceMovement>> {
        let page: PaginatedResponse<FinanceMovement> = self
            .get_query(
                &format!("/finance/properties/{}/movements", segment(property_id)),
                &params,
            )
            .await?;
        ensure_unique_ids(&page.data)?;
        debug!("Fetched {} movements", page.data.len());
        Ok(page)
    }

    /// Record an expense or revenue.
    ///
    /// The request is validated before being sent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a non-positive amount or an empty
    /// category, before anything is sent.
    #[instrument(skip(self, request), fields(property_id = %request.property_id))]
    pub async fn record_movement(
        &self,
        kind: MovementKind,
        request: RecordMovementRequest,
    ) -> Result<()> {
        let request = request.validate()?;
        self.post_no_content(kind.path(), &request).await?;
        info!(?kind, amount = request.amount, "Movement recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PROPERTY_ID: &str = "6a3c2f4e-1111-4a4a-9c9c-000000000001";

    #[tokio::test]
    async fn test_property_movements() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/finance/properties/{}/movements", PROPERTY_ID)))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "m1",
                    "description": null,
                    "amount": 2500,
                    "category": "CLEANING",
                    "property_id": PROPERTY_ID,
                    "created_at": "2025-01-02T10:00:00Z",
                    "updated_at": "2025-01-02T10:00:00Z"
                }],
                "pagination": {
                    "page": 1, "limit": 10, "total": 1, "total_pages": 1,
                    "has_next": false, "has_previous": false
                }
            })))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let page = client
            .property_movements(PROPERTY_ID, PaginationParams::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.data[0].amount, 2500);
        assert!(page.data[0].description.is_none());
    }

    #[tokio::test]
    async fn test_record_expense_uppercases_category() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/finance/expenses"))
            .and(body_partial_json(serde_json::json!({
                "amount": 4590,
                "category": "MAINTENANCE",
                "property_id": PROPERTY_ID
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        client
            .record_movement(
                MovementKind::Expense,
                RecordMovementRequest {
                    amount: 4590,
                    description: Some("Fix shower".to_string()),
                    category: "maintenance".to_string(),
                    property_id: PROPERTY_ID.to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_record_revenue_rejects_invalid_amount() {
        let server = MockServer::start().await;
        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let result = client
            .record_movement(
                MovementKind::Revenue,
                RecordMovementRequest {
                    amount: -1,
                    description: None,
                    category: "RENT".to_string(),
                    property_id: PROPERTY_ID.to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
