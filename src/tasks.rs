//! Async task management for non-blocking API operations.
//!
//! Background tasks call the API and report back over a channel so the UI
//! keeps rendering while requests are in flight.
//!
//! # Architecture
//!
//! 1. `App` returns an [`AppCommand`](crate::app::AppCommand) describing the request
//! 2. The main loop hands it to [`TaskSpawner`], which spawns a tokio task
//! 3. When the task completes, it sends an [`ApiMessage`] through the channel
//! 4. The main loop drains the channel with `try_recv()` and feeds `App`

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::types::{
    BookStayRequest, ExternalBookingRequest, ExternalStay, FinanceMovement, MessageResponse,
    PaginatedResponse, PaginationParams, Property, RecordMovementRequest, Stay, StayWithTenant,
    UpdatePropertyRequest,
};
use crate::api::{ApiError, MovementKind, StayHubClient};
use crate::app::AppCommand;

/// Page size used while collecting every stay for the dashboard.
pub const DASHBOARD_STAYS_PAGE_SIZE: u32 = 1000;

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum ApiMessage {
    /// The property list.
    PropertiesFetched(Result<Vec<Property>, ApiError>),

    /// A page of stays for a property.
    StaysFetched {
        property_id: String,
        page: u32,
        result: Result<PaginatedResponse<StayWithTenant>, ApiError>,
    },

    /// A page of finance movements for a property.
    MovementsFetched {
        property_id: String,
        page: u32,
        result: Result<PaginatedResponse<FinanceMovement>, ApiError>,
    },

    /// Every stay for a property, past ones included.
    DashboardStaysFetched {
        property_id: String,
        result: Result<Vec<Stay>, ApiError>,
    },

    /// External stays waiting to be booked.
    ExternalStaysFetched(Result<Vec<ExternalStay>, ApiError>),

    /// Booking result for an external stay.
    StayBooked {
        external_id: String,
        result: Result<Stay, ApiError>,
    },

    /// Result of cancelling a batch of stays.
    StaysCancelled {
        cancelled: Vec<String>,
        failed: Vec<(String, ApiError)>,
    },

    /// An expense or revenue was recorded.
    MovementRecorded {
        property_id: String,
        kind: MovementKind,
        result: Result<(), ApiError>,
    },

    /// A property was renamed.
    PropertyUpdated {
        property_id: String,
        result: Result<Property, ApiError>,
    },

    /// An external calendar was linked to a property.
    CalendarLinked {
        property_id: String,
        result: Result<MessageResponse, ApiError>,
    },
}

/// Spawns background tasks for async operations.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Spawn a task to fetch the user's properties.
    pub fn spawn_fetch_properties(&self, client: &StayHubClient) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.list_properties().await;
            let _ = tx.send(ApiMessage::PropertiesFetched(result));
        });
    }

    /// Spawn a task to fetch one page of a property's stays.
    pub fn spawn_fetch_stays(
        &self,
        client: &StayHubClient,
        property_id: String,
        only_incoming: bool,
        params: PaginationParams,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client
                .property_stays(&property_id, only_incoming, params)
                .await;
            let _ = tx.send(ApiMessage::StaysFetched {
                property_id,
                page: params.page,
                result,
            });
        });
    }

    /// Spawn a task to fetch one page of a property's finance movements.
    pub fn spawn_fetch_movements(
        &self,
        client: &StayHubClient,
        property_id: String,
        params: PaginationParams,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.property_movements(&property_id, params).await;
            let _ = tx.send(ApiMessage::MovementsFetched {
                property_id,
                page: params.page,
                result,
            });
        });
    }

    /// Spawn a task to fetch all of a property's stays for the dashboard.
    pub fn spawn_fetch_dashboard(&self, client: &StayHubClient, property_id: String) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client
                .all_property_stays(&property_id, false, DASHBOARD_STAYS_PAGE_SIZE)
                .await
                .map(|stays| stays.into_iter().map(|s| s.stay).collect());
            let _ = tx.send(ApiMessage::DashboardStaysFetched {
                property_id,
                result,
            });
        });
    }

    /// Spawn a task to fetch external stays pending reconciliation.
    pub fn spawn_fetch_external_stays(&self, client: &StayHubClient) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.reconcile_external_stays().await;
            let _ = tx.send(ApiMessage::ExternalStaysFetched(result));
        });
    }

    /// Spawn a task to book an external stay.
    pub fn spawn_book_stay(
        &self,
        client: &StayHubClient,
        external_id: String,
        request: BookStayRequest,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.book_stay(request).await;
            let _ = tx.send(ApiMessage::StayBooked {
                external_id,
                result,
            });
        });
    }

    /// Spawn a task that cancels each stay in turn.
    ///
    /// Failures do not stop the batch; each one is reported.
    pub fn spawn_cancel_stays(&self, client: &StayHubClient, stay_ids: Vec<String>) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let mut cancelled = Vec::new();
            let mut failed = Vec::new();
            for id in stay_ids {
                match client.cancel_stay(&id).await {
                    Ok(()) => cancelled.push(id),
                    Err(e) => {
                        debug!(stay_id = %id, error = %e, "Stay cancellation failed");
                        failed.push((id, e));
                    }
                }
            }
            let _ = tx.send(ApiMessage::StaysCancelled { cancelled, failed });
        });
    }

    /// Spawn a task to record an expense or revenue.
    pub fn spawn_record_movement(
        &self,
        client: &StayHubClient,
        kind: MovementKind,
        request: RecordMovementRequest,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let property_id = request.property_id.clone();
            let result = client.record_movement(kind, request).await;
            let _ = tx.send(ApiMessage::MovementRecorded {
                property_id,
                kind,
                result,
            });
        });
    }

    /// Spawn a task to update a property.
    pub fn spawn_update_property(
        &self,
        client: &StayHubClient,
        property_id: String,
        request: UpdatePropertyRequest,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.update_property(&property_id, &request).await;
            let _ = tx.send(ApiMessage::PropertyUpdated {
                property_id,
                result,
            });
        });
    }

    /// Spawn a task to link an external booking calendar.
    pub fn spawn_link_calendar(
        &self,
        client: &StayHubClient,
        property_id: String,
        request: ExternalBookingRequest,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.create_external_booking(&property_id, request).await;
            let _ = tx.send(ApiMessage::CalendarLinked {
                property_id,
                result,
            });
        });
    }

    /// Run a command returned by `App`.
    pub fn dispatch(&self, client: &StayHubClient, command: AppCommand) {
        debug!(?command, "Dispatching command");
        match command {
            AppCommand::FetchProperties => self.spawn_fetch_properties(client),
            AppCommand::FetchStays {
                property_id,
                only_incoming,
                params,
            } => self.spawn_fetch_stays(client, property_id, only_incoming, params),
            AppCommand::FetchMovements {
                property_id,
                params,
            } => self.spawn_fetch_movements(client, property_id, params),
            AppCommand::FetchDashboard { property_id } => {
                self.spawn_fetch_dashboard(client, property_id)
            }
            AppCommand::FetchExternalStays => self.spawn_fetch_external_stays(client),
            AppCommand::BookStay {
                external_id,
                request,
            } => self.spawn_book_stay(client, external_id, request),
            AppCommand::CancelStays(ids) => self.spawn_cancel_stays(client, ids),
            AppCommand::RecordMovement { kind, request } => {
                self.spawn_record_movement(client, kind, request)
            }
            AppCommand::UpdateProperty {
                property_id,
                request,
            } => self.spawn_update_property(client, property_id, request),
            AppCommand::LinkCalendar {
                property_id,
                request,
            } => self.spawn_link_calendar(client, property_id, request),
            AppCommand::CopyText(text) => crate::clipboard::copy_text(text),
        }
    }
}

/// Create a new task channel and spawner.
///
/// The receiver should be polled in the main event loop.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stay_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "check_in": "2025-01-10T14:00:00Z",
            "check_out": "2025-01-15T11:00:00Z",
            "entrance_code": "1234567",
            "guests": 2,
            "price": 50000,
            "source": "INTERNAL",
            "created_at": "2024-12-01T10:00:00Z",
            "updated_at": "2024-12-01T10:00:00Z",
            "tenant": {
                "id": "t1",
                "name": "Ana",
                "phone": "5511987654321",
                "sex": "FEMALE",
                "created_at": "2024-12-01T10:00:00Z",
                "updated_at": "2024-12-01T10:00:00Z"
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_properties_sends_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/user/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": []})))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let (mut rx, spawner) = create_task_channel();
        spawner.spawn_fetch_properties(&client);

        match rx.recv().await {
            Some(ApiMessage::PropertiesFetched(Ok(properties))) => assert!(properties.is_empty()),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_dashboard_requests_all_stays() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/p1/stays"))
            .and(query_param("only_incoming_stays", "false"))
            .and(query_param("limit", "1000"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [stay_json("s1"), stay_json("s2")],
                "pagination": {
                    "page": 1, "limit": 1000, "total": 1001, "total_pages": 2,
                    "has_next": true, "has_previous": false
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/property/p1/stays"))
            .and(query_param("only_incoming_stays", "false"))
            .and(query_param("limit", "1000"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [stay_json("s3")],
                "pagination": {
                    "page": 2, "limit": 1000, "total": 1001, "total_pages": 2,
                    "has_next": false, "has_previous": true
                }
            })))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let (mut rx, spawner) = create_task_channel();
        spawner.spawn_fetch_dashboard(&client, "p1".to_string());

        match rx.recv().await {
            Some(ApiMessage::DashboardStaysFetched { property_id, result }) => {
                assert_eq!(property_id, "p1");
                let ids: Vec<String> = result.unwrap().into_iter().map(|s| s.id).collect();
                assert_eq!(ids, vec!["s1", "s2", "s3"]);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_stays_reports_partial_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/stay/s1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/stay/s2"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Stay not found"})),
            )
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let (mut rx, spawner) = create_task_channel();
        spawner.spawn_cancel_stays(&client, vec!["s1".to_string(), "s2".to_string()]);

        match rx.recv().await {
            Some(ApiMessage::StaysCancelled { cancelled, failed }) => {
                assert_eq!(cancelled, vec!["s1"]);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].0, "s2");
                assert!(matches!(failed[0].1, ApiError::NotFound(_)));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_fetch_stays() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/p1/stays"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [stay_json("s3")],
                "pagination": {
                    "page": 2, "limit": 10, "total": 11, "total_pages": 2,
                    "has_next": false, "has_previous": true
                }
            })))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let (mut rx, spawner) = create_task_channel();
        spawner.dispatch(
            &client,
            AppCommand::FetchStays {
                property_id: "p1".to_string(),
                only_incoming: true,
                params: PaginationParams::new(2, 10),
            },
        );

        match rx.recv().await {
            Some(ApiMessage::StaysFetched { property_id, page, result }) => {
                assert_eq!(property_id, "p1");
                assert_eq!(page, 2);
                assert_eq!(result.unwrap().data[0].stay.id, "s3");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_record_revenue() {
        let property_id = "6a3c2f4e-1111-4a4a-9c9c-000000000001";
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/finance/revenues"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let (mut rx, spawner) = create_task_channel();
        spawner.dispatch(
            &client,
            AppCommand::RecordMovement {
                kind: MovementKind::Revenue,
                request: RecordMovementRequest {
                    amount: 30000,
                    description: None,
                    category: "EXTRA".to_string(),
                    property_id: property_id.to_string(),
                },
            },
        );

        match rx.recv().await {
            Some(ApiMessage::MovementRecorded {
                property_id: id,
                kind,
                result,
            }) => {
                assert_eq!(id, property_id);
                assert_eq!(kind, MovementKind::Revenue);
                assert!(result.is_ok());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_update_property() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/properties/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p1",
                "name": "Casa Azul",
                "user_id": "u1",
                "created_at": "2024-12-01T10:00:00Z",
                "updated_at": "2025-01-01T10:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let (mut rx, spawner) = create_task_channel();
        spawner.dispatch(
            &client,
            AppCommand::UpdateProperty {
                property_id: "p1".to_string(),
                request: UpdatePropertyRequest {
                    name: Some("Casa Azul".to_string()),
                },
            },
        );

        match rx.recv().await {
            Some(ApiMessage::PropertyUpdated { property_id, result }) => {
                assert_eq!(property_id, "p1");
                assert_eq!(result.unwrap().name, "Casa Azul");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_link_calendar_reports_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/property/p1/external-booking"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"message": "Calendar already linked"})),
            )
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let (mut rx, spawner) = create_task_channel();
        spawner.dispatch(
            &client,
            AppCommand::LinkCalendar {
                property_id: "p1".to_string(),
                request: ExternalBookingRequest {
                    platform_name: crate::api::types::Platform::Airbnb,
                    sync_url: "https://example.com/cal.ics".to_string(),
                },
            },
        );

        match rx.recv().await {
            Some(ApiMessage::CalendarLinked { property_id, result }) => {
                assert_eq!(property_id, "p1");
                assert!(
                    matches!(result, Err(ApiError::Conflict(ref m)) if m == "Calendar already linked")
                );
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
