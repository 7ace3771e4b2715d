//! Property, stay booking and reconciliation endpoints.

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::client::{segment, StayHubClient};
use super::error::Result;
use super::types::{
    ensure_unique_ids, BookStayRequest, CreatePropertyRequest, ExternalBookingRequest,
    ExternalStay, MessageResponse, PaginatedResponse, PaginationParams, Property, PropertyList,
    Stay, StayWithTenant, UpdatePropertyRequest,
};

/// Query for `GET /property/{id}/stays`.
#[derive(Debug, Clone, Copy, Serialize)]
struct StaysQuery {
    only_incoming_stays: bool,
    page: u32,
    limit: u32,
}

impl StayHubClient {
    /// List every property of the signed-in user.
    #[instrument(skip(self))]
    pub async fn list_properties(&self) -> Result<Vec<Property>> {
        let list: PropertyList = self.get("/property/user/all").await?;
        ensure_unique_ids(&list.properties)?;
        debug!("Fetched {} properties", list.properties.len());
        Ok(list.properties)
    }

    /// Get one property.
    #[instrument(skip(self))]
    pub async fn get_property(&self, id: &str) -> Result<Property> {
        self.get(&format!("/property/{}", segment(id))).await
    }

    /// Create a property.
    #[instrument(skip(self, request))]
    pub async fn create_property(&self, request: &CreatePropertyRequest) -> Result<Property> {
        let property: Property = self.post("/property/user", request).await?;
        info!(property_id = %property.id, "Property created");
        Ok(property)
    }

    /// Update a property.
    #[instrument(skip(self, request))]
    pub async fn update_property(
        &self,
        id: &str,
        request: &UpdatePropertyRequest,
    ) -> Result<Property> {
        self.put(&format!("/properties/{}", segment(id)), request).await
    }

    /// Soft-delete a property.
    #[instrument(skip(self))]
    pub async fn delete_property(&self, id: &str) -> Result<()> {
        self.delete(&format!("/properties/{}", segment(id))).await?;
        info!(property_id = %id, "Property deleted");
        Ok(())
    }

    /// Get one page of a property's stays.
    ///
    /// With `only_incoming_stays`, finished stays are left out.
    #[instrument(skip(self))]
    pub async fn property_stays(
        &self,
        property_id: &str,
        only_incoming_stays: bool,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<StayWithTenant>> {
        let query = StaysQuery {
            only_incoming_stays,
            page: params.page,
            limit: params.limit,
        };
        let page: PaginatedResponse<StayWithTenant> = self
            .get_query(&format!("/property/{}/stays", segment(property_id)), &query)
            .await?;
        ensure_unique_ids(&page.data)?;
        debug!(
            "Fetched {} stays (page {}/{})",
            page.data.len(),
            page.pagination.page,
            page.pagination.total_pages
        );
        Ok(page)
    }

    /// Get every stay of a property, following pages until `has_next` is
    /// false.
    ///
    /// # Errors
    ///
    /// Fails on the first page request that fails, or when an id shows up
    /// twice across pages.
    #[instrument(skip(self))]
    pub async fn all_property_stays(
        &self,
        property_id: &str,
        only_incoming_stays: bool,
        page_size: u32,
    ) -> Result<Vec<StayWithTenant>> {
        let mut stays = Vec::new();
        let mut page = 1;
        loop {
            let response = self
                .property_stays(
                    property_id,
                    only_incoming_stays,
                    PaginationParams::new(page, page_size),
                )
                .await?;
            stays.extend(response.data);
            if !response.pagination.has_next || page >= response.pagination.total_pages {
                break;
            }
            page += 1;
        }
        ensure_unique_ids(&stays)?;
        debug!("Fetched {} stays across {} pages", stays.len(), page);
        Ok(stays)
    }

    /// Stays found on linked external calendars that are not booked yet.
    #[instrument(skip(self))]
    pub async fn reconcile_external_stays(&self) -> Result<Vec<ExternalStay>> {
        let mut stays: Vec<ExternalStay> = self.get("/property/reconcile-external-stays").await?;
        for stay in &mut stays {
            stay.assign_key();
        }
        ensure_unique_ids(&stays)?;
        debug!("Found {} external stays to reconcile", stays.len());
        Ok(stays)
    }

    /// Book a stay.
    ///
    /// The request is validated before being sent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` without a request when a field is
    /// invalid, and `ApiError::Conflict` when the dates overlap another
    /// stay.
    #[instrument(skip(self, request), fields(property_id = %request.property))]
    pub async fn book_stay(&self, request: BookStayRequest) -> Result<Stay> {
        let request = request.validate()?;
        let stay: Stay = self.post("/property/stay", &request).await?;
        info!(stay_id = %stay.id, "Stay booked");
        Ok(stay)
    }

    /// Link an external booking calendar to a property.
    #[instrument(skip(self, request))]
    pub async fn create_external_booking(
        &self,
        property_id: &str,
        request: ExternalBookingRequest,
    ) -> Result<MessageResponse> {
        let request = request.validate()?;
        self.post(
            &format!("/property/{}/external-booking", segment(property_id)),
            &request,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Platform, PropertyRef, Sex, TenantInput};
    use crate::api::ApiError;
    use crate::table::Identifiable;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn property_json(id: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "user_id": "u1",
            "created_at": "2024-01-15T10:00:00Z",
            "updated_at": "2024-01-15T10:00:00Z",
            "deleted_at": null
        })
    }

    fn stay_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "check_in": "2025-01-10T14:00:00Z",
            "check_out": "2025-01-15T11:00:00Z",
            "entrance_code": "1234567",
            "guests": 2,
            "price": 90000,
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
    async fn test_list_properties() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/user/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": [property_json("p1", "Beach House"), property_json("p2", "Loft")]
            })))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let properties = client.list_properties().await.unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[1].name, "Loft");
    }

    #[tokio::test]
    async fn test_list_properties_rejects_duplicate_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/user/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": [property_json("p1", "Beach House"), property_json("p1", "Copy")]
            })))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let result = client.list_properties().await;
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_get_property_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "Property not found"})),
            )
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let result = client.get_property("missing").await;
        assert!(matches!(result, Err(ApiError::NotFound(ref m)) if m == "Property not found"));
    }

    #[tokio::test]
    async fn test_update_and_delete_property() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/properties/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(property_json("p1", "Renamed")))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/properties/p1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let updated = client
            .update_property(
                "p1",
                &UpdatePropertyRequest {
                    name: Some("Renamed".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        client.delete_property("p1").await.unwrap();
    }

    #[tokio::test]
    async fn test_property_stays_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/p1/stays"))
            .and(query_param("only_incoming_stays", "true"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [stay_json("s1"), stay_json("s2")],
                "pagination": {
                    "page": 2, "limit": 10, "total": 12, "total_pages": 2,
                    "has_next": false, "has_previous": true
                }
            })))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let page = client
            .property_stays("p1", true, PaginationParams::new(2, 10))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].tenant.name, "Ana");
        assert_eq!(page.pagination.total_pages, 2);
    }

    fn stays_page(ids: &[&str], page: u32, total_pages: u32) -> serde_json::Value {
        let data: Vec<_> = ids.iter().map(|id| stay_json(id)).collect();
        serde_json::json!({
            "data": data,
            "pagination": {
                "page": page, "limit": 2, "total": 3, "total_pages": total_pages,
                "has_next": page < total_pages, "has_previous": page > 1
            }
        })
    }

    #[tokio::test]
    async fn test_all_property_stays_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/p1/stays"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(stays_page(&["s1", "s2"], 1, 2)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/property/p1/stays"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stays_page(&["s3"], 2, 2)))
            .expect(1)
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let stays = client.all_property_stays("p1", false, 2).await.unwrap();
        let ids: Vec<&str> = stays.iter().map(|s| s.stay.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
    }

    #[tokio::test]
    async fn test_all_property_stays_rejects_repeated_ids_across_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/p1/stays"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stays_page(&["s1"], 1, 2)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/property/p1/stays"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stays_page(&["s1"], 2, 2)))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let result = client.all_property_stays("p1", false, 2).await;
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_reconcile_assigns_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/property/reconcile-external-stays"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "property": {"id": "p1", "name": "Beach House"},
                    "start": "2025-01-10T14:00:00Z",
                    "end": "2025-01-15T14:00:00Z",
                    "sourcePlatform": "airbnb"
                }
            ])))
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let stays = client.reconcile_external_stays().await.unwrap();
        assert_eq!(stays.len(), 1);
        assert_eq!(stays[0].id(), "p1-2025-01-10T14:00:00+00:00");
    }

    #[tokio::test]
    async fn test_book_stay_validates_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/property/stay"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let external = ExternalStay::new(
            PropertyRef {
                id: "p1".to_string(),
                name: "Beach House".to_string(),
            },
            Utc.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap(),
            "airbnb",
        );
        let request = BookStayRequest::for_external_stay(
            &external,
            "12".to_string(),
            TenantInput {
                name: "Ana".to_string(),
                phone: "5511987654321".to_string(),
                sex: Sex::Female,
            },
            2,
        );

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let result = client.book_stay(request).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_book_stay_posts_normalized_request() {
        let server = MockServer::start().await;
        let mut body = stay_json("s9");
        body.as_object_mut().unwrap().remove("tenant");
        Mock::given(method("POST"))
            .and(path("/property/stay"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "entrance_code": "1234567",
                "tenant": {"phone": "5511987654321", "sex": "FEMALE"},
                "property": "p1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(body))
            .mount(&server)
            .await;

        let external = ExternalStay::new(
            PropertyRef {
                id: "p1".to_string(),
                name: "Beach House".to_string(),
            },
            Utc.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap(),
            "airbnb",
        );
        let request = BookStayRequest::for_external_stay(
            &external,
            "1234567".to_string(),
            TenantInput {
                name: "Ana".to_string(),
                phone: "+55 (11) 98765-4321".to_string(),
                sex: Sex::Female,
            },
            2,
        );

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let stay = client.book_stay(request).await.unwrap();
        assert_eq!(stay.id, "s9");
    }

    #[tokio::test]
    async fn test_create_external_booking() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/property/p1/external-booking"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"message": "Calendar linked"})),
            )
            .mount(&server)
            .await;

        let client = StayHubClient::with_base_url(&server.uri(), None).unwrap();
        let response = client
            .create_external_booking(
                "p1",
                ExternalBookingRequest {
                    platform_name: Platform::Airbnb,
                    sync_url: "https://www.airbnb.com/calendar/ical/1.ics".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.message, "Calendar linked");
    }
}
