//! StayHub API data types.
//!
//! These types represent the JSON structures exchanged with the StayHub
//! REST API. Identifiers are UUID strings and timestamps are RFC 3339;
//! money is always an integer amount of cents.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ValidationError};
use crate::format::phone;
use crate::table::Identifiable;

/// Minimum length of a door entrance code.
pub const MIN_ENTRANCE_CODE_LEN: usize = 7;

// ============================================================================
// Auth
// ============================================================================

/// The authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Response of sign-in and sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The signed-in user.
    pub user: User,
}

/// Credentials for `POST /auth/sign-in`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/users`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

// ============================================================================
// Pagination
// ============================================================================

/// Pagination metadata returned with paginated lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page (1-based).
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of records.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_previous: bool,
}

/// A page of records.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Records on this page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub limit: u32,
}

impl PaginationParams {
    /// Create pagination params.
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }
}

// ============================================================================
// Properties
// ============================================================================

/// A rental property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Identifiable for Property {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Wrapper for `GET /property/user/all`.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyList {
    pub properties: Vec<Property>,
}

/// Payload for creating a property.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePropertyRequest {
    pub name: String,
}

/// Payload for updating a property. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpdatePropertyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UpdatePropertyRequest {
    /// Trim the new name and reject a blank one.
    pub fn validate(self) -> Result<Self, ValidationError> {
        match self.name {
            Some(name) if name.trim().is_empty() => {
                Err(ValidationError::new("name", "name cannot be empty"))
            }
            name => Ok(Self {
                name: name.map(|n| n.trim().to_string()),
            }),
        }
    }
}

// ============================================================================
// Stays
// ============================================================================

/// Guest sex as recorded by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    /// Parse a user-entered value (`m`, `female`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "m" | "male" => Some(Sex::Male),
            "f" | "female" => Some(Sex::Female),
            "o" | "other" => Some(Sex::Other),
            _ => None,
        }
    }
}

/// Where a stay was booked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaySource {
    /// Booked directly with the host.
    #[default]
    Internal,
    Airbnb,
    Booking,
    /// Any other external platform.
    #[serde(other)]
    External,
}

impl std::fmt::Display for StaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StaySource::Internal => "Internal",
            StaySource::Airbnb => "Airbnb",
            StaySource::Booking => "Booking.com",
            StaySource::External => "External",
        };
        f.write_str(name)
    }
}

/// A guest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    /// Digits only, country code included.
    pub phone: String,
    pub sex: Sex,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stay at a property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stay {
    pub id: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub entrance_code: String,
    pub guests: u32,
    /// Price in cents.
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub source: StaySource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Stay {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A stay with its guest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StayWithTenant {
    #[serde(flatten)]
    pub stay: Stay,
    pub tenant: Tenant,
}

impl Identifiable for StayWithTenant {
    fn id(&self) -> &str {
        &self.stay.id
    }
}

/// Guest name on the public stay page.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PublicTenant {
    pub name: String,
}

/// Check-in instructions visible without signing in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PublicStay {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub entrance_code: String,
    pub tenant: PublicTenant,
}

/// The property an external stay belongs to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PropertyRef {
    pub id: String,
    pub name: String,
}

/// A stay found on an external calendar that has no StayHub booking yet.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalStay {
    pub property: PropertyRef,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source_platform: String,
    /// Synthetic id: `{property id}-{start}`.
    #[serde(skip)]
    key: String,
}

impl ExternalStay {
    /// Create an external stay and derive its key.
    pub fn new(
        property: PropertyRef,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source_platform: impl Into<String>,
    ) -> Self {
        let mut stay = Self {
            property,
            start,
            end,
            source_platform: source_platform.into(),
            key: String::new(),
        };
        stay.assign_key();
        stay
    }

    /// Derive the key from the property id and start date.
    ///
    /// Deserialization leaves the key empty; call this afterwards.
    pub fn assign_key(&mut self) {
        self.key = format!("{}-{}", self.property.id, self.start.to_rfc3339());
    }
}

impl Identifiable for ExternalStay {
    fn id(&self) -> &str {
        &self.key
    }
}

/// The external booking platforms a property can sync from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Airbnb,
    Booking,
}

impl Platform {
    /// Parse a user-entered platform name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "airbnb" => Some(Platform::Airbnb),
            "booking" | "booking.com" => Some(Platform::Booking),
            _ => None,
        }
    }
}

/// Guest details for a new booking.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TenantInput {
    pub name: String,
    pub phone: String,
    pub sex: Sex,
}

/// Payload for booking a stay.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookStayRequest {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub entrance_code: String,
    pub tenant: TenantInput,
    pub guests: u32,
    /// Property id.
    pub property: String,
}

impl BookStayRequest {
    /// Build a booking for an external stay.
    pub fn for_external_stay(
        stay: &ExternalStay,
        entrance_code: String,
        tenant: TenantInput,
        guests: u32,
    ) -> Self {
        Self {
            check_in: stay.start,
            check_out: stay.end,
            entrance_code,
            tenant,
            guests,
            property: stay.property.id.clone(),
        }
    }

    /// Validate and normalize the booking (phone is reduced to digits).
    ///
    /// # Errors
    ///
    /// Returns the first failing rule, in this order: entrance code length,
    /// guest name, phone digits, guest count, then check-out after check-in.
    /// The error's `field` uses the wire name, such as `tenant.phone`.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if self.entrance_code.trim().chars().count() < MIN_ENTRANCE_CODE_LEN {
            return Err(ValidationError::new(
                "entrance_code",
                format!("must have at least {} digits", MIN_ENTRANCE_CODE_LEN),
            ));
        }
        if self.tenant.name.trim().is_empty() {
            return Err(ValidationError::new("tenant.name", "guest name is required"));
        }
        if !phone::is_valid(&self.tenant.phone) {
            return Err(ValidationError::new(
                "tenant.phone",
                "must have 13 digits including country code",
            ));
        }
        if self.guests < 1 {
            return Err(ValidationError::new("guests", "must be at least 1"));
        }
        if self.check_out <= self.check_in {
            return Err(ValidationError::new("check_out", "must be after check-in"));
        }
        self.entrance_code = self.entrance_code.trim().to_string();
        self.tenant.name = self.tenant.name.trim().to_string();
        self.tenant.phone = phone::to_api(&self.tenant.phone);
        Ok(self)
    }
}

/// Payload for linking an external calendar to a property.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExternalBookingRequest {
    pub platform_name: Platform,
    pub sync_url: String,
}

impl ExternalBookingRequest {
    /// Validate the sync URL.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let url = self.sync_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) || url.len() <= 8 {
            return Err(ValidationError::new("sync_url", "must be an http(s) URL"));
        }
        Ok(Self {
            sync_url: url.to_string(),
            ..self
        })
    }
}

/// Generic confirmation message.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Finance
// ============================================================================

/// An expense or revenue entry on a property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinanceMovement {
    pub id: String,
    pub description: Option<String>,
    /// Amount in cents.
    pub amount: i64,
    pub category: String,
    pub property_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for FinanceMovement {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for recording an expense or a revenue.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecordMovementRequest {
    /// Amount in cents.
    pub amount: i64,
    pub description: Option<String>,
    pub category: String,
    pub property_id: String,
}

impl RecordMovementRequest {
    /// Validate and normalize the movement (category is uppercased).
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.amount <= 0 {
            return Err(ValidationError::new("amount", "must be greater than zero"));
        }
        let category = self.category.trim().to_uppercase();
        if category.is_empty() {
            return Err(ValidationError::new("category", "category is required"));
        }
        if uuid::Uuid::parse_str(&self.property_id).is_err() {
            return Err(ValidationError::new("property_id", "must be a valid UUID"));
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(Self {
            category,
            description,
            ..self
        })
    }
}

/// Reject row lists containing the same id twice.
pub fn ensure_unique_ids<T: Identifiable>(rows: &[T]) -> Result<(), ApiError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.id()) {
            return Err(ApiError::InvalidResponse(format!(
                "duplicate record id '{}'",
                row.id()
            )));
        }
    }
    Ok(())
}
