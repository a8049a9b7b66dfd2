use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a request: Pending until the sponsor approves or rejects.
/// Typed end-to-end (serde + the Postgres enum `request_status`) so free-text
/// statuses cannot enter the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssetRequest {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub requester_email: String,
    pub requester_name: String,
    pub hr_email: String,
    pub status: RequestStatus,
    pub note: Option<String>,
    pub request_date: DateTime<Utc>,
}

/// Request joined with its asset for richer API responses. The asset fields
/// are computed at read time and never persisted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RequestWithAsset {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub asset_name: String,
    pub asset_type: super::AssetType,
    pub requester_email: String,
    pub requester_name: String,
    pub hr_email: String,
    pub status: RequestStatus,
    pub note: Option<String>,
    pub request_date: DateTime<Utc>,
}

/// Slim row for the calendar-month listing — asset_name is the only joined field.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthlyRequest {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub asset_name: String,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Requester identity and sponsor are resolved server-side from the caller's
/// employee account, so the body carries only the asset and an optional note.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub asset_id: Uuid,
    pub note: Option<String>,
}

/// Allow-listed partial update for a request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequest {
    pub status: Option<RequestStatus>,
    pub note: Option<String>,
}

// ── Query parameters ─────────────────────────────────────────────────────────

/// Filters for an employee's own listing. `status` and `product_type` are
/// matched case-insensitively in the query, so they stay plain text here.
#[derive(Debug, Deserialize, Default)]
pub struct EmployeeRequestFilters {
    /// Case-insensitive substring match on the joined asset name.
    pub search: Option<String>,
    pub status: Option<String>,
    pub product_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SponsorRequestFilters {
    /// Case-insensitive substring match on requester_email.
    pub requester_email: Option<String>,
    /// Case-insensitive substring match on requester_name.
    pub requester_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        for (status, wire) in [
            (RequestStatus::Pending, "\"Pending\""),
            (RequestStatus::Approved, "\"Approved\""),
            (RequestStatus::Rejected, "\"Rejected\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), wire);
            assert_eq!(serde_json::from_str::<RequestStatus>(wire).unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_free_text() {
        assert!(serde_json::from_str::<RequestStatus>("\"Cancelled\"").is_err());
        assert!(serde_json::from_str::<RequestStatus>("\"pending\"").is_err());
    }

    #[test]
    fn update_request_rejects_foreign_fields() {
        let err = serde_json::from_str::<UpdateRequest>(r#"{ "requester_email": "x@y.z" }"#);
        assert!(err.is_err(), "requester identity must not be editable");
    }
}
