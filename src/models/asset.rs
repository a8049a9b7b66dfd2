use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether an asset comes back after use. Stored as the Postgres enum
/// `asset_type`; the wire spelling keeps the hyphenated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_type")]
pub enum AssetType {
    Returnable,
    #[serde(rename = "Non-returnable")]
    #[sqlx(rename = "Non-returnable")]
    NonReturnable,
}

/// Core inventory entity. `product_quantity = None` means stock is not
/// tracked for this asset; `request_count` only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub product_name: String,
    pub product_type: AssetType,
    pub product_quantity: Option<i32>,
    pub request_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateAsset {
    pub product_name: String,
    pub product_type: AssetType,
    pub product_quantity: Option<i32>,
}

/// Allow-listed partial update. `request_count` is deliberately absent:
/// the counter moves only through the request workflow.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAsset {
    pub product_name: Option<String>,
    pub product_type: Option<AssetType>,
    pub product_quantity: Option<i32>,
}

// ── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, Default)]
pub struct AssetFilters {
    /// Case-insensitive substring match on product_name.
    pub search: Option<String>,
    pub product_type: Option<AssetType>,
    /// Sort by product_quantity; omitted → insertion order.
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TopRequestedParams {
    pub limit: Option<i64>,
    pub order: Option<SortOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_type_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&AssetType::NonReturnable).unwrap(),
            "\"Non-returnable\""
        );
        assert_eq!(
            serde_json::to_string(&AssetType::Returnable).unwrap(),
            "\"Returnable\""
        );
    }

    #[test]
    fn asset_type_rejects_unknown_variant() {
        assert!(serde_json::from_str::<AssetType>("\"Consumable\"").is_err());
    }

    #[test]
    fn sort_order_is_lowercase_on_the_wire() {
        assert_eq!(
            serde_json::from_str::<SortOrder>("\"desc\"").unwrap(),
            SortOrder::Desc
        );
        assert!(serde_json::from_str::<SortOrder>("\"DESC\"").is_err());
    }

    #[test]
    fn update_asset_cannot_touch_request_count() {
        let err = serde_json::from_str::<UpdateAsset>(r#"{ "request_count": 99 }"#);
        assert!(err.is_err());
    }
}
