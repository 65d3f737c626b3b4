//! Persisted record types and store errors.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A product listing imported by a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub price: Option<Decimal>,
    /// Marketplace listing URL (`tpt_url` in CSV files).
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A locally registered login. Only the memory backend keeps these; the
/// hosted backend owns its own user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: Uuid,
    pub email: String,
    pub salt: String,
    /// Hex SHA-256 of `salt:password`.
    pub digest: String,
}

/// Fields accepted when creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Partial product update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub price: Option<Decimal>,
    pub source_url: Option<String>,
}

impl Product {
    /// Build a product record owned by `owner_id`.
    pub fn create(owner_id: Uuid, new: NewProduct) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: new.title.trim().to_string(),
            description: new.description,
            tags: new.tags,
            price: new.price,
            source_url: new.source_url.filter(|u| !u.trim().is_empty()),
            created_at: Utc::now(),
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(url) = patch.source_url {
            self.source_url = Some(url).filter(|u| !u.trim().is_empty());
        }
    }
}

/// Device profile a keyword is tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Mobile => "mobile",
            Device::Tablet => "tablet",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search phrase tracked for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub product_id: Uuid,
    pub phrase: String,
    /// Two-letter country code.
    pub country: String,
    pub device: Device,
    pub created_at: DateTime<Utc>,
}

fn default_country() -> String {
    "us".to_string()
}

/// Fields accepted when tracking a keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewKeyword {
    pub product_id: Uuid,
    pub phrase: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub device: Device,
}

impl Keyword {
    pub fn create(owner_id: Uuid, new: NewKeyword) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            product_id: new.product_id,
            phrase: new.phrase.trim().to_string(),
            country: new.country.trim().to_lowercase(),
            device: new.device,
            created_at: Utc::now(),
        }
    }
}

/// One recorded search position. `position` is `None` when the product was
/// not found in the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    pub id: Uuid,
    pub keyword_id: Uuid,
    pub position: Option<u32>,
    pub fetched_at: DateTime<Utc>,
}

impl Rank {
    pub fn record(keyword_id: Uuid, position: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            keyword_id,
            position,
            fetched_at: Utc::now(),
        }
    }
}

/// Social network a post is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Instagram,
    Facebook,
    Pinterest,
    Twitter,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Instagram,
        Network::Facebook,
        Network::Pinterest,
        Network::Twitter,
    ];

    /// Display name, as written to CSV exports.
    pub fn label(&self) -> &'static str {
        match self {
            Network::Instagram => "Instagram",
            Network::Facebook => "Facebook",
            Network::Pinterest => "Pinterest",
            Network::Twitter => "Twitter",
        }
    }

    /// Maximum content length accepted by the network.
    pub fn max_chars(&self) -> usize {
        match self {
            Network::Instagram => 2200,
            Network::Facebook => 5000,
            Network::Pinterest => 500,
            Network::Twitter => 280,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instagram" => Ok(Network::Instagram),
            "facebook" => Ok(Network::Facebook),
            "pinterest" => Ok(Network::Pinterest),
            "twitter" | "x" => Ok(Network::Twitter),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

/// Generated social content for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub product_id: Uuid,
    pub network: Network,
    pub title: String,
    pub content: String,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One day of sales for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub product_id: Uuid,
    pub date: NaiveDate,
    pub units: u32,
    pub revenue: Decimal,
    pub views: u32,
}

/// Errors surfaced by either store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("backend request failed: {0}")]
    Backend(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
