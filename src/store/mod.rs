//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! Handler (with UserContext)
//!     → Store facade
//!         → memory.rs (DashMap tables, JSON snapshot)   [backend.mode = "memory"]
//!         → rest.rs   (hosted /rest/v1 table API)       [backend.mode = "hosted"]
//! ```
//!
//! Every call is scoped to the requesting user. Lifecycle rules (foreign
//! keys, cascades) belong to the backend.

pub mod memory;
pub mod rest;
pub mod types;

use uuid::Uuid;

use crate::auth::UserContext;

pub use memory::MemoryStore;
pub use rest::RestStore;
pub use types::{
    Account, Device, Keyword, Network, NewKeyword, NewProduct, Product, ProductPatch, Rank, Sale,
    SocialPost, StoreError, StoreResult,
};

/// Table-level CRUD over the configured backend.
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Hosted(RestStore),
}

impl Store {
    pub async fn list_products(&self, user: &UserContext) -> StoreResult<Vec<Product>> {
        match self {
            Store::Memory(s) => Ok(s.list_products(user.user_id)),
            Store::Hosted(s) => s.list_products(user).await,
        }
    }

    pub async fn get_product(&self, user: &UserContext, id: Uuid) -> StoreResult<Product> {
        match self {
            Store::Memory(s) => s.get_product(user.user_id, id),
            Store::Hosted(s) => s.get_product(user, id).await,
        }
    }

    pub async fn insert_products(&self, user: &UserContext, products: Vec<Product>) -> StoreResult<Vec<Product>> {
        match self {
            Store::Memory(s) => Ok(s.insert_products(products)),
            Store::Hosted(s) => s.insert_products(user, products).await,
        }
    }

    pub async fn update_product(&self, user: &UserContext, id: Uuid, patch: ProductPatch) -> StoreResult<Product> {
        match self {
            Store::Memory(s) => s.update_product(user.user_id, id, patch),
            Store::Hosted(s) => s.update_product(user, id, patch).await,
        }
    }

    pub async fn delete_product(&self, user: &UserContext, id: Uuid) -> StoreResult<()> {
        match self {
            Store::Memory(s) => s.delete_product(user.user_id, id),
            Store::Hosted(s) => s.delete_product(user, id).await,
        }
    }

    pub async fn list_keywords(&self, user: &UserContext) -> StoreResult<Vec<Keyword>> {
        match self {
            Store::Memory(s) => Ok(s.list_keywords(user.user_id)),
            Store::Hosted(s) => s.list_keywords(user).await,
        }
    }

    pub async fn insert_keyword(&self, user: &UserContext, keyword: Keyword) -> StoreResult<Keyword> {
        match self {
            Store::Memory(s) => s.insert_keyword(keyword),
            Store::Hosted(s) => s.insert_keyword(user, keyword).await,
        }
    }

    pub async fn delete_keyword(&self, user: &UserContext, id: Uuid) -> StoreResult<()> {
        match self {
            Store::Memory(s) => s.delete_keyword(user.user_id, id),
            Store::Hosted(s) => s.delete_keyword(user, id).await,
        }
    }

    pub async fn insert_rank(&self, user: &UserContext, rank: Rank) -> StoreResult<Rank> {
        match self {
            Store::Memory(s) => s.insert_rank(rank),
            Store::Hosted(s) => s.insert_rank(user, rank).await,
        }
    }

    /// Rank history for the given keywords, newest first.
    pub async fn ranks_for(&self, user: &UserContext, keyword_ids: &[Uuid]) -> StoreResult<Vec<Rank>> {
        match self {
            Store::Memory(s) => Ok(s.ranks_for(keyword_ids)),
            Store::Hosted(s) => s.ranks_for(user, keyword_ids).await,
        }
    }

    pub async fn list_posts(&self, user: &UserContext) -> StoreResult<Vec<SocialPost>> {
        match self {
            Store::Memory(s) => Ok(s.list_posts(user.user_id)),
            Store::Hosted(s) => s.list_posts(user).await,
        }
    }

    pub async fn insert_posts(&self, user: &UserContext, posts: Vec<SocialPost>) -> StoreResult<Vec<SocialPost>> {
        match self {
            Store::Memory(s) => Ok(s.insert_posts(posts)),
            Store::Hosted(s) => s.insert_posts(user, posts).await,
        }
    }

    pub async fn list_sales(&self, user: &UserContext) -> StoreResult<Vec<Sale>> {
        match self {
            Store::Memory(s) => Ok(s.list_sales(user.user_id)),
            Store::Hosted(s) => s.list_sales(user).await,
        }
    }

    pub async fn insert_sales(&self, user: &UserContext, sales: Vec<Sale>) -> StoreResult<Vec<Sale>> {
        match self {
            Store::Memory(s) => Ok(s.insert_sales(sales)),
            Store::Hosted(s) => s.insert_sales(user, sales).await,
        }
    }

    /// Persist local state before exit. No-op for the hosted backend.
    pub fn flush(&self) -> StoreResult<()> {
        match self {
            Store::Memory(s) => s.save_to_file(),
            Store::Hosted(_) => Ok(()),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Hosted(_) => "hosted",
        }
    }
}
