//! Hosted backend table API client (`/rest/v1/{table}`).
//!
//! Requests carry the project's anon key plus the signed-in user's bearer
//! token, so the hosted row-level policies see the real user.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::UserContext;
use crate::store::types::{
    Keyword, Product, ProductPatch, Rank, Sale, SocialPost, StoreError, StoreResult,
};

const PRODUCTS: &str = "products";
const KEYWORDS: &str = "keywords";
const RANKS: &str = "ranks";
const SOCIAL_POSTS: &str = "social_posts";
const SALES: &str = "sales";

#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> StoreResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn request(&self, method: Method, table: &str, user: &UserContext) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&user.access_token)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        user: &UserContext,
        filters: &[(&str, String)],
    ) -> StoreResult<Vec<T>> {
        let resp = self
            .request(Method::GET, table, user)
            .query(&[("select", "*".to_string())])
            .query(filters)
            .send()
            .await?;
        read_rows(resp).await
    }

    async fn insert<T: Serialize + DeserializeOwned>(
        &self,
        table: &str,
        user: &UserContext,
        rows: &[T],
    ) -> StoreResult<Vec<T>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let resp = self
            .request(Method::POST, table, user)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;
        read_rows(resp).await
    }

    /// Delete matching rows and return how many went.
    async fn delete(&self, table: &str, user: &UserContext, filters: &[(&str, String)]) -> StoreResult<usize> {
        let resp = self
            .request(Method::DELETE, table, user)
            .header("Prefer", "return=representation")
            .query(filters)
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = read_rows(resp).await?;
        Ok(rows.len())
    }

    pub async fn list_products(&self, user: &UserContext) -> StoreResult<Vec<Product>> {
        self.select(PRODUCTS, user, &[owned_by(user), ("order", "created_at.asc".into())]).await
    }

    pub async fn get_product(&self, user: &UserContext, id: Uuid) -> StoreResult<Product> {
        self.select(PRODUCTS, user, &[owned_by(user), eq("id", id)])
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { entity: "product", id })
    }

    pub async fn insert_products(&self, user: &UserContext, products: Vec<Product>) -> StoreResult<Vec<Product>> {
        self.insert(PRODUCTS, user, &products).await
    }

    pub async fn update_product(&self, user: &UserContext, id: Uuid, patch: ProductPatch) -> StoreResult<Product> {
        // Apply locally so trimming/empty-url rules match the memory backend.
        let mut product = self.get_product(user, id).await?;
        product.apply(patch);

        let body = serde_json::json!({
            "title": product.title,
            "description": product.description,
            "tags": product.tags,
            "price": product.price,
            "source_url": product.source_url,
        });
        let resp = self
            .request(Method::PATCH, PRODUCTS, user)
            .header("Prefer", "return=representation")
            .query(&[owned_by(user), eq("id", id)])
            .json(&body)
            .send()
            .await?;
        read_rows::<Product>(resp)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { entity: "product", id })
    }

    pub async fn delete_product(&self, user: &UserContext, id: Uuid) -> StoreResult<()> {
        match self.delete(PRODUCTS, user, &[owned_by(user), eq("id", id)]).await? {
            0 => Err(StoreError::NotFound { entity: "product", id }),
            _ => Ok(()),
        }
    }

    pub async fn list_keywords(&self, user: &UserContext) -> StoreResult<Vec<Keyword>> {
        self.select(KEYWORDS, user, &[owned_by(user), ("order", "created_at.asc".into())]).await
    }

    pub async fn insert_keyword(&self, user: &UserContext, keyword: Keyword) -> StoreResult<Keyword> {
        let id = keyword.id;
        self.insert(KEYWORDS, user, &[keyword])
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { entity: "keyword", id })
    }

    pub async fn delete_keyword(&self, user: &UserContext, id: Uuid) -> StoreResult<()> {
        match self.delete(KEYWORDS, user, &[owned_by(user), eq("id", id)]).await? {
            0 => Err(StoreError::NotFound { entity: "keyword", id }),
            _ => Ok(()),
        }
    }

    pub async fn insert_rank(&self, user: &UserContext, rank: Rank) -> StoreResult<Rank> {
        let id = rank.keyword_id;
        self.insert(RANKS, user, &[rank])
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { entity: "keyword", id })
    }

    pub async fn ranks_for(&self, user: &UserContext, keyword_ids: &[Uuid]) -> StoreResult<Vec<Rank>> {
        if keyword_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = keyword_ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",");
        self.select(
            RANKS,
            user,
            &[("keyword_id", format!("in.({})", ids)), ("order", "fetched_at.desc".into())],
        )
        .await
    }

    pub async fn list_posts(&self, user: &UserContext) -> StoreResult<Vec<SocialPost>> {
        self.select(SOCIAL_POSTS, user, &[owned_by(user), ("order", "created_at.asc".into())]).await
    }

    pub async fn insert_posts(&self, user: &UserContext, posts: Vec<SocialPost>) -> StoreResult<Vec<SocialPost>> {
        self.insert(SOCIAL_POSTS, user, &posts).await
    }

    pub async fn list_sales(&self, user: &UserContext) -> StoreResult<Vec<Sale>> {
        self.select(SALES, user, &[owned_by(user), ("order", "date.asc".into())]).await
    }

    pub async fn insert_sales(&self, user: &UserContext, sales: Vec<Sale>) -> StoreResult<Vec<Sale>> {
        self.insert(SALES, user, &sales).await
    }
}

fn eq(column: &'static str, id: Uuid) -> (&'static str, String) {
    (column, format!("eq.{}", id))
}

fn owned_by(user: &UserContext) -> (&'static str, String) {
    eq("owner_id", user.user_id)
}

async fn read_rows<T: DeserializeOwned>(resp: reqwest::Response) -> StoreResult<Vec<T>> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %body, "Hosted table request failed");
        return Err(StoreError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore").field("base_url", &self.base_url).finish()
    }
}
