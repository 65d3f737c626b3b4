//! In-process table storage with JSON snapshot persistence.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::types::{
    Account, Keyword, Product, ProductPatch, Rank, Sale, SocialPost, StoreError, StoreResult,
};

/// On-disk shape of a memory store snapshot.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    products: Vec<Product>,
    keywords: Vec<Keyword>,
    ranks: Vec<Rank>,
    social_posts: Vec<SocialPost>,
    sales: Vec<Sale>,
    #[serde(default)]
    accounts: Vec<Account>,
}

/// A thread-safe set of tables keyed by record id.
///
/// Deleting a product cascades to its keywords, ranks, posts and sales, the
/// same way the hosted schema's foreign keys do.
#[derive(Clone, Default)]
pub struct MemoryStore {
    products: Arc<DashMap<Uuid, Product>>,
    keywords: Arc<DashMap<Uuid, Keyword>>,
    ranks: Arc<DashMap<Uuid, Rank>>,
    social_posts: Arc<DashMap<Uuid, SocialPost>>,
    sales: Arc<DashMap<Uuid, Sale>>,
    /// Local logins keyed by normalized email. Shared with `LocalAuth`.
    accounts: Arc<DashMap<String, Account>>,
    persistence_path: Option<String>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<String>) -> Self {
        Self {
            persistence_path,
            ..Default::default()
        }
    }

    /// Load from the snapshot file if it exists.
    pub fn load_from_file(path: &str) -> StoreResult<Self> {
        let store = Self::new(Some(path.to_string()));
        if Path::new(path).exists() {
            let file = File::open(path)?;
            let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;

            for p in snapshot.products {
                store.products.insert(p.id, p);
            }
            for k in snapshot.keywords {
                store.keywords.insert(k.id, k);
            }
            for r in snapshot.ranks {
                store.ranks.insert(r.id, r);
            }
            for s in snapshot.social_posts {
                store.social_posts.insert(s.id, s);
            }
            for s in snapshot.sales {
                store.sales.insert(s.id, s);
            }
            for a in snapshot.accounts {
                store.accounts.insert(a.email.clone(), a);
            }
            tracing::info!(
                products = store.products.len(),
                keywords = store.keywords.len(),
                sales = store.sales.len(),
                accounts = store.accounts.len(),
                "Loaded memory store snapshot"
            );
        }
        Ok(store)
    }

    /// Save to the snapshot file, if one is configured.
    pub fn save_to_file(&self) -> StoreResult<()> {
        if let Some(path) = &self.persistence_path {
            let snapshot = Snapshot {
                products: collect(&self.products),
                keywords: collect(&self.keywords),
                ranks: collect(&self.ranks),
                social_posts: collect(&self.social_posts),
                sales: collect(&self.sales),
                accounts: self.accounts.iter().map(|a| a.value().clone()).collect(),
            };
            let file = File::create(path)?;
            serde_json::to_writer(BufWriter::new(file), &snapshot)?;
            tracing::info!(path = %path, products = snapshot.products.len(), "Saved memory store snapshot");
        }
        Ok(())
    }

    /// Handle on the account table, for the local auth provider.
    pub fn accounts(&self) -> Arc<DashMap<String, Account>> {
        self.accounts.clone()
    }

    pub fn list_products(&self, owner: Uuid) -> Vec<Product> {
        let mut out: Vec<Product> = self
            .products
            .iter()
            .filter(|r| r.owner_id == owner)
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.title.cmp(&b.title)));
        out
    }

    pub fn get_product(&self, owner: Uuid, id: Uuid) -> StoreResult<Product> {
        self.products
            .get(&id)
            .filter(|p| p.owner_id == owner)
            .map(|p| p.value().clone())
            .ok_or(StoreError::NotFound { entity: "product", id })
    }

    pub fn insert_products(&self, products: Vec<Product>) -> Vec<Product> {
        for p in &products {
            self.products.insert(p.id, p.clone());
        }
        products
    }

    pub fn update_product(&self, owner: Uuid, id: Uuid, patch: ProductPatch) -> StoreResult<Product> {
        let mut entry = self
            .products
            .get_mut(&id)
            .filter(|p| p.owner_id == owner)
            .ok_or(StoreError::NotFound { entity: "product", id })?;
        entry.apply(patch);
        Ok(entry.value().clone())
    }

    pub fn delete_product(&self, owner: Uuid, id: Uuid) -> StoreResult<()> {
        self.products
            .remove_if(&id, |_, p| p.owner_id == owner)
            .ok_or(StoreError::NotFound { entity: "product", id })?;

        let keyword_ids: Vec<Uuid> = self
            .keywords
            .iter()
            .filter(|k| k.product_id == id)
            .map(|k| k.id)
            .collect();
        for keyword_id in &keyword_ids {
            self.keywords.remove(keyword_id);
        }
        self.ranks.retain(|_, r| !keyword_ids.contains(&r.keyword_id));
        self.social_posts.retain(|_, s| s.product_id != id);
        self.sales.retain(|_, s| s.product_id != id);
        Ok(())
    }

    pub fn list_keywords(&self, owner: Uuid) -> Vec<Keyword> {
        let mut out: Vec<Keyword> = self
            .keywords
            .iter()
            .filter(|k| k.owner_id == owner)
            .map(|k| k.value().clone())
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.phrase.cmp(&b.phrase)));
        out
    }

    pub fn insert_keyword(&self, keyword: Keyword) -> StoreResult<Keyword> {
        // Foreign key: the product must exist and share the owner.
        self.get_product(keyword.owner_id, keyword.product_id)?;
        self.keywords.insert(keyword.id, keyword.clone());
        Ok(keyword)
    }

    pub fn delete_keyword(&self, owner: Uuid, id: Uuid) -> StoreResult<()> {
        self.keywords
            .remove_if(&id, |_, k| k.owner_id == owner)
            .ok_or(StoreError::NotFound { entity: "keyword", id })?;
        self.ranks.retain(|_, r| r.keyword_id != id);
        Ok(())
    }

    pub fn insert_rank(&self, rank: Rank) -> StoreResult<Rank> {
        if !self.keywords.contains_key(&rank.keyword_id) {
            return Err(StoreError::NotFound {
                entity: "keyword",
                id: rank.keyword_id,
            });
        }
        self.ranks.insert(rank.id, rank.clone());
        Ok(rank)
    }

    /// Rank history for the given keywords, newest first.
    pub fn ranks_for(&self, keyword_ids: &[Uuid]) -> Vec<Rank> {
        let mut out: Vec<Rank> = self
            .ranks
            .iter()
            .filter(|r| keyword_ids.contains(&r.keyword_id))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        out
    }

    pub fn list_posts(&self, owner: Uuid) -> Vec<SocialPost> {
        let mut out: Vec<SocialPost> = self
            .social_posts
            .iter()
            .filter(|s| s.owner_id == owner)
            .map(|s| s.value().clone())
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.network.label().cmp(&b.network.label())));
        out
    }

    pub fn insert_posts(&self, posts: Vec<SocialPost>) -> Vec<SocialPost> {
        for p in &posts {
            self.social_posts.insert(p.id, p.clone());
        }
        posts
    }

    pub fn list_sales(&self, owner: Uuid) -> Vec<Sale> {
        let mut out: Vec<Sale> = self
            .sales
            .iter()
            .filter(|s| s.owner_id == owner)
            .map(|s| s.value().clone())
            .collect();
        out.sort_by(|a, b| a.date.cmp(&b.date));
        out
    }

    pub fn insert_sales(&self, sales: Vec<Sale>) -> Vec<Sale> {
        for s in &sales {
            self.sales.insert(s.id, s.clone());
        }
        sales
    }
}

fn collect<T: Clone>(map: &DashMap<Uuid, T>) -> Vec<T> {
    map.iter().map(|r| r.value().clone()).collect()
}
