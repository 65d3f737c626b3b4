//! Social post generation: stub templates and hashtag derivation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::auth::UserContext;
use crate::providers::hash::{pick, rolling_hash};
use crate::store::{Network, Product, SocialPost};

const MAX_HASHTAGS: usize = 10;

/// A generated post before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub network: Network,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

impl GeneratedPost {
    /// Clean model output: strip `#`, drop empties, cap length and count.
    pub fn sanitized(mut self) -> Self {
        self.hashtags = dedup_tags(self.hashtags.iter().map(|h| normalize_hashtag(h)));
        self.content = truncate(&self.content, self.network.max_chars());
        self
    }

    pub fn into_record(self, user: &UserContext, product_id: Uuid) -> SocialPost {
        SocialPost {
            id: Uuid::new_v4(),
            owner_id: user.user_id,
            product_id,
            network: self.network,
            title: self.title,
            content: self.content,
            hashtags: self.hashtags,
            created_at: Utc::now(),
        }
    }
}

fn normalize_hashtag(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn dedup_tags(candidates: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .take(MAX_HASHTAGS)
        .collect()
}

/// Hashtags for a product: its tags first, then longer title words.
pub fn hashtags_for(product: &Product) -> Vec<String> {
    let from_tags = product.tags.iter().map(|t| normalize_hashtag(t));
    let from_title = product
        .title
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(normalize_hashtag);
    dedup_tags(from_tags.chain(from_title))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

const HOOKS: [&str; 5] = [
    "New in the shop:",
    "Teachers, meet",
    "Save your prep time with",
    "Just launched:",
    "Your students will love",
];

const CALLS_TO_ACTION: [&str; 4] = [
    "Grab it today!",
    "Link in bio.",
    "Tap to see the full preview.",
    "Available now in the store.",
];

/// Deterministic posts for each requested network.
pub fn stub_posts(product: &Product, networks: &[Network]) -> Vec<GeneratedPost> {
    let hashtags = hashtags_for(product);
    let title = product.title.trim();
    let summary = product
        .description
        .split(['.', '!', '?'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(title);

    networks
        .iter()
        .map(|network| {
            let seed = rolling_hash(&format!("{}|{}", title, network.label()));
            let hook = pick(&HOOKS, seed);
            let cta = pick(&CALLS_TO_ACTION, seed / 5);

            let (post_title, body, tag_budget) = match network {
                Network::Instagram => (
                    format!("{} {}", hook, title),
                    format!("{} {}\n\n{}\n\n{}", hook, title, summary, cta),
                    MAX_HASHTAGS,
                ),
                Network::Facebook => (
                    title.to_string(),
                    format!("{} {}. {}. {}", hook, title, summary, cta),
                    3,
                ),
                Network::Pinterest => (
                    format!("{} | {}", title, summary),
                    format!("{}. {} {}", summary, title, cta),
                    5,
                ),
                Network::Twitter => (
                    title.to_string(),
                    format!("{} {} {}", hook, title, cta),
                    3,
                ),
            };

            let tags: Vec<String> = hashtags.iter().take(tag_budget).cloned().collect();
            let tag_line = tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ");
            let content = if tag_line.is_empty() {
                body
            } else {
                let room = network.max_chars().saturating_sub(tag_line.chars().count() + 1);
                format!("{} {}", truncate(&body, room), tag_line)
            };

            GeneratedPost {
                network: *network,
                title: post_title,
                content: truncate(&content, network.max_chars()),
                hashtags: tags,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewProduct;

    fn product() -> Product {
        Product::create(
            Uuid::nil(),
            NewProduct {
                title: "Fraction Worksheets for 3rd Grade".into(),
                description: "Forty pages of fraction practice. Answer keys included.".into(),
                tags: vec!["Fractions".into(), "math worksheets".into(), "fractions".into(), "3rd-grade".into()],
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_hashtags_are_normalized_and_unique() {
        let tags = hashtags_for(&product());
        assert_eq!(tags[..3], ["fractions", "mathworksheets", "3rdgrade"]);
        assert!(tags.contains(&"fraction".to_string()));
        assert!(tags.contains(&"worksheets".to_string()));
        let unique: HashSet<&String> = tags.iter().collect();
        assert_eq!(unique.len(), tags.len());
    }

    #[test]
    fn test_stub_posts_cover_networks_and_limits() {
        let mut long = product();
        long.description = "word ".repeat(400);
        long.title = "T".repeat(300);

        let posts = stub_posts(&long, &Network::ALL);
        assert_eq!(posts.len(), 4);
        for post in &posts {
            assert!(post.content.chars().count() <= post.network.max_chars());
        }
    }

    #[test]
    fn test_stub_posts_are_deterministic() {
        let p = product();
        assert_eq!(stub_posts(&p, &[Network::Twitter]), stub_posts(&p, &[Network::Twitter]));
        let twitter = &stub_posts(&p, &[Network::Twitter])[0];
        assert!(twitter.content.contains("#fractions"));
    }

    #[test]
    fn test_sanitized_model_output() {
        let post = GeneratedPost {
            network: Network::Twitter,
            title: "t".into(),
            content: "x".repeat(400),
            hashtags: vec!["#Math".into(), "math".into(), " ".into()],
        }
        .sanitized();
        assert_eq!(post.hashtags, vec!["math".to_string()]);
        assert_eq!(post.content.chars().count(), 280);
    }
}
