//! Social post CSV: `Network,Title,Content,Hashtags`.
//!
//! Hashtags are written space-separated with a leading `#`.

use serde::{Deserialize, Serialize};

use crate::exchange::{finish, parse_rows, ExchangeResult};
use crate::providers::social::GeneratedPost;
use crate::store::{Network, SocialPost};

pub const SOCIAL_COLUMNS: [&str; 4] = ["Network", "Title", "Content", "Hashtags"];

#[derive(Debug, Serialize)]
struct SocialRowOut<'a> {
    #[serde(rename = "Network")]
    network: &'static str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Content")]
    content: &'a str,
    #[serde(rename = "Hashtags")]
    hashtags: String,
}

#[derive(Debug, Deserialize)]
struct SocialRowIn {
    network: Option<String>,
    title: Option<String>,
    content: Option<String>,
    hashtags: Option<String>,
}

pub fn export_social(posts: &[SocialPost]) -> ExchangeResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for post in posts {
        writer.serialize(SocialRowOut {
            network: post.network.label(),
            title: &post.title,
            content: &post.content,
            hashtags: post
                .hashtags
                .iter()
                .map(|h| format!("#{}", h))
                .collect::<Vec<_>>()
                .join(" "),
        })?;
    }
    if posts.is_empty() {
        writer.write_record(SOCIAL_COLUMNS)?;
    }
    finish(writer)
}

/// Read an exported social CSV back into posts.
pub fn parse_social_csv(text: &str) -> ExchangeResult<Vec<GeneratedPost>> {
    // Copy keeps its padding and trailing newlines.
    let parsed = parse_rows(text, &["network", "content"], csv::Trim::None, |row: SocialRowIn| {
        let network: Network = row.network.unwrap_or_default().parse()?;
        Ok(GeneratedPost {
            network,
            title: row.title.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            hashtags: row
                .hashtags
                .unwrap_or_default()
                .split_whitespace()
                .map(|h| h.trim_start_matches('#').to_string())
                .filter(|h| !h.is_empty())
                .collect(),
        })
    })?;
    if let Some(first) = parsed.errors.first() {
        tracing::warn!(line = first.line, skipped = parsed.errors.len(), "Skipped social CSV rows");
    }
    Ok(parsed.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserContext;
    use uuid::Uuid;

    #[test]
    fn test_export_round_trips() {
        let user = UserContext {
            user_id: Uuid::new_v4(),
            email: "a@b.co".into(),
            access_token: "t".into(),
        };
        let posts: Vec<SocialPost> = vec![
            GeneratedPost {
                network: Network::Twitter,
                title: "Launch, \"new\" pack".into(),
                content: "Fractions made easy!\nGrab it today.".into(),
                hashtags: vec!["math".into(), "teachers".into()],
            },
            GeneratedPost {
                network: Network::Pinterest,
                title: "Pin".into(),
                content: "Save for later".into(),
                hashtags: vec![],
            },
            GeneratedPost {
                network: Network::Facebook,
                title: "  Indented title".into(),
                content: "Line one\n\n".into(),
                hashtags: vec!["k5".into()],
            },
            GeneratedPost {
                network: Network::Instagram,
                title: "Trailing space ".into(),
                content: " \tTabbed, with a comma ".into(),
                hashtags: vec![],
            },
        ]
        .into_iter()
        .map(|p| p.into_record(&user, Uuid::nil()))
        .collect();

        let csv = export_social(&posts).unwrap();
        assert!(csv.starts_with("Network,Title,Content,Hashtags\n"));
        assert!(csv.contains("#math #teachers"));

        let back = parse_social_csv(&csv).unwrap();
        assert_eq!(back.len(), posts.len());
        for (post, parsed) in posts.iter().zip(&back) {
            assert_eq!(parsed.network, post.network);
            assert_eq!(parsed.title, post.title);
            assert_eq!(parsed.content, post.content);
            assert_eq!(parsed.hashtags, post.hashtags);
        }
    }

    #[test]
    fn test_empty_export_has_header() {
        assert_eq!(export_social(&[]).unwrap(), "Network,Title,Content,Hashtags\n");
    }
}
