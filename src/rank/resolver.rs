//! Rank resolution: find a listing's position for one keyword.
//!
//! # Responsibilities
//! - Normalize URLs so result links and listing URLs compare equal
//! - Scan ordered organic results for the listing
//! - Derive a deterministic position when no SERP key is configured

use url::{Host, Url};

use crate::observability::metrics;
use crate::providers::hash::rolling_hash;
use crate::providers::serp::{OrganicResult, SerpClient};
use crate::providers::{Mode, ProviderResult};
use crate::store::Device;

/// Canonical form of a URL for matching.
///
/// Drops scheme, userinfo, fragment and default ports, lowercases the host,
/// strips every leading `www.` and trailing slashes, and keeps a non-empty
/// query. Applying it twice gives the same string.
pub fn normalize_url(raw: &str) -> String {
    // Stripping can expose text that parses differently on the next pass
    // (`http://www.80` leaves `80`), so run until the form settles.
    let mut current = normalize_once(raw);
    for _ in 0..MAX_PASSES {
        let next = normalize_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

const MAX_PASSES: usize = 8;

fn normalize_once(raw: &str) -> String {
    let trimmed = raw.trim();
    let candidate = if has_scheme(trimmed) {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{}", trimmed))
    };

    match candidate {
        Ok(url) if url.host_str().is_some() && !rewrites_ipv4(&url, trimmed) => {
            let mut out = strip_www(url.host_str().unwrap_or_default()).to_string();
            if let Some(port) = url.port().filter(|p| *p != 80 && *p != 443) {
                out.push_str(&format!(":{}", port));
            }
            out.push_str(url.path().trim_end_matches('/'));
            if let Some(query) = url.query().filter(|q| !q.is_empty()) {
                out.push('?');
                out.push_str(query);
            }
            out
        }
        _ => normalize_text(trimmed),
    }
}

/// True when the parser turned a non-dotted-quad host (`80`, `0x10`, `1.2`)
/// into an IPv4 address the input never spelled out.
fn rewrites_ipv4(url: &Url, input: &str) -> bool {
    match url.host() {
        Some(Host::Ipv4(addr)) => !input.contains(&addr.to_string()),
        _ => false,
    }
}

fn has_scheme(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn strip_www(host: &str) -> &str {
    let mut host = host;
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest;
    }
    host
}

/// Textual fallback for strings the URL parser rejects.
fn normalize_text(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let without_scheme = ["https://", "http://"]
        .iter()
        .find_map(|p| lower.strip_prefix(p))
        .unwrap_or(&lower)
        .trim();
    let without_fragment = without_scheme.split('#').next().unwrap_or_default();
    strip_www(without_fragment).trim().trim_end_matches('/').trim().to_string()
}

/// Position of `target` in `results`, if present. A result's position is
/// its reported `position`, or its 1-based index when the API omits it.
pub fn find_position(results: &[OrganicResult], target: &str) -> Option<u32> {
    let target = normalize_url(target);
    results.iter().enumerate().find_map(|(i, r)| {
        (normalize_url(&r.link) == target).then(|| r.position.unwrap_or(i as u32 + 1))
    })
}

/// Deterministic stand-in position for `(phrase, url)`.
///
/// One hash bucket in ten reports "not found"; the rest land in
/// `[1, max_position]`.
pub fn stub_position(phrase: &str, url: &str, max_position: u32) -> Option<u32> {
    let key = format!("{}|{}", phrase.trim().to_lowercase(), normalize_url(url));
    let hash = rolling_hash(&key);
    if hash % 10 == 0 {
        return None;
    }
    Some((hash / 10) % max_position.max(1) + 1)
}

/// Resolves positions live or from the stub generator.
#[derive(Debug, Clone)]
pub enum RankResolver {
    Live(SerpClient),
    Stub { max_position: u32 },
}

impl RankResolver {
    pub fn new(serp: Option<SerpClient>, stub_max_position: u32) -> Self {
        match serp {
            Some(client) => RankResolver::Live(client),
            None => RankResolver::Stub {
                max_position: stub_max_position,
            },
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            RankResolver::Live(_) => Mode::Live,
            RankResolver::Stub { .. } => Mode::Stub,
        }
    }

    pub async fn resolve(
        &self,
        phrase: &str,
        target_url: &str,
        country: &str,
        device: Device,
    ) -> ProviderResult<Option<u32>> {
        match self {
            RankResolver::Live(client) => {
                let results = client.search(phrase, country, device).await?;
                Ok(find_position(&results, target_url))
            }
            RankResolver::Stub { max_position } => {
                metrics::record_provider_call("serp", "stub");
                Ok(stub_position(phrase, target_url, *max_position))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(position: Option<u32>, link: &str) -> OrganicResult {
        OrganicResult {
            position,
            link: link.to_string(),
            title: None,
        }
    }

    #[test]
    fn test_normalize_strips_noise() {
        assert_eq!(
            normalize_url("https://www.Example.com/Product/Fractions-123/"),
            "example.com/Product/Fractions-123"
        );
        assert_eq!(normalize_url("http://example.com"), "example.com");
        assert_eq!(normalize_url("example.com/"), "example.com");
        assert_eq!(normalize_url("https://www.www.example.com/a#reviews"), "example.com/a");
        assert_eq!(normalize_url("https://example.com:443/a"), "example.com/a");
        assert_eq!(normalize_url("https://example.com:8443/a?ref=x"), "example.com:8443/a?ref=x");
        assert_eq!(normalize_url("https://user:pw@example.com/a?"), "example.com/a");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://www.teacherspayteachers.com/Product/Fraction-Worksheets-123/",
            "HTTP://WWW.EXAMPLE.COM:80/A/B//",
            "http://example.com:443/",
            "www.www.example.com",
            "example.com/a b/c",
            "https://example.com/?q=1",
            "https://xn--bcher-kva.example/",
            "not a url at all/",
            "",
            "http://[::1]:8080/x/",
            "https://example.com/caf\u{e9}/",
            "http://www.80",
            "http:// a",
            "0x10/a",
            "http://1.2/",
        ];
        for input in inputs {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_normalize_keeps_bare_numbers_textual() {
        assert_eq!(normalize_url("http://www.80"), "80");
        assert_eq!(normalize_url("80"), "80");
        assert_eq!(normalize_url("http:// a"), "a");
        assert_eq!(normalize_url("http://1.2/"), "1.2");
        assert_eq!(normalize_url("http://10.0.0.1:8080/x/"), "10.0.0.1:8080/x");
    }

    #[test]
    fn test_normalize_is_idempotent_across_combinations() {
        let schemes = ["", "http://", "HTTPS://", "http:// ", "https://user@"];
        let prefixes = ["", "www.", "www.www.", " www."];
        let hosts = ["80", "a", "Example.com", "1.2", "0x10", "10.0.0.1", "[::1]", "xn--bcher-kva.example", "a b"];
        let tails = ["", "/", "/A/ ", "?q=1", "#f", ":80/", ":8080", "/a/./b//", "/%zz", " "];

        for scheme in schemes {
            for prefix in prefixes {
                for host in hosts {
                    for tail in tails {
                        let input = format!("{}{}{}{}", scheme, prefix, host, tail);
                        let once = normalize_url(&input);
                        assert_eq!(normalize_url(&once), once, "input {:?}", input);
                    }
                }
            }
        }
    }

    #[test]
    fn test_find_position_matches_normalized_links() {
        let results = vec![
            result(Some(1), "https://other.com/"),
            result(Some(2), "https://www.example.com/product/1/"),
            result(Some(3), "https://example.com/product/1"),
        ];
        assert_eq!(find_position(&results, "http://example.com/product/1"), Some(2));
        assert_eq!(find_position(&results, "https://example.com/product/2"), None);
    }

    #[test]
    fn test_find_position_falls_back_to_index() {
        let results = vec![result(None, "https://a.com"), result(None, "https://b.com")];
        assert_eq!(find_position(&results, "b.com"), Some(2));
    }

    #[test]
    fn test_stub_position_is_deterministic_and_bounded() {
        let url = "https://www.example.com/product/fractions";
        let first = stub_position("math worksheets", url, 50);
        for _ in 0..5 {
            assert_eq!(stub_position("math worksheets", url, 50), first);
        }

        let mut found = 0;
        let mut missing = 0;
        for i in 0..500 {
            match stub_position(&format!("phrase {}", i), url, 50) {
                Some(p) => {
                    assert!((1..=50).contains(&p));
                    found += 1;
                }
                None => missing += 1,
            }
        }
        assert!(found > missing);
    }

    #[test]
    fn test_stub_position_ignores_url_noise() {
        assert_eq!(
            stub_position("math worksheets", "https://www.example.com/p/", 50),
            stub_position("Math Worksheets", "example.com/p", 50)
        );
    }

    #[tokio::test]
    async fn test_stub_resolver() {
        let resolver = RankResolver::new(None, 50);
        assert_eq!(resolver.mode(), Mode::Stub);
        let a = resolver
            .resolve("math worksheets", "example.com/p", "us", Device::Desktop)
            .await
            .unwrap();
        let b = resolver
            .resolve("math worksheets", "example.com/p", "gb", Device::Mobile)
            .await
            .unwrap();
        assert_eq!(a, b);
    }
}
