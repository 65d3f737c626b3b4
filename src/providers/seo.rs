//! SEO heuristics and stub copy variants.
//!
//! Every score is an integer in `[0, 100]`. Scores combine a length fit
//! with keyword coverage and a few structure checks; they are a guide for
//! sellers, not a model of any search engine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::providers::hash::rolling_hash;
use crate::store::Product;

const TITLE_IDEAL: (usize, usize) = (40, 80);
const TITLE_HARD_MAX: usize = 140;
const DESCRIPTION_IDEAL: (usize, usize) = (150, 500);
const DESCRIPTION_HARD_MAX: usize = 2000;
const TAG_COUNT_IDEAL: (usize, usize) = (5, 13);
const TAG_COUNT_HARD_MAX: usize = 30;
const TAG_MAX_CHARS: usize = 20;

/// Scores and advice for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoReport {
    pub product_id: Uuid,
    pub title: u8,
    pub description: u8,
    pub tags: u8,
    pub overall: u8,
    pub suggestions: Vec<String>,
}

/// An alternative title/description pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoVariant {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// How well `len` sits inside `[min, max]`, in `[0, 1]`. Below the range it
/// grows linearly from zero; above it decays to 0.2 at `hard_max`.
fn length_fit(len: usize, (min, max): (usize, usize), hard_max: usize) -> f64 {
    if len == 0 {
        0.0
    } else if len < min {
        len as f64 / min as f64
    } else if len <= max {
        1.0
    } else if len >= hard_max {
        0.2
    } else {
        1.0 - 0.8 * (len - max) as f64 / (hard_max - max) as f64
    }
}

fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Fraction of the first `limit` non-empty tags that occur in `text`.
fn tag_coverage(text: &str, tags: &[String], limit: usize) -> f64 {
    let haystack = text.to_lowercase();
    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .take(limit)
        .collect();
    if tags.is_empty() {
        return 0.0;
    }
    let hits = tags.iter().filter(|t| haystack.contains(t.as_str())).count();
    hits as f64 / tags.len() as f64
}

pub fn title_score(title: &str, tags: &[String]) -> u8 {
    let title = title.trim();
    let len = title.chars().count();
    if len == 0 {
        return 0;
    }

    let mut score = 50.0 * length_fit(len, TITLE_IDEAL, TITLE_HARD_MAX);
    score += 25.0 * tag_coverage(title, tags, 5);

    let raw_words: Vec<&str> = title.split_whitespace().collect();
    let long_words: Vec<&&str> = raw_words.iter().filter(|w| w.chars().count() > 3).collect();
    if !long_words.is_empty() {
        let capitalised = long_words
            .iter()
            .filter(|w| w.chars().next().map(char::is_uppercase).unwrap_or(false))
            .count();
        score += 15.0 * capitalised as f64 / long_words.len() as f64;
    }

    let normalized = words(title);
    if !normalized.is_empty() {
        let unique: HashSet<&String> = normalized.iter().collect();
        score += 10.0 * unique.len() as f64 / normalized.len() as f64;
    }

    let letters: Vec<char> = title.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 10 && letters.iter().all(|c| c.is_uppercase()) {
        score -= 20.0;
    }

    clamp_score(score)
}

pub fn description_score(description: &str, tags: &[String]) -> u8 {
    let description = description.trim();
    let len = description.chars().count();
    if len == 0 {
        return 0;
    }

    let mut score = 50.0 * length_fit(len, DESCRIPTION_IDEAL, DESCRIPTION_HARD_MAX);
    score += 25.0 * tag_coverage(description, tags, 10);

    let sentences = description
        .split(['.', '!', '?'])
        .filter(|s| s.split_whitespace().count() >= 3)
        .count();
    score += 15.0 * sentences.min(3) as f64 / 3.0;

    // Concrete details (grade levels, page counts, bullet lists).
    if description.chars().any(|c| c.is_ascii_digit()) || description.contains('\n') {
        score += 10.0;
    }

    clamp_score(score)
}

pub fn tags_score(tags: &[String]) -> u8 {
    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        return 0;
    }

    let mut score = 50.0 * length_fit(tags.len(), TAG_COUNT_IDEAL, TAG_COUNT_HARD_MAX);

    let unique: HashSet<&String> = tags.iter().collect();
    score += 20.0 * unique.len() as f64 / tags.len() as f64;

    let multi_word = tags.iter().filter(|t| t.split_whitespace().count() > 1).count();
    score += 15.0 * multi_word.min(3) as f64 / 3.0;

    let fitting = tags
        .iter()
        .filter(|t| (2..=TAG_MAX_CHARS).contains(&t.chars().count()))
        .count();
    score += 15.0 * fitting as f64 / tags.len() as f64;

    clamp_score(score)
}

/// Score a product and explain what would raise the score.
pub fn seo_report(product: &Product) -> SeoReport {
    let title = title_score(&product.title, &product.tags);
    let description = description_score(&product.description, &product.tags);
    let tags = tags_score(&product.tags);
    let overall = clamp_score(0.40 * title as f64 + 0.35 * description as f64 + 0.25 * tags as f64);

    SeoReport {
        product_id: product.id,
        title,
        description,
        tags,
        overall,
        suggestions: suggestions(product),
    }
}

fn suggestions(product: &Product) -> Vec<String> {
    let mut out = Vec::new();
    let title_len = product.title.trim().chars().count();
    let description_len = product.description.trim().chars().count();
    let tag_count = product.tags.iter().filter(|t| !t.trim().is_empty()).count();

    if title_len < TITLE_IDEAL.0 {
        out.push(format!("Lengthen the title to at least {} characters.", TITLE_IDEAL.0));
    } else if title_len > TITLE_IDEAL.1 {
        out.push(format!("Shorten the title to {} characters or fewer.", TITLE_IDEAL.1));
    }
    if tag_count > 0 && tag_coverage(&product.title, &product.tags, 5) < 0.4 {
        out.push("Work your strongest tags into the title.".to_string());
    }
    if description_len < DESCRIPTION_IDEAL.0 {
        out.push(format!(
            "Expand the description to at least {} characters.",
            DESCRIPTION_IDEAL.0
        ));
    }
    if tag_count < TAG_COUNT_IDEAL.0 {
        out.push(format!("Add tags: aim for {} to {}.", TAG_COUNT_IDEAL.0, TAG_COUNT_IDEAL.1));
    } else if tag_count > TAG_COUNT_IDEAL.1 {
        out.push(format!("Trim tags to the {} most relevant.", TAG_COUNT_IDEAL.1));
    }
    if product
        .tags
        .iter()
        .any(|t| t.trim().chars().count() > TAG_MAX_CHARS)
    {
        out.push(format!("Keep each tag within {} characters.", TAG_MAX_CHARS));
    }
    out
}

const TITLE_TEMPLATES: [&str; 6] = [
    "{title} | {tag} Activities",
    "{title} - Printable and Digital {tag}",
    "{tag} {title} for the Classroom",
    "{title}: {tag} Practice Pack",
    "Engaging {title} ({tag})",
    "{title} - No Prep {tag} Resource",
];

const DESCRIPTION_TEMPLATES: [&str; 5] = [
    "{lead} This {tag} resource is ready to print or assign digitally, so students can start right away.",
    "{lead} Built for busy teachers: clear directions, answer keys, and {tag} practice that sticks.",
    "Looking for {tag} practice? {lead} Use it for centers, homework, or quick review.",
    "{lead} Students stay engaged with {tag} tasks that build confidence step by step.",
    "Save planning time with {title}. {lead} Includes everything you need for {tag} lessons.",
];

/// Three deterministic title/description variants for a product.
pub fn stub_variants(product: &Product) -> Vec<SeoVariant> {
    let title = product.title.trim();
    let tags: Vec<&str> = product
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    let seed = rolling_hash(&format!("{}|{}", title, product.description)) as usize;
    let lead = first_sentence(&product.description);

    (0..3)
        .map(|i| {
            let tag = if tags.is_empty() {
                "Skill".to_string()
            } else {
                title_case(tags[(seed + i) % tags.len()])
            };
            let title_template = TITLE_TEMPLATES[(seed + i) % TITLE_TEMPLATES.len()];
            let description_template = DESCRIPTION_TEMPLATES[(seed / 7 + i) % DESCRIPTION_TEMPLATES.len()];

            let new_title: String = title_template
                .replace("{title}", title)
                .replace("{tag}", &tag)
                .chars()
                .take(TITLE_HARD_MAX)
                .collect();
            let description = description_template
                .replace("{lead}", &lead)
                .replace("{title}", title)
                .replace("{tag}", &tag.to_lowercase())
                .trim()
                .to_string();

            SeoVariant {
                title: new_title,
                description,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            }
        })
        .collect()
}

fn first_sentence(text: &str) -> String {
    let text = text.trim();
    match text.find(['.', '!', '?']) {
        Some(end) => text[..=end].to_string(),
        None if text.is_empty() => String::new(),
        None => format!("{}.", text),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
