//! Runtime provider settings.
//!
//! Keys come from the config file, the environment, or `PUT /settings`.
//! The current [`ProviderConfig`] lives behind an `ArcSwap` so readers never
//! block a swap; clients are built per call from the loaded snapshot.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::providers::llm::LlmClient;
use crate::providers::serp::SerpClient;
use crate::providers::{ProviderError, ProviderResult};

/// Whether a provider answers from its live API or from the stub generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Live,
    Stub,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Stub => "stub",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderModes {
    pub llm: Mode,
    pub serp: Mode,
}

/// Settings as shown on the settings page. Keys are masked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub serp_api_key: Option<String>,
    pub serp_base_url: String,
    pub modes: ProviderModes,
}

/// Partial settings update. `Some("")` clears a key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub serp_api_key: Option<String>,
    pub serp_base_url: Option<String>,
}

impl SettingsUpdate {
    fn apply_to(&self, next: &mut ProviderConfig) {
        if let Some(key) = &self.llm_api_key {
            next.llm_api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());
        }
        if let Some(key) = &self.serp_api_key {
            next.serp_api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());
        }
        if let Some(url) = &self.llm_base_url {
            next.llm_base_url = url.clone();
        }
        if let Some(url) = &self.serp_base_url {
            next.serp_base_url = url.clone();
        }
        if let Some(model) = self.llm_model.as_ref().filter(|m| !m.trim().is_empty()) {
            next.llm_model = model.clone();
        }
    }
}

pub struct Providers {
    settings: ArcSwap<ProviderConfig>,
    http: reqwest::Client,
}

impl Providers {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            settings: ArcSwap::from_pointee(config),
            http: reqwest::Client::new(),
        }
    }

    pub fn settings(&self) -> Arc<ProviderConfig> {
        self.settings.load_full()
    }

    /// Replace the settings wholesale (config reload).
    pub fn replace(&self, config: ProviderConfig) {
        self.settings.store(Arc::new(config));
        let modes = self.modes();
        tracing::info!(llm = modes.llm.as_str(), serp = modes.serp.as_str(), "Provider settings replaced");
    }

    /// Apply a partial update, validating URLs first. Concurrent updates
    /// each land on top of the other rather than overwriting it.
    pub fn apply(&self, update: SettingsUpdate) -> ProviderResult<SettingsView> {
        for (field, value) in [
            ("llm_base_url", &update.llm_base_url),
            ("serp_base_url", &update.serp_base_url),
        ] {
            if let Some(url) = value {
                url::Url::parse(url).map_err(|e| ProviderError::InvalidSetting {
                    field,
                    value: url.clone(),
                    reason: e.to_string(),
                })?;
            }
        }

        self.settings.rcu(|current| {
            let mut next = ProviderConfig::clone(current);
            update.apply_to(&mut next);
            next
        });
        let modes = self.modes();
        tracing::info!(llm = modes.llm.as_str(), serp = modes.serp.as_str(), "Provider settings updated");
        Ok(self.view())
    }

    fn timeout(config: &ProviderConfig) -> Duration {
        Duration::from_secs(config.request_timeout_secs.max(1))
    }

    /// LLM client, or `None` in stub mode.
    pub fn llm(&self) -> Option<LlmClient> {
        let s = self.settings.load();
        s.llm_api_key.as_deref().filter(|k| !k.is_empty()).map(|key| {
            LlmClient::new(self.http.clone(), &s.llm_base_url, key, &s.llm_model, Self::timeout(&s))
        })
    }

    /// SERP client, or `None` in stub mode.
    pub fn serp(&self) -> Option<SerpClient> {
        let s = self.settings.load();
        s.serp_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(|key| SerpClient::new(self.http.clone(), &s.serp_base_url, key, Self::timeout(&s)))
    }

    pub fn modes(&self) -> ProviderModes {
        let s = self.settings.load();
        let mode = |key: &Option<String>| match key.as_deref() {
            Some(k) if !k.is_empty() => Mode::Live,
            _ => Mode::Stub,
        };
        ProviderModes {
            llm: mode(&s.llm_api_key),
            serp: mode(&s.serp_api_key),
        }
    }

    pub fn view(&self) -> SettingsView {
        let s = self.settings.load();
        SettingsView {
            llm_api_key: s.llm_api_key.as_deref().map(mask_key),
            llm_base_url: s.llm_base_url.clone(),
            llm_model: s.llm_model.clone(),
            serp_api_key: s.serp_api_key.as_deref().map(mask_key),
            serp_base_url: s.serp_base_url.clone(),
            modes: self.modes(),
        }
    }
}

/// Show only the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
