// src/config.rs
// Credentials for the optional external services. A missing credential
// disables the dependent backend or strategy; it is never an error. The
// loaded object is passed explicitly into the pipeline entry point so the
// pipeline itself stays free of process-global state.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "SHOPWATCH_CREDENTIALS_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Enables the model-based extraction strategy.
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// Enables the news-search backend.
    #[serde(default)]
    pub news_api_key: Option<String>,
    /// Web-search backend needs both the key and the engine id.
    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default, rename = "googleCseCx")]
    pub google_engine_id: Option<String>,
}

impl Credentials {
    pub fn has_model(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn has_news_search(&self) -> bool {
        self.news_api_key.is_some()
    }

    pub fn has_web_search(&self) -> bool {
        self.google_api_key.is_some() && self.google_engine_id.is_some()
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading credentials from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut creds = parse_credentials(&content, ext.as_str())?;
        creds.apply_env_overrides();
        creds.drop_blank_keys();
        Ok(creds)
    }

    /// Load using env var + fallbacks:
    /// 1) $SHOPWATCH_CREDENTIALS_PATH
    /// 2) config/credentials.toml
    /// 3) config/credentials.json
    /// A missing file yields empty credentials, not an error.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("SHOPWATCH_CREDENTIALS_PATH points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/credentials.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/credentials.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        let mut creds = Credentials::default();
        creds.apply_env_overrides();
        creds.drop_blank_keys();
        Ok(creds)
    }

    /// Environment variables win over file contents.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("NEWS_API_KEY") {
            self.news_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("GOOGLE_API_KEY") {
            self.google_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("GOOGLE_CSE_CX") {
            self.google_engine_id = Some(v);
        }
    }

    /// Blank strings behave like absent credentials.
    fn drop_blank_keys(&mut self) {
        for slot in [
            &mut self.openai_api_key,
            &mut self.news_api_key,
            &mut self.google_api_key,
            &mut self.google_engine_id,
        ] {
            if slot.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *slot = None;
            }
        }
    }
}

fn parse_credentials(s: &str, hint_ext: &str) -> Result<Credentials> {
    if hint_ext == "toml" {
        if let Ok(v) = toml::from_str::<Credentials>(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = serde_json::from_str::<Credentials>(s) {
        return Ok(v);
    }
    if hint_ext != "toml" {
        if let Ok(v) = toml::from_str::<Credentials>(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported credentials format"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn clear_cred_env() {
        for k in ["OPENAI_API_KEY", "NEWS_API_KEY", "GOOGLE_API_KEY", "GOOGLE_CSE_CX", ENV_PATH] {
            env::remove_var(k);
        }
    }

    #[serial_test::serial]
    #[test]
    fn json_and_toml_formats_parse() {
        clear_cred_env();
        let tmp = tempfile::tempdir().unwrap();

        let p_json = tmp.path().join("credentials.json");
        std::fs::write(&p_json, r#"{"newsApiKey": "abc", "googleCseCx": "cx1"}"#).unwrap();
        let c = Credentials::load_from(&p_json).unwrap();
        assert_eq!(c.news_api_key.as_deref(), Some("abc"));
        assert_eq!(c.google_engine_id.as_deref(), Some("cx1"));
        assert!(!c.has_web_search()); // cx without key is not enough

        let p_toml = tmp.path().join("credentials.toml");
        std::fs::write(&p_toml, "googleApiKey = \"k\"\ngoogleCseCx = \"cx\"\n").unwrap();
        let c = Credentials::load_from(&p_toml).unwrap();
        assert!(c.has_web_search());
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_file_and_blank_means_absent() {
        clear_cred_env();
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("credentials.json");
        std::fs::write(&p, r#"{"openaiApiKey": "from-file", "newsApiKey": "  "}"#).unwrap();

        env::set_var("OPENAI_API_KEY", "from-env");
        let c = Credentials::load_from(&p).unwrap();
        assert_eq!(c.openai_api_key.as_deref(), Some("from-env"));
        assert_eq!(c.news_api_key, None); // blank collapses to absent
        clear_cred_env();
    }

    #[serial_test::serial]
    #[test]
    fn missing_file_yields_empty_credentials() {
        clear_cred_env();
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        let c = Credentials::load_default().unwrap();
        assert!(!c.has_model());
        assert!(!c.has_news_search());
        assert!(!c.has_web_search());

        env::set_current_dir(&old).unwrap();
    }
}
