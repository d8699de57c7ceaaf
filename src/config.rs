use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Runtime configuration, extracted from defaults merged with
/// `BOOKMARKD_`-prefixed environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    /// Key used for bookmarks when there is only one bookmark-per-content.
    pub default_key: String,
    /// Querystring parameter that may carry the post-save redirect URL.
    pub next_querystring_key: String,
    /// Set to false to globally disable bookmark deletion.
    pub can_remove_bookmarks: bool,
    /// Content types registered by the standalone binary, each entry
    /// formatted as `content_type:table:pk_column`.
    pub content_types: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:bookmarkd.sqlite".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            default_key: "main".to_string(),
            next_querystring_key: "next".to_string(),
            can_remove_bookmarks: true,
            content_types: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("BOOKMARKD_"))
            .extract()
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("invalid bookmarkd configuration"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.default_key, "main");
        assert_eq!(cfg.next_querystring_key, "next");
        assert!(cfg.can_remove_bookmarks);
    }
}
