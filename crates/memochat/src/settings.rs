use std::env;
use std::path::PathBuf;

use memochat_core::identity::{IdentityStore, resolve_identity};
use memochat_http::{ChatConfig, ChatConfigBuilder};

/// The variable overriding the service base URL.
pub const BASE_URL_VAR: &str = "MEMOCHAT_BASE_URL";
/// The variable overriding the stored identity.
pub const USER_ID_VAR: &str = "MEMOCHAT_USER_ID";

/// Settings read from the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Settings {
    /// Base URL of the service, the library default if unset.
    pub base_url: Option<String>,
    /// Identity to use instead of the stored one.
    pub user_id: Option<String>,
}

impl Settings {
    /// Reads the settings from the process environment.
    #[inline]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the settings with `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        Self {
            base_url: read(BASE_URL_VAR),
            user_id: read(USER_ID_VAR),
        }
    }

    /// Returns the path of the identity file, if the platform has a config
    /// directory.
    pub fn identity_file() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("memochat").join("identity.json"))
    }

    /// Returns the identity override, or the one resolved from `store`.
    pub fn identity(&self, store: &dyn IdentityStore) -> String {
        match &self.user_id {
            Some(user_id) => {
                debug!("using the identity from {USER_ID_VAR}");
                user_id.clone()
            }
            None => resolve_identity(store),
        }
    }

    /// Builds the service configuration for `identity`.
    pub fn chat_config(&self, identity: String) -> ChatConfig {
        let mut builder = ChatConfigBuilder::with_identity(identity);
        if let Some(base_url) = &self.base_url {
            builder = builder.with_base_url(base_url);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use memochat_core::identity::{IDENTITY_KEY, MemoryIdentityStore};

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<_, _> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_from_lookup() {
        assert_eq!(settings(&[]), Settings::default());

        let s = settings(&[
            (BASE_URL_VAR, " http://chat.local:9000/ "),
            (USER_ID_VAR, "  "),
        ]);
        assert_eq!(s.base_url.as_deref(), Some("http://chat.local:9000/"));
        assert_eq!(s.user_id, None);
    }

    #[test]
    fn test_chat_config() {
        let config = settings(&[]).chat_config("alice".to_owned());
        assert_eq!(config.identity(), "alice");
        assert_eq!(config.base_url(), "http://localhost:8000");

        let config = settings(&[(BASE_URL_VAR, "http://chat.local:9000/")])
            .chat_config("alice".to_owned());
        assert_eq!(config.base_url(), "http://chat.local:9000");
    }

    #[test]
    fn test_identity_override() {
        let store = MemoryIdentityStore::new();
        store.store(IDENTITY_KEY, "stored").unwrap();

        assert_eq!(settings(&[]).identity(&store), "stored");
        let s = settings(&[(USER_ID_VAR, "override")]);
        assert_eq!(s.identity(&store), "override");
        assert_eq!(store.load(IDENTITY_KEY).as_deref(), Some("stored"));
    }
}
