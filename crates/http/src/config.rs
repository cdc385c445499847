use std::fmt::Debug;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_STREAM_PATH: &str = "/chat/stream";

/// Builder for [`ChatConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ChatConfigBuilder {
    identity: String,
    base_url: Option<String>,
    stream_path: Option<String>,
    headers: Vec<(String, String)>,
}

impl ChatConfigBuilder {
    /// Creates a builder with the given user identity, which is forwarded
    /// in the identity header of every request.
    #[inline]
    pub fn with_identity<S: Into<String>>(identity: S) -> Self {
        Self {
            identity: identity.into(),
            base_url: None,
            stream_path: None,
            headers: vec![],
        }
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the path of the streaming chat endpoint.
    #[inline]
    pub fn with_stream_path<S: Into<String>>(mut self, path: S) -> Self {
        self.stream_path = Some(path.into());
        self
    }

    /// Adds an extra header sent with every request.
    #[inline]
    pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> ChatConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        ChatConfig {
            identity: self.identity,
            base_url: base_url.trim_end_matches('/').to_owned(),
            stream_path: self
                .stream_path
                .unwrap_or_else(|| DEFAULT_STREAM_PATH.to_string()),
            headers: self.headers,
        }
    }
}

impl Debug for ChatConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfigBuilder")
            .field("identity", &self.identity)
            .field("base_url", &self.base_url)
            .field("stream_path", &self.stream_path)
            .field("headers", &HeaderNames(&self.headers))
            .finish()
    }
}

/// Configuration for [`HttpChatService`](crate::HttpChatService).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ChatConfig {
    pub(crate) identity: String,
    pub(crate) base_url: String,
    pub(crate) stream_path: String,
    pub(crate) headers: Vec<(String, String)>,
}

impl ChatConfig {
    /// Returns the user identity.
    #[inline]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the base URL, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("identity", &self.identity)
            .field("base_url", &self.base_url)
            .field("stream_path", &self.stream_path)
            .field("headers", &HeaderNames(&self.headers))
            .finish()
    }
}

// Extra headers may carry credentials, only their names are printed.
struct HeaderNames<'a>(&'a [(String, String)]);

impl Debug for HeaderNames<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(name, _)| (name, "<deducted>")))
            .finish()
    }
}
