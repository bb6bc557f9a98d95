//! Translation API endpoint configuration.

use url::Url;

/// API base used when no override is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:5001/";

/// Folder the server stores uploads in; it prefixes every
/// `translated_file_path` the API returns.
pub const DEFAULT_UPLOAD_PREFIX: &str = "temp_uploads/";

/// Errors that can occur when building an [`ApiConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base is not a parseable absolute URL.
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBase { url: String, reason: String },

    /// The base parsed but cannot carry endpoint paths.
    #[error("API base URL must be http or https, got {0:?}")]
    UnsupportedScheme(String),

    /// A book path with an empty, `.` or `..` segment, which the URL
    /// parser would silently fold into a different path.
    #[error("book path {0:?} is not a plain relative path")]
    InvalidBookPath(String),
}

/// Where the translation API lives and how it names stored files.
///
/// Endpoint URLs are resolved once at construction so the request
/// paths never need fallible URL joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base: Url,
    hello: Url,
    process: Url,
    view_epub: Url,
    upload_prefix: String,
}

impl ApiConfig {
    /// Build a config from an API base URL such as `http://host:5001`.
    ///
    /// A missing trailing slash is added so endpoint paths are appended
    /// rather than replacing the last path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBase`] if `base` does not parse and
    /// [`ConfigError::UnsupportedScheme`] for anything but http(s).
    pub fn from_base(base: &str) -> Result<Self, ConfigError> {
        let invalid = |e: url::ParseError| ConfigError::InvalidBase {
            url: base.to_owned(),
            reason: e.to_string(),
        };

        let mut base_url = Url::parse(base.trim()).map_err(invalid)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(
                base_url.scheme().to_owned(),
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            hello: base_url.join("api/hello").map_err(invalid)?,
            process: base_url.join("api/process").map_err(invalid)?,
            view_epub: base_url.join("api/view-epub/").map_err(invalid)?,
            base: base_url,
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_owned(),
        })
    }

    /// Replace the server upload folder prefix (a trailing `/` is implied).
    #[must_use]
    pub fn with_upload_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim_end_matches('/');
        self.upload_prefix = format!("{trimmed}/");
        self
    }

    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// `GET /api/hello`
    #[must_use]
    pub const fn hello_url(&self) -> &Url {
        &self.hello
    }

    /// `POST /api/process`
    #[must_use]
    pub const fn process_url(&self) -> &Url {
        &self.process
    }

    /// `GET /api/view-epub/{path}` with each path segment percent-encoded.
    ///
    /// Surrounding slashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBookPath`] when the path is empty or
    /// any segment is empty, `.` or `..`.
    pub fn view_epub_url(&self, path: &str) -> Result<Url, ConfigError> {
        let trimmed = path.trim_matches('/');
        if trimmed
            .split('/')
            .any(|segment| matches!(segment, "" | "." | ".."))
        {
            return Err(ConfigError::InvalidBookPath(path.to_owned()));
        }

        let mut url = self.view_epub.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidBookPath(path.to_owned()))?
            .pop_if_empty()
            .extend(trimmed.split('/'));
        Ok(url)
    }

    /// Turn a server-side `translated_file_path` into the path the
    /// viewer endpoint expects by dropping the upload folder prefix.
    ///
    /// Windows separators and a leading `./` are tolerated. Paths
    /// without the prefix are returned unchanged.
    #[must_use]
    pub fn strip_upload_prefix(&self, path: &str) -> String {
        let normalized = path.replace('\\', "/");
        let trimmed = normalized.trim_start_matches("./");
        trimmed
            .strip_prefix(self.upload_prefix.as_str())
            .unwrap_or(trimmed)
            .to_owned()
    }
}

impl Default for ApiConfig {
    #[allow(clippy::expect_used)] // DEFAULT_API_BASE is a valid http URL
    fn default() -> Self {
        Self::from_base(DEFAULT_API_BASE).expect("default API base must parse")
    }
}
