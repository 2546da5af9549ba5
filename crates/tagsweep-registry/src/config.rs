//! Configuration types for the registry client.

use std::path::PathBuf;
use std::time::Duration;

use tagsweep_core::{Validate, ValidationError, ValidationErrors};

/// Page size used when listing repositories.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size Harbor honours.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry base URL (e.g., "<https://harbor.example.com>").
    pub url: String,

    /// Authentication configuration.
    pub auth: RegistryAuth,

    /// Upper bound for a whole request, including reading the body.
    pub timeout: Duration,

    /// Upper bound for establishing a connection.
    pub connect_timeout: Duration,

    /// Number of repositories requested per page.
    pub page_size: u32,

    /// TLS configuration.
    pub tls: Option<TlsConfig>,

    /// User agent string.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given base URL.
    ///
    /// A trailing `/` is removed so that paths can be appended directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagsweep_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://harbor.example.com/");
    /// assert_eq!(config.url, "https://harbor.example.com");
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            auth: RegistryAuth::None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            page_size: DEFAULT_PAGE_SIZE,
            tls: None,
            user_agent: format!("tagsweep/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the repository listing page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the TLS configuration.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }
}

impl Validate for RegistryConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.url.trim().is_empty() {
            errors.add(ValidationError::required("registry.url"));
        } else {
            match url::Url::parse(&self.url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.add(ValidationError::format(
                    "registry.url",
                    format!("unsupported scheme '{}', expected http or https", parsed.scheme()),
                )),
                Err(e) => errors.add(ValidationError::format("registry.url", e.to_string())),
            }
        }

        if let RegistryAuth::Basic { username, password } = &self.auth {
            if username.is_empty() {
                errors.add(ValidationError::required("registry.username"));
            }
            if password.is_empty() {
                errors.add(ValidationError::required("registry.password"));
            }
        }

        if self.timeout.is_zero() {
            errors.add(ValidationError::range("registry.timeout", "must be greater than zero"));
        }
        if self.connect_timeout.is_zero() {
            errors.add(ValidationError::range(
                "registry.connect_timeout",
                "must be greater than zero",
            ));
        }
        if self.page_size == 0 {
            errors.add(ValidationError::range("registry.page_size", "must be greater than zero"));
        } else if self.page_size > MAX_PAGE_SIZE {
            errors.add(ValidationError::range(
                "registry.page_size",
                format!("must be at most {MAX_PAGE_SIZE}"),
            ));
        }

        errors.into_result()
    }
}

/// Authentication methods for registry access.
#[derive(Clone)]
pub enum RegistryAuth {
    /// No authentication (anonymous pulls on public projects only).
    None,

    /// HTTP basic authentication.
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
}

impl RegistryAuth {
    /// Creates basic authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagsweep_registry::RegistryAuth;
    ///
    /// let auth = RegistryAuth::basic("admin", "Harbor12345");
    /// assert!(format!("{auth:?}").contains("admin"));
    /// assert!(!format!("{auth:?}").contains("Harbor12345"));
    /// ```
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// TLS configuration for registries with private certificates.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Path to an additional CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Whether to skip certificate verification (NOT recommended for production).
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    /// Creates a new TLS configuration with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ca_cert: None,
            insecure_skip_verify: false,
        }
    }

    /// Sets the CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Enables insecure mode (skips certificate verification).
    #[must_use]
    pub const fn insecure(mut self) -> Self {
        self.insecure_skip_verify = true;
        self
    }
}
