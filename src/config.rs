//! Configuration types for the question-answering service.
//!
//! Every runtime knob lives in [`ServerConfig`], built via its
//! [`ServerConfigBuilder`]. The `pdfqa` binary maps its CLI flags and
//! environment variables onto the builder; library users set only what they
//! care about and rely on the defaults for the rest.

use crate::error::PdfQaError;
use crate::store::ActiveDocumentPolicy;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Default Ollama generation endpoint.
pub const DEFAULT_INFERENCE_URL: &str = "http://localhost:11434/api/generate";

/// Default model identifier sent with every generation request.
pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

/// Default upload body limit: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Configuration for the PDF question-answering service.
///
/// # Example
/// ```rust
/// use edgequake_pdfqa::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .port(9000)
///     .model("llama3.2")
///     .inference_timeout_secs(120)
///     .build()
///     .unwrap();
/// assert_eq!(config.port, 9000);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind. Default: `0.0.0.0`.
    pub host: String,

    /// TCP port to listen on. Default: 8000.
    pub port: u16,

    /// Full URL of the generation endpoint. Default: [`DEFAULT_INFERENCE_URL`].
    pub inference_url: String,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Per-call timeout for the inference endpoint in seconds.
    ///
    /// `None` (the default) waits indefinitely: a stalled endpoint stalls the
    /// request that is waiting on it.
    pub inference_timeout_secs: Option<u64>,

    /// Sampling temperature forwarded as `options.temperature`.
    /// `None` leaves the model's own default in place.
    pub temperature: Option<f32>,

    /// Maximum accepted upload body size in bytes. Default: 50 MiB.
    pub max_upload_bytes: usize,

    /// Remove `<think>…</think>` blocks from the model output before looking
    /// for the JSON object. Default: false.
    pub strip_reasoning: bool,

    /// Which stored document answers a question that does not name one.
    /// Default: [`ActiveDocumentPolicy::FirstUploaded`].
    pub active_document: ActiveDocumentPolicy,

    /// Allow any origin, method and header (CORS). Default: true.
    pub permissive_cors: bool,

    /// Explicit path to the pdfium shared library. If None, the working
    /// directory and then the system library path are searched.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            inference_timeout_secs: None,
            temperature: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            strip_reasoning: false,
            active_document: ActiveDocumentPolicy::default(),
            permissive_cors: true,
            pdfium_lib_path: None,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }

    /// The inference timeout as a `Duration`, if one is configured.
    pub fn inference_timeout(&self) -> Option<Duration> {
        self.inference_timeout_secs.map(Duration::from_secs)
    }

    /// Socket address the server binds to. `host` must be an IPv4 or IPv6
    /// literal; hostnames are not resolved.
    pub fn socket_addr(&self) -> Result<SocketAddr, PdfQaError> {
        let ip: IpAddr = self.host.parse().map_err(|e| {
            PdfQaError::InvalidConfig(format!(
                "bind host must be an IP address, got '{}': {}",
                self.host, e
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn inference_url(mut self, url: impl Into<String>) -> Self {
        self.config.inference_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn inference_timeout_secs(mut self, secs: u64) -> Self {
        self.config.inference_timeout_secs = Some(secs);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn strip_reasoning(mut self, v: bool) -> Self {
        self.config.strip_reasoning = v;
        self
    }

    pub fn active_document(mut self, policy: ActiveDocumentPolicy) -> Self {
        self.config.active_document = policy;
        self
    }

    pub fn permissive_cors(mut self, v: bool) -> Self {
        self.config.permissive_cors = v;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, PdfQaError> {
        let c = &self.config;
        if !(c.inference_url.starts_with("http://") || c.inference_url.starts_with("https://")) {
            return Err(PdfQaError::InvalidConfig(format!(
                "inference URL must start with http:// or https://, got '{}'",
                c.inference_url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(PdfQaError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(PdfQaError::InvalidConfig(
                "max upload size must be ≥ 1 byte".into(),
            ));
        }
        if c.inference_timeout_secs == Some(0) {
            return Err(PdfQaError::InvalidConfig(
                "inference timeout must be ≥ 1s (omit it to wait indefinitely)".into(),
            ));
        }
        self.config.socket_addr()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_ollama() {
        let c = ServerConfig::default();
        assert_eq!(c.inference_url, "http://localhost:11434/api/generate");
        assert_eq!(c.model, "deepseek-r1:1.5b");
        assert_eq!(c.port, 8000);
        assert!(c.inference_timeout().is_none());
        assert!(!c.strip_reasoning);
        assert_eq!(c.active_document, ActiveDocumentPolicy::FirstUploaded);
    }

    #[test]
    fn builder_sets_timeout() {
        let c = ServerConfig::builder()
            .inference_timeout_secs(30)
            .build()
            .unwrap();
        assert_eq!(c.inference_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn builder_rejects_non_http_url() {
        let err = ServerConfig::builder()
            .inference_url("localhost:11434")
            .build()
            .unwrap_err();
        assert!(matches!(err, PdfQaError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        assert!(ServerConfig::builder()
            .inference_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_bad_host() {
        assert!(ServerConfig::builder().host("not a host").build().is_err());
    }

    #[test]
    fn temperature_is_clamped() {
        let c = ServerConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, Some(2.0));
    }

    #[test]
    fn ipv6_hosts_are_accepted() {
        let c = ServerConfig::builder().host("::1").port(9100).build().unwrap();
        assert_eq!(c.socket_addr().unwrap().to_string(), "[::1]:9100");
        let any = ServerConfig::builder().host("::").build().unwrap();
        assert!(any.socket_addr().unwrap().is_ipv6());
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        let c = ServerConfig::builder()
            .host("127.0.0.1")
            .port(9100)
            .build()
            .unwrap();
        assert_eq!(c.socket_addr().unwrap().to_string(), "127.0.0.1:9100");
    }
}
