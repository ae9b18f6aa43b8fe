//! Built-in bridge discovery and torrc template rendering.
//!
//! OnionShare ships one torrc template per built-in bridge transport. The
//! Tor Project's circumvention ("moat") API publishes the current bridge
//! lines; this module fetches them and rewrites the templates. The API
//! returns bridges in random order, so lines are sorted by their address to
//! keep regenerated templates stable under version control.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::sync::OnceLock;
use std::time::Duration;

/// The moat endpoint publishing the built-in bridges.
pub const MOAT_BUILTIN_ENDPOINT: &str = "https://bridges.torproject.org/moat/circumvention/builtin";

const MOAT_CONTENT_TYPE: &str = "application/vnd.api+json";
const MOAT_TIMEOUT: Duration = Duration::from_secs(30);

/// A built-in bridge transport with its own torrc template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeKind {
    /// meek over Azure's CDN.
    MeekAzure,
    /// obfs4.
    Obfs4,
    /// Snowflake.
    Snowflake,
}

impl BridgeKind {
    /// Every kind, in the order templates are written.
    pub const ALL: [Self; 3] = [Self::MeekAzure, Self::Obfs4, Self::Snowflake];

    /// The key used for this transport in the moat response.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::MeekAzure => "meek-azure",
            Self::Obfs4 => "obfs4",
            Self::Snowflake => "snowflake",
        }
    }

    /// The template filename for this transport.
    ///
    /// # Examples
    ///
    /// ```
    /// use get_tor::bridges::BridgeKind;
    ///
    /// assert_eq!(
    ///     BridgeKind::MeekAzure.template_filename(),
    ///     "torrc_template-meek_lite_azure"
    /// );
    /// ```
    #[must_use]
    pub fn template_filename(self) -> String {
        let suffix = match self {
            Self::MeekAzure => "meek_lite_azure",
            Self::Obfs4 => "obfs4",
            Self::Snowflake => "snowflake",
        };
        format!("torrc_template-{suffix}")
    }
}

impl fmt::Display for BridgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Errors that abort a bridge refresh outright.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The request could not be completed.
    #[error("bridge request to {endpoint} failed: {reason}")]
    Http {
        /// The endpoint that was requested.
        endpoint: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The response body was not the expected JSON.
    #[error("malformed bridge response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Writing a template failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The template being written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Raw reply from the moat endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoatReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

/// What a bridge refresh did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// Templates were rewritten for these kinds; the rest were left alone.
    Updated {
        /// Kinds whose template was rewritten.
        written: Vec<BridgeKind>,
    },
    /// The API refused or reported errors; no template was touched.
    Rejected {
        /// Why the refresh was refused, e.g. `status_code=503`.
        reason: String,
    },
}

impl BridgeOutcome {
    /// Return true when templates were refreshed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Source of built-in bridge data.
#[cfg_attr(test, mockall::automock)]
pub trait BridgeSource {
    /// Request the built-in bridges.
    ///
    /// A non-200 status is not an error at this level.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Http`] when no response is received.
    fn fetch(&self) -> Result<MoatReply, BridgeError>;
}

/// The moat HTTP client.
#[derive(Debug, Clone)]
pub struct MoatClient {
    endpoint: String,
}

impl MoatClient {
    /// Create a client for a custom endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for MoatClient {
    fn default() -> Self {
        Self::new(MOAT_BUILTIN_ENDPOINT)
    }
}

impl BridgeSource for MoatClient {
    fn fetch(&self) -> Result<MoatReply, BridgeError> {
        debug!("POST {}", self.endpoint);
        let http_error = |reason: String| BridgeError::Http {
            endpoint: self.endpoint.clone(),
            reason,
        };
        let response = moat_agent()
            .post(&self.endpoint)
            .header("Content-Type", MOAT_CONTENT_TYPE)
            .send_empty()
            .map_err(|e| http_error(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| http_error(e.to_string()))?;
        Ok(MoatReply { status, body })
    }
}

/// Agent that hands non-2xx responses back instead of failing.
fn moat_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(MOAT_TIMEOUT))
            .http_status_as_error(false)
            .build();
        ureq::Agent::new_with_config(config)
    })
}

#[derive(Debug, Default, Deserialize)]
struct BuiltinBridges {
    #[serde(rename = "meek-azure", default)]
    meek_azure: Option<Vec<String>>,
    #[serde(default)]
    obfs4: Option<Vec<String>>,
    #[serde(default)]
    snowflake: Option<Vec<String>>,
}

impl BuiltinBridges {
    fn lines(&self, kind: BridgeKind) -> &[String] {
        let lines = match kind {
            BridgeKind::MeekAzure => &self.meek_azure,
            BridgeKind::Obfs4 => &self.obfs4,
            BridgeKind::Snowflake => &self.snowflake,
        };
        lines.as_deref().unwrap_or_default()
    }
}

/// Render a template for `kind` from unordered bridge lines.
///
/// Lines are ordered by their second whitespace-separated token, the
/// `address:port`, then by the whole line, so any permutation of the same
/// input renders identically.
///
/// # Examples
///
/// ```
/// use get_tor::bridges::{BridgeKind, render_template};
///
/// let lines = [
///     "obfs4 192.0.2.2:443 FINGERPRINT cert=b iat-mode=0".to_owned(),
///     "obfs4 192.0.2.1:443 FINGERPRINT cert=a iat-mode=0".to_owned(),
/// ];
/// let rendered = render_template(BridgeKind::Obfs4, &lines);
/// assert!(rendered.starts_with("# Enable built-in obfs4 bridge\nBridge obfs4 192.0.2.1:443"));
/// ```
#[must_use]
pub fn render_template(kind: BridgeKind, lines: &[String]) -> String {
    let mut sorted: Vec<&str> = lines.iter().map(String::as_str).collect();
    sorted.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    let mut rendered = format!("# Enable built-in {kind} bridge\n");
    for line in sorted {
        rendered.push_str("Bridge ");
        rendered.push_str(line);
        rendered.push('\n');
    }
    rendered
}

fn sort_key(line: &str) -> (&str, &str) {
    (line.split_whitespace().nth(1).unwrap_or_default(), line)
}

/// Fetch the built-in bridges and rewrite the templates in `template_dir`.
///
/// Kinds missing from the response, or with an empty list, keep their
/// existing template. When the API answers with a non-200 status or an
/// `errors` member, nothing is written and [`BridgeOutcome::Rejected`] is
/// returned.
///
/// # Errors
///
/// Returns [`BridgeError::Http`] when the request fails,
/// [`BridgeError::Parse`] when the body is not the expected JSON, and
/// [`BridgeError::Write`] when a template cannot be written.
pub fn update_bridges(
    source: &dyn BridgeSource,
    template_dir: &Utf8Path,
) -> Result<BridgeOutcome, BridgeError> {
    let reply = source.fetch()?;
    if reply.status != 200 {
        let reason = format!("status_code={}", reply.status);
        warn!("bridge refresh rejected: {reason}");
        return Ok(BridgeOutcome::Rejected { reason });
    }

    let value: serde_json::Value = serde_json::from_str(&reply.body)?;
    if let Some(errors) = value.get("errors") {
        let reason = format!("errors={errors}");
        warn!("bridge refresh rejected: {reason}");
        return Ok(BridgeOutcome::Rejected { reason });
    }
    let bridges: BuiltinBridges = serde_json::from_value(value)?;

    let rendered: Vec<(BridgeKind, String)> = BridgeKind::ALL
        .into_iter()
        .filter(|kind| !bridges.lines(*kind).is_empty())
        .map(|kind| (kind, render_template(kind, bridges.lines(kind))))
        .collect();

    let mut written = Vec::with_capacity(rendered.len());
    for (kind, contents) in rendered {
        let path = template_dir.join(kind.template_filename());
        debug!("writing {path}");
        fs::write(&path, contents).map_err(|source| BridgeError::Write { path, source })?;
        written.push(kind);
    }
    Ok(BridgeOutcome::Updated { written })
}

#[cfg(test)]
#[path = "bridges_tests.rs"]
mod tests;
