//! Plain-text rendering of the console state.

use std::fmt;

use crate::console::state::ClientStatusState;

const EMPTY: &str = "—";

/// A status indicator: good/bad plus a short label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pill {
    pub ok: bool,
    pub text: String,
}

impl Pill {
    fn new(ok: bool, text: impl Into<String>) -> Self {
        Self { ok, text: text.into() }
    }
}

impl fmt::Display for Pill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dot = if self.ok { '●' } else { '○' };
        write!(f, "{} {}", dot, self.text)
    }
}

/// Display-ready facts derived from one state snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub environment: String,
    pub frontend: Pill,
    pub deployment_badge: String,
    pub health_pill: Pill,
    pub api_host: String,
    pub error: Option<String>,
    pub health_rows: Vec<(&'static str, String)>,
    pub version_rows: Vec<(&'static str, String)>,
    /// Pretty-printed version payload, when requested.
    pub raw_version: Option<String>,
    pub auto_refresh: bool,
}

impl StatusView {
    pub fn new(state: &ClientStatusState, api_base: &str) -> Self {
        let frontend = if state.frontend_color.is_known() {
            Pill::new(true, state.frontend_color.as_str().to_uppercase())
        } else {
            Pill::new(false, "UNKNOWN")
        };

        let deployment_badge = state
            .effective_deployment()
            .map(|channel| channel.badge())
            .unwrap_or_else(|| EMPTY.to_string());

        let health_pill = match (&state.error, &state.health) {
            (Some(_), _) => Pill::new(false, "Failed"),
            (None, None) => Pill::new(true, "Loading…"),
            (None, Some(_)) if state.health_ok() => Pill::new(true, "Healthy"),
            (None, Some(health)) => {
                let text = if health.status.is_empty() { "Unknown" } else { health.status.as_str() };
                Pill::new(false, text)
            }
        };

        let health_rows = match &state.health {
            Some(h) => vec![
                ("Status", or_empty(&h.status)),
                ("Service", or_empty(&h.identity.service)),
                ("Version", or_empty(&h.identity.version)),
                ("Request ID", or_empty(&h.identity.request_id)),
            ],
            None => Vec::new(),
        };

        let version_rows = match &state.version {
            Some(v) => vec![
                ("Service", or_empty(&v.service)),
                ("Version", or_empty(&v.version)),
                ("Deployment", or_empty(&v.deployment)),
                ("Environment", or_empty(&v.environment)),
                ("Commit", or_empty(&v.commit)),
                ("Timestamp", or_empty(&v.timestamp)),
                ("Request ID", or_empty(&v.request_id)),
            ],
            None => Vec::new(),
        };

        Self {
            environment: state.effective_environment().to_string(),
            frontend,
            deployment_badge,
            health_pill,
            api_host: api_host_label(api_base),
            error: state.error.clone(),
            health_rows,
            version_rows,
            raw_version: None,
            auto_refresh: state.auto_refresh_enabled,
        }
    }

    /// Append the version payload as raw JSON.
    pub fn with_raw_json(mut self, state: &ClientStatusState) -> Self {
        self.raw_version = state
            .version
            .as_ref()
            .and_then(|v| serde_json::to_string_pretty(v).ok());
        self
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EdgeOps overview")?;
        writeln!(f, "  Environment     {}", self.environment)?;
        writeln!(f, "  Frontend        {}", self.frontend)?;
        writeln!(f, "  API Deployment  {}", self.deployment_badge)?;
        writeln!(f)?;

        writeln!(f, "API Health ({})  {}", self.api_host, self.health_pill)?;
        if let Some(error) = &self.error {
            writeln!(f, "  ! {}", error)?;
        }
        for (key, value) in &self.health_rows {
            writeln!(f, "  {:<12}  {}", key, value)?;
        }
        writeln!(f)?;

        writeln!(f, "API Version  {}", self.deployment_badge)?;
        if self.version_rows.is_empty() && self.error.is_none() {
            writeln!(f, "  Loading version…")?;
        }
        for (key, value) in &self.version_rows {
            writeln!(f, "  {:<12}  {}", key, value)?;
        }
        writeln!(f)?;

        if let Some(raw) = &self.raw_version {
            writeln!(f, "Raw JSON")?;
            for line in raw.lines() {
                writeln!(f, "  {}", line)?;
            }
            writeln!(f)?;
        }

        let auto = if self.auto_refresh { "on" } else { "off" };
        write!(
            f,
            "Auto-refresh: {}   [r] refresh  [a] toggle auto  [j] raw json  [q] quit",
            auto
        )
    }
}

fn or_empty(value: &str) -> String {
    if value.is_empty() {
        EMPTY.to_string()
    } else {
        value.to_string()
    }
}

/// API base without its scheme, `localhost` when empty.
pub fn api_host_label(api_base: &str) -> String {
    let host = api_base
        .strip_prefix("https://")
        .or_else(|| api_base.strip_prefix("http://"))
        .unwrap_or(api_base)
        .trim_end_matches('/');
    if host.is_empty() {
        "localhost".to_string()
    } else {
        host.to_string()
    }
}
