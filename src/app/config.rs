//! Client configuration: parse/write `bookhub.conf`.
//!
//! The file uses `<key> = <value>` lines. Comments (`#`) and unknown keys are
//! ignored; an unreadable value keeps its default. Command-line flags are
//! applied on top by the binary.

use super::ActiveTab;
use crate::api::DEFAULT_BASE_URL;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the REST API, e.g. `http://localhost:8001/api`.
    pub base_url: String,
    /// Tab shown at startup.
    pub start_tab: ActiveTab,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_tab: ActiveTab::Users,
        }
    }
}

impl ClientConfig {
    /// Load `path`, fall back to the config dir, or write defaults to `path`.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::app::config_file_read_path("bookhub.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let cfg = Self::default();
        if let Err(e) = cfg.write_file(path) {
            tracing::warn!(path, error = %e, "could not write default config");
        }
        cfg
    }

    /// Returns `None` if the file cannot be read.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut cfg = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (lhs.trim(), rhs.trim());
            if value.is_empty() {
                continue;
            }
            match key {
                "base_url" => cfg.base_url = value.to_string(),
                "start_tab" => match value.parse() {
                    Ok(tab) => cfg.start_tab = tab,
                    Err(e) => tracing::warn!(error = %e, "ignoring start_tab"),
                },
                _ => tracing::debug!(key, "ignoring unknown config key"),
            }
        }
        cfg
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# bookhub client configuration\n");
        buf.push_str("# Root of the BookHub REST API (books/ and users/ live below it)\n");
        let _ = writeln!(&mut buf, "base_url = {}", self.base_url);
        buf.push_str("# Tab shown at startup: users|catalog\n");
        let _ = writeln!(&mut buf, "start_tab = {}", self.start_tab.as_str());
        std::fs::write(path, buf)
    }
}
