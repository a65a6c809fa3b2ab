use limn_core::DEFAULT_OUTBOUND_LIMIT;
use serde::Deserialize;

/// Per-session configuration for the web platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Force quirks mode on or off instead of detecting it from the
    /// client's user agent.
    pub quirks_override: Option<bool>,
    /// Bound on the outbound command queue; the oldest command is dropped
    /// when the bound is hit.
    pub outbound_limit: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            quirks_override: None,
            outbound_limit: DEFAULT_OUTBOUND_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WebConfig::default();
        assert_eq!(config.quirks_override, None);
        assert_eq!(config.outbound_limit, DEFAULT_OUTBOUND_LIMIT);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: WebConfig = serde_json::from_str(r#"{"quirks_override":true}"#).unwrap();
        assert_eq!(config.quirks_override, Some(true));
        assert_eq!(config.outbound_limit, DEFAULT_OUTBOUND_LIMIT);
    }
}
