//! Reconciliation configuration.

use crate::defaults;

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Keys accepted by the collector and manual edits even when the schema lacks them.
    pub sentinel_keys: Vec<String>,
    /// Keep a reviewer's mark on an extraction-derived field while its value is unchanged.
    pub preserve_human_review: bool,
    /// Emit audit events for manual edits.
    pub audit_enabled: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            sentinel_keys: defaults::SENTINEL_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            preserve_human_review: defaults::PRESERVE_HUMAN_REVIEW,
            audit_enabled: defaults::AUDIT_ENABLED,
        }
    }
}

fn parse_bool_env(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}

impl ReconcileConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `LOANFILE_SENTINEL_KEYS` | `legal_name` | Keys accepted outside the schema |
    /// | `LOANFILE_PRESERVE_HUMAN_REVIEW` | `true` | Keep reviewer marks on unchanged values |
    /// | `LOANFILE_AUDIT_ENABLED` | `true` | Emit audit events for manual edits |
    pub fn from_env() -> Self {
        let sentinel_keys = std::env::var(defaults::ENV_SENTINEL_KEYS)
            .ok()
            .map(|v| parse_key_list(&v))
            .unwrap_or_else(|| Self::default().sentinel_keys);

        Self {
            sentinel_keys,
            preserve_human_review: parse_bool_env(
                defaults::ENV_PRESERVE_HUMAN_REVIEW,
                defaults::PRESERVE_HUMAN_REVIEW,
            ),
            audit_enabled: parse_bool_env(defaults::ENV_AUDIT_ENABLED, defaults::AUDIT_ENABLED),
        }
    }

    /// Add a key accepted outside the schema.
    pub fn with_sentinel_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.sentinel_keys.contains(&key) {
            self.sentinel_keys.push(key);
        }
        self
    }

    /// Enable or disable human review preservation.
    pub fn with_preserve_human_review(mut self, preserve: bool) -> Self {
        self.preserve_human_review = preserve;
        self
    }

    /// Enable or disable audit events.
    pub fn with_audit_enabled(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }
}

fn parse_key_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReconcileConfig::default();
        assert_eq!(config.sentinel_keys, vec!["legal_name".to_string()]);
        assert!(config.preserve_human_review);
        assert!(config.audit_enabled);
    }

    #[test]
    fn test_builder_methods() {
        let config = ReconcileConfig::default()
            .with_sentinel_key("cnic_number")
            .with_sentinel_key("legal_name")
            .with_preserve_human_review(false)
            .with_audit_enabled(false);
        assert_eq!(config.sentinel_keys.len(), 2);
        assert!(config.sentinel_keys.contains(&"cnic_number".to_string()));
        assert!(!config.preserve_human_review);
        assert!(!config.audit_enabled);
    }

    #[test]
    fn test_parse_key_list_skips_blanks() {
        assert_eq!(
            parse_key_list(" legal_name, ,cnic_number ,"),
            vec!["legal_name".to_string(), "cnic_number".to_string()]
        );
        assert!(parse_key_list("").is_empty());
    }
}
