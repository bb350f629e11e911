//! Audit configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the audit sink and its analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Regex patterns treated as injection attempts when matched against
    /// event details or message
    #[serde(default = "default_injection_patterns")]
    pub injection_patterns: Vec<String>,

    /// Requests from one IP within `ip_window_secs` before the inline
    /// scan flags the event
    #[serde(default = "default_ip_threshold")]
    pub ip_threshold: u32,

    /// Window for the per-IP activity counter, in seconds
    #[serde(default = "default_ip_window_secs")]
    pub ip_window_secs: u64,

    /// Authentication failures per `(user, ip)` within the scan window
    /// before a finding is raised
    #[serde(default = "default_auth_failure_threshold")]
    pub auth_failure_threshold: u32,

    /// API-access events per user within the scan window before a finding
    /// is raised
    #[serde(default = "default_api_volume_threshold")]
    pub api_volume_threshold: u32,

    /// Role assignment/revocation events per `(user, tenant)` within the
    /// scan window before a finding is raised
    #[serde(default = "default_role_churn_threshold")]
    pub role_churn_threshold: u32,
}

fn default_injection_patterns() -> Vec<String> {
    vec![
        // SQL injection
        r"(?i)('\s*(or|and)\s+['\d]|union\s+select|;\s*drop\s+table)".to_string(),
        // Script injection
        r"(?i)(<script\b|javascript:|on(error|load|click)\s*=)".to_string(),
        // Path traversal
        r"\.\./|\.\.\\".to_string(),
        // Shell metacharacters in command-ish payloads
        r"(?i)(;\s*(rm|curl|wget|nc)\s|\$\(|`)".to_string(),
    ]
}

fn default_ip_threshold() -> u32 {
    100
}

fn default_ip_window_secs() -> u64 {
    60
}

fn default_auth_failure_threshold() -> u32 {
    5
}

fn default_api_volume_threshold() -> u32 {
    1_000
}

fn default_role_churn_threshold() -> u32 {
    5
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            injection_patterns: default_injection_patterns(),
            ip_threshold: default_ip_threshold(),
            ip_window_secs: default_ip_window_secs(),
            auth_failure_threshold: default_auth_failure_threshold(),
            api_volume_threshold: default_api_volume_threshold(),
            role_churn_threshold: default_role_churn_threshold(),
        }
    }
}
