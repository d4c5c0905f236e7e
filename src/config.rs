// src/config.rs

/// Knobs for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Descriptor name; the graph's own name when unset.
    pub parser_name: Option<String>,
    /// Warn about states the start state cannot reach.
    pub check_reachability: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parser_name: None,
            check_reachability: true,
        }
    }
}

pub fn env_flag_true(var: &str, default: bool) -> bool {
    std::env::var(var)
        .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
        .unwrap_or(default)
}

impl ConvertOptions {
    /// `BMV2_PARSER_NAME`, `BMV2_CHECK_REACHABLE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            parser_name: std::env::var("BMV2_PARSER_NAME")
                .ok()
                .filter(|s| !s.is_empty()),
            check_reachability: env_flag_true("BMV2_CHECK_REACHABLE", defaults.check_reachability),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            parser_name: Some(name.into()),
            ..Self::default()
        }
    }
}
