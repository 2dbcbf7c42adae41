use anyhow::{Result, anyhow};
use products_careers::{GapPolicy, LadderOrder};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Default for requests that do not say whether to list good-to-have skills.
    pub gap_policy: GapPolicy,
    pub ladder_order: LadderOrder,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gap_policy: GapPolicy::default(),
            ladder_order: LadderOrder::Name,
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let include_good_to_have = match lookup("GAP_INCLUDE_GOOD_TO_HAVE") {
            Some(raw) => parse_bool("GAP_INCLUDE_GOOD_TO_HAVE", &raw)?,
            None => defaults.gap_policy.include_good_to_have,
        };

        let ladder_order = match lookup("LADDER_ORDER") {
            Some(raw) => raw
                .parse::<LadderOrder>()
                .map_err(|err| anyhow!("invalid LADDER_ORDER: {}", err))?,
            None => defaults.ladder_order,
        };

        let cors_allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                })
                .collect::<Vec<_>>(),
            None => defaults.cors_allowed_origins,
        };

        Ok(Self {
            gap_policy: GapPolicy {
                include_good_to_have,
            },
            ladder_order,
            cors_allowed_origins,
        })
    }

    /// Request-level override of the configured good-to-have default.
    pub fn policy(&self, include_good_to_have: Option<bool>) -> GapPolicy {
        include_good_to_have
            .map(|include_good_to_have| GapPolicy {
                include_good_to_have,
            })
            .unwrap_or(self.gap_policy)
    }
}

pub(crate) fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(anyhow!("invalid {}: expected a boolean, got {:?}", key, other)),
    }
}
