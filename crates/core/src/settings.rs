use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A site-wide key/value setting. Keys are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Which theme a logo is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoMode {
    Light,
    Dark,
}

impl LogoMode {
    /// Settings key the logo's storage id is kept under.
    pub fn setting_key(self) -> &'static str {
        match self {
            LogoMode::Light => "logo_light",
            LogoMode::Dark => "logo_dark",
        }
    }
}

impl std::str::FromStr for LogoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(LogoMode::Light),
            "dark" => Ok(LogoMode::Dark),
            other => Err(format!("unknown logo mode '{other}' (expected light or dark)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logo_keys() {
        assert_eq!(LogoMode::Light.setting_key(), "logo_light");
        assert_eq!("dark".parse::<LogoMode>().unwrap().setting_key(), "logo_dark");
        assert!("sepia".parse::<LogoMode>().is_err());
    }
}
