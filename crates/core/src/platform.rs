//! Deployment target platforms.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// All valid platform identifiers, in seed order.
pub const VALID_PLATFORMS: &[&str] = &["web", "mobile_ios", "mobile_android", "tvos"];

/// A deployment target. Each `(instance, platform)` pair is an independent
/// target with its own version sequence and live pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Web,
    MobileIos,
    MobileAndroid,
    Tvos,
}

impl Platform {
    /// Parse from the database `platform` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "web" => Ok(Self::Web),
            "mobile_ios" => Ok(Self::MobileIos),
            "mobile_android" => Ok(Self::MobileAndroid),
            "tvos" => Ok(Self::Tvos),
            other => Err(CoreError::Validation(format!(
                "Unknown platform '{other}'. Must be one of: {}",
                VALID_PLATFORMS.join(", ")
            ))),
        }
    }

    /// Database column value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::MobileIos => "mobile_ios",
            Self::MobileAndroid => "mobile_android",
            Self::Tvos => "tvos",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_round_trips() {
        for name in VALID_PLATFORMS {
            assert_eq!(Platform::from_name(name).unwrap().name(), *name);
        }
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert!(Platform::from_name("desktop").is_err());
        assert!(Platform::from_name("").is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Platform::MobileIos).unwrap();
        assert_eq!(json, "\"mobile_ios\"");
    }
}
