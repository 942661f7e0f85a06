use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::DomainError;

/// Requested cover rendition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverQuality {
    #[default]
    #[serde(rename = "256")]
    Thumb256,
    #[serde(rename = "512")]
    Thumb512,
    Original,
}

impl CoverQuality {
    /// Suffix appended to the cover file name, `None` for the original file
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            CoverQuality::Thumb256 => Some("256"),
            CoverQuality::Thumb512 => Some("512"),
            CoverQuality::Original => None,
        }
    }
}

impl std::fmt::Display for CoverQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix().unwrap_or("original"))
    }
}

impl FromStr for CoverQuality {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "256" => Ok(CoverQuality::Thumb256),
            "512" => Ok(CoverQuality::Thumb512),
            "original" => Ok(CoverQuality::Original),
            _ => Err(DomainError::UnknownValue(format!("cover quality '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_parse_and_display() {
        for quality in [CoverQuality::Thumb256, CoverQuality::Thumb512, CoverQuality::Original] {
            assert_eq!(quality.to_string().parse::<CoverQuality>().unwrap(), quality);
        }
        assert!("1024".parse::<CoverQuality>().is_err());
    }
}
