//! The persisted board record: links plus category positions.
//!
//! Loading is lenient in the same places the browser host always was:
//! missing coordinates default to zero, a missing or zero width becomes
//! the default width, fractional pixels are rounded and link ids may be
//! numbers or numeric strings. A link entry that still cannot be read is
//! dropped with a warning instead of failing the whole record.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Invalid state JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for LinkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for LinkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) if n >= 0.0 && n.fract() == 0.0 => Ok(LinkId(n as u64)),
            Raw::Num(n) => Err(serde::de::Error::custom(format!("invalid link id {n}"))),
            Raw::Str(s) => s
                .trim()
                .parse()
                .map(LinkId)
                .map_err(|_| serde::de::Error::custom(format!("invalid link id {s:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: String,
}

/// A category as stored. Height is never stored; it follows from content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCategory {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub x: i64,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub y: i64,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub w: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default, deserialize_with = "lenient_links")]
    pub links: Vec<Link>,
    #[serde(default)]
    pub categories: Vec<StoredCategory>,
}

/// Accept integers, floats (rounded) and `null`; negatives clamp to zero.
fn lenient_coord<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite())
        .map(|v| v.round().max(0.0) as i64)
        .unwrap_or(0))
}

fn lenient_links<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Link>, D::Error> {
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Link>(value) {
            Ok(link) => Some(link),
            Err(e) => {
                tracing::warn!(error = %e, "dropping unreadable stored link");
                None
            }
        })
        .collect())
}

impl StoredState {
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        if json.trim().is_empty() || json.trim() == "null" {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON, two-space indent.
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
