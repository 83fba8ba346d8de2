use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::version::{normalize, NormalizedVersion};
use crate::error::Result;

/// An upstream release as delivered by the release source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub url: String,
    pub published_at: DateTime<Utc>,
}

impl Release {
    /// Create a release without name or notes
    pub fn new(tag: impl Into<String>, url: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Release {
            tag: tag.into(),
            name: None,
            body: None,
            url: url.into(),
            published_at,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Normalized form of the tag, `None` if the tag is empty
    pub fn version(&self) -> Option<NormalizedVersion> {
        normalize(&self.tag)
    }

    pub fn is_prerelease(&self) -> bool {
        self.version().is_some_and(|v| v.is_prerelease())
    }

    /// Display title: the release name when it differs from the tag
    pub fn title(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.tag,
        }
    }

    /// Release notes with surrounding whitespace removed; `None` if blank
    pub fn description(&self) -> Option<&str> {
        self.body
            .as_deref()
            .map(str::trim)
            .filter(|body| !body.is_empty())
    }
}

/// Parse a JSON array of releases, as written by the release source
pub fn parse_release_list(json: &str) -> Result<Vec<Release>> {
    Ok(serde_json::from_str(json)?)
}
