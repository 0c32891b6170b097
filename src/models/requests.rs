//! Request DTOs for the cache HTTP surface
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::{Deserialize, Serialize};

/// What a revalidation target names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Path,
    Tag,
}

/// Request body for POST /api/revalidate
///
/// The secret is optional at the type level so a missing secret is reported as
/// unauthorized rather than as a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form note echoed into the per-target log
    #[serde(default)]
    pub reason: Option<String>,
}

impl RevalidateRequest {
    /// Every target in request order: `path`, `paths`, `tag`, then `tags`.
    pub fn targets(&self) -> Vec<(TargetKind, String)> {
        let paths = self
            .path
            .iter()
            .chain(self.paths.iter())
            .map(|p| (TargetKind::Path, p.clone()));
        let tags = self
            .tag
            .iter()
            .chain(self.tags.iter())
            .map(|t| (TargetKind::Tag, t.clone()));

        paths.chain(tags).collect()
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.targets().is_empty() {
            return Some("At least one path or tag must be provided".to_string());
        }
        None
    }
}

/// Request body for POST /api/cache-dashboard
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardActionRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// A validated dashboard action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    Clear,
    InvalidateTag(String),
}

impl DashboardActionRequest {
    /// Turns the raw body into an action, or an error message.
    pub fn action(&self) -> Result<DashboardAction, String> {
        match self.action.as_deref() {
            None | Some("") => Err("Missing required field: action".to_string()),
            Some("clear") => Ok(DashboardAction::Clear),
            Some("invalidateTag") => match self.tag.as_deref() {
                Some(tag) if !tag.is_empty() => Ok(DashboardAction::InvalidateTag(tag.to_string())),
                _ => Err("Missing required field: tag".to_string()),
            },
            Some(other) => Err(format!("Unsupported action: {}", other)),
        }
    }
}
