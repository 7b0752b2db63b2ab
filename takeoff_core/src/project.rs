//! # Project References & Identities
//!
//! A cost report belongs to exactly one project. Older records name the
//! project by a free-form legacy string, newer ones by a canonical id, so a
//! [`ProjectRef`] carries either or both:
//!
//! ```text
//! ProjectRef
//! ├── project_id:        Option<String>  (canonical, preferred)
//! └── project_id_legacy: Option<String>  (accepted when no canonical id)
//! ```
//!
//! Blank strings count as absent.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::project::{ProjectKey, ProjectRef};
//!
//! let reference = ProjectRef::legacy("villa-north");
//! assert_eq!(reference.key().unwrap(), ProjectKey::Legacy("villa-north".to_string()));
//!
//! assert!(ProjectRef::default().key().is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Reference to a project by canonical and/or legacy identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id_legacy: Option<String>,
}

/// The single identifier a report is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum ProjectKey {
    Canonical(String),
    Legacy(String),
}

impl ProjectKey {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectKey::Canonical(id) | ProjectKey::Legacy(id) => id,
        }
    }
}

impl ProjectRef {
    pub fn canonical(id: impl Into<String>) -> Self {
        ProjectRef {
            project_id: Some(id.into()),
            project_id_legacy: None,
        }
    }

    pub fn legacy(id: impl Into<String>) -> Self {
        ProjectRef {
            project_id: None,
            project_id_legacy: Some(id.into()),
        }
    }

    /// A reference that matches `id` in either identifier form.
    ///
    /// Used for lookups where the caller does not know which form a report
    /// was filed under.
    pub fn either(id: impl Into<String>) -> Self {
        let id = id.into();
        ProjectRef {
            project_id: Some(id.clone()),
            project_id_legacy: Some(id),
        }
    }

    /// Canonical id, trimmed, if present and non-blank
    pub fn canonical_id(&self) -> Option<&str> {
        non_blank(self.project_id.as_deref())
    }

    /// Legacy id, trimmed, if present and non-blank
    pub fn legacy_id(&self) -> Option<&str> {
        non_blank(self.project_id_legacy.as_deref())
    }

    /// Resolve the identifier the project is known by.
    ///
    /// The canonical id wins when both are given.
    pub fn key(&self) -> CalcResult<ProjectKey> {
        match (self.canonical_id(), self.legacy_id()) {
            (Some(id), _) => Ok(ProjectKey::Canonical(id.to_string())),
            (None, Some(id)) => Ok(ProjectKey::Legacy(id.to_string())),
            (None, None) => Err(CalcError::MissingProjectReference),
        }
    }

    /// All non-blank identifiers in this reference
    pub fn identifiers(&self) -> Vec<&str> {
        self.canonical_id().into_iter().chain(self.legacy_id()).collect()
    }

    /// Normalized copy: trimmed, blanks dropped, and the legacy id dropped
    /// when a canonical id is present.
    pub fn normalized(&self) -> CalcResult<ProjectRef> {
        Ok(match self.key()? {
            ProjectKey::Canonical(id) => ProjectRef::canonical(id),
            ProjectKey::Legacy(id) => ProjectRef::legacy(id),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A person attached to a report (the engineer who wrote it, or the owner
/// who may view it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Identity {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
