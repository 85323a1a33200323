// RegSift - core/annotation.rs
//
// User-entered interaction state attached to a record identity.
// Annotations live independently of any loaded dataset; the store that owns
// and persists them is in app::annotations. This module only defines the
// value types and the read-side lookup the filter engine needs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Follow-up status a user has assigned to a company.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    #[default]
    None,
    Interested,
    NotInterested,
    Callback,
}

impl InteractionStatus {
    /// Returns all variants in display order.
    pub fn all() -> &'static [InteractionStatus] {
        &[
            InteractionStatus::None,
            InteractionStatus::Interested,
            InteractionStatus::NotInterested,
            InteractionStatus::Callback,
        ]
    }

    /// Stable key, identical to the persisted form.
    pub fn key(&self) -> &'static str {
        match self {
            InteractionStatus::None => "none",
            InteractionStatus::Interested => "interested",
            InteractionStatus::NotInterested => "not_interested",
            InteractionStatus::Callback => "callback",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            InteractionStatus::None => "No status",
            InteractionStatus::Interested => "Interested",
            InteractionStatus::NotInterested => "Not interested",
            InteractionStatus::Callback => "Call back",
        }
    }
}

impl std::fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for InteractionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|status| status.key() == wanted)
            .ok_or_else(|| {
                format!("unknown status '{s}' (expected none, interested, not_interested, callback)")
            })
    }
}

/// Interaction state for one record identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(default)]
    pub status: InteractionStatus,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub is_favorite: bool,
}

/// Returned for every identity that has never been annotated.
pub static DEFAULT_ANNOTATION: Annotation = Annotation {
    status: InteractionStatus::None,
    comment: String::new(),
    is_favorite: false,
};

impl Annotation {
    /// True when every field still holds its default value.
    pub fn is_default(&self) -> bool {
        *self == DEFAULT_ANNOTATION
    }

    /// Apply the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: &AnnotationPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(ref comment) = patch.comment {
            self.comment.clone_from(comment);
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
    }
}

/// Partial update of an [`Annotation`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationPatch {
    pub status: Option<InteractionStatus>,
    pub comment: Option<String>,
    pub is_favorite: Option<bool>,
}

impl AnnotationPatch {
    pub fn status(status: InteractionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn comment(comment: impl Into<String>) -> Self {
        Self {
            comment: Some(comment.into()),
            ..Default::default()
        }
    }

    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Default::default()
        }
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.comment.is_none() && self.is_favorite.is_none()
    }
}

/// Read-side view of the annotation overlay, as consumed by the filter engine.
///
/// Implementations must be total: an identity that was never annotated
/// resolves to [`DEFAULT_ANNOTATION`].
pub trait AnnotationLookup {
    fn annotation(&self, org_number: &str) -> &Annotation;
}

impl AnnotationLookup for HashMap<String, Annotation> {
    fn annotation(&self, org_number: &str) -> &Annotation {
        self.get(org_number).unwrap_or(&DEFAULT_ANNOTATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_annotation() {
        let a = Annotation::default();
        assert_eq!(a.status, InteractionStatus::None);
        assert_eq!(a.comment, "");
        assert!(!a.is_favorite);
        assert!(a.is_default());
    }

    #[test]
    fn test_apply_touches_only_present_fields() {
        let mut a = Annotation::default();
        a.apply(&AnnotationPatch::favorite(true));
        a.apply(&AnnotationPatch::comment("ring efter lunch"));
        assert!(a.is_favorite, "comment patch must not reset favorite");
        assert_eq!(a.comment, "ring efter lunch");
        assert_eq!(a.status, InteractionStatus::None);
    }

    #[test]
    fn test_serialised_field_names() {
        let a = Annotation {
            status: InteractionStatus::NotInterested,
            comment: "x".to_string(),
            is_favorite: true,
        };
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains(r#""isFavorite":true"#), "{json}");
        assert!(json.contains(r#""status":"not_interested""#), "{json}");
    }

    #[test]
    fn test_partial_persisted_annotation_fills_defaults() {
        let a: Annotation = serde_json::from_str(r#"{"isFavorite":true}"#).unwrap();
        assert!(a.is_favorite);
        assert_eq!(a.status, InteractionStatus::None);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "not-interested".parse::<InteractionStatus>(),
            Ok(InteractionStatus::NotInterested)
        );
        assert_eq!("Callback".parse::<InteractionStatus>(), Ok(InteractionStatus::Callback));
        assert!("maybe".parse::<InteractionStatus>().is_err());
    }

    #[test]
    fn test_hashmap_lookup_is_total() {
        let mut map = HashMap::new();
        map.insert(
            "556".to_string(),
            Annotation {
                is_favorite: true,
                ..Default::default()
            },
        );
        assert!(map.annotation("556").is_favorite);
        assert!(map.annotation("unknown").is_default());
    }
}
