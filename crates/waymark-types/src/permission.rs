//! Workflow-scoped permission identities.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::PermissionError;

/// A capability token scoped to one workflow.
///
/// Two permissions are equal when their string forms
/// (`"<workflow>:<permission>"`) are equal. The workflow name never contains
/// a colon, so the string form splits back into the same two parts and the
/// derived equality agrees with [`equals`](Permission::equals).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission {
    workflow_name: String,
    permission_id: String,
}

impl Permission {
    /// Create a permission for the named workflow.
    pub fn for_workflow_name(
        workflow_name: impl Into<String>,
        permission_id: impl Into<String>,
    ) -> Result<Self, PermissionError> {
        let workflow_name = workflow_name.into();
        let permission_id = permission_id.into();

        if workflow_name.trim().is_empty() {
            return Err(PermissionError::BlankWorkflowName);
        }
        if workflow_name.contains(':') {
            return Err(PermissionError::ColonInWorkflowName(workflow_name));
        }
        if permission_id.trim().is_empty() {
            return Err(PermissionError::BlankPermissionId);
        }

        Ok(Self {
            workflow_name,
            permission_id,
        })
    }

    /// Reconstruct a permission from its string form, splitting on the first colon.
    pub fn from_string(permission: &str) -> Result<Self, PermissionError> {
        let invalid = || PermissionError::InvalidFormat(permission.to_string());

        let (workflow_name, permission_id) = permission.split_once(':').ok_or_else(invalid)?;
        Self::for_workflow_name(workflow_name, permission_id).map_err(|_| invalid())
    }

    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    pub fn permission_id(&self) -> &str {
        &self.permission_id
    }

    /// Structural equality on the string form.
    pub fn equals(&self, other: &Permission) -> bool {
        self.to_string() == other.to_string()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workflow_name, self.permission_id)
    }
}

impl FromStr for Permission {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl TryFrom<String> for Permission {
    type Error = PermissionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_equals_for_workflow_name() {
        let parsed = Permission::from_string("demo:publish").unwrap();
        let built = Permission::for_workflow_name("demo", "publish").unwrap();

        assert!(parsed.equals(&built));
        assert_eq!(parsed, built);
        assert_eq!(parsed.to_string(), "demo:publish");
        assert_eq!(parsed.workflow_name(), "demo");
        assert_eq!(parsed.permission_id(), "publish");
    }

    #[test]
    fn test_splits_on_first_colon() {
        let permission = Permission::from_string("demo:role:editor").unwrap();
        assert_eq!(permission.workflow_name(), "demo");
        assert_eq!(permission.permission_id(), "role:editor");
        assert_eq!(permission.to_string(), "demo:role:editor");
    }

    #[test]
    fn test_rejects_blank_parts() {
        assert_eq!(
            Permission::for_workflow_name(" ", "publish"),
            Err(PermissionError::BlankWorkflowName)
        );
        assert_eq!(
            Permission::for_workflow_name("demo", ""),
            Err(PermissionError::BlankPermissionId)
        );
        assert!(matches!(
            Permission::from_string("demo:"),
            Err(PermissionError::InvalidFormat(_))
        ));
        assert!(matches!(
            Permission::from_string("demo"),
            Err(PermissionError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_colon_in_workflow_name() {
        assert_eq!(
            Permission::for_workflow_name("demo:x", "publish"),
            Err(PermissionError::ColonInWorkflowName("demo:x".to_string()))
        );
    }

    #[test]
    fn test_string_form_round_trips_with_equal_hash() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        fn hash(permission: &Permission) -> u64 {
            let mut hasher = DefaultHasher::new();
            permission.hash(&mut hasher);
            hasher.finish()
        }

        let built = Permission::for_workflow_name("demo", "role:editor").unwrap();
        let parsed = Permission::from_string(&built.to_string()).unwrap();

        assert!(parsed.equals(&built));
        assert_eq!(parsed, built);
        assert_eq!(hash(&parsed), hash(&built));
    }

    #[test]
    fn test_different_permissions_are_not_equal() {
        let a = Permission::for_workflow_name("demo", "publish").unwrap();
        let b = Permission::for_workflow_name("other", "publish").unwrap();
        assert!(!a.equals(&b));
    }

    #[test]
    fn test_serializes_as_string() {
        let permission = Permission::for_workflow_name("demo", "publish").unwrap();
        let json = serde_json::to_string(&permission).unwrap();
        assert_eq!(json, "\"demo:publish\"");

        let parsed: Permission = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, permission);
        assert!(serde_json::from_str::<Permission>("\"broken\"").is_err());
    }
}
