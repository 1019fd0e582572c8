use waymark_types::permission::Permission;

/// A named state in the workflow graph.
///
/// Holds the names of the transitions which may leave it. Steps are assembled
/// once and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    name: String,
    label: String,
    allowed_transitions: Vec<String>,
    is_final: bool,
    permission: Option<Permission>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            allowed_transitions: Vec::new(),
            is_final: false,
            permission: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Allow a transition to leave this step. Adding a name twice is a no-op.
    pub fn add_allowed_transition(&mut self, transition_name: impl Into<String>) -> &mut Self {
        let transition_name = transition_name.into();
        if !self.is_transition_allowed(&transition_name) {
            self.allowed_transitions.push(transition_name);
        }
        self
    }

    pub fn allowed_transitions(&self) -> &[String] {
        &self.allowed_transitions
    }

    pub fn is_transition_allowed(&self, transition_name: &str) -> bool {
        self.allowed_transitions.iter().any(|t| t == transition_name)
    }

    /// A final step ends the workflow; no transition may leave it.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn set_final(&mut self, is_final: bool) -> &mut Self {
        self.is_final = is_final;
        self
    }

    pub fn set_permission(&mut self, permission: Permission) -> &mut Self {
        self.permission = Some(permission);
        self
    }

    pub fn permission(&self) -> Option<&Permission> {
        self.permission.as_ref()
    }

    /// True iff a permission is set and equals `permission`.
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permission
            .as_ref()
            .is_some_and(|own| own.equals(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions_are_unique_and_ordered() {
        let mut step = Step::new("draft");
        step.add_allowed_transition("publish")
            .add_allowed_transition("delete")
            .add_allowed_transition("publish");

        assert_eq!(step.allowed_transitions(), &["publish", "delete"]);
        assert!(step.is_transition_allowed("delete"));
        assert!(!step.is_transition_allowed("archive"));
    }

    #[test]
    fn test_label_defaults_to_name() {
        let step = Step::new("draft");
        assert_eq!(step.label(), "draft");
        assert_eq!(Step::new("draft").with_label("Draft").label(), "Draft");
    }

    #[test]
    fn test_permission_comparison() {
        let mut step = Step::new("review");
        let permission = Permission::for_workflow_name("publishing", "review").unwrap();
        assert!(!step.has_permission(&permission));

        step.set_permission(permission.clone());
        assert!(step.has_permission(&permission));
        assert_eq!(step.permission(), Some(&permission));
    }
}
