use std::fmt::{Display, Formatter};
use std::str::FromStr;

use selecta_core::AppError;
use serde::{Deserialize, Serialize};

use crate::Role;

/// Resources guarded by authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Member accounts.
    Users,
    /// Calendar events.
    Events,
    /// Social media posts.
    Posts,
    /// Activity statistics.
    Statistics,
    /// Treasury budget requests.
    BudgetRequests,
    /// Selection process registrations.
    Candidates,
    /// Study group sessions.
    StudyGroups,
}

impl Resource {
    /// Returns a stable storage value for this resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Events => "events",
            Self::Posts => "posts",
            Self::Statistics => "statistics",
            Self::BudgetRequests => "budget_requests",
            Self::Candidates => "candidates",
            Self::StudyGroups => "study_groups",
        }
    }

    /// Returns all known resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Users,
            Resource::Events,
            Resource::Posts,
            Resource::Statistics,
            Resource::BudgetRequests,
            Resource::Candidates,
            Resource::StudyGroups,
        ];

        ALL
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource value '{value}'")))
    }
}

/// Actions performed on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read records.
    Read,
    /// Create records.
    Create,
    /// Update records.
    Update,
    /// Delete records.
    Delete,
    /// Conduct and score candidate interviews.
    Interview,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Interview => "interview",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Interview,
        ];

        ALL
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown action value '{value}'")))
    }
}

/// A typed `(resource, action)` capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceAction {
    /// Guarded resource.
    pub resource: Resource,
    /// Requested action.
    pub action: Action,
}

impl ResourceAction {
    /// Creates a capability pair.
    #[must_use]
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Returns whether this is the grant-gated interview capability.
    #[must_use]
    pub fn is_interview(&self) -> bool {
        self.resource == Resource::Candidates && self.action == Action::Interview
    }
}

impl Display for ResourceAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

impl FromStr for ResourceAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (resource, action) = value.split_once(':').ok_or_else(|| {
            AppError::Validation(format!(
                "capability '{value}' must have the form 'resource:action'"
            ))
        })?;

        Ok(Self::new(Resource::from_str(resource)?, Action::from_str(action)?))
    }
}

/// Returns the resources a role may act on, independent of grants.
#[must_use]
pub fn role_resources(role: Role) -> &'static [Resource] {
    const EXECUTIVE: &[Resource] = &[
        Resource::Users,
        Resource::Events,
        Resource::Posts,
        Resource::Statistics,
        Resource::BudgetRequests,
        Resource::Candidates,
        Resource::StudyGroups,
    ];

    match role {
        Role::Superadmin => Resource::all(),
        Role::President | Role::VicePresident => EXECUTIVE,
        Role::DirectorOfEvents => &[Resource::Events],
        Role::DirectorOfCommunications => &[Resource::Posts],
        Role::ScientificDirector => &[Resource::StudyGroups],
        Role::Treasurer => &[Resource::BudgetRequests],
        Role::Member | Role::InterviewerMember => &[],
    }
}

/// Static role authority: whether a role may perform an action on a resource.
///
/// `candidates:interview` is permissive for every role here. Whether the
/// actor may interview right now depends on an active grant, which the
/// access controller checks on top of this table.
#[must_use]
pub fn has_static_permission(role: Role, resource: Resource, action: Action) -> bool {
    if role == Role::Superadmin {
        return true;
    }

    if ResourceAction::new(resource, action).is_interview() {
        return true;
    }

    role_resources(role).contains(&resource)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Action, Resource, ResourceAction, has_static_permission};
    use crate::Role;

    #[test]
    fn superadmin_is_allowed_everything() {
        for resource in Resource::all() {
            for action in Action::all() {
                assert!(has_static_permission(Role::Superadmin, *resource, *action));
            }
        }
    }

    #[test]
    fn directors_are_scoped_to_their_resource() {
        assert!(has_static_permission(
            Role::DirectorOfEvents,
            Resource::Events,
            Action::Update
        ));
        assert!(!has_static_permission(
            Role::DirectorOfEvents,
            Resource::Posts,
            Action::Read
        ));
        assert!(!has_static_permission(
            Role::Treasurer,
            Resource::Candidates,
            Action::Update
        ));
    }

    #[test]
    fn member_has_nothing_but_the_interview_placeholder() {
        for resource in Resource::all() {
            for action in Action::all() {
                let pair = ResourceAction::new(*resource, *action);
                assert_eq!(
                    has_static_permission(Role::Member, *resource, *action),
                    pair.is_interview()
                );
            }
        }
    }

    #[test]
    fn capability_parses_from_transport_form() {
        let parsed = ResourceAction::from_str("candidates:interview");
        assert!(matches!(
            parsed,
            Ok(ResourceAction {
                resource: Resource::Candidates,
                action: Action::Interview
            })
        ));
        assert!(ResourceAction::from_str("candidates").is_err());
        assert!(ResourceAction::from_str("candidate:interview").is_err());
    }

    #[test]
    fn capability_displays_as_resource_colon_action() {
        let pair = ResourceAction::new(Resource::BudgetRequests, Action::Delete);
        assert_eq!(pair.to_string(), "budget_requests:delete");
    }
}
