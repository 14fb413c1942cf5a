use std::fmt::{Display, Formatter};
use std::str::FromStr;

use selecta_core::AppError;
use serde::{Deserialize, Serialize};

/// Fixed organisational roles.
///
/// Variants are declared in hierarchy order, so the derived `Ord` gives the
/// display ranking (`Superadmin` first). Authorization never compares ranks;
/// it goes through [`crate::has_static_permission`] and
/// [`Role::can_manage_process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted operator account.
    Superadmin,
    /// Head of the executive board.
    President,
    /// Deputy head of the executive board.
    VicePresident,
    /// Director responsible for events.
    DirectorOfEvents,
    /// Director responsible for posts and communications.
    DirectorOfCommunications,
    /// Director responsible for study groups.
    ScientificDirector,
    /// Director responsible for budget requests.
    Treasurer,
    /// Regular member without board duties.
    Member,
    /// Member designated for interview duty.
    InterviewerMember,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::President => "president",
            Self::VicePresident => "vice_president",
            Self::DirectorOfEvents => "director_of_events",
            Self::DirectorOfCommunications => "director_of_communications",
            Self::ScientificDirector => "scientific_director",
            Self::Treasurer => "treasurer",
            Self::Member => "member",
            Self::InterviewerMember => "interviewer_member",
        }
    }

    /// Returns the human-readable role title.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Superadmin => "Superadmin",
            Self::President => "President",
            Self::VicePresident => "Vice-President",
            Self::DirectorOfEvents => "Director of Events",
            Self::DirectorOfCommunications => "Director of Communications",
            Self::ScientificDirector => "Scientific Director",
            Self::Treasurer => "Treasurer",
            Self::Member => "Member",
            Self::InterviewerMember => "Interviewer Member",
        }
    }

    /// Returns all roles in hierarchy order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Superadmin,
            Role::President,
            Role::VicePresident,
            Role::DirectorOfEvents,
            Role::DirectorOfCommunications,
            Role::ScientificDirector,
            Role::Treasurer,
            Role::Member,
            Role::InterviewerMember,
        ];

        ALL
    }

    /// Returns whether the role may run the selection process: grant and
    /// revoke interviewer access, move registrations, set weights and toggle
    /// the gate.
    #[must_use]
    pub fn can_manage_process(&self) -> bool {
        matches!(self, Self::Superadmin | Self::President | Self::VicePresident)
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.display_name())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown role value '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Role;

    #[test]
    fn role_roundtrip_storage_value() {
        for role in Role::all() {
            let restored = Role::from_str(role.as_str());
            assert_eq!(restored.unwrap_or(Role::Member), *role);
        }
    }

    #[test]
    fn only_executive_roles_manage_the_process() {
        let managers: Vec<Role> = Role::all()
            .iter()
            .copied()
            .filter(Role::can_manage_process)
            .collect();
        assert_eq!(
            managers,
            vec![Role::Superadmin, Role::President, Role::VicePresident]
        );
    }

    #[test]
    fn hierarchy_order_puts_superadmin_first() {
        assert!(Role::Superadmin < Role::President);
        assert!(Role::Treasurer < Role::Member);
    }
}
