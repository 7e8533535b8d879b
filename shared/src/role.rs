use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Alliance rank. Stored as free text, so anything outside the fixed ladder is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    R5,
    R4,
    R3,
    R2,
    R1,
    #[default]
    Member,
    Other(String),
}

impl Role {
    /// Known ranks from highest to lowest.
    pub const LADDER: [Role; 6] = [
        Role::R5,
        Role::R4,
        Role::R3,
        Role::R2,
        Role::R1,
        Role::Member,
    ];

    /// Parse a stored role column. `NULL` and blank values read as `Member`.
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Member,
            Some(value) => Self::from(value.to_owned()),
        }
    }

    /// Rank used for every role-ordered listing. Unknown roles rank below `Member`.
    pub fn rank(&self) -> i8 {
        match self {
            Self::R5 => 5,
            Self::R4 => 4,
            Self::R3 => 3,
            Self::R2 => 2,
            Self::R1 => 1,
            Self::Member => 0,
            Self::Other(_) => -1,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::R5 => "R5",
            Self::R4 => "R4",
            Self::R3 => "R3",
            Self::R2 => "R2",
            Self::R1 => "R1",
            Self::Member => "Member",
            Self::Other(raw) => raw,
        }
    }

    /// Only R4 may toggle registration and assign teams.
    pub fn is_event_admin(&self) -> bool {
        matches!(self, Self::R4)
    }

    /// Highest rank first; unknown roles fall back to alphabetical order among themselves.
    pub fn cmp_by_rank(&self, other: &Self) -> Ordering {
        other
            .rank()
            .cmp(&self.rank())
            .then_with(|| self.label().cmp(other.label()))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "R5" => Self::R5,
            "R4" => Self::R4,
            "R3" => Self::R3,
            "R2" => Self::R2,
            "R1" => Self::R1,
            "Member" => Self::Member,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        match value {
            Role::Other(raw) => raw,
            known => known.label().to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn ladder_ranks_descend_from_r5_to_member() {
        let ranks: Vec<i8> = Role::LADDER.iter().map(Role::rank).collect();
        assert_eq!(ranks, vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn unknown_roles_rank_below_member() {
        let unknown = Role::from("Recruit".to_string());
        assert_eq!(unknown, Role::Other("Recruit".to_string()));
        assert_eq!(unknown.rank(), -1);
        assert!(unknown.cmp_by_rank(&Role::Member).is_gt());
    }

    #[test]
    fn missing_or_blank_stored_role_reads_as_member() {
        assert_eq!(Role::from_stored(None), Role::Member);
        assert_eq!(Role::from_stored(Some("  ")), Role::Member);
        assert_eq!(Role::from_stored(Some("R4")), Role::R4);
    }

    #[test]
    fn only_r4_is_event_admin() {
        assert!(Role::R4.is_event_admin());
        assert!(!Role::R5.is_event_admin());
        assert!(!Role::Member.is_event_admin());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![Role::R4, Role::Other("Guest".into())])
            .expect("serialize roles");
        assert_eq!(json, r#"["R4","Guest"]"#);

        let parsed: Role = serde_json::from_str(r#""R2""#).expect("parse role");
        assert_eq!(parsed, Role::R2);
    }
}
