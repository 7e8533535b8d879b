use std::cmp::Reverse;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::desert_storm::{TeamPreference, attendance_priority};
use crate::member::{Member, TeamAssignment};

/// Seats shown per Desert Storm team.
pub const TEAM_CAPACITY: usize = 30;

/// Ordered set of selected user ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SelectionSet {
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_id: impl Into<String>) -> bool {
        let user_id = user_id.into();
        if !self.seen.insert(user_id.clone()) {
            return false;
        }
        self.ids.push(user_id);
        true
    }

    pub fn remove(&mut self, user_id: &str) -> bool {
        if !self.seen.remove(user_id) {
            return false;
        }
        self.ids.retain(|id| id != user_id);
        true
    }

    /// Checkbox behavior. Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, user_id: &str) -> bool {
        if self.remove(user_id) {
            false
        } else {
            self.insert(user_id)
        }
    }

    pub fn select_all<'a>(&mut self, members: impl IntoIterator<Item = &'a Member>) {
        for member in members {
            self.insert(member.user_id.as_str());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.seen.clear();
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.seen.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

impl FromIterator<String> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut selection = Self::new();
        for id in iter {
            if !id.trim().is_empty() {
                selection.insert(id);
            }
        }
        selection
    }
}

impl From<Vec<String>> for SelectionSet {
    fn from(value: Vec<String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<SelectionSet> for Vec<String> {
    fn from(value: SelectionSet) -> Self {
        value.ids
    }
}

/// Bulk team assignment body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub user_ids: SelectionSet,
    pub team: TeamAssignment,
}

/// Display-only ordering: stated intent first, then deployable power.
pub fn priority_sort(members: &mut [Member]) {
    members.sort_by_key(|m| {
        (
            Reverse(attendance_priority(m.ds_choice.as_deref())),
            Reverse(m.deployable_power()),
        )
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCounts {
    pub team_a: usize,
    pub team_b: usize,
    pub capacity: usize,
}

impl TeamCounts {
    pub fn from_members(members: &[Member]) -> Self {
        let count = |team: TeamAssignment| {
            members
                .iter()
                .filter(|m| m.team_assignment == Some(team))
                .count()
        };
        Self {
            team_a: count(TeamAssignment::A),
            team_b: count(TeamAssignment::B),
            capacity: TEAM_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminBoardEntry {
    pub user_id: String,
    pub username: String,
    pub deployable_power: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_assignment: Option<TeamAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds_team_preference: Option<TeamPreference>,
    pub priority: u8,
}

/// Payload of the team assignment board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminBoard {
    pub members: Vec<AdminBoardEntry>,
    pub teams: TeamCounts,
    pub priority_sorted: bool,
}

impl AdminBoard {
    pub fn build(mut members: Vec<Member>, priority_sorted: bool) -> Self {
        if priority_sorted {
            priority_sort(&mut members);
        }
        let teams = TeamCounts::from_members(&members);
        let members = members
            .into_iter()
            .map(|m| AdminBoardEntry {
                deployable_power: format!("{:.2}M", m.deployable_power().millions()),
                priority: attendance_priority(m.ds_choice.as_deref()),
                user_id: m.user_id,
                username: m.username,
                team_assignment: m.team_assignment,
                ds_choice: m.ds_choice,
                ds_team_preference: m.ds_team_preference,
            })
            .collect();
        Self {
            members,
            teams,
            priority_sorted,
        }
    }
}
