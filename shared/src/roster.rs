use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::member::Member;
use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub user_id: String,
    pub username: String,
    pub power: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSection {
    pub role: Role,
    pub rank: i8,
    pub members: Vec<RosterEntry>,
}

/// Rank first, then total power, both descending.
pub fn cmp_roster_order(a: &Member, b: &Member) -> Ordering {
    a.role
        .cmp_by_rank(&b.role)
        .then_with(|| b.total_hero_power.cmp(&a.total_hero_power))
}

/// Sort and split into one section per role. Known ranks come first in
/// ladder order, unknown roles trail. Empty sections are left out.
pub fn group_by_role(mut members: Vec<Member>) -> Vec<RosterSection> {
    members.sort_by(cmp_roster_order);

    let mut sections: Vec<RosterSection> = Vec::new();
    for member in members {
        let entry = RosterEntry {
            user_id: member.user_id,
            username: member.username,
            power: member.total_hero_power.display(),
        };
        match sections.last_mut() {
            Some(section) if section.role == member.role => section.members.push(entry),
            _ => sections.push(RosterSection {
                rank: member.role.rank(),
                role: member.role,
                members: vec![entry],
            }),
        }
    }
    sections
}
