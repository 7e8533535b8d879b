use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::member::Member;
use crate::settings::Settings;

pub const LEADERBOARD_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub position: u32,
    pub user_id: String,
    pub username: String,
    pub value: i64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboards {
    pub power: Vec<LeaderboardEntry>,
    pub vs_score: Vec<LeaderboardEntry>,
    pub desert_points: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupStats {
    pub registered: usize,
    pub total_members: usize,
    pub percent: u32,
}

impl SignupStats {
    pub fn from_members(members: &[Member]) -> Self {
        let registered = members.iter().filter(|m| m.has_signed_up()).count();
        Self {
            registered,
            total_members: members.len(),
            percent: completion_percent(registered, members.len()),
        }
    }
}

/// `round(100 * registered / max(1, total))`, halves round up.
pub fn completion_percent(registered: usize, total: usize) -> u32 {
    let total = total.max(1) as u64;
    let registered = registered as u64;
    let percent = (200 * registered + total) / (2 * total);
    u32::try_from(percent).unwrap_or(u32::MAX)
}

impl Leaderboards {
    /// Power keeps the incoming order (already sorted by the store); the
    /// score boards are re-sorted with missing values counted as zero.
    pub fn build(members_by_power: &[Member]) -> Self {
        let power = members_by_power
            .iter()
            .take(LEADERBOARD_SIZE)
            .enumerate()
            .map(|(idx, m)| entry(idx, m, m.total_hero_power.raw(), m.total_hero_power.display()))
            .collect();

        Self {
            power,
            vs_score: score_board(members_by_power, |m| m.vs_score.unwrap_or(0)),
            desert_points: score_board(members_by_power, |m| m.desert_points.unwrap_or(0)),
        }
    }
}

fn score_board(members: &[Member], score: impl Fn(&Member) -> i64) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&Member> = members.iter().collect();
    ranked.sort_by_key(|m| Reverse(score(m)));
    ranked
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(idx, m)| {
            let value = score(m);
            entry(idx, m, value, value.to_string())
        })
        .collect()
}

fn entry(idx: usize, member: &Member, value: i64, display: String) -> LeaderboardEntry {
    LeaderboardEntry {
        position: u32::try_from(idx + 1).unwrap_or(u32::MAX),
        user_id: member.user_id.clone(),
        username: member.username.clone(),
        value,
        display,
    }
}

/// Payload of the hub page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubView {
    pub leaderboards: Leaderboards,
    pub signups: SignupStats,
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<Member>,
    pub can_manage_registration: bool,
}

impl HubView {
    pub fn build(members_by_power: Vec<Member>, settings: Settings, caller: Option<&str>) -> Self {
        let me = caller.and_then(|user_id| {
            members_by_power
                .iter()
                .find(|m| m.user_id == user_id)
                .cloned()
        });
        let can_manage_registration = me.as_ref().is_some_and(|m| m.role.is_event_admin());
        Self {
            leaderboards: Leaderboards::build(&members_by_power),
            signups: SignupStats::from_members(&members_by_power),
            settings,
            me,
            can_manage_registration,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::power::Power;
    use crate::role::Role;

    fn seeded() -> Vec<Member> {
        // Already ordered by total power, as the store returns them.
        [
            ("z", "Zovian", 125_500_000, 950_000, 4500),
            ("j", "Jade", 118_000_000, 820_000, 3800),
            ("s", "Shadow", 110_000_000, 680_000, 2900),
            ("m", "May", 95_000_000, 750_000, 4100),
            ("r", "Raptor", 88_000_000, 550_000, 3200),
            ("n", "Newbie", 10_000_000, 0, 0),
        ]
        .into_iter()
        .map(|(id, name, power, vs, dp)| {
            let mut m = Member::new(id, name);
            m.total_hero_power = Power::from_raw(power);
            m.vs_score = Some(vs);
            m.desert_points = Some(dp);
            m
        })
        .collect()
    }

    #[test]
    fn completion_percent_rounds_and_guards_empty_roster() {
        assert_eq!(completion_percent(2, 5), 40);
        assert_eq!(completion_percent(1, 3), 33);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(1, 8), 13);
        assert_eq!(completion_percent(0, 0), 0);
    }

    #[test]
    fn leaderboards_take_top_five_of_each_stat() {
        let boards = Leaderboards::build(&seeded());

        let power: Vec<&str> = boards.power.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(power, vec!["Zovian", "Jade", "Shadow", "May", "Raptor"]);
        assert_eq!(boards.power[0].display, "125.5M");

        let desert: Vec<&str> = boards
            .desert_points
            .iter()
            .map(|e| e.username.as_str())
            .collect();
        assert_eq!(desert, vec!["Zovian", "May", "Jade", "Raptor", "Shadow"]);
        assert_eq!(boards.vs_score[1].username, "Jade");
        assert_eq!(boards.vs_score[2].username, "May");
        assert_eq!(boards.vs_score[4].position, 5);
    }

    #[test]
    fn missing_scores_count_as_zero() {
        let mut members = seeded();
        members[0].vs_score = None;
        let boards = Leaderboards::build(&members);
        let last = &boards.vs_score[4];
        assert_eq!(last.username, "Zovian");
        assert_eq!(last.value, 0);
        assert_eq!(boards.vs_score[0].username, "Jade");
    }

    #[test]
    fn hub_view_counts_signups_and_exposes_admin_toggle() {
        let mut members = seeded();
        members.truncate(5);
        for member in members.iter_mut().take(2) {
            member.ds_choice = Some("Maybe, sign me as sub 🤔".into());
            member.ds_signup_time = Some(Utc::now());
        }
        // Choice without timestamp is not a completed signup.
        members[2].ds_choice = Some("Sorry, can't make it 😢".into());
        members[1].role = Role::R4;

        let view = HubView::build(members, Settings::default(), Some("j"));
        assert_eq!(view.signups.registered, 2);
        assert_eq!(view.signups.percent, 40);
        assert!(view.can_manage_registration);
        assert_eq!(view.me.as_ref().map(|m| m.username.as_str()), Some("Jade"));

        let anonymous = HubView::build(seeded(), Settings::default(), None);
        assert!(anonymous.me.is_none());
        assert!(!anonymous.can_manage_registration);
    }
}
