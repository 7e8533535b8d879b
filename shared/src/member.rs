use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::desert_storm::{Attendance, TeamPreference};
use crate::power::Power;
use crate::role::Role;

/// Final Desert Storm team, set only by an event admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamAssignment {
    A,
    B,
    None,
}

impl TeamAssignment {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "None" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::None => "None",
        }
    }
}

/// One alliance participant, keyed by the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub total_hero_power: Power,
    #[serde(default)]
    pub squad_1_power: Power,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vs_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desert_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds_team_preference: Option<TeamPreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds_signup_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_assignment: Option<TeamAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub version: i64,
}

impl Member {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role: Role::Member,
            total_hero_power: Power::ZERO,
            squad_1_power: Power::ZERO,
            vs_score: None,
            desert_points: None,
            ds_choice: None,
            ds_team_preference: None,
            ds_signup_time: None,
            team_assignment: None,
            bio: None,
            gender: None,
            birthday: None,
            language: None,
            version: 0,
        }
    }

    /// Counted as signed up only when both the choice and its timestamp are present.
    pub fn has_signed_up(&self) -> bool {
        self.ds_choice.is_some() && self.ds_signup_time.is_some()
    }

    pub fn attendance(&self) -> Option<Attendance> {
        self.ds_choice.as_deref().and_then(Attendance::parse)
    }

    /// Squad power, or total power when no squad power was entered.
    pub fn deployable_power(&self) -> Power {
        if self.squad_1_power.is_zero() {
            self.total_hero_power
        } else {
            self.squad_1_power
        }
    }

    pub fn badge(&self) -> MemberBadge {
        MemberBadge {
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

/// "Logged in as NAME (ROLE)" status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBadge {
    pub username: String,
    pub role: Role,
}

/// Self-service profile edit. Power fields accept either raw units or millions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    #[serde(default)]
    pub total_hero_power: f64,
    #[serde(default)]
    pub squad_1_power: f64,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl ProfileUpdate {
    pub fn total_power(&self) -> Power {
        Power::from_input(self.total_hero_power)
    }

    pub fn squad_power(&self) -> Power {
        Power::from_input(self.squad_1_power)
    }
}
