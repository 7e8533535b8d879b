use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::member::Member;
use crate::settings::Settings;

pub const ATTENDANCE_YES: &str = "Yes, I will be there for sure 🎉";
pub const ATTENDANCE_SUB: &str = "Maybe, sign me as sub 🤔";
pub const ATTENDANCE_NO: &str = "Sorry, can't make it 😢";
/// Affirmative label stored before "for sure" was added.
pub const ATTENDANCE_YES_LEGACY: &str = "Yes, I will be there 🎉";

pub const TEAM_PREFERENCE_A: &str = "Team A";
pub const TEAM_PREFERENCE_B: &str = "Team B";

/// Where the closed-window view sends the caller.
pub const HUB_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Attendance {
    Yes,
    Sub,
    No,
}

impl Attendance {
    pub const ALL: [Attendance; 3] = [Attendance::Yes, Attendance::Sub, Attendance::No];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            ATTENDANCE_YES | ATTENDANCE_YES_LEGACY => Some(Self::Yes),
            ATTENDANCE_SUB => Some(Self::Sub),
            ATTENDANCE_NO => Some(Self::No),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Yes => ATTENDANCE_YES,
            Self::Sub => ATTENDANCE_SUB,
            Self::No => ATTENDANCE_NO,
        }
    }

    /// Only the affirmative choice asks for a team preference.
    pub fn is_affirmative(self) -> bool {
        matches!(self, Self::Yes)
    }

    pub fn priority(self) -> u8 {
        match self {
            Self::Yes => 3,
            Self::Sub => 2,
            Self::No => 1,
        }
    }
}

impl TryFrom<String> for Attendance {
    type Error = SignupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(SignupError::UnknownAttendance(value))
    }
}

impl From<Attendance> for String {
    fn from(value: Attendance) -> Self {
        value.label().to_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TeamPreference {
    TeamA,
    TeamB,
}

impl TeamPreference {
    pub const ALL: [TeamPreference; 2] = [TeamPreference::TeamA, TeamPreference::TeamB];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            TEAM_PREFERENCE_A => Some(Self::TeamA),
            TEAM_PREFERENCE_B => Some(Self::TeamB),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TeamA => TEAM_PREFERENCE_A,
            Self::TeamB => TEAM_PREFERENCE_B,
        }
    }
}

impl TryFrom<String> for TeamPreference {
    type Error = SignupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(SignupError::UnknownTeamPreference(value))
    }
}

impl From<TeamPreference> for String {
    fn from(value: TeamPreference) -> Self {
        value.label().to_owned()
    }
}

/// Priority used by the display-only "Zovi" sort.
///
/// Stored choices that are not one of the fixed labels are classified by the
/// phrases they contain.
pub fn attendance_priority(choice: Option<&str>) -> u8 {
    let Some(choice) = choice else {
        return 1;
    };
    if let Some(attendance) = Attendance::parse(choice) {
        return attendance.priority();
    }
    if choice.contains("for sure") {
        3
    } else if choice.contains("sub") {
        2
    } else {
        1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupError {
    UnknownAttendance(String),
    UnknownTeamPreference(String),
    MissingAttendance,
    MissingTeamPreference,
}

impl fmt::Display for SignupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAttendance(raw) => write!(f, "unknown attendance choice {raw:?}"),
            Self::UnknownTeamPreference(raw) => write!(f, "unknown team preference {raw:?}"),
            Self::MissingAttendance => f.write_str("an attendance choice is required"),
            Self::MissingTeamPreference => {
                f.write_str("a team preference is required when attending")
            }
        }
    }
}

impl std::error::Error for SignupError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    #[default]
    Choosing,
    Preview,
}

/// Two-step attendance form with a preview before submit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignupForm {
    attendance: Option<Attendance>,
    team_preference: Option<TeamPreference>,
    step: FormStep,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill from the caller's stored row.
    pub fn from_member(member: &Member) -> Self {
        Self {
            attendance: member.attendance(),
            team_preference: member.ds_team_preference,
            step: FormStep::Choosing,
        }
    }

    pub fn attendance(&self) -> Option<Attendance> {
        self.attendance
    }

    pub fn team_preference(&self) -> Option<TeamPreference> {
        self.team_preference
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    /// Step 2 is only shown after the affirmative choice.
    pub fn shows_team_step(&self) -> bool {
        self.attendance.is_some_and(Attendance::is_affirmative)
    }

    pub fn choose_attendance(&mut self, attendance: Attendance) {
        if self.step == FormStep::Choosing {
            self.attendance = Some(attendance);
        }
    }

    pub fn choose_team_preference(&mut self, preference: TeamPreference) {
        if self.step == FormStep::Choosing {
            self.team_preference = Some(preference);
        }
    }

    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn preview(&mut self) -> Result<(), SignupError> {
        self.validate()?;
        self.step = FormStep::Preview;
        Ok(())
    }

    /// Back to choosing; selections are kept.
    pub fn edit(&mut self) {
        self.step = FormStep::Choosing;
    }

    /// What gets persisted. The team preference is dropped unless attending.
    pub fn submission(&self) -> Result<SignupSubmission, SignupError> {
        let attendance = self.validate()?;
        let team_preference = if attendance.is_affirmative() {
            self.team_preference
        } else {
            None
        };
        Ok(SignupSubmission {
            attendance,
            team_preference,
        })
    }

    fn validate(&self) -> Result<Attendance, SignupError> {
        let attendance = self.attendance.ok_or(SignupError::MissingAttendance)?;
        if attendance.is_affirmative() && self.team_preference.is_none() {
            return Err(SignupError::MissingTeamPreference);
        }
        Ok(attendance)
    }
}

/// Raw submit body, checked through [`SignupForm`] before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub attendance: String,
    #[serde(default)]
    pub team_preference: Option<String>,
}

impl SignupRequest {
    pub fn into_submission(self) -> Result<SignupSubmission, SignupError> {
        let attendance = Attendance::try_from(self.attendance)?;
        let mut form = SignupForm::new();
        form.choose_attendance(attendance);
        if attendance.is_affirmative()
            && let Some(raw) = self.team_preference
        {
            form.choose_team_preference(TeamPreference::try_from(raw)?);
        }
        form.submission()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupSubmission {
    pub attendance: Attendance,
    pub team_preference: Option<TeamPreference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupMemberView {
    pub username: String,
    pub squad_power: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Attendance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_preference: Option<TeamPreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_signup: Option<DateTime<Utc>>,
}

/// Everything the signup page renders, one variant per page state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SignupScreen {
    Unauthenticated,
    WindowClosed {
        return_to: String,
    },
    Open {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        member: Option<SignupMemberView>,
        form: SignupForm,
        choices: Vec<Attendance>,
        team_preferences: Vec<TeamPreference>,
    },
}

impl SignupScreen {
    /// The closed window wins over any prior signup state.
    pub fn resolve(authenticated: bool, settings: &Settings, member: Option<&Member>) -> Self {
        if !authenticated {
            return Self::Unauthenticated;
        }
        if !settings.registration_open {
            return Self::WindowClosed {
                return_to: HUB_PATH.to_owned(),
            };
        }
        Self::Open {
            member: member.map(|member| SignupMemberView {
                username: member.username.clone(),
                squad_power: member.squad_1_power.display(),
                attendance: member.attendance(),
                team_preference: member.ds_team_preference,
                last_signup: member.ds_signup_time,
            }),
            form: member.map(SignupForm::from_member).unwrap_or_default(),
            choices: Attendance::ALL.to_vec(),
            team_preferences: TeamPreference::ALL.to_vec(),
        }
    }

    pub fn shows_form(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn open_settings() -> Settings {
        Settings {
            registration_open: true,
            version: 1,
        }
    }

    #[test]
    fn submit_disabled_until_attendance_and_preference_chosen() {
        let mut form = SignupForm::new();
        assert!(!form.can_submit());

        form.choose_attendance(Attendance::Yes);
        assert!(form.shows_team_step());
        assert!(!form.can_submit());
        assert_eq!(form.preview(), Err(SignupError::MissingTeamPreference));

        form.choose_team_preference(TeamPreference::TeamB);
        assert!(form.can_submit());
    }

    #[test]
    fn declining_drops_prior_team_preference() {
        let mut form = SignupForm::new();
        form.choose_attendance(Attendance::Yes);
        form.choose_team_preference(TeamPreference::TeamA);
        form.choose_attendance(Attendance::No);

        let submission = form.submission().expect("decline is submittable");
        assert_eq!(submission.attendance.label(), "Sorry, can't make it 😢");
        assert_eq!(submission.team_preference, None);
    }

    #[test]
    fn edit_from_preview_keeps_selection() {
        let mut form = SignupForm::new();
        form.choose_attendance(Attendance::Yes);
        form.choose_team_preference(TeamPreference::TeamA);
        form.preview().expect("complete form previews");
        assert_eq!(form.step(), FormStep::Preview);

        // Choices are frozen while previewing.
        form.choose_attendance(Attendance::Sub);
        assert_eq!(form.attendance(), Some(Attendance::Yes));

        form.edit();
        assert_eq!(form.step(), FormStep::Choosing);
        assert_eq!(form.attendance(), Some(Attendance::Yes));
        assert_eq!(form.team_preference(), Some(TeamPreference::TeamA));
    }

    #[test]
    fn request_rejects_unknown_strings_and_missing_preference() {
        let unknown = SignupRequest {
            attendance: "Probably".into(),
            team_preference: None,
        };
        assert_eq!(
            unknown.into_submission(),
            Err(SignupError::UnknownAttendance("Probably".into()))
        );

        let missing = SignupRequest {
            attendance: ATTENDANCE_YES.into(),
            team_preference: None,
        };
        assert_eq!(
            missing.into_submission(),
            Err(SignupError::MissingTeamPreference)
        );
    }

    #[test]
    fn request_for_sub_ignores_team_preference() {
        let request = SignupRequest {
            attendance: ATTENDANCE_SUB.into(),
            team_preference: Some("not even a label".into()),
        };
        let submission = request.into_submission().expect("sub signup is valid");
        assert_eq!(submission.attendance, Attendance::Sub);
        assert_eq!(submission.team_preference, None);
    }

    #[test]
    fn closed_window_never_shows_form() {
        let closed = Settings {
            registration_open: false,
            version: 3,
        };
        let mut member = Member::new("u1", "Raptor");
        member.ds_choice = Some(ATTENDANCE_YES.into());
        member.ds_signup_time = Some(Utc::now());

        let screen = SignupScreen::resolve(true, &closed, Some(&member));
        assert!(!screen.shows_form());
        assert_eq!(
            screen,
            SignupScreen::WindowClosed {
                return_to: "/".into()
            }
        );
    }

    #[test]
    fn unauthenticated_takes_precedence() {
        let screen = SignupScreen::resolve(false, &open_settings(), None);
        assert_eq!(screen, SignupScreen::Unauthenticated);
    }

    #[test]
    fn open_screen_prefills_from_member() {
        let mut member = Member::new("u1", "Shadow");
        member.ds_choice = Some(ATTENDANCE_YES_LEGACY.into());
        member.ds_team_preference = Some(TeamPreference::TeamB);

        let screen = SignupScreen::resolve(true, &open_settings(), Some(&member));
        let SignupScreen::Open { form, choices, .. } = screen else {
            panic!("expected open screen");
        };
        assert_eq!(form.attendance(), Some(Attendance::Yes));
        assert_eq!(form.team_preference(), Some(TeamPreference::TeamB));
        assert_eq!(choices.len(), 3);
    }

    #[test]
    fn screen_serializes_with_state_tag() {
        let json = serde_json::to_value(SignupScreen::Unauthenticated).expect("serialize");
        assert_eq!(json["state"], "unauthenticated");
    }

    #[test]
    fn priority_classifies_free_text_by_phrase() {
        assert_eq!(attendance_priority(Some(ATTENDANCE_YES)), 3);
        assert_eq!(attendance_priority(Some("Yes ... for sure")), 3);
        assert_eq!(attendance_priority(Some("Maybe, sign me as sub")), 2);
        assert_eq!(attendance_priority(Some("Sorry")), 1);
        assert_eq!(attendance_priority(None), 1);
    }

    #[test]
    fn legacy_affirmative_label_keeps_top_priority() {
        assert!(!ATTENDANCE_YES_LEGACY.contains("for sure"));
        assert_eq!(attendance_priority(Some(ATTENDANCE_YES_LEGACY)), 3);
        assert_eq!(
            attendance_priority(Some(ATTENDANCE_YES_LEGACY)),
            attendance_priority(Some(ATTENDANCE_YES))
        );
    }
}
