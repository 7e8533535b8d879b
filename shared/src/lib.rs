pub mod admin;
pub mod desert_storm;
pub mod hub;
pub mod member;
pub mod power;
pub mod role;
pub mod roster;
pub mod settings;

pub use admin::{AdminBoard, AssignmentRequest, SelectionSet, TeamCounts};
pub use desert_storm::{
    Attendance, SignupForm, SignupRequest, SignupScreen, SignupSubmission, TeamPreference,
};
pub use hub::{HubView, Leaderboards, SignupStats};
pub use member::{Member, MemberBadge, ProfileUpdate, TeamAssignment};
pub use power::Power;
pub use role::Role;
pub use roster::RosterSection;
pub use settings::{AuthRedirects, RegistrationUpdate, Settings};
