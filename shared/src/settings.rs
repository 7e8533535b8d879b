use serde::{Deserialize, Serialize};

/// Id of the singleton settings row.
pub const SETTINGS_ROW_ID: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub registration_open: bool,
    #[serde(default)]
    pub version: i64,
}

/// R4 registration toggle. `expected_version` makes the write conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationUpdate {
    pub registration_open: bool,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Fixed redirect targets of the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRedirects {
    pub sign_in: String,
    pub sign_up: String,
    pub after_sign_in: String,
    pub after_sign_up: String,
    pub after_sign_out: String,
}

impl Default for AuthRedirects {
    fn default() -> Self {
        Self {
            sign_in: "/signin".to_owned(),
            sign_up: "/signup".to_owned(),
            after_sign_in: "/".to_owned(),
            after_sign_up: "/".to_owned(),
            after_sign_out: "/".to_owned(),
        }
    }
}
