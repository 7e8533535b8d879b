use alliance_hub_shared::desert_storm::TeamPreference;
use alliance_hub_shared::settings::SETTINGS_ROW_ID;
use alliance_hub_shared::{
    Member, Power, ProfileUpdate, Role, SelectionSet, Settings, SignupSubmission, TeamAssignment,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;

use crate::seed::SeedMember;

const MEMBER_COLUMNS: &str = "user_id, username, role, total_hero_power, squad_1_power, \
     vs_score, desert_points, ds_choice, ds_team_preference, ds_signup_time, team_assignment, \
     bio, gender, birthday, language, version";

type MemberRow = (
    String,
    String,
    Option<String>,
    i64,
    i64,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<DateTime<Utc>>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
);
type SettingsRow = (bool, i64);

fn member_from_row(row: MemberRow) -> Member {
    let (
        user_id,
        username,
        role,
        total_hero_power,
        squad_1_power,
        vs_score,
        desert_points,
        ds_choice,
        ds_team_preference,
        ds_signup_time,
        team_assignment,
        bio,
        gender,
        birthday,
        language,
        version,
    ) = row;
    Member {
        role: Role::from_stored(role.as_deref()),
        total_hero_power: Power::from_raw(total_hero_power),
        squad_1_power: Power::from_raw(squad_1_power),
        ds_team_preference: ds_team_preference.as_deref().and_then(TeamPreference::parse),
        team_assignment: team_assignment.as_deref().and_then(TeamAssignment::parse),
        user_id,
        username,
        vs_score,
        desert_points,
        ds_choice,
        ds_signup_time,
        bio,
        gender,
        birthday,
        language,
        version,
    }
}

fn settings_from_row((registration_open, version): SettingsRow) -> Settings {
    Settings {
        registration_open,
        version,
    }
}

/// Every member, strongest first.
pub async fn fetch_members(pool: &PgPool) -> Result<Vec<Member>, sqlx::Error> {
    let sql = format!(
        "SELECT {MEMBER_COLUMNS} FROM members ORDER BY total_hero_power DESC, user_id ASC"
    );
    let rows: Vec<MemberRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(rows.into_iter().map(member_from_row).collect())
}

pub async fn fetch_member(pool: &PgPool, user_id: &str) -> Result<Option<Member>, sqlx::Error> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE user_id = $1");
    let row: Option<MemberRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(member_from_row))
}

pub async fn fetch_settings(pool: &PgPool) -> Result<Settings, sqlx::Error> {
    let row: Option<SettingsRow> =
        sqlx::query_as("SELECT registration_open, version FROM settings WHERE id = $1")
            .bind(SETTINGS_ROW_ID)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(settings_from_row).unwrap_or_default())
}

/// Read views treat an unreadable settings row as a closed window.
pub async fn settings_or_closed(pool: &PgPool) -> Settings {
    match fetch_settings(pool).await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "failed to load settings; treating registration as closed");
            Settings::default()
        }
    }
}

/// Returns `None` when `expected_version` no longer matches.
pub async fn update_registration(
    pool: &PgPool,
    registration_open: bool,
    expected_version: Option<i64>,
) -> Result<Option<Settings>, sqlx::Error> {
    let row: Option<SettingsRow> = sqlx::query_as(
        "UPDATE settings SET registration_open = $1, version = version + 1 \
         WHERE id = $2 AND ($3::BIGINT IS NULL OR version = $3) \
         RETURNING registration_open, version",
    )
    .bind(registration_open)
    .bind(SETTINGS_ROW_ID)
    .bind(expected_version)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(settings_from_row))
}

/// Creates the row on first save. Returns `None` on a version mismatch.
pub async fn upsert_profile(
    pool: &PgPool,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<Option<Member>, sqlx::Error> {
    let sql = format!(
        "INSERT INTO members \
             (user_id, username, total_hero_power, squad_1_power, bio, gender, birthday, language) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (user_id) DO UPDATE SET \
             username = EXCLUDED.username, \
             total_hero_power = EXCLUDED.total_hero_power, \
             squad_1_power = EXCLUDED.squad_1_power, \
             bio = EXCLUDED.bio, \
             gender = EXCLUDED.gender, \
             birthday = EXCLUDED.birthday, \
             language = EXCLUDED.language, \
             version = members.version + 1 \
         WHERE $9::BIGINT IS NULL OR members.version = $9 \
         RETURNING {MEMBER_COLUMNS}"
    );
    let row: Option<MemberRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .bind(update.username.trim())
        .bind(update.total_power().raw())
        .bind(update.squad_power().raw())
        .bind(update.bio.as_deref())
        .bind(update.gender.as_deref())
        .bind(update.birthday.as_deref())
        .bind(update.language.as_deref())
        .bind(update.expected_version)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(member_from_row))
}

/// Records an attendance choice. A row created here is named after
/// `display_name`, or the user id when the token carries no name.
pub async fn upsert_signup(
    pool: &PgPool,
    user_id: &str,
    display_name: Option<&str>,
    submission: SignupSubmission,
    signed_up_at: DateTime<Utc>,
) -> Result<Member, sqlx::Error> {
    let sql = format!(
        "INSERT INTO members (user_id, username, ds_choice, ds_team_preference, ds_signup_time) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (user_id) DO UPDATE SET \
             ds_choice = EXCLUDED.ds_choice, \
             ds_team_preference = EXCLUDED.ds_team_preference, \
             ds_signup_time = EXCLUDED.ds_signup_time, \
             version = members.version + 1 \
         RETURNING {MEMBER_COLUMNS}"
    );
    let row: MemberRow = sqlx::query_as(&sql)
        .bind(user_id)
        .bind(
            display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(user_id),
        )
        .bind(submission.attendance.label())
        .bind(submission.team_preference.map(TeamPreference::label))
        .bind(signed_up_at)
        .fetch_one(pool)
        .await?;
    Ok(member_from_row(row))
}

/// Roster import keyed on `user_id`. Returns `true` when the row was created.
pub async fn upsert_seed_member(
    pool: &PgPool,
    user_id: &str,
    member: &SeedMember,
) -> Result<bool, sqlx::Error> {
    let (created,): (bool,) = sqlx::query_as(
        "INSERT INTO members \
             (user_id, username, role, total_hero_power, squad_1_power, vs_score, desert_points) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (user_id) DO UPDATE SET \
             username = EXCLUDED.username, \
             role = COALESCE(EXCLUDED.role, members.role), \
             total_hero_power = EXCLUDED.total_hero_power, \
             squad_1_power = EXCLUDED.squad_1_power, \
             vs_score = EXCLUDED.vs_score, \
             desert_points = EXCLUDED.desert_points, \
             version = members.version + 1 \
         RETURNING (xmax = 0)",
    )
    .bind(user_id)
    .bind(member.username.trim())
    .bind(member.role.as_deref().map(str::trim).filter(|role| !role.is_empty()))
    .bind(member.total_power().raw())
    .bind(member.squad_power().raw())
    .bind(member.vs_score)
    .bind(member.desert_points)
    .fetch_one(pool)
    .await?;
    Ok(created)
}

/// One statement for the whole selection. Returns the number of rows changed.
pub async fn assign_team(
    pool: &PgPool,
    selection: &SelectionSet,
    team: TeamAssignment,
) -> Result<u64, sqlx::Error> {
    if selection.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query(
        "UPDATE members SET team_assignment = $1, version = version + 1 \
         WHERE user_id = ANY($2)",
    )
    .bind(team.as_str())
    .bind(selection.as_slice())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
