//! `--seed [FILE]` mode: upserts a roster of members with their stats.
//!
//! Without a file the built-in sample roster is loaded. Power values go
//! through the same normalisation as profile edits, so a roster exported in
//! millions and one in raw units load the same way. Running a roster twice
//! updates the existing rows instead of adding new ones.

use std::fmt;
use std::path::PathBuf;

use alliance_hub_shared::Power;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::store;

pub const SEED_FLAG: &str = "--seed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    Sample,
    File(PathBuf),
}

/// `None` unless the first argument is the seed flag.
pub fn source_from_args(mut args: impl Iterator<Item = String>) -> Option<SeedSource> {
    if args.next().as_deref() != Some(SEED_FLAG) {
        return None;
    }
    Some(match args.next() {
        Some(path) => SeedSource::File(PathBuf::from(path)),
        None => SeedSource::Sample,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedMember {
    #[serde(default)]
    pub user_id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub total_hero_power: f64,
    #[serde(default)]
    pub squad_1_power: f64,
    #[serde(default)]
    pub vs_score: Option<i64>,
    #[serde(default)]
    pub desert_points: Option<i64>,
}

impl SeedMember {
    /// Rows without an explicit id are keyed on the lowercased username.
    pub fn user_id(&self) -> String {
        match self.user_id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(id) => id.to_owned(),
            None => format!("seed-{}", self.username.trim().to_lowercase()),
        }
    }

    pub fn total_power(&self) -> Power {
        Power::from_input(self.total_hero_power)
    }

    pub fn squad_power(&self) -> Power {
        Power::from_input(self.squad_1_power)
    }
}

fn sample(username: &str, total_hero_power: f64, vs_score: i64, desert_points: i64) -> SeedMember {
    SeedMember {
        user_id: None,
        username: username.to_owned(),
        role: None,
        total_hero_power,
        squad_1_power: 0.0,
        vs_score: Some(vs_score),
        desert_points: Some(desert_points),
    }
}

pub fn sample_roster() -> Vec<SeedMember> {
    vec![
        sample("Zovian", 125_500_000.0, 950_000, 4500),
        sample("Jade", 118_000_000.0, 820_000, 3800),
        sample("May", 95_000_000.0, 750_000, 4100),
        sample("Shadow", 110_000_000.0, 680_000, 2900),
        sample("Raptor", 88_000_000.0, 550_000, 3200),
    ]
}

#[derive(Debug)]
pub enum SeedError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    EmptyUsername(usize),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "failed to read seed file: {e}"),
            Self::Parse(e) => write!(f, "failed to parse seed file: {e}"),
            Self::EmptyUsername(idx) => write!(f, "seed entry {idx} has no username"),
        }
    }
}

impl std::error::Error for SeedError {}

/// Parses a JSON array of members.
pub fn parse_roster(raw: &str) -> Result<Vec<SeedMember>, SeedError> {
    let members: Vec<SeedMember> = serde_json::from_str(raw).map_err(SeedError::Parse)?;
    if let Some(idx) = members.iter().position(|m| m.username.trim().is_empty()) {
        return Err(SeedError::EmptyUsername(idx));
    }
    Ok(members)
}

pub fn load(source: &SeedSource) -> Result<Vec<SeedMember>, SeedError> {
    match source {
        SeedSource::Sample => Ok(sample_roster()),
        SeedSource::File(path) => {
            let raw = std::fs::read_to_string(path).map_err(SeedError::Read)?;
            parse_roster(&raw)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
}

pub async fn run(pool: &PgPool, members: &[SeedMember]) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();
    for member in members {
        if store::upsert_seed_member(pool, &member.user_id(), member).await? {
            report.created += 1;
        } else {
            report.updated += 1;
        }
    }
    info!(
        created = report.created,
        updated = report.updated,
        "Seeded alliance members"
    );
    Ok(report)
}
