use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sqlx::PgPool;
use tracing::warn;

use crate::auth::IdentityVerifier;
use crate::config::identity_jwt_secret;

#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL pool for the member directory and settings. None in tests without a database.
    pub db: Option<PgPool>,
    /// None when no identity secret is configured; every caller is then anonymous.
    pub identity: Option<IdentityVerifier>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    hub_requests_total: AtomicU64,
    profile_writes_total: AtomicU64,
    signup_writes_total: AtomicU64,
    registration_toggles_total: AtomicU64,
    team_assignments_total: AtomicU64,
    write_failures_total: AtomicU64,
    version_conflicts_total: AtomicU64,
    auth_rejections_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub hub_requests_total: u64,
    pub profile_writes_total: u64,
    pub signup_writes_total: u64,
    pub registration_toggles_total: u64,
    pub team_assignments_total: u64,
    pub write_failures_total: u64,
    pub version_conflicts_total: u64,
    pub auth_rejections_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            hub_requests_total: self.hub_requests_total.load(Ordering::Relaxed),
            profile_writes_total: self.profile_writes_total.load(Ordering::Relaxed),
            signup_writes_total: self.signup_writes_total.load(Ordering::Relaxed),
            registration_toggles_total: self.registration_toggles_total.load(Ordering::Relaxed),
            team_assignments_total: self.team_assignments_total.load(Ordering::Relaxed),
            write_failures_total: self.write_failures_total.load(Ordering::Relaxed),
            version_conflicts_total: self.version_conflicts_total.load(Ordering::Relaxed),
            auth_rejections_total: self.auth_rejections_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_hub_request(&self) {
        self.hub_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_profile_write(&self) {
        self.profile_writes_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_signup_write(&self) {
        self.signup_writes_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration_toggle(&self) {
        self.registration_toggles_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_team_assignments(&self, count: u64) {
        self.team_assignments_total.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_version_conflict(&self) {
        self.version_conflicts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_auth_rejection(&self) {
        self.auth_rejections_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(db: Option<PgPool>) -> Self {
        let identity = identity_jwt_secret().map(|secret| IdentityVerifier::new(&secret));
        if identity.is_none() {
            warn!("IDENTITY_JWT_SECRET is not set; all requests will be anonymous");
        }
        Self {
            db,
            identity,
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }

    pub fn with_identity_secret(mut self, secret: &str) -> Self {
        self.identity = Some(IdentityVerifier::new(secret));
        self
    }
}
