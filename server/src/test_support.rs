use std::net::SocketAddr;

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx_core::pool::PoolConnection;
use sqlx_postgres::Postgres;

use crate::auth::Claims;
use crate::state::AppState;

const REAL_DB_TEST_LOCK: i64 = 20_260_020;

pub fn bearer_token(secret: &str, user_id: &str, name: Option<&str>) -> String {
    let claims = Claims {
        sub: user_id.to_owned(),
        name: name.map(str::to_owned),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode test token")
}

pub async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let app = crate::app::build_app(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });
    (addr, handle)
}

/// Migrated, emptied database held under an advisory lock for one test.
pub struct TestDb {
    pub pool: PgPool,
    lock_conn: PoolConnection<Postgres>,
}

impl TestDb {
    pub async fn connect(test_name: &str) -> Option<Self> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("Skipping {test_name} test: DATABASE_URL is not set");
            return None;
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("connect real postgres");

        let mut lock_conn = pool.acquire().await.expect("acquire lock connection");
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(REAL_DB_TEST_LOCK)
            .execute(&mut *lock_conn)
            .await
            .expect("acquire db lock");

        crate::db_migrations::run(&pool)
            .await
            .expect("run migrations");
        sqlx::query("TRUNCATE TABLE members")
            .execute(&pool)
            .await
            .expect("truncate members");
        sqlx::query("UPDATE settings SET registration_open = FALSE, version = 0 WHERE id = 1")
            .execute(&pool)
            .await
            .expect("reset settings");

        Some(Self { pool, lock_conn })
    }

    pub async fn release(mut self) {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(REAL_DB_TEST_LOCK)
            .execute(&mut *self.lock_conn)
            .await
            .expect("release db lock");
    }
}

pub async fn seed_member(pool: &PgPool, user_id: &str, role: &str, total_hero_power: i64) {
    sqlx::query(
        "INSERT INTO members (user_id, username, role, total_hero_power) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(user_id.to_uppercase())
    .bind(role)
    .bind(total_hero_power)
    .execute(pool)
    .await
    .expect("seed member");
}
