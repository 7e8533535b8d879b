use std::path::Path;

use alliance_hub_shared::settings::SETTINGS_ROW_ID;

const WORKSPACE_MIGRATIONS_DIR: &str = "server/migrations";
const CRATE_MIGRATIONS_DIR: &str = "./migrations";

fn migrations_path() -> &'static Path {
    let workspace_path = Path::new(WORKSPACE_MIGRATIONS_DIR);
    if workspace_path.exists() {
        return workspace_path;
    }
    Path::new(CRATE_MIGRATIONS_DIR)
}

/// Applies pending migrations, then makes sure the settings singleton exists.
pub async fn run(pool: &sqlx::PgPool) -> Result<(), sqlx_core::migrate::MigrateError> {
    let migrator = sqlx_core::migrate::Migrator::new(migrations_path()).await?;
    migrator.run(pool).await?;
    ensure_settings_row(pool).await?;
    Ok(())
}

async fn ensure_settings_row(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
    let inserted = sqlx::query(
        "INSERT INTO settings (id, registration_open) VALUES ($1, FALSE) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(SETTINGS_ROW_ID)
    .execute(pool)
    .await?
    .rows_affected();

    if inserted > 0 {
        tracing::info!("Created settings row with registration closed");
    }
    Ok(())
}
