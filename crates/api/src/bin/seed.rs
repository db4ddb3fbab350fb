//! Seed the database with the built-in roles, the Admin account and
//! default master data. Safe to re-run.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hermas_api::auth::password::hash_password;
use hermas_db::seed::{self, ADMIN_DEFAULT_PASSWORD};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hermas_seed=info,hermas_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = hermas_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;

    hermas_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let hash = hash_password(ADMIN_DEFAULT_PASSWORD)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    let report = seed::run(&pool, &hash).await.context("Seeding failed")?;

    tracing::info!(
        admin_role_id = report.admin_role_id,
        admin_user_id = report.admin_user_id,
        admin_created = report.admin_created,
        password_rehashed = report.password_rehashed,
        session_created = report.session_created,
        "Seed complete"
    );
    Ok(())
}
