use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gestioip::{config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gestioip=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // --profile overrides PROFILE
    let args: Vec<String> = std::env::args().collect();
    let cli_profile = args
        .iter()
        .position(|arg| arg == "--profile")
        .and_then(|pos| args.get(pos + 1).cloned());

    let config = match cli_profile {
        Some(profile) => config::Config::with_profile(Some(profile)),
        None => config::Config::from_env(),
    };

    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database {}: {}", config.database_url, e);
            std::process::exit(1);
        }
    };

    if let Some(password) = &config.admin_password
        && let Err(e) = seed::ensure_admin(&db, &config.admin_username, password).await
    {
        tracing::error!("Failed to create admin account: {}", e);
    }

    if config.seed_fixtures {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    if let Err(e) = server::serve(db, &config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
