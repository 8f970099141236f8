use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardio_api::{home, reports, ApiClient, HomeView};
use cardio_core::config::core_config_from_env_values;
use cardio_core::{FileStore, Role, SessionStore};

/// Application shell for the risk-tracking client
///
/// Resolves configuration once, restores the cached session, and renders the
/// role-gated home view. Admins also get the KPI report with aggregate counts.
/// Log in and out with the `cardio` CLI.
///
/// # Environment Variables
/// - `CARDIO_API_URL`: API base URL (default: "http://127.0.0.1:8000")
/// - `CARDIO_STORAGE_DIR`: Directory for the local key-value store (default: ".cardio")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("cardio=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = core_config_from_env_values(
        std::env::var("CARDIO_API_URL").ok(),
        std::env::var("CARDIO_STORAGE_DIR").ok(),
    )?;
    tracing::info!("++ Using API at {}", cfg.api_base_url());
    tracing::info!("++ Local storage in {}", cfg.storage_file().display());

    let sessions = SessionStore::open(FileStore::new(cfg.storage_file()));
    let ctx = sessions.context();
    let Some(session) = sessions.current() else {
        println!("Not logged in. Run `cardio login <email> <password>` first.");
        return Ok(());
    };

    let client = ApiClient::from_config(&cfg);
    println!("Welcome, {} ({})", session.username, session.role);

    let view = home::load(&ctx, &client).await?;
    println!("{}: {} entries", view.title(), view.len());
    if let HomeView::Users(users) = &view {
        for user in users {
            println!("  {}\t{}", user.id, user.full_name());
        }
    }

    if session.role == Role::Admin {
        println!();
        print!("{}", reports::fetch(&client, true).await);
    }

    Ok(())
}
