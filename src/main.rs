use std::env;
use std::sync::Arc;
use std::time::Duration;

use pixelforge_bot::catalog::Catalog;
use pixelforge_bot::constants::{BUCKET_NAME, CONFIG_DIR, LOCALES_DIR};
use pixelforge_bot::database::{self, SessionStore};
use pixelforge_bot::i18n::I18n;
use pixelforge_bot::model::AppState;
use pixelforge_bot::replicate::ReplicateClient;
use pixelforge_bot::storage::StorageClient;
use pixelforge_bot::telegram::Telegram;
use pixelforge_bot::{handler, interactions};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Startup-time failures are fatal: there is no partial-startup mode.
    let token = env::var("TELEGRAM_BOT_TOKEN").expect("TELEGRAM_BOT_TOKEN missing");
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL missing");
    let supabase_url = env::var("SUPABASE_URL").expect("SUPABASE_URL missing");
    let supabase_key = env::var("SUPABASE_KEY").expect("SUPABASE_KEY missing");
    let replicate_token = env::var("REPLICATE_API_TOKEN").expect("REPLICATE_API_TOKEN missing");

    let catalog = Catalog::load(CONFIG_DIR).expect("failed to load catalog config");
    tracing::info!(
        providers = catalog.providers.len(),
        models = catalog.models.len(),
        "catalog loaded"
    );
    let i18n = I18n::load(LOCALES_DIR).expect("failed to load locales");

    let pool = database::init::connect(&database_url)
        .await
        .expect("database connection failed");

    let telegram = Telegram::new(token).expect("failed to build telegram client");
    let storage = StorageClient::new(&supabase_url, supabase_key, BUCKET_NAME.to_string())
        .expect("failed to build storage client");
    storage
        .ensure_bucket()
        .await
        .expect("storage bucket provisioning failed");
    let replicate = ReplicateClient::new(replicate_token).expect("failed to build provider client");

    let app = Arc::new(AppState {
        store: SessionStore::new(pool),
        catalog,
        i18n,
        telegram,
        storage,
        replicate,
    });

    tracing::info!("bot is running, waiting for updates");
    run_polling(app).await;
}

/// Long-poll intake loop. Each update is handled in its own task so one
/// user's slow generation never blocks intake for everyone else.
async fn run_polling(app: Arc<AppState>) {
    let mut offset: i64 = 0;
    loop {
        let updates = match app.telegram.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, retrying");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Some(cq) = update.callback_query {
                let app = app.clone();
                tokio::spawn(interactions::handle_callback(app, cq));
            } else if let Some(msg) = update.message {
                if msg.text.is_some() || !msg.photo.is_empty() {
                    let app = app.clone();
                    tokio::spawn(handler::handle_message(app, msg));
                }
            }
        }
    }
}
