use recruitment_pipeline::{
    config::{get_config, init_config, LogFormat},
    database::pool::{create_pool, run_migrations},
    routes,
    services::{candidate_service::CandidateService, notification_service::NotificationService},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    let store = CandidateService::new(pool.clone(), config.notification_webhook_url.clone());
    let app_state = AppState::new(Arc::new(store), config.jwt_secret.clone());

    if config.notification_webhook_url.is_some() {
        let notif = NotificationService::new(pool.clone(), config.webhook_secret.clone());
        tokio::spawn(async move {
            loop {
                match notif.run_once().await {
                    Ok(true) => {}
                    Ok(false) => {
                        tokio::time::sleep(Duration::from_millis(1000)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Webhook worker error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });
    } else {
        info!("NOTIFICATION_WEBHOOK_URL not set, stage-change notifications disabled");
    }

    let app = routes::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
