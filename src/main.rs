//! Artisan Coffee API server.
//!
//! Loads configuration from the environment, wires the Postgres, Stripe
//! and email adapters into the handlers, and serves the HTTP API.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use secrecy::SecretString;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use artisan_coffee::adapters::email::{LoggingNotificationSender, ResendNotificationSender};
use artisan_coffee::adapters::http::{app, AppState, Ports, WebhookSettings};
use artisan_coffee::adapters::postgres::{
    PostgresOrderRepository, PostgresProductCatalog, PostgresSubscriptionRepository,
    PostgresWebhookEventRepository,
};
use artisan_coffee::adapters::stripe::{StripeConfig, StripePaymentGateway};
use artisan_coffee::application::handlers::{CheckoutSettings, PurgeWebhookEventsHandler};
use artisan_coffee::config::{AppConfig, EmailConfig, ServerConfig};
use artisan_coffee::domain::payment::StripeWebhookVerifier;
use artisan_coffee::ports::{NotificationSender, WebhookEventRepository};

const PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = config
        .database
        .pool_options()
        .connect_with(config.database.connect_options()?)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let gateway = StripePaymentGateway::new(
        StripeConfig::new(SecretString::new(config.payment.stripe_api_key.clone()))
            .with_base_url(config.payment.api_base_url.clone())
            .with_timeout(config.payment.http_timeout()),
    )?;
    let events: Arc<dyn WebhookEventRepository> =
        Arc::new(PostgresWebhookEventRepository::new(pool.clone()));

    let ports = Ports {
        orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        catalog: Arc::new(PostgresProductCatalog::new(pool.clone())),
        events: events.clone(),
        gateway: Arc::new(gateway),
        notifier: notifier(&config.email)?,
    };

    spawn_event_purge(events, config.payment.webhook_retention_days);

    let state = AppState::new(
        ports,
        CheckoutSettings {
            currency: config.payment.currency.clone(),
            success_url: config.payment.checkout_success_url.clone(),
            cancel_url: config.payment.checkout_cancel_url.clone(),
        },
        WebhookSettings {
            verifier: StripeWebhookVerifier::new(SecretString::new(
                config.payment.stripe_webhook_secret.clone(),
            )),
            require_livemode: config.payment.require_livemode,
        },
    );

    let router = app(
        state,
        config.server.request_timeout(),
        cors_layer(&config.server)?,
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "artisan-coffee listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// JSON logs in production, human-readable elsewhere. `RUST_LOG` wins
/// over the configured filter when set.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn notifier(
    email: &EmailConfig,
) -> Result<Arc<dyn NotificationSender>, Box<dyn Error + Send + Sync>> {
    match email.api_key() {
        Some(key) => {
            let sender = ResendNotificationSender::new(
                SecretString::new(key.to_string()),
                email.from_header(),
                email.timeout(),
            )?;
            Ok(Arc::new(sender))
        }
        None => {
            tracing::warn!("no Resend API key configured; emails will only be logged");
            Ok(Arc::new(LoggingNotificationSender::new()))
        }
    }
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer, Box<dyn Error + Send + Sync>> {
    let origins = server.cors_origins_list();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let values = origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin))
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(Any))
}

/// Purges expired webhook records at startup and once a day after.
fn spawn_event_purge(events: Arc<dyn WebhookEventRepository>, retention_days: u32) {
    let purge = PurgeWebhookEventsHandler::new(events, retention_days);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(err) = purge.handle().await {
                tracing::error!(error = %err, "webhook event purge failed");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
