use crate::cli::ServeArgs;
use crate::infra::{
    seed_demo_data, AppState, InMemoryPreferenceRepository, InMemoryPropertyRepository,
    RecordingMailSender, StaticIdentityProvider,
};
use crate::routes::with_investor_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use propmatch::config::{AppConfig, AppEnvironment};
use propmatch::error::AppError;
use propmatch::preferences::{InvestorApi, MatchQueryOptions, PreferenceService};
use propmatch::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let preferences = Arc::new(InMemoryPreferenceRepository::default());
    let listings = Arc::new(InMemoryPropertyRepository::default());
    let mail = Arc::new(RecordingMailSender::default());
    let identity = Arc::new(StaticIdentityProvider::default());

    if config.environment == AppEnvironment::Development {
        seed_demo_data(listings.as_ref(), identity.as_ref());
    }

    let service = Arc::new(PreferenceService::new(
        preferences,
        listings,
        mail,
        config.mail.admin_email.clone(),
    ));

    let defaults = MatchQueryOptions {
        min_score: config.matching.min_score,
        limit: config.matching.page_size,
        offset: 0,
    };

    let app = with_investor_routes(InvestorApi {
        service,
        identity,
        defaults,
    })
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "property matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
