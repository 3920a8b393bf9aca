use std::{future::IntoFuture, process, sync::Arc};

use devportal::{
    application::{
        cutoff::{FixedCutoff, PastEventCutoff, SystemCutoff},
        error::AppError,
        event::EventService,
        listing::{EventsListingService, ListingOptions},
        repos::{CreateListingParams, EventsRepo, HealthRepo, ListingPagesRepo, TopicsRepo},
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::InitListing(args) => run_init_listing(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_http_state(repositories, &settings);
    serve_http(&settings, state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let database_url = database_url(&settings)?;
    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::Connect)?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::Migrate)?;

    info!(target = "devportal::migrate", "database migrations applied");
    Ok(())
}

async fn run_init_listing(
    settings: config::Settings,
    args: config::InitListingArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_http_state(repositories, &settings);

    let slug = args
        .slug
        .filter(|slug| !slug.trim().is_empty())
        .unwrap_or_else(|| slug::slugify(&args.title));
    let params = CreateListingParams {
        slug,
        seo_title: args.seo_title.unwrap_or_default(),
        search_description: args.search_description.unwrap_or_default(),
        title: args.title,
        featured: Vec::new(),
        body: Vec::new(),
        keywords: args
            .keywords
            .into_iter()
            .map(|keyword| keyword.trim().to_string())
            .filter(|keyword| !keyword.is_empty())
            .collect(),
        show_in_menus: args.show_in_menus,
    };

    let record = state.listing.create_listing(params).await?;
    info!(
        target = "devportal::init_listing",
        id = %record.id,
        slug = %record.slug,
        "events listing page ready"
    );
    Ok(())
}

fn database_url(settings: &config::Settings) -> Result<&str, AppError> {
    settings
        .database
        .url
        .as_deref()
        .ok_or(AppError::Infra(InfraError::MissingDatabaseUrl))
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = database_url(settings)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::Connect)?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::Migrate)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_http_state(repositories: Arc<PostgresRepositories>, settings: &config::Settings) -> HttpState {
    let events_repo: Arc<dyn EventsRepo> = repositories.clone();
    let topics_repo: Arc<dyn TopicsRepo> = repositories.clone();
    let listing_repo: Arc<dyn ListingPagesRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories;

    let cutoff: Arc<dyn PastEventCutoff> = match settings.events.reference_date {
        Some(date) => Arc::new(FixedCutoff(date)),
        None => Arc::new(SystemCutoff::new(settings.events.timezone)),
    };

    let options = ListingOptions {
        per_page: settings.events.per_page,
        malformed_date_policy: settings.events.malformed_date_policy,
    };

    HttpState {
        listing: Arc::new(EventsListingService::new(
            events_repo.clone(),
            topics_repo,
            listing_repo,
            cutoff.clone(),
            options,
        )),
        events: Arc::new(EventService::new(events_repo, cutoff)),
        health: health_repo,
    }
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let addr = settings.server.addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| InfraError::Bind { addr, source })?;
    info!(
        target = "devportal::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    let drain_deadline = async move {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(grace).await,
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(InfraError::Serve)?;
        }
        () = drain_deadline => {
            warn!(
                target = "devportal::serve",
                grace_secs = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "devportal::serve", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target = "devportal::serve", "shutdown signal received");
}
