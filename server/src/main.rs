mod circuit_breaker;
mod db_core;
mod email_proc;
mod enrichment;
mod error;
mod eval;
mod inbox_sync;
mod kv;
mod model;
mod queue;
mod ranking;
mod rate_limiters;
mod request_tracing;
mod routes;
mod server_config;
mod state;

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use mimalloc::MiMalloc;
use routes::AppRouter;
use sea_orm::{ConnectOptions, Database};
use tokio::signal;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use db_core::prelude::user;
use inbox_sync::{GmailInboxClient, GoogleInboxCredentials, InboxClient, InboxSynchronizer};
use kv::InMemoryKvStore;
use model::ctrl::{job_record_ctrl::JobRecordCtrl, user_ctrl::UserCtrl};
use queue::QueuePools;
use rate_limiters::RateLimiters;
use state::ServerState;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::set_var("RUST_LOG", env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_env("RUST_LOG"))
        .with(tracing_subscriber::fmt::Layer::default().with_ansi(false))
        .init();

    tracing::info!("starting up; config: {}", *server_config::cfg);

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL is not set");
    let mut db_options = ConnectOptions::new(db_url);
    db_options.sqlx_logging(false);
    let conn = Database::connect(db_options)
        .await
        .expect("database connection failed");

    let http_client = reqwest::ClientBuilder::new()
        .timeout(Duration::from_secs(30))
        .build()?;

    let kv_store = Arc::new(InMemoryKvStore::new());
    let kv: Arc<dyn kv::KvStore> = kv_store.clone();
    let youtube_api_key = env::var("YOUTUBE_API_KEY").expect("YOUTUBE_API_KEY is not set");
    let youtube_client = Arc::new(enrichment::YouTubeClient::new(
        http_client.clone(),
        youtube_api_key,
        kv.clone(),
        RateLimiters::new(kv.clone()),
    ));
    let inbox_credentials = Arc::new(GoogleInboxCredentials::new(
        http_client.clone(),
        env::var("GOOGLE_CLIENT_ID").expect("GOOGLE_CLIENT_ID is not set"),
        env::var("GOOGLE_CLIENT_SECRET").expect("GOOGLE_CLIENT_SECRET is not set"),
    ));

    let state = ServerState {
        conn,
        http_client,
        kv,
        youtube_client,
        inbox_credentials,
    };

    let queue_pools = QueuePools::spawn_all(state.clone(), "server");
    let scheduler = start_scheduler(state.clone(), kv_store).await?;

    let router = AppRouter::create(state);
    let server_handle = tokio::spawn(run_server(router));

    shutdown_signal().await;
    tracing::info!("shutdown signal received, draining");

    scheduler.shutdown().await.ok();
    queue_pools.shutdown_all().await;
    server_handle.abort();

    Ok(())
}

/// Three scheduled sweeps beyond per-queue polling (SPEC_FULL §4.1, §4.6, §4.8): inbox sync,
/// lease reclaim + terminal-job cleanup, and the KV store's TTL sweep. Mirrors the teacher's
/// `tokio_cron_scheduler` composition.
async fn start_scheduler(
    state: ServerState,
    kv_store: Arc<InMemoryKvStore>,
) -> anyhow::Result<JobScheduler> {
    let mut scheduler = JobScheduler::new().await?;

    {
        let state = state.clone();
        scheduler
            .add(Job::new_async("0 * * * * *", move |uuid, _l| {
                let state = state.clone();
                Box::pin(async move {
                    tracing::info!(job = %uuid, "running inbox sync sweep");
                    if let Err(e) = run_inbox_sync_sweep(&state).await {
                        tracing::error!(job = %uuid, error = ?e, "inbox sync sweep failed");
                    }
                })
            })?)
            .await?;
    }

    {
        let state = state.clone();
        scheduler
            .add(Job::new_async("30 * * * * *", move |uuid, _l| {
                let state = state.clone();
                Box::pin(async move {
                    match JobRecordCtrl::reclaim_expired_leases(&state.conn).await {
                        Ok(n) if n > 0 => {
                            tracing::info!(job = %uuid, reclaimed = n, "reclaimed expired job leases")
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(job = %uuid, error = ?e, "lease reclaim failed"),
                    }
                    if let Err(e) = JobRecordCtrl::cleanup_terminal(&state.conn).await {
                        tracing::error!(job = %uuid, error = ?e, "terminal job cleanup failed");
                    }
                })
            })?)
            .await?;
    }

    {
        scheduler
            .add(Job::new_repeated(Duration::from_secs(60), move |_uuid, _l| {
                kv_store.clean_store();
            })?)
            .await?;
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Iterates every user without `needs_reauthorization`, resolves a usable access token, and
/// advances their inbox cursor (SPEC_FULL §4.1 step "iterates all users... calls
/// `InboxSynchronizer::sync_user`").
async fn run_inbox_sync_sweep(state: &ServerState) -> anyhow::Result<()> {
    let users = UserCtrl::get_all_syncable(&state.conn).await?;

    for user in users {
        if let Err(e) = sync_one_user(state, &user).await {
            tracing::error!(user_id = %user.id, error = ?e, "inbox sync failed for user");
        }
    }

    Ok(())
}

async fn sync_one_user(state: &ServerState, user: &user::Model) -> anyhow::Result<()> {
    let Some(access_token) = state
        .inbox_credentials
        .resolve_access_token(&state.conn, user)
        .await?
    else {
        return Ok(());
    };

    let client = GmailInboxClient::new(state.http_client.clone(), access_token);
    InboxSynchronizer::sync_user(state, user, &client as &dyn InboxClient).await?;

    Ok(())
}

async fn run_server(router: axum::Router) {
    let port = env::var("PORT").unwrap_or_else(|_| "5006".to_string());
    let addr = SocketAddr::from(([0, 0, 0, 0], port.parse::<u16>().expect("PORT must be numeric")));
    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, router)
        .await
        .expect("server exited unexpectedly");
}

async fn shutdown_signal() {
    if env::var("NO_SHUTDOWN").as_deref() == Ok("true") {
        std::future::pending::<()>().await;
        return;
    }

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
