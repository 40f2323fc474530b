use std::{
    io,
    process::ExitCode,
    sync::OnceLock,
};

use application::{run, Args, Config, Error};
use service::infra::{postgres, Postgres};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() -> ExitCode {
    // Standard output is reserved for the JSON outcome.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || LOG_LEVEL
                            .get()
                            .copied()
                            .unwrap_or(log::Level::INFO)
                            >= *meta.level()
                        || STDERR_LEVELS.contains(meta.level())
                })),
        )
        .init();

    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

async fn start() -> Result<(), ExitCode> {
    let Args { config, command } = Args::parse().map_err(|e| {
        // Prints help and version too, not only failures.
        _ = e.print();
        ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
    })?;

    let Config {
        postgres,
        service,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
        ExitCode::FAILURE
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres_config = postgres.into();
    let mut postgres = Postgres::new(&postgres_config).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
        ExitCode::FAILURE
    })?;

    migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
            ExitCode::FAILURE
        })?;

    let service = application::Service::new(service.into(), postgres);

    let output = run(&service, command).await.map_err(|e: Error| {
        log::error!("{e}");
        e.exit_code()
    })?;

    println!("{output:#}");

    Ok(())
}
