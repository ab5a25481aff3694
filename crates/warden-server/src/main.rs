// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Warden server binary.

use clap::Parser;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warden_server::{create_app_state, create_router, error::Result};
use warden_server_config::{LogFormat, ServerConfig, SYSTEM_CONFIG_PATH};

/// Warden - access-control decision server.
#[derive(Parser, Debug)]
#[command(name = "warden-server", about = "Warden access-control server", version)]
struct Args {
	/// Path to the TOML config file (defaults to the system config path)
	#[arg(long)]
	config: Option<PathBuf>,
}

fn init_tracing(config: &ServerConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
	let registry = tracing_subscriber::registry().with(filter);

	match config.logging.format {
		LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}
}

async fn shutdown_signal(shutdown: CancellationToken) {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}
	tracing::info!("Received shutdown signal");
	shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => warden_server_config::load_config_with_file(path)?,
		None => warden_server_config::load_config()?,
	};
	init_tracing(&config);

	tracing::info!(
		config = %args
			.config
			.as_ref()
			.map(|path| path.display().to_string())
			.unwrap_or_else(|| SYSTEM_CONFIG_PATH.to_string()),
		host = %config.http.host,
		port = config.http.port,
		"starting warden-server"
	);

	let state = create_app_state(&config);
	let shutdown = state.shutdown.clone();
	tracing::info!(
		objects = state.engine.registry().object_count(),
		lookup_timeout_ms = config.acl.lookup_timeout.as_millis() as u64,
		"access control ready"
	);

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal(shutdown))
		.await?;

	tracing::info!("Server shutdown complete");
	Ok(())
}
