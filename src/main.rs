use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod pinger;
mod server;

#[cfg(test)]
mod testutil;

/// Config file used when none is given on the command line (extension optional)
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Size the runtime from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_config(&format!("Using {workers} worker threads"));
    } else {
        logger::log_config("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg)?);
    let active_connections = Arc::new(AtomicUsize::new(0));
    let shutdown = Arc::new(Notify::new());

    logger::log_server_start(&addr, &cfg);
    logger::log_config(&format!("Max body size: {} bytes", cfg.http.max_body_size));
    logger::log_config(&format!(
        "Max connections: {}",
        cfg.performance
            .max_connections
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
    ));
    logger::log_config(&format!(
        "Daemon timeout: {} ms",
        pinger::DAEMON_TIMEOUT.as_millis()
    ));

    server::start_signal_handler(Arc::clone(&shutdown));
    server::start_server_loop(listener, state, active_connections, shutdown).await;
    Ok(())
}
