use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

fn init_logging() {
    // Load .env first so RUST_LOG / LOG_FORMAT take effect
    dotenv().ok();
    // LOG_FORMAT=json switches to structured output, anything else stays compact
    common::utils::logging::init_logging_from_env();
    info!(service = "recipe_api", event = "logger_init", "tracing subscriber initialized");
}

/// Resolves on Ctrl+C, or SIGTERM on unix (container stop).
async fn shutdown_signal(service_id: Uuid, pid: u32) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            // never resolves; SIGTERM or a server error still ends the process
            warn!(service = "recipe_api", event = "signal_unavailable", error = %e, "ctrl-c handler not installed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(service = "recipe_api", event = "signal_unavailable", error = %e, "SIGTERM handler not installed");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!(service = "recipe_api", event = "shutdown_signal", %service_id, pid, "shutdown requested, draining connections");
}

fn main() -> std::process::ExitCode {
    init_logging();

    // Process context for log correlation (no secrets)
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "recipe_api",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    // Invalid config is fatal
    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "recipe_api", event = "config_invalid", error = %e, "configuration rejected");
            return std::process::ExitCode::FAILURE;
        }
    };
    let worker_threads = cfg.server.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "recipe_api", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "recipe_api",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        database = cfg.database.name.as_deref().unwrap_or("<from url>"),
        "recipe api starting"
    );

    rt.block_on(async move {
        match server::run(cfg, shutdown_signal(service_id, pid)).await {
            Ok(()) => {
                info!(service = "recipe_api", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "recipe_api", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
