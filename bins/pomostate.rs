use std::process::ExitCode;

use service::StoreRegistry;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // load .env first so RUST_LOG and LOG_FORMAT take effect
    common::env::load_dotenv();
    common::utils::logging::init_logging_from_env();
    info!(service = "pomostate", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "pomostate",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "pomostate", event = "config_invalid", error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // stores are driven from a single thread
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "pomostate", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(service = "pomostate", event = "start", %service_id, pid, version, "pomostate starting");

    rt.block_on(async move {
        let registry = StoreRegistry::from_config(&cfg).await;
        let data = registry.data().get();
        info!(
            service = "pomostate",
            event = "stores_ready",
            config = %registry.config_store().path().display(),
            data = %registry.data_store().path().display(),
            tasks = data.tasks.len(),
            reps = data.reps,
            "documents loaded"
        );

        shutdown_signal().await;
        info!(service = "pomostate", event = "shutdown_signal", %service_id, pid, "shutting down; flushing documents");

        let report = registry.flush_all().await;
        if report.failed > 0 {
            error!(service = "pomostate", event = "stop", failed = report.failed, "stopped with unsaved documents");
            ExitCode::FAILURE
        } else {
            info!(service = "pomostate", event = "stop", %service_id, pid, "stopped normally");
            ExitCode::SUCCESS
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
