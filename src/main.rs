use schoold::{config, ipc};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn init_tracing(default_filter: &str) {
    let filter = std::env::var("SCHOOLD_LOG")
        .ok()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter));
    // stdout carries responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = config::load_from_env()?;
    init_tracing(&config.log_filter);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "schoold ready");

    let mut state = ipc::AppState { config };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("stdin closed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to echo back.
                let resp = ipc::respond("", Err(ipc::HandlerErr::bad_json(&e)));
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        tracing::debug!(id = %req.id, method = %req.method, "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(stdout, "{}", resp);
        let _ = stdout.flush();
    }
    Ok(())
}
