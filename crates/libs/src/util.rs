use std::{io, path::PathBuf, sync::Arc};

use tokio::sync::Notify;

/// Waits for Ctrl-C or SIGTERM, then wakes every task parked on `notify`.
#[cfg(unix)]
pub async fn listen_for_shutdown(notify: Arc<Notify>) {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
            }
        }
        Err(e) => {
            tracing::warn!("cannot install SIGTERM handler, falling back to ctrl-c: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }

    tracing::info!("shutdown signal received – starting graceful shutdown");
    notify.notify_waiters();
}

#[cfg(not(unix))]
pub async fn listen_for_shutdown(notify: Arc<Notify>) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received – starting graceful shutdown");
    notify.notify_waiters();
}

/// Per-user config directory for `app`, created if missing.
pub fn get_config_dir(app: &str) -> io::Result<PathBuf> {
    let mut config_dir = dirs::config_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no config directory on this platform")
    })?;
    config_dir.push(app);
    std::fs::create_dir_all(&config_dir)?;
    Ok(config_dir)
}
