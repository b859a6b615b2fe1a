//! Web server for eduboard.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::course::Reconciler;
use crate::{EduboardError, Result};

use super::handlers::AppState;
use super::router::{create_files_router, create_router_with_limit, create_static_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Full configuration.
    config: Config,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .map_err(|e| {
                EduboardError::Config(format!(
                    "invalid web address {}:{}: {e}",
                    config.web.host, config.web.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            config: config.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(&self) -> Router {
        let mut router = create_router_with_limit(
            self.app_state.clone(),
            &self.config.web.cors_origins,
            self.config.web.body_limit_mb * 1024 * 1024,
        )
        .merge(create_files_router(
            &self.config.uploads.storage_path,
            &self.config.uploads.public_prefix,
        ));

        if let Some(dir) = &self.config.web.static_dir {
            if let Some(static_router) = create_static_router(dir) {
                router = router.merge(static_router);
            }
        }

        router
    }

    /// Start the entry-index reconciliation background task.
    ///
    /// Runs every `interval_secs` and repairs orphan entries and dangling
    /// index references left behind by interrupted writes.
    fn start_reconcile_task(reconciler: Reconciler, interval_secs: u64) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match reconciler.reconcile_all().await {
                    Ok(reports) => {
                        let repaired = reports.iter().filter(|r| !r.is_clean()).count();
                        if repaired > 0 {
                            tracing::info!(
                                repaired_courses = repaired,
                                checked_courses = reports.len(),
                                "Repaired course entry indexes"
                            );
                        } else {
                            tracing::debug!(
                                checked_courses = reports.len(),
                                "Course entry indexes consistent"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to reconcile course entry indexes");
                    }
                }
            }
        });
    }

    async fn bind(self) -> std::io::Result<(TcpListener, Router)> {
        let router = self.build_router();
        let listener = TcpListener::bind(self.addr).await?;

        let interval_secs = self.config.reconcile.interval_secs;
        if interval_secs > 0 {
            Self::start_reconcile_task(self.app_state.reconciler.clone(), interval_secs);
            tracing::info!(interval_secs, "Reconciliation task started");
        }

        tracing::info!("Web server listening on http://{}", listener.local_addr()?);
        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
