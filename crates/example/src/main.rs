//! Example admin shell CLI.
//!
//! Opens the shell, shows the company logo in every region, optionally uploads
//! a new logo, then logs out.
//!
//! # Usage
//!
//! ```bash
//! logo [image_path]
//! ```
//!
//! # Environment
//!
//! - `SIGNET_API_URL`: backend origin (default `https://codebyz.online`)
//! - `SIGNET_HTTP_TIMEOUT_SECS`: per-request timeout
//! - `SIGNET_ACCESS_TOKEN`: bearer token of a signed-in administrator
//! - `SIGNET_LOG`, `SIGNET_LOG_FORMAT`: log filter and format
//!
//! # Example
//!
//! ```bash
//! SIGNET_LOG=signet_cache=debug logo ./brand.png
//! ```

use example::{AdminShell, ShellError};
use signet_core::LoggingConfig;
use signet_remote::{HttpClientConfig, Upload};
use signet_session::{AuthState, Session};
use std::process::ExitCode;
use std::sync::Arc;

/// Environment variable holding the administrator's access token.
const ACCESS_TOKEN_ENV: &str = "SIGNET_ACCESS_TOKEN";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    match LoggingConfig::from_env() {
        Ok(config) => {
            config.init();
        }
        Err(error) => {
            LoggingConfig::default().init();
            tracing::warn!(error = %error, "falling back to default logging");
        }
    }

    match run(std::env::args().nth(1)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "logo demo failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(upload_path: Option<String>) -> Result<(), ShellError> {
    let session = Arc::new(Session::in_memory());
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        session.set_auth(AuthState {
            access_token: Some(token),
            ..AuthState::default()
        });
    }

    let shell = AdminShell::connect(HttpClientConfig::from_env()?, Arc::clone(&session))?;

    let logo = shell.load().await?;
    if logo.has_image() {
        tracing::info!(url = %logo.img_url, name = %logo.img_name, size = %logo.size_label(), "logo loaded");
    } else {
        tracing::info!("no logo uploaded yet");
    }

    if let Some(path) = upload_path {
        let upload = Upload::from_path(&path).await?;
        let stored = shell.upload(upload).await?;
        tracing::info!(url = %stored.img_url, "logo uploaded");
    }

    for region in shell.regions() {
        let url = region.current().map(|logo| logo.img_url.clone()).unwrap_or_default();
        tracing::info!(region = region.region(), version = region.version(), url = %url, "region");
    }

    shell.logout();
    Ok(())
}
