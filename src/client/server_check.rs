use std::time::Duration;

use tracing::{error, info, warn};

use super::ClientError;

pub const CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Endpoints tried in order when checking that the API is up.
pub fn candidate_urls(base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    vec![format!("{base}/health"), format!("{base}/api/v1/test")]
}

/// Returns true as soon as one candidate answers with a 2xx.
pub async fn check_server_connection(urls: &[String]) -> bool {
    let http = match reqwest::Client::builder().timeout(CHECK_TIMEOUT).build() {
        Ok(http) => http,
        Err(e) => {
            error!(error = %e, "failed to build connectivity client");
            return false;
        }
    };

    for url in urls {
        match http.get(url).send().await {
            Ok(res) if res.status().is_success() => {
                info!(%url, "server reachable");
                return true;
            }
            Ok(res) => warn!(%url, status = %res.status(), "connectivity check got error status"),
            Err(e) => warn!(%url, error = %e, "connectivity check failed"),
        }
    }
    error!("server connection check failed on every endpoint");
    false
}

/// Human-readable notice for a failed request.
pub fn network_error_message(err: &ClientError, base_url: &str) -> String {
    match err {
        ClientError::Unreachable(e) if e.is_timeout() => {
            "Request timeout - server is taking too long to respond".into()
        }
        ClientError::Unreachable(_) => format!(
            "Cannot connect to server at {base_url}. Please check that the server is running."
        ),
        ClientError::Unauthenticated(_) => "Session expired. Please log in again.".into(),
        ClientError::Server { status, message } if *status >= 500 => {
            format!("Server error: {message}")
        }
        other => other.to_string(),
    }
}
