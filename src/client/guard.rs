use tracing::{debug, info, warn};

use super::{network_error_message, ApiClient, TokenStore};
use crate::model::User;

#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// The stored token was accepted; render the protected view.
    Authenticated(User),
    /// No token, or the server rejected it. The store has been cleared.
    RedirectToLogin { notice: Option<String> },
    /// The server could not be reached. The token is kept.
    Unavailable { notice: String },
}

/// Decides whether a protected view may render, only after the stored
/// token has been validated against `/auth/current-user`.
pub struct RouteGuard<'a> {
    client: &'a ApiClient,
    store: &'a dyn TokenStore,
}

impl<'a> RouteGuard<'a> {
    pub fn new(client: &'a ApiClient, store: &'a dyn TokenStore) -> Self {
        Self { client, store }
    }

    pub async fn check(&self) -> GuardOutcome {
        let Some(token) = self.store.token() else {
            debug!("no stored token");
            return GuardOutcome::RedirectToLogin { notice: None };
        };

        match self.client.current_user(&token).await {
            Ok(user) => {
                debug!(user_id = %user.id, role = %user.role, "session validated");
                GuardOutcome::Authenticated(user)
            }
            Err(e) if e.is_rejection() => {
                info!(error = %e, "stored token rejected, clearing session");
                if let Err(io) = self.store.clear() {
                    warn!(error = %io, "failed to clear token store");
                }
                GuardOutcome::RedirectToLogin {
                    notice: Some(e.to_string()),
                }
            }
            Err(e) => {
                warn!(error = %e, "could not validate session");
                GuardOutcome::Unavailable {
                    notice: network_error_message(&e, self.client.base_url()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::MemoryTokenStore,
        model::Role,
        test_support::{bearer, closed_port_url, seed_user, spawn_server, test_app},
    };

    #[tokio::test]
    async fn valid_token_is_authenticated() {
        let (app, state) = test_app();
        let donor = seed_user(&state, Role::Donar, "ana@x.io").await;
        let store = MemoryTokenStore::with_token(bearer(&state, &donor));
        let client = ApiClient::new(spawn_server(app).await).unwrap();

        match RouteGuard::new(&client, &store).check().await {
            GuardOutcome::Authenticated(user) => assert_eq!(user.id, donor.id),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(store.token().is_some());
    }

    #[tokio::test]
    async fn missing_token_redirects_without_notice() {
        let (app, _) = test_app();
        let client = ApiClient::new(spawn_server(app).await).unwrap();
        let store = MemoryTokenStore::default();

        assert_eq!(
            RouteGuard::new(&client, &store).check().await,
            GuardOutcome::RedirectToLogin { notice: None }
        );
    }

    #[tokio::test]
    async fn rejected_token_clears_store() {
        let (app, _) = test_app();
        let client = ApiClient::new(spawn_server(app).await).unwrap();
        let store = MemoryTokenStore::with_token("not-a-jwt");

        let outcome = RouteGuard::new(&client, &store).check().await;
        assert!(matches!(
            outcome,
            GuardOutcome::RedirectToLogin { notice: Some(_) }
        ));
        assert_eq!(store.token(), None);
    }

    #[tokio::test]
    async fn deleted_user_is_a_rejection() {
        let (app, state) = test_app();
        let donor = seed_user(&state, Role::Donar, "gone@x.io").await;
        let store = MemoryTokenStore::with_token(bearer(&state, &donor));
        state.store.delete_user(donor.id).await.unwrap();
        let client = ApiClient::new(spawn_server(app).await).unwrap();

        let outcome = RouteGuard::new(&client, &store).check().await;
        assert!(matches!(outcome, GuardOutcome::RedirectToLogin { .. }));
        assert_eq!(store.token(), None);
    }

    #[tokio::test]
    async fn unreachable_server_keeps_token() {
        let base = closed_port_url().await;
        let client = ApiClient::new(base.clone()).unwrap();
        let store = MemoryTokenStore::with_token("still-valid");

        match RouteGuard::new(&client, &store).check().await {
            GuardOutcome::Unavailable { notice } => assert!(notice.contains(&base)),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(store.token().as_deref(), Some("still-valid"));
    }
}
