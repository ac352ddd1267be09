use std::future::Future;

use tracing::warn;

use super::ClientError;

/// Render state of a list page.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Loading,
    Empty,
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> Listing<T> {
    /// Runs one fetch and settles into a terminal state.
    pub async fn load<F>(fetch: F) -> Self
    where
        F: Future<Output = Result<Vec<T>, ClientError>>,
    {
        match fetch.await {
            Ok(items) if items.is_empty() => Listing::Empty,
            Ok(items) => Listing::Loaded(items),
            Err(e) => {
                warn!(error = %e, "listing fetch failed");
                Listing::Failed(e.to_string())
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Listing::Loading)
    }

    /// Rows to render; empty for every state except `Loaded`.
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Loaded(items) => items,
            _ => &[],
        }
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Listing::Loading
    }
}
