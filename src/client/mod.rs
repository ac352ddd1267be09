//! HTTP client side of the API: what a front end needs to gate protected
//! views on a validated session and to load listing pages.

mod api;
mod error;
mod guard;
mod listing;
mod server_check;
mod session;
mod token_store;

pub use api::ApiClient;
pub use error::ClientError;
pub use guard::{GuardOutcome, RouteGuard};
pub use listing::Listing;
pub use server_check::{check_server_connection, network_error_message, candidate_urls};
pub use session::{sign_in, SignInError};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
