//! acquire → use → release on every path.
//!
//! Operations acquire one connection, run their body to a `Result`, and hand
//! the connection back through [`release_quietly`] before returning that
//! result. A failing release is logged and never replaces the body's outcome.

use crate::pool::provider::Connection;
use tracing::{debug, error};

pub async fn release_quietly(conn: Box<dyn Connection>, operation: &str) {
    match conn.release().await {
        Ok(()) => debug!("Released connection after {}", operation),
        Err(e) => error!("Error closing connection after {}: {}", operation, e),
    }
}
