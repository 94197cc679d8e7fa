//! CineMatch HTTP API.
//!
//! Exposes the refinement pipeline over three routes: a banner at `/`, a
//! health probe at `/health` and `POST /recommend`.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerArgs;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::AppState;
