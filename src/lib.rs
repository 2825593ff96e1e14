pub mod backend;
pub mod cli;
pub mod document;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

pub use error::AppError;
pub use state::AppState;
