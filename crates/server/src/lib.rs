pub mod config;
pub mod error;
pub mod fetcher;
pub mod routes;
pub mod state;
