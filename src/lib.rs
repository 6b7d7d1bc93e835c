//! Social movie-catalog backend: a catalog store, an interaction & ranking
//! engine over likes, friendships and reviews, and a thin axum HTTP layer.

pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::{create_router, AppState};
