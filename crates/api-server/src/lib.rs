//! REST surface for the merchant dashboard backend.

pub mod feed;
pub mod rest;
pub mod server;

pub use feed::SuggestionFeed;
pub use rest::AppState;
pub use server::ApiServer;
