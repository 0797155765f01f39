pub mod access;
pub mod app;
pub mod authz;
pub mod db;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod session;
pub mod utils;

// Re-export commonly used items for tests
pub use app::create_app;
