pub mod accesses;
pub mod alerts;
pub mod dashboard;
pub mod documents;
pub mod health;
