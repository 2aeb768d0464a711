//! Orders service: HTTP/JSON CRUD over Order/Item aggregates stored in PostgreSQL.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod health;
pub mod metrics;
