//! # Timetable API Library
//!
//! Core functionality for the university timetable service: the entity
//! store, token authentication, HTTP handlers and server wiring.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;
