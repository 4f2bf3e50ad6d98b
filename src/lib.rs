//! # Impact Directory Library
//!
//! Core of the social-impact organization directory: the submission review
//! workflow, its persistence and the HTTP API in front of it.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub mod workflow;
pub use migration;
