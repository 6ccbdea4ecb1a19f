//! Server crate for the ReelRecs similarity recommender.
//!
//! This crate contains the orchestrator that combines the recommender with
//! poster lookups, and the environment-driven application configuration.

pub mod config;
pub mod orchestrator;

pub use config::AppConfig;
pub use orchestrator::{MovieRecommendation, RecommendationOrchestrator};
