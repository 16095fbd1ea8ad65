//! Résumé scoring core: section detection, industry and seniority
//! classification, weighted quality scoring, recommendations and an
//! append-only score history with trend and benchmark analytics.

pub mod config;
pub mod db;
pub mod errors;
pub mod history;
pub mod models;
pub mod scoring;
pub mod service;
