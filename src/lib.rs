//! Episode Harvester Library
//!
//! This library implements a season-scoped episode acquisition and
//! normalization pipeline: source adapters pull raw episode-like records
//! from a structured metadata API, an enrichment API, scraped content
//! pages, or pasted text; the normalizer coerces them into canonical
//! episode records; the assembler sorts, deduplicates, and finalizes the
//! season result; and the orchestrator drives the whole chain with
//! graceful fallback.

pub mod adapters;
pub mod assembler;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod routes;
