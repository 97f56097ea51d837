//! Triager - feedback triage service
//!
//! Fetches feedback tickets from Jira (or a built-in sample set), converts
//! each into a structured user story and a product-manager response via a
//! language model, and exposes progress through a polling REST API.

pub mod api;
pub mod config;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod rest;
pub mod workflow;
