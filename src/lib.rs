//! Lead Outreach API Library
//!
//! Finds prospective leads through a people-search provider, merges the
//! search, enrichment and reveal records into canonical leads, and runs the
//! outreach steps (message generation, CRM upsert, scoring, SMTP delivery).
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `crm_client`: CRM contact upsert (HubSpot).
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and shared state.
//! - `models`: Provider records, canonical lead and API payloads.
//! - `normalization`: Pure field resolution and merge logic.
//! - `outreach`: Message generation, scoring and mail delivery.
//! - `pipeline`: Lead search orchestration.
//! - `routes`: Router and OpenAPI document.
//! - `services`: People search and enrichment client (Apollo).
//! - `validation`: Input validation helpers.

pub mod config;
pub mod crm_client;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalization;
pub mod outreach;
pub mod pipeline;
pub mod routes;
pub mod services;
pub mod validation;
