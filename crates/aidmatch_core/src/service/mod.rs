//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, geocoder and audit collaborators into the matching
//!   workflow: resolve coordinates, split compound requests, sample
//!   outreach candidates.
//! - Keep callers decoupled from storage and provider details.
//!
//! # Invariants
//! - Sub-steps of one call run strictly in order; no step starts before the
//!   previous one has succeeded or failed.
//! - No retries, no cancellation, no locks around multi-step sequences.

pub mod coordinate_resolver;
pub mod request_service;
pub mod request_splitter;
pub mod volunteer_sampler;
pub mod volunteer_service;
