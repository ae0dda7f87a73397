//! Bounded random selection of outreach candidates.
//!
//! # Invariants
//! - Only volunteers eligible for the task can be drawn.
//! - At most `max_count` distinct volunteers are returned, drawn uniformly
//!   without replacement.
//! - Randomness comes from an injected `CryptoRng`; there is no hidden
//!   global generator.

use crate::model::volunteer::Volunteer;
use crate::taxonomy::Task;
use log::debug;
use rand::rngs::OsRng;
use rand::seq::index;
use rand::{CryptoRng, RngCore};

/// Draws outreach candidates using a cryptographically secure generator.
pub struct VolunteerSampler<R> {
    rng: R,
}

impl VolunteerSampler<OsRng> {
    /// Sampler backed by the operating system's entropy source.
    pub fn from_os() -> Self {
        Self::new(OsRng)
    }
}

impl Default for VolunteerSampler<OsRng> {
    fn default() -> Self {
        Self::from_os()
    }
}

impl<R: RngCore + CryptoRng> VolunteerSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns up to `max_count` distinct volunteers from `pool` that match
    /// `task`. Order carries no meaning.
    pub fn sample(&mut self, task: &Task, pool: &[Volunteer], max_count: usize) -> Vec<Volunteer> {
        let eligible: Vec<&Volunteer> = pool
            .iter()
            .filter(|volunteer| task.matches(volunteer))
            .collect();
        let amount = max_count.min(eligible.len());

        debug!(
            "event=volunteer_sample module=sampler status=ok task={} pool={} eligible={} drawn={amount}",
            task.id(),
            pool.len(),
            eligible.len()
        );
        if amount == 0 {
            return Vec::new();
        }

        index::sample(&mut self.rng, eligible.len(), amount)
            .into_iter()
            .map(|position| eligible[position].clone())
            .collect()
    }
}
