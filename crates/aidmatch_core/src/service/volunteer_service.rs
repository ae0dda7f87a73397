//! Volunteer use-case service.
//!
//! # Responsibility
//! - Expose coordinate resolution for volunteer rows.
//! - Collect eligible active volunteers and draw a bounded outreach sample.

use super::coordinate_resolver::{CoordinateResolver, ResolveResult};
use super::volunteer_sampler::VolunteerSampler;
use crate::audit::AuditSink;
use crate::config::DispatchConfig;
use crate::geo::Geocoder;
use crate::model::record::fields;
use crate::model::volunteer::Volunteer;
use crate::store::{
    for_each_page, PageControl, RecordFilter, RecordStore, SelectQuery, StoreError, StoreResult,
};
use crate::taxonomy::{Task, TaskCatalog};
use log::info;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

/// Catalog label of the loneliness task.
pub const LONELINESS_TASK: &str = "Loneliness";
/// Upper bound on volunteers contacted for one loneliness request.
pub const LONELINESS_SAMPLE_SIZE: usize = 10;

#[derive(Debug)]
pub enum OutreachError {
    /// The catalog in use has no task with this label.
    TaskNotInCatalog(String),
    Store(StoreError),
}

impl Display for OutreachError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotInCatalog(label) => write!(f, "task not in catalog: {label}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OutreachError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TaskNotInCatalog(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for OutreachError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Service over the volunteers table.
pub struct VolunteerService<S, G, A, R = OsRng> {
    store: S,
    resolver: CoordinateResolver<G, S, A>,
    sampler: Mutex<VolunteerSampler<R>>,
    catalog: Arc<TaskCatalog>,
    config: Arc<DispatchConfig>,
}

impl<S, G, A, R> VolunteerService<S, G, A, R>
where
    S: RecordStore + Clone,
    G: Geocoder,
    A: AuditSink,
    R: RngCore + CryptoRng,
{
    /// `store` must be scoped to the volunteers table.
    pub fn new(
        store: S,
        geocoder: G,
        audit: A,
        sampler: VolunteerSampler<R>,
        catalog: Arc<TaskCatalog>,
        config: Arc<DispatchConfig>,
    ) -> Self {
        Self {
            resolver: CoordinateResolver::new(geocoder, store.clone(), audit, Arc::clone(&config)),
            store,
            sampler: Mutex::new(sampler),
            catalog,
            config,
        }
    }

    /// See [`CoordinateResolver::resolve`].
    pub async fn resolve_coordinates(&self, volunteer: Volunteer) -> ResolveResult<Volunteer> {
        self.resolver.resolve(volunteer).await
    }

    /// Active volunteers of the volunteers view that can take on `task`.
    pub async fn eligible_volunteers(&self, task: &Task) -> StoreResult<Vec<Volunteer>> {
        let query = SelectQuery::view(self.config.volunteers_view.as_str())
            .with_filter(RecordFilter::field_not_true(fields::ACCOUNT_DISABLED));

        let mut eligible = Vec::new();
        for_each_page(&self.store, &query, |records| {
            eligible.extend(
                records
                    .into_iter()
                    .map(Volunteer::new)
                    .filter(|volunteer| task.matches(volunteer)),
            );
            PageControl::NextPage
        })
        .await?;
        Ok(eligible)
    }

    /// Draws at most `max_count` eligible active volunteers for `task`.
    pub async fn find_outreach_candidates(
        &self,
        task: &Task,
        max_count: usize,
    ) -> StoreResult<Vec<Volunteer>> {
        let pool = self.eligible_volunteers(task).await?;
        let drawn = self
            .sampler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sample(task, &pool, max_count);

        info!(
            "event=outreach_sample module=volunteer_service status=ok task={} eligible={} drawn={}",
            task.id(),
            pool.len(),
            drawn.len()
        );
        Ok(drawn)
    }

    /// Up to ten active volunteers able to help with loneliness.
    pub async fn find_volunteers_for_loneliness(&self) -> Result<Vec<Volunteer>, OutreachError> {
        let task = self
            .catalog
            .lookup_by_label(LONELINESS_TASK)
            .cloned()
            .ok_or_else(|| OutreachError::TaskNotInCatalog(LONELINESS_TASK.to_string()))?;
        Ok(self
            .find_outreach_candidates(&task, LONELINESS_SAMPLE_SIZE)
            .await?)
    }
}
