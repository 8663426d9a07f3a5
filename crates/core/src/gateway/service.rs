//! Gateway orchestrator
//!
//! Per call: cache lookup, failover walk over the resolved candidates, then
//! cache/availability updates on success or a degraded substitute once every
//! candidate failed.

use std::sync::Arc;

use backoffice_common::cache::CacheStats;
use backoffice_common::{Clock, SystemClock};
use backoffice_domain::{
    AvailabilityStatus, DegradedNotice, EndpointCandidate, GatewayConfig, GatewayError,
    GatewayResponse, MutationOutcome, Operation, Payload, PendingSyntheticMutation,
    ReplayReport, ResourceFamily, Result,
};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn, Instrument};
use uuid::Uuid;

use super::ports::RequestExecutor;
use super::resolver::EndpointResolver;
use crate::availability::{AvailabilityListener, AvailabilityTracker};
use crate::cache::{cache_key, ResponseCache};
use crate::fallback::FallbackSynthesizer;
use crate::offline::OfflineStore;
use crate::translation::{Direction, VocabularyRegistry};

/// Result of walking a family's candidates for one operation
#[derive(Debug)]
enum WalkOutcome {
    Success { payload: Payload, address: String },
    /// At least one candidate rejected the request and none succeeded
    Rejected(GatewayError),
    /// Every candidate failed with a transport or server error
    Exhausted { attempts: usize },
}

/// Whether a walk may downgrade the family's availability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracking {
    Full,
    SuccessOnly,
}

/// Resilient data-access gateway
///
/// Shared by every domain service. Calls run concurrently; each owns its
/// failover walk. Replay drains run as their own tasks so a caller that stops
/// waiting never interrupts one halfway through the queue.
pub struct Gateway<C: Clock + Clone = SystemClock> {
    shared: Arc<Shared<C>>,
}

/// State reachable from both callers and detached replay drains
struct Shared<C: Clock + Clone> {
    config: GatewayConfig,
    executor: Arc<dyn RequestExecutor>,
    store: Arc<dyn OfflineStore>,
    resolver: EndpointResolver<C>,
    cache: ResponseCache<C>,
    tracker: AvailabilityTracker<C>,
    synthesizer: FallbackSynthesizer<C>,
    vocabularies: VocabularyRegistry,
    replay_guards: DashMap<ResourceFamily, Arc<Mutex<()>>>,
}

impl Gateway<SystemClock> {
    /// # Errors
    /// `GatewayError::Config` when the configuration or a vocabulary is
    /// invalid.
    pub fn new(
        config: GatewayConfig,
        executor: Arc<dyn RequestExecutor>,
        store: Arc<dyn OfflineStore>,
    ) -> Result<Self> {
        Self::with_clock(config, executor, store, SystemClock)
    }
}

impl<C: Clock + Clone> Gateway<C> {
    /// Create a gateway driven by a custom clock (useful for testing)
    ///
    /// # Errors
    /// `GatewayError::Config` when the configuration or a vocabulary is
    /// invalid.
    pub fn with_clock(
        config: GatewayConfig,
        executor: Arc<dyn RequestExecutor>,
        store: Arc<dyn OfflineStore>,
        clock: C,
    ) -> Result<Self> {
        config.validate()?;
        let vocabularies = VocabularyRegistry::from_config(&config)?;

        let shared = Shared {
            resolver: EndpointResolver::from_config(&config, clock.clone()),
            cache: ResponseCache::new(config.cache.max_entries, clock.clone()),
            tracker: AvailabilityTracker::new(clock.clone()),
            synthesizer: FallbackSynthesizer::new(Arc::clone(&store), clock),
            vocabularies,
            executor,
            store,
            config,
            replay_guards: DashMap::new(),
        };
        Ok(Self { shared: Arc::new(shared) })
    }

    /// Notify `listener` on transitions into and out of UNAVAILABLE
    #[must_use]
    pub fn with_listener(self, listener: Arc<dyn AvailabilityListener>) -> Self {
        self.shared.tracker.set_listener(listener);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.shared.config
    }

    /// Read a resource.
    ///
    /// Returns live or cached data when possible. When every candidate
    /// failed, returns stale cache data or synthetic data tagged degraded and
    /// carrying `AllCandidatesExhausted`.
    ///
    /// # Errors
    /// `ClientRejected` when a candidate rejected the request and none
    /// succeeded; `Config` when `operation` is a mutation.
    #[instrument(skip(self, operation), fields(family = %family, method = %operation.method, path = %operation.path))]
    pub async fn fetch(&self, family: &ResourceFamily, operation: Operation) -> Result<GatewayResponse> {
        if operation.is_mutation() {
            return Err(GatewayError::Config(format!(
                "{} {} is a mutation, use submit",
                operation.method, operation.path
            )));
        }

        let shared = &self.shared;
        let key = cache_key(family, &operation);
        if let Some(payload) = key.as_deref().and_then(|key| shared.cache.get(key)) {
            return Ok(GatewayResponse::cached(payload));
        }

        match shared.walk(family, &operation, Tracking::Full).await {
            WalkOutcome::Success { mut payload, address } => {
                shared.translate(family, &mut payload, Direction::ToExternal);
                if let Some(key) = key {
                    shared.cache.put(
                        key,
                        payload.clone(),
                        shared.config.read_ttl(family),
                        shared.config.extended_ttl(family),
                    );
                }
                self.replay_after_contact(family).await;
                Ok(GatewayResponse::live(payload, address))
            }
            WalkOutcome::Rejected(error) => Err(error),
            WalkOutcome::Exhausted { attempts } => {
                let failure =
                    GatewayError::AllCandidatesExhausted { family: family.to_string(), attempts };

                if let Some((mut payload, _)) =
                    key.as_deref().and_then(|key| shared.cache.get_extended(key))
                {
                    warn!(family = %family, "serving stale cache entry");
                    shared.hide_deleted(family, &mut payload).await;
                    return Ok(GatewayResponse::stale(payload, failure));
                }

                let mut payload = shared.synthesizer.synthesize(family, &operation);
                shared.translate(family, &mut payload, Direction::ToExternal);
                shared.hide_deleted(family, &mut payload).await;
                Ok(GatewayResponse::synthetic(payload, failure))
            }
        }
    }

    /// `fetch` that gives up with `Cancelled` as soon as `token` fires.
    /// A walk in flight is dropped and its result discarded. A replay drain
    /// the fetch already started keeps running to completion.
    ///
    /// # Errors
    /// `Cancelled`, or any error `fetch` returns.
    pub async fn fetch_cancellable(
        &self,
        family: &ResourceFamily,
        operation: Operation,
        token: &CancellationToken,
    ) -> Result<GatewayResponse> {
        if token.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }
        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(family = %family, "fetch cancelled by caller");
                Err(GatewayError::Cancelled)
            }
            result = self.fetch(family, operation) => result,
        }
    }

    /// Apply a mutation.
    ///
    /// Status fields in the body are translated to persistence codes first.
    /// On success the family's cache namespace is invalidated. When every
    /// candidate failed the mutation is queued durably and `Queued` is
    /// returned.
    ///
    /// # Errors
    /// `ClientRejected` when a candidate rejected the mutation and none
    /// succeeded; `Persistence` when it could not be queued; `Config` when
    /// `operation` is a read.
    #[instrument(skip(self, operation), fields(family = %family, method = %operation.method, path = %operation.path))]
    pub async fn submit(&self, family: &ResourceFamily, mut operation: Operation) -> Result<MutationOutcome> {
        if !operation.is_mutation() {
            return Err(GatewayError::Config(format!(
                "{} {} is not a mutation, use fetch",
                operation.method, operation.path
            )));
        }
        let shared = &self.shared;
        if let Some(body) = operation.body.as_mut() {
            shared.vocabularies.translate(family, body, Direction::ToInternal);
        }

        match shared.walk(family, &operation, Tracking::Full).await {
            WalkOutcome::Success { mut payload, address } => {
                shared.cache.invalidate_family(family);
                shared.translate(family, &mut payload, Direction::ToExternal);
                self.replay_after_contact(family).await;
                Ok(MutationOutcome::Applied { payload, address })
            }
            WalkOutcome::Rejected(error) => Err(error),
            WalkOutcome::Exhausted { .. } => {
                let mutation = shared.synthesizer.enqueue_mutation(family, operation).await?;
                Ok(MutationOutcome::Queued {
                    mutation_id: mutation.id,
                    notice: format!(
                        "{} change accepted, pending synchronization",
                        family.as_str().replace('_', " ")
                    ),
                })
            }
        }
    }

    /// Replay a family's pending mutations in enqueue order.
    ///
    /// Each item is independent: a success removes it, and a rejection or any
    /// other failure leaves it queued. A drain already running for the family
    /// makes this call return a report with `skipped` set. The drain runs as
    /// its own task; dropping this future detaches it instead of stopping it.
    ///
    /// # Errors
    /// Offline store failures.
    pub async fn replay_pending(&self, family: &ResourceFamily) -> Result<ReplayReport> {
        let shared = Arc::clone(&self.shared);
        let family = family.clone();
        let drain = tokio::spawn(async move { shared.replay(&family).await }.in_current_span());

        match drain.await {
            Ok(result) => result,
            Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
            Err(_) => Err(GatewayError::Cancelled),
        }
    }

    /// Replay every family that has pending mutations
    ///
    /// # Errors
    /// Offline store failures.
    pub async fn replay_all(&self) -> Result<Vec<ReplayReport>> {
        let mut reports = Vec::new();
        for family in self.shared.store.families_with_pending().await? {
            reports.push(self.replay_pending(&family).await?);
        }
        Ok(reports)
    }

    /// Remove a pending mutation without replaying it, returning it if it
    /// was still queued. Its offline deletion, if any, goes with it.
    ///
    /// # Errors
    /// Offline store failures.
    #[instrument(skip(self))]
    pub async fn discard_pending(&self, id: Uuid) -> Result<Option<PendingSyntheticMutation>> {
        let discarded = self.shared.store.settle(id).await?;
        match &discarded {
            Some(mutation) => info!(family = %mutation.family, "pending mutation discarded"),
            None => debug!("no pending mutation with that id"),
        }
        Ok(discarded)
    }

    pub fn availability(&self, family: &ResourceFamily) -> AvailabilityStatus {
        self.shared.tracker.status(family)
    }

    /// Availability of every family called so far
    pub fn availability_snapshot(&self) -> Vec<(ResourceFamily, AvailabilityStatus)> {
        self.shared.tracker.snapshot()
    }

    /// One notice per family currently UNAVAILABLE
    pub fn degraded_notices(&self) -> Vec<DegradedNotice> {
        self.shared.tracker.notices()
    }

    /// # Errors
    /// Offline store failures.
    pub async fn pending_mutations(&self, family: &ResourceFamily) -> Result<Vec<PendingSyntheticMutation>> {
        self.shared.store.pending(family).await
    }

    /// # Errors
    /// Offline store failures.
    pub async fn families_with_pending(&self) -> Result<Vec<ResourceFamily>> {
        self.shared.store.families_with_pending().await
    }

    /// Candidate order the next call for `family` will use
    pub fn candidates(&self, family: &ResourceFamily) -> Vec<EndpointCandidate> {
        self.shared.resolver.resolve(family)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.shared.cache.stats()
    }

    async fn replay_after_contact(&self, family: &ResourceFamily) {
        if let Err(error) = self.replay_pending(family).await {
            warn!(family = %family, error = %error, "replay of pending mutations failed");
        }
    }
}

impl<C: Clock + Clone> Shared<C> {
    #[instrument(skip(self), fields(family = %family))]
    async fn replay(&self, family: &ResourceFamily) -> Result<ReplayReport> {
        let guard = Arc::clone(&self.replay_guards.entry(family.clone()).or_default());
        let Ok(_drain) = guard.try_lock() else {
            debug!(family = %family, "replay already in progress");
            return Ok(ReplayReport { skipped: true, ..ReplayReport::for_family(family.clone()) });
        };

        let mut report = ReplayReport::for_family(family.clone());
        let pending = self.store.pending(family).await?;
        if pending.is_empty() {
            return Ok(report);
        }
        info!(family = %family, count = pending.len(), "replaying pending mutations");

        for mutation in pending {
            match self.walk(family, &mutation.operation, Tracking::SuccessOnly).await {
                WalkOutcome::Success { address, .. } => {
                    self.store.settle(mutation.id).await?;
                    debug!(mutation_id = %mutation.id, address = %address, "replayed mutation");
                    report.replayed.push(mutation.id);
                }
                WalkOutcome::Rejected(error) => {
                    warn!(
                        mutation_id = %mutation.id,
                        error = %error,
                        "pending mutation rejected by backend, left queued"
                    );
                    report.rejected.push(mutation.id);
                }
                WalkOutcome::Exhausted { .. } => report.deferred.push(mutation.id),
            }
        }

        if !report.replayed.is_empty() {
            self.cache.invalidate_family(family);
        }
        info!(
            family = %family,
            replayed = report.replayed.len(),
            deferred = report.deferred.len(),
            rejected = report.rejected.len(),
            "replay finished"
        );
        Ok(report)
    }

    async fn walk(&self, family: &ResourceFamily, operation: &Operation, tracking: Tracking) -> WalkOutcome {
        let ticket = self.tracker.ticket(family);
        let candidates = self.resolver.resolve(family);
        let deadline = self
            .config
            .walk_deadline()
            .map(|limit| (limit, tokio::time::Instant::now() + limit));

        let mut attempts = 0;
        let mut rejection: Option<GatewayError> = None;
        let mut last_error: Option<GatewayError> = None;

        for candidate in &candidates {
            attempts += 1;
            let execution = self.executor.execute(candidate, operation);
            let result = match deadline {
                Some((limit, at)) => tokio::time::timeout_at(at, execution)
                    .await
                    .unwrap_or(Err(GatewayError::Timeout(limit))),
                None => execution.await,
            };

            match result {
                Ok(payload) => {
                    self.resolver.report_outcome(family, &candidate.address, true);
                    self.tracker.record_success(family);
                    info!(family = %family, address = %candidate.address, attempts, "operation succeeded");
                    return WalkOutcome::Success { payload, address: candidate.address.clone() };
                }
                Err(error @ GatewayError::ClientRejected { .. }) => {
                    self.resolver.report_outcome(family, &candidate.address, false);
                    warn!(family = %family, address = %candidate.address, error = %error, "candidate rejected request");
                    if rejection.is_none() {
                        rejection = Some(error);
                    }
                }
                Err(error) => {
                    self.resolver.report_outcome(family, &candidate.address, false);
                    warn!(family = %family, address = %candidate.address, error = %error, "candidate failed");
                    if tracking == Tracking::Full {
                        self.tracker.record_degraded(&ticket, &format!("{}: {error}", candidate.address));
                    }
                    let deadline_hit = matches!(error, GatewayError::Timeout(_))
                        && deadline.is_some_and(|(_, at)| tokio::time::Instant::now() >= at);
                    last_error = Some(error);
                    if deadline_hit {
                        warn!(family = %family, "walk deadline expired");
                        break;
                    }
                }
            }
        }

        if let Some(error) = rejection {
            return WalkOutcome::Rejected(error);
        }

        if tracking == Tracking::Full {
            let reason = match &last_error {
                Some(error) => format!("all {attempts} candidate(s) failed, last error: {error}"),
                None => "no candidate answered".to_string(),
            };
            self.tracker.record_unavailable(&ticket, &reason);
        }
        WalkOutcome::Exhausted { attempts }
    }

    fn translate(&self, family: &ResourceFamily, payload: &mut Payload, direction: Direction) {
        if let Some(value) = payload.as_json_mut() {
            self.vocabularies.translate(family, value, direction);
        }
    }

    async fn hide_deleted(&self, family: &ResourceFamily, payload: &mut Payload) {
        if let Err(error) = self.synthesizer.hide_deleted(family, payload).await {
            warn!(family = %family, error = %error, "could not read offline deletions");
        }
    }
}
