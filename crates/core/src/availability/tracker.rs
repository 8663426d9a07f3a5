//! Per-family availability state machine
//!
//! ```text
//! UNKNOWN ──success──▶ AVAILABLE ──candidate failed──▶ DEGRADED
//!    │                    ▲                                │
//!    │                    └──────────success───────────────┤
//!    └──────────all candidates failed──────────▶ UNAVAILABLE ◀┘
//! ```
//!
//! Nothing here runs on a timer: only a successful call leaves UNAVAILABLE.

use std::sync::Arc;

use backoffice_common::Clock;
use backoffice_domain::{AvailabilityState, AvailabilityStatus, DegradedNotice, ResourceFamily};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{info, warn};

/// Observer for transitions into and out of UNAVAILABLE
pub trait AvailabilityListener: Send + Sync {
    /// The family just became UNAVAILABLE
    fn on_unavailable(&self, notice: &DegradedNotice);

    /// The family left UNAVAILABLE after a successful call
    fn on_recovered(&self, family: &ResourceFamily);
}

/// Snapshot of a family's success generation, taken when a call starts.
///
/// Downgrades carrying a stale ticket are ignored, so a slow failing call
/// cannot overwrite AVAILABLE set by a concurrent successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityTicket {
    family: ResourceFamily,
    generation: u64,
}

impl AvailabilityTicket {
    pub fn family(&self) -> &ResourceFamily {
        &self.family
    }
}

#[derive(Debug, Clone, Default)]
struct FamilyAvailability {
    status: AvailabilityStatus,
    generation: u64,
    notice: Option<DegradedNotice>,
}

enum Transition {
    None,
    Unavailable(DegradedNotice),
    Recovered,
}

/// Shared availability tracker keyed by resource family
pub struct AvailabilityTracker<C: Clock> {
    families: DashMap<ResourceFamily, FamilyAvailability>,
    listener: RwLock<Option<Arc<dyn AvailabilityListener>>>,
    clock: C,
}

impl<C: Clock> AvailabilityTracker<C> {
    pub fn new(clock: C) -> Self {
        Self { families: DashMap::new(), listener: RwLock::new(None), clock }
    }

    #[must_use]
    pub fn with_listener(self, listener: Arc<dyn AvailabilityListener>) -> Self {
        self.set_listener(listener);
        self
    }

    /// Replace the transition listener
    pub fn set_listener(&self, listener: Arc<dyn AvailabilityListener>) {
        *self.listener.write() = Some(listener);
    }

    /// Capture the family's current success generation
    pub fn ticket(&self, family: &ResourceFamily) -> AvailabilityTicket {
        let generation = self.families.get(family).map_or(0, |entry| entry.generation);
        AvailabilityTicket { family: family.clone(), generation }
    }

    /// Current status, UNKNOWN for families never called
    pub fn status(&self, family: &ResourceFamily) -> AvailabilityStatus {
        self.families.get(family).map(|entry| entry.status.clone()).unwrap_or_default()
    }

    /// Every family seen so far, sorted by name
    pub fn snapshot(&self) -> Vec<(ResourceFamily, AvailabilityStatus)> {
        let mut all: Vec<_> = self
            .families
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().status.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Degraded-mode notices, one per UNAVAILABLE family, sorted by family
    pub fn notices(&self) -> Vec<DegradedNotice> {
        let mut notices: Vec<_> =
            self.families.iter().filter_map(|entry| entry.value().notice.clone()).collect();
        notices.sort_by(|a, b| a.family.cmp(&b.family));
        notices
    }

    /// Record a successful call. Always applied; bumps the success
    /// generation and clears the family's notice.
    pub fn record_success(&self, family: &ResourceFamily) {
        let transition = {
            let mut entry = self.families.entry(family.clone()).or_default();
            entry.generation += 1;
            let previous = entry.status.state;
            if previous != AvailabilityState::Available {
                entry.status = AvailabilityStatus {
                    state: AvailabilityState::Available,
                    reason: "last call succeeded".to_string(),
                    last_transition_at: Some(self.clock.utc_now()),
                };
            }
            entry.notice = None;
            if previous == AvailabilityState::Unavailable {
                Transition::Recovered
            } else {
                Transition::None
            }
        };

        if matches!(transition, Transition::Recovered) {
            info!(family = %family, "backend reachable again, leaving degraded mode");
        }
        self.notify(family, transition);
    }

    /// Record that one candidate failed during the call holding `ticket`.
    ///
    /// An UNAVAILABLE family stays UNAVAILABLE; only a success leaves it.
    pub fn record_degraded(&self, ticket: &AvailabilityTicket, reason: &str) {
        let Some(mut entry) = self.current_entry(ticket) else {
            return;
        };
        if matches!(entry.status.state, AvailabilityState::Degraded | AvailabilityState::Unavailable)
        {
            return;
        }
        entry.status = AvailabilityStatus {
            state: AvailabilityState::Degraded,
            reason: reason.to_string(),
            last_transition_at: Some(self.clock.utc_now()),
        };
    }

    /// Record that every candidate failed during the call holding `ticket`.
    pub fn record_unavailable(&self, ticket: &AvailabilityTicket, reason: &str) {
        let transition = {
            let Some(mut entry) = self.current_entry(ticket) else {
                return;
            };
            let now = self.clock.utc_now();
            entry.status.reason = reason.to_string();
            if entry.status.state == AvailabilityState::Unavailable {
                if let Some(notice) = entry.notice.as_mut() {
                    notice.reason = reason.to_string();
                }
                Transition::None
            } else {
                entry.status.state = AvailabilityState::Unavailable;
                entry.status.last_transition_at = Some(now);
                let notice = DegradedNotice {
                    family: ticket.family.clone(),
                    reason: reason.to_string(),
                    since: now,
                };
                entry.notice = Some(notice.clone());
                Transition::Unavailable(notice)
            }
        };

        if let Transition::Unavailable(notice) = &transition {
            warn!(family = %notice.family, reason = %notice.reason, "entering degraded mode");
        }
        self.notify(&ticket.family, transition);
    }

    /// The family's entry, only if no success happened since the ticket
    fn current_entry(
        &self,
        ticket: &AvailabilityTicket,
    ) -> Option<dashmap::mapref::one::RefMut<'_, ResourceFamily, FamilyAvailability>> {
        let entry = self.families.entry(ticket.family.clone()).or_default();
        if entry.generation == ticket.generation {
            Some(entry)
        } else {
            None
        }
    }

    // Called with no map guard held
    fn notify(&self, family: &ResourceFamily, transition: Transition) {
        let Some(listener) = self.listener.read().clone() else {
            return;
        };
        match transition {
            Transition::Unavailable(notice) => listener.on_unavailable(&notice),
            Transition::Recovered => listener.on_recovered(family),
            Transition::None => {}
        }
    }
}
