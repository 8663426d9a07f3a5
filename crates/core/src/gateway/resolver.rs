//! Endpoint resolution with most-recently-successful promotion

use std::collections::HashMap;

use backoffice_common::Clock;
use backoffice_domain::{EndpointCandidate, GatewayConfig, ResourceFamily};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Ordered candidate lists per resource family
///
/// Lists are seeded from configuration in configured order. The only
/// reordering is promotion of the last successful candidate to rank 0.
pub struct EndpointResolver<C: Clock> {
    families: RwLock<HashMap<ResourceFamily, Vec<EndpointCandidate>>>,
    default_address: String,
    clock: C,
}

impl<C: Clock> EndpointResolver<C> {
    pub fn from_config(config: &GatewayConfig, clock: C) -> Self {
        let families = config
            .families
            .iter()
            .filter_map(|(name, family)| {
                let candidates = dedup_candidates(&family.addresses);
                if candidates.is_empty() {
                    None
                } else {
                    Some((ResourceFamily::new(name), candidates))
                }
            })
            .collect();

        Self {
            families: RwLock::new(families),
            default_address: config.default_address.trim().to_string(),
            clock,
        }
    }

    /// Candidates for a family, rank 0 first. Never empty: a family without
    /// configured addresses gets the default candidate.
    pub fn resolve(&self, family: &ResourceFamily) -> Vec<EndpointCandidate> {
        self.families
            .read()
            .get(family)
            .cloned()
            .unwrap_or_else(|| vec![EndpointCandidate::new(self.default_address.clone(), 0)])
    }

    /// Report the outcome of an operation against `address`.
    ///
    /// A success stamps `last_success_at` and promotes the candidate to rank
    /// 0. A failure is only logged.
    pub fn report_outcome(&self, family: &ResourceFamily, address: &str, success: bool) {
        if !success {
            debug!(family = %family, address, "candidate failed");
            return;
        }

        let mut families = self.families.write();
        let candidates = families
            .entry(family.clone())
            .or_insert_with(|| vec![EndpointCandidate::new(self.default_address.clone(), 0)]);

        let Some(index) = candidates.iter().position(|c| c.address == address) else {
            debug!(family = %family, address, "success reported for unknown candidate, ignoring");
            return;
        };

        let mut candidate = candidates.remove(index);
        candidate.last_success_at = Some(self.clock.utc_now());
        candidates.insert(0, candidate);
        for (rank, candidate) in candidates.iter_mut().enumerate() {
            candidate.priority = rank as u32;
        }

        if index != 0 {
            info!(family = %family, address, "promoted candidate to rank 0");
        }
    }
}

/// Trimmed, non-empty addresses; the first occurrence of a duplicate wins
fn dedup_candidates(addresses: &[String]) -> Vec<EndpointCandidate> {
    let mut candidates: Vec<EndpointCandidate> = Vec::with_capacity(addresses.len());
    for address in addresses {
        let address = address.trim();
        if address.is_empty() || candidates.iter().any(|c| c.address == address) {
            continue;
        }
        let priority = candidates.len() as u32;
        candidates.push(EndpointCandidate::new(address, priority));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use backoffice_common::MockClock;
    use backoffice_domain::FamilyConfig;

    use super::*;

    fn resolver(addresses: &[&str]) -> EndpointResolver<MockClock> {
        let mut config = GatewayConfig::default();
        config.families.insert(
            "invoices".into(),
            FamilyConfig {
                addresses: addresses.iter().map(|a| a.to_string()).collect(),
                ..FamilyConfig::default()
            },
        );
        EndpointResolver::from_config(&config, MockClock::new())
    }

    fn addresses(candidates: &[EndpointCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.address.as_str()).collect()
    }

    #[test]
    fn test_cold_start_uses_configured_order() {
        let resolver = resolver(&["http://a", "http://b", "http://c"]);
        let candidates = resolver.resolve(&ResourceFamily::invoices());
        assert_eq!(addresses(&candidates), vec!["http://a", "http://b", "http://c"]);
        assert_eq!(candidates[2].priority, 2);
        assert!(candidates.iter().all(|c| c.last_success_at.is_none()));
    }

    #[test]
    fn test_duplicates_dropped_first_wins() {
        let resolver = resolver(&["http://a", "http://b", " http://a ", "http://c"]);
        let candidates = resolver.resolve(&ResourceFamily::invoices());
        assert_eq!(addresses(&candidates), vec!["http://a", "http://b", "http://c"]);
    }

    #[test]
    fn test_success_promotes_to_front() {
        let resolver = resolver(&["http://a", "http://b", "http://c"]);
        let family = ResourceFamily::invoices();
        resolver.report_outcome(&family, "http://c", true);

        let candidates = resolver.resolve(&family);
        assert_eq!(addresses(&candidates), vec!["http://c", "http://a", "http://b"]);
        assert_eq!(candidates.iter().map(|c| c.priority).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(candidates[0].last_success_at.is_some());
    }

    #[test]
    fn test_failure_does_not_reorder() {
        let resolver = resolver(&["http://a", "http://b"]);
        let family = ResourceFamily::invoices();
        resolver.report_outcome(&family, "http://a", false);
        assert_eq!(addresses(&resolver.resolve(&family)), vec!["http://a", "http://b"]);
    }

    #[test]
    fn test_unknown_family_gets_default_candidate() {
        let resolver = resolver(&["http://a"]);
        let candidates = resolver.resolve(&ResourceFamily::new("suppliers"));
        assert_eq!(addresses(&candidates), vec![GatewayConfig::default().default_address.as_str()]);
    }

    #[test]
    fn test_success_for_unknown_address_ignored() {
        let resolver = resolver(&["http://a", "http://b"]);
        let family = ResourceFamily::invoices();
        resolver.report_outcome(&family, "http://elsewhere", true);
        assert_eq!(addresses(&resolver.resolve(&family)), vec!["http://a", "http://b"]);
    }

    #[test]
    fn test_deterministic_given_history() {
        let first = resolver(&["http://a", "http://b", "http://c"]);
        let second = resolver(&["http://a", "http://b", "http://c"]);
        for resolver in [&first, &second] {
            resolver.report_outcome(&ResourceFamily::invoices(), "http://b", true);
            resolver.report_outcome(&ResourceFamily::invoices(), "http://c", true);
        }
        assert_eq!(
            addresses(&first.resolve(&ResourceFamily::invoices())),
            addresses(&second.resolve(&ResourceFamily::invoices()))
        );
    }
}
