use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::decoder::ReservationDecoder;
use crate::id::AppId;
use crate::matcher::MatcherRef;
use crate::offer::Offer;

/// The set of currently registered matchers.
/// The registry also owns the randomness source used to order matchers
/// for each offer, so ordering is reproducible under a fixed seed.
pub struct MatcherRegistry {
    matchers: IndexSet<MatcherRef>,
    decoder: Arc<dyn ReservationDecoder>,
    rng: StdRng,
}

impl MatcherRegistry {
    pub fn new(decoder: Arc<dyn ReservationDecoder>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            matchers: IndexSet::new(),
            decoder,
            rng,
        }
    }

    /// Insert a matcher and return whether it was newly inserted.
    pub fn add(&mut self, matcher: MatcherRef) -> bool {
        self.matchers.insert(matcher)
    }

    /// Remove a matcher and return whether it was a member.
    pub fn remove(&mut self, matcher: &MatcherRef) -> bool {
        self.matchers.shift_remove(matcher)
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Build the matcher consultation order for an offer.
    ///
    /// Matchers whose precedence intersects the apps behind the offer's
    /// persistent disk reservations get first refusal, so reserved
    /// resources are not consumed by generic launches. Within each class
    /// the order is uniformly random to prevent starvation.
    pub fn build_queue(&mut self, offer: &Offer) -> VecDeque<MatcherRef> {
        let reserved_apps = self.reservation_app_ids(offer);
        let (mut reserved, mut normal): (Vec<_>, Vec<_>) =
            self.matchers.iter().cloned().partition(|matcher| {
                matcher
                    .precedence_for()
                    .is_some_and(|apps| !apps.is_disjoint(&reserved_apps))
            });
        reserved.shuffle(&mut self.rng);
        normal.shuffle(&mut self.rng);
        reserved.into_iter().chain(normal).collect()
    }

    fn reservation_app_ids(&self, offer: &Offer) -> HashSet<AppId> {
        offer
            .resources
            .iter()
            .filter_map(|resource| resource.persistence.as_ref())
            .filter_map(|persistence| self.decoder.app_id(&persistence.id))
            .collect()
    }
}
