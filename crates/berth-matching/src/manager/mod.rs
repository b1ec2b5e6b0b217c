mod core;
mod event;
mod facade;
mod handler;
mod options;
mod state;

use std::collections::HashMap;

pub use event::{MatchingEvent, MatcherAdded, MatcherRemoved};
pub use facade::OfferMatcherManager;
pub use options::MatchingOptions;
pub use options::MatchingActorOptions;

use crate::id::OfferId;
use crate::manager::state::OfferData;
use crate::metrics::MatchingMetrics;
use crate::registry::MatcherRegistry;
use crate::signal::OffersWantedPublisher;
use crate::tokens::TokenAccountant;

/// The single-writer coordinator for offer matching.
/// All mutable state is owned by this actor and mutated one message at a
/// time; matchers, timers, and producers communicate by message only.
pub struct MatchingActor {
    options: MatchingOptions,
    registry: MatcherRegistry,
    tokens: TokenAccountant,
    offers: HashMap<OfferId, OfferData>,
    signal: OffersWantedPublisher,
    metrics: MatchingMetrics,
}
