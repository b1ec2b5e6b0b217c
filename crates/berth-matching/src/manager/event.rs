use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::id::OfferId;
use crate::matcher::MatcherRef;
use crate::offer::Offer;
use crate::op::MatchedInstanceOps;

pub enum MatchingEvent {
    /// Process an offer and resolve the result channel exactly once,
    /// before or at the deadline.
    MatchOffer {
        deadline: Instant,
        offer: Offer,
        result: oneshot::Sender<MatchedInstanceOps>,
    },
    /// A matcher replied for an offer. This is also synthesized as a
    /// no-match reply when a matcher future fails.
    MatcherResponded {
        matcher: MatcherRef,
        matched: MatchedInstanceOps,
    },
    /// The deadline timer for an offer fired.
    ProbeOfferDeadline { offer_id: OfferId },
    AddOrUpdateMatcher {
        matcher: MatcherRef,
        result: oneshot::Sender<MatcherAdded>,
    },
    RemoveMatcher {
        matcher: MatcherRef,
        result: oneshot::Sender<MatcherRemoved>,
    },
    SetLaunchTokens { count: u64 },
    AddLaunchTokens { count: u64 },
    Shutdown,
}

/// The acknowledgement for [`MatchingEvent::AddOrUpdateMatcher`].
#[derive(Debug)]
pub struct MatcherAdded {
    pub matcher: MatcherRef,
}

/// The acknowledgement for [`MatchingEvent::RemoveMatcher`].
#[derive(Debug)]
pub struct MatcherRemoved {
    pub matcher: MatcherRef,
}
