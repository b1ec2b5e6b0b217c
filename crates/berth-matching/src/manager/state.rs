use std::collections::VecDeque;
use std::mem;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::matcher::MatcherRef;
use crate::offer::Offer;
use crate::op::{InstanceOpWithSource, MatchedInstanceOps};

/// A single-shot completion handle for the offer requester.
/// The second and later completion attempts are silent no-ops, so the
/// deadline timer and the step loop can race without consequence.
pub struct MatchPromise {
    sender: Option<oneshot::Sender<MatchedInstanceOps>>,
}

impl MatchPromise {
    pub fn new(sender: oneshot::Sender<MatchedInstanceOps>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn complete(&mut self, result: MatchedInstanceOps) {
        if let Some(sender) = self.sender.take() {
            // The requester may have gone away; the result is dropped then.
            let _ = sender.send(result);
        }
    }
}

/// The in-flight state of one offer under processing.
pub struct OfferData {
    /// The offer remaining after the accepted ops have been applied.
    pub offer: Offer,
    pub deadline: Instant,
    pub promise: MatchPromise,
    /// The matchers still to be consulted for this offer.
    pub matcher_queue: VecDeque<MatcherRef>,
    /// The accepted ops, newest first.
    pub ops: Vec<InstanceOpWithSource>,
    /// The number of matcher responses received for this offer.
    pub match_passes: usize,
    /// Whether the upstream should re-offer the remaining resources.
    /// The flag accumulates across matcher responses and is forced on
    /// deadline expiry.
    pub resend_offer: bool,
}

impl OfferData {
    pub fn new(
        offer: Offer,
        deadline: Instant,
        promise: MatchPromise,
        matcher_queue: VecDeque<MatcherRef>,
    ) -> Self {
        Self {
            offer,
            deadline,
            promise,
            matcher_queue,
            ops: vec![],
            match_passes: 0,
            resend_offer: false,
        }
    }

    pub fn append_matcher(&mut self, matcher: MatcherRef) {
        self.matcher_queue.push_back(matcher);
    }

    /// Commit an admitted batch: replace the offer with its reduced form
    /// and prepend the accepted ops.
    pub fn accept(&mut self, reduced: Offer, accepted: Vec<InstanceOpWithSource>) {
        self.offer = reduced;
        let existing = mem::take(&mut self.ops);
        self.ops = accepted.into_iter().chain(existing).collect();
    }
}
