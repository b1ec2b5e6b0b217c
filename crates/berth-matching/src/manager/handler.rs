use std::mem;

use berth_server::actor::{ActorAction, ActorContext};
use log::{debug, error, info, warn};
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::error::MatchingResult;
use crate::id::OfferId;
use crate::manager::state::{MatchPromise, OfferData};
use crate::manager::{MatcherAdded, MatcherRemoved, MatchingActor, MatchingEvent};
use crate::matcher::MatcherRef;
use crate::offer::Offer;
use crate::op::{InstanceOpWithSource, MatchedInstanceOps};

/// The reason given to ops declined by the admission limits.
const OP_REJECT_REASON: &str =
    "not enough launch tokens OR already scheduled sufficient instances on offer";

impl MatchingActor {
    pub(super) fn handle_match_offer(
        &mut self,
        ctx: &mut ActorContext<Self>,
        deadline: Instant,
        offer: Offer,
        result: oneshot::Sender<MatchedInstanceOps>,
    ) -> ActorAction {
        let mut promise = MatchPromise::new(result);
        if !self.offers_wanted() {
            debug!("offers are not wanted, not processing offer {}", offer.id);
            promise.complete(MatchedInstanceOps::no_match(offer.id, false));
            return ActorAction::Continue;
        }
        if self.offers.contains_key(&offer.id) {
            warn!("offer {} is already being processed", offer.id);
            promise.complete(MatchedInstanceOps::no_match(offer.id, false));
            return ActorAction::Continue;
        }
        let offer_id = offer.id.clone();
        let matcher_queue = self.registry.build_queue(&offer);
        debug!(
            "processing offer {} from {} with {} matchers",
            offer_id,
            offer.hostname,
            matcher_queue.len()
        );
        let data = OfferData::new(offer, deadline, promise, matcher_queue);
        self.offers.insert(offer_id.clone(), data);
        self.metrics.record_current_offers(self.offers.len());
        ctx.send_with_delay(
            MatchingEvent::ProbeOfferDeadline {
                offer_id: offer_id.clone(),
            },
            deadline.saturating_duration_since(Instant::now()),
        );
        self.schedule_next_matcher_or_finish(ctx, &offer_id);
        ActorAction::Continue
    }

    pub(super) fn handle_matcher_responded(
        &mut self,
        ctx: &mut ActorContext<Self>,
        matcher: MatcherRef,
        matched: MatchedInstanceOps,
    ) -> ActorAction {
        let offer_id = matched.offer_id;
        let Some(data) = self.offers.get_mut(&offer_id) else {
            // The offer has already timed out or completed.
            let reason = format!("offer '{offer_id}' already timed out");
            for op in &matched.ops {
                op.reject(&reason);
            }
            return ActorAction::Continue;
        };
        data.match_passes += 1;
        data.resend_offer |= matched.resend_offer;

        let added = matched.ops;
        let responded_with_ops = !added.is_empty();
        let residual = self
            .options
            .max_instances_per_offer
            .saturating_sub(data.ops.len());
        let limit = (added.len() as u64)
            .min(self.tokens.available())
            .min(residual as u64) as usize;
        let mut accepted = added;
        let rejected = accepted.split_off(limit);
        for op in &rejected {
            op.reject(OP_REJECT_REASON);
        }
        match Self::reduce_offer(&data.offer, &accepted) {
            Ok(reduced) => {
                let count = accepted.len() as u64;
                data.accept(reduced, accepted);
                self.tokens.consume(count);
                self.metrics.record_launch_tokens(self.tokens.available());
                // The matcher may still have more to offer, so it goes to
                // the back of the queue unless it replied with no ops.
                if responded_with_ops {
                    data.append_matcher(matcher);
                }
            }
            Err(e) => {
                // No partial admission: the ops of this response are
                // dropped and the offer data is left as it was, but the
                // offer continues with the next matcher.
                error!(
                    "failed to process matched ops for offer {} from matcher {}: {e}",
                    offer_id,
                    matcher.name()
                );
            }
        }
        self.schedule_next_matcher_or_finish(ctx, &offer_id);
        ActorAction::Continue
    }

    pub(super) fn handle_probe_offer_deadline(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        offer_id: OfferId,
    ) -> ActorAction {
        if let Some(data) = self.offers.get_mut(&offer_id) {
            data.resend_offer = true;
            self.complete_with_match_result(&offer_id);
        }
        ActorAction::Continue
    }

    pub(super) fn handle_add_or_update_matcher(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        matcher: MatcherRef,
        result: oneshot::Sender<MatcherAdded>,
    ) -> ActorAction {
        if self.registry.add(matcher.clone()) {
            info!(
                "activating offer matcher {} ({} registered)",
                matcher.name(),
                self.registry.len()
            );
            // Offers already in flight may still benefit from the new
            // matcher, so it joins the tail of every queue.
            for data in self.offers.values_mut() {
                data.append_matcher(matcher.clone());
            }
            self.publish_offers_wanted();
        }
        if result.send(MatcherAdded { matcher }).is_err() {
            warn!("failed to acknowledge matcher registration");
        }
        ActorAction::Continue
    }

    pub(super) fn handle_remove_matcher(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        matcher: MatcherRef,
        result: oneshot::Sender<MatcherRemoved>,
    ) -> ActorAction {
        if self.registry.remove(&matcher) {
            info!(
                "deactivating offer matcher {} ({} registered)",
                matcher.name(),
                self.registry.len()
            );
            // In-flight offer queues are left untouched: removal is a
            // hint, not a cancel, and a matcher already queued for an
            // offer is still consulted.
            self.publish_offers_wanted();
        }
        if result.send(MatcherRemoved { matcher }).is_err() {
            warn!("failed to acknowledge matcher removal");
        }
        ActorAction::Continue
    }

    pub(super) fn handle_set_launch_tokens(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        count: u64,
    ) -> ActorAction {
        let became_positive = self.tokens.set(count);
        self.metrics.record_launch_tokens(self.tokens.available());
        if became_positive {
            self.publish_offers_wanted();
        }
        ActorAction::Continue
    }

    pub(super) fn handle_add_launch_tokens(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        count: u64,
    ) -> ActorAction {
        let became_positive = self.tokens.add(count);
        self.metrics.record_launch_tokens(self.tokens.available());
        if became_positive {
            self.publish_offers_wanted();
        }
        ActorAction::Continue
    }

    fn offers_wanted(&self) -> bool {
        !self.registry.is_empty() && self.tokens.available() > 0
    }

    fn publish_offers_wanted(&self) {
        self.signal.publish(self.offers_wanted());
    }

    /// Consult the next matcher for the offer, or complete it when one of
    /// the stop conditions holds: the deadline has passed, the per-offer
    /// cap is reached, the launch tokens are exhausted, or no matcher is
    /// left to consult.
    fn schedule_next_matcher_or_finish(
        &mut self,
        ctx: &mut ActorContext<Self>,
        offer_id: &OfferId,
    ) {
        let Some(data) = self.offers.get_mut(offer_id) else {
            return;
        };
        let next_matcher = if Instant::now() >= data.deadline {
            warn!(
                "deadline for offer {offer_id} is overdue with {} ops matched so far",
                data.ops.len()
            );
            data.resend_offer = true;
            None
        } else if data.ops.len() >= self.options.max_instances_per_offer {
            info!(
                "already scheduled the maximum number of {} instances on offer {offer_id}; \
                 increase with {}",
                self.options.max_instances_per_offer, self.options.max_instances_per_offer_flag
            );
            None
        } else if self.tokens.available() == 0 {
            info!("exhausted all launch tokens while processing offer {offer_id}");
            None
        } else if let Some(matcher) = data.matcher_queue.pop_front() {
            Some(matcher)
        } else {
            debug!("no matcher left for offer {offer_id}");
            None
        };
        let Some(matcher) = next_matcher else {
            self.complete_with_match_result(offer_id);
            return;
        };
        debug!("consulting matcher {} for offer {offer_id}", matcher.name());
        let future = matcher.match_offer(data.deadline, &data.offer);
        let handle = ctx.handle().clone();
        let offer_id = offer_id.clone();
        ctx.spawn(async move {
            let matched = match future.await {
                Ok(matched) => matched,
                Err(e) => {
                    warn!(
                        "matcher {} failed for offer {offer_id}: {e}",
                        matcher.name()
                    );
                    MatchedInstanceOps::no_match(offer_id, true)
                }
            };
            if handle
                .send(MatchingEvent::MatcherResponded { matcher, matched })
                .await
                .is_err()
            {
                warn!("the matching actor stopped before receiving a matcher response");
            }
        });
    }

    /// Fulfil the promise exactly once with the accumulated result and
    /// drop the in-flight record.
    fn complete_with_match_result(&mut self, offer_id: &OfferId) {
        let Some(mut data) = self.offers.remove(offer_id) else {
            warn!("offer {offer_id} is not in flight");
            return;
        };
        let ops = mem::take(&mut data.ops);
        let count = ops.len();
        data.promise
            .complete(MatchedInstanceOps::new(offer_id.clone(), ops, data.resend_offer));
        self.metrics.record_current_offers(self.offers.len());
        info!(
            "finished processing offer {offer_id} from {}: matched {count} ops after {} passes, \
             {} left",
            data.offer.hostname,
            data.match_passes,
            data.offer.resource_summary()
        );
    }

    /// Apply the accepted ops to the offer in order, producing the
    /// reduced offer, without mutating any state. A failure here means no
    /// op of the batch is admitted.
    fn reduce_offer(
        offer: &Offer,
        accepted: &[InstanceOpWithSource],
    ) -> MatchingResult<Offer> {
        let mut reduced = offer.clone();
        for op in accepted {
            reduced = op.op.apply_to_offer(&reduced)?;
        }
        Ok(reduced)
    }
}
