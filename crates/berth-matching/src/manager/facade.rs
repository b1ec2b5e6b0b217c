use berth_server::actor::{ActorHandle, ActorSystem};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::error::MatchingResult;
use crate::manager::{
    MatcherAdded, MatcherRemoved, MatchingActor, MatchingActorOptions, MatchingEvent,
    MatchingOptions,
};
use crate::matcher::MatcherRef;
use crate::offer::Offer;
use crate::op::MatchedInstanceOps;
use crate::signal::OffersWantedReceiver;

/// The message-based surface of the offer matching coordinator.
/// This is the only way producers of offers, registrars of matchers, and
/// token refillers interact with the matching actor.
pub struct OfferMatcherManager {
    system: ActorSystem,
    handle: ActorHandle<MatchingActor>,
}

impl OfferMatcherManager {
    /// Create the manager and return it together with the receiver of
    /// the "offers wanted" signal for the upstream subscription.
    pub fn new(options: MatchingOptions) -> (Self, OffersWantedReceiver) {
        let (offers_wanted, receiver) = mpsc::unbounded_channel();
        let mut system = ActorSystem::new();
        let handle = system.spawn::<MatchingActor>(MatchingActorOptions {
            options,
            offers_wanted,
        });
        (Self { system, handle }, receiver)
    }

    /// Match an offer against the registered matchers.
    /// The result resolves exactly once, with the ops admitted before
    /// the deadline.
    pub async fn match_offer(
        &self,
        deadline: Instant,
        offer: Offer,
    ) -> MatchingResult<MatchedInstanceOps> {
        let (tx, rx) = oneshot::channel();
        self.handle
            .send(MatchingEvent::MatchOffer {
                deadline,
                offer,
                result: tx,
            })
            .await?;
        Ok(rx.await?)
    }

    pub async fn add_or_update_matcher(
        &self,
        matcher: MatcherRef,
    ) -> MatchingResult<MatcherAdded> {
        let (tx, rx) = oneshot::channel();
        self.handle
            .send(MatchingEvent::AddOrUpdateMatcher {
                matcher,
                result: tx,
            })
            .await?;
        Ok(rx.await?)
    }

    pub async fn remove_matcher(&self, matcher: MatcherRef) -> MatchingResult<MatcherRemoved> {
        let (tx, rx) = oneshot::channel();
        self.handle
            .send(MatchingEvent::RemoveMatcher {
                matcher,
                result: tx,
            })
            .await?;
        Ok(rx.await?)
    }

    pub async fn set_launch_tokens(&self, count: u64) -> MatchingResult<()> {
        self.handle
            .send(MatchingEvent::SetLaunchTokens { count })
            .await?;
        Ok(())
    }

    pub async fn add_launch_tokens(&self, count: u64) -> MatchingResult<()> {
        self.handle
            .send(MatchingEvent::AddLaunchTokens { count })
            .await?;
        Ok(())
    }

    /// Stop the matching actor and wait for its event loop to finish.
    pub async fn stop(mut self) -> MatchingResult<()> {
        self.handle.send(MatchingEvent::Shutdown).await?;
        self.system.join().await;
        Ok(())
    }
}
