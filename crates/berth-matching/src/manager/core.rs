use std::collections::HashMap;

use berth_server::actor::{Actor, ActorAction, ActorContext};

use crate::manager::{MatchingActor, MatchingActorOptions, MatchingEvent};
use crate::metrics::MatchingMetrics;
use crate::registry::MatcherRegistry;
use crate::signal::OffersWantedPublisher;
use crate::tokens::TokenAccountant;

impl Actor for MatchingActor {
    type Message = MatchingEvent;
    type Options = MatchingActorOptions;

    fn name() -> &'static str {
        "MatchingActor"
    }

    fn new(options: MatchingActorOptions) -> Self {
        let MatchingActorOptions {
            options,
            offers_wanted,
        } = options;
        let registry = MatcherRegistry::new(
            options.reservation_decoder.clone(),
            options.random_seed,
        );
        let tokens = TokenAccountant::new(options.initial_launch_tokens);
        Self {
            options,
            registry,
            tokens,
            offers: HashMap::new(),
            signal: OffersWantedPublisher::new(offers_wanted),
            metrics: MatchingMetrics::new(),
        }
    }

    fn receive(&mut self, ctx: &mut ActorContext<Self>, message: MatchingEvent) -> ActorAction {
        match message {
            MatchingEvent::MatchOffer {
                deadline,
                offer,
                result,
            } => self.handle_match_offer(ctx, deadline, offer, result),
            MatchingEvent::MatcherResponded { matcher, matched } => {
                self.handle_matcher_responded(ctx, matcher, matched)
            }
            MatchingEvent::ProbeOfferDeadline { offer_id } => {
                self.handle_probe_offer_deadline(ctx, offer_id)
            }
            MatchingEvent::AddOrUpdateMatcher { matcher, result } => {
                self.handle_add_or_update_matcher(ctx, matcher, result)
            }
            MatchingEvent::RemoveMatcher { matcher, result } => {
                self.handle_remove_matcher(ctx, matcher, result)
            }
            MatchingEvent::SetLaunchTokens { count } => self.handle_set_launch_tokens(ctx, count),
            MatchingEvent::AddLaunchTokens { count } => self.handle_add_launch_tokens(ctx, count),
            MatchingEvent::Shutdown => ActorAction::Stop,
        }
    }
}
