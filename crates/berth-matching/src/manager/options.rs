//! A dedicated module for matching options to ensure readonly access.
use std::sync::Arc;

use berth_common::config::AppConfig;

use crate::decoder::ReservationDecoder;
use crate::error::{MatchingError, MatchingResult};
use crate::signal::OffersWantedChannel;

#[readonly::make]
pub struct MatchingOptions {
    pub max_instances_per_offer: usize,
    pub max_instances_per_offer_flag: String,
    pub initial_launch_tokens: u64,
    pub random_seed: Option<u64>,
    pub reservation_decoder: Arc<dyn ReservationDecoder>,
}

impl MatchingOptions {
    pub fn try_new(
        config: &AppConfig,
        reservation_decoder: Arc<dyn ReservationDecoder>,
    ) -> MatchingResult<Self> {
        if config.matching.max_instances_per_offer == 0 {
            return Err(MatchingError::InvalidArgument(format!(
                "{} must be positive",
                config.matching.max_instances_per_offer_flag
            )));
        }
        Ok(Self {
            max_instances_per_offer: config.matching.max_instances_per_offer,
            max_instances_per_offer_flag: config.matching.max_instances_per_offer_flag.clone(),
            initial_launch_tokens: config.matching.initial_launch_tokens,
            random_seed: config.matching.random_seed,
            reservation_decoder,
        })
    }
}

/// The options for the matching actor, combining the public options with
/// the channel carrying the wanted signal to the upstream observer.
pub struct MatchingActorOptions {
    pub options: MatchingOptions,
    pub offers_wanted: OffersWantedChannel,
}
