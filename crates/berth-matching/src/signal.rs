use log::debug;
use tokio::sync::mpsc;

pub type OffersWantedChannel = mpsc::UnboundedSender<bool>;
pub type OffersWantedReceiver = mpsc::UnboundedReceiver<bool>;

/// Pushes the "offers wanted" predicate to the upstream observer.
///
/// Every computed value is pushed, without deduplication, so the
/// observer must tolerate repeats. Publishing never blocks; a departed
/// observer is ignored.
pub struct OffersWantedPublisher {
    observer: OffersWantedChannel,
}

impl OffersWantedPublisher {
    pub fn new(observer: OffersWantedChannel) -> Self {
        Self { observer }
    }

    pub fn publish(&self, wanted: bool) {
        if self.observer.send(wanted).is_err() {
            debug!("the offers wanted observer has gone away");
        }
    }
}
