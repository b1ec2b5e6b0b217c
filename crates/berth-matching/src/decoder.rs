use crate::id::AppId;

/// Decodes the app identifier embedded in a persistent disk reservation.
/// The encoding rule belongs to the cluster manager, so the matching core
/// only depends on this trait. Unparsable identifiers must decode to
/// [`None`] and are treated as non-matching.
pub trait ReservationDecoder: Send + Sync {
    fn app_id(&self, persistence_id: &str) -> Option<AppId>;
}

/// Decodes persistence identifiers of the form `<app>#<volume>#<uuid>`,
/// which is the encoding used by the default cluster-manager adapter.
pub struct DelimitedReservationDecoder {
    delimiter: char,
}

impl DelimitedReservationDecoder {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }
}

impl Default for DelimitedReservationDecoder {
    fn default() -> Self {
        Self::new('#')
    }
}

impl ReservationDecoder for DelimitedReservationDecoder {
    fn app_id(&self, persistence_id: &str) -> Option<AppId> {
        let (app_id, _) = persistence_id.split_once(self.delimiter)?;
        if app_id.is_empty() {
            None
        } else {
            Some(AppId::from(app_id))
        }
    }
}
