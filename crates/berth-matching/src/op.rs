use std::fmt;
use std::sync::Arc;

use crate::error::{MatchingError, MatchingResult};
use crate::id::{AppId, OfferId};
use crate::offer::Offer;

/// A proposed action that consumes resources from an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOp {
    pub kind: InstanceOpKind,
    pub app_id: AppId,
    pub claims: Vec<ResourceClaim>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceOpKind {
    /// Launch an instance of the app.
    Launch,
    /// Reserve resources and create volumes for a later launch.
    Reserve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceClaim {
    pub resource: String,
    pub amount: f64,
}

impl ResourceClaim {
    pub fn new(resource: impl Into<String>, amount: f64) -> Self {
        Self {
            resource: resource.into(),
            amount,
        }
    }
}

impl InstanceOp {
    pub fn launch(app_id: impl Into<AppId>, claims: Vec<ResourceClaim>) -> Self {
        Self {
            kind: InstanceOpKind::Launch,
            app_id: app_id.into(),
            claims,
        }
    }

    pub fn reserve(app_id: impl Into<AppId>, claims: Vec<ResourceClaim>) -> Self {
        Self {
            kind: InstanceOpKind::Reserve,
            app_id: app_id.into(),
            claims,
        }
    }

    /// Apply the op to an offer and return the reduced offer.
    /// Every claim must be satisfiable, otherwise the offer is returned
    /// unchanged via the error so the caller can refuse the op atomically.
    pub fn apply_to_offer(&self, offer: &Offer) -> MatchingResult<Offer> {
        let mut resources = offer.resources.clone();
        for claim in &self.claims {
            let resource = resources
                .iter_mut()
                .find(|r| r.name == claim.resource && r.amount >= claim.amount)
                .ok_or_else(|| {
                    MatchingError::UnsatisfiableOp(format!(
                        "offer {} cannot satisfy a claim of {} {} for app {}",
                        offer.id, claim.amount, claim.resource, self.app_id
                    ))
                })?;
            resource.amount -= claim.amount;
        }
        // Fully consumed scalar resources disappear from the offer, while
        // resources carrying a persistent reservation remain visible.
        resources.retain(|r| r.amount > 0.0 || r.persistence.is_some());
        Ok(Offer {
            id: offer.id.clone(),
            hostname: offer.hostname.clone(),
            resources,
        })
    }
}

/// The origin of an instance op, notified when the op is declined.
pub trait InstanceOpSource: Send + Sync {
    fn reject(&self, op: &InstanceOp, reason: &str);
}

/// An instance op paired with its source.
/// The matching core resolves every op it receives exactly once: the op is
/// either folded into an offer's accepted ops or rejected via the source.
#[derive(Clone)]
pub struct InstanceOpWithSource {
    pub op: InstanceOp,
    source: Arc<dyn InstanceOpSource>,
}

impl InstanceOpWithSource {
    pub fn new(op: InstanceOp, source: Arc<dyn InstanceOpSource>) -> Self {
        Self { op, source }
    }

    pub fn reject(&self, reason: &str) {
        self.source.reject(&self.op, reason);
    }
}

impl fmt::Debug for InstanceOpWithSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceOpWithSource")
            .field("op", &self.op)
            .finish_non_exhaustive()
    }
}

/// The outcome of matching one offer, produced by a matcher and also
/// returned to the original requester once the offer is resolved.
#[derive(Debug)]
pub struct MatchedInstanceOps {
    pub offer_id: OfferId,
    pub ops: Vec<InstanceOpWithSource>,
    /// Whether the upstream cluster manager should offer the remaining
    /// resources again because no definitive answer was reached.
    pub resend_offer: bool,
}

impl MatchedInstanceOps {
    pub fn new(offer_id: OfferId, ops: Vec<InstanceOpWithSource>, resend_offer: bool) -> Self {
        Self {
            offer_id,
            ops,
            resend_offer,
        }
    }

    pub fn no_match(offer_id: OfferId, resend_offer: bool) -> Self {
        Self {
            offer_id,
            ops: vec![],
            resend_offer,
        }
    }
}
