use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::time::Instant;

use crate::error::MatchingResult;
use crate::id::AppId;
use crate::offer::Offer;
use crate::op::MatchedInstanceOps;

pub type MatchOfferFuture = BoxFuture<'static, MatchingResult<MatchedInstanceOps>>;

/// A participant willing to translate part of an offer into instance ops.
/// Matchers are black boxes to the coordinator: they are registered and
/// removed dynamically and consulted one at a time per offer.
pub trait OfferMatcher: Send + Sync {
    fn name(&self) -> &str;

    /// The set of app identifiers for which this matcher should be
    /// consulted first, typically because it holds a persistent
    /// reservation for them.
    fn precedence_for(&self) -> Option<&HashSet<AppId>> {
        None
    }

    /// Match an offer and reply with proposed instance ops.
    /// The returned future must resolve before `deadline` to have an
    /// effect; a late reply is rejected by the coordinator.
    fn match_offer(&self, deadline: Instant, offer: &Offer) -> MatchOfferFuture;
}

/// A shared reference to a registered matcher.
/// Equality and hashing follow the identity of the underlying matcher,
/// so registering a clone of the same reference is idempotent.
#[derive(Clone)]
pub struct MatcherRef(Arc<dyn OfferMatcher>);

impl MatcherRef {
    pub fn new(matcher: Arc<dyn OfferMatcher>) -> Self {
        Self(matcher)
    }
}

impl Deref for MatcherRef {
    type Target = dyn OfferMatcher;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for MatcherRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MatcherRef {}

impl Hash for MatcherRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

impl fmt::Debug for MatcherRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MatcherRef").field(&self.0.name()).finish()
    }
}

/// A matcher that consults a list of delegates in order and returns the
/// first non-empty match. Its precedence is the union of the delegates'
/// precedence sets.
pub struct StopOnFirstMatchingOfferMatcher {
    name: String,
    matchers: Vec<MatcherRef>,
    precedence: HashSet<AppId>,
}

impl StopOnFirstMatchingOfferMatcher {
    pub fn new(name: impl Into<String>, matchers: Vec<MatcherRef>) -> Self {
        let precedence = matchers
            .iter()
            .filter_map(|m| m.precedence_for())
            .flatten()
            .cloned()
            .collect();
        Self {
            name: name.into(),
            matchers,
            precedence,
        }
    }
}

impl OfferMatcher for StopOnFirstMatchingOfferMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn precedence_for(&self) -> Option<&HashSet<AppId>> {
        if self.precedence.is_empty() {
            None
        } else {
            Some(&self.precedence)
        }
    }

    fn match_offer(&self, deadline: Instant, offer: &Offer) -> MatchOfferFuture {
        let matchers = self.matchers.clone();
        let offer = offer.clone();
        Box::pin(async move {
            for matcher in matchers {
                let matched = matcher.match_offer(deadline, &offer).await?;
                if !matched.ops.is_empty() {
                    return Ok(matched);
                }
            }
            Ok(MatchedInstanceOps::no_match(offer.id, false))
        })
    }
}
