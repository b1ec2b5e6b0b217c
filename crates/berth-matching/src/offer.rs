use std::fmt;

use crate::id::OfferId;

/// A bundle of resources on one host, offered by the cluster manager
/// for a bounded window of time.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub id: OfferId,
    pub hostname: String,
    pub resources: Vec<Resource>,
}

impl Offer {
    pub fn new(id: impl Into<OfferId>, hostname: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self {
            id: id.into(),
            hostname: hostname.into(),
            resources,
        }
    }

    /// A compact rendering of the remaining resources for log messages.
    pub fn resource_summary(&self) -> ResourceSummary<'_> {
        ResourceSummary(&self.resources)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    pub amount: f64,
    pub persistence: Option<DiskPersistence>,
}

impl Resource {
    pub fn scalar(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            persistence: None,
        }
    }

    pub fn persistent(name: impl Into<String>, amount: f64, persistence_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            persistence: Some(DiskPersistence {
                id: persistence_id.into(),
            }),
        }
    }
}

/// A persistent disk reservation attached to a resource.
/// The identifier encodes the owning app; the encoding is defined by the
/// cluster manager and decoded via [`crate::decoder::ReservationDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskPersistence {
    pub id: String,
}

pub struct ResourceSummary<'a>(&'a [Resource]);

impl fmt::Display for ResourceSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no resources");
        }
        for (i, resource) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}:{}", resource.name, resource.amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_summary() {
        let offer = Offer::new(
            "offer-1",
            "host-1",
            vec![
                Resource::scalar("cpus", 4.0),
                Resource::scalar("mem", 2048.0),
            ],
        );
        assert_eq!(offer.resource_summary().to_string(), "cpus:4 mem:2048");

        let empty = Offer::new("offer-2", "host-2", vec![]);
        assert_eq!(empty.resource_summary().to_string(), "no resources");
    }
}
