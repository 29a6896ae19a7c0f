//! Identity for domain entities.

/// An entity is identified by an id assigned outside the domain. Instances
/// that have not been assigned one yet are drafts.
pub trait Entity {
    type Id: Eq;

    fn id(&self) -> Option<&Self::Id>;

    fn is_draft(&self) -> bool {
        self.id().is_none()
    }

    /// Two entities are the same when both carry an id and the ids match.
    /// Drafts are never the same as anything.
    fn same_identity_as(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
