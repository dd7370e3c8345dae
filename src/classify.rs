//! # Newness classification
//!
//! Decides, per DiaObject, whether it qualifies as "newly introduced by the
//! target visit" and should therefore be rolled back. Two fixed policies
//! exist; the choice is a closed enum rather than a flag so the asymmetric
//! treatment of sourceless objects stays explicit at every call site.

use crate::constants::{DetectionGroups, ObjectIdSet, VisitId};

/// Selection policy for objects to roll back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewnessPolicy {
    /// Select objects whose chronologically first DiaSource was detected in
    /// the target visit. An object's true birth visit is the visit of its
    /// earliest detection; if that equals the visit under inspection, the
    /// object was created there.
    #[default]
    FirstSourceVisit,
    /// Select objects with no associated DiaSources at all, regardless of
    /// visit. Such objects are vestigial (created speculatively, never
    /// confirmed) and are cleaned up region-wide; the target visit is
    /// ignored by this policy.
    NoSources,
}

/// Classify which objects are new to `visit` under `policy`.
///
/// Arguments
/// ---------
/// * `object_ids`: identifiers of the objects fetched for the region.
/// * `source_groups`: DiaSources grouped per object, chronologically ordered.
/// * `visit`: the visit under inspection.
/// * `policy`: selection policy.
///
/// Return
/// ------
/// * The subset of `object_ids` selected for rollback.
///
/// An object present in the catalog but absent from `source_groups` is
/// excluded under [`NewnessPolicy::FirstSourceVisit`] (no first source to
/// test) and included under [`NewnessPolicy::NoSources`]. This asymmetry is
/// intentional.
pub fn classify(
    object_ids: &ObjectIdSet,
    source_groups: &DetectionGroups,
    visit: VisitId,
    policy: NewnessPolicy,
) -> ObjectIdSet {
    match policy {
        NewnessPolicy::FirstSourceVisit => source_groups
            .iter()
            .filter(|(oid, group)| {
                group.first().map(|s| s.visit) == Some(visit) && object_ids.contains(oid)
            })
            .map(|(oid, _)| *oid)
            .collect(),
        NewnessPolicy::NoSources => object_ids
            .iter()
            .filter(|oid| !source_groups.contains_key(*oid))
            .copied()
            .collect(),
    }
}
