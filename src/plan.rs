//! # Deletion plans and locators
//!
//! A [`DeletionPlan`] is the referentially complete set of records removed
//! together for one detector pass: the selected DiaObjects plus every
//! DiaSource and DiaForcedSource parented by them. Plans are pure data; the
//! destructive call is a separate, explicit step taken by the walker only
//! when deletion was requested.
//!
//! Each record kind has its own locator shape because the external delete
//! contract addresses each table differently: objects by identifier and
//! position, sources by identifier, parent and observation time, forced
//! sources by (parent, visit, detector) — forced sources carry no standalone
//! identity in the partitioned store.

use itertools::Itertools;

use crate::constants::{Degree, DetectorId, ObjectId, ObjectIdSet, ObjectMap, SourceId, VisitId, MJD};
use crate::records::DetectionRecord;

/// Locator addressing one DiaObject row for deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLocator {
    pub object_id: ObjectId,
    pub ra: Degree,
    pub dec: Degree,
}

/// Locator addressing one DiaSource row for deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocator {
    pub source_id: SourceId,
    pub object_id: ObjectId,
    pub ra: Degree,
    pub dec: Degree,
    pub midpoint_mjd_tai: MJD,
}

/// Locator addressing one DiaForcedSource row for deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcedSourceLocator {
    pub object_id: ObjectId,
    pub visit: VisitId,
    pub detector: DetectorId,
    pub ra: Degree,
    pub dec: Degree,
    pub midpoint_mjd_tai: MJD,
}

/// Everything to be deleted for one detector pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletionPlan {
    pub objects: Vec<ObjectLocator>,
    pub sources: Vec<SourceLocator>,
    pub forced_sources: Vec<ForcedSourceLocator>,
}

impl DeletionPlan {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.sources.is_empty() && self.forced_sources.is_empty()
    }
}

/// Assemble the deletion plan for a classified set of objects.
///
/// Arguments
/// ---------
/// * `targets`: object identifiers selected for rollback.
/// * `object_map`: the co-fetched DiaObject snapshot, keyed by identifier.
/// * `sources`: the full, ungrouped DiaSource snapshot.
/// * `forced_sources`: the full, ungrouped DiaForcedSource snapshot.
///
/// Return
/// ------
/// * A [`DeletionPlan`] with one object locator per target present in
///   `object_map`, and one source / forced-source locator per detection
///   whose parent is in `targets`.
///
/// Targets missing from `object_map` are skipped: the classification and the
/// catalog fetch are separate snapshots and may race, so the miss is
/// expected; the caller decides whether to log it. Detection lists are
/// iterated in full so multiplicities are preserved exactly.
pub fn build_plan(
    targets: &ObjectIdSet,
    object_map: &ObjectMap,
    sources: &[DetectionRecord],
    forced_sources: &[DetectionRecord],
) -> DeletionPlan {
    let objects = targets
        .iter()
        .sorted()
        .filter_map(|oid| object_map.get(oid))
        .map(|obj| ObjectLocator {
            object_id: obj.object_id,
            ra: obj.ra,
            dec: obj.dec,
        })
        .collect();

    let sources = sources
        .iter()
        .filter(|s| targets.contains(&s.object_id))
        .map(|s| SourceLocator {
            source_id: s.detection_id,
            object_id: s.object_id,
            ra: s.ra,
            dec: s.dec,
            midpoint_mjd_tai: s.midpoint_mjd_tai,
        })
        .collect();

    let forced_sources = forced_sources
        .iter()
        .filter(|fs| targets.contains(&fs.object_id))
        .map(|fs| ForcedSourceLocator {
            object_id: fs.object_id,
            visit: fs.visit,
            detector: fs.detector,
            ra: fs.ra,
            dec: fs.dec,
            midpoint_mjd_tai: fs.midpoint_mjd_tai,
        })
        .collect();

    DeletionPlan {
        objects,
        sources,
        forced_sources,
    }
}
