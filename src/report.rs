//! # Human-readable listings
//!
//! Renderers for the dry-run deletion report and the visit dump. All output
//! is built into a `String` so the callers decide where it goes, and the
//! ordering is fully deterministic: objects ascending by identifier, each
//! object's detections in the chronological order established by
//! [`crate::grouping::group_by_object`]. Rendering never mutates state and
//! never requires a [`crate::plan::DeletionPlan`] to exist, so the dry-run
//! and destructive paths share everything up to the final step.

use std::collections::BTreeMap;
use std::fmt::Write;

use itertools::Itertools;

use crate::constants::{DetectionGroups, ObjectIdSet, ObjectMap, VisitId};
use crate::records::{DetectionRecord, ObjectRecord};

/// Render the dry-run listing of everything a deletion pass would remove.
pub fn render_deletion_report(
    targets: &ObjectIdSet,
    object_map: &ObjectMap,
    source_groups: &DetectionGroups,
    forced_source_groups: &DetectionGroups,
) -> String {
    let mut out = String::new();
    let sorted_targets: Vec<_> = targets.iter().sorted().collect();

    writeln!(out, "DiaObjects to delete:").ok();
    for oid in &sorted_targets {
        if let Some(obj) = object_map.get(*oid) {
            writeln!(
                out,
                "   DiaObject: diaObjectId={} nDiaSources={} ra={} dec={}",
                obj.object_id, obj.n_sources, obj.ra, obj.dec
            )
            .ok();
        }
    }

    writeln!(out, "DiaSources to delete:").ok();
    for oid in &sorted_targets {
        if let Some(group) = source_groups.get(*oid) {
            for s in group {
                writeln!(
                    out,
                    "   DiaSource: diaSourceId={} visit={} detector={} time_processed={} ra={} dec={}",
                    s.detection_id, s.visit, s.detector, s.time_processed, s.ra, s.dec
                )
                .ok();
            }
        }
    }

    writeln!(out, "ForcedDiaSources to delete:").ok();
    for oid in &sorted_targets {
        if let Some(group) = forced_source_groups.get(*oid) {
            for fs in group {
                writeln!(
                    out,
                    "   DiaForcedSource: diaForcedSourceId={} visit={} detector={} time_processed={} ra={} dec={}",
                    fs.detection_id, fs.visit, fs.detector, fs.time_processed, fs.ra, fs.dec
                )
                .ok();
            }
        }
    }

    out
}

/// Verbosity levels of the dump listing: 0 prints nothing here (counts are
/// logged by the walker), 1 adds per-object lines, 2 adds sources, 3 adds
/// forced sources.
pub fn render_object_dump(
    objects: &[ObjectRecord],
    source_groups: &DetectionGroups,
    forced_source_groups: &DetectionGroups,
    verbose: u8,
) -> String {
    let mut out = String::new();
    if verbose == 0 {
        return out;
    }

    for obj in objects.iter().sorted_by_key(|o| o.object_id) {
        match first_visit(obj, source_groups) {
            Some(v) => writeln!(
                out,
                "   DiaObject: diaObjectId={} nDiaSources={} ra={} dec={} first_visit={}",
                obj.object_id, obj.n_sources, obj.ra, obj.dec, v
            )
            .ok(),
            None => writeln!(
                out,
                "   DiaObject: diaObjectId={} nDiaSources={} ra={} dec={} first_visit=none",
                obj.object_id, obj.n_sources, obj.ra, obj.dec
            )
            .ok(),
        };

        if verbose > 1 {
            for s in detections_of(obj, source_groups) {
                writeln!(
                    out,
                    "      DiaSource: diaSourceId={} visit={} detector={} time_processed={} midpointMjdTai={} ra={} dec={}",
                    s.detection_id, s.visit, s.detector, s.time_processed, s.midpoint_mjd_tai, s.ra, s.dec
                )
                .ok();
            }
        }

        if verbose > 2 {
            for fs in detections_of(obj, forced_source_groups) {
                writeln!(
                    out,
                    "      DiaForcedSource: diaForcedSourceId={} visit={} detector={} time_processed={} midpointMjdTai={} ra={} dec={}",
                    fs.detection_id, fs.visit, fs.detector, fs.time_processed, fs.midpoint_mjd_tai, fs.ra, fs.dec
                )
                .ok();
            }
        }
    }

    out
}

/// Render the cross-detector first-visit histogram footer.
pub fn render_first_visit_counts(counts: &BTreeMap<VisitId, u64>) -> String {
    let mut out = String::new();
    if counts.is_empty() {
        return out;
    }

    writeln!(out, "   First visit counts (all detectors):").ok();
    for (visit, count) in counts {
        writeln!(out, "      {visit}: {count:6}").ok();
    }
    out
}

/// Visit of the chronologically first source of `obj`, if it has any.
pub fn first_visit(obj: &ObjectRecord, source_groups: &DetectionGroups) -> Option<VisitId> {
    source_groups
        .get(&obj.object_id)
        .and_then(|group| group.first())
        .map(|s| s.visit)
}

fn detections_of<'a>(
    obj: &ObjectRecord,
    groups: &'a DetectionGroups,
) -> impl Iterator<Item = &'a DetectionRecord> {
    groups.get(&obj.object_id).into_iter().flatten()
}
