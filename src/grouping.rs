//! # Grouping detections by parent object
//!
//! A region snapshot of DiaSources (or DiaForcedSources) arrives as one flat
//! list. Classification and reporting both need the per-object view, with
//! each object's detections in chronological order, so the grouping is done
//! once per detector pass and shared.

use std::collections::HashMap;

use crate::constants::{DetectionGroups, Detections};
use crate::records::DetectionRecord;

/// Group detection records by `object_id`, ordering each group by ascending
/// `midpoint_mjd_tai`.
///
/// The sort is stable: detections of one object sharing a mid-exposure time
/// keep the relative order they had in the input. Input records are moved
/// into the groups, not copied.
pub fn group_by_object<I>(records: I) -> DetectionGroups
where
    I: IntoIterator<Item = DetectionRecord>,
{
    let mut groups: HashMap<_, Detections> = HashMap::new();
    for record in records {
        groups.entry(record.object_id).or_default().push(record);
    }
    for detections in groups.values_mut() {
        detections.sort_by(|a, b| a.midpoint_mjd_tai.total_cmp(&b.midpoint_mjd_tai));
    }
    groups
}
