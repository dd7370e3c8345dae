//! # Visit walker
//!
//! Orchestration of one reconciliation run: resolve the science detectors of
//! a visit, intersect them with an optional allow-list, then process each
//! detector footprint in ascending detector order — fetch, filter, group,
//! classify, and finally either render the dry-run report or hand the
//! deletion plan to the database client.
//!
//! Processing is strictly sequential. The cross-detector first-visit
//! histogram must be deterministic and the database client is treated as a
//! shared, non-reentrant resource, so detectors are never walked
//! concurrently. Any fetch or delete failure aborts the whole run; the
//! walker performs no retries.

use std::collections::{BTreeMap, HashSet};

use hifitime::Epoch;
use itertools::Itertools;
use log::{info, warn};

use crate::admin_errors::AdminError;
use crate::classify::{classify, NewnessPolicy};
use crate::constants::{DetectionGroups, DetectorId, ObjectIdSet, ObjectMap, VisitId};
use crate::grouping::group_by_object;
use crate::plan::build_plan;
use crate::records::DetectionRecord;
use crate::region::filter_region;
use crate::report::{first_visit, render_deletion_report, render_object_dump};
use crate::services::{ApdbClient, DetectorPurpose, DetectorRegionRecord, ExposureCatalog};

/// Outcome of one detector pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorSummary {
    pub visit: VisitId,
    pub detector: DetectorId,
    /// Objects inside the detector footprint after region filtering.
    pub n_objects: usize,
    pub n_sources: usize,
    pub n_forced_sources: usize,
    /// Objects selected by the newness policy.
    pub n_selected: usize,
    /// Rendered listing for this detector, when the operation produces one
    /// (dry run, or dump with verbosity above zero).
    pub report: Option<String>,
}

/// Result of a dump run: per-detector summaries plus the histogram of
/// "earliest detection visit" over all objects listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitDump {
    pub summaries: Vec<DetectorSummary>,
    pub first_visit_counts: BTreeMap<VisitId, u64>,
}

/// One detector's catalog snapshot after region filtering and grouping.
struct DetectorSnapshot {
    object_map: ObjectMap,
    object_ids: ObjectIdSet,
    sources: Vec<DetectionRecord>,
    forced_sources: Vec<DetectionRecord>,
    source_groups: DetectionGroups,
    forced_source_groups: DetectionGroups,
}

/// Walks every science detector of one visit.
pub struct VisitWalker<'a, C: ExposureCatalog + ?Sized, D: ApdbClient + ?Sized> {
    catalog: &'a C,
    apdb: &'a mut D,
    instrument: &'a str,
    visit: VisitId,
}

impl<'a, C: ExposureCatalog + ?Sized, D: ApdbClient + ?Sized> VisitWalker<'a, C, D> {
    pub fn new(catalog: &'a C, apdb: &'a mut D, instrument: &'a str, visit: VisitId) -> Self {
        Self {
            catalog,
            apdb,
            instrument,
            visit,
        }
    }

    /// Report or delete the records first created by this visit.
    ///
    /// Arguments
    /// ---------
    /// * `detectors`: detector allow-list; empty means all science detectors.
    /// * `delete`: if `true` perform the deletion, otherwise render the
    ///   dry-run report into each summary.
    /// * `policy`: object selection policy.
    ///
    /// Return
    /// ------
    /// * One [`DetectorSummary`] per detector processed, in ascending
    ///   detector order.
    pub fn delete_visit(
        &mut self,
        detectors: &[DetectorId],
        delete: bool,
        policy: NewnessPolicy,
    ) -> Result<Vec<DetectorSummary>, AdminError> {
        let effective = self.effective_detectors(detectors)?;
        let regions = self.sorted_regions(&effective)?;
        let as_of = Epoch::now()?;

        let mut summaries = Vec::with_capacity(regions.len());
        for record in regions {
            info!(
                "--- Processing visit {} detector {}",
                record.visit, record.detector
            );
            let snap = self.fetch_snapshot(&record, as_of)?;

            let targets = classify(&snap.object_ids, &snap.source_groups, self.visit, policy);
            match policy {
                NewnessPolicy::NoSources => info!(
                    "{} no-source DiaObjects in this visit/detector",
                    targets.len()
                ),
                NewnessPolicy::FirstSourceVisit => {
                    info!("{} new DiaObjects in this visit/detector", targets.len())
                }
            }

            let mut report = None;
            if targets.is_empty() {
                info!("Nothing to delete in this visit/detector.");
            } else if !delete {
                report = Some(render_deletion_report(
                    &targets,
                    &snap.object_map,
                    &snap.source_groups,
                    &snap.forced_source_groups,
                ));
            } else {
                let plan = build_plan(
                    &targets,
                    &snap.object_map,
                    &snap.sources,
                    &snap.forced_sources,
                );
                if plan.objects.len() < targets.len() {
                    warn!(
                        "{} classified DiaObjects not found in the object catalog, skipping them",
                        targets.len() - plan.objects.len()
                    );
                }
                info!(
                    "Deleting {} DiaObjects with associated sources",
                    plan.objects.len()
                );
                self.apdb
                    .delete_records(&plan.objects, &plan.sources, &plan.forced_sources)?;
            }

            summaries.push(DetectorSummary {
                visit: record.visit,
                detector: record.detector,
                n_objects: snap.object_ids.len(),
                n_sources: snap.sources.len(),
                n_forced_sources: snap.forced_sources.len(),
                n_selected: targets.len(),
                report,
            });
        }
        Ok(summaries)
    }

    /// Dump the visit's catalog contents at the requested verbosity.
    ///
    /// Verbosity 0 only logs per-detector counts; 1 lists objects with their
    /// first-detection visit; 2 adds sources; 3 adds forced sources. The
    /// first-visit histogram is accumulated while objects are listed, so it
    /// is populated only at verbosity 1 and above.
    pub fn dump_visit(
        &mut self,
        detectors: &[DetectorId],
        verbose: u8,
    ) -> Result<VisitDump, AdminError> {
        let effective = self.effective_detectors(detectors)?;
        let regions = self.sorted_regions(&effective)?;
        let as_of = Epoch::now()?;

        let mut summaries = Vec::with_capacity(regions.len());
        let mut first_visit_counts: BTreeMap<VisitId, u64> = BTreeMap::new();
        for record in regions {
            info!(
                "--- Processing visit {} detector {}",
                record.visit, record.detector
            );
            let snap = self.fetch_snapshot(&record, as_of)?;

            let new_objects = classify(
                &snap.object_ids,
                &snap.source_groups,
                self.visit,
                NewnessPolicy::FirstSourceVisit,
            );
            info!(
                "{} new DiaObjects in this visit/detector",
                new_objects.len()
            );

            let mut report = None;
            if verbose > 0 {
                let objects: Vec<_> = snap.object_map.values().cloned().collect();
                for obj in &objects {
                    if let Some(v) = first_visit(obj, &snap.source_groups) {
                        *first_visit_counts.entry(v).or_default() += 1;
                    }
                }
                report = Some(render_object_dump(
                    &objects,
                    &snap.source_groups,
                    &snap.forced_source_groups,
                    verbose,
                ));
            }

            summaries.push(DetectorSummary {
                visit: record.visit,
                detector: record.detector,
                n_objects: snap.object_ids.len(),
                n_sources: snap.sources.len(),
                n_forced_sources: snap.forced_sources.len(),
                n_selected: new_objects.len(),
                report,
            });
        }

        Ok(VisitDump {
            summaries,
            first_visit_counts,
        })
    }

    /// Science detectors of the visit, restricted to `requested` when that
    /// allow-list is non-empty. Requested detectors that are not science
    /// detectors of this visit are reported and dropped, not fatal.
    fn effective_detectors(
        &self,
        requested: &[DetectorId],
    ) -> Result<HashSet<DetectorId>, AdminError> {
        let science: HashSet<DetectorId> = self
            .catalog
            .detectors(self.instrument, self.visit)?
            .into_iter()
            .filter(|d| d.purpose == DetectorPurpose::Science)
            .map(|d| d.id)
            .collect();

        if requested.is_empty() {
            return Ok(science);
        }

        let requested: HashSet<DetectorId> = requested.iter().copied().collect();
        let unknown: Vec<DetectorId> = requested
            .difference(&science)
            .copied()
            .sorted()
            .collect();
        if !unknown.is_empty() {
            warn!(
                "Specified detectors are not known in this visit: {:?}",
                unknown
            );
        }
        Ok(requested.intersection(&science).copied().collect())
    }

    /// Region records of the visit restricted to `effective`, ascending by
    /// detector id.
    fn sorted_regions(
        &self,
        effective: &HashSet<DetectorId>,
    ) -> Result<Vec<DetectorRegionRecord>, AdminError> {
        let mut regions: Vec<_> = self
            .catalog
            .detector_regions(self.instrument, self.visit)?
            .into_iter()
            .filter(|r| effective.contains(&r.detector))
            .collect();
        regions.sort_by_key(|r| r.detector);
        Ok(regions)
    }

    /// Fetch and prepare one detector's catalogs: region-filter the objects,
    /// fetch their detections, group detections chronologically per object.
    fn fetch_snapshot(
        &self,
        record: &DetectorRegionRecord,
        as_of: Epoch,
    ) -> Result<DetectorSnapshot, AdminError> {
        let region = record.region.as_ref();

        let objects = self.apdb.fetch_objects(region)?;
        let objects = filter_region(objects, region)?;
        let object_ids: ObjectIdSet = objects.iter().map(|o| o.object_id).collect();
        info!("Found {} DiaObjects", object_ids.len());

        let sources = self.apdb.fetch_sources(region, &object_ids, as_of)?;
        info!("Found {} DiaSources", sources.len());

        let forced_sources = self.apdb.fetch_forced_sources(region, &object_ids, as_of)?;
        info!("Found {} DiaForcedSources", forced_sources.len());

        let object_map: ObjectMap = objects.into_iter().map(|o| (o.object_id, o)).collect();
        let source_groups = group_by_object(sources.iter().cloned());
        let forced_source_groups = group_by_object(forced_sources.iter().cloned());

        Ok(DetectorSnapshot {
            object_map,
            object_ids,
            sources,
            forced_sources,
            source_groups,
            forced_source_groups,
        })
    }
}
