//! # File-backed snapshot store
//!
//! A JSON snapshot of one visit's catalog contents, implementing both
//! collaborator traits so the tool can be run against exported data without
//! a live database. The dump side of the tool uses it for offline debugging;
//! the test suite uses it as its backend.
//!
//! Fetches behave like the production client: `fetch_objects` returns the
//! whole stored catalog (the real backend over-returns by partition, and the
//! caller is expected to apply the exact region filter), detection fetches
//! are restricted to the requested parent objects and to records processed
//! at or before the cutoff time. Deletion mutates only the in-memory copy;
//! the file on disk is never rewritten.

use camino::Utf8Path;
use hifitime::{Epoch, TimeScale};
use serde::{Deserialize, Serialize};

use crate::admin_errors::AdminError;
use crate::constants::{Degree, DetectorId, ObjectId, ObjectIdSet, SourceId, VisitId, MJD};
use crate::plan::{ForcedSourceLocator, ObjectLocator, SourceLocator};
use crate::records::{DetectionRecord, ObjectRecord};
use crate::region::{CapRegion, SkyRegion};
use crate::services::{
    ApdbClient, DetectorInfo, DetectorPurpose, DetectorRegionRecord, ExposureCatalog,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotDetector {
    visit: VisitId,
    id: DetectorId,
    purpose: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotRegion {
    visit: VisitId,
    detector: DetectorId,
    /// Cap center, degrees.
    ra: Degree,
    dec: Degree,
    /// Cap angular radius, degrees.
    radius: Degree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotObject {
    object_id: ObjectId,
    ra: Degree,
    dec: Degree,
    n_sources: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotDetection {
    detection_id: SourceId,
    object_id: ObjectId,
    /// Processing time as MJD TAI; converted to an epoch on load.
    time_processed: MJD,
    midpoint_mjd_tai: MJD,
    visit: VisitId,
    detector: DetectorId,
    ra: Degree,
    dec: Degree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotFile {
    instrument: String,
    detectors: Vec<SnapshotDetector>,
    regions: Vec<SnapshotRegion>,
    objects: Vec<SnapshotObject>,
    #[serde(default)]
    sources: Vec<SnapshotDetection>,
    #[serde(default)]
    forced_sources: Vec<SnapshotDetection>,
}

/// In-memory visit snapshot loaded from a JSON file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    instrument: String,
    detectors: Vec<(VisitId, DetectorInfo)>,
    regions: Vec<SnapshotRegion>,
    objects: Vec<ObjectRecord>,
    sources: Vec<DetectionRecord>,
    forced_sources: Vec<DetectionRecord>,
}

impl SnapshotStore {
    /// Load a snapshot from `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, AdminError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a snapshot from its JSON text.
    pub fn from_json(contents: &str) -> Result<Self, AdminError> {
        let file: SnapshotFile = serde_json::from_str(contents)?;
        Self::from_file(file)
    }

    fn from_file(file: SnapshotFile) -> Result<Self, AdminError> {
        let detectors = file
            .detectors
            .iter()
            .map(|d| {
                Ok((
                    d.visit,
                    DetectorInfo {
                        id: d.id,
                        purpose: parse_purpose(&d.purpose)?,
                    },
                ))
            })
            .collect::<Result<_, AdminError>>()?;

        Ok(Self {
            instrument: file.instrument,
            detectors,
            regions: file.regions,
            objects: file.objects.into_iter().map(object_record).collect(),
            sources: file.sources.into_iter().map(detection_record).collect(),
            forced_sources: file
                .forced_sources
                .into_iter()
                .map(detection_record)
                .collect(),
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Remaining DiaObjects, for inspecting the effect of a deletion.
    pub fn remaining_objects(&self) -> &[ObjectRecord] {
        &self.objects
    }

    pub fn remaining_sources(&self) -> &[DetectionRecord] {
        &self.sources
    }

    pub fn remaining_forced_sources(&self) -> &[DetectionRecord] {
        &self.forced_sources
    }

    fn check_instrument(&self, instrument: &str) -> Result<(), AdminError> {
        if instrument != self.instrument {
            return Err(AdminError::FetchFailed(format!(
                "snapshot holds instrument {:?}, not {:?}",
                self.instrument, instrument
            )));
        }
        Ok(())
    }
}

fn parse_purpose(purpose: &str) -> Result<DetectorPurpose, AdminError> {
    match purpose {
        "SCIENCE" => Ok(DetectorPurpose::Science),
        "GUIDER" => Ok(DetectorPurpose::Guide),
        "FOCUS" => Ok(DetectorPurpose::Focus),
        "WAVEFRONT" => Ok(DetectorPurpose::Wavefront),
        other => Err(AdminError::SnapshotFormat(format!(
            "unknown detector purpose {other:?}"
        ))),
    }
}

fn object_record(obj: SnapshotObject) -> ObjectRecord {
    ObjectRecord {
        object_id: obj.object_id,
        ra: obj.ra,
        dec: obj.dec,
        n_sources: obj.n_sources,
    }
}

fn detection_record(det: SnapshotDetection) -> DetectionRecord {
    DetectionRecord {
        detection_id: det.detection_id,
        object_id: det.object_id,
        time_processed: Epoch::from_mjd_in_time_scale(det.time_processed, TimeScale::TAI),
        midpoint_mjd_tai: det.midpoint_mjd_tai,
        visit: det.visit,
        detector: det.detector,
        ra: det.ra,
        dec: det.dec,
    }
}

impl ExposureCatalog for SnapshotStore {
    fn detectors(
        &self,
        instrument: &str,
        visit: VisitId,
    ) -> Result<Vec<DetectorInfo>, AdminError> {
        self.check_instrument(instrument)?;
        Ok(self
            .detectors
            .iter()
            .filter(|(v, _)| *v == visit)
            .map(|(_, d)| d.clone())
            .collect())
    }

    fn detector_regions(
        &self,
        instrument: &str,
        visit: VisitId,
    ) -> Result<Vec<DetectorRegionRecord>, AdminError> {
        self.check_instrument(instrument)?;
        Ok(self
            .regions
            .iter()
            .filter(|r| r.visit == visit)
            .map(|r| DetectorRegionRecord {
                visit: r.visit,
                detector: r.detector,
                region: Box::new(CapRegion::new(r.ra, r.dec, r.radius)) as Box<dyn SkyRegion>,
            })
            .collect())
    }
}

impl ApdbClient for SnapshotStore {
    fn fetch_objects(&self, _region: &dyn SkyRegion) -> Result<Vec<ObjectRecord>, AdminError> {
        // Conservative, partition-style fetch: everything stored. The exact
        // region cut is the caller's responsibility.
        Ok(self.objects.clone())
    }

    fn fetch_sources(
        &self,
        _region: &dyn SkyRegion,
        object_ids: &ObjectIdSet,
        as_of: Epoch,
    ) -> Result<Vec<DetectionRecord>, AdminError> {
        Ok(fetch_detections(&self.sources, object_ids, as_of))
    }

    fn fetch_forced_sources(
        &self,
        _region: &dyn SkyRegion,
        object_ids: &ObjectIdSet,
        as_of: Epoch,
    ) -> Result<Vec<DetectionRecord>, AdminError> {
        Ok(fetch_detections(&self.forced_sources, object_ids, as_of))
    }

    fn delete_records(
        &mut self,
        objects: &[ObjectLocator],
        sources: &[SourceLocator],
        forced_sources: &[ForcedSourceLocator],
    ) -> Result<(), AdminError> {
        let object_ids: ObjectIdSet = objects.iter().map(|o| o.object_id).collect();
        let source_ids: std::collections::HashSet<SourceId> =
            sources.iter().map(|s| s.source_id).collect();

        self.objects.retain(|o| !object_ids.contains(&o.object_id));
        self.sources.retain(|s| !source_ids.contains(&s.detection_id));
        self.forced_sources.retain(|fs| {
            !forced_sources.iter().any(|loc| {
                loc.object_id == fs.object_id
                    && loc.visit == fs.visit
                    && loc.detector == fs.detector
            })
        });
        Ok(())
    }
}

fn fetch_detections(
    stored: &[DetectionRecord],
    object_ids: &ObjectIdSet,
    as_of: Epoch,
) -> Vec<DetectionRecord> {
    stored
        .iter()
        .filter(|d| object_ids.contains(&d.object_id) && d.time_processed <= as_of)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_snapshot() -> SnapshotFile {
        SnapshotFile {
            instrument: "TestCam".to_string(),
            detectors: vec![
                SnapshotDetector {
                    visit: 1,
                    id: 0,
                    purpose: "SCIENCE".to_string(),
                },
                SnapshotDetector {
                    visit: 1,
                    id: 1,
                    purpose: "GUIDER".to_string(),
                },
            ],
            regions: vec![SnapshotRegion {
                visit: 1,
                detector: 0,
                ra: 10.0,
                dec: 0.0,
                radius: 1.0,
            }],
            objects: vec![SnapshotObject {
                object_id: 7,
                ra: 10.0,
                dec: 0.0,
                n_sources: 1,
            }],
            sources: vec![SnapshotDetection {
                detection_id: 70,
                object_id: 7,
                time_processed: 60000.0,
                midpoint_mjd_tai: 60000.0,
                visit: 1,
                detector: 0,
                ra: 10.0,
                dec: 0.0,
            }],
            forced_sources: vec![],
        }
    }

    #[test]
    fn catalog_side_filters_by_visit_and_purpose() {
        let store = SnapshotStore::from_file(minimal_snapshot()).unwrap();

        let detectors = store.detectors("TestCam", 1).unwrap();
        assert_eq!(detectors.len(), 2);
        assert!(store.detectors("TestCam", 2).unwrap().is_empty());

        let regions = store.detector_regions("TestCam", 1).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].detector, 0);
    }

    #[test]
    fn wrong_instrument_is_a_fetch_error() {
        let store = SnapshotStore::from_file(minimal_snapshot()).unwrap();
        assert!(matches!(
            store.detectors("OtherCam", 1),
            Err(AdminError::FetchFailed(_))
        ));
    }

    #[test]
    fn unknown_purpose_is_rejected_on_load() {
        let mut file = minimal_snapshot();
        file.detectors[0].purpose = "IMAGINARY".to_string();
        assert!(matches!(
            SnapshotStore::from_file(file),
            Err(AdminError::SnapshotFormat(_))
        ));
    }

    #[test]
    fn source_fetch_respects_cutoff_and_parents() {
        let store = SnapshotStore::from_file(minimal_snapshot()).unwrap();
        let region = CapRegion::new(10.0, 0.0, 1.0);
        let parents: ObjectIdSet = [7].into_iter().collect();

        let after = Epoch::from_mjd_in_time_scale(60001.0, TimeScale::TAI);
        assert_eq!(store.fetch_sources(&region, &parents, after).unwrap().len(), 1);

        let before = Epoch::from_mjd_in_time_scale(59999.0, TimeScale::TAI);
        assert!(store.fetch_sources(&region, &parents, before).unwrap().is_empty());

        let strangers: ObjectIdSet = [8].into_iter().collect();
        assert!(store.fetch_sources(&region, &strangers, after).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_matching_records() {
        let mut store = SnapshotStore::from_file(minimal_snapshot()).unwrap();
        store
            .delete_records(
                &[ObjectLocator {
                    object_id: 7,
                    ra: 10.0,
                    dec: 0.0,
                }],
                &[SourceLocator {
                    source_id: 70,
                    object_id: 7,
                    ra: 10.0,
                    dec: 0.0,
                    midpoint_mjd_tai: 60000.0,
                }],
                &[],
            )
            .unwrap();
        assert!(store.remaining_objects().is_empty());
        assert!(store.remaining_sources().is_empty());
    }
}
