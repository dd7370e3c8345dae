//! Shared fixture for the visit-walker integration tests: one snapshot of a
//! three-detector visit with objects covering every classification case, and
//! an APDB wrapper recording the locator batches handed to `delete_records`.

use hifitime::Epoch;

use apdb_admin::admin_errors::AdminError;
use apdb_admin::constants::ObjectIdSet;
use apdb_admin::plan::{ForcedSourceLocator, ObjectLocator, SourceLocator};
use apdb_admin::records::{DetectionRecord, ObjectRecord};
use apdb_admin::region::SkyRegion;
use apdb_admin::services::ApdbClient;
use apdb_admin::snapshot::SnapshotStore;

/// Visit 100 of instrument "TestCam", detectors 10/11/12 (science) and 90
/// (wavefront). Objects:
///
/// * 1 — detector 10 footprint, no sources, one forced source.
/// * 2 — detector 10 footprint, first source in visit 100.
/// * 3 — detector 10 footprint, first source in visit 99.
/// * 4 — detector 11 footprint, first source in visit 100.
/// * 5 — outside every footprint, returned only by the conservative fetch.
pub const FIXTURE: &str = r#"{
  "instrument": "TestCam",
  "detectors": [
    {"visit": 100, "id": 10, "purpose": "SCIENCE"},
    {"visit": 100, "id": 11, "purpose": "SCIENCE"},
    {"visit": 100, "id": 12, "purpose": "SCIENCE"},
    {"visit": 100, "id": 90, "purpose": "WAVEFRONT"}
  ],
  "regions": [
    {"visit": 100, "detector": 10, "ra": 10.0, "dec": 0.0, "radius": 1.0},
    {"visit": 100, "detector": 11, "ra": 20.0, "dec": 0.0, "radius": 1.0},
    {"visit": 100, "detector": 12, "ra": 30.0, "dec": 0.0, "radius": 1.0}
  ],
  "objects": [
    {"object_id": 1, "ra": 10.1, "dec": 0.1, "n_sources": 0},
    {"object_id": 2, "ra": 10.0, "dec": -0.1, "n_sources": 2},
    {"object_id": 3, "ra": 9.9, "dec": 0.0, "n_sources": 2},
    {"object_id": 4, "ra": 20.0, "dec": 0.0, "n_sources": 1},
    {"object_id": 5, "ra": 55.0, "dec": 5.0, "n_sources": 1}
  ],
  "sources": [
    {"detection_id": 201, "object_id": 2, "time_processed": 60110.1, "midpoint_mjd_tai": 60110.0, "visit": 101, "detector": 10, "ra": 10.0, "dec": -0.1},
    {"detection_id": 200, "object_id": 2, "time_processed": 60100.1, "midpoint_mjd_tai": 60100.0, "visit": 100, "detector": 10, "ra": 10.0, "dec": -0.1},
    {"detection_id": 300, "object_id": 3, "time_processed": 60090.1, "midpoint_mjd_tai": 60090.0, "visit": 99, "detector": 10, "ra": 9.9, "dec": 0.0},
    {"detection_id": 301, "object_id": 3, "time_processed": 60100.1, "midpoint_mjd_tai": 60100.0, "visit": 100, "detector": 10, "ra": 9.9, "dec": 0.0},
    {"detection_id": 400, "object_id": 4, "time_processed": 60100.1, "midpoint_mjd_tai": 60100.0, "visit": 100, "detector": 11, "ra": 20.0, "dec": 0.0},
    {"detection_id": 500, "object_id": 5, "time_processed": 60100.1, "midpoint_mjd_tai": 60100.0, "visit": 100, "detector": 12, "ra": 55.0, "dec": 5.0}
  ],
  "forced_sources": [
    {"detection_id": 1000, "object_id": 1, "time_processed": 60100.2, "midpoint_mjd_tai": 60100.0, "visit": 100, "detector": 10, "ra": 10.1, "dec": 0.1},
    {"detection_id": 2000, "object_id": 2, "time_processed": 60100.2, "midpoint_mjd_tai": 60100.0, "visit": 100, "detector": 10, "ra": 10.0, "dec": -0.1},
    {"detection_id": 2001, "object_id": 2, "time_processed": 60110.2, "midpoint_mjd_tai": 60110.0, "visit": 101, "detector": 10, "ra": 10.0, "dec": -0.1},
    {"detection_id": 3000, "object_id": 3, "time_processed": 60100.2, "midpoint_mjd_tai": 60100.0, "visit": 100, "detector": 10, "ra": 9.9, "dec": 0.0}
  ]
}"#;

pub fn fixture_store() -> SnapshotStore {
    SnapshotStore::from_json(FIXTURE).expect("fixture snapshot must parse")
}

/// One recorded `delete_records` batch.
pub struct DeleteBatch {
    pub objects: Vec<ObjectLocator>,
    pub sources: Vec<SourceLocator>,
    pub forced_sources: Vec<ForcedSourceLocator>,
}

/// APDB client delegating to a snapshot store while recording every
/// deletion batch it is handed.
pub struct RecordingApdb {
    pub store: SnapshotStore,
    pub batches: Vec<DeleteBatch>,
}

impl RecordingApdb {
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store,
            batches: Vec::new(),
        }
    }
}

impl ApdbClient for RecordingApdb {
    fn fetch_objects(&self, region: &dyn SkyRegion) -> Result<Vec<ObjectRecord>, AdminError> {
        self.store.fetch_objects(region)
    }

    fn fetch_sources(
        &self,
        region: &dyn SkyRegion,
        object_ids: &ObjectIdSet,
        as_of: Epoch,
    ) -> Result<Vec<DetectionRecord>, AdminError> {
        self.store.fetch_sources(region, object_ids, as_of)
    }

    fn fetch_forced_sources(
        &self,
        region: &dyn SkyRegion,
        object_ids: &ObjectIdSet,
        as_of: Epoch,
    ) -> Result<Vec<DetectionRecord>, AdminError> {
        self.store.fetch_forced_sources(region, object_ids, as_of)
    }

    fn delete_records(
        &mut self,
        objects: &[ObjectLocator],
        sources: &[SourceLocator],
        forced_sources: &[ForcedSourceLocator],
    ) -> Result<(), AdminError> {
        self.batches.push(DeleteBatch {
            objects: objects.to_vec(),
            sources: sources.to_vec(),
            forced_sources: forced_sources.to_vec(),
        });
        self.store.delete_records(objects, sources, forced_sources)
    }
}
