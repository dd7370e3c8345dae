//! # Catalog record snapshots
//!
//! Minimal row types for the three APDB tables this tool touches: DiaObject,
//! DiaSource and DiaForcedSource. Each is an immutable snapshot of the subset
//! of columns needed for classification and deletion, fetched once per
//! detector pass and discarded at the end of the pass.
//!
//! Sources and forced sources share the same column subset, so both are
//! represented by a single [`DetectionRecord`] shape; the record kind only
//! matters again at locator-construction time (see [`crate::plan`]).

use hifitime::Epoch;

use crate::constants::{Degree, DetectorId, ObjectId, SourceId, VisitId, MJD};
use crate::region::SkyPosition;

/// Subset of DiaObject columns used by this tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    pub object_id: ObjectId,
    /// Right ascension in degrees.
    pub ra: Degree,
    /// Declination in degrees.
    pub dec: Degree,
    /// Number of DiaSources associated with this object, as recorded in the
    /// catalog (`nDiaSources` column).
    pub n_sources: u32,
}

/// Subset of DiaSource / DiaForcedSource columns used by this tool.
///
/// The parent `object_id` is a foreign key into the co-fetched DiaObject
/// snapshot; a detection whose parent is absent from that snapshot cannot be
/// located for deletion and is never acted upon.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    pub detection_id: SourceId,
    pub object_id: ObjectId,
    /// Wall-clock time at which the record was written by the pipeline.
    pub time_processed: Epoch,
    /// Mid-exposure time of the observation (MJD, TAI).
    pub midpoint_mjd_tai: MJD,
    pub visit: VisitId,
    pub detector: DetectorId,
    /// Right ascension in degrees.
    pub ra: Degree,
    /// Declination in degrees.
    pub dec: Degree,
}

impl SkyPosition for ObjectRecord {
    fn ra(&self) -> Degree {
        self.ra
    }

    fn dec(&self) -> Degree {
        self.dec
    }
}

impl SkyPosition for DetectionRecord {
    fn ra(&self) -> Degree {
        self.ra
    }

    fn dec(&self) -> Degree {
        self.dec
    }
}
