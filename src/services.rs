//! # Collaborator boundaries
//!
//! The walker talks to two external services, both kept behind narrow
//! traits: the exposure catalog (which detectors a visit exposed and where
//! on the sky each one looked) and the APDB client (region-scoped catalog
//! fetches plus the batched delete). Production backends live elsewhere;
//! this crate ships only the file-backed [`crate::snapshot`] implementation.

use hifitime::Epoch;

use crate::admin_errors::AdminError;
use crate::constants::{DetectorId, ObjectIdSet, VisitId};
use crate::plan::{ForcedSourceLocator, ObjectLocator, SourceLocator};
use crate::records::{DetectionRecord, ObjectRecord};
use crate::region::SkyRegion;

/// Purpose of a detector within the focal plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorPurpose {
    Science,
    Guide,
    Focus,
    Wavefront,
}

/// One detector of an instrument, as listed by the exposure catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorInfo {
    pub id: DetectorId,
    pub purpose: DetectorPurpose,
}

/// Sky footprint of one visit/detector exposure.
pub struct DetectorRegionRecord {
    pub visit: VisitId,
    pub detector: DetectorId,
    pub region: Box<dyn SkyRegion>,
}

/// Metadata service resolving visits to detectors and sky regions.
pub trait ExposureCatalog {
    /// List the detectors exposed by `visit`, with their purposes.
    fn detectors(&self, instrument: &str, visit: VisitId)
        -> Result<Vec<DetectorInfo>, AdminError>;

    /// List the sky regions of `visit`, one per detector.
    fn detector_regions(
        &self,
        instrument: &str,
        visit: VisitId,
    ) -> Result<Vec<DetectorRegionRecord>, AdminError>;
}

/// Alert-production database client.
///
/// Fetches are snapshots scoped to a region (and, for detections, to a set
/// of parent objects and a time cutoff). `delete_records` is all-or-nothing
/// from the caller's perspective: on error the whole batch counts as
/// not-done.
pub trait ApdbClient {
    fn fetch_objects(&self, region: &dyn SkyRegion) -> Result<Vec<ObjectRecord>, AdminError>;

    fn fetch_sources(
        &self,
        region: &dyn SkyRegion,
        object_ids: &ObjectIdSet,
        as_of: Epoch,
    ) -> Result<Vec<DetectionRecord>, AdminError>;

    fn fetch_forced_sources(
        &self,
        region: &dyn SkyRegion,
        object_ids: &ObjectIdSet,
        as_of: Epoch,
    ) -> Result<Vec<DetectionRecord>, AdminError>;

    fn delete_records(
        &mut self,
        objects: &[ObjectLocator],
        sources: &[SourceLocator],
        forced_sources: &[ForcedSourceLocator],
    ) -> Result<(), AdminError>;
}
