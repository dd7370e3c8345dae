//! # Constants and type definitions for apdb-admin
//!
//! This module centralizes the **type aliases** and **container types** used
//! throughout the crate. Identifiers mirror the column types of the alert
//! production database (APDB) schema: 64-bit record identifiers, integer
//! visit/detector numbers, sky coordinates in degrees and observation times
//! as Modified Julian Dates on the TAI scale.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::records::{DetectionRecord, ObjectRecord};

// -------------------------------------------------------------------------------------------------
// Scalar aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;

/// Modified Julian Date (days, TAI)
pub type MJD = f64;

/// DiaObject identifier (`diaObjectId` column)
pub type ObjectId = i64;

/// DiaSource / DiaForcedSource identifier
pub type SourceId = i64;

/// Visit number of one telescope exposure
pub type VisitId = u64;

/// Detector (sensor) number within the focal plane
pub type DetectorId = u32;

// -------------------------------------------------------------------------------------------------
// Containers
// -------------------------------------------------------------------------------------------------

/// Detections belonging to a single parent object.
///
/// Most objects carry only a handful of detections per region snapshot, so a
/// small inline vector avoids one heap allocation per group in the common
/// case.
pub type Detections = SmallVec<[DetectionRecord; 4]>;

/// Detections grouped by their parent object identifier, each group ordered
/// chronologically (see [`group_by_object`](crate::grouping::group_by_object)).
pub type DetectionGroups = HashMap<ObjectId, Detections>;

/// Object records keyed by their identifier.
pub type ObjectMap = HashMap<ObjectId, ObjectRecord>;

/// Set of object identifiers present in one region snapshot.
pub type ObjectIdSet = HashSet<ObjectId>;
