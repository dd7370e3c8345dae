//! # Sky regions and spatial filtering
//!
//! The spatial side of the tool is deliberately thin: region containment is a
//! black-box primitive behind the [`SkyRegion`] trait, and the only spatial
//! operation the core performs is [`filter_region`] — pruning a catalog
//! snapshot to the rows whose coordinates fall inside a detector footprint.
//!
//! Spatial queries against the database are region-scoped but conservative
//! (the backend returns everything overlapping the region's bounding
//! partitions), so a second, exact containment pass is required on the
//! client side.
//!
//! [`CapRegion`] is the one concrete region shipped with the crate: a
//! spherical cap, sufficient for snapshot files and tests. Production region
//! shapes (convex polygons from the exposure catalog) arrive through the
//! same trait.

use nalgebra::Vector3;

use crate::admin_errors::AdminError;
use crate::constants::Degree;

/// A row with a sky position in degrees.
pub trait SkyPosition {
    fn ra(&self) -> Degree;
    fn dec(&self) -> Degree;
}

/// Opaque spherical-geometry region supporting point containment.
///
/// Implementations must reject directions that are not finite unit vectors
/// (the result of NaN or out-of-range coordinates) with
/// [`AdminError::InvalidCoordinates`] rather than answering arbitrarily;
/// callers of [`filter_region`] rely on such errors propagating untouched.
pub trait SkyRegion {
    /// Test whether the unit direction `direction` lies inside the region.
    fn contains(&self, direction: &Vector3<f64>) -> Result<bool, AdminError>;
}

/// Convert (ra, dec) in degrees to a unit direction vector.
pub fn unit_direction(ra: Degree, dec: Degree) -> Vector3<f64> {
    let (sin_ra, cos_ra) = ra.to_radians().sin_cos();
    let (sin_dec, cos_dec) = dec.to_radians().sin_cos();
    Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
}

/// Filter out rows from a catalog snapshot which are outside `region`.
///
/// Arguments
/// ---------
/// * `rows`: catalog rows exposing a sky position in degrees.
/// * `region`: region to filter the rows to.
///
/// Return
/// ------
/// * The rows contained in the region, in their original relative order.
///
/// An empty input returns immediately without evaluating containment.
/// Containment errors (malformed coordinates) abort the filter and propagate.
pub fn filter_region<T: SkyPosition>(
    rows: Vec<T>,
    region: &dyn SkyRegion,
) -> Result<Vec<T>, AdminError> {
    if rows.is_empty() {
        return Ok(rows);
    }

    let mut inside = Vec::with_capacity(rows.len());
    for row in rows {
        if region.contains(&unit_direction(row.ra(), row.dec()))? {
            inside.push(row);
        }
    }
    Ok(inside)
}

/// Spherical cap: all directions within `radius` of `center`.
#[derive(Debug, Clone)]
pub struct CapRegion {
    center: Vector3<f64>,
    cos_radius: f64,
}

impl CapRegion {
    /// Build a cap from its center coordinates in degrees and its angular
    /// radius in degrees.
    pub fn new(ra: Degree, dec: Degree, radius: Degree) -> Self {
        Self {
            center: unit_direction(ra, dec),
            cos_radius: radius.to_radians().cos(),
        }
    }
}

impl SkyRegion for CapRegion {
    fn contains(&self, direction: &Vector3<f64>) -> Result<bool, AdminError> {
        if !direction.iter().all(|c| c.is_finite()) {
            let (ra, dec) = direction_to_radec(direction);
            return Err(AdminError::InvalidCoordinates { ra, dec });
        }
        Ok(self.center.dot(direction) >= self.cos_radius)
    }
}

fn direction_to_radec(direction: &Vector3<f64>) -> (Degree, Degree) {
    let mut ra = direction.y.atan2(direction.x).to_degrees();
    if ra < 0.0 {
        ra += 360.0;
    }
    (ra, direction.z.asin().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::records::ObjectRecord;

    fn object(object_id: i64, ra: f64, dec: f64) -> ObjectRecord {
        ObjectRecord {
            object_id,
            ra,
            dec,
            n_sources: 1,
        }
    }

    #[test]
    fn unit_direction_cardinal_points() {
        use approx::assert_relative_eq;

        let x = unit_direction(0.0, 0.0);
        assert_relative_eq!(x.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(x.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(x.z, 0.0, epsilon = 1e-12);

        let north = unit_direction(123.0, 90.0);
        assert_relative_eq!(north.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn filter_keeps_inside_rows_in_order() {
        let region = CapRegion::new(10.0, 20.0, 1.0);
        let rows = vec![
            object(1, 10.1, 20.1),
            object(2, 50.0, -30.0),
            object(3, 9.9, 19.9),
        ];

        let inside = filter_region(rows, &region).unwrap();
        let ids: Vec<i64> = inside.iter().map(|o| o.object_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn filter_empty_input_short_circuits() {
        // A region that fails on any containment call proves the filter
        // never evaluated one.
        struct PoisonRegion;
        impl SkyRegion for PoisonRegion {
            fn contains(&self, _direction: &Vector3<f64>) -> Result<bool, AdminError> {
                Err(AdminError::FetchFailed("containment must not be called".into()))
            }
        }

        let inside = filter_region(Vec::<ObjectRecord>::new(), &PoisonRegion).unwrap();
        assert!(inside.is_empty());
    }

    #[test]
    fn nan_coordinates_propagate_primitive_error() {
        let region = CapRegion::new(0.0, 0.0, 5.0);
        let rows = vec![object(1, f64::NAN, 0.0)];

        let err = filter_region(rows, &region).unwrap_err();
        assert!(matches!(err, AdminError::InvalidCoordinates { .. }));
    }
}
