//! # apdb-admin
//!
//! Administrative tooling for an alert-production database (APDB): find the
//! DiaObjects, DiaSources and DiaForcedSources first created by a given
//! visit/detector exposure and either report them or delete them, in support
//! of reprocessing rollback and debugging.
//!
//! The pipeline for one detector is fetch → [`region`] filter →
//! [`grouping`] by parent object → [`classify`] newness → dry-run
//! [`report`] or destructive [`plan`]; [`visit_walker`] drives it over every
//! science detector of a visit. External services stay behind the traits in
//! [`services`]; the only backend linked into this crate is the JSON
//! [`snapshot`] store.

pub mod admin_errors;
pub mod classify;
pub mod config;
pub mod constants;
pub mod grouping;
pub mod plan;
pub mod records;
pub mod region;
pub mod report;
pub mod services;
pub mod snapshot;
pub mod visit_walker;

pub use admin_errors::AdminError;
pub use classify::NewnessPolicy;
pub use visit_walker::VisitWalker;
