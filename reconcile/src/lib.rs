pub mod cluster;
pub mod connectivity;
pub mod consensus;
pub mod errors;
pub mod homogenize;
pub mod id_map;
pub mod import;
pub mod majority;
pub mod misc;
pub mod reconcile;
pub mod representative;
pub mod table;
#[macro_use]
extern crate log;

pub use errors::{ReconcileError, Result};
pub use reconcile::{Reconcile, ReconcileConfig};
