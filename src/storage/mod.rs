//! Storage abstraction (spec.md §4.A): a polymorphic handle to a dense
//! block of doubles with named shape, behind which backends differ only in
//! where the bytes actually live.

mod backend;
mod in_core;

#[cfg(feature = "disk-backend")]
mod disk;
#[cfg(feature = "distributed-backend")]
mod distributed;

pub use backend::{BackendKind, Storage};
pub use in_core::InCoreStorage;

#[cfg(feature = "disk-backend")]
pub use disk::DiskStorage;
#[cfg(feature = "distributed-backend")]
pub use distributed::DistributedStorage;

use crate::error::{EinsumError, EinsumResult};

/// Allocates a zero-filled storage of the requested kind and shape.
///
/// `Agnostic` defers to the in-core backend (spec.md §6, "Agnostic kind
/// defers to library default").
pub fn allocate(kind: BackendKind, shape: &[usize]) -> EinsumResult<Box<dyn Storage>> {
    match kind {
        BackendKind::InCore | BackendKind::Agnostic => {
            Ok(Box::new(in_core::InCoreStorage::zeros(shape)))
        }
        #[cfg(feature = "disk-backend")]
        BackendKind::Disk => Ok(Box::new(disk::DiskStorage::zeros(shape))),
        #[cfg(not(feature = "disk-backend"))]
        BackendKind::Disk => Err(EinsumError::unsupported(
            "the disk backend requires the `disk-backend` feature",
        )),
        #[cfg(feature = "distributed-backend")]
        BackendKind::Distributed => Ok(Box::new(distributed::DistributedStorage::zeros(shape))),
        #[cfg(not(feature = "distributed-backend"))]
        BackendKind::Distributed => Err(EinsumError::unsupported(
            "the distributed backend requires the `distributed-backend` feature",
        )),
    }
}

/// Allocates a storage of the requested kind, initialized from `values`.
pub fn allocate_from_values(
    kind: BackendKind,
    shape: &[usize],
    values: Vec<f64>,
) -> EinsumResult<Box<dyn Storage>> {
    match kind {
        BackendKind::InCore | BackendKind::Agnostic => {
            Ok(Box::new(in_core::InCoreStorage::from_values(shape, values)?))
        }
        #[cfg(feature = "disk-backend")]
        BackendKind::Disk => Ok(Box::new(disk::DiskStorage::from_values(shape, values)?)),
        #[cfg(not(feature = "disk-backend"))]
        BackendKind::Disk => Err(EinsumError::unsupported(
            "the disk backend requires the `disk-backend` feature",
        )),
        #[cfg(feature = "distributed-backend")]
        BackendKind::Distributed => {
            Ok(Box::new(distributed::DistributedStorage::from_values(shape, values)?))
        }
        #[cfg(not(feature = "distributed-backend"))]
        BackendKind::Distributed => Err(EinsumError::unsupported(
            "the distributed backend requires the `distributed-backend` feature",
        )),
    }
}
