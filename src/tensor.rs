//! The tensor handle (spec.md §3 "Tensor"): a reference-counted handle to
//! backend-owned storage, the unit every component above the storage
//! abstraction operates on. Handles are shared and cheap to clone; storage
//! is destroyed when the last handle drops. Two `Tensor`s are equal iff
//! they reference the same storage object.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::algebra::{IndexRange, LabeledTensor, SlicedTensor};
use crate::error::EinsumResult;
use crate::label::Subscript;
use crate::storage::{self, BackendKind, Storage};

struct Inner {
    name: String,
    storage: RefCell<Box<dyn Storage>>,
}

/// A reference-counted handle to a dense block of doubles with a named
/// shape and backend kind (spec.md §3). AST nodes built from a `Tensor`
/// borrow this handle and must not outlive it.
#[derive(Clone)]
pub struct Tensor {
    inner: Rc<Inner>,
}

impl Tensor {
    /// Allocates a zero-filled tensor of the given backend kind and shape
    /// (spec.md §3 "Lifecycle": storage is allocated eagerly).
    pub fn new(kind: BackendKind, name: impl Into<String>, shape: &[usize]) -> EinsumResult<Self> {
        let storage = storage::allocate(kind, shape)?;
        Ok(Self { inner: Rc::new(Inner { name: name.into(), storage: RefCell::new(storage) }) })
    }

    /// Allocates a tensor of the given shape, initialized from a row-major
    /// buffer of values.
    pub fn from_values(
        kind: BackendKind,
        name: impl Into<String>,
        shape: &[usize],
        values: Vec<f64>,
    ) -> EinsumResult<Self> {
        let storage = storage::allocate_from_values(kind, shape, values)?;
        Ok(Self { inner: Rc::new(Inner { name: name.into(), storage: RefCell::new(storage) }) })
    }

    /// Diagnostic name, not used for equality.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.inner.storage.borrow().backend_kind()
    }

    /// Extents, outermost axis first.
    pub fn shape(&self) -> Vec<usize> {
        self.inner.storage.borrow().shape().to_vec()
    }

    pub fn rank(&self) -> usize {
        self.inner.storage.borrow().rank()
    }

    pub fn element_count(&self) -> usize {
        self.inner.storage.borrow().element_count()
    }

    /// True iff `self` and `other` reference the same storage object
    /// (spec.md §3: "Two Tensors are equal iff they reference the same
    /// storage object").
    pub fn is_same_storage(&self, other: &Tensor) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn storage(&self) -> Ref<'_, Box<dyn Storage>> {
        self.inner.storage.borrow()
    }

    pub(crate) fn storage_mut(&self) -> RefMut<'_, Box<dyn Storage>> {
        self.inner.storage.borrow_mut()
    }

    /// Pairs this tensor with an index labeling, producing the building
    /// block of the expression algebra (spec.md §4.C).
    pub fn labeled(&self, labels: &str) -> EinsumResult<LabeledTensor> {
        LabeledTensor::new(self.clone(), Subscript::parse(labels)?)
    }

    /// Selects a hyper-rectangle of this tensor for slice assignment
    /// (spec.md §3 "Sliced tensor", §4.F).
    pub fn slice(&self, ranges: &[IndexRange]) -> SlicedTensor {
        SlicedTensor::new(self.clone(), ranges.to_vec())
    }

    pub fn zero(&self) -> EinsumResult<()> {
        self.storage_mut().zero()
    }

    pub fn scale(&self, alpha: f64) -> EinsumResult<()> {
        self.storage_mut().scale(alpha)
    }

    /// `self <- alpha * other`, element for element. Shapes must already
    /// agree; label-level reconciliation belongs to the expression algebra.
    pub fn copy_from(&self, other: &Tensor, alpha: f64) -> EinsumResult<()> {
        let src = other.storage();
        self.storage_mut().copy(&**src, alpha)
    }

    pub fn norm(&self, p: i32) -> EinsumResult<f64> {
        self.storage().norm(p)
    }

    pub fn dot(&self, other: &Tensor) -> EinsumResult<f64> {
        let b = other.storage();
        self.storage().dot(&**b)
    }

    pub fn pointwise_multiply(&self, other: &Tensor) -> EinsumResult<()> {
        let b = other.storage();
        self.storage_mut().pointwise_multiply(&**b)
    }

    pub fn pointwise_divide(&self, other: &Tensor) -> EinsumResult<()> {
        let b = other.storage();
        self.storage_mut().pointwise_divide(&**b)
    }

    /// Row-major buffer snapshot. Only the in-core backend supports raw
    /// buffer access (spec.md §3); other backends return a
    /// `backend-unsupported` error.
    pub fn buffer(&self) -> EinsumResult<Vec<f64>> {
        Ok(self.storage().dense()?.to_vec())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("name", &self.inner.name)
            .field("backend", &self.backend_kind())
            .field("shape", &self.shape())
            .finish()
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_storage(other)
    }
}

impl Eq for Tensor {}
