//! # Managed Object Model
//!
//! Every scene entity the device hands out (models, geometries, data buffers,
//! volumes, renderers, cameras) is a managed object: a named-parameter
//! dictionary plus a commit state, stored in a single [`ObjectArena`] that
//! also owns its reference count.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──> set(name, value)* ──> commit() ──> post_commit() ──> Committed
//!               ^                                                   │
//!               └──────────── set() after commit ───────────────────┘
//! ```
//!
//! `commit()` validates the object itself. `post_commit()` runs afterwards
//! with read access to the rest of the arena; a [`Model`] uses it to finalize
//! its geometries.
//!
//! ## References
//!
//! Object-typed parameters and geometry attachment store plain arena keys.
//! They never own the target: the arena reference count is the only owner, and
//! a reference to a destroyed object resolves to [`ObjectError::StaleReference`].
//!
//! [`Model`]: crate::scene::Model

pub mod param;
pub mod data;
pub mod arena;
pub mod context;

pub use param::{Param, ParamSet, ParamValue};
pub use data::{DataBuffer, DataFlags, DataType};
pub use arena::{Object, ObjectArena, Released};
pub use context::CommitContext;

use crate::foundation::collections::ObjectHandle;
use crate::foundation::math::Vec3;
use crate::kernel::KernelError;
use std::fmt;
use thiserror::Error;

/// Result type for object operations
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Recoverable object errors
///
/// These describe scene-authoring mistakes. They are returned to the caller
/// instead of terminating, unlike contract violations.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// A required parameter was never set
    #[error("{object}: missing required parameter '{name}'")]
    MissingParameter {
        /// Type name of the object being validated
        object: &'static str,
        /// Parameter name
        name: String,
    },

    /// A parameter holds a value of the wrong type
    #[error("{object}: parameter '{name}' holds {found}, expected {expected}")]
    ParameterType {
        /// Type name of the object being validated
        object: &'static str,
        /// Parameter name
        name: String,
        /// Expected value type
        expected: &'static str,
        /// Value type actually stored
        found: &'static str,
    },

    /// A parameter refers to an object that has been destroyed
    #[error("{object}: parameter '{name}' refers to a destroyed object")]
    StaleReference {
        /// Type name of the referring object
        object: &'static str,
        /// Parameter name
        name: String,
    },

    /// A parameter refers to an object of the wrong kind
    #[error("{object}: parameter '{name}' refers to a {found}, expected a {expected}")]
    WrongObjectKind {
        /// Type name of the referring object
        object: &'static str,
        /// Parameter name
        name: String,
        /// Kind the parameter must refer to
        expected: ObjectKind,
        /// Kind actually referred to
        found: ObjectKind,
    },

    /// Parameter data is present but unusable
    #[error("{object}: invalid data in '{name}': {reason}")]
    InvalidData {
        /// Type name of the object being validated
        object: &'static str,
        /// Parameter name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Data buffer flags that are not implemented
    #[error("unsupported combination of data flags: {flags:#x}")]
    UnsupportedFlags {
        /// Raw flag bits
        flags: u32,
    },

    /// Geometry is already attached to a model
    #[error("{object} is already attached to model {model:?}")]
    AlreadyAttached {
        /// Type name of the geometry
        object: &'static str,
        /// Model it is attached to
        model: ObjectHandle,
    },

    /// The compute kernel rejected the resolved inputs
    #[error("compute kernel error: {0}")]
    Kernel(#[from] KernelError),
}

/// Kind of a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Geometry container
    Model,
    /// Geometry of any variant
    Geometry,
    /// Typed data buffer
    Data,
    /// Volume
    Volume,
    /// Renderer
    Renderer,
    /// Camera
    Camera,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Model => "model",
            Self::Geometry => "geometry",
            Self::Data => "data buffer",
            Self::Volume => "volume",
            Self::Renderer => "renderer",
            Self::Camera => "camera",
        };
        f.write_str(name)
    }
}

/// Commit state of a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitState {
    /// Parameters changed since the last successful commit (or never committed)
    #[default]
    Uncommitted,
    /// Parameters validated by the last commit
    Committed,
}

/// State shared by every managed object
#[derive(Debug, Clone)]
pub struct ObjectCore {
    type_name: &'static str,
    params: ParamSet,
    state: CommitState,
}

impl ObjectCore {
    /// Create an empty, uncommitted core
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            params: ParamSet::new(),
            state: CommitState::Uncommitted,
        }
    }

    /// Type name the object was created under
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Current commit state
    pub fn state(&self) -> CommitState {
        self.state
    }

    /// Whether the last commit succeeded and nothing changed since
    pub fn is_committed(&self) -> bool {
        self.state == CommitState::Committed
    }

    /// Mark the parameters as validated
    pub fn mark_committed(&mut self) {
        self.state = CommitState::Committed;
    }

    /// Return to the uncommitted state
    pub fn mark_uncommitted(&mut self) {
        self.state = CommitState::Uncommitted;
    }

    /// All parameters in creation order
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Return the named slot, creating an empty one if needed
    pub fn create_param_if_absent(&mut self, name: &str) -> &mut Param {
        self.params.create_if_absent(name)
    }

    /// Look up a parameter
    ///
    /// An absent or empty slot is `Ok(None)`, or [`ObjectError::MissingParameter`]
    /// when `required` is set.
    pub fn find_param(&self, name: &str, required: bool) -> ObjectResult<Option<&Param>> {
        match self.params.find(name).filter(|param| param.is_set()) {
            Some(param) => Ok(Some(param)),
            None if required => Err(self.missing(name)),
            None => Ok(None),
        }
    }

    /// Write a parameter, overwriting any previous value
    ///
    /// Changing a committed object sends it back to [`CommitState::Uncommitted`].
    pub fn set(&mut self, name: &str, value: ParamValue) {
        if self.state == CommitState::Committed {
            log::debug!("{}: '{}' changed after commit", self.type_name, name);
            self.state = CommitState::Uncommitted;
        }
        self.params.create_if_absent(name).set(value);
    }

    /// Check that every named parameter is present
    pub fn require(&self, names: &[&str]) -> ObjectResult<()> {
        for name in names {
            self.find_param(name, true)?;
        }
        Ok(())
    }

    /// Read a float parameter, or `default` when absent
    pub fn get_f32(&self, name: &str, default: f32) -> ObjectResult<f32> {
        match self.value(name) {
            None => Ok(default),
            Some(ParamValue::Float(value)) => Ok(*value),
            Some(other) => Err(self.type_error(name, "float", other)),
        }
    }

    /// Read an integer parameter, or `default` when absent
    pub fn get_i32(&self, name: &str, default: i32) -> ObjectResult<i32> {
        match self.value(name) {
            None => Ok(default),
            Some(ParamValue::Int(value)) => Ok(*value),
            Some(other) => Err(self.type_error(name, "int", other)),
        }
    }

    /// Read a 3-vector parameter, or `default` when absent
    pub fn get_vec3(&self, name: &str, default: Vec3) -> ObjectResult<Vec3> {
        match self.value(name) {
            None => Ok(default),
            Some(ParamValue::Vec3(value)) => Ok(*value),
            Some(other) => Err(self.type_error(name, "vec3f", other)),
        }
    }

    /// Read a string parameter
    pub fn get_string(&self, name: &str) -> ObjectResult<Option<&str>> {
        match self.value(name) {
            None => Ok(None),
            Some(ParamValue::String(value)) => Ok(Some(value.as_str())),
            Some(other) => Err(self.type_error(name, "string", other)),
        }
    }

    /// Read an object-reference parameter
    pub fn get_object(&self, name: &str, required: bool) -> ObjectResult<Option<ObjectHandle>> {
        match self.find_param(name, required)?.and_then(Param::value) {
            None => Ok(None),
            Some(ParamValue::Object(handle)) => Ok(Some(*handle)),
            Some(other) => Err(self.type_error(name, "object", other)),
        }
    }

    /// Read a data-reference parameter
    pub fn get_data(&self, name: &str, required: bool) -> ObjectResult<Option<ObjectHandle>> {
        match self.find_param(name, required)?.and_then(Param::value) {
            None => Ok(None),
            Some(ParamValue::Data(handle)) => Ok(Some(*handle)),
            Some(other) => Err(self.type_error(name, "data", other)),
        }
    }

    /// Build a missing-parameter error for this object
    pub fn missing(&self, name: &str) -> ObjectError {
        ObjectError::MissingParameter {
            object: self.type_name,
            name: name.to_string(),
        }
    }

    /// Build an invalid-data error for this object
    pub fn invalid_data(&self, name: &str, reason: impl Into<String>) -> ObjectError {
        ObjectError::InvalidData {
            object: self.type_name,
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    fn value(&self, name: &str) -> Option<&ParamValue> {
        self.params.find(name).and_then(Param::value)
    }

    fn type_error(&self, name: &str, expected: &'static str, found: &ParamValue) -> ObjectError {
        ObjectError::ParameterType {
            object: self.type_name,
            name: name.to_string(),
            expected,
            found: found.type_name(),
        }
    }
}

/// Behaviour shared by every managed object
///
/// The arena calls [`commit`](Self::commit) first and, only if it succeeds,
/// [`post_commit`](Self::post_commit). Types that need to look at other
/// objects override the second hook; everything else keeps the no-op.
pub trait ManagedObject: Send {
    /// Shared object state
    fn core(&self) -> &ObjectCore;

    /// Mutable shared object state
    fn core_mut(&mut self) -> &mut ObjectCore;

    /// Type name the object was created under
    fn type_name(&self) -> &'static str {
        self.core().type_name()
    }

    /// Validate parameters and mark the object committed
    ///
    /// Must be idempotent: committing twice leaves the same state as once.
    fn commit(&mut self) -> ObjectResult<()> {
        self.core_mut().mark_committed();
        Ok(())
    }

    /// Hook run after a successful [`commit`](Self::commit)
    fn post_commit(&self, _ctx: &mut CommitContext<'_>) -> ObjectResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_param_required() {
        let mut core = ObjectCore::new("test");
        assert!(core.find_param("radius", false).unwrap().is_none());
        assert!(matches!(
            core.find_param("radius", true),
            Err(ObjectError::MissingParameter { object: "test", ref name }) if name == "radius"
        ));

        core.set("radius", ParamValue::Float(2.0));
        assert!(core.find_param("radius", true).unwrap().is_some());
    }

    #[test]
    fn test_empty_slot_counts_as_missing() {
        let mut core = ObjectCore::new("test");
        core.create_param_if_absent("radius");
        assert!(core.find_param("radius", true).is_err());
        assert_eq!(core.params().len(), 1);
    }

    #[test]
    fn test_set_after_commit_uncommits() {
        let mut core = ObjectCore::new("test");
        core.mark_committed();
        assert!(core.is_committed());

        core.set("radius", ParamValue::Float(1.0));
        assert_eq!(core.state(), CommitState::Uncommitted);
    }

    #[test]
    fn test_typed_getters() {
        let mut core = ObjectCore::new("test");
        core.set("scale", ParamValue::Float(0.5));
        core.set("samples", ParamValue::Int(4));
        core.set("dir", ParamValue::Vec3(Vec3::new(0.0, 1.0, 0.0)));
        core.set("label", ParamValue::String("hull".to_string()));

        assert_eq!(core.get_f32("scale", 1.0).unwrap(), 0.5);
        assert_eq!(core.get_f32("absent", 1.0).unwrap(), 1.0);
        assert_eq!(core.get_i32("samples", 1).unwrap(), 4);
        assert_eq!(core.get_vec3("dir", Vec3::zeros()).unwrap(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(core.get_string("label").unwrap(), Some("hull"));
        assert!(core.get_object("absent", false).unwrap().is_none());
    }

    #[test]
    fn test_getter_type_mismatch() {
        let mut core = ObjectCore::new("test");
        core.set("scale", ParamValue::Vec3(Vec3::zeros()));
        assert!(matches!(
            core.get_f32("scale", 1.0),
            Err(ObjectError::ParameterType { expected: "float", found: "vec3f", .. })
        ));
    }

    #[test]
    fn test_require_reports_first_missing() {
        let mut core = ObjectCore::new("test");
        core.set("a", ParamValue::Int(1));
        let err = core.require(&["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, ObjectError::MissingParameter { ref name, .. } if name == "b"));
    }
}
