//! Schema-validated, path-addressable process state.
//!
//! The stored document always satisfies the schema: updates validate the whole
//! candidate first and only then swap it in. Writers are serialised by a mutex;
//! readers clone an `Arc` snapshot under a read lock, so they observe either the
//! previous document or the fully applied replacement.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::path::{Path, PathError};
use crate::schema::{SchemaError, SchemaValidator, ValidationError};

/// Failure to build a state with an initial document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub struct State {
    validator: Box<dyn SchemaValidator>,
    document: RwLock<Option<Arc<Value>>>,
    writer: Mutex<()>,
}

impl State {
    /// Bind a new, empty state to `validator`.
    ///
    /// The schema must declare a top-level object/record container.
    pub fn new(validator: impl SchemaValidator + 'static) -> Result<Self, SchemaError> {
        if !validator.declares_top_level_container() {
            return Err(SchemaError::UnsupportedContainer);
        }
        Ok(Self {
            validator: Box::new(validator),
            document: RwLock::new(None),
            writer: Mutex::new(()),
        })
    }

    /// Bind a new state and accept `document` as its first value.
    pub fn with_document(
        validator: impl SchemaValidator + 'static,
        document: Value,
    ) -> Result<Self, StateError> {
        let state = Self::new(validator)?;
        state.update(document)?;
        Ok(state)
    }

    /// Validate `document` and, if it conforms, replace the stored document.
    ///
    /// On failure the previous document is left untouched and every violation
    /// is reported.
    pub fn update(&self, document: Value) -> Result<Arc<Value>, ValidationError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        if let Err(violations) = self.validator.validate(&document) {
            warn!(violations = violations.len(), "rejected state update");
            return Err(ValidationError { violations });
        }

        let snapshot = Arc::new(document);
        *self
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));
        debug!("state document replaced");
        Ok(snapshot)
    }

    /// The current document, or `None` before the first accepted update.
    pub fn snapshot(&self) -> Option<Arc<Value>> {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve a path expression such as `.a.b[3].c` against the current document.
    pub fn value_at_path(&self, expr: &str) -> Result<Value, PathError> {
        let path = Path::parse(expr)?;
        let document = self.snapshot().ok_or_else(|| PathError::NoDocument {
            path: expr.to_string(),
        })?;
        path.resolve(&document).cloned()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("document", &self.snapshot())
            .finish_non_exhaustive()
    }
}
