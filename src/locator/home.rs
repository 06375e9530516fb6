//! Factory handle with shape-selected construction entry points

use std::fmt;
use std::sync::Arc;

use super::FactoryHandle;
use crate::backend::Backend;
use crate::failure::Failure;
use crate::interface::{Value, ValueKind};

/// Construction entry point stored in a [`Home`]
pub type Constructor = Arc<dyn Fn(&[Value]) -> Result<Arc<dyn Backend>, Failure> + Send + Sync>;

struct EntryPoint {
    params: Vec<ValueKind>,
    construct: Constructor,
}

/// Factory handle exposing one or more `create` entry points
///
/// [`FactoryHandle::create`] runs the first entry point whose parameter
/// shapes accept the construction arguments.
///
/// ```
/// use dyndelegate::backend::{Backend, ServiceObject};
/// use dyndelegate::locator::{FactoryHandle, Home};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let home = Home::new("LedgerHome").create_with([], |_| {
///     Ok(Arc::new(ServiceObject::new("LedgerBean")) as Arc<dyn Backend>)
/// });
/// assert!(home.create(&[]).is_ok());
/// assert!(home.create(&[json!(1)]).is_err());
/// ```
pub struct Home {
    handle_type: String,
    entry_points: Vec<EntryPoint>,
}

impl Home {
    pub fn new(handle_type: impl Into<String>) -> Self {
        Self {
            handle_type: handle_type.into(),
            entry_points: Vec::new(),
        }
    }

    /// Add a construction entry point
    pub fn create_with<F>(mut self, params: impl IntoIterator<Item = ValueKind>, construct: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Arc<dyn Backend>, Failure> + Send + Sync + 'static,
    {
        self.entry_points.push(EntryPoint {
            params: params.into_iter().collect(),
            construct: Arc::new(construct),
        });
        self
    }

    /// Parameter shapes of every entry point, in declaration order
    pub fn entry_points(&self) -> impl Iterator<Item = &[ValueKind]> {
        self.entry_points.iter().map(|entry| entry.params.as_slice())
    }
}

impl FactoryHandle for Home {
    fn handle_type(&self) -> &str {
        &self.handle_type
    }

    fn create(&self, args: &[Value]) -> Result<Arc<dyn Backend>, Failure> {
        let entry = self
            .entry_points
            .iter()
            .find(|entry| ValueKind::accepts_all(&entry.params, args))
            .ok_or_else(|| {
                let shapes: Vec<&str> = args.iter().map(|arg| ValueKind::of(arg).as_str()).collect();
                Failure::unchecked(format!(
                    "{} has no create entry point accepting ({})",
                    self.handle_type,
                    shapes.join(", ")
                ))
            })?;
        (entry.construct)(args)
    }
}

impl fmt::Debug for Home {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Home")
            .field("handle_type", &self.handle_type)
            .field("entry_points", &self.entry_points().collect::<Vec<_>>())
            .finish()
    }
}
