// Method Registry - load-once table of backend methods

mod panic_guard;

pub use panic_guard::{execute_guarded, PanicGuardResult};

use crate::domain::{HandlerError, MethodError, NoParams};
use crate::error::{AppError, Result};
use crate::port::MethodProvider;
use serde::de::{self, DeserializeOwned, Unexpected};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;

type BoxedHandler = Box<dyn Fn(Value) -> std::result::Result<Value, MethodError> + Send + Sync>;

/// Collects method handlers before the registry is frozen
///
/// # Example
/// ```
/// use eclips_core::application::MethodRegistryBuilder;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct AddParams {
///     a: i64,
///     b: i64,
/// }
///
/// let mut builder = MethodRegistryBuilder::new();
/// builder
///     .register_no_params("ping", || Ok("pong"))
///     .register("add", |p: AddParams| Ok(p.a + p.b));
/// let registry = builder.build().unwrap();
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Default)]
pub struct MethodRegistryBuilder {
    methods: BTreeMap<String, BoxedHandler>,
    duplicates: Vec<String>,
}

impl MethodRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler taking typed params
    ///
    /// `params` must be an object of named params; it is deserialized into
    /// `P` before the handler runs. A mismatch (including a positional array)
    /// becomes `MethodError::InvalidParams` without calling the handler.
    pub fn register<P, R, F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        P: DeserializeOwned + 'static,
        R: Serialize + 'static,
        F: Fn(P) -> std::result::Result<R, HandlerError> + Send + Sync + 'static,
    {
        let name = name.into();
        let method = name.clone();

        let boxed: BoxedHandler = Box::new(move |params: Value| {
            if !params.is_object() {
                return Err(MethodError::InvalidParams {
                    method: method.clone(),
                    source: de::Error::invalid_type(
                        unexpected(&params),
                        &"an object of named params",
                    ),
                });
            }

            let params: P =
                serde_json::from_value(params).map_err(|source| MethodError::InvalidParams {
                    method: method.clone(),
                    source,
                })?;

            let result = handler(params).map_err(MethodError::Failed)?;

            serde_json::to_value(result).map_err(|source| MethodError::InvalidResult {
                method: method.clone(),
                source,
            })
        });

        if self.methods.insert(name.clone(), boxed).is_some() {
            self.duplicates.push(name);
        }
        self
    }

    /// Register a handler that takes no params (only `{}` is accepted)
    pub fn register_no_params<R, F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        R: Serialize + 'static,
        F: Fn() -> std::result::Result<R, HandlerError> + Send + Sync + 'static,
    {
        self.register(name, move |_: NoParams| handler())
    }

    /// Names registered so far
    pub fn method_names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    /// Freeze the table
    ///
    /// # Errors
    /// - AppError::Config if no method was registered
    /// - AppError::Config if a name was registered twice
    pub fn build(self) -> Result<MethodRegistry> {
        if let Some(name) = self.duplicates.first() {
            return Err(AppError::Config(format!(
                "method '{}' registered more than once",
                name
            )));
        }

        if self.methods.is_empty() {
            return Err(AppError::Config(
                "no backend methods registered".to_string(),
            ));
        }

        Ok(MethodRegistry {
            methods: self.methods,
        })
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Frozen method table; never mutated after `build`
pub struct MethodRegistry {
    methods: BTreeMap<String, BoxedHandler>,
}

impl MethodRegistry {
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MethodProvider for MethodRegistry {
    fn list_methods(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    fn invoke(&self, method: &str, params: Value) -> std::result::Result<Value, MethodError> {
        let handler = self
            .methods
            .get(method)
            .ok_or_else(|| MethodError::NotFound(method.to_string()))?;

        match execute_guarded(AssertUnwindSafe(|| handler(params))) {
            PanicGuardResult::Success(result) => result,
            PanicGuardResult::Panicked(message) => Err(MethodError::Panicked {
                method: method.to_string(),
                message,
            }),
        }
    }
}
