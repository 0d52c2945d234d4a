// Method Provider Port
// The only thing the bridge knows about the code hosting business logic

use crate::domain::MethodError;
use serde_json::Value;

/// Capability exposing the backend's callable methods
///
/// Implementations:
/// - MethodRegistry: frozen name → typed handler table
/// - StaticMethodProvider: canned results (tests)
pub trait MethodProvider: Send + Sync {
    /// Names of every callable method, sorted
    fn list_methods(&self) -> Vec<String>;

    /// Invoke `method` with a structured params value
    ///
    /// # Errors
    /// - MethodError::NotFound if no such method exists
    /// - MethodError::InvalidParams if `params` does not fit the method
    /// - MethodError::Failed / Panicked if the handler fails
    fn invoke(&self, method: &str, params: Value) -> Result<Value, MethodError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Provider answering every call to a known method with a fixed value
    pub struct StaticMethodProvider {
        results: BTreeMap<String, Result<Value, String>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl StaticMethodProvider {
        pub fn new() -> Self {
            Self {
                results: BTreeMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_result(mut self, method: impl Into<String>, result: Value) -> Self {
            self.results.insert(method.into(), Ok(result));
            self
        }

        pub fn with_error(mut self, method: impl Into<String>, message: impl Into<String>) -> Self {
            self.results.insert(method.into(), Err(message.into()));
            self
        }

        /// Every (method, params) pair seen so far, in call order
        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Default for StaticMethodProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MethodProvider for StaticMethodProvider {
        fn list_methods(&self) -> Vec<String> {
            self.results.keys().cloned().collect()
        }

        fn invoke(&self, method: &str, params: Value) -> Result<Value, MethodError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params));

            match self.results.get(method) {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(message)) => Err(MethodError::failed(message.clone())),
                None => Err(MethodError::NotFound(method.to_string())),
            }
        }
    }
}
