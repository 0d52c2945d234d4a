// Panic isolation for method handlers
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed without panicking
    Success(T),
    /// Execution panicked; carries the panic message
    Panicked(String),
}

/// Execute a closure with panic isolation
///
/// If the closure panics, the panic is caught and returned as
/// `PanicGuardResult::Panicked`, so one bad handler cannot take the
/// bridge loop down.
///
/// # Example
/// ```text
/// let result = execute_guarded(|| panic!("boom"));
/// assert!(matches!(result, PanicGuardResult::Panicked(_)));
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            error!(panic_msg = %panic_msg, "Method handler panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_value_through() {
        match execute_guarded(|| 21 * 2) {
            PanicGuardResult::Success(v) => assert_eq!(v, 42),
            PanicGuardResult::Panicked(msg) => panic!("unexpected panic: {}", msg),
        }
    }

    #[test]
    fn test_str_panic_is_caught() {
        let result: PanicGuardResult<()> = execute_guarded(|| panic!("static message"));
        match result {
            PanicGuardResult::Panicked(msg) => assert_eq!(msg, "static message"),
            PanicGuardResult::Success(_) => panic!("panic was not caught"),
        }
    }

    #[test]
    fn test_formatted_panic_is_caught() {
        let n = 7;
        let result: PanicGuardResult<()> = execute_guarded(move || panic!("value was {}", n));
        match result {
            PanicGuardResult::Panicked(msg) => assert_eq!(msg, "value was 7"),
            PanicGuardResult::Success(_) => panic!("panic was not caught"),
        }
    }
}
