//! Backend methods
//!
//! Every method the front end can call is registered here. Add new ones to
//! `register`; the registry is frozen right after it returns.

use eclips_core::application::MethodRegistryBuilder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Facts about the running app, shared with handlers
#[derive(Debug, Clone)]
pub struct AppContext {
    pub name: String,
    pub version: String,
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoParams {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub data_dir: String,
}

pub fn register(builder: &mut MethodRegistryBuilder, ctx: Arc<AppContext>) {
    builder
        .register_no_params("ping", || Ok("pong"))
        .register("echo", |params: EchoParams| Ok(params.message))
        .register_no_params("app.info", move || {
            Ok(AppInfo {
                name: ctx.name.clone(),
                version: ctx.version.clone(),
                data_dir: ctx.data_dir.display().to_string(),
            })
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use eclips_core::application::MethodRegistry;
    use eclips_core::domain::MethodError;
    use eclips_core::port::MethodProvider;
    use serde_json::json;

    fn registry() -> MethodRegistry {
        let ctx = Arc::new(AppContext {
            name: "demo".to_string(),
            version: "1.2.3".to_string(),
            data_dir: PathBuf::from("/data/demo"),
        });
        let mut builder = MethodRegistryBuilder::new();
        register(&mut builder, ctx);
        builder.build().unwrap()
    }

    #[test]
    fn test_all_methods_registered() {
        assert_eq!(registry().list_methods(), vec!["app.info", "echo", "ping"]);
    }

    #[test]
    fn test_ping() {
        assert_eq!(registry().invoke("ping", json!({})).unwrap(), json!("pong"));
    }

    #[test]
    fn test_echo() {
        let result = registry()
            .invoke("echo", json!({"message": "hello"}))
            .unwrap();
        assert_eq!(result, json!("hello"));
    }

    #[test]
    fn test_echo_requires_message() {
        let err = registry().invoke("echo", json!({})).unwrap_err();
        assert!(matches!(err, MethodError::InvalidParams { ref method, .. } if method == "echo"));
    }

    #[test]
    fn test_app_info() {
        let result = registry().invoke("app.info", json!({})).unwrap();
        assert_eq!(
            result,
            json!({
                "name": "demo",
                "version": "1.2.3",
                "data_dir": PathBuf::from("/data/demo").display().to_string(),
            })
        );
    }

    #[test]
    fn test_ping_rejects_params() {
        let err = registry().invoke("ping", json!({"extra": true})).unwrap_err();
        assert!(matches!(err, MethodError::InvalidParams { .. }));
    }
}
