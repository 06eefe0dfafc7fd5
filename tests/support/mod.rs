//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use stencil::{DirectorySource, EncoderKind, FamilyConfig, StencilConfig, TemplateRegistry};

pub fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Built-in families reading `tests/fixtures/templates`.
pub fn fixture_registry() -> TemplateRegistry {
    let source = DirectorySource::new([fixtures().join("templates")]);
    TemplateRegistry::with_builtin_families(Arc::new(source)).expect("builtin families")
}

/// Registry configured the way `stencil.toml` would: fixture templates and
/// bundles, with the html family attaching the `messages` bundle.
pub fn configured_registry(language: Option<&str>) -> TemplateRegistry {
    let root = fixtures();
    let config = StencilConfig {
        template_paths: vec![root.join("templates").display().to_string()],
        bundle_paths: vec![root.join("bundles").display().to_string()],
        default_language: language.map(str::to_string),
        families: vec![FamilyConfig::new("html", ".html")
            .with_content_type("text/html")
            .with_encoder(EncoderKind::Html)
            .with_default_bundle("messages")],
        ..StencilConfig::default()
    };
    TemplateRegistry::from_config(&config).expect("fixture config")
}

/// Route engine logs to the test harness; repeated calls are harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
