// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use miette::{IntoDiagnostic, Result, WrapErr};

/// Install the global tracing subscriber for the given verbosity.
///
/// Directives from `VARCONF_LOG` are appended to the ones derived from
/// the verbosity, and `RUST_LOG` replaces them entirely.
pub fn configure_logging(verbosity: u8) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;

    let mut directives = match verbosity {
        0 => "varconf=info",
        1 => "varconf=debug",
        _ => "varconf=trace",
    }
    .to_string();
    if let Ok(overrides) = std::env::var("VARCONF_LOG") {
        directives = format!("{directives},{overrides}");
    }
    if let Ok(overrides) = std::env::var("RUST_LOG") {
        directives = overrides;
    }
    let env_filter = tracing_subscriber::filter::EnvFilter::new(directives);
    let registry = tracing_subscriber::Registry::default().with(env_filter);
    let mut fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time();
    if verbosity < 2 {
        fmt_layer = fmt_layer.with_target(false);
    }
    let sub = registry.with(fmt_layer);

    tracing::subscriber::set_global_default(sub)
        .into_diagnostic()
        .wrap_err("Failed to set default logger")
}
