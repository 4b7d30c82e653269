//! Tracing setup shared by MCP servers
//!
//! stdout carries the MCP stdio transport, so every log line goes to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable selecting the log line format (`json` or text)
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Initialize tracing for an MCP server process
///
/// Each entry of `crate_names` gets an `info` directive on top of whatever
/// `RUST_LOG` asks for, so a server and the library crates it is built from
/// log by default without drowning the output in dependency noise.
///
/// Set `LOG_FORMAT=json` for JSON lines; anything else gives plain text
/// without ANSI colors.
///
/// ```rust,ignore
/// mcp_common::init_tracing(&["dida_mcp", "mcp_common"])?;
/// ```
pub fn init_tracing(crate_names: &[&str]) -> anyhow::Result<()> {
    let mut filter = EnvFilter::from_default_env();
    for name in crate_names {
        filter = filter.add_directive(format!("{}=info", name).parse()?);
    }

    let registry = tracing_subscriber::registry().with(filter);

    if json_requested(std::env::var(LOG_FORMAT_ENV).ok().as_deref()) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}
