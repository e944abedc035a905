//! DevTools page demonstration.
//!
//! Demonstrates:
//! - Attaching to a live browser tab over the DevTools protocol
//! - Reporting that tab to an operator endpoint
//! - Granting script access through the tab's own JavaScript engine
//!
//! Start a browser with remote debugging enabled, then copy a tab's
//! `webSocketDebuggerUrl` from `http://127.0.0.1:9222/json`:
//!
//! ```sh
//! chromium --remote-debugging-port=9222
//! ```
//!
//! Usage:
//!   cargo run --example devtools_page -- <devtools-ws-url> <operator-ws-url>
//!   cargo run --example devtools_page -- <devtools-ws-url> <operator-ws-url> --debug

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use page_bridge::{Bridge, CdpPage, CdpScript, Page, ScriptAccess};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug = args.iter().any(|a| a == "--debug");
    init_logging(debug);

    let positional: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| !a.starts_with("--"))
        .collect();

    let [devtools, operator] = positional[..] else {
        eprintln!("usage: devtools_page <devtools-ws-url> <operator-ws-url> [--debug]");
        std::process::exit(2);
    };

    if let Err(e) = run(devtools, operator).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(devtools: &str, operator: &str) -> anyhow::Result<()> {
    println!("=== DevTools Page ===\n");

    println!("[Setup] Attaching to {devtools}...");
    let page = CdpPage::connect(devtools)
        .await
        .context("Failed to attach to the tab")?;
    println!("[Setup] Tab is at {}", page.location());

    let bridge = Bridge::builder()
        .page(Arc::new(page.clone()))
        .endpoint(operator)
        .script_access(ScriptAccess::trusted(CdpScript::new(page)))
        .build()?;

    bridge.connect();
    println!("[Run] Reporting to {}; press Ctrl+C to stop", bridge.endpoint());

    tokio::signal::ctrl_c().await?;

    println!("\n[Shutdown] Closing bridge...");
    bridge.shutdown().await;
    println!("[Shutdown] Done");
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(debug: bool) {
    let filter = if debug {
        "page_bridge=debug"
    } else {
        "page_bridge=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
