//! Local operator demonstration.
//!
//! Demonstrates:
//! - An in-process operator accepting the bridge's connection
//! - hello / welcome handshake
//! - Driving a search form with fill, type, click, wait and get
//! - Raw expression evaluation with script access granted
//! - Reconnecting after the operator drops the channel
//!
//! Usage:
//!   cargo run --example local_operator
//!   cargo run --example local_operator -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use tracing_subscriber::EnvFilter;

use page_bridge::{Bridge, BridgeOptions, ElementSpec, MemoryPage, MemoryScript, ScriptAccess};

// ============================================================================
// Constants
// ============================================================================

const PAGE_URL: &str = "https://shop.example.com/search";

const FRAME_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Types
// ============================================================================

type OperatorSocket = WebSocketStream<TcpStream>;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    println!("=== Local Operator ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Building page and bridge...");

    let page = Arc::new(MemoryPage::new(PAGE_URL));
    page.set_title("Search");
    let form = page.insert(ElementSpec::new("form").id("search"))?;
    page.insert(ElementSpec::new("input").attr("name", "q").child_of(form))?;
    page.insert(ElementSpec::new("button").id("go").text("Go").child_of(form))?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let endpoint = format!("ws://{}/bridge", listener.local_addr()?);

    let bridge = Bridge::builder()
        .page(page.clone())
        .endpoint(&endpoint)
        .options(BridgeOptions::new().with_reconnect_delay(Duration::from_millis(500)))
        .script_access(ScriptAccess::trusted(MemoryScript::new(page.clone())))
        .build()?;

    bridge.connect();
    println!("        ✓ Bridge dialing {endpoint}\n");

    // ========================================================================
    // Handshake
    // ========================================================================

    println!("[1] Waiting for hello...");
    let mut ws = accept(&listener).await?;
    let hello = recv(&mut ws).await?;
    println!("    ✓ {hello}");

    send(&mut ws, json!({"type": "welcome", "clientId": "demo-1"})).await?;
    println!("    ✓ Sent welcome\n");

    // ========================================================================
    // Tasks
    // ========================================================================

    println!("[2] Driving the form...");
    let tasks = [
        json!({"type": "fill", "selector": "input[name=q]", "value": "wool"}),
        json!({"type": "type", "selector": "input[name=q]", "text": " socks", "delay": 10}),
        json!({"type": "get", "selector": "input[name=q]"}),
        json!({"type": "click", "selector": "#go"}),
        json!({"type": "wait", "selector": "#results", "timeout": 300}),
        json!({"type": "hover", "selector": "#go"}),
    ];

    for (n, action) in tasks.into_iter().enumerate() {
        let task_id = format!("t{n}");
        send(&mut ws, json!({"type": "task", "taskId": task_id, "action": action})).await?;
        let result = recv(&mut ws).await?;
        println!("    {task_id}: {result}");
    }

    println!("\n[3] Evaluating an expression...");
    send(&mut ws, json!({"type": "task", "taskId": "e1", "code": "document.title"})).await?;
    println!("    e1: {}", recv(&mut ws).await?);

    // ========================================================================
    // Reconnect
    // ========================================================================

    println!("\n[4] Dropping the channel...");
    ws.close(None).await?;
    drop(ws);

    let mut ws = accept(&listener).await?;
    println!("    ✓ Reconnected: {}", recv(&mut ws).await?);
    send(&mut ws, json!({"type": "welcome", "clientId": "demo-2"})).await?;

    // ========================================================================
    // Cleanup
    // ========================================================================

    bridge.shutdown().await;
    println!("\n[Cleanup] ✓ Bridge state: {}", bridge.state());

    Ok(())
}

// ============================================================================
// Functions
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

async fn accept(listener: &TcpListener) -> anyhow::Result<OperatorSocket> {
    let (stream, _) = timeout(FRAME_TIMEOUT, listener.accept())
        .await
        .context("bridge did not connect")??;
    Ok(accept_async(stream).await?)
}

async fn recv(ws: &mut OperatorSocket) -> anyhow::Result<Value> {
    loop {
        let message = timeout(FRAME_TIMEOUT, ws.next())
            .await
            .context("no frame from bridge")?
            .context("channel ended")??;

        match message {
            Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
            Message::Close(_) => bail!("bridge closed the channel"),
            _ => {}
        }
    }
}

async fn send(ws: &mut OperatorSocket, frame: Value) -> anyhow::Result<()> {
    ws.send(Message::Text(frame.to_string().into())).await?;
    Ok(())
}
