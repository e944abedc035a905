//! Live browser tab over the Chrome DevTools Protocol.
//!
//! [`CdpPage`] attaches to one page target's DevTools WebSocket (the
//! `webSocketDebuggerUrl` listed by `http://127.0.0.1:9222/json` when the
//! browser runs with `--remote-debugging-port=9222`) and implements [`Page`]
//! with `Runtime.evaluate` and `Page.navigate`. [`CdpScript`] evaluates
//! operator code in the same tab.
//!
//! # Element handles
//!
//! Elements stay in the tab. Queries store matches in a page-global
//! registry and hand back their index; the handle also carries the document
//! generation, so a handle taken before a navigation reports
//! [`Error::StaleElement`] instead of reaching an element of the new
//! document.
//!
//! | Call | DevTools method |
//! |------|-----------------|
//! | element operations, queries, evaluation | `Runtime.evaluate` |
//! | [`Page::navigate`] | `Page.navigate` |
//! | location tracking | `Page.frameNavigated`, `Page.navigatedWithinDocument` events |
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use page_bridge::{Bridge, CdpPage, CdpScript, ScriptAccess};
//!
//! # async fn example() -> page_bridge::Result<()> {
//! let page = CdpPage::connect("ws://127.0.0.1:9222/devtools/page/4B1C").await?;
//! let bridge = Bridge::builder()
//!     .page(Arc::new(page.clone()))
//!     .script_access(ScriptAccess::trusted(CdpScript::new(page)))
//!     .build()?;
//! bridge.connect();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::ElementRef;

use super::script::ScriptEngine;
use super::{EventKind, Outcome, Page};

// ============================================================================
// Constants
// ============================================================================

/// Default deadline for one DevTools call.
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Page-global element registry, created on first use in each document.
const REGISTRY: &str = "(globalThis.__pageBridge ??= { refs: [] })";

/// Runs `$BODY` with `el` bound to registry entry `$INDEX`.
const ELEMENT_CALL: &str = r#"(() => {
  const el = $REGISTRY.refs[$INDEX];
  if (!el || !el.isConnected) return { stale: true };
  return { value: ((el) => { $BODY })(el) };
})()"#;

/// Registers every element in `$QUERY` and returns their indices.
const QUERY_CALL: &str = r#"(() => {
  const registry = $REGISTRY;
  let found;
  try { found = $QUERY; } catch (e) { return { invalid: true }; }
  return { refs: found.map((el) => {
    let i = registry.refs.indexOf(el);
    return i < 0 ? registry.refs.push(el) - 1 : i;
  }) };
})()"#;

/// Evaluates `$CODE` globally and tags the value for decoding.
const EVAL_CALL: &str = r#"(() => {
  const registry = $REGISTRY;
  const encode = (v) => {
    if (v === undefined) return { kind: "undefined" };
    if (v instanceof Element) {
      let i = registry.refs.indexOf(v);
      if (i < 0) i = registry.refs.push(v) - 1;
      return { kind: "element", index: i };
    }
    if (Array.isArray(v) || v instanceof NodeList || v instanceof HTMLCollection) {
      return { kind: "list", items: Array.from(v, encode) };
    }
    return { kind: "value", value: v };
  };
  try { return { ok: encode((0, eval)($CODE)) }; }
  catch (e) { return { error: String(e && e.message !== undefined ? e.message : e) }; }
})()"#;

// ============================================================================
// Types
// ============================================================================

type DevToolsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type DevToolsSink = SplitSink<DevToolsStream, Message>;
type DevToolsSource = SplitStream<DevToolsStream>;

type Reply = oneshot::Sender<Result<Value>>;

/// State shared with the reader task.
#[derive(Default)]
struct Shared {
    pending: Mutex<FxHashMap<u64, Reply>>,
    location: Mutex<String>,
    /// Bumped on every main-frame document change.
    generation: AtomicU32,
}

struct CdpInner {
    sink: AsyncMutex<DevToolsSink>,
    shared: Arc<Shared>,
    next_id: AtomicU64,
    call_timeout: Duration,
    reader: JoinHandle<()>,
}

impl Drop for CdpInner {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

// ============================================================================
// CdpPage
// ============================================================================

/// A browser tab driven over its DevTools WebSocket.
///
/// Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct CdpPage {
    inner: Arc<CdpInner>,
}

impl fmt::Debug for CdpPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpPage")
            .field("location", &*self.inner.shared.location.lock())
            .field("pending", &self.inner.shared.pending.lock().len())
            .finish_non_exhaustive()
    }
}

impl CdpPage {
    /// Attaches to the page target at `ws_url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the WebSocket cannot be opened
    /// - any error from enabling page events or reading the location
    pub async fn connect(ws_url: &str) -> Result<Self> {
        Self::connect_with_timeout(ws_url, DEFAULT_CALL_TIMEOUT).await
    }

    /// Like [`connect`](Self::connect), with a custom per-call deadline.
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect).
    pub async fn connect_with_timeout(ws_url: &str, call_timeout: Duration) -> Result<Self> {
        let (ws_stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| Error::connection(format!("DevTools {ws_url}: {e}")))?;
        let (sink, source) = ws_stream.split();

        let shared = Arc::new(Shared::default());
        let reader = tokio::spawn(read_loop(source, Arc::clone(&shared)));

        let page = Self {
            inner: Arc::new(CdpInner {
                sink: AsyncMutex::new(sink),
                shared,
                next_id: AtomicU64::new(1),
                call_timeout,
                reader,
            }),
        };

        page.call("Page.enable", json!({})).await?;
        let href = page.evaluate_value("location.href").await?;
        *page.inner.shared.location.lock() = href.as_str().unwrap_or_default().to_string();

        info!(location = %page.location(), "Attached to DevTools page");
        Ok(page)
    }

    /// Sends one DevTools command and waits for its reply.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] for an error reply or a missed deadline
    /// - [`Error::ConnectionClosed`] if the channel closes first
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = json!({ "id": id, "method": method, "params": params });

        let (tx, rx) = oneshot::channel();
        self.inner.shared.pending.lock().insert(id, tx);
        trace!(id, method, "DevTools call");

        let sent = self
            .inner
            .sink
            .lock()
            .await
            .send(Message::Text(frame.to_string().into()))
            .await;
        if let Err(e) = sent {
            self.inner.shared.pending.lock().remove(&id);
            return Err(e.into());
        }

        match timeout(self.inner.call_timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                self.inner.shared.pending.lock().remove(&id);
                Err(Error::protocol(format!(
                    "{method} got no reply within {}ms",
                    self.inner.call_timeout.as_millis()
                )))
            }
        }
    }

    /// Evaluates `expression` and returns its JSON value.
    async fn evaluate_value(&self, expression: &str) -> Result<Value> {
        let reply = self
            .call(
                "Runtime.evaluate",
                json!({ "expression": expression, "returnByValue": true }),
            )
            .await?;

        if let Some(details) = reply.get("exceptionDetails") {
            return Err(Error::script(exception_text(details)));
        }
        Ok(reply["result"].get("value").cloned().unwrap_or(Value::Null))
    }

    /// Runs `body` with `el` bound to the element.
    async fn with_element(&self, element: ElementRef, body: &str) -> Result<Value> {
        let index = self.index_of(element)?;
        let expression = ELEMENT_CALL
            .replace("$REGISTRY", REGISTRY)
            .replace("$INDEX", &index.to_string())
            .replace("$BODY", body);

        let reply = self.evaluate_value(&expression).await?;
        if reply.get("stale").is_some() {
            return Err(Error::stale_element(element));
        }
        Ok(reply.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn with_element_text(&self, element: ElementRef, body: &str) -> Result<String> {
        let value = self.with_element(element, body).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn query(&self, selector: &str, query: &str) -> Result<Vec<ElementRef>> {
        let literal = js_string(selector)?;
        let expression = QUERY_CALL
            .replace("$REGISTRY", REGISTRY)
            .replace("$QUERY", &query.replace("$SELECTOR", &literal));

        let reply = self.evaluate_value(&expression).await?;
        if reply.get("invalid").is_some() {
            return Err(Error::invalid_selector(selector));
        }

        let generation = self.generation();
        Ok(reply["refs"]
            .as_array()
            .map(|refs| {
                refs.iter()
                    .filter_map(Value::as_u64)
                    .map(|index| handle(generation, index))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn generation(&self) -> u32 {
        self.inner.shared.generation.load(Ordering::Acquire)
    }

    /// Registry index of a handle from the current document.
    fn index_of(&self, element: ElementRef) -> Result<u64> {
        let raw = element.as_raw();
        if (raw >> 32) as u32 != self.generation() {
            return Err(Error::stale_element(element));
        }
        Ok(raw & u64::from(u32::MAX))
    }

    fn decode(&self, encoded: &Value) -> Result<Outcome> {
        match encoded["kind"].as_str() {
            Some("undefined") => Ok(Outcome::Undefined),
            Some("element") => encoded["index"]
                .as_u64()
                .map(|index| Outcome::Element(handle(self.generation(), index)))
                .ok_or_else(|| Error::protocol("element without index")),
            Some("list") => encoded["items"]
                .as_array()
                .map_or(Ok(Vec::new()), |items| {
                    items.iter().map(|item| self.decode(item)).collect()
                })
                .map(Outcome::List),
            _ => Ok(Outcome::Value(
                encoded.get("value").cloned().unwrap_or(Value::Null),
            )),
        }
    }
}

// ============================================================================
// CdpPage - Page
// ============================================================================

#[async_trait]
impl Page for CdpPage {
    fn location(&self) -> String {
        self.inner.shared.location.lock().clone()
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<ElementRef>> {
        let found = self
            .query(selector, "[document.querySelector($SELECTOR)].filter(Boolean)")
            .await?;
        Ok(found.into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementRef>> {
        self.query(selector, "Array.from(document.querySelectorAll($SELECTOR))")
            .await
    }

    async fn value(&self, element: ElementRef) -> Result<Option<String>> {
        let value = self
            .with_element(element, r#"return "value" in el ? String(el.value) : null;"#)
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn set_value(&self, element: ElementRef, value: &str) -> Result<()> {
        let body = format!("el.value = {};", js_string(value)?);
        self.with_element(element, &body).await.map(drop)
    }

    async fn dispatch_event(&self, element: ElementRef, event: EventKind) -> Result<()> {
        let bubbles = matches!(event, EventKind::Input | EventKind::Change);
        let body = format!(
            "el.dispatchEvent(new Event({}, {{ bubbles: {bubbles} }}));",
            js_string(event.as_str())?
        );
        self.with_element(element, &body).await.map(drop)
    }

    async fn click(&self, element: ElementRef) -> Result<()> {
        self.with_element(element, "el.click();").await.map(drop)
    }

    async fn focus(&self, element: ElementRef) -> Result<()> {
        self.with_element(element, "el.focus();").await.map(drop)
    }

    async fn inner_text(&self, element: ElementRef) -> Result<String> {
        self.with_element_text(element, "return el.innerText ?? el.textContent;")
            .await
    }

    async fn inner_html(&self, element: ElementRef) -> Result<String> {
        self.with_element_text(element, "return el.innerHTML;").await
    }

    async fn outer_html(&self, element: ElementRef) -> Result<String> {
        self.with_element_text(element, "return el.outerHTML;").await
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let reply = self.call("Page.navigate", json!({ "url": url })).await?;
        if let Some(message) = reply.get("errorText").and_then(Value::as_str) {
            return Err(Error::navigation(url, message));
        }
        *self.inner.shared.location.lock() = url.to_string();
        Ok(())
    }
}

// ============================================================================
// CdpScript
// ============================================================================

/// Evaluates operator code in a [`CdpPage`]'s global scope.
///
/// Elements, node lists and arrays keep their shape, so results normalize
/// to outer markup like any other element outcome. Thrown errors fail with
/// their `message`.
#[derive(Debug, Clone)]
pub struct CdpScript {
    page: CdpPage,
}

impl CdpScript {
    /// Creates an evaluator over `page`.
    #[inline]
    #[must_use]
    pub fn new(page: CdpPage) -> Self {
        Self { page }
    }
}

#[async_trait]
impl ScriptEngine for CdpScript {
    async fn evaluate(&self, code: &str) -> Result<Outcome> {
        let expression = EVAL_CALL
            .replace("$REGISTRY", REGISTRY)
            .replace("$CODE", &js_string(code)?);

        let reply = self.page.evaluate_value(&expression).await?;
        if let Some(message) = reply.get("error") {
            return Err(Error::script(message.as_str().unwrap_or_default()));
        }
        self.page.decode(&reply["ok"])
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Routes replies to their callers and tracks main-frame navigation.
async fn read_loop(mut source: DevToolsSource, shared: Arc<Shared>) {
    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<Value>(text.as_str()) {
                Ok(frame) => route(&frame, &shared),
                Err(e) => warn!(error = %e, "Ignoring malformed DevTools frame"),
            },
            Ok(Message::Close(_)) => {
                debug!("DevTools channel closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "DevTools channel error");
                break;
            }
            _ => {}
        }
    }

    // Dropping the senders fails every waiting call.
    let abandoned = std::mem::take(&mut *shared.pending.lock());
    if !abandoned.is_empty() {
        debug!(abandoned = abandoned.len(), "Failing pending DevTools calls");
    }
}

fn route(frame: &Value, shared: &Shared) {
    if let Some(id) = frame.get("id").and_then(Value::as_u64) {
        let Some(reply) = shared.pending.lock().remove(&id) else {
            trace!(id, "Reply for abandoned call");
            return;
        };
        let result = match frame.get("error") {
            Some(error) => Err(Error::protocol(
                error["message"].as_str().unwrap_or("DevTools error").to_string(),
            )),
            None => Ok(frame.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = reply.send(result);
        return;
    }

    let params = &frame["params"];
    let url = match frame["method"].as_str() {
        Some("Page.frameNavigated") if params["frame"].get("parentId").is_none() => {
            shared.generation.fetch_add(1, Ordering::AcqRel);
            params["frame"]["url"].as_str()
        }
        Some("Page.navigatedWithinDocument") => params["url"].as_str(),
        _ => None,
    };

    if let Some(url) = url {
        debug!(url, "Page location changed");
        *shared.location.lock() = url.to_string();
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn handle(generation: u32, index: u64) -> ElementRef {
    ElementRef::from_raw((u64::from(generation) << 32) | (index & u64::from(u32::MAX)))
}

/// Quotes `text` as a JavaScript string literal.
fn js_string(text: &str) -> Result<String> {
    Ok(serde_json::to_string(text)?)
}

fn exception_text(details: &Value) -> String {
    details["exception"]["description"]
        .as_str()
        .or_else(|| details["text"].as_str())
        .unwrap_or("Evaluation failed")
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    /// Serves one DevTools client, answering each call with `respond`.
    ///
    /// `respond` returns the frames to send back; frames carrying `result`
    /// or `error` get the call's id.
    async fn devtools<F>(respond: F) -> String
    where
        F: Fn(&str, &Value) -> Vec<Value> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("ws://{}/devtools/page/T1", listener.local_addr().expect("addr"));

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = accept_async(stream).await.expect("handshake");
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let call: Value = serde_json::from_str(text.as_str()).expect("json");
                let method = call["method"].as_str().unwrap_or_default();
                for mut frame in respond(method, &call["params"]) {
                    if frame.get("result").is_some() || frame.get("error").is_some() {
                        frame["id"] = call["id"].clone();
                    }
                    if frame.get("close").is_some() {
                        let _ = ws.close(None).await;
                        return;
                    }
                    ws.send(Message::Text(frame.to_string().into()))
                        .await
                        .expect("send");
                }
            }
        });

        url
    }

    fn value(value: Value) -> Vec<Value> {
        vec![json!({ "result": { "result": { "type": "object", "value": value } } })]
    }

    fn expression(params: &Value) -> &str {
        params["expression"].as_str().unwrap_or_default()
    }

    /// Answers the attach sequence, then defers to `rest`.
    fn tab<F>(rest: F) -> impl Fn(&str, &Value) -> Vec<Value> + Send + 'static
    where
        F: Fn(&str) -> Vec<Value> + Send + 'static,
    {
        move |method: &str, params: &Value| match method {
            "Page.enable" => vec![json!({ "result": {} })],
            "Runtime.evaluate" if expression(params) == "location.href" => {
                value(json!("https://shop.example.com/search"))
            }
            "Runtime.evaluate" => rest(expression(params)),
            other => rest(other),
        }
    }

    async fn attach<F>(rest: F) -> CdpPage
    where
        F: Fn(&str) -> Vec<Value> + Send + 'static,
    {
        let url = devtools(tab(rest)).await;
        CdpPage::connect_with_timeout(&url, Duration::from_secs(2))
            .await
            .expect("attach")
    }

    #[tokio::test]
    async fn test_attach_reads_location() {
        let page = attach(|_| vec![]).await;
        assert_eq!(page.location(), "https://shop.example.com/search");
    }

    #[tokio::test]
    async fn test_query_returns_registry_handles() {
        let page = attach(|expr| {
            if expr.contains("querySelectorAll(\"li.hit\")") {
                value(json!({ "refs": [0, 3] }))
            } else {
                value(json!({ "refs": [] }))
            }
        })
        .await;

        let hits = page.query_selector_all("li.hit").await.expect("query");
        assert_eq!(hits, vec![ElementRef::from_raw(0), ElementRef::from_raw(3)]);
        assert_eq!(page.query_selector("#none").await.expect("query"), None);
    }

    #[tokio::test]
    async fn test_invalid_selector_is_reported() {
        let page = attach(|_| value(json!({ "invalid": true }))).await;
        let err = page.query_selector("div[").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid selector: div[");
    }

    #[tokio::test]
    async fn test_element_calls_and_stale_handles() {
        let page = attach(|expr| {
            if expr.contains(".refs[7]") {
                value(json!({ "stale": true }))
            } else if expr.contains("\"value\" in el") {
                value(json!({ "value": "wool" }))
            } else {
                value(json!({ "value": "<b>x</b>" }))
            }
        })
        .await;

        let input = ElementRef::from_raw(1);
        assert_eq!(page.value(input).await.expect("value").as_deref(), Some("wool"));
        assert_eq!(page.outer_html(input).await.expect("html"), "<b>x</b>");

        let err = page.click(ElementRef::from_raw(7)).await.unwrap_err();
        assert!(matches!(err, Error::StaleElement { .. }));
    }

    #[tokio::test]
    async fn test_set_value_quotes_the_value() {
        let page = attach(|expr| {
            if expr.contains(r#"el.value = "say \"hi\"";"#) {
                value(json!({}))
            } else {
                value(json!({ "stale": true }))
            }
        })
        .await;

        page.set_value(ElementRef::from_raw(0), "say \"hi\"")
            .await
            .expect("set value");
    }

    #[tokio::test]
    async fn test_main_frame_navigation_moves_location_and_invalidates_handles() {
        let page = attach(|method| match method {
            "Page.navigate" => vec![
                json!({ "method": "Page.frameNavigated",
                        "params": { "frame": { "id": "F", "url": "https://shop.example.com/cart" } } }),
                json!({ "method": "Page.frameNavigated",
                        "params": { "frame": { "id": "G", "parentId": "F", "url": "https://ads.example.com/" } } }),
                json!({ "result": { "frameId": "F" } }),
            ],
            _ => value(json!({ "value": "x" })),
        })
        .await;

        let before = ElementRef::from_raw(0);
        page.navigate("https://shop.example.com/cart")
            .await
            .expect("navigate");

        assert_eq!(page.location(), "https://shop.example.com/cart");
        assert!(matches!(
            page.inner_text(before).await,
            Err(Error::StaleElement { .. })
        ));
    }

    #[tokio::test]
    async fn test_navigation_error_text() {
        let page = attach(|method| match method {
            "Page.navigate" => vec![json!({ "result": { "errorText": "net::ERR_NAME_NOT_RESOLVED" } })],
            _ => vec![],
        })
        .await;

        let err = page.navigate("https://nowhere.invalid/").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Navigation to https://nowhere.invalid/ failed: net::ERR_NAME_NOT_RESOLVED"
        );
        assert_eq!(page.location(), "https://shop.example.com/search");
    }

    #[tokio::test]
    async fn test_protocol_error_reply() {
        let page = attach(|_| {
            vec![json!({ "error": { "code": -32000, "message": "Cannot find context" } })]
        })
        .await;

        let err = page.inner_html(ElementRef::from_raw(0)).await.unwrap_err();
        assert_eq!(err.to_string(), "Protocol error: Cannot find context");
    }

    #[tokio::test]
    async fn test_closed_channel_fails_pending_call() {
        let page = attach(|_| vec![json!({ "close": true })]).await;

        let err = page.focus(ElementRef::from_raw(0)).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
        assert!(err.is_connection_error());
    }

    #[tokio::test]
    async fn test_script_decodes_elements_lists_and_errors() {
        let page = attach(|expr| {
            if expr.contains("document.querySelectorAll('li')") {
                value(json!({ "ok": { "kind": "list", "items": [
                    { "kind": "element", "index": 2 },
                    { "kind": "value", "value": 5 },
                    { "kind": "undefined" }
                ] } }))
            } else if expr.contains("void 0") {
                value(json!({ "ok": { "kind": "undefined" } }))
            } else {
                value(json!({ "error": "boom is not defined" }))
            }
        })
        .await;
        let script = CdpScript::new(page);

        assert_eq!(
            script
                .evaluate("document.querySelectorAll('li')")
                .await
                .expect("evaluate"),
            Outcome::List(vec![
                Outcome::Element(ElementRef::from_raw(2)),
                Outcome::Value(json!(5)),
                Outcome::Undefined,
            ])
        );
        assert_eq!(
            script.evaluate("void 0").await.expect("evaluate"),
            Outcome::Undefined
        );

        let err = script.evaluate("boom()").await.unwrap_err();
        assert_eq!(err.to_string(), "boom is not defined");
    }

    #[tokio::test]
    async fn test_connect_failure_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let err = CdpPage::connect(&format!("ws://{addr}/devtools/page/T1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }
}
