//! In-memory DOM.
//!
//! [`MemoryPage`] keeps a parsed `scraper` document and implements [`Page`]
//! on it. Selector matching and markup serialization both come from
//! `scraper`. On top of the tree the page keeps what a browser would keep
//! outside the markup: `value` properties, focus, dispatched events and
//! navigation history, so tests can observe what the handlers did.
//!
//! # Example
//!
//! ```
//! use page_bridge::{ElementSpec, MemoryPage, Page};
//!
//! # async fn example() -> page_bridge::Result<()> {
//! let page = MemoryPage::new("https://shop.example.com/login");
//! let form = page.insert(ElementSpec::new("form").id("login"))?;
//! page.insert(ElementSpec::new("input").id("email").child_of(form))?;
//!
//! let input = page.require("#login input").await?;
//! page.set_value(input, "user@example.com").await?;
//! assert_eq!(page.value(input).await?.as_deref(), Some("user@example.com"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt::{self, Write as _};

use async_trait::async_trait;
use ego_tree::{NodeId, NodeMut, NodeRef};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use scraper::{ElementRef as HtmlElement, Html, Node, Selector};
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::ElementRef;

use super::{EventKind, Page};

// ============================================================================
// Constants
// ============================================================================

/// Elements that carry a `value` property from creation.
const FORM_CONTROLS: &[&str] = &["button", "input", "option", "select"];

// ============================================================================
// ElementSpec
// ============================================================================

/// Description of an element to insert into a [`MemoryPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    value: Option<String>,
    parent: Option<ElementRef>,
}

impl ElementSpec {
    /// Starts a spec for an element with the given tag name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            text: String::new(),
            value: None,
            parent: None,
        }
    }

    /// Sets the `id` attribute.
    #[inline]
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Appends a class to the `class` attribute.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        match self.attrs.iter_mut().find(|(k, _)| k == "class") {
            Some((_, existing)) => {
                existing.push(' ');
                existing.push_str(&class);
            }
            None => self.attrs.push(("class".to_string(), class)),
        }
        self
    }

    /// Sets an attribute, replacing any previous value.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Sets the element's own text content.
    #[inline]
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the initial `value` property.
    #[inline]
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Inserts the element as the last child of `parent`.
    #[inline]
    #[must_use]
    pub fn child_of(mut self, parent: ElementRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Renders the element as markup for the fragment parser.
    fn markup(&self) -> Result<String> {
        if !is_tag_name(&self.tag) {
            return Err(Error::invalid_argument(format!(
                "invalid tag name: {:?}",
                self.tag
            )));
        }

        let mut out = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            if !is_attr_name(name) {
                return Err(Error::invalid_argument(format!(
                    "invalid attribute name: {name:?}"
                )));
            }
            let _ = write!(out, " {name}=\"");
            escape_attr(value, &mut out);
            out.push('"');
        }
        out.push('>');
        escape_text(&self.text, &mut out);
        let _ = write!(out, "</{}>", self.tag);
        Ok(out)
    }
}

// ============================================================================
// Dom
// ============================================================================

/// Browser-side state of an element handed out as an [`ElementRef`].
#[derive(Debug)]
struct Slot {
    node: NodeId,
    value: Option<String>,
    events: Vec<EventKind>,
}

struct Dom {
    location: String,
    title: String,
    document: Html,
    /// Parent for inserts without an explicit one.
    body: NodeId,
    // Indexed by `ElementRef::as_raw`; removed elements leave `None`.
    slots: Vec<Option<Slot>>,
    handles: FxHashMap<NodeId, ElementRef>,
    focused: Option<ElementRef>,
    navigations: Vec<String>,
}

impl Dom {
    fn parse(location: String, markup: &str) -> Self {
        let document = Html::parse_document(markup);

        let root = document.tree.root();
        let body = root
            .descendants()
            .find(|n| n.value().as_element().is_some_and(|el| el.name() == "body"))
            .map_or_else(|| root.id(), |n| n.id());

        let title = Selector::parse("title")
            .ok()
            .and_then(|s| document.select(&s).next())
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        Self {
            location,
            title,
            document,
            body,
            slots: Vec::new(),
            handles: FxHashMap::default(),
            focused: None,
            navigations: Vec::new(),
        }
    }

    fn slot(&self, element: ElementRef) -> Result<&Slot> {
        usize::try_from(element.as_raw())
            .ok()
            .and_then(|i| self.slots.get(i))
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::stale_element(element))
    }

    fn slot_mut(&mut self, element: ElementRef) -> Result<&mut Slot> {
        usize::try_from(element.as_raw())
            .ok()
            .and_then(|i| self.slots.get_mut(i))
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::stale_element(element))
    }

    fn element(&self, element: ElementRef) -> Result<HtmlElement<'_>> {
        let node = self.slot(element)?.node;
        self.document
            .tree
            .get(node)
            .and_then(HtmlElement::wrap)
            .ok_or_else(|| Error::stale_element(element))
    }

    /// Returns the handle for `node`, allocating one on first sight.
    fn handle(&mut self, node: NodeId) -> ElementRef {
        if let Some(&element) = self.handles.get(&node) {
            return element;
        }

        let value = self
            .document
            .tree
            .get(node)
            .and_then(HtmlElement::wrap)
            .and_then(initial_value);

        let element = ElementRef::from_raw(self.slots.len() as u64);
        self.slots.push(Some(Slot {
            node,
            value,
            events: Vec::new(),
        }));
        self.handles.insert(node, element);
        element
    }

    fn query_all(&mut self, selector: &str) -> Result<Vec<ElementRef>> {
        let parsed = Selector::parse(selector).map_err(|_| Error::invalid_selector(selector))?;

        let matched: Vec<NodeId> = self
            .document
            .tree
            .root()
            .descendants()
            .filter(|n| HtmlElement::wrap(*n).is_some_and(|el| parsed.matches(&el)))
            .map(|n| n.id())
            .collect();

        Ok(matched.into_iter().map(|node| self.handle(node)).collect())
    }

    fn insert(&mut self, spec: ElementSpec) -> Result<ElementRef> {
        let parent = match spec.parent {
            Some(parent) => self.slot(parent)?.node,
            None => self.body,
        };

        let fragment = Html::parse_fragment(&spec.markup()?);
        let source = fragment
            .root_element()
            .children()
            .filter_map(HtmlElement::wrap)
            .find(|el| el.value().name() == spec.tag)
            .ok_or_else(|| {
                Error::invalid_argument(format!("<{}> cannot be created in a body", spec.tag))
            })?;

        let node = {
            let mut target = self
                .document
                .tree
                .get_mut(parent)
                .ok_or_else(|| Error::invalid_argument("insert target vanished"))?;
            graft(&mut target, *source)
        };

        let element = self.handle(node);
        if let Some(value) = spec.value {
            self.slot_mut(element)?.value = Some(value);
        }
        Ok(element)
    }

    fn remove(&mut self, element: ElementRef) -> Result<()> {
        let node = self.slot(element)?.node;

        let subtree: Vec<NodeId> = self
            .document
            .tree
            .get(node)
            .map(|n| n.descendants().map(|d| d.id()).collect())
            .unwrap_or_default();

        for id in subtree {
            let Some(handle) = self.handles.remove(&id) else {
                continue;
            };
            if let Some(slot) = self.slots.get_mut(handle.as_raw() as usize) {
                *slot = None;
            }
            if self.focused == Some(handle) {
                self.focused = None;
            }
        }

        if let Some(mut node) = self.document.tree.get_mut(node) {
            node.detach();
        }
        Ok(())
    }

    fn navigate(&mut self, url: &str) {
        self.location = url.to_string();
        self.navigations.push(url.to_string());
    }
}

// ============================================================================
// MemoryPage
// ============================================================================

/// An in-memory page implementing [`Page`].
pub struct MemoryPage {
    dom: Mutex<Dom>,
}

impl fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dom = self.dom.lock();
        f.debug_struct("MemoryPage")
            .field("location", &dom.location)
            .field("title", &dom.title)
            .field("handles", &dom.handles.len())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl MemoryPage {
    /// Creates an empty document at `location`.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self::from_html(location, "")
    }

    /// Loads `markup` as the document at `location`.
    ///
    /// The title is read from the document's `<title>` element.
    #[must_use]
    pub fn from_html(location: impl Into<String>, markup: &str) -> Self {
        Self {
            dom: Mutex::new(Dom::parse(location.into(), markup)),
        }
    }

    /// Inserts an element and returns its handle.
    ///
    /// Without [`ElementSpec::child_of`] the element goes at the end of
    /// `<body>`.
    ///
    /// # Errors
    ///
    /// - [`Error::StaleElement`] if the spec's parent has been removed
    /// - [`Error::InvalidArgument`] for tag or attribute names the parser
    ///   would not produce as written
    pub fn insert(&self, spec: ElementSpec) -> Result<ElementRef> {
        let element = self.dom.lock().insert(spec)?;
        trace!(%element, "Element inserted");
        Ok(element)
    }

    /// Removes an element and its subtree.
    ///
    /// # Errors
    ///
    /// [`Error::StaleElement`] if the element was already removed.
    pub fn remove(&self, element: ElementRef) -> Result<()> {
        self.dom.lock().remove(element)
    }

    /// Sets the document title.
    pub fn set_title(&self, title: impl Into<String>) {
        self.dom.lock().title = title.into();
    }

    /// Returns the document title.
    #[must_use]
    pub fn title(&self) -> String {
        self.dom.lock().title.clone()
    }

    /// Events dispatched on the element, oldest first.
    ///
    /// # Errors
    ///
    /// [`Error::StaleElement`] if the element was removed.
    pub fn events(&self, element: ElementRef) -> Result<Vec<EventKind>> {
        Ok(self.dom.lock().slot(element)?.events.clone())
    }

    /// Currently focused element.
    #[must_use]
    pub fn focused(&self) -> Option<ElementRef> {
        self.dom.lock().focused
    }

    /// URLs navigated to, oldest first.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.dom.lock().navigations.clone()
    }

    /// Number of elements inside `<body>`.
    #[must_use]
    pub fn len(&self) -> usize {
        let dom = self.dom.lock();
        dom.document.tree.get(dom.body).map_or(0, |body| {
            body.descendants()
                .skip(1)
                .filter(|n| n.value().is_element())
                .count()
        })
    }

    /// Returns `true` if `<body>` is empty of elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// MemoryPage - Page
// ============================================================================

#[async_trait]
impl Page for MemoryPage {
    fn location(&self) -> String {
        self.dom.lock().location.clone()
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<ElementRef>> {
        Ok(self.dom.lock().query_all(selector)?.into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementRef>> {
        self.dom.lock().query_all(selector)
    }

    async fn value(&self, element: ElementRef) -> Result<Option<String>> {
        Ok(self.dom.lock().slot(element)?.value.clone())
    }

    async fn set_value(&self, element: ElementRef, value: &str) -> Result<()> {
        self.dom.lock().slot_mut(element)?.value = Some(value.to_string());
        Ok(())
    }

    async fn dispatch_event(&self, element: ElementRef, event: EventKind) -> Result<()> {
        self.dom.lock().slot_mut(element)?.events.push(event);
        Ok(())
    }

    async fn click(&self, element: ElementRef) -> Result<()> {
        let mut dom = self.dom.lock();

        // Links follow their href on activation.
        let href = {
            let el = dom.element(element)?;
            (el.value().name() == "a")
                .then(|| el.value().attr("href"))
                .flatten()
                .map(str::to_string)
        };

        dom.slot_mut(element)?.events.push(EventKind::Click);
        if let Some(href) = href {
            dom.navigate(&href);
        }
        Ok(())
    }

    async fn focus(&self, element: ElementRef) -> Result<()> {
        let mut dom = self.dom.lock();
        dom.slot_mut(element)?.events.push(EventKind::Focus);
        dom.focused = Some(element);
        Ok(())
    }

    async fn inner_text(&self, element: ElementRef) -> Result<String> {
        Ok(self.dom.lock().element(element)?.text().collect())
    }

    async fn inner_html(&self, element: ElementRef) -> Result<String> {
        Ok(self.dom.lock().element(element)?.inner_html())
    }

    async fn outer_html(&self, element: ElementRef) -> Result<String> {
        Ok(self.dom.lock().element(element)?.html())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.dom.lock().navigate(url);
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Copies `source` and its subtree under `target`, returning the copy's id.
fn graft(target: &mut NodeMut<'_, Node>, source: NodeRef<'_, Node>) -> NodeId {
    let mut node = target.append(source.value().clone());
    for child in source.children() {
        graft(&mut node, child);
    }
    node.id()
}

fn initial_value(el: HtmlElement<'_>) -> Option<String> {
    match el.value().name() {
        "textarea" => Some(el.text().collect()),
        name if FORM_CONTROLS.contains(&name) => {
            Some(el.value().attr("value").unwrap_or_default().to_string())
        }
        _ => None,
    }
}

fn is_tag_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'))
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
