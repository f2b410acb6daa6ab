#![forbid(unsafe_code)]

//! [`DomHost`] over the live browser document.
//!
//! Navigation uses element siblings and children only; text and comment
//! nodes are invisible to the engine. Only compiled on `wasm32` targets.

use aero_core::{DomHost, DomLocator};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node, Window};

/// The page's document and window.
#[derive(Debug, Clone)]
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    #[must_use]
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    /// The global `window` and its document, if running in a page.
    #[must_use]
    pub fn from_global() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self::new(window, document))
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl DomLocator for WebDom {
    type Node = Element;

    fn find_one(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn find_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|idx| list.item(idx))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn matches(&self, node: &Element, selector: &str) -> bool {
        node.matches(selector).unwrap_or(false)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn is_attached(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn first_child(&self, node: &Element) -> Option<Element> {
        node.first_element_child()
    }

    fn last_child(&self, node: &Element) -> Option<Element> {
        node.last_element_child()
    }

    fn next_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn previous_sibling(&self, node: &Element) -> Option<Element> {
        node.previous_element_sibling()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node.as_ref()))
    }

    fn viewport_width(&self) -> u32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .filter(|width| width.is_finite() && *width > 0.0)
            .map_or(0, |width| width as u32)
    }
}

impl DomHost for WebDom {
    type Error = JsValue;

    fn insert_before(
        &mut self,
        parent: &Element,
        node: &Element,
        reference: Option<&Element>,
    ) -> Result<(), JsValue> {
        let reference: Option<&Node> = reference.map(AsRef::as_ref);
        parent.insert_before(node, reference).map(drop)
    }

    fn add_body_class(&mut self, class: &str) {
        if let Some(body) = self.document.body() {
            let _ = body.class_list().add_1(class);
        }
    }

    fn remove_body_class(&mut self, class: &str) {
        if let Some(body) = self.document.body() {
            let _ = body.class_list().remove_1(class);
        }
    }
}
