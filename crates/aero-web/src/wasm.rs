#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: the `AeroContext` JS class.
//!
//! This module wraps [`ContextCore`] with the browser plumbing: one `resize`
//! listener on `window` and one `MutationObserver` on the document element
//! (`childList` + `subtree`). Both only record what happened and pump the
//! core; neither ever throws. Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use aero_core::DomLocator;
use js_sys::{Array, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit, MutationRecord};

use crate::bridge::BridgeError;
use crate::context_core::ContextCore;
use crate::dom::WebDom;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn to_js_error(err: &BridgeError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// `JSON.stringify(value)`; `None` for `undefined`.
fn stringify(value: &JsValue) -> Result<Option<String>, JsValue> {
    if value.is_undefined() {
        return Ok(None);
    }
    let text = js_sys::JSON::stringify(value)
        .map_err(|_| to_js_error(&BridgeError::NotSerializable))?;
    Ok(text.as_string())
}

struct Shared {
    core: ContextCore<Element>,
    dom: WebDom,
}

impl Shared {
    fn pump(&mut self) {
        let Self { core, dom } = self;
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let reports = core.pump(dom);
        #[cfg(feature = "tracing")]
        tracing::trace!(reports = reports.len(), "pumped observations");
    }
}

/// Reflow context for one document.
#[wasm_bindgen]
pub struct AeroContext {
    shared: Rc<RefCell<Shared>>,
    observer: MutationObserver,
    on_resize: Closure<dyn FnMut()>,
    _on_mutation: Closure<dyn FnMut(Array, MutationObserver)>,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl AeroContext {
    /// Attach to the global document and start observing it.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<AeroContext, JsValue> {
        install_panic_hook();
        let dom = WebDom::from_global()
            .ok_or_else(|| JsValue::from(js_sys::Error::new("no window or document")))?;
        let window = dom.window().clone();
        let root = dom
            .document()
            .document_element()
            .ok_or_else(|| JsValue::from(js_sys::Error::new("document has no root element")))?;
        let shared = Rc::new(RefCell::new(Shared {
            core: ContextCore::new(),
            dom,
        }));

        let on_resize = {
            let shared = Rc::clone(&shared);
            Closure::<dyn FnMut()>::new(move || {
                let Ok(mut state) = shared.try_borrow_mut() else {
                    return;
                };
                let width = state.dom.viewport_width();
                state.core.push_resize(width);
                state.pump();
            })
        };
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

        let on_mutation = {
            let shared = Rc::clone(&shared);
            Closure::<dyn FnMut(Array, MutationObserver)>::new(
                move |records: Array, _observer: MutationObserver| {
                    let mut added: Vec<Element> = Vec::new();
                    for record in records.iter() {
                        let Ok(record) = record.dyn_into::<MutationRecord>() else {
                            continue;
                        };
                        let nodes = record.added_nodes();
                        added.extend(
                            (0..nodes.length())
                                .filter_map(|idx| nodes.item(idx))
                                .filter_map(|node| node.dyn_into::<Element>().ok()),
                        );
                    }
                    if added.is_empty() {
                        return;
                    }
                    let Ok(mut state) = shared.try_borrow_mut() else {
                        return;
                    };
                    state.core.push_inserted(added);
                    state.pump();
                },
            )
        };
        let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer.observe_with_options(&root, &init)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("aero context attached");
        Ok(Self {
            shared,
            observer,
            on_resize,
            _on_mutation: on_mutation,
        })
    }

    /// Create an instance from a config object (`undefined` for class-mode).
    /// Returns its id.
    pub fn create(&mut self, config: JsValue) -> Result<u32, JsValue> {
        let json = stringify(&config)?;
        let mut state = self.shared.borrow_mut();
        let Shared { core, dom } = &mut *state;
        core.create(json.as_deref(), dom).map_err(|err| to_js_error(&err))
    }

    /// Replace one instance's breakpoint table. Returns the active breakpoint.
    #[wasm_bindgen(js_name = updateBreakpoints)]
    pub fn update_breakpoints(&mut self, id: u32, table: JsValue) -> Result<String, JsValue> {
        let json = stringify(&table)?.ok_or_else(|| to_js_error(&BridgeError::NotSerializable))?;
        let mut state = self.shared.borrow_mut();
        let Shared { core, dom } = &mut *state;
        core.update_breakpoints(id, &json, dom)
            .map_err(|err| to_js_error(&err))
    }

    /// Replace every instance's breakpoint table.
    #[wasm_bindgen(js_name = updateAllBreakpoints)]
    pub fn update_all_breakpoints(&mut self, table: JsValue) -> Result<(), JsValue> {
        let json = stringify(&table)?.ok_or_else(|| to_js_error(&BridgeError::NotSerializable))?;
        let mut state = self.shared.borrow_mut();
        let Shared { core, dom } = &mut *state;
        core.update_all_breakpoints(&json, dom)
            .map(drop)
            .map_err(|err| to_js_error(&err))
    }

    /// Breakpoint an instance last entered.
    #[wasm_bindgen(js_name = activeBreakpoint)]
    pub fn active_breakpoint(&self, id: u32) -> Option<String> {
        self.shared.borrow().core.active_breakpoint(id)
    }

    /// Number of instances created so far.
    #[wasm_bindgen(js_name = instanceCount)]
    pub fn instance_count(&self) -> u32 {
        u32::try_from(self.shared.borrow().core.instance_count()).unwrap_or(u32::MAX)
    }
}

impl Drop for AeroContext {
    fn drop(&mut self) {
        self.observer.disconnect();
        if let Ok(state) = self.shared.try_borrow() {
            let _ = state
                .dom
                .window()
                .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());
        }
    }
}
