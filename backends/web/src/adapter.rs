//! [`HostAdapter`] over the browser DOM.
//!
//! Plain attributes are written as JS properties (`node[name] = value`), so `nodeValue` on a
//! text node and `href` on an anchor both just work. `on<Event>` attributes become event
//! listeners; the JS function backing each one is stashed on the node itself so it can be
//! removed again when the attribute goes away.

use js_sys::{Function, Object, Reflect};
use tracing::trace;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use waterfiber_core::{Event, HostAdapter, Listener, PropValue, TEXT, event_name};
use web_sys::{Document, HtmlInputElement, Node};

use crate::error::WebError;

/// DOM-backed host adapter.
#[derive(Debug, Clone)]
pub struct DomAdapter {
    document: Document,
}

impl DomAdapter {
    /// Creates an adapter producing nodes owned by `document`.
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }

    fn bind(node: &Node, event: &str, listener: &Listener) -> Result<(), WebError> {
        let listener = listener.clone();
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            listener.call(&from_dom_event(&event));
        });
        let function: Function = closure.into_js_value().unchecked_into();
        node.add_event_listener_with_callback(event, &function)?;
        Reflect::set(node, &listener_slot(event), &function)?;
        Ok(())
    }

    fn unbind(node: &Node, event: &str) -> Result<(), WebError> {
        let slot = listener_slot(event);
        if let Ok(function) = Reflect::get(node, &slot)?.dyn_into::<Function>() {
            node.remove_event_listener_with_callback(event, &function)?;
        }
        Reflect::delete_property(node.unchecked_ref::<Object>(), &slot)?;
        Ok(())
    }
}

impl HostAdapter for DomAdapter {
    type Handle = Node;
    type Error = WebError;

    fn create_node(&mut self, kind: &str) -> Result<Node, WebError> {
        trace!(kind, "creating DOM node");
        if kind == TEXT {
            Ok(self.document.create_text_node("").into())
        } else {
            Ok(self.document.create_element(kind)?.into())
        }
    }

    fn set_attribute(
        &mut self,
        node: &Node,
        name: &str,
        value: &PropValue,
    ) -> Result<(), WebError> {
        match (event_name(name), value) {
            (Some(event), PropValue::Listener(listener)) => Self::bind(node, &event, listener),
            (_, PropValue::Listener(_)) => Ok(()),
            _ => {
                Reflect::set(node, &JsValue::from_str(name), &to_js(value))?;
                Ok(())
            }
        }
    }

    fn clear_attribute(
        &mut self,
        node: &Node,
        name: &str,
        previous: &PropValue,
    ) -> Result<(), WebError> {
        match (event_name(name), previous) {
            (Some(event), PropValue::Listener(_)) => Self::unbind(node, &event),
            (_, PropValue::Listener(_)) => Ok(()),
            _ => {
                Reflect::set(node, &JsValue::from_str(name), &JsValue::from_str(""))?;
                Ok(())
            }
        }
    }

    fn attach_child(&mut self, parent: &Node, child: &Node) -> Result<(), WebError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn insert_before(&mut self, parent: &Node, child: &Node, anchor: &Node) -> Result<(), WebError> {
        parent.insert_before(child, Some(anchor))?;
        Ok(())
    }

    fn detach_child(&mut self, parent: &Node, child: &Node) -> Result<(), WebError> {
        parent.remove_child(child)?;
        Ok(())
    }
}

fn listener_slot(event: &str) -> JsValue {
    JsValue::from_str(&listener_key(event))
}

/// Property under which the bound JS function for `event` is stored on its node.
fn listener_key(event: &str) -> String {
    format!("__waterfiber_on{event}")
}

fn to_js(value: &PropValue) -> JsValue {
    match value {
        PropValue::Text(text) => JsValue::from_str(text),
        PropValue::Number(number) => JsValue::from_f64(*number),
        PropValue::Bool(flag) => JsValue::from_bool(*flag),
        PropValue::Listener(_) => JsValue::UNDEFINED,
    }
}

fn from_dom_event(event: &web_sys::Event) -> Event {
    let value = event
        .target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value());
    Event {
        name: event.type_(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_keys_are_namespaced() {
        assert_eq!(listener_key("click"), "__waterfiber_onclick");
        assert_ne!(listener_key("click"), listener_key("input"));
    }
}
