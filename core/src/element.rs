//! Immutable element descriptors.
//!
//! An [`Element`] describes one node of the UI and its children. Application code builds a tree
//! of elements on every render; the reconciler only ever reads them. Every part of an element is
//! reference counted, so cloning a descriptor (or a whole subtree) is cheap and never copies the
//! attribute map.

use alloc::{collections::BTreeMap, rc::Rc, string::String, vec::Vec};
use core::fmt::{self, Debug};

/// Reserved primitive tag for text nodes.
pub const TEXT: &str = "TEXT";

/// Attribute carrying the literal content of a [`TEXT`] element.
pub const NODE_VALUE: &str = "nodeValue";

/// Attribute keys that are never forwarded to the host surface.
const BOOKKEEPING_KEYS: [&str; 3] = ["__source", "__self", "children"];

/// Event payload delivered to a [`Listener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Lower-cased event name, e.g. `click`.
    pub name: String,
    /// Optional value carried by the event (for instance the text of an input).
    pub value: Option<String>,
}

impl Event {
    /// Creates an event without a value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Attaches a value to the event.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A callback bound to an `on<Event>` attribute.
///
/// Two listeners are equal only when they share the same allocation, so rebuilding a closure on
/// every render counts as a change and gets rebound.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
    /// Wraps a callback.
    pub fn new(callback: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invokes the callback.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Listener(..)")
    }
}

/// Value of a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// A string value.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// An event callback.
    Listener(Listener),
}

impl PropValue {
    /// Returns the listener if this value is one.
    #[must_use]
    pub const fn as_listener(&self) -> Option<&Listener> {
        match self {
            Self::Listener(listener) => Some(listener),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Listener(_) => f.write_str("[listener]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Listener> for PropValue {
    fn from(value: Listener) -> Self {
        Self::Listener(value)
    }
}

/// Returns the lower-cased event name if `name` follows the `on<Event>` convention.
///
/// ```
/// use waterfiber_core::event_name;
///
/// assert_eq!(event_name("onClick").as_deref(), Some("click"));
/// assert_eq!(event_name("href"), None);
/// assert_eq!(event_name("on"), None);
/// ```
#[must_use]
pub fn event_name(name: &str) -> Option<String> {
    name.strip_prefix("on")
        .filter(|event| !event.is_empty())
        .map(str::to_ascii_lowercase)
}

type RenderFn = dyn Fn(&Props) -> anyhow::Result<Element>;

/// A pure function from [`Props`] to a single [`Element`].
///
/// Components are compared by identity: two `Component` values are the same kind only when they
/// were cloned from the same original.
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    /// Creates a component from an infallible render function.
    pub fn new(name: &'static str, render: impl Fn(&Props) -> Element + 'static) -> Self {
        Self {
            name,
            render: Rc::new(move |props| Ok(render(props))),
        }
    }

    /// Creates a component whose render function may fail.
    pub fn fallible(
        name: &'static str,
        render: impl Fn(&Props) -> anyhow::Result<Element> + 'static,
    ) -> Self {
        Self {
            name,
            render: Rc::new(render),
        }
    }

    /// Diagnostic name of the component.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluates the component.
    ///
    /// # Errors
    ///
    /// Returns whatever error the render function raised.
    pub fn render(&self, props: &Props) -> anyhow::Result<Element> {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// What an element renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A node understood by the host surface, identified by its tag.
    Primitive(Rc<str>),
    /// A component expanded by the reconciler.
    Component(Component),
}

impl ElementKind {
    /// Returns the primitive tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Primitive(tag) => Some(tag),
            Self::Component(_) => None,
        }
    }

    /// Returns `true` for [`TEXT`] primitives.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.tag() == Some(TEXT)
    }
}

impl From<&str> for ElementKind {
    fn from(value: &str) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<Component> for ElementKind {
    fn from(value: Component) -> Self {
        Self::Component(value)
    }
}

/// Attributes plus children of an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    attributes: Rc<BTreeMap<String, PropValue>>,
    children: Rc<[Element]>,
}

impl Props {
    /// Builds props from attributes and children, dropping bookkeeping keys.
    pub fn new<K, V>(
        attributes: impl IntoIterator<Item = (K, V)>,
        children: impl IntoIterator<Item = Element>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<PropValue>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(key, _)| !BOOKKEEPING_KEYS.contains(&key.as_str()))
            .collect();
        Self {
            attributes: Rc::new(attributes),
            children: children.into_iter().collect(),
        }
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attributes.get(name)
    }

    /// All non-`children` attributes in key order.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, PropValue> {
        &self.attributes
    }

    /// The child descriptors.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn children_rc(&self) -> Rc<[Element]> {
        self.children.clone()
    }
}

/// An immutable description of a UI node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    kind: ElementKind,
    props: Props,
}

impl Element {
    /// Starts a primitive element with no attributes or children.
    pub fn new(kind: impl Into<ElementKind>) -> Self {
        Self {
            kind: kind.into(),
            props: Props::default(),
        }
    }

    /// Returns a copy with one more attribute. Bookkeeping keys are ignored.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        let name = name.into();
        if !BOOKKEEPING_KEYS.contains(&name.as_str()) {
            Rc::make_mut(&mut self.props.attributes).insert(name, value.into());
        }
        self
    }

    /// Returns a copy with one more child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        let mut children: Vec<Element> = self.props.children.iter().cloned().collect();
        children.push(child.into().into_element());
        self.props.children = children.into();
        self
    }

    /// The element kind.
    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// The element props.
    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.props
    }
}

/// Anything that can appear in a child list.
#[derive(Debug, Clone)]
pub enum Child {
    /// A nested element.
    Element(Element),
    /// Literal text, wrapped in a [`TEXT`] element.
    Text(String),
}

impl Child {
    fn into_element(self) -> Element {
        match self {
            Self::Element(element) => element,
            Self::Text(value) => text(value),
        }
    }
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Self::Text(alloc::format!("{value}"))
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Self::Text(alloc::format!("{value}"))
    }
}

/// Builds a [`TEXT`] element carrying `value`.
pub fn text(value: impl Into<String>) -> Element {
    Element {
        kind: ElementKind::Primitive(TEXT.into()),
        props: Props::new(
            [(NODE_VALUE, PropValue::Text(value.into()))],
            core::iter::empty(),
        ),
    }
}

/// Builds an element the way an authoring-syntax compiler would.
///
/// Bookkeeping keys (`__source`, `__self`) and any caller-supplied `children` attribute are
/// dropped; non-element children are wrapped in [`TEXT`] elements.
///
/// ```
/// use waterfiber_core::{create_element, PropValue};
///
/// let link = create_element(
///     "a",
///     [("href", PropValue::from("https://example.com")), ("__self", "x".into())],
///     ["Official Website"],
/// );
/// assert!(link.props().get("__self").is_none());
/// assert!(link.props().children()[0].kind().is_text());
/// ```
pub fn create_element<K, V, C>(
    kind: impl Into<ElementKind>,
    attributes: impl IntoIterator<Item = (K, V)>,
    children: impl IntoIterator<Item = C>,
) -> Element
where
    K: Into<String>,
    V: Into<PropValue>,
    C: Into<Child>,
{
    Element {
        kind: kind.into(),
        props: Props::new(
            attributes,
            children.into_iter().map(|child| child.into().into_element()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_element_wraps_text_children() {
        let heading = create_element("h2", Vec::<(&str, PropValue)>::new(), ["Hello", "World"]);
        let children = heading.props().children();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|child| child.kind().is_text()));
        assert_eq!(
            children[1].props().get(NODE_VALUE),
            Some(&PropValue::from("World"))
        );
    }

    #[test]
    fn create_element_drops_bookkeeping_keys() {
        let element = create_element(
            "div",
            vec![
                ("id", PropValue::from("root")),
                ("__source", PropValue::from("main.jsx")),
                ("__self", PropValue::Bool(true)),
                ("children", PropValue::from("ignored")),
            ],
            Vec::<Child>::new(),
        );
        let keys: Vec<_> = element.props().attributes().keys().cloned().collect();
        assert_eq!(keys, vec!["id".to_string()]);
    }

    #[test]
    fn builder_does_not_touch_the_original() {
        let base = Element::new("ul").attr("class", "list");
        let grown = base.clone().child(Element::new("li")).attr("class", "grown");
        assert!(base.props().children().is_empty());
        assert_eq!(base.props().get("class"), Some(&PropValue::from("list")));
        assert_eq!(grown.props().children().len(), 1);
        assert_eq!(grown.props().get("class"), Some(&PropValue::from("grown")));
    }

    #[test]
    fn components_compare_by_identity() {
        let first = Component::new("Greeting", |_| text("hi"));
        let copy = first.clone();
        let other = Component::new("Greeting", |_| text("hi"));
        assert_eq!(ElementKind::from(first.clone()), ElementKind::from(copy));
        assert_ne!(ElementKind::from(first), ElementKind::from(other));
    }

    #[test]
    fn listeners_compare_by_identity() {
        let listener = Listener::new(|_| {});
        assert_eq!(
            PropValue::Listener(listener.clone()),
            PropValue::Listener(listener)
        );
        assert_ne!(
            PropValue::Listener(Listener::new(|_| {})),
            PropValue::Listener(Listener::new(|_| {}))
        );
    }

    #[test]
    fn event_names_are_lower_cased() {
        assert_eq!(event_name("onMouseDown").as_deref(), Some("mousedown"));
        assert_eq!(event_name("online").as_deref(), Some("line"));
        assert_eq!(event_name("title"), None);
    }
}
