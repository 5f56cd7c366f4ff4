//! The render node ("fiber") arena.
//!
//! Fibers form a tree through `parent`/`child`/`sibling` links, all of which are [`NodeId`]s into a
//! [`FiberArena`]. The sibling-list shape lets the scheduler resume a traversal from any node in
//! O(1) without holding an iterator across time slices.

use alloc::{rc::Rc, vec::Vec};
use core::ops::{Index, IndexMut};

use crate::element::{Component, Element, ElementKind, Props};

/// Identifier for a fiber stored inside a [`FiberArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw index backing this identifier.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What a fiber stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum FiberKind {
    /// The synthetic root wrapping the host container.
    Root,
    /// A host primitive, including `TEXT`.
    Primitive(Rc<str>),
    /// A component placeholder. Never owns a host node.
    Component(Component),
}

impl FiberKind {
    /// Whether an element of `kind` may reuse this fiber.
    #[must_use]
    pub fn matches(&self, kind: &ElementKind) -> bool {
        match (self, kind) {
            (Self::Primitive(tag), ElementKind::Primitive(other)) => tag == other,
            (Self::Component(component), ElementKind::Component(other)) => component == other,
            _ => false,
        }
    }

    /// Returns the primitive tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Primitive(tag) => Some(tag),
            _ => None,
        }
    }
}

impl From<&ElementKind> for FiberKind {
    fn from(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Primitive(tag) => Self::Primitive(tag.clone()),
            ElementKind::Component(component) => Self::Component(component.clone()),
        }
    }
}

/// Decision recorded on a fiber during reconciliation and applied during commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// A new host node must be created and attached.
    Create,
    /// The existing host node is kept and its attributes diffed.
    Update,
    /// The fiber's host subtree must be detached.
    Delete,
}

/// One node of a render tree.
#[derive(Debug, Clone)]
pub struct Fiber<H> {
    pub(crate) kind: FiberKind,
    pub(crate) props: Props,
    pub(crate) host: Option<H>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) child: Option<NodeId>,
    pub(crate) sibling: Option<NodeId>,
    pub(crate) alternate: Option<NodeId>,
    pub(crate) effect: Option<Effect>,
}

impl<H> Fiber<H> {
    pub(crate) fn root(container: H, root: Element, alternate: Option<NodeId>) -> Self {
        Self {
            kind: FiberKind::Root,
            props: Props::new(core::iter::empty::<(&str, bool)>(), [root]),
            host: Some(container),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            effect: None,
        }
    }

    pub(crate) fn from_element(element: &Element, parent: NodeId) -> Self {
        Self {
            kind: element.kind().into(),
            props: element.props().clone(),
            host: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            effect: Some(Effect::Create),
        }
    }

    /// What this fiber stands for.
    #[must_use]
    pub const fn kind(&self) -> &FiberKind {
        &self.kind
    }

    /// The props this fiber was last reconciled with.
    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.props
    }

    /// The host node owned by this fiber, if it has been created.
    #[must_use]
    pub const fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    /// Parent fiber; `None` only for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// First child fiber.
    #[must_use]
    pub const fn child(&self) -> Option<NodeId> {
        self.child
    }

    /// Next sibling fiber.
    #[must_use]
    pub const fn sibling(&self) -> Option<NodeId> {
        self.sibling
    }

    /// The fiber at the same position in the last committed tree.
    #[must_use]
    pub const fn alternate(&self) -> Option<NodeId> {
        self.alternate
    }

    /// The effect decided for this fiber by the most recent pass.
    #[must_use]
    pub const fn effect(&self) -> Option<Effect> {
        self.effect
    }
}

/// Slot storage for fibers with index reuse.
#[derive(Debug)]
pub struct FiberArena<H> {
    slots: Vec<Option<Fiber<H>>>,
    free: Vec<usize>,
}

impl<H> Default for FiberArena<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> FiberArena<H> {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores a fiber and returns its id.
    pub fn insert(&mut self, fiber: Fiber<H>) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(fiber);
            NodeId(index)
        } else {
            self.slots.push(Some(fiber));
            NodeId(self.slots.len() - 1)
        }
    }

    /// Returns the fiber, or `None` if the id was released.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Fiber<H>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Fiber<H>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Number of live fibers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns `true` when no fiber is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collects `root` and every descendant in depth-first pre-order.
    #[must_use]
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = alloc::vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let mut children = Vec::new();
            let mut next = self[id].child;
            while let Some(child) = next {
                children.push(child);
                next = self[child].sibling;
            }
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Releases `root` and its whole subtree.
    pub fn release_subtree(&mut self, root: NodeId) {
        for id in self.subtree(root) {
            self.release(id);
        }
    }

    fn release(&mut self, id: NodeId) {
        if self.slots.get_mut(id.0).and_then(Option::take).is_some() {
            self.free.push(id.0);
        }
    }
}

impl<H> Index<NodeId> for FiberArena<H> {
    type Output = Fiber<H>;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.get(id)
            .unwrap_or_else(|| panic!("fiber {id:?} was released"))
    }
}

impl<H> IndexMut<NodeId> for FiberArena<H> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("fiber {id:?} was released"))
    }
}
