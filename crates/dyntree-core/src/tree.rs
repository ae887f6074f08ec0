//! Node arena and tree mutator.
//!
//! Every node lives in a [`Tree`]. Containers own their children through the
//! child vectors in their payload; `parent` is a non-owning back-reference.
//! All structural operations (`append`, `set_field`, `detach`, `free`) keep
//! the two views consistent, so freeing a node never leaves its handle in a
//! parent's child list.
//!
//! Readers are forgiving: a stale handle reads as an absent node (kind
//! `Undefined`, length 0, no name). Mutators are strict and return
//! [`TreeError`] for stale handles and contract violations, without touching
//! the tree.

use crate::convert::{format_number, parse_number_prefix};
use crate::error::{Result, TreeError};
use crate::node::{Kind, Node, NodeId, Payload};
use log::{debug, trace, warn};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena holding any number of independent node trees.
#[derive(Debug, Default)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
    revision: u64,
}

/// Empty payload for a kind, used after a type transition tore down the
/// previous one.
fn empty_payload(kind: Kind) -> Payload {
    match kind {
        Kind::Undefined => Payload::Undefined,
        Kind::Object => Payload::Object(Vec::new()),
        Kind::Array => Payload::Array(Vec::new()),
        Kind::Number => Payload::Number(0.0),
        Kind::String => Payload::String(String::new()),
        Kind::Bool => Payload::Bool(false),
        Kind::Null => Payload::Null,
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes across all roots.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Counter bumped by every mutation. Caches keyed on it are invalid once
    /// it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the handle still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn live(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(TreeError::StaleNode(id))
    }

    fn live_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id).ok_or(TreeError::StaleNode(id))
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // ── Creation ────────────────────────────────────────────────────────

    /// Allocate a detached `Undefined` node.
    pub fn create(&mut self) -> NodeId {
        self.alloc(Payload::Undefined)
    }

    fn alloc(&mut self, payload: Payload) -> NodeId {
        let mut node = Node::new();
        node.payload = payload;
        self.live += 1;
        self.touch();
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub fn create_number(&mut self, value: f64) -> NodeId {
        self.alloc(Payload::Number(value))
    }

    pub fn create_string(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(Payload::String(value.into()))
    }

    pub fn create_bool(&mut self, value: bool) -> NodeId {
        self.alloc(Payload::Bool(value))
    }

    pub fn create_null(&mut self) -> NodeId {
        self.alloc(Payload::Null)
    }

    /// New detached node holding a value copy of `src` (see
    /// [`copy_value_from`](Self::copy_value_from)). Children are not copied.
    pub fn create_from(&mut self, src: NodeId) -> NodeId {
        let payload = self.value_copy(src);
        self.alloc(payload)
    }

    pub fn create_number_from(&mut self, src: NodeId) -> NodeId {
        let value = self.as_number_from(src);
        self.alloc(Payload::Number(value))
    }

    pub fn create_string_from(&mut self, src: NodeId) -> NodeId {
        let value = self.as_string_from(src);
        self.alloc(Payload::String(value))
    }

    pub fn create_bool_from(&mut self, src: NodeId) -> NodeId {
        let value = self.as_bool_from(src);
        self.alloc(Payload::Bool(value))
    }

    // ── Readers ─────────────────────────────────────────────────────────

    pub fn kind(&self, id: NodeId) -> Kind {
        self.node(id)
            .map(|n| n.payload.kind())
            .unwrap_or(Kind::Undefined)
    }

    /// Child count; 0 for scalars and stale handles.
    pub fn len(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn is_container(&self, id: NodeId) -> bool {
        self.kind(id).is_container()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| n.name.as_deref())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.payload.children()).unwrap_or(&[])
    }

    pub fn first(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Current position of the node among its siblings.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let pos = self.position(id)?;
        self.children(parent).get(pos + 1).copied()
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let pos = self.position(id)?;
        pos.checked_sub(1)
            .and_then(|p| self.children(parent).get(p).copied())
    }

    /// Insertion-time position hint. Not renumbered when siblings are removed.
    pub fn order_index(&self, id: NodeId) -> u32 {
        self.node(id).map(|n| n.order_index).unwrap_or(0)
    }

    /// The node itself followed by its parent chain up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.contains(id).then_some(id);
        std::iter::successors(start, move |n| self.parent(*n))
    }

    /// Numeric payload: numbers as-is, booleans 0/1, anything else 0.
    pub fn number(&self, id: NodeId) -> f64 {
        self.node(id).map(|n| n.payload.number()).unwrap_or(0.0)
    }

    /// Text payload of a String node.
    pub fn string(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(|n| &n.payload) {
            Some(Payload::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn boolean(&self, id: NodeId) -> bool {
        self.number(id) != 0.0
    }

    /// Field lookup on an Object. Names compare case-sensitively.
    pub fn by_name(&self, container: NodeId, name: &str) -> Option<NodeId> {
        match self.node(container).map(|n| &n.payload) {
            Some(Payload::Object(children)) => children
                .iter()
                .copied()
                .find(|c| self.name(*c) == Some(name)),
            _ => None,
        }
    }

    /// Positional lookup on an Array or Object.
    pub fn at_index(&self, container: NodeId, index: usize) -> Option<NodeId> {
        self.children(container).get(index).copied()
    }

    pub fn number_by(&self, container: NodeId, name: &str) -> f64 {
        self.by_name(container, name)
            .map(|n| self.number(n))
            .unwrap_or(0.0)
    }

    pub fn string_by(&self, container: NodeId, name: &str) -> Option<&str> {
        self.by_name(container, name).and_then(|n| self.string(n))
    }

    pub fn bool_by(&self, container: NodeId, name: &str) -> bool {
        self.by_name(container, name)
            .map(|n| self.boolean(n))
            .unwrap_or(false)
    }

    pub fn number_at(&self, container: NodeId, index: usize) -> f64 {
        self.at_index(container, index)
            .map(|n| self.number(n))
            .unwrap_or(0.0)
    }

    pub fn string_at(&self, container: NodeId, index: usize) -> Option<&str> {
        self.at_index(container, index).and_then(|n| self.string(n))
    }

    pub fn bool_at(&self, container: NodeId, index: usize) -> bool {
        self.at_index(container, index)
            .map(|n| self.boolean(n))
            .unwrap_or(false)
    }

    /// Approximate bytes held by the subtree: node records plus owned names
    /// and string payloads.
    pub fn size(&self, id: NodeId) -> usize {
        let mut total = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            total += std::mem::size_of::<Node>();
            total += node.name.as_ref().map_or(0, |n| n.len() + 1);
            if let Payload::String(s) = &node.payload {
                total += s.len() + 1;
            }
            stack.extend_from_slice(node.payload.children());
        }
        total
    }

    // ── Coercing readers ────────────────────────────────────────────────

    /// Lossy numeric view: strings parse their numeric prefix (0 when there is
    /// none), booleans are 0/1, null and containers are 0.
    pub fn as_number_from(&self, src: NodeId) -> f64 {
        match self.node(src).map(|n| &n.payload) {
            Some(Payload::String(s)) => parse_number_prefix(s),
            Some(payload) => payload.number(),
            None => 0.0,
        }
    }

    /// Lossy text view: numbers in fixed decimal notation with six
    /// fractional digits (`20` reads as `"20.000000"`), booleans and null as
    /// their literals, containers and undefined as "".
    pub fn as_string_from(&self, src: NodeId) -> String {
        match self.node(src).map(|n| &n.payload) {
            Some(Payload::Number(n)) => format!("{n:.6}"),
            _ => self.display_text(src),
        }
    }

    /// Scalar text as the serializers print it. Same as
    /// [`as_string_from`](Self::as_string_from) except that numbers follow
    /// [`format_number`].
    pub fn display_text(&self, src: NodeId) -> String {
        match self.node(src).map(|n| &n.payload) {
            Some(Payload::String(s)) => s.clone(),
            Some(Payload::Number(n)) => format_number(*n),
            Some(Payload::Bool(b)) => b.to_string(),
            Some(Payload::Null) => "null".to_string(),
            _ => String::new(),
        }
    }

    /// Lossy truth view: strings are true when they spell `true` (any case)
    /// or start with a non-zero number; numbers when non-zero.
    pub fn as_bool_from(&self, src: NodeId) -> bool {
        match self.node(src).map(|n| &n.payload) {
            Some(Payload::String(s)) => {
                s.trim().eq_ignore_ascii_case("true") || parse_number_prefix(s) != 0.0
            }
            Some(payload) => payload.number() != 0.0,
            None => false,
        }
    }

    // ── Type transitions ────────────────────────────────────────────────

    /// Move a node to `target`, tearing down whatever the old payload can't
    /// carry over. Same-kind transitions keep the payload untouched.
    fn retype(&mut self, id: NodeId, target: Kind) -> Result<()> {
        let node = self.live_mut(id)?;
        if node.payload.kind() == target {
            return Ok(());
        }
        let old = std::mem::replace(&mut node.payload, Payload::Undefined);
        let payload = match (old, target) {
            (Payload::Object(children), Kind::Array) => {
                for child in &children {
                    if let Some(n) = self.node_mut(*child) {
                        n.name = None;
                    }
                }
                Payload::Array(children)
            }
            (Payload::Array(children), Kind::Object) => {
                for (i, child) in children.iter().enumerate() {
                    if let Some(n) = self.node_mut(*child) {
                        if n.name.is_none() {
                            n.name = Some(i.to_string());
                        }
                    }
                }
                Payload::Object(children)
            }
            (Payload::Object(children) | Payload::Array(children), _) => {
                debug!(
                    "retype {id} to {target}: freeing {} children",
                    children.len()
                );
                for child in children {
                    self.release_subtree(child);
                }
                empty_payload(target)
            }
            _ => empty_payload(target),
        };
        self.live_mut(id)?.payload = payload;
        self.touch();
        Ok(())
    }

    fn assign(&mut self, id: NodeId, payload: Payload) -> Result<()> {
        self.retype(id, payload.kind())?;
        self.live_mut(id)?.payload = payload;
        self.touch();
        Ok(())
    }

    pub fn set_number(&mut self, id: NodeId, value: f64) -> Result<()> {
        self.assign(id, Payload::Number(value))
    }

    pub fn set_string(&mut self, id: NodeId, value: impl Into<String>) -> Result<()> {
        self.assign(id, Payload::String(value.into()))
    }

    pub fn set_bool(&mut self, id: NodeId, value: bool) -> Result<()> {
        self.assign(id, Payload::Bool(value))
    }

    pub fn set_null(&mut self, id: NodeId) -> Result<()> {
        self.assign(id, Payload::Null)
    }

    /// Flip the node's truth value and store it as a Bool.
    pub fn toggle_bool(&mut self, id: NodeId) -> Result<()> {
        let current = self.live(id)?.payload.number() != 0.0;
        self.set_bool(id, !current)
    }

    /// Append to a String's text. Any other kind becomes a String holding
    /// `suffix`.
    pub fn push_str(&mut self, id: NodeId, suffix: &str) -> Result<()> {
        if let Payload::String(s) = &mut self.live_mut(id)?.payload {
            s.push_str(suffix);
            self.touch();
            return Ok(());
        }
        self.set_string(id, suffix)
    }

    fn update_number(&mut self, id: NodeId, op: impl FnOnce(f64) -> f64) -> Result<()> {
        match &mut self.live_mut(id)?.payload {
            Payload::Number(n) => *n = op(*n),
            other => {
                let found = other.kind();
                warn!("arithmetic on {id}, which is {found}");
                return Err(TreeError::KindMismatch {
                    node: id,
                    expected: Kind::Number,
                    found,
                });
            }
        }
        self.touch();
        Ok(())
    }

    pub fn increment(&mut self, id: NodeId) -> Result<()> {
        self.update_number(id, |n| n + 1.0)
    }

    pub fn decrement(&mut self, id: NodeId) -> Result<()> {
        self.update_number(id, |n| n - 1.0)
    }

    pub fn add(&mut self, id: NodeId, value: f64) -> Result<()> {
        self.update_number(id, |n| n + value)
    }

    pub fn subtract(&mut self, id: NodeId, value: f64) -> Result<()> {
        self.update_number(id, |n| n - value)
    }

    pub fn multiply(&mut self, id: NodeId, value: f64) -> Result<()> {
        self.update_number(id, |n| n * value)
    }

    pub fn divide(&mut self, id: NodeId, value: f64) -> Result<()> {
        self.update_number(id, |n| n / value)
    }

    /// Reset to an empty Array, freeing any previous children.
    pub fn set_array(&mut self, id: NodeId) -> Result<NodeId> {
        self.retype(id, Kind::Undefined)?;
        self.retype(id, Kind::Array)?;
        Ok(id)
    }

    /// Reset to an empty Object, freeing any previous children.
    pub fn set_object(&mut self, id: NodeId) -> Result<NodeId> {
        self.retype(id, Kind::Undefined)?;
        self.retype(id, Kind::Object)?;
        Ok(id)
    }

    fn value_copy(&self, src: NodeId) -> Payload {
        match self.node(src).map(|n| &n.payload) {
            Some(Payload::Object(_)) => Payload::Object(Vec::new()),
            Some(Payload::Array(_)) => Payload::Array(Vec::new()),
            Some(Payload::Number(n)) => Payload::Number(*n),
            Some(Payload::String(s)) => Payload::String(s.clone()),
            Some(Payload::Bool(b)) => Payload::Bool(*b),
            Some(Payload::Null) => Payload::Null,
            Some(Payload::Undefined) | None => Payload::Undefined,
        }
    }

    /// Copy `src`'s kind and scalar payload into `dst`. Children are never
    /// copied: a container source only moves `dst` to that container kind.
    pub fn copy_value_from(&mut self, dst: NodeId, src: NodeId) -> Result<()> {
        match self.value_copy(src) {
            Payload::Object(_) => self.retype(dst, Kind::Object),
            Payload::Array(_) => self.retype(dst, Kind::Array),
            payload => self.assign(dst, payload),
        }
    }

    pub fn set_number_from(&mut self, dst: NodeId, src: NodeId) -> Result<()> {
        let value = self.as_number_from(src);
        self.set_number(dst, value)
    }

    pub fn set_string_from(&mut self, dst: NodeId, src: NodeId) -> Result<()> {
        let value = self.as_string_from(src);
        self.set_string(dst, value)
    }

    pub fn set_bool_from(&mut self, dst: NodeId, src: NodeId) -> Result<()> {
        let value = self.as_bool_from(src);
        self.set_bool(dst, value)
    }

    // ── Structure ───────────────────────────────────────────────────────

    /// A value may be attached under `container` only when it is live,
    /// unattached, and not `container` itself or one of its ancestors.
    fn check_insertable(&self, container: NodeId, value: NodeId) -> Result<()> {
        if self.live(value)?.parent.is_some() {
            warn!("refusing to insert {value}: already attached");
            return Err(TreeError::AlreadyAttached(value));
        }
        if self.ancestors(container).any(|a| a == value) {
            warn!("refusing to insert {value} under its own descendant {container}");
            return Err(TreeError::CyclicInsert { container, value });
        }
        Ok(())
    }

    /// Splice `value` into `container`'s children after `after` (or at the
    /// end). The container must already be a container kind.
    fn link(&mut self, container: NodeId, value: NodeId, after: Option<NodeId>) -> Result<NodeId> {
        let children = self.children(container);
        let pos = match after {
            Some(anchor) => match children.iter().position(|c| *c == anchor) {
                Some(p) => p + 1,
                None => {
                    return Err(TreeError::NotAChild {
                        container,
                        after: anchor,
                    })
                }
            },
            None => children.len(),
        };
        let order_index = match pos.checked_sub(1) {
            Some(prev) => self.order_index(children[prev]).wrapping_add(1),
            None => 0,
        };

        if let Some(list) = self.live_mut(container)?.payload.children_mut() {
            list.insert(pos, value);
        }
        let node = self.live_mut(value)?;
        node.parent = Some(container);
        node.order_index = order_index;
        self.touch();
        trace!("linked {value} under {container} at position {pos}");
        Ok(value)
    }

    /// Append `value` (or a fresh node) to the end of an Array.
    ///
    /// Undefined and scalar containers are promoted to an empty Array first.
    /// Objects are rejected: their members go through
    /// [`set_field`](Self::set_field).
    pub fn append(&mut self, container: NodeId, value: Option<NodeId>) -> Result<NodeId> {
        self.insert_array_item(container, value, None)
    }

    /// Like [`append`](Self::append), but places the node immediately after
    /// `after`, which must be a child of `container`.
    pub fn insert_after(
        &mut self,
        container: NodeId,
        after: NodeId,
        value: Option<NodeId>,
    ) -> Result<NodeId> {
        self.insert_array_item(container, value, Some(after))
    }

    fn insert_array_item(
        &mut self,
        container: NodeId,
        value: Option<NodeId>,
        after: Option<NodeId>,
    ) -> Result<NodeId> {
        if self.live(container)?.payload.kind() == Kind::Object {
            warn!("append on object {container}");
            return Err(TreeError::AppendToObject(container));
        }
        if let Some(v) = value {
            self.check_insertable(container, v)?;
        }
        if let Some(anchor) = after {
            if self.parent(anchor) != Some(container) {
                return Err(TreeError::NotAChild {
                    container,
                    after: anchor,
                });
            }
        }
        self.retype(container, Kind::Array)?;
        let value = match value {
            Some(v) => v,
            None => self.create(),
        };
        self.link(container, value, after)
    }

    pub fn push_number(&mut self, container: NodeId, value: f64) -> Result<NodeId> {
        let item = self.create_number(value);
        self.append_owned(container, item)
    }

    pub fn push_string(&mut self, container: NodeId, value: impl Into<String>) -> Result<NodeId> {
        let item = self.create_string(value);
        self.append_owned(container, item)
    }

    /// Append a node created for this call, freeing it again if the append
    /// is refused.
    fn append_owned(&mut self, container: NodeId, item: NodeId) -> Result<NodeId> {
        self.append(container, Some(item)).inspect_err(|_| self.free(item))
    }

    /// Return the Object member called `field`, inserting `value` (or a fresh
    /// node) under that name when it doesn't exist yet.
    ///
    /// Undefined and scalar nodes are promoted to an empty Object; an Array
    /// is converted, its elements named after their positions. An existing
    /// member wins: it is returned unchanged and `value` stays detached and
    /// owned by the caller.
    pub fn set_field(
        &mut self,
        container: NodeId,
        field: &str,
        value: Option<NodeId>,
    ) -> Result<NodeId> {
        self.live(container)?;
        if let Some(v) = value {
            self.check_insertable(container, v)?;
        }
        self.retype(container, Kind::Object)?;
        if let Some(existing) = self.by_name(container, field) {
            trace!("field '{field}' already present in {container}");
            return Ok(existing);
        }
        let value = match value {
            Some(v) => v,
            None => self.create(),
        };
        self.live_mut(value)?.name = Some(field.to_owned());
        self.link(container, value, None)
    }

    /// `set_field` followed by `set_number` on the member.
    pub fn set_field_number(&mut self, container: NodeId, field: &str, value: f64) -> Result<NodeId> {
        let member = self.set_field(container, field, None)?;
        self.set_number(member, value)?;
        Ok(member)
    }

    /// `set_field` followed by `set_string` on the member.
    pub fn set_field_string(
        &mut self,
        container: NodeId,
        field: &str,
        value: impl Into<String>,
    ) -> Result<NodeId> {
        let member = self.set_field(container, field, None)?;
        self.set_string(member, value)?;
        Ok(member)
    }

    fn unlink(&mut self, parent: NodeId, id: NodeId) {
        if let Some(list) = self.node_mut(parent).and_then(|p| p.payload.children_mut()) {
            if let Some(pos) = list.iter().position(|c| *c == id) {
                list.remove(pos);
            }
        }
    }

    /// Remove the node from its parent and clear its name. The node and its
    /// subtree stay alive as a new root owned by the caller.
    pub fn detach(&mut self, id: NodeId) -> Result<NodeId> {
        if let Some(parent) = self.live(id)?.parent {
            self.unlink(parent, id);
        }
        let node = self.live_mut(id)?;
        node.parent = None;
        node.name = None;
        self.touch();
        trace!("detached {id}");
        Ok(id)
    }

    /// Destroy the node and its whole subtree, unlinking it from its parent
    /// first. Freeing a stale handle does nothing.
    pub fn free(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        if let Some(parent) = node.parent {
            self.unlink(parent, id);
        }
        self.release_subtree(id);
        self.touch();
        trace!("freed {id}");
    }

    /// Release storage for `root` and everything below it. The caller is
    /// responsible for the parent's child list.
    fn release_subtree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.get_mut(id.index) else {
                continue;
            };
            if slot.generation != id.generation {
                continue;
            }
            let Some(node) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.live -= 1;
            if let Payload::Object(children) | Payload::Array(children) = node.payload {
                stack.extend(children);
            }
        }
    }
}
