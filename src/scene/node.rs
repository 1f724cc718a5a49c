use std::{
    any::Any,
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::{
    channel::{
        replay::{Delivery, StateChannel},
        subscription::{Subscription, SubscriptionSet},
    },
    foundation::core::NodeId,
    render::element::Element,
    scene::{
        linker,
        state::{DataState, TimeRangeState},
        view::{Mounted, ViewState},
        watch::StateWatch,
    },
};

/// Child list returned by [`SceneState::children`].
pub type Children = SmallVec<[SceneRef; 4]>;

/// State carried by a scene node, with its ownership edges declared explicitly.
///
/// The linker attaches every node returned by [`children`](SceneState::children),
/// [`data`](SceneState::data) and [`time_range`](SceneState::time_range) to the owning node after
/// construction and after every state change. Only direct children are touched.
pub trait SceneState: Clone + 'static {
    /// Node-valued fields and the child sequence, in declaration order.
    fn children(&self) -> Children {
        Children::new()
    }

    /// Data provider scoped to this node and its descendants.
    fn data(&self) -> Option<&SceneNode<DataState>> {
        None
    }

    /// Time-range provider scoped to this node and its descendants.
    fn time_range(&self) -> Option<&SceneNode<TimeRangeState>> {
        None
    }
}

/// Rendering projection and provider hooks of a concrete node kind.
pub trait Component<S: SceneState>: 'static {
    /// Short kind name used in logs and tree dumps.
    fn kind(&self) -> &'static str;

    /// Project the node into a renderable element, or nothing.
    fn render(&self, model: &SceneNode<S>) -> Option<Element>;

    /// Begin background activity; called when the first viewer starts this node as a provider.
    fn on_start(&self, _model: &SceneNode<S>) {}

    /// End background activity; called when the last viewer stops this node.
    fn on_stop(&self, _model: &SceneNode<S>) {}
}

pub(crate) struct NodeInner<S: SceneState> {
    id: NodeId,
    this: Weak<NodeInner<S>>,
    channel: StateChannel<Rc<S>>,
    parent: RefCell<Option<Weak<dyn ErasedNode>>>,
    component: Box<dyn Component<S>>,
    subs: SubscriptionSet,
    destroyed: Cell<bool>,
    pub(crate) view: ViewState,
}

/// Typed handle to a reactive, tree-positioned state container.
///
/// Cloning the handle shares the node. A node is kept alive by the states that list it and by
/// handles like this one; the back-reference to its parent never owns the parent.
pub struct SceneNode<S: SceneState> {
    inner: Rc<NodeInner<S>>,
}

impl<S: SceneState> Clone for SceneNode<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: SceneState> SceneNode<S> {
    /// Create a node: seed its channel with `state`, then link the children it declares.
    pub fn new(state: S, component: impl Component<S>) -> Self {
        let inner = Rc::new_cyclic(|this| NodeInner {
            id: NodeId::next(),
            this: this.clone(),
            channel: StateChannel::new(Rc::new(state)),
            parent: RefCell::new(None),
            component: Box::new(component),
            subs: SubscriptionSet::new(),
            destroyed: Cell::new(false),
            view: ViewState::default(),
        });
        let node = Self { inner };
        linker::link_children(&node.owner_link(), node.id(), &*node.state());
        tracing::trace!(node = %node.id(), kind = node.kind(), "scene node created");
        node
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn kind(&self) -> &'static str {
        self.inner.component.kind()
    }

    /// Latest state; always the value last published on the node's channel.
    pub fn state(&self) -> Rc<S> {
        self.inner.channel.latest()
    }

    /// Shallow update: `update` edits a clone of the current state, so every field it leaves
    /// alone keeps its previous value (and `Rc` identity). Children are relinked before the new
    /// state is published.
    pub fn set_state(&self, update: impl FnOnce(&mut S)) -> Delivery {
        if self.is_destroyed() {
            tracing::warn!(node = %self.id(), "set_state on destroyed node ignored");
            return Delivery::default();
        }
        let mut next = S::clone(&self.state());
        update(&mut next);
        self.commit(next)
    }

    /// Replace the whole state.
    pub fn replace_state(&self, state: S) -> Delivery {
        if self.is_destroyed() {
            tracing::warn!(node = %self.id(), "replace_state on destroyed node ignored");
            return Delivery::default();
        }
        self.commit(state)
    }

    fn commit(&self, next: S) -> Delivery {
        let next = Rc::new(next);
        linker::link_children(&self.owner_link(), self.id(), &*next);
        self.inner.channel.publish(next)
    }

    /// Observe the state; `next` receives the current state immediately.
    pub fn subscribe(&self, mut next: impl FnMut(&S) + 'static) -> Subscription {
        self.inner.channel.subscribe(move |state: &Rc<S>| next(&**state))
    }

    /// Reactive read for rendering layers: the latest state, re-read on every publish.
    pub fn use_state(&self) -> Rc<S> {
        self.state()
    }

    /// Adapter that keeps the latest state and a changed flag for pull-based consumers.
    pub fn watch(&self) -> StateWatch<S> {
        StateWatch::new(&self.inner.channel)
    }

    /// Keep `sub` until this node is destroyed.
    pub fn own(&self, sub: Subscription) {
        self.inner.subs.add(sub);
    }

    pub fn owned_subscriptions(&self) -> usize {
        self.inner.subs.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.channel.subscriber_count()
    }

    pub fn parent(&self) -> Option<SceneRef> {
        self.inner.parent().map(SceneRef)
    }

    /// Type-erased handle, as stored in child sequences.
    pub fn erase(&self) -> SceneRef {
        let erased: Rc<dyn ErasedNode> = self.inner.clone();
        SceneRef(erased)
    }

    /// Nearest data provider state on the path to the root (self included); empty when none.
    pub fn resolve_data(&self) -> Rc<DataState> {
        crate::scene::resolve::resolve_data(self.inner.clone())
    }

    /// Nearest time-range provider on the path to the root (self included).
    pub fn resolve_time_range(&self) -> Option<SceneNode<TimeRangeState>> {
        crate::scene::resolve::resolve_time_range(self.inner.clone())
    }

    /// Start this node's own data provider, if it carries one.
    pub fn enter_view(&self) {
        self.inner.view.enter(&self.erase());
    }

    /// Stop the provider started by the matching [`enter_view`](Self::enter_view).
    pub fn exit_view(&self) {
        self.inner.view.exit(self.id());
    }

    pub fn is_in_view(&self) -> bool {
        self.inner.view.is_in_view()
    }

    /// Enter view now and exit when the guard drops.
    pub fn mount(&self) -> Mounted {
        Mounted::new(self.erase())
    }

    /// Provider side of the view lifecycle: the first start runs [`Component::on_start`].
    pub fn start(&self) {
        if self.is_destroyed() {
            return;
        }
        if self.inner.view.acquire() {
            tracing::debug!(node = %self.id(), kind = self.kind(), "provider started");
            self.inner.component.on_start(self);
        }
    }

    /// The stop balancing the last start runs [`Component::on_stop`]; unbalanced stops are ignored.
    pub fn stop(&self) {
        if self.inner.view.release() {
            tracing::debug!(node = %self.id(), kind = self.kind(), "provider stopped");
            self.inner.component.on_stop(self);
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.view.is_running()
    }

    pub fn render(&self) -> Option<Element> {
        self.inner.component.render(self)
    }

    /// Release this node's own wiring: leave view, drop owned subscriptions, close the channel.
    ///
    /// Children are not destroyed; see [`destroy_subtree`](crate::destroy_subtree).
    pub fn destroy(&self) {
        self.inner.teardown();
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn owner_link(&self) -> Weak<dyn ErasedNode> {
        let weak: Weak<NodeInner<S>> = Rc::downgrade(&self.inner);
        weak
    }
}

impl<S: SceneState + std::fmt::Debug> std::fmt::Debug for SceneNode<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("state", &self.state())
            .finish()
    }
}

impl<S: SceneState> PartialEq for SceneNode<S> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Object-safe view of a node of any state type; what parents and child sequences hold.
pub(crate) trait ErasedNode {
    fn id(&self) -> NodeId;
    fn kind(&self) -> &'static str;
    fn parent(&self) -> Option<Rc<dyn ErasedNode>>;
    fn attach(&self, parent: Weak<dyn ErasedNode>, parent_id: NodeId);
    fn children(&self) -> Children;
    fn owned(&self) -> Children;
    fn local_data(&self) -> Option<SceneNode<DataState>>;
    fn local_time_range(&self) -> Option<SceneNode<TimeRangeState>>;
    fn render(&self) -> Option<Element>;
    fn view(&self) -> &ViewState;
    fn destroy(&self);
    fn is_destroyed(&self) -> bool;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<S: SceneState> NodeInner<S> {
    fn handle(&self) -> Option<SceneNode<S>> {
        self.this.upgrade().map(|inner| SceneNode { inner })
    }

    fn teardown(&self) {
        if self.destroyed.get() {
            return;
        }
        self.view.exit(self.id);
        self.destroyed.set(true);
        self.subs.unsubscribe_all();
        self.channel.close();
        tracing::debug!(node = %self.id, kind = self.component.kind(), "scene node destroyed");
    }
}

impl<S: SceneState> ErasedNode for NodeInner<S> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        self.component.kind()
    }

    fn parent(&self) -> Option<Rc<dyn ErasedNode>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn attach(&self, parent: Weak<dyn ErasedNode>, parent_id: NodeId) {
        let mut slot = self.parent.borrow_mut();
        if let Some(previous) = slot.as_ref().and_then(Weak::upgrade) {
            if previous.id() != parent_id {
                tracing::trace!(
                    node = %self.id,
                    from = %previous.id(),
                    to = %parent_id,
                    "node relinked to a new parent"
                );
            }
        }
        *slot = Some(parent);
    }

    fn children(&self) -> Children {
        self.channel.latest().children()
    }

    fn owned(&self) -> Children {
        linker::owned_nodes(&*self.channel.latest())
    }

    fn local_data(&self) -> Option<SceneNode<DataState>> {
        self.channel.latest().data().cloned()
    }

    fn local_time_range(&self) -> Option<SceneNode<TimeRangeState>> {
        self.channel.latest().time_range().cloned()
    }

    fn render(&self) -> Option<Element> {
        let node = self.handle()?;
        self.component.render(&node)
    }

    fn view(&self) -> &ViewState {
        &self.view
    }

    fn destroy(&self) {
        self.teardown();
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Type-erased node handle.
#[derive(Clone)]
pub struct SceneRef(pub(crate) Rc<dyn ErasedNode>);

impl SceneRef {
    pub fn id(&self) -> NodeId {
        self.0.id()
    }

    pub fn kind(&self) -> &'static str {
        self.0.kind()
    }

    pub fn parent(&self) -> Option<SceneRef> {
        self.0.parent().map(SceneRef)
    }

    pub fn children(&self) -> Children {
        self.0.children()
    }

    /// Recover the typed handle when the state type is known.
    pub fn downcast<S: SceneState>(&self) -> Option<SceneNode<S>> {
        let any = Rc::clone(&self.0).into_any();
        any.downcast::<NodeInner<S>>()
            .ok()
            .map(|inner| SceneNode { inner })
    }

    pub fn resolve_data(&self) -> Rc<DataState> {
        crate::scene::resolve::resolve_data(Rc::clone(&self.0))
    }

    pub fn resolve_time_range(&self) -> Option<SceneNode<TimeRangeState>> {
        crate::scene::resolve::resolve_time_range(Rc::clone(&self.0))
    }

    pub fn enter_view(&self) {
        self.0.view().enter(self);
    }

    pub fn exit_view(&self) {
        self.0.view().exit(self.id());
    }

    pub fn is_in_view(&self) -> bool {
        self.0.view().is_in_view()
    }

    pub fn mount(&self) -> Mounted {
        Mounted::new(self.clone())
    }

    pub fn render(&self) -> Option<Element> {
        self.0.render()
    }

    pub fn destroy(&self) {
        self.0.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.is_destroyed()
    }

    pub fn ptr_eq(&self, other: &SceneRef) -> bool {
        self.id() == other.id()
    }

    pub(crate) fn attach(&self, parent: Weak<dyn ErasedNode>, parent_id: NodeId) {
        self.0.attach(parent, parent_id);
    }

    pub(crate) fn local_data(&self) -> Option<SceneNode<DataState>> {
        self.0.local_data()
    }
}

impl<S: SceneState> From<SceneNode<S>> for SceneRef {
    fn from(node: SceneNode<S>) -> Self {
        let erased: Rc<dyn ErasedNode> = node.inner;
        SceneRef(erased)
    }
}

impl<S: SceneState> From<&SceneNode<S>> for SceneRef {
    fn from(node: &SceneNode<S>) -> Self {
        node.erase()
    }
}

impl std::fmt::Debug for SceneRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRef")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .finish()
    }
}

impl PartialEq for SceneRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Destroy `root` and every node its state owns (children and providers), children first.
pub fn destroy_subtree(root: &SceneRef) {
    for child in root.0.owned() {
        destroy_subtree(&child);
    }
    root.destroy();
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
