//! dyndash is a hierarchical, reactive state container for dashboard scenes.
//!
//! A scene is a tree of [`SceneNode`]s. Each node owns a typed state published on a replaying
//! [`StateChannel`], declares which nodes its state owns, and reaches shared capabilities (a
//! [`TimeRange`] provider, a data provider) by walking up to the nearest ancestor that carries one.
//!
//! # Data flow
//!
//! 1. **Construct**: `SceneNode::new(state, component)` seeds the channel and links the children
//!    the state declares through [`SceneState`].
//! 2. **Update**: `set_state(|s| ..)` shallow-updates, relinks direct children, then publishes.
//! 3. **Consume**: observers `subscribe`; renderers call `use_state`, `resolve_data` and
//!    `resolve_time_range`; mount guards drive `enter_view`/`exit_view` on data providers.
//!
//! Everything is single-threaded (`Rc`/`RefCell`). Delivery is synchronous and a panicking
//! observer never prevents delivery to the others.
#![forbid(unsafe_code)]

mod channel;
mod compose;
mod foundation;
mod kinds;
mod render;
mod scene;

pub use channel::replay::{Delivery, Observer, StateChannel};
pub use channel::subscription::{Subscription, SubscriptionSet};
pub use compose::descriptor::{BuildContext, DataDescriptor, SceneDescriptor, build_scene};
pub use foundation::core::{NodeId, RawTimeRange, TimeRange, Timestamp};
pub use foundation::error::{DyndashError, DyndashResult};
pub use kinds::data::{StaticData, static_data};
pub use kinds::layout::{FlexDirection, FlexLayout, FlexLayoutState, flex_layout};
pub use kinds::panel::{VizPanel, VizPanelState, viz_panel};
pub use kinds::scene::{Scene, SceneRootState, scene};
pub use kinds::time_range::{SceneTimeRange, time_range_node};
pub use render::element::Element;
pub use scene::node::{Children, Component, SceneNode, SceneRef, SceneState, destroy_subtree};
pub use scene::state::{
    DataFrame, DataState, Dimension, Field, LayoutChildState, LoadingState, PanelData, Sizing,
    SizingMode, TimeRangeState,
};
pub use scene::view::{Mounted, mount_tree};
pub use scene::watch::StateWatch;
