use super::{
    data::static_data,
    layout::{FlexDirection, flex_layout},
    panel::{VizPanelState, viz_panel},
    scene::{SceneRootState, scene},
    time_range::time_range_node,
};

use crate::{
    foundation::core::{RawTimeRange, TimeRange, Timestamp},
    scene::{
        state::{DataFrame, Field, LayoutChildState, LoadingState},
        view::mount_tree,
    },
};

fn frame(name: &str, values: &[i64]) -> DataFrame {
    DataFrame {
        name: Some(name.to_string()),
        fields: vec![Field {
            name: "value".to_string(),
            values: values.iter().map(|v| (*v).into()).collect(),
        }],
    }
}

fn panel(title: &str) -> VizPanelState {
    VizPanelState {
        title: title.to_string(),
        plugin_id: "timeseries".to_string(),
        layout: LayoutChildState {
            key: Some(title.to_lowercase()),
            ..LayoutChildState::default()
        },
        data: None,
    }
}

fn range(from: i64, to: i64) -> TimeRange {
    TimeRange::new(Timestamp(from), Timestamp(to)).unwrap()
}

#[test]
fn full_tree_renders_top_down() {
    let cpu = viz_panel(panel("CPU"));
    let mem = viz_panel(panel("Memory"));
    let root = scene(SceneRootState {
        title: "Hosts".to_string(),
        body: flex_layout(FlexDirection::Column, [cpu.erase(), mem.erase()]).erase(),
        time_range: Some(time_range_node(range(0, 60_000))),
        data: Some(static_data(vec![frame("a", &[1, 2]), frame("b", &[3])])),
    });

    let _mounted = mount_tree(&root.erase());
    let el = root.render().unwrap();

    assert_eq!(el.kind, "scene");
    assert_eq!(el.props["title"], "Hosts");
    assert_eq!(el.children[0].kind, "time-range-picker");

    let layout = el.find("flex-layout").unwrap();
    assert_eq!(layout.props["direction"], "column");
    assert_eq!(layout.children.len(), 2);

    let first = &layout.children[0];
    assert_eq!(first.key.as_deref(), Some("cpu"));
    assert_eq!(first.props["series"], 2);
    assert_eq!(first.props["loading"], "done");
    assert_eq!(first.props["from"], 0);
    assert_eq!(first.props["to"], 60_000);
    assert_eq!(el.count(), 5);
}

#[test]
fn static_data_stamps_the_scoped_time_range() {
    let data = static_data(vec![frame("a", &[1])]);
    let body = viz_panel(panel("Only"));
    let _root = scene(SceneRootState {
        title: "T".to_string(),
        body: body.erase(),
        time_range: Some(time_range_node(range(10, 20))),
        data: Some(data.clone()),
    });

    assert!(data.state().data.is_none());
    data.start();
    let loaded = data.state();
    let panel_data = loaded.data.as_ref().unwrap();
    assert_eq!(panel_data.state, LoadingState::Done);
    assert_eq!(panel_data.series.len(), 1);
    assert_eq!(panel_data.time_range, Some(range(10, 20)));
    data.stop();
    assert_eq!(data.state().series_count(), 1, "stop keeps the last result");
}

#[test]
fn panel_own_data_shadows_the_scene_data() {
    let own = viz_panel(VizPanelState {
        data: Some(static_data(vec![frame("x", &[1])])),
        ..panel("Own")
    });
    let shared = viz_panel(panel("Shared"));
    let root = scene(SceneRootState {
        title: "T".to_string(),
        body: flex_layout(FlexDirection::Row, [own.erase(), shared.erase()]).erase(),
        time_range: None,
        data: Some(static_data(vec![frame("a", &[1]), frame("b", &[2]), frame("c", &[3])])),
    });

    let _mounted = mount_tree(&root.erase());
    assert_eq!(own.resolve_data().series_count(), 1);
    assert_eq!(shared.resolve_data().series_count(), 3);
    assert!(own.render().unwrap().props.get("from").is_none());
}

#[test]
fn refresh_reevaluates_relative_bounds() {
    let raw = RawTimeRange::new("now-1h", "now");
    let node = time_range_node(TimeRange::from_raw(raw, Timestamp(3_600_000)).unwrap());
    assert_eq!(node.time_range().from, Timestamp(0));

    let watch = node.watch();
    node.refresh(Timestamp(7_200_000)).unwrap();
    assert!(watch.take_changed());
    assert_eq!(node.time_range().from, Timestamp(3_600_000));
    assert_eq!(node.time_range().to, Timestamp(7_200_000));

    let picker = node.render().unwrap();
    assert_eq!(picker.props["from"], "now-1h");
    assert_eq!(picker.props["toMs"], 7_200_000);
}

#[test]
fn panel_follows_time_range_updates() {
    let tr = time_range_node(range(0, 100));
    let p = viz_panel(panel("P"));
    let _root = scene(SceneRootState {
        title: "T".to_string(),
        body: p.erase(),
        time_range: Some(tr.clone()),
        data: None,
    });

    tr.set_time_range(range(50, 150));
    let el = p.render().unwrap();
    assert_eq!(el.props["from"], 50);
    assert_eq!(el.props["series"], 0);
    assert!(el.props.get("loading").is_none());
}

#[test]
fn kinds_are_stable() {
    let p = viz_panel(panel("P"));
    assert_eq!(p.kind(), "panel");
    assert_eq!(flex_layout(FlexDirection::Row, []).kind(), "flex");
    assert_eq!(time_range_node(range(0, 1)).kind(), "time_range");
    assert_eq!(static_data(Vec::new()).kind(), "data");
    assert!(static_data(Vec::new()).render().is_none());
}
