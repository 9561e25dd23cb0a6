// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use strandgrid::common::Point;
use strandgrid::interaction::PointerState;
use strandgrid::tooltip::{AttentionPattern, Direction};
use strandgrid::{Error, VisualizationSession, VizConfig, Warning};

fn two_token_payload() -> &'static str {
    r#"{
        "tokens": [{"text": "The"}, {"text": "Ġcat"}],
        "layers": [
            {"index": 0, "heads": [
                {"index": 0, "weights": [[0, 1, 0.99]]}
            ]}
        ]
    }"#
}

fn session_with(payload: &str, model_depth: usize) -> VisualizationSession {
    let mut session = VisualizationSession::new(VizConfig {
        model_depth,
        ..VizConfig::default()
    });
    session.load_json(payload).unwrap();
    session
}

#[test]
fn single_edge_above_threshold() {
    let session = session_with(two_token_payload(), 2);
    let scene = session.scene().unwrap();
    assert_eq!(scene.edges.len(), 1);
    let edge = &scene.edges[0].edge;
    assert_eq!(edge.id, "edge-0-0-0-1");
    assert_eq!((edge.source.layer, edge.source.token), (0, 0));
    assert_eq!((edge.target.layer, edge.target.token), (1, 1));
}

#[test]
fn raising_threshold_drops_all_edges() {
    let mut session = session_with(two_token_payload(), 2);
    session.set_threshold(0.995).unwrap();
    assert!(session.scene().unwrap().edges.is_empty());
}

#[test]
fn no_visible_heads_means_no_edges() {
    let mut session = session_with(two_token_payload(), 2);
    session.hide_all_heads().unwrap();
    assert!(session.scene().unwrap().edges.is_empty());
}

#[test]
fn out_of_bounds_weight_is_discarded_with_diagnostic() {
    let payload = r#"{
        "tokens": [{"text": "a"}, {"text": "b"}, {"text": "c"}],
        "layers": [
            {"index": 0, "heads": [
                {"index": 0, "weights": [[0, 5, 0.99], [0, 1, 0.99]]}
            ]}
        ]
    }"#;
    let mut session = session_with(payload, 2);
    assert_eq!(session.scene().unwrap().edges.len(), 1);
    let warnings = session.take_diagnostics();
    assert!(warnings.iter().any(|w| matches!(
        w,
        Warning::WeightOutOfBounds {
            query: 5,
            token_count: 3,
            ..
        }
    )));
}

#[test]
fn self_attention_tooltip() {
    let payload = r#"{
        "tokens": [{"text": "a"}, {"text": "b"}],
        "layers": [
            {"index": 0, "heads": [
                {"index": 0, "weights": [[1, 1, 0.99]]}
            ]}
        ]
    }"#;
    let mut session = session_with(payload, 2);
    session
        .pointer_enter_edge("edge-0-0-1-1", Point { x: 0.0, y: 0.0 })
        .unwrap();
    let tip = session.tooltip().unwrap();
    assert_eq!(tip.pattern, AttentionPattern::SelfAttention);
    assert_eq!(tip.direction, Direction::None);
    assert_eq!(tip.direction.label(), "");
    assert_eq!(
        tip.insight,
        Some("Self-attention: token processing its own features")
    );
}

#[test]
fn json_to_svg_round_trip() {
    let mut session = session_with(two_token_payload(), 2);
    let svg = session.to_svg().unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("id=\"edge-0-0-0-1\""));
    assert!(svg.contains("id=\"node-0-0\""));
    // stripped token artifact never reaches the output
    assert!(svg.contains(">cat</text>"));
    assert!(!svg.contains("Ġ"));

    // emphasis changes the serialized scene, restoration brings it back
    session.pointer_enter_node(0, 0).unwrap();
    let hovered = session.to_svg().unwrap();
    assert_ne!(svg, hovered);
    session.pointer_leave_node().unwrap();
    assert_eq!(session.to_svg().unwrap(), svg);
}

#[test]
fn focus_survives_hover_until_second_click() {
    let mut session = session_with(two_token_payload(), 2);
    session.click_node(0, 0).unwrap();
    let focused_svg = session.to_svg().unwrap();

    session.pointer_enter_node(1, 1).unwrap();
    session.pointer_leave_node().unwrap();
    session
        .pointer_enter_edge("edge-0-0-0-1", Point { x: 5.0, y: 5.0 })
        .unwrap();
    session.pointer_leave_edge().unwrap();
    assert_eq!(session.to_svg().unwrap(), focused_svg);

    session.click_node(0, 0).unwrap();
    assert_eq!(session.pointer_state(), &PointerState::Idle);
}

#[test]
fn structurally_invalid_payload_is_an_error() {
    let mut session = VisualizationSession::default();
    assert!(matches!(session.load_json("[]"), Err(Error::Parse(_))));
    assert!(session.scene().is_none());
}

#[test]
fn empty_token_list_is_an_error() {
    let payload = r#"{
        "tokens": [],
        "layers": [
            {"index": 0, "heads": [{"index": 0, "weights": [[0, 0, 0.99]]}]}
        ]
    }"#;
    let mut session = VisualizationSession::default();
    assert_eq!(session.load_json(payload), Err(Error::EmptyTokens));
}

#[test]
fn generation_steps_fold_into_model_depth() {
    // raw layer indices 0 and 2 both resolve to depth 0 when the model
    // is two layers deep; first-wins keeps the earlier step's weights
    let payload = r#"{
        "tokens": [{"text": "a"}, {"text": "b"}],
        "layers": [
            {"index": 0, "heads": [{"index": 0, "weights": [[0, 1, 0.99]]}]},
            {"index": 2, "heads": [{"index": 0, "weights": [[1, 0, 0.99]]}]}
        ]
    }"#;
    let mut session = session_with(payload, 2);
    let scene = session.scene().unwrap();
    assert_eq!(scene.edges.len(), 1);
    assert_eq!(scene.edges[0].edge.id, "edge-0-0-0-1");
    let warnings = session.take_diagnostics();
    assert!(warnings
        .iter()
        .any(|w| matches!(w, Warning::DuplicateLayer { depth: 0, .. })));
}

#[test]
fn head_toggle_controls_strands() {
    let payload = r#"{
        "tokens": [{"text": "a"}, {"text": "b"}],
        "layers": [
            {"index": 0, "heads": [
                {"index": 0, "weights": [[0, 1, 0.99]]},
                {"index": 1, "weights": [[1, 0, 0.99]]}
            ]}
        ]
    }"#;
    let mut session = session_with(payload, 2);
    let toggles = session.head_toggles();
    assert_eq!(toggles.len(), 2);
    assert!(toggles.iter().all(|t| t.visible));
    assert_eq!(toggles[1].color, "#00e5ff");
    assert_eq!(session.scene().unwrap().edges.len(), 2);

    session.set_head_visible(0, false).unwrap();
    let scene = session.scene().unwrap();
    assert_eq!(scene.edges.len(), 1);
    assert_eq!(scene.edges[0].edge.head_index, 1);
}
