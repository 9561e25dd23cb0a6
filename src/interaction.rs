// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::common::{Point, Warning};
use crate::config::VizConfig;
use crate::datamodel::Token;
use crate::palette::head_color;
use crate::scene::{NodeStyle, Scene, TokenLabelStyle};
use crate::strands::{Edge, NodeId, edge_baseline_style};
use crate::tooltip::{self, TooltipContent};

/// What the pointer is currently doing. Focus is sticky: hover events are
/// ignored until the focused node is clicked again.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    HoveredNode(NodeId),
    HoveredEdge(String),
    Focused(NodeId),
}

/// Applies hover and focus emphasis to a [`Scene`].
///
/// Every emphasis pass first restores the whole scene to baseline and then
/// applies the new emphasis, so styles never accumulate across events.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: PointerState,
    tooltip: Option<TooltipContent>,
    warnings: Vec<Warning>,
}

fn emphasized_width(weight: f64) -> f64 {
    (weight * 3.0).max(2.0)
}

fn restore_all(scene: &mut Scene, config: &VizConfig) {
    for n in &mut scene.nodes {
        n.style = NodeStyle::baseline(config);
    }
    for e in &mut scene.edges {
        e.style = edge_baseline_style(&e.edge, config);
        e.glow = false;
        e.raised = false;
    }
    for l in &mut scene.token_labels {
        l.style = TokenLabelStyle::baseline();
        l.raised = false;
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn tooltip(&self) -> Option<&TooltipContent> {
        self.tooltip.as_ref()
    }

    /// Drain warnings recorded for events that referenced stale scene
    /// content.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Forget all transient state, e.g. after a full scene rebuild.
    pub fn reset(&mut self) {
        self.state = PointerState::Idle;
        self.tooltip = None;
    }

    pub fn pointer_enter_node(&mut self, scene: &mut Scene, config: &VizConfig, id: NodeId) {
        if matches!(self.state, PointerState::Focused(_)) {
            return;
        }
        if scene.node_mut(id).is_none() {
            self.warnings.push(Warning::StaleNode {
                layer: id.layer,
                token: id.token,
            });
            return;
        }

        restore_all(scene, config);

        if let Some(n) = scene.node_mut(id) {
            n.style = NodeStyle {
                radius: config.token_radius * 1.8,
                fill: "#fff".to_string(),
                stroke: "#3498db".to_string(),
                stroke_width: 2.0,
                glow: true,
            };
        }

        for e in &mut scene.edges {
            if e.edge.source == id || e.edge.target == id {
                e.style.stroke_width = emphasized_width(e.edge.weight);
                e.style.opacity = 1.0;
                e.glow = true;
                e.raised = true;
            } else {
                e.style.opacity = 0.05;
            }
        }

        if let Some(l) = scene.token_label_mut(id.token) {
            l.style.bg_fill = "#2a7dd2".to_string();
            l.style.bg_stroke = "#ffffff".to_string();
            l.style.bg_stroke_width = 1.5;
            l.style.text_fill = "#FFFFFF".to_string();
            l.style.accent_fill = "#ffffff".to_string();
            l.style.accent_height = 4.0;
        }

        // the pointer may slide off an edge straight onto a node without
        // a leave event; a node hover implies no tooltip
        self.tooltip = None;
        self.state = PointerState::HoveredNode(id);
    }

    pub fn pointer_leave_node(&mut self, scene: &mut Scene, config: &VizConfig) {
        if matches!(self.state, PointerState::Focused(_)) {
            return;
        }
        restore_all(scene, config);
        self.tooltip = None;
        self.state = PointerState::Idle;
    }

    /// Click toggles focus: a second click on the focused node releases it.
    pub fn click_node(&mut self, scene: &mut Scene, config: &VizConfig, id: NodeId) {
        if self.state == PointerState::Focused(id) {
            self.state = PointerState::Idle;
            restore_all(scene, config);
            return;
        }
        if scene.node_mut(id).is_none() {
            self.warnings.push(Warning::StaleNode {
                layer: id.layer,
                token: id.token,
            });
            return;
        }

        restore_all(scene, config);

        if let Some(n) = scene.node_mut(id) {
            n.style = NodeStyle {
                radius: config.token_radius * 2.0,
                fill: "#fff".to_string(),
                stroke: "#3498db".to_string(),
                stroke_width: 2.0,
                glow: true,
            };
        }

        if let Some(l) = scene.token_label_mut(id.token) {
            l.style.bg_fill = "#0088ff".to_string();
            l.style.bg_stroke = "#ffffff".to_string();
            l.style.bg_stroke_width = 2.0;
            l.style.text_fill = "#000000".to_string();
            l.style.text_weight = 600;
            l.style.accent_fill = "#ffffff".to_string();
            l.style.accent_height = 4.0;
            l.raised = true;
        }

        for e in &mut scene.edges {
            if e.edge.source == id || e.edge.target == id {
                e.style.stroke_width = emphasized_width(e.edge.weight);
                e.style.opacity = 0.9;
                e.glow = true;
                e.raised = true;
            } else {
                e.style.opacity = 0.05;
            }
        }

        self.tooltip = None;
        self.state = PointerState::Focused(id);
    }

    pub fn pointer_enter_edge(
        &mut self,
        scene: &mut Scene,
        tokens: &[Token],
        config: &VizConfig,
        edge_id: &str,
        pointer: Point,
    ) {
        if matches!(self.state, PointerState::Focused(_)) {
            return;
        }
        let edge: Edge = match scene.edges.iter().find(|e| e.edge.id == edge_id) {
            Some(e) => e.edge.clone(),
            None => {
                self.warnings.push(Warning::StaleEdge {
                    edge_id: edge_id.to_string(),
                });
                return;
            }
        };

        restore_all(scene, config);

        let color = head_color(&config.colors, edge.head_index).to_string();

        for e in &mut scene.edges {
            if e.edge.id == edge_id {
                e.style.stroke_width = emphasized_width(e.edge.weight);
                e.style.opacity = 1.0;
                e.glow = true;
                e.raised = true;
            } else {
                e.style.opacity = 0.1;
            }
        }

        for endpoint in [edge.source, edge.target] {
            if let Some(n) = scene.node_mut(endpoint) {
                n.style = NodeStyle {
                    radius: config.token_radius * 1.5,
                    fill: color.clone(),
                    stroke: "#fff".to_string(),
                    stroke_width: 2.0,
                    glow: true,
                };
            }
        }

        for token in [edge.source.token, edge.target.token] {
            if let Some(l) = scene.token_label_mut(token) {
                l.style.bg_fill = color.clone();
                l.style.bg_stroke = "#ffffff".to_string();
                l.style.bg_stroke_width = 1.5;
                l.style.text_fill = "#000000".to_string();
                l.style.text_weight = 600;
            }
        }

        self.tooltip = Some(tooltip::describe(&edge, tokens, config, pointer));
        self.state = PointerState::HoveredEdge(edge_id.to_string());
    }

    pub fn pointer_leave_edge(&mut self, scene: &mut Scene, config: &VizConfig) {
        if matches!(self.state, PointerState::Focused(_)) {
            return;
        }
        restore_all(scene, config);
        self.tooltip = None;
        self.state = PointerState::Idle;
    }
}
