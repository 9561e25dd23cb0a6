// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeSet, HashMap};

use crate::common::{Warning, js_format_number};
use crate::config::{DuplicatePolicy, LayerResolution, VizConfig};
use crate::datamodel::{Layer, Token};
use crate::geometry::GridGeometry;
use crate::palette;

/// Identity of one grid node: display layer row and token column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub layer: usize,
    pub token: usize,
}

/// One grid node, derived fresh on every full re-render.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub layer: usize,
    pub token: usize,
    pub x: f64,
    pub y: f64,
    pub display_text: String,
    pub id: String,
}

impl Node {
    pub fn node_id(&self) -> NodeId {
        NodeId {
            layer: self.layer,
            token: self.token,
        }
    }
}

/// The complete node set: always exactly `layers_count x token_count`,
/// indexed by (layer, token). Rebuilt, never mutated in place.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeGrid {
    nodes: Vec<Node>,
    pub token_count: usize,
    pub layers_count: usize,
}

impl NodeGrid {
    pub fn build(geom: &GridGeometry, tokens: &[Token]) -> Self {
        let mut nodes = Vec::with_capacity(geom.layers_count * tokens.len());
        for layer in 0..geom.layers_count {
            for (token, tok) in tokens.iter().enumerate() {
                let pos = geom.node_pos(layer, token);
                nodes.push(Node {
                    layer,
                    token,
                    x: pos.x,
                    y: pos.y,
                    display_text: tok.display_text.clone(),
                    id: format!("node-{layer}-{token}"),
                });
            }
        }
        NodeGrid {
            nodes,
            token_count: tokens.len(),
            layers_count: geom.layers_count,
        }
    }

    pub fn get(&self, layer: usize, token: usize) -> Option<&Node> {
        if layer >= self.layers_count || token >= self.token_count {
            return None;
        }
        self.nodes.get(layer * self.token_count + token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Stable identity of one strand across re-renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub layer: usize,
    pub head: usize,
    pub key: usize,
    pub query: usize,
}

impl EdgeKey {
    pub fn id(&self) -> String {
        format!(
            "edge-{}-{}-{}-{}",
            self.layer, self.head, self.key, self.query
        )
    }
}

/// One surviving attention weight: a directed strand from the key position
/// in layer L to the query position in layer L+1.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    pub head_index: usize,
    pub key: EdgeKey,
    pub id: String,
}

#[derive(Clone, Debug, Default)]
pub struct StrandBuild {
    pub edges: Vec<Edge>,
    pub warnings: Vec<Warning>,
}

fn resolve_layer<'a>(
    layers: &'a [Layer],
    depth: usize,
    model_depth: usize,
    policy: LayerResolution,
    warnings: &mut Vec<Warning>,
) -> Option<&'a Layer> {
    let mut found: Option<&Layer> = None;
    for layer in layers.iter().filter(|l| l.index % model_depth == depth) {
        if found.is_none() {
            found = Some(layer);
        } else {
            warnings.push(Warning::DuplicateLayer {
                depth,
                raw_index: layer.index,
            });
            if policy == LayerResolution::LastWins {
                found = Some(layer);
            }
        }
    }
    found
}

/// Convert the raw per-layer/per-head weight matrix into the filtered,
/// directed strand list. Skipped records produce warnings, never failures.
pub fn build_strands(
    layers: &[Layer],
    grid: &NodeGrid,
    visible_heads: &BTreeSet<usize>,
    config: &VizConfig,
) -> StrandBuild {
    let mut build = StrandBuild::default();
    let layers_count = config.model_depth;
    let token_count = grid.token_count;
    if layers_count < 2 || token_count == 0 {
        return build;
    }

    // edge key -> index into build.edges, for the duplicate policy
    let mut seen: HashMap<EdgeKey, usize> = HashMap::new();

    for depth in 0..layers_count - 1 {
        let layer = match resolve_layer(
            layers,
            depth,
            layers_count,
            config.layer_resolution,
            &mut build.warnings,
        ) {
            Some(layer) => layer,
            None => {
                build.warnings.push(Warning::MissingLayer { depth });
                continue;
            }
        };

        let heads: Vec<_> = layer
            .heads
            .iter()
            .filter(|h| visible_heads.contains(&h.index))
            .collect();
        if heads.is_empty() {
            build.warnings.push(Warning::NoVisibleHeads { depth });
            continue;
        }

        for head in heads {
            for w in &head.weights {
                let in_bounds = |i: i64| i >= 0 && (i as usize) < token_count;
                if !in_bounds(w.key) || !in_bounds(w.query) {
                    build.warnings.push(Warning::WeightOutOfBounds {
                        layer: depth,
                        head: head.index,
                        key: w.key,
                        query: w.query,
                        token_count,
                    });
                    continue;
                }
                if w.value < config.threshold {
                    continue;
                }

                let key = EdgeKey {
                    layer: depth,
                    head: head.index,
                    key: w.key as usize,
                    query: w.query as usize,
                };
                if let Some(&existing) = seen.get(&key) {
                    match config.duplicate_policy {
                        DuplicatePolicy::FirstWins => continue,
                        DuplicatePolicy::Sum => {
                            let edge = &mut build.edges[existing];
                            edge.weight = (edge.weight + w.value).min(1.0);
                            continue;
                        }
                        DuplicatePolicy::KeepAll => {}
                    }
                } else {
                    seen.insert(key, build.edges.len());
                }

                build.edges.push(Edge {
                    source: NodeId {
                        layer: depth,
                        token: key.key,
                    },
                    target: NodeId {
                        layer: depth + 1,
                        token: key.query,
                    },
                    weight: w.value,
                    head_index: head.index,
                    key,
                    id: key.id(),
                });
            }
        }
    }

    build
}

/// Baseline stroke/opacity/color for a strand. Interaction restores to
/// exactly these values, so this is the single source of truth for the
/// un-emphasized look.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

pub fn edge_baseline_style(edge: &Edge, config: &VizConfig) -> EdgeStyle {
    EdgeStyle {
        stroke: palette::head_color(&config.colors, edge.head_index).to_string(),
        stroke_width: config.strand_width.max(edge.weight * 1.2),
        opacity: config
            .min_edge_opacity
            .max(config.max_edge_opacity.min(edge.weight)),
    }
}

/// Cubic curve from source to target. Parallel strands sharing endpoints
/// are separated by a per-head perpendicular offset at the source and
/// head-dependent curvature fractions; same-token (near-vertical) strands
/// get a lateral bulge instead of the degenerate diagonal formula.
pub fn edge_path(edge: &Edge, grid: &NodeGrid, config: &VizConfig) -> Option<String> {
    let source = grid.get(edge.source.layer, edge.source.token)?;
    let target = grid.get(edge.target.layer, edge.target.token)?;

    let (sx, sy) = (source.x, source.y);
    let (tx, ty) = (target.x, target.y);
    let head = edge.head_index;

    let head_offset = ((head % 3) as f64 - 1.0) * 3.5;
    let offset_sx = sx + head_offset;

    if (sx - tx).abs() < 5.0 {
        let control_offset = 8.0 + (head % 3) as f64 * 4.0;
        let control_x = sx + control_offset;
        let mid_y = (sy + ty) / 2.0;
        return Some(format!(
            "M{},{} C{},{} {},{} {},{}",
            js_format_number(offset_sx),
            js_format_number(sy),
            js_format_number(control_x),
            js_format_number(mid_y),
            js_format_number(control_x),
            js_format_number(mid_y),
            js_format_number(tx),
            js_format_number(ty)
        ));
    }

    let dx = tx - sx;
    let dy = ty - sy;
    let curvature = config.strand_curvature;

    let control_y1 = sy + dy * (0.25 + (head % 4) as f64 * 0.12);
    let control_y2 = ty - dy * (0.25 + ((head + 1) % 4) as f64 * 0.12);
    let control_x1 = sx + dx * curvature * (0.25 + (head % 3) as f64 * 0.05);
    let control_x2 = tx - dx * curvature * (0.25 + ((head + 2) % 3) as f64 * 0.05);

    Some(format!(
        "M{},{} C{},{} {},{} {},{}",
        js_format_number(offset_sx),
        js_format_number(sy),
        js_format_number(control_x1),
        js_format_number(control_y1),
        js_format_number(control_x2),
        js_format_number(control_y2),
        js_format_number(tx),
        js_format_number(ty)
    ))
}
