// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeSet;

use crate::common::{Error, Result, Warning, escape_xml_attr, escape_xml_text, js_format_number};
use crate::config::VizConfig;
use crate::datamodel::AttentionData;
use crate::geometry::GridGeometry;
use crate::strands::{
    Edge, EdgeStyle, Node, NodeGrid, NodeId, build_strands, edge_baseline_style, edge_path,
};

const BACKGROUND: &str = "#111";
const MICRO_GRID_SIZE: f64 = 20.0;
const LAYER_LABEL_WIDTH: f64 = 85.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// One primitive in the rebuilt-on-demand command list for a z-layer.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
        stroke: Option<String>,
        stroke_width: f64,
        corner_radius: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
        stroke_width: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        fill: String,
        size: f64,
        weight: u32,
        anchor: TextAnchor,
    },
}

impl DrawCommand {
    fn to_svg(&self) -> String {
        match self {
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
                stroke_width,
                corner_radius,
            } => {
                let mut svg = format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"",
                    js_format_number(*x),
                    js_format_number(*y),
                    js_format_number(*width),
                    js_format_number(*height),
                    escape_xml_attr(fill)
                );
                if let Some(stroke) = stroke {
                    svg.push_str(&format!(
                        " stroke=\"{}\" stroke-width=\"{}\"",
                        escape_xml_attr(stroke),
                        js_format_number(*stroke_width)
                    ));
                }
                if *corner_radius > 0.0 {
                    svg.push_str(&format!(
                        " rx=\"{}\" ry=\"{}\"",
                        js_format_number(*corner_radius),
                        js_format_number(*corner_radius)
                    ));
                }
                svg.push_str("></rect>");
                svg
            }
            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
                stroke_width,
            } => format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"></line>",
                js_format_number(*x1),
                js_format_number(*y1),
                js_format_number(*x2),
                js_format_number(*y2),
                escape_xml_attr(stroke),
                js_format_number(*stroke_width)
            ),
            DrawCommand::Text {
                x,
                y,
                text,
                fill,
                size,
                weight,
                anchor,
            } => format!(
                "<text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-size=\"{}px\" font-weight=\"{}\" fill=\"{}\" dominant-baseline=\"middle\">{}</text>",
                js_format_number(*x),
                js_format_number(*y),
                anchor.as_str(),
                js_format_number(*size),
                weight,
                escape_xml_attr(fill),
                escape_xml_text(text)
            ),
        }
    }
}

/// Baseline node look; emphasis replaces the whole struct and restoration
/// rebuilds it from here.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
    pub radius: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub glow: bool,
}

impl NodeStyle {
    pub fn baseline(config: &VizConfig) -> Self {
        NodeStyle {
            radius: config.token_radius,
            fill: "#444".to_string(),
            stroke: "#666".to_string(),
            stroke_width: 1.0,
            glow: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenLabelStyle {
    pub bg_fill: String,
    pub bg_stroke: String,
    pub bg_stroke_width: f64,
    pub text_fill: String,
    pub text_weight: u32,
    pub accent_fill: String,
    pub accent_height: f64,
}

impl TokenLabelStyle {
    pub fn baseline() -> Self {
        TokenLabelStyle {
            bg_fill: "#E0E0E0".to_string(),
            bg_stroke: "#555555".to_string(),
            bg_stroke_width: 1.0,
            text_fill: "#000000".to_string(),
            text_weight: 500,
            accent_fill: "#5a9cd8".to_string(),
            accent_height: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
    pub edge: Edge,
    pub path: String,
    pub style: EdgeStyle,
    pub glow: bool,
    pub raised: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
    pub node: Node,
    pub style: NodeStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenLabelVisual {
    pub token: usize,
    /// Column center.
    pub x: f64,
    /// Text baseline row (the box spans y-15..y+15).
    pub y: f64,
    pub box_width: f64,
    pub text: String,
    pub style: TokenLabelStyle,
    pub raised: bool,
}

/// The persistent visual tree: five z-layers, rebuilt wholesale on every
/// data or control change. Z-order is grid < edges < nodes < token labels
/// < layer labels; `raised` entries draw last within their layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub grid: Vec<DrawCommand>,
    pub edges: Vec<EdgeVisual>,
    pub nodes: Vec<NodeVisual>,
    pub token_labels: Vec<TokenLabelVisual>,
    pub layer_labels: Vec<DrawCommand>,
    /// Whether the host should show its "visualization tools" panel.
    pub tools_visible: bool,
}

impl Scene {
    /// Full re-render. Aborts early (leaving any prior scene to the
    /// caller) when there is nothing to draw.
    pub fn render(
        data: &AttentionData,
        visible_heads: &BTreeSet<usize>,
        config: &VizConfig,
    ) -> Result<(Scene, Vec<Warning>)> {
        if data.tokens.is_empty() {
            return Err(Error::EmptyTokens);
        }
        if data.layers.is_empty() {
            return Err(Error::EmptyLayers);
        }

        let geom = GridGeometry::new(config, data.tokens.len());
        let grid_nodes = NodeGrid::build(&geom, &data.tokens);
        let build = build_strands(&data.layers, &grid_nodes, visible_heads, config);

        let width = geom.width();
        let height = geom.height();

        let mut grid = vec![DrawCommand::Rect {
            x: 0.0,
            y: 0.0,
            width,
            height,
            fill: BACKGROUND.to_string(),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 0.0,
        }];

        // subtle square micro-grid over the whole canvas
        let mut x = 0.0;
        while x < width {
            grid.push(DrawCommand::Line {
                x1: x,
                y1: 0.0,
                x2: x,
                y2: height,
                stroke: "#222".to_string(),
                stroke_width: 0.5,
            });
            x += MICRO_GRID_SIZE;
        }
        let mut y = 0.0;
        while y < height {
            grid.push(DrawCommand::Line {
                x1: 0.0,
                y1: y,
                x2: width,
                y2: y,
                stroke: "#222".to_string(),
                stroke_width: 0.5,
            });
            y += MICRO_GRID_SIZE;
        }

        let mut layer_labels = Vec::new();
        for row in 0..geom.layers_count {
            let y = geom.node_y(row);
            grid.push(DrawCommand::Line {
                x1: 0.0,
                y1: y,
                x2: width,
                y2: y,
                stroke: "#333".to_string(),
                stroke_width: 1.0,
            });

            // display numbering inverts depth: the top row is the deepest
            let layer_num = geom.layers_count - row;
            layer_labels.push(DrawCommand::Rect {
                x: -LAYER_LABEL_WIDTH,
                y: y - 12.0,
                width: LAYER_LABEL_WIDTH,
                height: 24.0,
                fill: "rgba(40,44,52,0.95)".to_string(),
                stroke: Some("#555".to_string()),
                stroke_width: 1.0,
                corner_radius: 3.0,
            });
            // stub overlapping the grid edge for visual connection
            layer_labels.push(DrawCommand::Rect {
                x: -3.0,
                y: y - 12.0,
                width: 8.0,
                height: 24.0,
                fill: "rgba(40,44,52,0.95)".to_string(),
                stroke: None,
                stroke_width: 0.0,
                corner_radius: 0.0,
            });
            layer_labels.push(DrawCommand::Rect {
                x: -LAYER_LABEL_WIDTH,
                y: y - 12.0,
                width: LAYER_LABEL_WIDTH + 5.0,
                height: 3.0,
                fill: "#5a9cd8".to_string(),
                stroke: None,
                stroke_width: 0.0,
                corner_radius: 1.0,
            });
            layer_labels.push(DrawCommand::Text {
                x: -10.0,
                y: y + 4.0,
                text: format!("Layer {layer_num}"),
                fill: "#ffffff".to_string(),
                size: 11.0,
                weight: 500,
                anchor: TextAnchor::End,
            });
        }

        let edges = build
            .edges
            .into_iter()
            .filter_map(|edge| {
                let path = edge_path(&edge, &grid_nodes, config)?;
                let style = edge_baseline_style(&edge, config);
                Some(EdgeVisual {
                    edge,
                    path,
                    style,
                    glow: false,
                    raised: false,
                })
            })
            .collect();

        let nodes = grid_nodes
            .iter()
            .map(|node| NodeVisual {
                node: node.clone(),
                style: NodeStyle::baseline(config),
            })
            .collect();

        let label_y = geom.token_label_y();
        let token_labels = data
            .tokens
            .iter()
            .map(|token| {
                let text = token.display_text.clone();
                let box_width = (text.chars().count() as f64 * 7.5 + 12.0)
                    .max(50.0)
                    .min(geom.token_spacing - 8.0);
                TokenLabelVisual {
                    token: token.index,
                    x: geom.node_x(token.index),
                    y: label_y,
                    box_width,
                    text,
                    style: TokenLabelStyle::baseline(),
                    raised: false,
                }
            })
            .collect();

        Ok((
            Scene {
                width,
                height,
                grid,
                edges,
                nodes,
                token_labels,
                layer_labels,
                tools_visible: true,
            },
            build.warnings,
        ))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeVisual> {
        self.nodes
            .iter_mut()
            .find(|n| n.node.layer == id.layer && n.node.token == id.token)
    }

    pub fn edge_mut(&mut self, edge_id: &str) -> Option<&mut EdgeVisual> {
        self.edges.iter_mut().find(|e| e.edge.id == edge_id)
    }

    pub fn token_label_mut(&mut self, token: usize) -> Option<&mut TokenLabelVisual> {
        self.token_labels.iter_mut().find(|l| l.token == token)
    }

    fn push_edge_svg(svg: &mut String, e: &EdgeVisual) {
        svg.push_str(&format!(
            "<path id=\"{}\" class=\"attention-strand\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" opacity=\"{}\"",
            escape_xml_attr(&e.edge.id),
            escape_xml_attr(&e.path),
            escape_xml_attr(&e.style.stroke),
            js_format_number(e.style.stroke_width),
            js_format_number(e.style.opacity)
        ));
        if e.glow {
            svg.push_str(" filter=\"url(#glow)\"");
        }
        svg.push_str("></path>");
    }

    fn push_token_label_svg(svg: &mut String, l: &TokenLabelVisual) {
        svg.push_str(&format!(
            "<g class=\"token-group\" data-index=\"{}\">",
            l.token
        ));
        let bg = DrawCommand::Rect {
            x: l.x - l.box_width / 2.0,
            y: l.y - 15.0,
            width: l.box_width,
            height: 30.0,
            fill: l.style.bg_fill.clone(),
            stroke: Some(l.style.bg_stroke.clone()),
            stroke_width: l.style.bg_stroke_width,
            corner_radius: 3.0,
        };
        let accent = DrawCommand::Rect {
            x: l.x - l.box_width / 2.0,
            y: l.y - 15.0,
            width: l.box_width,
            height: l.style.accent_height,
            fill: l.style.accent_fill.clone(),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 1.0,
        };
        let text = DrawCommand::Text {
            x: l.x,
            y: l.y,
            text: l.text.clone(),
            fill: l.style.text_fill.clone(),
            size: 11.0,
            weight: l.style.text_weight,
            anchor: TextAnchor::Middle,
        };
        svg.push_str(&bg.to_svg());
        svg.push_str(&accent.to_svg());
        svg.push_str(&text.to_svg());
        svg.push_str("</g>");
    }

    /// Serialize the command lists and visual records to SVG in z-order.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" style=\"background-color: {}\">",
            js_format_number(self.width),
            js_format_number(self.height),
            js_format_number(self.width),
            js_format_number(self.height),
            BACKGROUND
        );

        svg.push_str("<defs>");
        svg.push_str(
            "<filter id=\"glow\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">",
        );
        svg.push_str("<feGaussianBlur stdDeviation=\"1.5\" result=\"coloredBlur\"></feGaussianBlur>");
        svg.push_str("<feMerge><feMergeNode in=\"coloredBlur\"></feMergeNode><feMergeNode in=\"SourceGraphic\"></feMergeNode></feMerge>");
        svg.push_str("</filter>");
        svg.push_str("</defs>");

        svg.push_str("<g class=\"grid-layer\">");
        for cmd in &self.grid {
            svg.push_str(&cmd.to_svg());
        }
        svg.push_str("</g>");

        svg.push_str("<g class=\"edge-layer\">");
        for e in self.edges.iter().filter(|e| !e.raised) {
            Self::push_edge_svg(&mut svg, e);
        }
        for e in self.edges.iter().filter(|e| e.raised) {
            Self::push_edge_svg(&mut svg, e);
        }
        svg.push_str("</g>");

        svg.push_str("<g class=\"node-layer\">");
        for n in &self.nodes {
            svg.push_str(&format!(
                "<circle id=\"{}\" class=\"grid-node token-{} layer-{}\" cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"",
                escape_xml_attr(&n.node.id),
                n.node.token,
                n.node.layer,
                js_format_number(n.node.x),
                js_format_number(n.node.y),
                js_format_number(n.style.radius),
                escape_xml_attr(&n.style.fill),
                escape_xml_attr(&n.style.stroke),
                js_format_number(n.style.stroke_width)
            ));
            if n.style.glow {
                svg.push_str(" filter=\"url(#glow)\"");
            }
            svg.push_str("></circle>");
        }
        svg.push_str("</g>");

        svg.push_str("<g class=\"token-layer\">");
        for l in self.token_labels.iter().filter(|l| !l.raised) {
            Self::push_token_label_svg(&mut svg, l);
        }
        for l in self.token_labels.iter().filter(|l| l.raised) {
            Self::push_token_label_svg(&mut svg, l);
        }
        svg.push_str("</g>");

        svg.push_str("<g class=\"label-layer\">");
        for cmd in &self.layer_labels {
            svg.push_str(&cmd.to_svg());
        }
        svg.push_str("</g>");

        svg.push_str("</svg>");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::{Head, Layer, Token, Weight};

    fn make_data() -> AttentionData {
        AttentionData {
            tokens: vec![Token::new(0, "The"), Token::new(1, "Ġcat")],
            layers: vec![Layer {
                index: 0,
                heads: vec![Head {
                    index: 0,
                    weights: vec![Weight {
                        key: 0,
                        query: 1,
                        value: 0.99,
                    }],
                }],
            }],
        }
    }

    fn test_config() -> VizConfig {
        VizConfig {
            model_depth: 2,
            ..VizConfig::default()
        }
    }

    fn all_heads() -> BTreeSet<usize> {
        [0].into_iter().collect()
    }

    #[test]
    fn test_render_empty_tokens() {
        let data = AttentionData {
            tokens: vec![],
            layers: make_data().layers,
        };
        assert_eq!(
            Scene::render(&data, &all_heads(), &test_config()),
            Err(Error::EmptyTokens)
        );
    }

    #[test]
    fn test_render_empty_layers() {
        let data = AttentionData {
            tokens: make_data().tokens,
            layers: vec![],
        };
        assert_eq!(
            Scene::render(&data, &all_heads(), &test_config()),
            Err(Error::EmptyLayers)
        );
    }

    #[test]
    fn test_render_basic() {
        let (scene, warnings) =
            Scene::render(&make_data(), &all_heads(), &test_config()).unwrap();
        assert!(warnings.is_empty());
        assert!(scene.tools_visible);
        assert_eq!(scene.nodes.len(), 2 * 2);
        assert_eq!(scene.edges.len(), 1);
        assert_eq!(scene.token_labels.len(), 2);
        assert_eq!(scene.token_labels[1].text, "cat");
        // width floor
        assert!((scene.width - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_idempotent() {
        let config = test_config();
        let (a, _) = Scene::render(&make_data(), &all_heads(), &config).unwrap();
        let (b, _) = Scene::render(&make_data(), &all_heads(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_layer_labels_invert_depth() {
        let (scene, _) = Scene::render(&make_data(), &all_heads(), &test_config()).unwrap();
        let texts: Vec<_> = scene
            .layer_labels
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        // top row is layer 2, bottom row is layer 1
        assert_eq!(texts, vec!["Layer 2", "Layer 1"]);
    }

    #[test]
    fn test_to_svg_structure() {
        let (scene, _) = Scene::render(&make_data(), &all_heads(), &test_config()).unwrap();
        let svg = scene.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("id=\"glow\""));

        // z-order: grid < edges < nodes < token labels < layer labels
        let grid_pos = svg.find("grid-layer").unwrap();
        let edge_pos = svg.find("edge-layer").unwrap();
        let node_pos = svg.find("node-layer").unwrap();
        let token_pos = svg.find("token-layer").unwrap();
        let label_pos = svg.find("label-layer").unwrap();
        assert!(grid_pos < edge_pos);
        assert!(edge_pos < node_pos);
        assert!(node_pos < token_pos);
        assert!(token_pos < label_pos);

        assert!(svg.contains("id=\"edge-0-0-0-1\""));
        assert!(svg.contains("id=\"node-0-0\""));
    }

    #[test]
    fn test_raised_edges_render_last() {
        let config = test_config();
        let data = AttentionData {
            tokens: vec![Token::new(0, "a"), Token::new(1, "b")],
            layers: vec![Layer {
                index: 0,
                heads: vec![Head {
                    index: 0,
                    weights: vec![
                        Weight {
                            key: 0,
                            query: 1,
                            value: 0.99,
                        },
                        Weight {
                            key: 1,
                            query: 0,
                            value: 0.99,
                        },
                    ],
                }],
            }],
        };
        let (mut scene, _) = Scene::render(&data, &all_heads(), &config).unwrap();
        scene.edge_mut("edge-0-0-0-1").unwrap().raised = true;
        let svg = scene.to_svg();
        let raised = svg.find("id=\"edge-0-0-0-1\"").unwrap();
        let other = svg.find("id=\"edge-0-0-1-0\"").unwrap();
        assert!(other < raised);
    }

    #[test]
    fn test_token_label_box_width() {
        let config = VizConfig {
            token_spacing: 80.0,
            ..test_config()
        };
        let data = AttentionData {
            tokens: vec![Token::new(0, "a"), Token::new(1, "extraordinarily")],
            layers: make_data().layers,
        };
        let (scene, _) = Scene::render(&data, &all_heads(), &config).unwrap();
        // short token hits the 50 floor
        assert!((scene.token_labels[0].box_width - 50.0).abs() < f64::EPSILON);
        // long token is clamped to spacing - 8
        assert!((scene.token_labels[1].box_width - 72.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lookups() {
        let (mut scene, _) = Scene::render(&make_data(), &all_heads(), &test_config()).unwrap();
        assert!(scene.node_mut(NodeId { layer: 0, token: 1 }).is_some());
        assert!(scene.node_mut(NodeId { layer: 9, token: 0 }).is_none());
        assert!(scene.edge_mut("edge-0-0-0-1").is_some());
        assert!(scene.edge_mut("edge-9-9-9-9").is_none());
        assert!(scene.token_label_mut(0).is_some());
        assert!(scene.token_label_mut(7).is_none());
    }
}
