// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::palette;

/// What to do with repeated `(layer, head, key, query)` tuples across
/// generation-step entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first tuple, drop later ones. Matches a keyed join where
    /// identical edge ids collapse to the first bound record.
    #[default]
    FirstWins,
    /// Keep every tuple as its own edge. Later duplicates share the same
    /// edge id.
    KeepAll,
    /// Accumulate later weights into the first edge, clamped to 1.0.
    Sum,
}

/// Which raw layer counts when several map to the same display depth
/// (`index mod model_depth`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LayerResolution {
    #[default]
    FirstWins,
    /// Prefer the latest generation step.
    LastWins,
}

/// Visualization configuration.
///
/// All spacing values are in pixel-equivalent units on the emitted canvas.
#[derive(Clone, Debug)]
pub struct VizConfig {
    /// Horizontal space between token columns.
    pub token_spacing: f64,
    /// Vertical space between layer rows; clamped to a 60 unit floor.
    pub layer_spacing: f64,
    /// Grid node radius, derived from layer spacing.
    pub token_radius: f64,
    pub min_edge_opacity: f64,
    pub max_edge_opacity: f64,
    /// Weights below this are not drawn.
    pub threshold: f64,
    /// Display depth of the model; raw layer indices are taken modulo this.
    pub model_depth: usize,
    /// How strongly diagonal strands bow sideways (0-1).
    pub strand_curvature: f64,
    /// Minimum strand stroke width.
    pub strand_width: f64,
    /// Padding above the top layer row.
    pub top_padding: f64,
    /// Padding below the bottom layer row, sized for the token boxes.
    pub bottom_padding: f64,
    /// Head color palette; heads index into it modulo its length.
    pub colors: Vec<String>,
    pub duplicate_policy: DuplicatePolicy,
    pub layer_resolution: LayerResolution,
}

pub const MIN_LAYER_SPACING: f64 = 60.0;
pub const MIN_TOKEN_SPACING: f64 = 40.0;

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            token_spacing: 55.0,
            layer_spacing: MIN_LAYER_SPACING,
            token_radius: 6.0,
            min_edge_opacity: 0.15,
            max_edge_opacity: 0.95,
            threshold: 0.98,
            model_depth: 12,
            strand_curvature: 0.6,
            strand_width: 0.25,
            top_padding: 80.0,
            bottom_padding: 45.0,
            colors: palette::default_palette(),
            duplicate_policy: DuplicatePolicy::default(),
            layer_resolution: LayerResolution::default(),
        }
    }
}

impl VizConfig {
    /// Derive sizing from the host container: layer spacing splits the
    /// height across the model depth plus a token row and padding (with a
    /// legibility floor), node radius follows layer spacing, and token
    /// spacing tightens for longer sequences.
    pub fn for_container(width: f64, height: f64, token_count: usize) -> Self {
        let layer_spacing = (height / 14.0).floor().max(MIN_LAYER_SPACING);
        let token_radius = (layer_spacing / 10.0).floor().max(3.0);

        let max_tokens_visible = 20usize;
        let token_spacing = if token_count > 5 {
            let per_token = (width / max_tokens_visible.min(token_count) as f64).floor();
            per_token.clamp(35.0, 60.0)
        } else {
            60.0
        };

        Self {
            token_spacing: token_spacing * 1.2,
            layer_spacing,
            token_radius,
            ..Self::default()
        }
    }
}
