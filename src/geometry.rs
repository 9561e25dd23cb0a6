// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::common::Point;
use crate::config::{MIN_LAYER_SPACING, MIN_TOKEN_SPACING, VizConfig};

/// Deterministic placement of the token-by-layer grid.
///
/// Pure: the same inputs always produce the same coordinates, and there is
/// no state to invalidate between calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub token_count: usize,
    pub layers_count: usize,
    pub token_spacing: f64,
    pub layer_spacing: f64,
    pub top_padding: f64,
    pub bottom_padding: f64,
}

impl GridGeometry {
    pub fn new(config: &VizConfig, token_count: usize) -> Self {
        GridGeometry {
            token_count,
            layers_count: config.model_depth,
            token_spacing: config.token_spacing.max(MIN_TOKEN_SPACING),
            layer_spacing: config.layer_spacing.max(MIN_LAYER_SPACING),
            top_padding: config.top_padding,
            bottom_padding: config.bottom_padding,
        }
    }

    /// Column center for a token index.
    pub fn node_x(&self, token: usize) -> f64 {
        token as f64 * self.token_spacing + self.token_spacing / 2.0
    }

    /// Row position for a display layer index (0 is the top row).
    pub fn node_y(&self, layer: usize) -> f64 {
        self.top_padding + layer as f64 * self.layer_spacing
    }

    pub fn node_pos(&self, layer: usize, token: usize) -> Point {
        Point {
            x: self.node_x(token),
            y: self.node_y(layer),
        }
    }

    /// Canvas width: room for every token column plus slack, never
    /// narrower than 800.
    pub fn width(&self) -> f64 {
        ((self.token_count + 1) as f64 * self.token_spacing).max(800.0)
    }

    /// Canvas height: all layer rows plus both paddings.
    pub fn height(&self) -> f64 {
        self.top_padding + self.layers_count as f64 * self.layer_spacing + self.bottom_padding
    }

    /// Y position of the token-label row, directly below the bottom layer.
    pub fn token_label_y(&self) -> f64 {
        self.top_padding + self.layers_count as f64 * self.layer_spacing
    }
}
