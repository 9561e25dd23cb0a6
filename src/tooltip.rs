// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::common::Point;
use crate::config::VizConfig;
use crate::datamodel::Token;
use crate::palette::head_color;
use crate::strands::Edge;

/// Range category of one attention strand, by token distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttentionPattern {
    SelfAttention,
    Adjacent,
    MidRange,
    LongRange,
}

impl AttentionPattern {
    pub fn label(&self) -> &'static str {
        match self {
            AttentionPattern::SelfAttention => "Self-attention",
            AttentionPattern::Adjacent => "Adjacent token",
            AttentionPattern::MidRange => "Mid-range",
            AttentionPattern::LongRange => "Long-range",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    None,
    Left,
    Right,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::None => "",
            Direction::Left => "\u{2190} Left",
            Direction::Right => "\u{2192} Right",
        }
    }
}

/// Everything a host needs to present a hover card for one strand.
/// Composition is pure; presentation belongs to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
    /// Zero-based head; display as `Head {head_index + 1}`.
    pub head_index: usize,
    pub head_color: String,
    /// One-based depth counted from the bottom of the diagram.
    pub layer_position: usize,
    pub pattern: AttentionPattern,
    pub direction: Direction,
    /// Attention weight as a 0-100 percentage, capped at 100.
    pub strength_percent: u32,
    pub insight: Option<&'static str>,
    /// Key-side token text (attended to).
    pub key_text: String,
    /// Query-side token text (attending).
    pub query_text: String,
    /// Where the card should appear, offset from the pointer.
    pub anchor: Point,
}

/// Compose the hover card for a strand under the pointer.
pub fn describe(edge: &Edge, tokens: &[Token], config: &VizConfig, pointer: Point) -> TooltipContent {
    let source = edge.source.token;
    let target = edge.target.token;
    let distance = source.abs_diff(target);

    let pattern = if distance == 0 {
        AttentionPattern::SelfAttention
    } else if distance == 1 {
        AttentionPattern::Adjacent
    } else if distance > 5 {
        AttentionPattern::LongRange
    } else {
        AttentionPattern::MidRange
    };

    let direction = if distance == 0 {
        Direction::None
    } else if target > source {
        Direction::Right
    } else {
        Direction::Left
    };

    let layer_position = config.model_depth.saturating_sub(edge.source.layer);

    let mut insight = if distance == 0 {
        Some("Self-attention: token processing its own features")
    } else if target == source + 1 && edge.weight > 0.7 {
        Some("Adjacent right: possible word/subword completion")
    } else if target + 1 == source && edge.weight > 0.7 {
        Some("Adjacent left: context refinement from previous token")
    } else if distance > 3 && edge.weight > 0.85 {
        if source <= 1 {
            Some("Attending to sequence start token")
        } else if tokens.len().checked_sub(1) == Some(source) {
            Some("Attending to last token in context window")
        } else {
            Some("Long-distance connection: possible semantic link")
        }
    } else {
        None
    };

    // positional fallbacks only when nothing range-based applied
    if insight.is_none() {
        if layer_position <= 2 {
            insight = Some("Early layer: extracting low-level patterns");
        } else if layer_position >= 10 {
            insight = Some("Deep layer: forming high-level representations");
        }
    }

    let token_text = |index: usize| {
        tokens
            .get(index)
            .map(|t| t.display_text.clone())
            .unwrap_or_default()
    };

    TooltipContent {
        head_index: edge.head_index,
        head_color: head_color(&config.colors, edge.head_index).to_string(),
        layer_position,
        pattern,
        direction,
        strength_percent: ((edge.weight * 100.0).round() as u32).min(100),
        insight,
        key_text: token_text(edge.key.key),
        query_text: token_text(edge.key.query),
        anchor: Point {
            x: pointer.x + 10.0,
            y: pointer.y - 10.0,
        },
    }
}
