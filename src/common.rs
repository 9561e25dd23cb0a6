// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::error;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Escape text content for XML (inside elements)
pub fn escape_xml_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape attribute values for XML (inside double-quoted attributes)
pub fn escape_xml_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Format a floating point number to match JavaScript's Number.toString()
/// behavior: no trailing .0 for integers, minimal decimal places. Path and
/// attribute strings stay byte-compatible with JS-generated SVG.
pub fn js_format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    if n == n.trunc() && n.abs() < 1e21 {
        return format!("{}", n as i64);
    }

    format!("{}", n)
}

/// Fatal-for-this-render errors: rendering aborts early and any prior
/// scene is left untouched. Everything else is a [Warning].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    NoData,
    EmptyTokens,
    EmptyLayers,
    /// The payload was not structurally valid JSON for the input schema.
    Parse(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NoData => write!(f, "no visualization data loaded"),
            Error::EmptyTokens => write!(f, "payload has an empty token list"),
            Error::EmptyLayers => write!(f, "payload has an empty layer list"),
            Error::Parse(detail) => write!(f, "invalid payload: {detail}"),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A diagnostic for a skipped record or a no-op interaction. Warnings
/// never abort processing; they are collected, not printed.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A weight tuple had the wrong shape (arity, non-integer index,
    /// non-finite weight).
    MalformedWeight {
        layer: usize,
        head: usize,
        detail: String,
    },
    /// A weight tuple referenced a token index outside `[0, token_count)`.
    WeightOutOfBounds {
        layer: usize,
        head: usize,
        key: i64,
        query: i64,
        token_count: usize,
    },
    /// No raw layer maps to this display depth.
    MissingLayer { depth: usize },
    /// Every head of this layer is toggled off.
    NoVisibleHeads { depth: usize },
    /// More than one raw layer maps to the same display depth; the
    /// configured resolution policy decided which one counts.
    DuplicateLayer { depth: usize, raw_index: usize },
    /// A pointer event referenced a node that is no longer in the scene
    /// (typically after a concurrent re-render).
    StaleNode { layer: usize, token: usize },
    /// A pointer event referenced an edge that is no longer in the scene.
    StaleEdge { edge_id: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::MalformedWeight {
                layer,
                head,
                detail,
            } => {
                write!(f, "layer {layer} head {head}: malformed weight ({detail})")
            }
            Warning::WeightOutOfBounds {
                layer,
                head,
                key,
                query,
                token_count,
            } => write!(
                f,
                "layer {layer} head {head}: indices out of bounds (key={key}, query={query}, tokens={token_count})"
            ),
            Warning::MissingLayer { depth } => {
                write!(f, "no data found for layer {depth}")
            }
            Warning::NoVisibleHeads { depth } => {
                write!(f, "no visible heads for layer {depth}")
            }
            Warning::DuplicateLayer { depth, raw_index } => {
                write!(f, "layer {depth}: duplicate raw layer index {raw_index}")
            }
            Warning::StaleNode { layer, token } => {
                write!(f, "stale node reference: layer={layer} token={token}")
            }
            Warning::StaleEdge { edge_id } => {
                write!(f, "stale edge reference: {edge_id}")
            }
        }
    }
}
