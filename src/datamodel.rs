// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::common::{Error, Result, Warning};

lazy_static! {
    /// Tokenizer-artifact markers (BPE space/control glyphs, sentencepiece
    /// underscores) and stray HTML-ish tag fragments.
    static ref TOKEN_ARTIFACTS: Regex = Regex::new("Ġ|ĉ|Ċ|ċ|Ĉ|▁|</?[^>]+(>|$)").unwrap();
}

/// One discrete unit of the input sequence. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub index: usize,
    pub raw_text: String,
    /// `raw_text` with artifact markers stripped and whitespace trimmed.
    pub display_text: String,
}

impl Token {
    pub fn new(index: usize, raw_text: &str) -> Self {
        let display_text = TOKEN_ARTIFACTS.replace_all(raw_text, "").trim().to_string();
        Token {
            index,
            raw_text: raw_text.to_string(),
            display_text,
        }
    }
}

/// One attention weight: key position, query position, weight in [0, 1].
///
/// Indices are kept signed so out-of-range records survive parsing and can
/// be skipped (with a diagnostic) at strand-build time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weight {
    pub key: i64,
    pub query: i64,
    pub value: f64,
}

/// One attention head within a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Head {
    pub index: usize,
    pub weights: Vec<Weight>,
}

/// One depth level of the stack. `index` may exceed the configured model
/// depth (generation steps repeat layers); display depth is `index mod
/// model_depth`.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub index: usize,
    pub heads: Vec<Head>,
}

/// The full attention payload for one visualization.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AttentionData {
    pub tokens: Vec<Token>,
    pub layers: Vec<Layer>,
}

#[derive(Deserialize)]
struct RawPayload {
    tokens: Vec<RawToken>,
    layers: Vec<RawLayer>,
}

#[derive(Deserialize)]
struct RawToken {
    text: String,
}

#[derive(Deserialize)]
struct RawLayer {
    index: usize,
    #[serde(default)]
    heads: Vec<RawHead>,
}

#[derive(Deserialize)]
struct RawHead {
    index: usize,
    // Tuples stay untyped here so one malformed record skips that record,
    // not the whole payload.
    #[serde(default)]
    weights: Vec<serde_json::Value>,
}

fn tuple_number(v: &serde_json::Value) -> Option<f64> {
    v.as_f64().filter(|n| n.is_finite())
}

fn tuple_index(v: &serde_json::Value) -> Option<i64> {
    let n = tuple_number(v)?;
    if n.trunc() == n { Some(n as i64) } else { None }
}

fn parse_weight(
    raw: &serde_json::Value,
    layer: usize,
    head: usize,
    warnings: &mut Vec<Warning>,
) -> Option<Weight> {
    let malformed = |detail: &str, warnings: &mut Vec<Warning>| {
        warnings.push(Warning::MalformedWeight {
            layer,
            head,
            detail: detail.to_string(),
        });
        None
    };

    let arr = match raw.as_array() {
        Some(arr) => arr,
        None => return malformed("not an array", warnings),
    };
    if arr.len() < 3 {
        return malformed("fewer than 3 entries", warnings);
    }

    let key = match tuple_index(&arr[0]) {
        Some(k) => k,
        None => return malformed("key index is not an integer", warnings),
    };
    let query = match tuple_index(&arr[1]) {
        Some(q) => q,
        None => return malformed("query index is not an integer", warnings),
    };
    let value = match tuple_number(&arr[2]) {
        Some(v) => v,
        None => return malformed("weight is not a finite number", warnings),
    };

    Some(Weight { key, query, value })
}

impl AttentionData {
    /// Parse the external loader's JSON payload. Malformed weight tuples
    /// are skipped with a diagnostic; a structurally invalid payload is
    /// the only hard failure.
    pub fn from_json_str(s: &str) -> Result<(AttentionData, Vec<Warning>)> {
        let raw: RawPayload =
            serde_json::from_str(s).map_err(|err| Error::Parse(err.to_string()))?;

        let mut warnings = Vec::new();

        let tokens = raw
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(i, &t.text))
            .collect();

        let layers = raw
            .layers
            .into_iter()
            .map(|layer| {
                let heads = layer
                    .heads
                    .into_iter()
                    .map(|head| {
                        let weights = head
                            .weights
                            .iter()
                            .filter_map(|w| {
                                parse_weight(w, layer.index, head.index, &mut warnings)
                            })
                            .collect();
                        Head {
                            index: head.index,
                            weights,
                        }
                    })
                    .collect();
                Layer {
                    index: layer.index,
                    heads,
                }
            })
            .collect();

        Ok((AttentionData { tokens, layers }, warnings))
    }

    /// Head count reported by the first layer, if any.
    pub fn head_count(&self) -> Option<usize> {
        self.layers.first().map(|l| l.heads.len())
    }
}
