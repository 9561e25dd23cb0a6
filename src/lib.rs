// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Attention-flow diagrams for transformer inspection.
//!
//! Tokens run along the horizontal axis and layers stack vertically, with
//! the deepest layer at the top. Attention weights above a threshold
//! become curved strands from a key position in one layer to a query
//! position in the next. The crate computes geometry, builds the scene,
//! applies hover and focus emphasis, and serializes to SVG; it does no
//! I/O and owns no event loop, so a host can drive it from any UI.
//!
//! [`VisualizationSession`] is the entry point:
//!
//! ```
//! use strandgrid::{Point, VisualizationSession, VizConfig};
//!
//! let mut session = VisualizationSession::new(VizConfig::default());
//! session.load_json(r#"{
//!     "tokens": [{"text": "The"}, {"text": "cat"}],
//!     "layers": [
//!         {"index": 0, "heads": [{"index": 0, "weights": [[0, 1, 0.99]]}]}
//!     ]
//! }"#)?;
//! session.pointer_enter_edge("edge-0-0-0-1", Point { x: 10.0, y: 20.0 })?;
//! let svg = session.to_svg()?;
//! assert!(svg.starts_with("<svg"));
//! # Ok::<(), strandgrid::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod common;
pub mod config;
pub mod datamodel;
pub mod geometry;
pub mod interaction;
pub mod palette;
pub mod scene;
pub mod session;
pub mod strands;
pub mod tooltip;

pub use common::{Error, Point, Result, Warning};
pub use config::{DuplicatePolicy, LayerResolution, VizConfig};
pub use datamodel::AttentionData;
pub use interaction::PointerState;
pub use scene::Scene;
pub use session::{HeadToggle, VisualizationSession};
pub use tooltip::TooltipContent;
