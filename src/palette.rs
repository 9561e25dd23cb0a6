// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

/// Head colors tuned for a dark canvas: vibrant, avoiding pure blues and
/// reds that read poorly on #111.
pub const DEFAULT_PALETTE: [&str; 15] = [
    "#ff9500", "#00e5ff", "#ff00e5", "#73ff00", "#00a2ff", "#ffea00", "#ff2d00", "#00ff8d",
    "#cc00ff", "#ffe100", "#30a2ff", "#ff5599", "#84ff39", "#00ffea", "#ff8d00",
];

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Color for a head; heads beyond the palette wrap around.
pub fn head_color(colors: &[String], head_index: usize) -> &str {
    if colors.is_empty() {
        return "#ffffff";
    }
    &colors[head_index % colors.len()]
}
