// Copyright 2026 The Strandgrid Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeSet;

use crate::common::{Error, Point, Result, Warning};
use crate::config::VizConfig;
use crate::datamodel::AttentionData;
use crate::interaction::{InteractionController, PointerState};
use crate::palette::head_color;
use crate::scene::Scene;
use crate::strands::NodeId;
use crate::tooltip::TooltipContent;

/// One entry of the host's head-toggle row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadToggle {
    pub index: usize,
    pub color: String,
    pub visible: bool,
}

/// Owns one diagram: data, configuration, the rendered scene, and the
/// interaction state, with a rebuild after every data or control change.
#[derive(Debug, Default)]
pub struct VisualizationSession {
    config: VizConfig,
    data: Option<AttentionData>,
    visible_heads: BTreeSet<usize>,
    scene: Option<Scene>,
    controller: InteractionController,
    diagnostics: Vec<Warning>,
}

impl VisualizationSession {
    pub fn new(config: VizConfig) -> Self {
        VisualizationSession {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn data(&self) -> Option<&AttentionData> {
        self.data.as_ref()
    }

    pub fn pointer_state(&self) -> &PointerState {
        self.controller.state()
    }

    pub fn tooltip(&self) -> Option<&TooltipContent> {
        self.controller.tooltip()
    }

    /// Replace the dataset. All heads start visible; the scene is rebuilt
    /// and any pointer state is dropped.
    pub fn load_data(&mut self, data: AttentionData) -> Result<()> {
        self.data = Some(data);
        self.visible_heads = (0..self.discovered_head_count()).collect();
        self.rebuild()
    }

    /// Parse and load the external loader's JSON payload. Tuple-level
    /// problems become diagnostics; only a structurally invalid payload
    /// fails.
    pub fn load_json(&mut self, payload: &str) -> Result<()> {
        let (data, warnings) = AttentionData::from_json_str(payload)?;
        self.diagnostics.extend(warnings);
        self.load_data(data)
    }

    /// Re-derive spacing from the host container and rebuild.
    pub fn fit_container(&mut self, width: f64, height: f64) -> Result<()> {
        let token_count = self.data.as_ref().map(|d| d.tokens.len()).unwrap_or(0);
        let sized = VizConfig::for_container(width, height, token_count);
        self.config.token_spacing = sized.token_spacing;
        self.config.layer_spacing = sized.layer_spacing;
        self.config.token_radius = sized.token_radius;
        self.rebuild_if_loaded()
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        self.config.threshold = threshold.clamp(0.0, 1.0);
        self.rebuild_if_loaded()
    }

    pub fn set_head_visible(&mut self, head: usize, visible: bool) -> Result<()> {
        if visible {
            self.visible_heads.insert(head);
        } else {
            self.visible_heads.remove(&head);
        }
        self.rebuild_if_loaded()
    }

    pub fn show_all_heads(&mut self) -> Result<()> {
        self.visible_heads = (0..self.discovered_head_count()).collect();
        self.rebuild_if_loaded()
    }

    pub fn hide_all_heads(&mut self) -> Result<()> {
        self.visible_heads.clear();
        self.rebuild_if_loaded()
    }

    /// Head count reported by the data's first layer; a dataset that
    /// reports none gets one toggle per model layer.
    fn discovered_head_count(&self) -> usize {
        match self.data.as_ref() {
            Some(data) => data
                .head_count()
                .filter(|&n| n > 0)
                .unwrap_or(self.config.model_depth),
            None => 0,
        }
    }

    /// Per-head toggle values for the host's checkbox row.
    pub fn head_toggles(&self) -> Vec<HeadToggle> {
        (0..self.discovered_head_count())
            .map(|h| HeadToggle {
                index: h,
                color: head_color(&self.config.colors, h).to_string(),
                visible: self.visible_heads.contains(&h),
            })
            .collect()
    }

    fn rebuild_if_loaded(&mut self) -> Result<()> {
        if self.data.is_none() {
            return Ok(());
        }
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<()> {
        let data = self.data.as_ref().ok_or(Error::NoData)?;
        let (scene, warnings) = Scene::render(data, &self.visible_heads, &self.config)?;
        self.diagnostics.extend(warnings);
        self.scene = Some(scene);
        self.controller.reset();
        Ok(())
    }

    pub fn pointer_enter_node(&mut self, layer: usize, token: usize) -> Result<()> {
        let scene = self.scene.as_mut().ok_or(Error::NoData)?;
        self.controller
            .pointer_enter_node(scene, &self.config, NodeId { layer, token });
        Ok(())
    }

    pub fn pointer_leave_node(&mut self) -> Result<()> {
        let scene = self.scene.as_mut().ok_or(Error::NoData)?;
        self.controller.pointer_leave_node(scene, &self.config);
        Ok(())
    }

    pub fn click_node(&mut self, layer: usize, token: usize) -> Result<()> {
        let scene = self.scene.as_mut().ok_or(Error::NoData)?;
        self.controller
            .click_node(scene, &self.config, NodeId { layer, token });
        Ok(())
    }

    pub fn pointer_enter_edge(&mut self, edge_id: &str, pointer: Point) -> Result<()> {
        let scene = self.scene.as_mut().ok_or(Error::NoData)?;
        let data = self.data.as_ref().ok_or(Error::NoData)?;
        self.controller
            .pointer_enter_edge(scene, &data.tokens, &self.config, edge_id, pointer);
        Ok(())
    }

    pub fn pointer_leave_edge(&mut self) -> Result<()> {
        let scene = self.scene.as_mut().ok_or(Error::NoData)?;
        self.controller.pointer_leave_edge(scene, &self.config);
        Ok(())
    }

    /// Drain every diagnostic recorded since the last call, parse and
    /// build warnings included.
    pub fn take_diagnostics(&mut self) -> Vec<Warning> {
        let mut out = std::mem::take(&mut self.diagnostics);
        out.extend(self.controller.take_warnings());
        out
    }

    pub fn to_svg(&self) -> Result<String> {
        self.scene
            .as_ref()
            .map(|s| s.to_svg())
            .ok_or(Error::NoData)
    }
}
