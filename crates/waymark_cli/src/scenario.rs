//! Scenario file handling
//!
//! A scenario describes a page (viewport, content, elements), the
//! checkpoints registered on it, and a timeline of steps to replay.

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use waymark_core::{Offset, TrackerConfig};

/// A replayable scroll scenario
#[derive(Debug, Deserialize, Serialize)]
pub struct Scenario {
    pub page: PageConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementConfig>,
    #[serde(default, rename = "checkpoint")]
    pub checkpoints: Vec<CheckpointConfig>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
    /// Declare no further registrations once the checkpoints are in
    #[serde(default)]
    pub finalize: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PageConfig {
    pub viewport_height: f32,
    pub content_height: f32,
    #[serde(default)]
    pub scroll_offset: f32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ElementConfig {
    pub name: String,
    pub top: f32,
    pub height: f32,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CheckpointConfig {
    pub element: String,
    /// Alignment name; unknown names fall back to top
    #[serde(default)]
    pub alignment: Option<String>,
    #[serde(default)]
    pub offset: Option<Offset>,
    #[serde(default)]
    pub once: bool,
}

/// One point on the timeline; every field present is applied in order:
/// element changes, refresh, scroll, resize
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Step {
    pub at_ms: u64,
    #[serde(default)]
    pub move_element: Option<MoveStep>,
    #[serde(default)]
    pub remove_element: Option<String>,
    #[serde(default)]
    pub refresh: bool,
    #[serde(default)]
    pub scroll: Option<f32>,
    #[serde(default)]
    pub resize: Option<ResizeStep>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MoveStep {
    pub name: String,
    pub top: f32,
    #[serde(default)]
    pub height: Option<f32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResizeStep {
    pub viewport_height: f32,
    pub content_height: f32,
}

impl Scenario {
    /// Load and validate a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content).context("Failed to parse scenario")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check element references and timeline order
    pub fn validate(&self) -> Result<()> {
        let mut names = FxHashSet::default();
        for element in &self.elements {
            if !names.insert(element.name.as_str()) {
                anyhow::bail!("Duplicate element '{}'", element.name);
            }
        }

        for checkpoint in &self.checkpoints {
            if !names.contains(checkpoint.element.as_str()) {
                anyhow::bail!("Checkpoint refers to unknown element '{}'", checkpoint.element);
            }
        }

        let mut last = 0;
        for step in &self.steps {
            if step.at_ms < last {
                anyhow::bail!(
                    "Steps must be in time order ({}ms comes after {}ms)",
                    step.at_ms,
                    last
                );
            }
            last = step.at_ms;

            if let Some(mv) = &step.move_element {
                if !names.contains(mv.name.as_str()) {
                    anyhow::bail!("Step at {}ms moves unknown element '{}'", step.at_ms, mv.name);
                }
            }
            if let Some(name) = &step.remove_element {
                if !names.contains(name.as_str()) {
                    anyhow::bail!("Step at {}ms removes unknown element '{}'", step.at_ms, name);
                }
            }
        }

        Ok(())
    }
}
