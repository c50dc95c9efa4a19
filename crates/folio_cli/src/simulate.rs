//! Headless replay of a scroll script

use anyhow::{Context, Result};
use folio_reveal::{Page, PageConfig, PageSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// What happens at one step of a script
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Wait for the splash to finish loading
    Load,
    ScrollTo { offset: f32 },
    /// Press the scroll-to-top control
    ScrollTop,
}

/// A scripted sequence of steps, stored as JSON
#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// How the page is driven between steps
#[derive(Clone, Copy, Debug)]
pub struct Pacing {
    /// Frame length (ms)
    pub frame_ms: f32,
    /// Time simulated after each step (ms)
    pub settle_ms: u32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            frame_ms: 16.0,
            settle_ms: 1200,
        }
    }
}

impl Pacing {
    fn frames_for(&self, ms: f32) -> usize {
        (ms / self.frame_ms).ceil().max(0.0) as usize
    }
}

/// A step and the page state once it settled
#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub snapshot: PageSnapshot,
}

/// The script for a list of scroll offsets
pub fn script(offsets: &[f32], scroll_top: bool) -> Vec<Step> {
    let mut steps = vec![Step::Load];
    steps.extend(offsets.iter().map(|&offset| Step::ScrollTo { offset }));
    if scroll_top {
        steps.push(Step::ScrollTop);
    }
    steps
}

/// Run `steps` against a fresh page built from `config`
pub fn simulate(config: PageConfig, steps: &[Step], pacing: Pacing) -> Result<Vec<StepReport>> {
    anyhow::ensure!(
        pacing.frame_ms > 0.0,
        "frame length must be positive, got {}",
        pacing.frame_ms
    );

    let loader_ms = config.loader.duration_ms as f32;
    let mut page = Page::new(config).context("Failed to build page")?;
    let mut reports = Vec::with_capacity(steps.len());

    for &step in steps {
        match step {
            Step::Load => {
                for _ in 0..=pacing.frames_for(loader_ms) {
                    if !page.splash().is_loading() {
                        break;
                    }
                    page.tick(pacing.frame_ms)?;
                }
            }
            Step::ScrollTo { offset } => page.scroll_to(offset),
            Step::ScrollTop => {
                if !page.activate_scroll_top() {
                    tracing::warn!("scroll-top control is not on screen");
                }
            }
        }

        for _ in 0..pacing.frames_for(pacing.settle_ms as f32) {
            page.tick(pacing.frame_ms)?;
        }

        tracing::debug!(?step, frame = page.clock().frame_count(), "step settled");
        reports.push(StepReport {
            step,
            snapshot: page.snapshot(),
        });
    }

    page.unmount();
    Ok(reports)
}

/// One line per step: time, action, section states and the control
pub fn render_text(reports: &[StepReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let snapshot = &report.snapshot;
        let action = match report.step {
            Step::Load => "load".to_string(),
            Step::ScrollTo { offset } => format!("scroll {offset}"),
            Step::ScrollTop => "scroll-top".to_string(),
        };

        let _ = write!(
            out,
            "[{:>7.0}ms] {:<14} offset {:>6.0} | splash {}",
            snapshot.elapsed_ms, action, snapshot.scroll_offset, snapshot.splash.phase
        );
        for section in &snapshot.sections {
            let _ = write!(out, " | {} {} ({})", section.name, section.class_name, section.plays);
        }
        if let Some(control) = &snapshot.scroll_top {
            let state = if control.shown { "shown" } else { "hidden" };
            let _ = write!(out, " | scroll-top {state}");
        }
        out.push('\n');
    }
    out
}
