//! Page composition
//!
//! A [`Page`] owns the frame clock, the document and every reveal component
//! built from a [`PageConfig`]. Sections are stacked top to bottom in
//! configuration order. While the splash is loading only the splash animates;
//! sections and the scroll-top control mount once loading ends.

use crate::affordance::ScrollTopAffordance;
use crate::config::PageConfig;
use crate::controller::SectionRevealController;
use crate::document::{Document, RegionId};
use crate::splash::{Splash, SplashPhase};
use folio_animation::{AnimationTimeline, VisualProperties};
use folio_core::{FrameClock, Rect, Result, RevealState, Size};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Components that exist once loading has ended
struct PageContent {
    sections: Vec<SectionRevealController>,
    by_name: FxHashMap<String, usize>,
    regions: Vec<RegionId>,
    scroll_top: ScrollTopAffordance,
}

/// A page of reveal sections driven by one frame clock
pub struct Page {
    config: PageConfig,
    clock: FrameClock,
    timeline: AnimationTimeline,
    document: Document,
    content: Option<PageContent>,
    splash: Splash,
}

impl Page {
    /// Validate `config` and start the splash. With the loader disabled the
    /// content mounts immediately.
    pub fn new(config: PageConfig) -> Result<Self> {
        config.validate()?;

        let clock = FrameClock::new();
        let timeline = AnimationTimeline::new(clock.clone());
        let document = Document::new(config.viewport.into());
        document.set_content_height(config.content_height());
        let splash = Splash::start(&config.loader, &timeline)?;

        let mut page = Self {
            config,
            clock,
            timeline,
            document,
            content: None,
            splash,
        };
        page.mount_content_when_loaded()?;
        Ok(page)
    }

    fn mount_content_when_loaded(&mut self) -> Result<()> {
        if self.content.is_some() || self.splash.is_loading() {
            return Ok(());
        }

        let width = self.document.viewport().width;
        let mut top = 0.0;
        let mut sections = Vec::with_capacity(self.config.sections.len());
        let mut by_name = FxHashMap::default();
        let mut regions = Vec::with_capacity(self.config.sections.len());

        for (index, spec) in self.config.sections.iter().enumerate() {
            let region = self
                .document
                .mount_region(Rect::new(0.0, top, width, spec.height));
            top += spec.height;
            regions.push(region);

            let section = SectionRevealController::mount(
                spec.section_config(region)?,
                &self.document,
                &self.timeline,
            )?;
            sections.push(section);
            by_name.insert(spec.name.clone(), index);
        }

        let scroll_top = ScrollTopAffordance::mount(
            self.config.scroll_top.clone(),
            &self.document,
            &self.timeline,
        )?;

        tracing::info!(sections = sections.len(), "page content mounted");
        self.content = Some(PageContent {
            sections,
            by_name,
            regions,
            scroll_top,
        });
        Ok(())
    }

    /// Advance every animation by `dt_ms`
    pub fn tick(&mut self, dt_ms: f32) -> Result<()> {
        self.clock.tick(dt_ms);
        self.mount_content_when_loaded()
    }

    pub fn scroll_to(&self, offset: f32) {
        self.document.set_scroll_offset(offset);
    }

    pub fn resize(&self, viewport: Size) {
        self.document.resize(viewport);
    }

    /// Press the scroll-to-top control. Returns false while it is not on screen.
    pub fn activate_scroll_top(&mut self) -> bool {
        match self.content.as_mut() {
            Some(content) if content.scroll_top.is_rendered() => {
                content.scroll_top.activate();
                true
            }
            _ => false,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn splash(&self) -> &Splash {
        &self.splash
    }

    pub fn is_content_mounted(&self) -> bool {
        self.content.is_some()
    }

    pub fn section(&self, name: &str) -> Option<&SectionRevealController> {
        let content = self.content.as_ref()?;
        let index = *content.by_name.get(name)?;
        content.sections.get(index)
    }

    pub fn sections(&self) -> &[SectionRevealController] {
        match &self.content {
            Some(content) => &content.sections,
            None => &[],
        }
    }

    pub fn scroll_top(&self) -> Option<&ScrollTopAffordance> {
        self.content.as_ref().map(|content| &content.scroll_top)
    }

    /// Tear the page down: every component detaches and every pending frame
    /// callback is released.
    pub fn unmount(&mut self) {
        if let Some(content) = self.content.take() {
            let PageContent {
                sections,
                regions,
                scroll_top,
                ..
            } = content;
            drop(sections);
            drop(scroll_top);
            for region in regions {
                self.document.unmount_region(region);
            }
        }
        self.splash.cancel();
        tracing::debug!(pending = self.clock.pending(), "page unmounted");
    }

    /// Current state of everything on the page
    pub fn snapshot(&self) -> PageSnapshot {
        let sections = self
            .sections()
            .iter()
            .map(|section| SectionSnapshot {
                name: section.name(),
                state: section.state(),
                class_name: section.class_name(),
                plays: section.play_count(),
                animating: section.is_animating(),
                groups: section
                    .group_names()
                    .into_iter()
                    .enumerate()
                    .map(|(index, name)| GroupSnapshot {
                        name,
                        items: section.group_properties(index).unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        PageSnapshot {
            frame: self.clock.frame_count(),
            elapsed_ms: self.clock.elapsed_ms(),
            scroll_offset: self.document.scroll_offset(),
            splash: SplashSnapshot {
                phase: self.splash.phase(),
                properties: self.splash.properties(),
            },
            sections,
            scroll_top: self.scroll_top().map(|affordance| ScrollTopSnapshot {
                shown: affordance.is_shown(),
                rendered: affordance.is_rendered(),
                properties: affordance.properties(),
            }),
        }
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("splash", &self.splash.phase())
            .field("sections", &self.sections().len())
            .field("scroll_offset", &self.document.scroll_offset())
            .finish()
    }
}

/// Serializable view of a page at one instant
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageSnapshot {
    pub frame: u64,
    pub elapsed_ms: f64,
    pub scroll_offset: f32,
    pub splash: SplashSnapshot,
    pub sections: Vec<SectionSnapshot>,
    pub scroll_top: Option<ScrollTopSnapshot>,
}

impl PageSnapshot {
    pub fn section(&self, name: &str) -> Option<&SectionSnapshot> {
        self.sections.iter().find(|section| section.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SplashSnapshot {
    pub phase: SplashPhase,
    pub properties: Option<VisualProperties>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionSnapshot {
    pub name: String,
    pub state: RevealState,
    pub class_name: &'static str,
    pub plays: usize,
    pub animating: bool,
    pub groups: Vec<GroupSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSnapshot {
    pub name: String,
    pub items: Vec<VisualProperties>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScrollTopSnapshot {
    pub shown: bool,
    pub rendered: bool,
    pub properties: VisualProperties,
}
