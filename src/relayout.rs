//! Re-layout trigger – owns the live content and configuration, debounces
//! bursts of edits and replaces the displayed pages atomically.
//!
//! Every input change issues a new [`Generation`]. A pagination result is
//! applied only if it carries the latest generation, so a run that was
//! overtaken by newer input is dropped instead of flashing stale pages.
//! A failed run leaves the previously displayed pages in place.
//!
//! Time is passed in explicitly (`now`), which keeps the trigger free of
//! timers and threads: the host calls [`Relayout::poll`] from its event loop.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::layout_config::{LayoutConfig, PageGeometry};
use crate::measure::Measure;
use crate::pagination::{Page, Pagination};
use crate::pipeline::paginate_text;

/// Quiet period after the last edit before pagination runs.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Monotonically increasing id of an input state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of the inputs for one pagination run, for hosts that run it
/// outside [`Relayout`] and report back through [`Relayout::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct RelayoutRequest {
    pub generation: Generation,
    pub content: String,
    pub config: LayoutConfig,
    pub geometry: PageGeometry,
}

impl RelayoutRequest {
    pub fn run<M: Measure + ?Sized>(&self, measurer: &mut M) -> Result<Pagination> {
        paginate_text(&self.content, &self.config, &self.geometry, measurer)
    }
}

/// What happened to a pagination result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The pages were replaced.
    Applied(Generation),
    /// A newer input arrived meanwhile; the result was dropped.
    Stale(Generation),
    /// The run failed; the previous pages are still shown.
    Failed(Generation),
}

pub struct Relayout<M> {
    content: String,
    config: LayoutConfig,
    geometry: PageGeometry,
    measurer: M,
    quiet_period: Duration,
    /// Latest issued generation.
    generation: Generation,
    /// Generation of the displayed pages.
    displayed: Option<Generation>,
    /// When the pending run becomes due.
    deadline: Option<Instant>,
    pagination: Pagination,
    last_error: Option<Error>,
}

impl<M: Measure> Relayout<M> {
    pub fn new(measurer: M) -> Self {
        Self {
            content: String::new(),
            config: LayoutConfig::default(),
            geometry: PageGeometry::a4(),
            measurer,
            quiet_period: DEFAULT_QUIET_PERIOD,
            generation: Generation::default(),
            displayed: None,
            deadline: None,
            pagination: Pagination::default(),
            last_error: None,
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Record an input change: new generation, deadline pushed back.
    fn touch(&mut self, now: Instant) -> Generation {
        self.generation = self.generation.next();
        self.deadline = Some(now + self.quiet_period);
        self.generation
    }

    pub fn set_content(&mut self, content: impl Into<String>, now: Instant) -> Generation {
        self.content = content.into();
        self.touch(now)
    }

    /// Replace the typography. Invalid configurations are rejected and leave
    /// everything unchanged.
    pub fn set_config(&mut self, config: LayoutConfig, now: Instant) -> std::result::Result<Generation, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self.touch(now))
    }

    pub fn set_geometry(&mut self, geometry: PageGeometry, now: Instant) -> Generation {
        self.geometry = geometry;
        self.touch(now)
    }

    /// Run the pending pagination if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Outcome> {
        match self.deadline {
            Some(due) if now >= due => self.flush(),
            _ => None,
        }
    }

    /// Run the pending pagination now, ignoring the quiet period.
    pub fn flush(&mut self) -> Option<Outcome> {
        self.deadline.take()?;
        let generation = self.generation;
        let result = paginate_text(&self.content, &self.config, &self.geometry, &mut self.measurer);
        Some(self.apply(generation, result))
    }

    /// Take the pending work as a snapshot to run elsewhere. Returns `None`
    /// when nothing is pending.
    pub fn request(&mut self) -> Option<RelayoutRequest> {
        self.deadline.take()?;
        Some(RelayoutRequest {
            generation: self.generation,
            content: self.content.clone(),
            config: self.config.clone(),
            geometry: self.geometry,
        })
    }

    /// Apply a finished run. Only the latest generation is accepted.
    pub fn apply(&mut self, generation: Generation, result: Result<Pagination>) -> Outcome {
        if generation != self.generation {
            log::debug!("Dropping stale pagination {generation} (latest is {})", self.generation);
            return Outcome::Stale(generation);
        }
        match result {
            Ok(pagination) => {
                log::info!(
                    "Applied pagination {generation}: {} pages",
                    pagination.page_count()
                );
                self.pagination = pagination;
                self.displayed = Some(generation);
                self.last_error = None;
                Outcome::Applied(generation)
            }
            Err(e) => {
                log::warn!("Pagination {generation} failed, keeping previous pages: {e}");
                self.last_error = Some(e);
                Outcome::Failed(generation)
            }
        }
    }

    /// What-if pagination of the current content under another config.
    /// Nothing displayed or pending is touched.
    pub fn preview(&mut self, config: &LayoutConfig) -> Result<Pagination> {
        paginate_text(&self.content, config, &self.geometry, &mut self.measurer)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pagination.pages
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Generation of the displayed pages, if any run was applied.
    pub fn displayed(&self) -> Option<Generation> {
        self.displayed
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }
}
