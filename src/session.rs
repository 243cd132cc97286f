//! Search session - the event dispatcher
//!
//! Holds the corpus, the ranking engine and the current inputs (query,
//! selected categories, viewport, scroll offset). Every event triggers a pure
//! recomputation whose output replaces the published `ViewSnapshot` in one
//! step; results and the geometry derived from them are never updated
//! separately.
//!
//! Ranking requests carry a monotonically increasing sequence number so that
//! a pass started for an older query can be discarded when it completes late.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::catalog::{filter_by_categories, Corpus};
use crate::config::Config;
use crate::debug_panic;
use crate::error::Result;
use crate::grid::{layout, row_window, visible_cells, BreakpointTable, GridGeometry, VisibleCell};
use crate::logging;
use crate::search::{MatchResult, RankOptions, RankingEngine};

/// Window size reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Inputs the session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Debounced query text
    QueryChanged(String),
    CategoriesChanged(BTreeSet<String>),
    ViewportResized(Viewport),
    Scrolled(f64),
}

/// Everything a renderer needs for one frame. Immutable once published.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    /// Sequence number of the ranking pass that produced `results`
    pub seq: u64,
    pub query: String,
    pub results: Arc<[MatchResult]>,
    pub geometry: GridGeometry,
    /// Height of the grid viewport (window minus reserved chrome, capped at
    /// content height)
    pub viewport_height: f64,
}

/// A ranking pass to run: the inputs captured at request time.
#[derive(Debug, Clone, PartialEq)]
pub struct RankRequest {
    pub seq: u64,
    pub query: String,
    pub categories: BTreeSet<String>,
}

/// Counts for a status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub seq: u64,
    pub query: String,
    /// Records in the current result list
    pub visible: usize,
    /// Records in the whole catalog
    pub total: usize,
    /// A non-blank query is filtering and ordering results
    pub fuzzy_active: bool,
    pub column_count: usize,
    pub row_count: usize,
    /// Record ids of the cells in the render window
    pub rendered_ids: Vec<u64>,
}

#[cfg(feature = "perf")]
const RANK_BUDGET_MS: u64 = 16;

pub struct SearchSession {
    corpus: Corpus,
    engine: RankingEngine,
    breakpoints: BreakpointTable,
    overscan_rows: usize,
    reserved_height: f64,

    query: String,
    categories: BTreeSet<String>,
    viewport: Viewport,
    scroll_offset: f64,

    /// Last issued request sequence number
    latest_seq: u64,
    snapshot: Arc<ViewSnapshot>,
}

impl SearchSession {
    /// Session over `corpus` with an empty query, showing every record.
    pub fn new(
        corpus: Corpus,
        options: RankOptions,
        breakpoints: BreakpointTable,
        overscan_rows: usize,
        reserved_height: f64,
    ) -> Self {
        let viewport = Viewport::default();
        let results: Arc<[MatchResult]> = crate::search::rank(corpus.records(), "", &options).into();
        let geometry = layout(viewport.width, results.len(), &breakpoints);
        let viewport_height = geometry.viewport_height(viewport.height, reserved_height);

        Self {
            corpus,
            engine: RankingEngine::new(options),
            breakpoints,
            overscan_rows,
            reserved_height,
            query: String::new(),
            categories: BTreeSet::new(),
            viewport,
            scroll_offset: 0.0,
            latest_seq: 0,
            snapshot: Arc::new(ViewSnapshot {
                seq: 0,
                query: String::new(),
                results,
                geometry,
                viewport_height,
            }),
        }
    }

    /// Build a session from a validated config.
    pub fn from_config(corpus: Corpus, config: &Config) -> Result<Self> {
        Ok(Self::new(
            corpus,
            config.rank_options()?,
            config.breakpoint_table()?,
            config.grid.overscan_rows,
            config.grid.reserved_height,
        ))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Current published snapshot. Cheap to clone and safe to hold across
    /// later events.
    pub fn snapshot(&self) -> Arc<ViewSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Apply one event. Returns true when the render output may have changed.
    #[instrument(name = "session_apply", skip(self))]
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::QueryChanged(query) => {
                self.query = query;
                self.rerank()
            }
            SessionEvent::CategoriesChanged(categories) => {
                self.categories = categories;
                self.rerank()
            }
            SessionEvent::ViewportResized(viewport) => {
                if viewport == self.viewport {
                    return false;
                }
                self.viewport = viewport;
                self.relayout();
                true
            }
            SessionEvent::Scrolled(offset) => {
                let offset = self.clamp_scroll(offset);
                if offset == self.scroll_offset {
                    return false;
                }
                self.scroll_offset = offset;
                true
            }
        }
    }

    /// Capture the current inputs as a new ranking pass. Any request issued
    /// earlier becomes stale.
    pub fn request_rank(&mut self) -> RankRequest {
        self.latest_seq += 1;
        RankRequest {
            seq: self.latest_seq,
            query: self.query.clone(),
            categories: self.categories.clone(),
        }
    }

    /// Run a request: category pre-filter, then ranking.
    pub fn run_request(&mut self, request: &RankRequest) -> Vec<MatchResult> {
        let candidates = filter_by_categories(self.corpus.records(), &request.categories);

        #[cfg(feature = "perf")]
        let started = std::time::Instant::now();

        let results = self.engine.rank(&candidates, &request.query);

        #[cfg(feature = "perf")]
        logging::log_perf(
            "rank",
            started.elapsed().as_millis() as u64,
            RANK_BUDGET_MS,
        );

        logging::log_search_event(request.seq, &request.query, candidates.len(), results.len());
        results
    }

    /// Publish results for `seq`. Results from anything but the latest request
    /// are discarded and false is returned.
    pub fn complete_rank(&mut self, request: &RankRequest, results: Vec<MatchResult>) -> bool {
        if request.seq != self.latest_seq {
            debug!(
                seq = request.seq,
                latest = self.latest_seq,
                query = %request.query,
                "Discarding stale ranking results"
            );
            return false;
        }

        let results: Arc<[MatchResult]> = results.into();
        let geometry = layout(self.viewport.width, results.len(), &self.breakpoints);
        self.publish(request.seq, request.query.clone(), results, geometry);
        // A new result list starts at the top
        self.scroll_offset = 0.0;
        true
    }

    fn rerank(&mut self) -> bool {
        let request = self.request_rank();
        let results = self.run_request(&request);
        self.complete_rank(&request, results)
    }

    /// Recompute geometry for the current viewport, keeping the results.
    fn relayout(&mut self) {
        let current = Arc::clone(&self.snapshot);
        let geometry = layout(self.viewport.width, current.results.len(), &self.breakpoints);
        debug!(
            width = self.viewport.width,
            columns = geometry.column_count,
            rows = geometry.row_count,
            "Replacing grid geometry"
        );
        self.publish(current.seq, current.query.clone(), Arc::clone(&current.results), geometry);
        self.scroll_offset = self.clamp_scroll(self.scroll_offset);
    }

    fn publish(
        &mut self,
        seq: u64,
        query: String,
        results: Arc<[MatchResult]>,
        geometry: GridGeometry,
    ) {
        let viewport_height = geometry.viewport_height(self.viewport.height, self.reserved_height);
        self.snapshot = Arc::new(ViewSnapshot {
            seq,
            query,
            results,
            geometry,
            viewport_height,
        });
    }

    fn clamp_scroll(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return 0.0;
        }
        let max = (self.snapshot.geometry.content_height() - self.snapshot.viewport_height).max(0.0);
        offset.clamp(0.0, max)
    }

    /// Cells to render for the published snapshot at the current scroll
    /// offset.
    pub fn visible_cells(&self) -> Vec<VisibleCell<'_, MatchResult>> {
        let snapshot = &self.snapshot;
        if snapshot.geometry.item_count != snapshot.results.len() {
            debug_panic!(
                "geometry computed for {} items but {} results published",
                snapshot.geometry.item_count,
                snapshot.results.len()
            );
        }
        visible_cells(
            &snapshot.geometry,
            &snapshot.results[..],
            self.scroll_offset,
            snapshot.viewport_height,
            self.overscan_rows,
        )
    }

    /// Inclusive row range currently rendered, if any.
    pub fn rendered_rows(&self) -> Option<(usize, usize)> {
        row_window(
            &self.snapshot.geometry,
            self.scroll_offset,
            self.snapshot.viewport_height,
            self.overscan_rows,
        )
    }

    pub fn status(&self) -> SessionStatus {
        let snapshot = &self.snapshot;
        SessionStatus {
            seq: snapshot.seq,
            query: snapshot.query.clone(),
            visible: snapshot.results.len(),
            total: self.corpus.len(),
            fuzzy_active: !snapshot.query.trim().is_empty(),
            column_count: snapshot.geometry.column_count,
            row_count: snapshot.geometry.row_count,
            rendered_ids: self
                .visible_cells()
                .iter()
                .map(|cell| cell.item.record.id)
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
