use crate::chunking::{chunk_pair, Chunk};
use crate::classify::{compare_positions, style_row, ComparisonSummary, PositionStatus, StyledCell};
use crate::clipboard::{ClipboardSink, SelectionSource};
use crate::input::SequencePair;
use crate::layout::{measure_chunk_width, FontMetrics, LayoutBus, LayoutSubscription, SurfaceSize};
use crate::timer::ConfirmationTimer;
use seqalign_common::{AppConfig, ColorTable};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One wrapped line pair of the comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChunk {
    pub offset: usize,
    pub first: Vec<StyledCell>,
    pub second: Vec<StyledCell>,
}

/// Result of a render pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    pub chunk_width: usize,
    pub chunks: Vec<RenderedChunk>,
    pub copied: bool,
}

/// What happened when a selection gesture ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Nothing but whitespace was selected
    Empty,
    /// The clipboard rejected the write; no confirmation is shown
    Failed,
}

/// Renderer settings derived from the application config
#[derive(Debug, Clone)]
pub struct RendererOptions {
    pub metrics: FontMetrics,
    pub fallback_width: usize,
    pub copy_notice: Duration,
}

impl RendererOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            metrics: FontMetrics::from_config(&config.font),
            fallback_width: config.default_chunk_width.max(1),
            copy_notice: Duration::from_millis(config.copy_notice_ms),
        }
    }

    pub fn with_metrics(mut self, metrics: FontMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Rendering context for one validated pair of sequences.
///
/// Owns the chunk width, the "copied" flag and its clear timer, and the
/// layout subscription. The timer and subscription are released by
/// [`ComparisonRenderer::teardown`], which also runs on drop.
pub struct ComparisonRenderer {
    pair: SequencePair,
    table: ColorTable,
    options: RendererOptions,
    chunk_width: usize,
    surface: Option<SurfaceSize>,
    copied: bool,
    timer: ConfirmationTimer,
    clipboard: Box<dyn ClipboardSink>,
    subscription: Option<LayoutSubscription>,
}

impl ComparisonRenderer {
    pub fn new(
        pair: SequencePair,
        options: RendererOptions,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        let chunk_width = measure_chunk_width(None, &options.metrics, options.fallback_width);
        debug!(len = pair.len(), chunk_width, "Renderer created");
        Self {
            pair,
            table: ColorTable::amino_acids(),
            options,
            chunk_width,
            surface: None,
            copied: false,
            timer: ConfirmationTimer::new(),
            clipboard,
            subscription: None,
        }
    }

    pub fn pair(&self) -> &SequencePair {
        &self.pair
    }

    /// Start observing surface size changes
    pub fn mount(&mut self, bus: &LayoutBus) {
        self.subscription = Some(bus.subscribe());
        self.poll_layout();
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Apply the newest size notification, if any. Returns whether the chunk
    /// width changed.
    pub fn poll_layout(&mut self) -> bool {
        let latest = self.subscription.as_ref().and_then(LayoutSubscription::latest);
        match latest {
            Some(size) => self.on_resize(size),
            None => false,
        }
    }

    /// Recompute the chunk width for a new surface size
    pub fn on_resize(&mut self, size: SurfaceSize) -> bool {
        self.surface = Some(size);
        let width = measure_chunk_width(
            self.surface,
            &self.options.metrics,
            self.options.fallback_width,
        );
        if width == self.chunk_width {
            return false;
        }
        debug!(from = self.chunk_width, to = width, "Chunk width changed");
        self.chunk_width = width;
        true
    }

    pub fn chunk_width(&self) -> usize {
        self.chunk_width
    }

    pub fn chunks(&self) -> Vec<Chunk<'_>> {
        chunk_pair(
            self.pair.first().as_str(),
            self.pair.second().as_str(),
            self.chunk_width,
        )
    }

    /// Chunk and colorize the pair at the current width. The first row is
    /// colored by residue class; the second only where it differs from the
    /// first.
    pub fn render(&self) -> RenderedView {
        let chunks = self
            .chunks()
            .into_iter()
            .map(|chunk| RenderedChunk {
                offset: chunk.offset,
                first: style_row(chunk.first, None, &self.table),
                second: style_row(chunk.second, Some(chunk.first), &self.table),
            })
            .collect();

        RenderedView {
            chunk_width: self.chunk_width,
            chunks,
            copied: self.copied,
        }
    }

    pub fn positions(&self) -> Vec<PositionStatus> {
        compare_positions(self.pair.first().as_str(), self.pair.second().as_str())
    }

    pub fn summary(&self) -> ComparisonSummary {
        ComparisonSummary::from_statuses(&self.positions())
    }

    /// Copy the trimmed selection to the clipboard and raise the "copied"
    /// confirmation. A new copy restarts the clear timer. Clipboard failures
    /// are logged and otherwise ignored.
    pub fn on_selection_end<S>(&mut self, selection: &S, now: Instant) -> CopyOutcome
    where
        S: SelectionSource + ?Sized,
    {
        let Some(raw) = selection.selected_text() else {
            return CopyOutcome::Empty;
        };
        let text = raw.trim();
        if text.is_empty() {
            return CopyOutcome::Empty;
        }

        if let Err(e) = self.clipboard.write_text(text) {
            warn!("Copy to clipboard failed: {}", e);
            return CopyOutcome::Failed;
        }

        info!(chars = text.chars().count(), "Selection copied");
        self.copied = true;
        self.timer.schedule(now, self.options.copy_notice);
        CopyOutcome::Copied
    }

    /// Advance time; clears the confirmation when its timer is due. Returns
    /// whether the flag was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.timer.fire_due(now) {
            self.copied = false;
            return true;
        }
        false
    }

    pub fn is_copied(&self) -> bool {
        self.copied
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.next_deadline()
    }

    pub fn has_pending_clear(&self) -> bool {
        self.timer.is_pending()
    }

    /// Release the layout subscription and cancel the pending clear
    pub fn teardown(&mut self) {
        let released = self.subscription.take().is_some();
        let cancelled = self.timer.cancel();
        if released || cancelled {
            debug!(released, cancelled, "Renderer torn down");
        }
        self.copied = false;
    }
}

impl Drop for ComparisonRenderer {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Highlight;
    use crate::clipboard::MemoryClipboard;
    use crate::input::Sequence;
    use seqalign_common::{Alphabet, Rgb};

    fn pair(first: &str, second: &str) -> SequencePair {
        let alphabet = Alphabet::amino_acids();
        SequencePair::new(
            Sequence::new(first, &alphabet),
            Sequence::new(second, &alphabet),
        )
        .unwrap()
    }

    fn terminal_renderer(
        first: &str,
        second: &str,
        clipboard: MemoryClipboard,
    ) -> ComparisonRenderer {
        let options = RendererOptions::default().with_metrics(FontMetrics::terminal_cell());
        ComparisonRenderer::new(pair(first, second), options, Box::new(clipboard))
    }

    #[test]
    fn test_unmounted_renderer_uses_fallback_width() {
        let renderer = terminal_renderer("ACDE", "ACDF", MemoryClipboard::new());
        assert_eq!(renderer.chunk_width(), 80);
        assert!(!renderer.is_mounted());
        assert_eq!(renderer.render().chunks.len(), 1);
    }

    #[test]
    fn test_render_classifies_rows() {
        let renderer = terminal_renderer("ACDE", "ACKE", MemoryClipboard::new());
        let view = renderer.render();
        let chunk = &view.chunks[0];

        assert!(chunk
            .first
            .iter()
            .all(|cell| matches!(cell.highlight, Highlight::Category(_))));
        assert_eq!(chunk.second[0].highlight, Highlight::Neutral);
        assert_eq!(
            chunk.second[2].highlight,
            Highlight::Mismatch(Some(Rgb(0xBB, 0x99, 0xFF)))
        );
        assert_eq!(renderer.summary().mismatches, 1);
    }

    #[test]
    fn test_resize_rechunks_without_touching_sequences() {
        let bus = LayoutBus::new();
        let mut renderer = terminal_renderer("ACDEFGHIKL", "ACDEFGHIKM", MemoryClipboard::new());
        renderer.mount(&bus);
        assert_eq!(renderer.chunk_width(), 80);

        bus.publish(SurfaceSize::from_cells(4, 20));
        assert!(renderer.poll_layout());
        assert_eq!(renderer.chunk_width(), 4);
        let view = renderer.render();
        assert_eq!(view.chunks.len(), 3);
        assert_eq!(view.chunks[2].offset, 8);

        bus.publish(SurfaceSize::from_cells(5, 20));
        assert!(renderer.poll_layout());
        assert_eq!(renderer.render().chunks.len(), 2);
        assert_eq!(renderer.pair().first().as_str(), "ACDEFGHIKL");
        assert_eq!(renderer.pair().second().as_str(), "ACDEFGHIKM");

        bus.publish(SurfaceSize::from_cells(5, 30));
        assert!(!renderer.poll_layout());
    }

    #[test]
    fn test_mount_picks_up_existing_size() {
        let bus = LayoutBus::new();
        bus.publish(SurfaceSize::from_cells(12, 5));
        let mut renderer = terminal_renderer("ACDE", "ACDE", MemoryClipboard::new());
        renderer.mount(&bus);
        assert_eq!(renderer.chunk_width(), 12);
    }

    #[test]
    fn test_pixel_metrics() {
        let options = RendererOptions::default().with_metrics(FontMetrics {
            family: "monospace".to_string(),
            size: 20.0,
            advance_ratio: 0.5,
        });
        let mut renderer = ComparisonRenderer::new(
            pair("ACDE", "ACDE"),
            options,
            Box::new(MemoryClipboard::new()),
        );
        renderer.on_resize(SurfaceSize::new(25.0, 100.0));
        assert_eq!(renderer.chunk_width(), 2);
    }

    #[test]
    fn test_copy_trims_and_confirms() {
        let clipboard = MemoryClipboard::new();
        let mut renderer = terminal_renderer("ACDE", "ACDE", clipboard.clone());
        let now = Instant::now();

        assert_eq!(renderer.on_selection_end("  CDE \n", now), CopyOutcome::Copied);
        assert_eq!(clipboard.contents().as_deref(), Some("CDE"));
        assert!(renderer.is_copied());
        assert!(renderer.render().copied);

        assert!(!renderer.tick(now + Duration::from_millis(999)));
        assert!(renderer.tick(now + Duration::from_millis(1000)));
        assert!(!renderer.is_copied());
    }

    #[test]
    fn test_blank_selection_is_ignored() {
        let clipboard = MemoryClipboard::new();
        let mut renderer = terminal_renderer("ACDE", "ACDE", clipboard.clone());
        let now = Instant::now();

        assert_eq!(renderer.on_selection_end(" \t\n", now), CopyOutcome::Empty);
        assert_eq!(renderer.on_selection_end(&None::<String>, now), CopyOutcome::Empty);
        assert!(clipboard.history().is_empty());
        assert!(!renderer.is_copied());
        assert!(!renderer.has_pending_clear());
    }

    #[test]
    fn test_second_copy_restarts_clear_timer() {
        let clipboard = MemoryClipboard::new();
        let mut renderer = terminal_renderer("ACDE", "ACDE", clipboard.clone());
        let start = Instant::now();

        renderer.on_selection_end("AC", start);
        let second = start + Duration::from_millis(600);
        renderer.on_selection_end("DE", second);

        assert!(renderer.has_pending_clear());
        assert_eq!(renderer.next_deadline(), Some(second + Duration::from_millis(1000)));

        // the first copy's deadline passes without clearing
        assert!(!renderer.tick(start + Duration::from_millis(1000)));
        assert!(renderer.is_copied());

        assert!(renderer.tick(second + Duration::from_millis(1000)));
        assert!(!renderer.is_copied());
        assert_eq!(clipboard.history(), vec!["AC", "DE"]);
    }

    #[test]
    fn test_clipboard_failure_is_swallowed() {
        let mut renderer = terminal_renderer("ACDE", "ACDE", MemoryClipboard::failing());
        assert_eq!(
            renderer.on_selection_end("ACDE", Instant::now()),
            CopyOutcome::Failed
        );
        assert!(!renderer.is_copied());
        assert!(!renderer.has_pending_clear());
    }

    #[test]
    fn test_teardown_releases_resources() {
        let bus = LayoutBus::new();
        let mut renderer = terminal_renderer("ACDE", "ACDE", MemoryClipboard::new());
        renderer.mount(&bus);
        renderer.on_selection_end("AC", Instant::now());
        assert_eq!(bus.subscriber_count(), 1);

        renderer.teardown();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!renderer.has_pending_clear());
        assert!(!renderer.is_mounted());
    }

    #[test]
    fn test_drop_releases_subscription() {
        let bus = LayoutBus::new();
        {
            let mut renderer = terminal_renderer("ACDE", "ACDE", MemoryClipboard::new());
            renderer.mount(&bus);
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }
}
