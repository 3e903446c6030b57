use lopper_core::app::ProgressProjection;

/// The TUI Model - this represents the complete UI state.
/// The projection is the aggregator's latest snapshot; everything else is view-only.
#[derive(Debug, Default)]
pub struct TuiModel {
    /// Latest snapshot published by the aggregator
    pub projection: ProgressProjection,

    /// UI-specific state
    pub ui_state: UiState,

    /// Whether deletions are only being simulated
    pub dry_run: bool,

    /// Whether the application should quit
    pub should_quit: bool,
}

/// UI-specific state (scrolling, animation, terminal size)
#[derive(Debug, Default)]
pub struct UiState {
    /// First body line shown
    pub scroll_offset: usize,

    /// Rows available to the body
    pub viewport_height: usize,

    /// Current spinner animation frame
    pub spinner_frame: usize,

    /// Terminal size
    pub terminal_width: u16,
    pub terminal_height: u16,
}

impl TuiModel {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Replace the snapshot, keeping the scroll position in range
    pub fn set_projection(&mut self, projection: ProgressProjection) {
        self.projection = projection;
        self.clamp_scroll();
    }

    /// Number of body lines: one per repository plus one per branch or error under it
    pub fn content_height(&self) -> usize {
        if !self.projection.loaded || self.projection.total() == 0 {
            return 1;
        }
        self.projection
            .records
            .iter()
            .map(|r| 1 + r.deleted_branches.len() + r.errors.len())
            .sum()
    }

    pub fn max_scroll(&self) -> usize {
        self.content_height().saturating_sub(self.ui_state.viewport_height)
    }

    pub fn scroll_up(&mut self) {
        self.ui_state.scroll_offset = self.ui_state.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.ui_state.scroll_offset < self.max_scroll() {
            self.ui_state.scroll_offset += 1;
        }
    }

    /// How far down the body is scrolled, 0 to 100
    pub fn scroll_percent(&self) -> usize {
        match self.max_scroll() {
            0 => 100,
            max => self.ui_state.scroll_offset * 100 / max,
        }
    }

    pub fn clamp_scroll(&mut self) {
        self.ui_state.scroll_offset = self.ui_state.scroll_offset.min(self.max_scroll());
    }

    pub fn is_finished(&self) -> bool {
        self.projection.is_finished()
    }
}
