use crate::color::ColorMap;
use crate::data::compare::{compare_symbol, CompareError, ComparisonResult};
use crate::data::model::ExpressionDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The comparison follows a two-state machine: `outcome == None` is Idle,
/// `Some(_)` is Computed. The only transition is [`AppState::run_comparison`]
/// (the Compare trigger), which consumes the symbol input at trigger time.
/// A computed outcome, success or failure, stays displayed until superseded
/// by the next trigger or a dataset reload.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<ExpressionDataset>,

    /// Current content of the symbol text field. Editing it does NOT
    /// recompute anything.
    pub symbol_input: String,

    /// Last computed comparison, or why it failed.
    pub outcome: Option<Result<ComparisonResult, CompareError>>,

    /// Colour per group label.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            symbol_input: String::new(),
            outcome: None,
            color_map: None,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset; resets the comparison state machine.
    pub fn set_dataset(&mut self, dataset: ExpressionDataset) {
        self.color_map = Some(ColorMap::new(&dataset.group_levels()));
        self.dataset = Some(dataset);
        self.outcome = None;
        self.status_message = None;
        self.loading = false;
    }

    /// The Compare trigger: consume the current symbol input and run the
    /// pipeline synchronously.
    ///
    /// A blank input or a missing dataset leaves the state machine where it
    /// is; everything else transitions to Computed, storing either a result
    /// or the error to display.
    pub fn run_comparison(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let symbol = self.symbol_input.trim();
        if symbol.is_empty() {
            return;
        }
        self.outcome = Some(compare_symbol(dataset, symbol));
    }
}
