use crate::config::PipelineConfig;
use crate::state::chart_state::ChartBoard;
use crate::state::theme::Theme;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the viewer shows. The board and the config are separate
/// fields so the pipeline can read one while emitting into the other.
#[derive(Debug, Default)]
pub struct AppState {
    pub board: ChartBoard,
    pub config: PipelineConfig,
    pub theme: Theme,
}
