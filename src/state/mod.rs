pub mod app_state;
pub mod chart_state;
pub mod theme;
