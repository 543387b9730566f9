pub mod overlay_toggle;
pub mod trend_chart;

pub use overlay_toggle::overlay_toggle;
pub use trend_chart::TrendChart;
