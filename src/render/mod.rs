//! Output sinks for analysis figures.

pub mod figure;
pub mod png;

pub use figure::{Figure, Panel, TimeAxis};
pub use png::PngSink;

/// Anything that can take a finished figure and show it to the operator.
pub trait PlotSink {
    fn show(&self, figure: &Figure) -> anyhow::Result<()>;
}
