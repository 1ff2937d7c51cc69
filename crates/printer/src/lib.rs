//! Writes the Graphviz description of an event graph and optionally runs
//! the layout tool over it.

pub mod dot_printer;
pub mod style;

pub use dot_printer::{open_diagram, DotPrinter, PrintError, RenderOutcome};
pub use style::DotStyle;
