//! Histogram booking from the text specification file and weighted filling.

pub mod book;
pub mod spec;

pub use book::{Histogram1D, HistogramBook, HistogramFill, HistogramSink};
pub use spec::{load_hist_spec, parse_hist_spec, HistogramDir, HistogramSpec};
