// Series derivation for the results chart
//
// Raw result records become plot-ready point series:
// - failures: one point per failed run, valued at its metric
// - passes: one point per passing run, valued at zero
// - bands: mean and mean ± stddev of the failures, either over the whole
//   range or over a trailing time window
//
// Variance is always computed with the single-pass estimator in
// `crate::variance`; no sample buffer is kept beyond the sliding window.

mod bands;
mod builder;

pub use bands::{compute_bands, Bands, WindowPolicy};
pub use builder::{
    build_plot, InvalidTimestampPolicy, PlotSeries, Point, SeriesBundle, SeriesError,
    SeriesOptions,
};
