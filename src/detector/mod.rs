pub mod correlate;
pub mod preprocess;
pub mod sampling;
pub mod spectral;
pub mod window;

pub use correlate::{correlate, DEDUP_EPSILON_SECS};
pub use preprocess::{correct, correct_with};
pub use sampling::estimate_sampling_rate;
pub use spectral::{one_sided_magnitudes, scan_channel, ScanPlan, SpectrumAnalyzer};
pub use window::{windowed_spectrum, WindowFunction};
