//! Reader for the CG3 binary stream format.
//!
//! The stream carries constraint-grammar analyses as a sequence of windows;
//! each window holds cohorts (tokens), their candidate readings with
//! subreading chains, dependency and relation links, and window variables.
//!
//! # Crate Structure
//!
//! - [`window`]: Data model and single-window payload decoder
//! - [`stream`]: Header validation and length-prefixed window framing
//!
//! ```no_run
//! let file = std::fs::File::open("input.cgbf")?;
//! for window in cgbf::read_windows(std::io::BufReader::new(file))? {
//!     let window = window?;
//!     for cohort in &window.cohorts {
//!         println!("{} ({} readings)", cohort.wordform(), cohort.readings.len());
//!     }
//! }
//! # Ok::<(), cgbf::StreamError>(())
//! ```

/// Re-export window types.
pub mod window {
    pub use cgbf_window::*;
}

/// Re-export stream types.
pub mod stream {
    pub use cgbf_stream::*;
}

pub use cgbf_stream::{read_windows, StreamConfig, StreamError, WindowReader};
pub use cgbf_window::{decode_window, Cohort, DecodeError, Reading, Window};
