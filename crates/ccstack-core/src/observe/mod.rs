//! # Observability
//!
//! - **Logging**: structured logs via `tracing`
//! - **Observers**: hooks invoked by the decoder after every expansion and
//!   at the end of a run
//! - **Stats**: end-of-run counters with the classic one-line reports
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ccstack_core::observe::{init_logging, LogConfig, TracingObserver};
//!
//! init_logging(&LogConfig::development());
//! let mut decoder = StackDecoder::with_observer(encoder, config, TracingObserver);
//! decoder.decode(&relmat, &mut decoded)?;
//! println!("{}", decoder.stats().unwrap());
//! ```

pub mod logging;
pub mod observer;
pub mod stats;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use observer::{DecodeObserver, ExpansionEvent, NoopObserver, RecordingObserver, TracingObserver};
pub use stats::DecodeStats;
