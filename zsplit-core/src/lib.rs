//! Streaming size-bounded splitter for compressed line-delimited records
//!
//! This crate decompresses a large zstd or gzip record stream incrementally,
//! re-partitions it into intermediate files of bounded size without ever
//! splitting a record, and hands each finished file to an external columnar
//! converter. Inputs can be far larger than available memory: only the read
//! buffer, one record and the write buffer are held at any time.
//!
//! # Architecture
//!
//! - [`decompress`]: codec detection and the decompressed byte stream
//! - [`reader`]: newline-delimited record reader with a bounded record size
//! - [`segment`]: writes records into one segment until a size threshold
//! - [`converter`]: the external conversion step behind a trait
//! - [`pipeline`]: drives the loop and aggregates [`RunStats`]
//!
//! # Example
//!
//! ```no_run
//! use zsplit_core::{Config, ConverterConfig, Pipeline, ScriptConverter};
//!
//! let config = Config::builder()
//!     .input("RC_2023-01.zst")
//!     .output_prefix("out/RC_2023-01")
//!     .segment_threshold(1024 * 1024 * 1024)
//!     .build()
//!     .unwrap();
//! let converter = ScriptConverter::new(ConverterConfig::default()).unwrap();
//!
//! let stats = Pipeline::new(config, converter).run().unwrap();
//! println!("{stats}");
//! ```

pub mod config;
pub mod converter;
pub mod decompress;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod segment;
pub mod stats;

pub use config::{defaults, Config, ConfigBuilder};
pub use converter::{ConverterConfig, ScriptConverter, SegmentConverter};
pub use decompress::{open_source, Codec, DecompressedStream, DecompressionConfig};
pub use error::{Error, PipelineError, Result};
pub use pipeline::{NoopObserver, Pipeline, SegmentObserver};
pub use reader::RecordReader;
pub use segment::{
    SegmentFailure, SegmentOutcome, SegmentPaths, SegmentReport, SegmentStatus, SegmentWriter,
};
pub use stats::RunStats;
