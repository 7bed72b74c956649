//! Shared helpers for pipeline integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zsplit_core::{Config, Error, Result, SegmentConverter};

/// Converter that writes the segment bytes out as the "artifact"
///
/// Keeps every converted segment in memory so tests can reassemble the
/// output without a real columnar encoder.
#[derive(Default)]
pub struct FakeConverter {
    pub segments: RefCell<Vec<Vec<u8>>>,
    /// 1-based segment number that should fail
    pub fail_on: Option<usize>,
    /// Succeed without writing the artifact
    pub skip_artifact: bool,
    pub calls: Cell<usize>,
}

impl FakeConverter {
    pub fn failing_on(segment: usize) -> Self {
        Self {
            fail_on: Some(segment),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SegmentConverter for FakeConverter {
    fn convert(&self, segment: &Path, output_base: &Path) -> Result<PathBuf> {
        self.calls.set(self.calls.get() + 1);
        if self.fail_on == Some(self.calls.get()) {
            return Err(Error::Conversion {
                segment: segment.to_path_buf(),
                reason: "converter exited with exit status: 1".into(),
                output: "simulated failure".into(),
            });
        }

        let data = fs::read(segment).expect("segment file readable");
        let artifact = PathBuf::from(format!("{}.parquet", output_base.display()));
        if !self.skip_artifact {
            fs::write(&artifact, &data).expect("artifact writable");
        }
        self.segments.borrow_mut().push(data);
        Ok(artifact)
    }
}

/// Join records with one newline each, as the splitter emits them
pub fn emitted(records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        out.extend_from_slice(record);
        out.push(b'\n');
    }
    out
}

/// Write `data` zstd-compressed to `dir/name`
pub fn write_zstd(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, zstd::encode_all(data, 3).unwrap()).unwrap();
    path
}

/// Write `data` gzip-compressed to `dir/name`
pub fn write_gzip(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(data).unwrap();
    fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

/// Small-buffer configuration writing into `dir/out_part_NNN.*`
pub fn small_config(dir: &Path, input: PathBuf, threshold: u64) -> Config {
    Config::builder()
        .input(input)
        .output_prefix(dir.join("out"))
        .segment_threshold(threshold)
        .read_buffer_size(128)
        .max_record_size(64 * 1024)
        .write_buffer_size(128)
        .build()
        .unwrap()
}

/// File names in `dir`, sorted
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
