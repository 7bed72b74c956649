//! Input handling module

pub mod input_file;

pub use input_file::InputFile;
