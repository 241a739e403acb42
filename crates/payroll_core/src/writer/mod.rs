//! Persistent output.

pub mod file_writer;
