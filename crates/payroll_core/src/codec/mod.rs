//! Text codecs for employee data.

pub mod record_codec;
