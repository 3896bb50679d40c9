mod reader;

pub use reader::{RawSheet, SheetFormat, read_bytes, read_path};
