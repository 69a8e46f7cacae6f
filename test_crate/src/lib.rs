//! Shared helpers for the integration tests of javaprops.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Path of a fixture file in the `tests` directory.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join(name)
}

/// Raw bytes of a fixture file.
pub fn fixture_bytes(name: &str) -> Vec<u8> {
    let mut file = File::open(fixture_path(name)).expect("Failed to open fixture");
    let mut binary = Vec::new();
    file.read_to_end(&mut binary).expect("Failed to read fixture");
    binary
}

/// A fixture file decoded as ISO-8859-1.
pub fn fixture_latin1(name: &str) -> String {
    fixture_bytes(name).into_iter().map(char::from).collect()
}
