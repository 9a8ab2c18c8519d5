//! Stable JSON output matching what Xcode writes for string catalogs.

use std::io;

use serde::Serialize;
use serde_json::ser::{
    Formatter,
    PrettyFormatter,
};

/// Pretty printer with two-space indentation and `" : "` between key and value.
#[derive(Debug)]
struct XcodeFormatter {
    /// Handles indentation and separators other than the key/value one.
    inner: PrettyFormatter<'static>,
}

impl XcodeFormatter {
    /// Creates the formatter.
    fn new() -> Self {
        Self { inner: PrettyFormatter::with_indent(b"  ") }
    }
}

impl Formatter for XcodeFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

/// Serializes `value` with sorted keys at every level and Xcode-style formatting.
///
/// The value is first converted to a [`serde_json::Value`] so flattened
/// pass-through fields are sorted together with the known ones.
pub fn to_xcode_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, XcodeFormatter::new());
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use serde_json::json;

    use super::*;

    #[googletest::test]
    fn writes_sorted_keys_with_xcode_separator() {
        let value = json!({
            "version": "1.0",
            "sourceLanguage": "en",
            "strings": { "b": {}, "a": { "comment": "x" } }
        });

        let text = String::from_utf8(to_xcode_json(&value).unwrap()).unwrap();

        let expected = "{\n  \"sourceLanguage\" : \"en\",\n  \"strings\" : {\n    \"a\" : {\n      \"comment\" : \"x\"\n    },\n    \"b\" : {}\n  },\n  \"version\" : \"1.0\"\n}\n";
        assert_that!(text, eq(expected));
    }

    #[googletest::test]
    fn output_is_stable() {
        let value = json!({ "z": [1, 2], "a": { "y": true, "x": null } });

        let first = to_xcode_json(&value).unwrap();
        let reparsed: serde_json::Value = serde_json::from_slice(&first).unwrap();
        let second = to_xcode_json(&reparsed).unwrap();

        assert_that!(first, eq(&second));
    }
}
