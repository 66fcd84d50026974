//! Log records and the ordered collections that render them.

use std::collections::HashMap;

use chrono::Local;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::color::{TIMESTAMP_COLOR, ansi_colorize, color_for};
use crate::modifier::modifier_for;

/// Bracket tokens in message payloads that a downstream colorizer could
/// mistake for live color/style directives. Matched tokens get an empty
/// bracket pair spliced in (`[warn]` -> `[warn[]`), which breaks the tag
/// boundary without losing content. The pattern and replacement are a
/// compatibility contract; do not tweak them.
static ESCAPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"(\[[a-zA-Z0-9_,;: \-\."#]+\[*)\]"##).expect("valid pattern"));

const ESCAPE_REPLACEMENT: &[u8] = b"$1[]";

/// A single container log line.
#[derive(Clone, Debug, Default)]
pub struct LogItem {
    /// Source pod name (may be empty).
    pub pod: String,

    /// Source container name (may be empty).
    pub container: String,

    /// Timestamp token as it appeared on the wire.
    pub timestamp: String,

    /// Whether the pod runs a single container (suppresses the container
    /// column when rendering).
    pub single_container: bool,

    /// Message payload, without trailing newline or timestamp prefix.
    pub bytes: Vec<u8>,
}

impl LogItem {
    /// Parse a raw stream line. The first space-delimited token becomes the
    /// timestamp, the rest of the line (verbatim) becomes the payload.
    ///
    /// A line with no internal space is absorbed entirely into the timestamp
    /// and leaves an empty payload; that is a documented edge case of the
    /// wire format, not an error.
    pub fn new(raw: &[u8]) -> Self {
        let content = raw.strip_suffix(b"\n").unwrap_or(raw);
        match content.iter().position(|&b| b == b' ') {
            Some(sep) => Self {
                timestamp: String::from_utf8_lossy(&content[..sep]).into_owned(),
                bytes: content[sep + 1..].to_vec(),
                ..Self::default()
            },
            None => Self {
                timestamp: String::from_utf8_lossy(content).into_owned(),
                ..Self::default()
            },
        }
    }

    /// Wrap a literal string as a synthetic record (status messages and the
    /// like), stamped with the current local time.
    pub fn from_string(s: &str) -> Self {
        Self {
            bytes: s.as_bytes().to_vec(),
            timestamp: Local::now().to_string(),
            ..Self::default()
        }
    }

    /// Grouping identity used for consistent coloring: the pod name if set,
    /// else the container name, else empty.
    pub fn id(&self) -> &str {
        if !self.pod.is_empty() {
            &self.pod
        } else {
            &self.container
        }
    }

    /// Pod and container information for diagnostics.
    pub fn info(&self) -> String {
        format!("{:?}::{:?}", self.pod, self.container)
    }

    /// Whether the record carries no payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Assemble the display line for this record.
    ///
    /// `paint` colors the pod/container columns; the timestamp column keeps
    /// its own fixed color. If a modifier is registered under `modifier` the
    /// assembled line is passed through it, otherwise it is returned as is.
    pub fn render(&self, paint: u8, show_time: bool, modifier: &str) -> Vec<u8> {
        let mut line = Vec::with_capacity(200);
        if show_time {
            // pad to the column width, never truncate
            line.extend_from_slice(
                ansi_colorize(&format!("{:<30}", self.timestamp), TIMESTAMP_COLOR).as_bytes(),
            );
            line.push(b' ');
        }

        if !self.pod.is_empty() {
            line.extend_from_slice(ansi_colorize(&self.pod, paint).as_bytes());
            line.push(b':');
        }
        if !self.single_container && !self.container.is_empty() {
            line.extend_from_slice(ansi_colorize(&self.container, paint).as_bytes());
            line.push(b' ');
        }

        line.extend_from_slice(&ESCAPE_PATTERN.replace_all(&self.bytes, ESCAPE_REPLACEMENT));

        match modifier_for(modifier) {
            Some(m) => m.modify(&line),
            None => line,
        }
    }
}

/// An ordered collection of log records.
///
/// Items are exclusively owned; cloning the collection (or an item) yields
/// independent byte buffers, so a caller may retain a copy across later
/// mutation of the original.
#[derive(Clone, Debug, Default)]
pub struct LogItems {
    items: Vec<LogItem>,
}

impl LogItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: LogItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogItem> {
        self.items.iter()
    }

    /// Render every record with the neutral color. Machine-scanning input
    /// for the filter engine, not display output.
    pub fn lines(&self, show_time: bool, modifier: &str) -> Vec<Vec<u8>> {
        self.items
            .iter()
            .map(|item| item.render(0, show_time, modifier))
            .collect()
    }

    /// Same as [`lines`](Self::lines), as text. Fuzzy-match input.
    pub fn str_lines(&self, show_time: bool, modifier: &str) -> Vec<String> {
        self.items
            .iter()
            .map(|item| String::from_utf8_lossy(&item.render(0, show_time, modifier)).into_owned())
            .collect()
    }

    /// Render every record into `out` (pre-sized to `len()`) using its
    /// identity color. Colors are assigned once per call, so records sharing
    /// an identity share a color within that call.
    pub fn render(&self, show_time: bool, modifier: &str, out: &mut [Vec<u8>]) {
        let mut colors: HashMap<&str, u8> = HashMap::with_capacity(self.items.len());
        for (slot, item) in out.iter_mut().zip(&self.items) {
            let paint = *colors
                .entry(item.id())
                .or_insert_with(|| color_for(item.id()));
            *slot = item.render(paint, show_time, modifier);
        }
    }
}

impl From<Vec<LogItem>> for LogItems {
    fn from(items: Vec<LogItem>) -> Self {
        Self { items }
    }
}

impl std::ops::Index<usize> for LogItems {
    type Output = LogItem;

    fn index(&self, index: usize) -> &LogItem {
        &self.items[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{LogModifier, register_modifier};
    use std::sync::Arc;

    #[test]
    fn test_parse_splits_timestamp_and_payload() {
        let item = LogItem::new(b"2024-01-15T10:30:00Z starting worker 3\n");
        assert_eq!(item.timestamp, "2024-01-15T10:30:00Z");
        assert_eq!(item.bytes, b"starting worker 3");
    }

    #[test]
    fn test_parse_preserves_interior_spacing() {
        let item = LogItem::new(b"TS a  b\n");
        assert_eq!(item.bytes, b"a  b");
    }

    #[test]
    fn test_parse_without_space_absorbs_into_timestamp() {
        let item = LogItem::new(b"no-spaces-here\n");
        assert_eq!(item.timestamp, "no-spaces-here");
        assert!(item.is_empty());
    }

    #[test]
    fn test_from_string_keeps_content_verbatim() {
        let item = LogItem::from_string("waiting for logs...");
        assert_eq!(item.bytes, b"waiting for logs...");
        assert!(!item.timestamp.is_empty());
    }

    #[test]
    fn test_id_prefers_pod() {
        let mut item = LogItem::from_string("x");
        item.pod = "pod-a".into();
        item.container = "ctr-1".into();
        assert_eq!(item.id(), "pod-a");
        item.pod.clear();
        assert_eq!(item.id(), "ctr-1");
        item.container.clear();
        assert_eq!(item.id(), "");
    }

    #[test]
    fn test_info_quotes_pod_and_container() {
        let mut item = LogItem::new(b"TS hello\n");
        item.pod = "pod-a".into();
        item.container = "ctr-1".into();
        assert_eq!(item.info(), r#""pod-a"::"ctr-1""#);
    }

    #[test]
    fn test_clone_buffer_is_independent() {
        let item = LogItem::new(b"TS hello\n");
        let mut copy = item.clone();
        assert_eq!(copy.bytes, item.bytes);
        copy.bytes[0] = b'H';
        assert_eq!(item.bytes, b"hello");
        assert_eq!(copy.bytes, b"Hello");
    }

    #[test]
    fn test_render_without_time_has_no_timestamp_column() {
        let item = LogItem::new(b"2024-01-15T10:30:00Z payload\n");
        let line = item.render(0, false, "");
        assert!(!String::from_utf8_lossy(&line).contains("2024-01-15T10:30:00Z"));
        assert_eq!(line, b"payload");
    }

    #[test]
    fn test_render_pads_timestamp_to_30() {
        let item = LogItem::new(b"TS payload\n");
        let line = item.render(0, true, "");
        let expected_ts = ansi_colorize(&format!("{:<30}", "TS"), 106);
        assert!(line.starts_with(expected_ts.as_bytes()));
    }

    #[test]
    fn test_render_colorizes_pod_and_container() {
        let mut item = LogItem::new(b"TS payload\n");
        item.pod = "pod-a".into();
        item.container = "ctr-1".into();
        let line = String::from_utf8(item.render(42, false, "")).unwrap();
        assert_eq!(
            line,
            format!(
                "{}:{} payload",
                ansi_colorize("pod-a", 42),
                ansi_colorize("ctr-1", 42)
            )
        );
    }

    #[test]
    fn test_render_skips_container_in_single_container_mode() {
        let mut item = LogItem::new(b"TS payload\n");
        item.pod = "pod-a".into();
        item.container = "ctr-1".into();
        item.single_container = true;
        let line = String::from_utf8(item.render(42, false, "")).unwrap();
        assert!(!line.contains("ctr-1"));
    }

    #[test]
    fn test_escape_substitution_splits_bracket_tokens() {
        let item = LogItem::new(b"TS [warn] disk almost full\n");
        let line = item.render(0, false, "");
        assert_eq!(line, b"[warn[] disk almost full");
        // the original tag boundary is gone
        assert!(!String::from_utf8_lossy(&line).contains("[warn]"));
    }

    #[test]
    fn test_escape_substitution_leaves_plain_text_alone() {
        let item = LogItem::new(b"TS nothing bracketed here\n");
        assert_eq!(item.render(0, false, ""), b"nothing bracketed here");
    }

    #[test]
    fn test_render_applies_registered_modifier() {
        struct Tag;
        impl LogModifier for Tag {
            fn modify(&self, line: &[u8]) -> Vec<u8> {
                let mut out = b">> ".to_vec();
                out.extend_from_slice(line);
                out
            }
        }
        register_modifier("test-tag", Arc::new(Tag));

        let item = LogItem::new(b"TS payload\n");
        assert_eq!(item.render(0, false, "test-tag"), b">> payload");
        assert_eq!(item.render(0, false, "not-registered"), b"payload");
    }

    #[test]
    fn test_collection_render_reuses_identity_colors() {
        let mut items = LogItems::new();
        for pod in ["pod-a", "pod-b", "pod-a"] {
            let mut item = LogItem::new(b"TS payload\n");
            item.pod = pod.into();
            items.push(item);
        }
        let mut out = vec![Vec::new(); items.len()];
        items.render(false, "", &mut out);
        assert_eq!(out[0], out[2]);
        assert_ne!(out[0], out[1]);
    }

    #[test]
    fn test_lines_and_str_lines_agree() {
        let mut items = LogItems::new();
        items.push(LogItem::new(b"TS one\n"));
        items.push(LogItem::new(b"TS two\n"));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].bytes, b"two");
        let lines = items.lines(true, "");
        let strs = items.str_lines(true, "");
        assert_eq!(lines.len(), 2);
        for (bytes, text) in lines.iter().zip(&strs) {
            assert_eq!(bytes, text.as_bytes());
        }
    }
}
