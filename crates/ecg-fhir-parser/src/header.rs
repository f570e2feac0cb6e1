use serde_json::Value;

use crate::model::RecordingHeader;

const COMMENT_MARKER: char = '#';

/// Scans the leading comment block. The first comment whose text is a JSON
/// object becomes the metadata; scanning stops at the first body line.
pub fn parse_header(content: &str) -> RecordingHeader {
    let mut header = RecordingHeader::default();

    for line in strip_bom(content).lines() {
        let Some(rest) = line.strip_prefix(COMMENT_MARKER) else {
            break;
        };
        header.comment_lines += 1;

        if header.metadata.is_some() {
            continue;
        }
        let candidate = rest.trim();
        if !candidate.starts_with('{') {
            continue;
        }
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            header.metadata = Some(map);
        }
    }

    header
}

pub(crate) fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}
