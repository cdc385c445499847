use memochat_model::{DEFAULT_EVENT_NAME, Event};
use serde_json::{Map, Value, json};

/// Parses one frame into an event.
///
/// For `end-of-line`, we only handle line feed (a trailing carriage return
/// is stripped). And for fields, we only handle `event` and `data`:
///
/// frame = *( event-line / data-line / other-line )
/// event-line = "event:" [ space ] name lf
/// data-line = "data:" [ space ] *any-char lf
///
/// Returns `None` for a frame without event and data lines, e.g. a
/// keep-alive comment. Data that is not valid JSON is kept as
/// `{ "text": <data> }`, so parsing never fails.
pub fn parse_frame(frame: &str) -> Option<Event> {
    let mut name = None;
    let mut data_lines = vec![];

    for line in frame.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(value) = field_value(line, "event") {
            name = Some(value.trim());
        } else if let Some(value) = field_value(line, "data") {
            data_lines.push(value);
        }
    }

    if name.is_none() && data_lines.is_empty() {
        return None;
    }

    let name = match name {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_EVENT_NAME,
    };
    let raw = data_lines.join("\n");
    let payload = if raw.is_empty() {
        Value::Object(Map::new())
    } else {
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(err) => {
                debug!("payload of `{name}` is not json ({err}), keeping raw text");
                json!({ "text": raw })
            }
        }
    };

    Some(Event::new(name, payload))
}

#[inline]
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let value = line.strip_prefix(field)?.strip_prefix(':')?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_token_frame() {
        let event = parse_frame("event: token\ndata: {\"text\":\"hi\"}").unwrap();
        assert_eq!(event.name, "token");
        assert_eq!(event.payload, json!({ "text": "hi" }));
    }

    #[test]
    fn test_default_name() {
        let event = parse_frame("data: {\"a\":1}").unwrap();
        assert_eq!(event.name, "message");
        assert_eq!(event.payload, json!({ "a": 1 }));
    }

    #[test]
    fn test_not_json_falls_back_to_text() {
        let event = parse_frame("event: token\ndata: not-json").unwrap();
        assert_eq!(event.str_field("text"), Some("not-json"));
    }

    #[test]
    fn test_multiline_data() {
        let event = parse_frame("data: first\ndata: second").unwrap();
        assert_eq!(event.payload, json!({ "text": "first\nsecond" }));

        let event =
            parse_frame("event: token\ndata: {\"text\":\ndata: \"a\"}").unwrap();
        assert_eq!(event.payload, json!({ "text": "a" }));
    }

    #[test]
    fn test_prefix_variants() {
        let event = parse_frame("event:done\r\ndata:{\"ok\":true}\r").unwrap();
        assert_eq!(event.name, "done");
        assert_eq!(event.payload, json!({ "ok": true }));

        // Only one leading space is part of the prefix.
        let event = parse_frame("data:   padded").unwrap();
        assert_eq!(event.str_field("text"), Some("  padded"));
    }

    #[test]
    fn test_event_without_data() {
        let event = parse_frame("event: done").unwrap();
        assert_eq!(event.name, "done");
        assert_eq!(event.payload, json!({}));
    }

    #[test]
    fn test_empty_frames() {
        assert_eq!(parse_frame(""), None);
        assert_eq!(parse_frame(": keep-alive"), None);
        assert_eq!(parse_frame("id: 42\nretry: 1000"), None);
    }
}
