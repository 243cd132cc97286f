//! Host events via stdin.
//!
//! The `listen` command is driven by JSON objects, one per line (JSONL):
//!
//! ```json
//! {"type": "setQuery", "text": "dockr"}
//! {"type": "toggleCategory", "category": "Docker"}
//! {"type": "setCategories", "categories": ["Git", "AWS"]}
//! {"type": "resize", "width": 1200, "height": 900}
//! {"type": "scroll", "offset": 392}
//! ```
//!
//! # Example Usage
//!
//! ```bash
//! printf '%s\n' '{"type":"resize","width":1200,"height":900}' \
//!               '{"type":"setQuery","text":"kubctl"}' | command-library listen
//! ```

use std::io::BufRead;

use tracing::{debug, info, warn};

/// Events a host can send on stdin.
///
/// `setQuery` accepts an optional `requestId` that is carried into the logs
/// for correlation.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    /// Raw query text, one per keystroke; debounced before ranking
    SetQuery {
        text: String,
        #[serde(default, rename = "requestId")]
        request_id: Option<String>,
    },
    /// Flip one category chip
    ToggleCategory { category: String },
    /// Replace the whole category selection
    SetCategories {
        #[serde(default)]
        categories: Vec<String>,
    },
    /// Window size changed
    Resize { width: f64, height: f64 },
    /// Grid scrolled to an absolute offset
    Scroll { offset: f64 },
}

/// Parse one JSONL line. Blank lines yield `Ok(None)`.
pub fn parse_event(line: &str) -> serde_json::Result<Option<HostEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Start a thread that reads `reader` line by line and forwards parsed events.
///
/// Malformed lines are logged and skipped. The thread exits at end of input,
/// on a read error, or when the receiver is dropped; the channel closes when
/// it does.
pub fn start_event_listener<R>(reader: R) -> async_channel::Receiver<HostEvent>
where
    R: BufRead + Send + 'static,
{
    // Bounded: events arrive at keystroke rate
    let (tx, rx) = async_channel::bounded(100);

    std::thread::spawn(move || {
        info!("Host event listener started");
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Error reading host events");
                    break;
                }
            };
            match parse_event(&line) {
                Ok(Some(event)) => {
                    debug!(?event, "Parsed host event");
                    if tx.send_blocking(event).is_err() {
                        info!("Host event channel closed, exiting");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, line = %line, "Failed to parse host event");
                }
            }
        }
        info!("Host event listener exiting");
    });

    rx
}

/// Listen on the process's stdin.
pub fn start_stdin_listener() -> async_channel::Receiver<HostEvent> {
    start_event_listener(std::io::BufReader::new(std::io::stdin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_set_query_deserialization() {
        let event = parse_event(r#"{"type": "setQuery", "text": "dockr"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            HostEvent::SetQuery {
                text: "dockr".into(),
                request_id: None
            }
        );
    }

    #[test]
    fn test_set_query_with_request_id() {
        let event = parse_event(r#"{"type": "setQuery", "text": "", "requestId": "req-7"}"#)
            .unwrap()
            .unwrap();
        match event {
            HostEvent::SetQuery { text, request_id } => {
                assert!(text.is_empty());
                assert_eq!(request_id.as_deref(), Some("req-7"));
            }
            _ => panic!("Expected SetQuery event"),
        }
    }

    #[test]
    fn test_category_events() {
        let toggle = parse_event(r#"{"type": "toggleCategory", "category": "AWS"}"#).unwrap();
        assert_eq!(
            toggle,
            Some(HostEvent::ToggleCategory {
                category: "AWS".into()
            })
        );

        let set = parse_event(r#"{"type": "setCategories", "categories": ["Git", "npm"]}"#).unwrap();
        assert_eq!(
            set,
            Some(HostEvent::SetCategories {
                categories: vec!["Git".into(), "npm".into()]
            })
        );

        let clear = parse_event(r#"{"type": "setCategories"}"#).unwrap();
        assert_eq!(clear, Some(HostEvent::SetCategories { categories: vec![] }));
    }

    #[test]
    fn test_viewport_events() {
        assert_eq!(
            parse_event(r#"{"type": "resize", "width": 1200, "height": 900.5}"#).unwrap(),
            Some(HostEvent::Resize {
                width: 1200.0,
                height: 900.5
            })
        );
        assert_eq!(
            parse_event(r#"{"type": "scroll", "offset": 392}"#).unwrap(),
            Some(HostEvent::Scroll { offset: 392.0 })
        );
    }

    #[test]
    fn test_blank_and_invalid_lines() {
        assert_eq!(parse_event("   ").unwrap(), None);
        assert!(parse_event(r#"{"type": "explode"}"#).is_err());
        assert!(parse_event(r#"{"type": "resize", "width": 10}"#).is_err());
        assert!(parse_event("not json").is_err());
    }

    #[test]
    fn test_listener_skips_bad_lines_and_closes_at_eof() {
        let input = concat!(
            "{\"type\": \"resize\", \"width\": 800, \"height\": 600}\n",
            "garbage\n",
            "\n",
            "{\"type\": \"setQuery\", \"text\": \"git\"}\n",
        );
        let rx = start_event_listener(Cursor::new(input.as_bytes().to_vec()));

        assert!(matches!(
            rx.recv_blocking().unwrap(),
            HostEvent::Resize { .. }
        ));
        assert!(matches!(
            rx.recv_blocking().unwrap(),
            HostEvent::SetQuery { .. }
        ));
        assert!(rx.recv_blocking().is_err());
    }
}
