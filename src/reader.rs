//! Trace reader
//!
//! Decodes a JSON Lines trace back into [`Event`]s the way a consumer does:
//! the `v` field selects the schema, and `site` must strictly increase within
//! one stream.

use crate::error::{Error, Result};
use crate::event::{
    AllocRecord, Event, EventKind, EventPayload, FreeRecord, SourceLocation, StoreRecord,
    SCHEMA_VERSION,
};
use serde::Deserialize;
use std::io::BufRead;

#[derive(Deserialize)]
struct RawEvent {
    site: u64,
    kind: EventKind,
    loc: SourceLocation,
    func: String,
    store: Option<StoreRecord>,
    alloc: Option<AllocRecord>,
    free: Option<FreeRecord>,
}

fn decode_error(line: usize, message: impl Into<String>) -> Error {
    Error::Decode {
        line,
        message: message.into(),
    }
}

fn parse_numbered(text: &str, line: usize) -> Result<Event> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| decode_error(line, e.to_string()))?;

    let version = value
        .get("v")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| decode_error(line, "missing schema version"))?;
    if version != SCHEMA_VERSION {
        return Err(Error::UnsupportedSchema { line, version });
    }

    let raw: RawEvent =
        serde_json::from_value(value).map_err(|e| decode_error(line, e.to_string()))?;

    let missing = |kind: EventKind| decode_error(line, format!("missing {} object", kind.as_str()));
    let payload = match raw.kind {
        EventKind::Store => EventPayload::Store(raw.store.ok_or_else(|| missing(raw.kind))?),
        EventKind::Alloc => EventPayload::Alloc(raw.alloc.ok_or_else(|| missing(raw.kind))?),
        EventKind::Free => EventPayload::Free(raw.free.ok_or_else(|| missing(raw.kind))?),
    };

    Ok(Event {
        schema: version,
        site: raw.site,
        location: raw.loc,
        function: raw.func,
        payload,
    })
}

/// Decodes a single trace line
pub fn parse_line(text: &str) -> Result<Event> {
    parse_numbered(text, 1)
}

/// Decodes a whole trace stream, skipping blank lines.
///
/// Fails on the first undecodable line or the first site id that does not
/// exceed its predecessor.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut events: Vec<Event> = Vec::new();

    for (idx, text) in reader.lines().enumerate() {
        let line = idx + 1;
        let text = text.map_err(|e| decode_error(line, e.to_string()))?;
        if text.trim().is_empty() {
            continue;
        }

        let event = parse_numbered(&text, line)?;
        if let Some(previous) = events.last() {
            if event.site <= previous.site {
                return Err(Error::SiteOrder {
                    line,
                    previous: previous.site,
                    got: event.site,
                });
            }
        }
        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Expr;
    use crate::destination::Destination;

    const STORE: &str = r#"{"v":1,"site":1,"kind":"store","loc":{"file":"main.c","line":47,"col":9},"func":"main","store":{"lhs":{"k":"var","name":"x"},"bytes":null}}"#;
    const FREE: &str = r#"{"v":1,"site":2,"kind":"free","loc":{"file":"main.c","line":70,"col":5},"func":"main","free":{"ptr_expr":{"k":"var","name":"example_arr"}}}"#;

    #[test]
    fn test_parse_store() {
        let event = parse_line(STORE).unwrap();
        assert_eq!(event.site, 1);
        assert_eq!(event.function, "main");
        assert_eq!(
            event.payload,
            EventPayload::Store(StoreRecord {
                destination: Destination::named("x"),
                bytes: None,
            })
        );
    }

    #[test]
    fn test_read_stream() {
        let text = format!("{}\n\n{}\n", STORE, FREE);
        let events = read_events(text.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1].payload,
            EventPayload::Free(FreeRecord {
                pointer: Expr::var("example_arr"),
            })
        );
    }

    #[test]
    fn test_rejects_other_schema() {
        let line = STORE.replacen(r#""v":1"#, r#""v":2"#, 1);
        assert_eq!(
            parse_line(&line).unwrap_err(),
            Error::UnsupportedSchema {
                line: 1,
                version: 2,
            }
        );
    }

    #[test]
    fn test_rejects_site_regression() {
        let text = format!("{}\n{}\n", FREE, STORE);
        assert_eq!(
            read_events(text.as_bytes()).unwrap_err(),
            Error::SiteOrder {
                line: 2,
                previous: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn test_nullable_keys_must_be_present() {
        let line = STORE.replacen(r#","bytes":null"#, "", 1);
        let err = parse_line(&line).unwrap_err();
        assert!(matches!(err, Error::Decode { line: 1, .. }));
        assert!(err.to_string().contains("bytes"));

        let alloc = r#"{"v":1,"site":3,"kind":"alloc","loc":{"file":"a.c","line":1,"col":1},"func":"f","alloc":{"fn":"malloc","size_expr":{"k":"int","v":8}}}"#;
        let err = parse_line(alloc).unwrap_err();
        assert!(err.to_string().contains("lhs"));

        let discarded = alloc.replacen(r#""fn":"malloc","#, r#""fn":"malloc","lhs":null,"#, 1);
        match parse_line(&discarded).unwrap().payload {
            EventPayload::Alloc(record) => assert_eq!(record.destination, None),
            other => panic!("expected alloc, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_mismatched_payload() {
        let line = STORE.replacen(r#""kind":"store""#, r#""kind":"alloc""#, 1);
        let err = parse_line(&line).unwrap_err();
        assert!(err.to_string().contains("missing alloc object"));

        let err = parse_line("{not json").unwrap_err();
        assert!(matches!(err, Error::Decode { line: 1, .. }));
    }
}
