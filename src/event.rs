//! Trace events
//!
//! One [`Event`] becomes one JSON Lines record:
//!
//! ```text
//! {"v":1,"site":3,"kind":"alloc","loc":{"file":"main.c","line":12,"col":22},
//!  "func":"main","alloc":{"fn":"malloc","lhs":{"k":"var","name":"m"},"size_expr":{"k":"int","v":31}}}
//! ```
//!
//! (wrapped here for width; the real record is a single line)

use crate::descriptor::Expr;
use crate::destination::Destination;
use crate::error::Result;
use crate::ir::Location;
use crate::json;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Schema version written in every record's `v` field
pub const SCHEMA_VERSION: u64 = 1;

/// Placeholder for an unresolvable file or function name
pub const UNKNOWN_NAME: &str = "<unknown>";

/// Session-scoped site id allocator: 1, 2, 3, ... in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteCounter {
    next: u64,
}

impl SiteCounter {
    /// Creates a counter whose first id is 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Id the next emitted event will receive
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Consumes and returns the next id
    pub fn next_site(&mut self) -> u64 {
        let site = self.next;
        self.next += 1;
        site
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SiteCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Location as written in the trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File path, `"<unknown>"` when unresolvable
    pub file: String,
    /// Line, 0 when unknown
    pub line: u32,
    /// Column, 0 when unknown
    #[serde(rename = "col")]
    pub column: u32,
}

impl SourceLocation {
    /// Converts a host location, applying the `"<unknown>"` placeholder
    pub fn from_host(location: &Location) -> Self {
        match location {
            Location::Known { file, line, column } => Self {
                file: file.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                line: *line,
                column: *column,
            },
            Location::Unknown => Self::unknown(),
        }
    }

    /// The distinguished unknown location
    pub fn unknown() -> Self {
        Self {
            file: UNKNOWN_NAME.to_string(),
            line: 0,
            column: 0,
        }
    }
}

/// Event discriminant, the `kind` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Write to a variable or memory location
    Store,
    /// Call to an allocator
    Alloc,
    /// Call to `free`
    Free,
}

impl EventKind {
    /// Wire name of the kind, also the key of its payload object
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Store => "store",
            EventKind::Alloc => "alloc",
            EventKind::Free => "free",
        }
    }
}

/// Nullable field whose key must still be present
fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// `store` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Written location
    #[serde(rename = "lhs")]
    pub destination: Destination,
    /// Static size of the write; serialized as `null` when unknown
    #[serde(deserialize_with = "present_or_null")]
    pub bytes: Option<u64>,
}

/// `alloc` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocRecord {
    /// Allocator name (`malloc`, `calloc`, `realloc`)
    #[serde(rename = "fn")]
    pub callee: String,
    /// Where the result is stored; `null` when the result is discarded
    #[serde(rename = "lhs", deserialize_with = "present_or_null")]
    pub destination: Option<Expr>,
    /// Requested size in bytes, symbolic
    #[serde(rename = "size_expr")]
    pub size: Expr,
}

/// `free` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeRecord {
    /// Pointer being released
    #[serde(rename = "ptr_expr")]
    pub pointer: Expr,
}

/// Kind-specific part of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// Store event
    Store(StoreRecord),
    /// Allocation event
    Alloc(AllocRecord),
    /// Free event
    Free(FreeRecord),
}

impl EventPayload {
    /// Discriminant of this payload
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Store(_) => EventKind::Store,
            EventPayload::Alloc(_) => EventKind::Alloc,
            EventPayload::Free(_) => EventKind::Free,
        }
    }

    /// Same kind with every descriptor replaced by its unknown form.
    /// The allocator name is kept.
    pub fn degraded(&self) -> Self {
        match self {
            EventPayload::Store(_) => EventPayload::Store(StoreRecord {
                destination: Destination::Unknown,
                bytes: None,
            }),
            EventPayload::Alloc(record) => EventPayload::Alloc(AllocRecord {
                callee: record.callee.clone(),
                destination: None,
                size: Expr::Unknown,
            }),
            EventPayload::Free(_) => EventPayload::Free(FreeRecord {
                pointer: Expr::Unknown,
            }),
        }
    }
}

/// One traced event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Schema version, always [`SCHEMA_VERSION`] for events built here
    pub schema: u64,
    /// Session-unique site id
    pub site: u64,
    /// Statement location
    pub location: SourceLocation,
    /// Enclosing function, `"<unknown>"` when none is known
    pub function: String,
    /// Kind-specific data
    pub payload: EventPayload,
}

impl Event {
    /// Assembles an event with the current schema version
    pub fn new(site: u64, location: SourceLocation, function: &str, payload: EventPayload) -> Self {
        Self {
            schema: SCHEMA_VERSION,
            site,
            location,
            function: function.to_string(),
            payload,
        }
    }

    /// Event discriminant
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Serializes to one JSON Lines record (without the newline)
    pub fn to_line(&self) -> Result<String> {
        json::to_line(self)
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let kind = self.kind();
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("v", &self.schema)?;
        map.serialize_entry("site", &self.site)?;
        map.serialize_entry("kind", &kind)?;
        map.serialize_entry("loc", &self.location)?;
        map.serialize_entry("func", &self.function)?;
        match &self.payload {
            EventPayload::Store(record) => map.serialize_entry(kind.as_str(), record)?,
            EventPayload::Alloc(record) => map.serialize_entry(kind.as_str(), record)?,
            EventPayload::Free(record) => map.serialize_entry(kind.as_str(), record)?,
        }
        map.end()
    }
}
