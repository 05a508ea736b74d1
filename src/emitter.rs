//! Event emission: site numbering, assembly and writing

use crate::debug::format_event;
use crate::event::{Event, EventPayload, SiteCounter, SourceLocation, UNKNOWN_NAME};
use crate::ir::Location;
use crate::sink::Sink;

/// Numbers, serializes and writes events for one session
#[derive(Debug)]
pub struct Emitter {
    counter: SiteCounter,
    sink: Sink,
}

impl Emitter {
    /// Creates an emitter writing to `sink`, starting at site 1
    pub fn new(sink: Sink) -> Self {
        Self {
            counter: SiteCounter::new(),
            sink,
        }
    }

    /// Site counter state
    pub fn counter(&self) -> &SiteCounter {
        &self.counter
    }

    /// Output sink
    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Emits one event and returns it.
    ///
    /// The site id is consumed only once the record has been encoded, so ids
    /// stay gapless. A record that fails to encode is retried once with its
    /// descriptors degraded to unknown; only if that also fails is the event
    /// dropped. A failed write is logged and the event still counts: the
    /// trace has no rollback.
    pub fn emit(
        &mut self,
        location: &Location,
        function: Option<&str>,
        payload: EventPayload,
    ) -> Option<Event> {
        let mut event = Event::new(
            self.counter.peek(),
            SourceLocation::from_host(location),
            function.unwrap_or(UNKNOWN_NAME),
            payload,
        );

        let line = match event.to_line() {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(site = event.site, "{}; writing degraded record", err);
                event.payload = event.payload.degraded();
                match event.to_line() {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(site = event.site, "dropping event: {}", err);
                        return None;
                    }
                }
            }
        };

        self.counter.next_site();
        if let Err(err) = self.sink.write_line(&line) {
            tracing::warn!(site = event.site, "{}", err);
        }
        tracing::debug!(kind = event.kind().as_str(), "{}", format_event(&event));
        Some(event)
    }

    /// Hands back the sink for closing
    pub fn into_sink(self) -> Sink {
        self.sink
    }
}
