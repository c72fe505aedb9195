use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

/// Last-request-wins bookkeeping for analysis requests. A response is only
/// applied when its ticket is still the newest one handed out.
#[derive(Debug, Default)]
pub struct RequestLedger {
    latest: u64,
}

impl RequestLedger {
    pub fn issue(&mut self) -> RequestTicket {
        self.latest = self.latest.wrapping_add(1);
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Returns `true` when `ticket` may be applied; stale tickets are logged.
    pub fn accept(&self, ticket: RequestTicket) -> bool {
        let current = self.is_current(ticket);
        if !current {
            warn!(
                stale = ticket.0,
                latest = self.latest,
                "discarding superseded analysis response"
            );
        }
        current
    }
}
