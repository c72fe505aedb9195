mod focus;
mod graph;
mod normalize;
mod request;
mod sanitize;

pub use focus::{Focus, FocusReason, resolve_focus};
pub use graph::{PaperGraph, PaperRecord, Relation, RelationKind};
pub use request::{RequestLedger, RequestTicket};
pub use sanitize::sanitize_payload;
