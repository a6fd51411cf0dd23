// ── Reactive store set ──

mod cell;
mod sequence;
mod stores;

pub use cell::{ListenerId, Store};
pub use sequence::{RequestSequencer, Ticket};
pub use stores::Stores;
