// src/links/mod.rs
// =============================================================================
// Everything about the links a page references.
//
// Submodules:
// - extract: pulls distinct absolute URLs out of raw markup
// - classify: Internal / External / Unknown by effective domain
// - verify: the process-wide worker pool that probes each link
// - record: LinkRecord and the tallied LinkInventory
// =============================================================================

mod classify;
mod extract;
mod record;
mod verify;

pub use classify::{classify, effective_domain, LinkType};
pub use extract::extract_links;
pub use record::{LinkInventory, LinkRecord};
pub use verify::{HttpProber, Prober, VerificationPool, STATUS_UNREACHABLE};
