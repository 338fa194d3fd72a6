// src/links/classify.rs
// =============================================================================
// Link Classifier: Internal, External or Unknown.
//
// Two URLs are "the same site" when their hosts share an effective
// registrable domain according to the public suffix list:
//   blog.example.co.uk  -> example.co.uk
//   example.co.uk       -> example.co.uk     (same site)
//   evilexample.com     -> evilexample.com   (not example.com)
//
// IP-literal hosts have no registrable domain; the address itself stands in
// for it, so links back to the same address are still Internal.
//
// Classification never fails. Anything undecidable is Unknown.
// =============================================================================

use serde::{Deserialize, Serialize};
use url::{Host, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    Internal,
    External,
    Unknown,
}

/// Effective registrable domain of `url`'s host.
///
/// Returns None for URLs without a host, for hosts that are themselves a
/// public suffix (e.g. `co.uk`) and for single-label hosts like `localhost`.
pub fn effective_domain(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.');
            if domain.is_empty() {
                return None;
            }
            psl::domain_str(domain).map(str::to_string)
        }
        // Not Unknown: an IP host has no public suffix, the address stands in
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// Classifies an absolute URL against the origin page's effective domain.
pub fn classify(absolute_url: &str, origin_domain: Option<&str>) -> LinkType {
    let origin = match origin_domain {
        Some(domain) if !domain.is_empty() => domain,
        _ => return LinkType::Unknown,
    };

    let candidate = match Url::parse(absolute_url) {
        Ok(url) => url,
        Err(_) => return LinkType::Unknown,
    };

    match effective_domain(&candidate) {
        Some(domain) if domain == origin => LinkType::Internal,
        Some(_) => LinkType::External,
        None => LinkType::Unknown,
    }
}
