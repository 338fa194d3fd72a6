// src/links/record.rs
// =============================================================================
// LinkRecord and LinkInventory: the link-inventory fact's payload.
//
// A LinkRecord is built once per distinct URL, after its probe has finished,
// and is never changed afterwards.
// =============================================================================

use super::classify::LinkType;
use super::verify::{ProbeOutcome, STATUS_UNREACHABLE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub url: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub status_code: u16,
    pub latency_millis: u64,
}

impl LinkRecord {
    pub fn new(url: String, link_type: LinkType, outcome: ProbeOutcome) -> Self {
        Self {
            url,
            link_type,
            status_code: outcome.status_code,
            latency_millis: outcome.latency_millis,
        }
    }

    /// Unreachable, client error or server error.
    pub fn is_broken(&self) -> bool {
        self.status_code == STATUS_UNREACHABLE || self.status_code >= 400
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInventory {
    pub internal_count: usize,
    pub external_count: usize,
    pub unknown_count: usize,
    pub total_count: usize,
    pub link_records: Vec<LinkRecord>,
}

impl LinkInventory {
    /// Tallies the records by type.
    pub fn from_records(link_records: Vec<LinkRecord>) -> Self {
        let count = |kind: LinkType| link_records.iter().filter(|r| r.link_type == kind).count();
        Self {
            internal_count: count(LinkType::Internal),
            external_count: count(LinkType::External),
            unknown_count: count(LinkType::Unknown),
            total_count: link_records.len(),
            link_records,
        }
    }

    pub fn broken(&self) -> impl Iterator<Item = &LinkRecord> {
        self.link_records.iter().filter(|r| r.is_broken())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, link_type: LinkType, status_code: u16) -> LinkRecord {
        LinkRecord::new(
            url.to_string(),
            link_type,
            ProbeOutcome {
                status_code,
                latency_millis: 5,
            },
        )
    }

    #[test]
    fn test_counts_add_up() {
        let inventory = LinkInventory::from_records(vec![
            record("https://example.com/a", LinkType::Internal, 200),
            record("https://example.com/b", LinkType::Internal, 404),
            record("https://rust-lang.org/", LinkType::External, 200),
            record("http://localhost/", LinkType::Unknown, 0),
        ]);
        assert_eq!(inventory.internal_count, 2);
        assert_eq!(inventory.external_count, 1);
        assert_eq!(inventory.unknown_count, 1);
        assert_eq!(
            inventory.total_count,
            inventory.internal_count + inventory.external_count + inventory.unknown_count
        );
        assert_eq!(inventory.broken().count(), 2);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(record("https://example.com/", LinkType::External, 301)).unwrap();
        assert_eq!(json["type"], "External");
        assert_eq!(json["statusCode"], 301);
        assert_eq!(json["latencyMillis"], 5);
    }
}
