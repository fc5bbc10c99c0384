use chrono::{DateTime, Utc};

use crate::record::types::*;

/// A zone: the records read from a zone file, plus the `$TTL` and
/// `$ORIGIN` that apply to them.
///
/// Records are kept in the order they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// The default TTL, from `$TTL`.
    pub ttl: Option<String>,

    /// The origin, from the first top-level `$ORIGIN` (or the default
    /// origin given when loading).
    pub origin: Option<String>,

    pub records: Vec<ResourceRecord>,
}

impl Default for Zone {
    fn default() -> Self {
        Self::new()
    }
}

impl Zone {
    /// Construct a new zone, containing only a default `SOA` record.
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    /// Construct a new zone, as `new`, where the `SOA` serial is
    /// derived from the given time rather than the current time.
    pub fn new_at(now: DateTime<Utc>) -> Self {
        Self {
            records: vec![default_soa(now)],
            ..Self::empty()
        }
    }

    /// Construct a zone with no records at all.
    pub fn empty() -> Self {
        Self {
            ttl: None,
            origin: None,
            records: Vec::new(),
        }
    }

    /// The first `SOA` record, if there is one.
    pub fn get_soa(&self) -> Option<&ResourceRecord> {
        self.records
            .iter()
            .find(|rr| rr.rtype() == RecordType::SOA)
    }

    /// The first `SOA` record.  If there is none, a default one is
    /// appended to the zone.
    pub fn soa(&mut self) -> &mut ResourceRecord {
        self.soa_at(Utc::now())
    }

    /// As `soa`, but any default record gets a serial derived from the
    /// given time.
    pub fn soa_at(&mut self, now: DateTime<Utc>) -> &mut ResourceRecord {
        let idx = match self
            .records
            .iter()
            .position(|rr| rr.rtype() == RecordType::SOA)
        {
            Some(idx) => idx,
            None => {
                self.records.push(default_soa(now));
                self.records.len() - 1
            }
        };

        &mut self.records[idx]
    }
}

/// An `SOA` record with placeholder names and conventional timers.
/// The serial is the date followed by `01`.
pub fn default_soa(now: DateTime<Utc>) -> ResourceRecord {
    ResourceRecord::new(RecordTypeWithData::SOA {
        nameserver: "@".to_string(),
        email: "@".to_string(),
        serial: now.format("%Y%m%d01").to_string(),
        refresh_ttl: "3h".to_string(),
        retry_ttl: "15m".to_string(),
        expiry_ttl: "4w".to_string(),
        minimum_ttl: "30m".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use std::net::Ipv4Addr;

    use super::*;
    use crate::record::types::test_util::*;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 12, 30, 0).unwrap()
    }

    fn serial(rr: &ResourceRecord) -> &str {
        match &rr.rtype_with_data {
            RecordTypeWithData::SOA { serial, .. } => serial,
            other => panic!("expected SOA, got {other:?}"),
        }
    }

    #[test]
    fn default_soa_fields() {
        assert_eq!(
            ResourceRecord {
                label: Some("@".to_string()),
                ttl: None,
                rclass: RecordClass::IN,
                rtype_with_data: RecordTypeWithData::SOA {
                    nameserver: "@".to_string(),
                    email: "@".to_string(),
                    serial: "2024030701".to_string(),
                    refresh_ttl: "3h".to_string(),
                    retry_ttl: "15m".to_string(),
                    expiry_ttl: "4w".to_string(),
                    minimum_ttl: "30m".to_string(),
                },
            },
            default_soa(fixed_time())
        );
    }

    #[test]
    fn new_has_one_soa() {
        let zone = Zone::new_at(fixed_time());
        assert_eq!(1, zone.records.len());
        assert_eq!(Some("2024030701"), zone.get_soa().map(serial));
        assert_eq!(None, zone.ttl);
        assert_eq!(None, zone.origin);
    }

    #[test]
    fn empty_has_no_soa() {
        assert_eq!(None, Zone::empty().get_soa());
    }

    #[test]
    fn soa_creates_if_missing() {
        let mut zone = Zone::empty();
        zone.records.push(a_record("www", Ipv4Addr::new(10, 0, 0, 1)));

        assert_eq!("2024030701", serial(zone.soa_at(fixed_time())));
        assert_eq!(2, zone.records.len());
        assert_eq!(RecordType::SOA, zone.records[1].rtype());

        // a second call finds the record made by the first
        zone.soa_at(fixed_time());
        assert_eq!(2, zone.records.len());
    }

    #[test]
    fn soa_finds_first() {
        let mut zone = Zone::empty();
        zone.records.push(ns_record("@", "ns1.example.com."));
        let mut first = default_soa(fixed_time());
        first.label = Some("first".to_string());
        zone.records.push(first);
        zone.records.push(default_soa(fixed_time()));

        assert_eq!(Some("first"), zone.soa().label.as_deref());
        assert_eq!(3, zone.records.len());
    }

    #[test]
    fn soa_is_mutable() {
        let mut zone = Zone::new_at(fixed_time());
        if let RecordTypeWithData::SOA { serial, .. } = &mut zone.soa().rtype_with_data {
            *serial = "2024030702".to_string();
        }
        assert_eq!(Some("2024030702"), zone.get_soa().map(serial));
    }
}
