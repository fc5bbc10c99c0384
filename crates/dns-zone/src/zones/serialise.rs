use std::fmt::Write as _;

use crate::record::types::*;
use crate::zones::types::*;

/// Types which `dump_pretty` puts first, in this order.  Everything
/// else follows, sorted by type.
const PRETTY_ORDER: [RecordType; 5] = [
    RecordType::SOA,
    RecordType::NS,
    RecordType::MX,
    RecordType::SPF,
    RecordType::TXT,
];

impl Zone {
    /// Serialise the zone: the `$ORIGIN` and `$TTL` directives (if
    /// set), then one line per record in the order they are stored.
    ///
    /// The output always ends with a newline, even if there is nothing
    /// else in it.
    pub fn dump(&self) -> String {
        let mut out = self.dump_directives();
        for rr in &self.records {
            _ = writeln!(&mut out, "{}", rr.encode());
        }
        if self.records.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Serialise the zone as `dump`, but with the records grouped by
    /// type, and a blank line between groups.
    ///
    /// Records without a label are written with the label they would
    /// inherit in `dump` (or `@`, if there is none), as regrouping
    /// changes which record precedes them.
    pub fn dump_pretty(&self) -> String {
        let mut out = self.dump_directives();

        let mut last_label = None;
        let mut records = Vec::with_capacity(self.records.len());
        for rr in &self.records {
            let encoded = match &rr.label {
                Some(label) => {
                    last_label = Some(label.as_str());
                    rr.encode()
                }
                None => ResourceRecord {
                    label: Some(last_label.unwrap_or("@").to_string()),
                    ..rr.clone()
                }
                .encode(),
            };
            records.push((rr.rtype(), encoded));
        }
        // stable, so each group keeps its records in order
        records.sort_by_key(|(rtype, _)| pretty_rank(*rtype));

        let mut previous = None;
        for (rtype, encoded) in records {
            if previous.is_some_and(|p| p != rtype) {
                out.push('\n');
            }
            previous = Some(rtype);
            _ = writeln!(&mut out, "{encoded}");
        }
        if self.records.is_empty() {
            out.push('\n');
        }

        out
    }

    fn dump_directives(&self) -> String {
        let mut out = String::new();
        if let Some(origin) = &self.origin {
            _ = writeln!(&mut out, "$ORIGIN {origin}");
        }
        if let Some(ttl) = &self.ttl {
            _ = writeln!(&mut out, "$TTL {ttl}");
        }
        out
    }
}

fn pretty_rank(rtype: RecordType) -> (usize, Option<RecordType>) {
    match PRETTY_ORDER.iter().position(|t| *t == rtype) {
        Some(idx) => (idx, None),
        None => (PRETTY_ORDER.len(), Some(rtype)),
    }
}
