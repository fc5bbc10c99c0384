use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::record::duration;
use crate::record::types::*;
use crate::zones::deserialise::ParseContext;

impl ResourceRecord {
    /// Decode a single entry into a record.  Entries are of the form:
    ///
    /// ```text
    /// <label> <ttl>   <class> <type> <rdata>
    /// <label> <class> <ttl>   <type> <rdata>
    /// <label> <ttl>           <type> <rdata>
    /// <label>         <class> <type> <rdata>
    /// <label>                 <type> <rdata>
    ///         <ttl>   <class> <type> <rdata>
    ///         ...
    /// ```
    ///
    /// An entry which starts with whitespace has no label, and takes
    /// the label of the previous record in the context.  A missing
    /// class is `IN`; a missing TTL is left missing, so the zone's
    /// `$TTL` governs.
    ///
    /// Returns `None` if the entry is not a record of a supported
    /// type, or if its rdata does not fit the grammar for that type.
    pub fn decode(entry: &str, context: &ParseContext) -> Option<Self> {
        let prefix = split_prefix(entry)?;
        let rtype_with_data =
            RecordTypeWithData::decode_rdata(prefix.rtype, prefix.rdata, context)?;

        let label = match prefix.label {
            Some(label) => Some(unroll_label(label, context)),
            None => context.last_label.clone(),
        };

        Some(Self {
            label,
            ttl: prefix.ttl.map(String::from),
            rclass: prefix.rclass,
            rtype_with_data,
        })
    }
}

impl RecordTypeWithData {
    /// Decode the rdata of a record of the given type.
    pub fn decode_rdata(rtype: RecordType, rdata: &str, context: &ParseContext) -> Option<Self> {
        match rtype {
            RecordType::TXT => Some(RecordTypeWithData::TXT {
                text: decode_text(rdata)?,
            }),
            RecordType::SPF => Some(RecordTypeWithData::SPF {
                text: decode_text(rdata)?,
            }),
            _ => decode_fields(rtype, &rdata_fields(rdata)?, context),
        }
    }
}

/// Everything before the rdata.
#[derive(Debug, PartialEq, Eq)]
struct Prefix<'a> {
    label: Option<&'a str>,
    ttl: Option<&'a str>,
    rclass: RecordClass,
    rtype: RecordType,
    rdata: &'a str,
}

/// Split an entry into its prefix and the rdata.  The TTL and class
/// are recognised by shape, and can come in either order.
fn split_prefix(entry: &str) -> Option<Prefix<'_>> {
    let mut rest = entry;

    let label = if entry.starts_with(char::is_whitespace) {
        None
    } else {
        let (token, remainder) = next_token(rest)?;
        rest = remainder;
        Some(token)
    };

    let mut ttl = None;
    let mut rclass = None;
    loop {
        let (token, remainder) = next_token(rest)?;
        if ttl.is_none() && duration::is_duration(token) {
            ttl = Some(token);
        } else if let (None, Ok(class)) = (rclass, RecordClass::from_str(token)) {
            rclass = Some(class);
        } else {
            let rtype = RecordType::from_str(token).ok()?;
            return Some(Prefix {
                label,
                ttl,
                rclass: rclass.unwrap_or_default(),
                rtype,
                rdata: remainder.trim(),
            });
        }
        rest = remainder;
    }
}

/// Take the next whitespace-delimited token.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

/// Records written under a nested `$ORIGIN` have their labels
/// rewritten to be relative to the zone origin (or absolute, if the
/// nested origin is unrelated), so they survive being dumped under a
/// single `$ORIGIN`.
fn unroll_label(label: &str, context: &ParseContext) -> String {
    if label.ends_with('.') {
        return label.to_string();
    }

    match context.unrolled_origin() {
        None => label.to_string(),
        Some(suffix) if label == "@" => suffix,
        Some(suffix) => join_name(label, &suffix),
    }
}

/// Qualify a relative name against the origin.  Absolute names are
/// unchanged, and so are relative names if there is no origin.
fn qualify(name: &str, context: &ParseContext) -> String {
    if name.ends_with('.') {
        return name.to_string();
    }

    match context.qualifying_origin() {
        Some(origin) if name == "@" => origin.to_string(),
        Some(origin) => join_name(name, origin),
        None => name.to_string(),
    }
}

/// Append a suffix to a relative name.  The root suffix just makes the
/// name absolute.
fn join_name(name: &str, suffix: &str) -> String {
    if suffix == "." {
        format!("{name}.")
    } else {
        format!("{name}.{suffix}")
    }
}

/// A field of rdata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field<'a> {
    Bare(&'a str),
    /// The contents of a quoted string, escapes left as written.
    Quoted(&'a str),
}

impl Field<'_> {
    fn bare(self) -> Option<String> {
        match self {
            Field::Bare(s) => Some(s.to_string()),
            Field::Quoted(_) => None,
        }
    }

    /// A character-string may be quoted or not.  A bare one has any
    /// stray quotes escaped so that it can be written back quoted.
    fn character_string(self) -> String {
        match self {
            Field::Quoted(s) => s.to_string(),
            Field::Bare(s) => {
                let mut out = String::with_capacity(s.len());
                let mut escaped = false;
                for c in s.chars() {
                    if c == '"' && !escaped {
                        out.push('\\');
                    }
                    escaped = c == '\\' && !escaped;
                    out.push(c);
                }
                out
            }
        }
    }

    fn parse<T: FromStr>(self) -> Option<T> {
        match self {
            Field::Bare(s) => T::from_str(s).ok(),
            Field::Quoted(_) => None,
        }
    }
}

/// Split rdata into fields.  Returns `None` if there is an
/// unterminated quoted string.
fn rdata_fields(rdata: &str) -> Option<Vec<Field<'_>>> {
    let mut fields = Vec::new();
    let mut rest = rdata.trim_start();

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = closing_quote(quoted)?;
            fields.push(Field::Quoted(&quoted[..end]));
            rest = quoted[end + 1..].trim_start();
        } else {
            let mut escaped = false;
            let mut end = rest.len();
            for (i, c) in rest.char_indices() {
                if c.is_whitespace() && !escaped {
                    end = i;
                    break;
                }
                escaped = c == '\\' && !escaped;
            }
            fields.push(Field::Bare(&rest[..end]));
            rest = rest[end..].trim_start();
        }
    }

    Some(fields)
}

/// Find the index of the unescaped `"` which closes a quoted string,
/// given the text after the opening quote.
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' if !escaped => return Some(i),
            '\\' if !escaped => escaped = true,
            _ => escaped = false,
        }
    }
    None
}

/// Concatenate the contents of every quoted string in the rdata,
/// ignoring anything outside quotes.  There must be at least one.
fn decode_text(rdata: &str) -> Option<String> {
    let mut text = String::new();
    let mut found = false;
    let mut rest = rdata;

    while let Some(start) = rest.find('"') {
        let quoted = &rest[start + 1..];
        let Some(end) = closing_quote(quoted) else {
            break;
        };
        text.push_str(&quoted[..end]);
        found = true;
        rest = &quoted[end + 1..];
    }

    if found {
        Some(text)
    } else {
        None
    }
}

/// Decode the rdata of the types which are a fixed sequence of fields.
fn decode_fields(
    rtype: RecordType,
    fields: &[Field<'_>],
    context: &ParseContext,
) -> Option<RecordTypeWithData> {
    match (rtype, fields) {
        (RecordType::A, [address]) => Some(RecordTypeWithData::A {
            address: address.parse::<Ipv4Addr>()?,
        }),
        (RecordType::AAAA, [address]) => Some(RecordTypeWithData::AAAA {
            address: address.parse::<Ipv6Addr>()?,
        }),
        (RecordType::CAA, [flag, tag, value, ..]) => {
            let tag = tag.bare()?;
            if !tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return None;
            }
            let Field::Quoted(value) = value else {
                return None;
            };
            Some(RecordTypeWithData::CAA {
                flag: flag.parse()?,
                tag,
                value: format!("\"{value}\""),
            })
        }
        (RecordType::CNAME, [domainname]) => Some(RecordTypeWithData::CNAME {
            domainname: qualify(&domainname.bare()?, context),
        }),
        (RecordType::HINFO, [cpu, os]) => Some(RecordTypeWithData::HINFO {
            cpu: cpu.character_string(),
            os: os.character_string(),
        }),
        (RecordType::MX, [priority, exchange]) => Some(RecordTypeWithData::MX {
            priority: priority.parse()?,
            exchange: exchange.bare()?,
        }),
        (RecordType::NAPTR, [order, preference, flags, service, regexp, replacement]) => {
            Some(RecordTypeWithData::NAPTR {
                order: order.parse()?,
                preference: preference.parse()?,
                flags: flags.character_string(),
                service: service.character_string(),
                regexp: regexp.character_string(),
                replacement: replacement.bare()?,
            })
        }
        (RecordType::NS, [nameserver]) => Some(RecordTypeWithData::NS {
            nameserver: nameserver.bare()?,
        }),
        (RecordType::PTR, [name]) => Some(RecordTypeWithData::PTR { name: name.bare()? }),
        (
            RecordType::SOA,
            [nameserver, email, serial, refresh_ttl, retry_ttl, expiry_ttl, minimum_ttl],
        ) => {
            let serial = serial.bare()?;
            if serial.is_empty() || !serial.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            Some(RecordTypeWithData::SOA {
                nameserver: nameserver.bare()?,
                email: email.bare()?,
                serial,
                refresh_ttl: duration_field(*refresh_ttl)?,
                retry_ttl: duration_field(*retry_ttl)?,
                expiry_ttl: duration_field(*expiry_ttl)?,
                minimum_ttl: duration_field(*minimum_ttl)?,
            })
        }
        (RecordType::SRV, [priority, weight, port, target]) => Some(RecordTypeWithData::SRV {
            priority: priority.parse()?,
            weight: weight.parse()?,
            port: port.parse()?,
            target: target.bare()?,
        }),
        (RecordType::SSHFP, [algorithm, fingerprint_type, fingerprint]) => {
            let fingerprint = fingerprint.bare()?;
            if fingerprint.is_empty() || !fingerprint.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            Some(RecordTypeWithData::SSHFP {
                algorithm: algorithm.parse()?,
                fingerprint_type: fingerprint_type.parse()?,
                fingerprint,
            })
        }
        _ => None,
    }
}

fn duration_field(field: Field<'_>) -> Option<String> {
    field.bare().filter(|s| duration::is_duration(s))
}
