use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::record::duration;

/// A single resource record, as it appears in a zone file.
///
/// Names are kept as the strings that were written (apart from
/// `CNAME` targets, which are qualified against the origin when
/// decoded), and TTLs are kept as duration strings, so that a
/// decoded record dumps back to what was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRecord {
    /// The owner name.  `None` if the entry left it blank and there
    /// was no earlier record to inherit one from.
    pub label: Option<String>,

    /// The TTL exactly as written, if any.  When this is `None` the
    /// zone's `$TTL` applies.
    pub ttl: Option<String>,

    pub rclass: RecordClass,

    pub rtype_with_data: RecordTypeWithData,
}

impl ResourceRecord {
    /// Construct a record owned by the origin (`@`), in the `IN`
    /// class, with no explicit TTL.
    pub fn new(rtype_with_data: RecordTypeWithData) -> Self {
        Self {
            label: Some("@".to_string()),
            ttl: None,
            rclass: RecordClass::IN,
            rtype_with_data,
        }
    }

    pub fn rtype(&self) -> RecordType {
        self.rtype_with_data.rtype()
    }

    /// The TTL which applies to this record: its own, or the zone's
    /// if it has none.
    pub fn effective_ttl<'a>(&'a self, zone_ttl: Option<&'a str>) -> Option<&'a str> {
        self.ttl.as_deref().or(zone_ttl)
    }

    /// The effective TTL in seconds, if there is one and it is a
    /// well-formed duration.
    pub fn ttl_seconds(&self, zone_ttl: Option<&str>) -> Option<u32> {
        self.effective_ttl(zone_ttl).and_then(duration::to_seconds)
    }
}

/// A record type with its associated data.  This is the closed set of
/// record types which can be read from and written to a zone file.
///
/// Character-string fields (`text`, `cpu`, `flags`, ...) hold the
/// contents without the surrounding quotes, but with any escape
/// sequences left as written.  The `CAA` value is the exception: it
/// keeps its quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordTypeWithData {
    A {
        address: Ipv4Addr,
    },
    AAAA {
        address: Ipv6Addr,
    },
    CAA {
        flag: u8,
        tag: String,
        value: String,
    },
    CNAME {
        domainname: String,
    },
    HINFO {
        cpu: String,
        os: String,
    },
    MX {
        priority: u16,
        exchange: String,
    },
    NAPTR {
        order: u16,
        preference: u16,
        flags: String,
        service: String,
        regexp: String,
        replacement: String,
    },
    NS {
        nameserver: String,
    },
    PTR {
        name: String,
    },
    SOA {
        nameserver: String,
        email: String,
        serial: String,
        refresh_ttl: String,
        retry_ttl: String,
        expiry_ttl: String,
        minimum_ttl: String,
    },
    SPF {
        text: String,
    },
    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    SSHFP {
        algorithm: u8,
        fingerprint_type: u8,
        fingerprint: String,
    },
    TXT {
        text: String,
    },
}

impl RecordTypeWithData {
    pub fn rtype(&self) -> RecordType {
        match self {
            RecordTypeWithData::A { .. } => RecordType::A,
            RecordTypeWithData::AAAA { .. } => RecordType::AAAA,
            RecordTypeWithData::CAA { .. } => RecordType::CAA,
            RecordTypeWithData::CNAME { .. } => RecordType::CNAME,
            RecordTypeWithData::HINFO { .. } => RecordType::HINFO,
            RecordTypeWithData::MX { .. } => RecordType::MX,
            RecordTypeWithData::NAPTR { .. } => RecordType::NAPTR,
            RecordTypeWithData::NS { .. } => RecordType::NS,
            RecordTypeWithData::PTR { .. } => RecordType::PTR,
            RecordTypeWithData::SOA { .. } => RecordType::SOA,
            RecordTypeWithData::SPF { .. } => RecordType::SPF,
            RecordTypeWithData::SRV { .. } => RecordType::SRV,
            RecordTypeWithData::SSHFP { .. } => RecordType::SSHFP,
            RecordTypeWithData::TXT { .. } => RecordType::TXT,
        }
    }
}

/// Record types which can appear in a zone file.
///
/// Variants are declared in alphabetical order of their tag, so the
/// derived `Ord` sorts them lexicographically.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecordType {
    A,
    AAAA,
    CAA,
    CNAME,
    HINFO,
    MX,
    NAPTR,
    NS,
    PTR,
    SOA,
    SPF,
    SRV,
    SSHFP,
    TXT,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::AAAA => write!(f, "AAAA"),
            RecordType::CAA => write!(f, "CAA"),
            RecordType::CNAME => write!(f, "CNAME"),
            RecordType::HINFO => write!(f, "HINFO"),
            RecordType::MX => write!(f, "MX"),
            RecordType::NAPTR => write!(f, "NAPTR"),
            RecordType::NS => write!(f, "NS"),
            RecordType::PTR => write!(f, "PTR"),
            RecordType::SOA => write!(f, "SOA"),
            RecordType::SPF => write!(f, "SPF"),
            RecordType::SRV => write!(f, "SRV"),
            RecordType::SSHFP => write!(f, "SSHFP"),
            RecordType::TXT => write!(f, "TXT"),
        }
    }
}

impl FromStr for RecordType {
    type Err = RecordTypeFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "CAA" => Ok(RecordType::CAA),
            "CNAME" => Ok(RecordType::CNAME),
            "HINFO" => Ok(RecordType::HINFO),
            "MX" => Ok(RecordType::MX),
            "NAPTR" => Ok(RecordType::NAPTR),
            "NS" => Ok(RecordType::NS),
            "PTR" => Ok(RecordType::PTR),
            "SOA" => Ok(RecordType::SOA),
            "SPF" => Ok(RecordType::SPF),
            "SRV" => Ok(RecordType::SRV),
            "SSHFP" => Ok(RecordType::SSHFP),
            "TXT" => Ok(RecordType::TXT),
            _ => Err(RecordTypeFromStr::NoParse),
        }
    }
}

/// Errors that can arise when converting a `&str` into a `RecordType`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordTypeFromStr {
    NoParse,
}

impl fmt::Display for RecordTypeFromStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordTypeFromStr::NoParse => write!(f, "could not parse string to type"),
        }
    }
}

impl std::error::Error for RecordTypeFromStr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Record classes.  Practically everything is `IN`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecordClass {
    #[default]
    IN,
    CS,
    CH,
    HS,
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordClass::IN => write!(f, "IN"),
            RecordClass::CS => write!(f, "CS"),
            RecordClass::CH => write!(f, "CH"),
            RecordClass::HS => write!(f, "HS"),
        }
    }
}

impl FromStr for RecordClass {
    type Err = RecordClassFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(RecordClass::IN),
            "CS" => Ok(RecordClass::CS),
            "CH" => Ok(RecordClass::CH),
            "HS" => Ok(RecordClass::HS),
            _ => Err(RecordClassFromStr::NoParse),
        }
    }
}

/// Errors that can arise when converting a `&str` into a `RecordClass`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordClassFromStr {
    NoParse,
}

impl fmt::Display for RecordClassFromStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordClassFromStr::NoParse => write!(f, "could not parse string to class"),
        }
    }
}

impl std::error::Error for RecordClassFromStr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for ResourceRecord {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        use test_util::{arbitrary_chars, arbitrary_name, HEX, TEXT};

        let label = if u.ratio(1, 10)? {
            Some("@".to_string())
        } else {
            Some(arbitrary_name(u)?)
        };
        let ttl = if u.arbitrary()? {
            Some(format!("{}", u.int_in_range::<u32>(0..=604_800)?))
        } else if u.arbitrary()? {
            Some(format!(
                "{}h{}m",
                u.int_in_range::<u8>(1..=48)?,
                u.int_in_range::<u8>(0..=59)?
            ))
        } else {
            None
        };

        let rtype_with_data = match u.int_in_range::<u8>(0..=13)? {
            0 => RecordTypeWithData::A {
                address: u.arbitrary()?,
            },
            1 => RecordTypeWithData::AAAA {
                address: u.arbitrary()?,
            },
            2 => RecordTypeWithData::CAA {
                flag: u.arbitrary()?,
                tag: arbitrary_chars(u, b"abcdefghijklmnopqrstuvwxyz", 1, 10)?,
                value: format!("\"{}\"", arbitrary_chars(u, TEXT, 0, 40)?),
            },
            3 => RecordTypeWithData::CNAME {
                domainname: format!("{}.", arbitrary_name(u)?),
            },
            4 => RecordTypeWithData::HINFO {
                cpu: arbitrary_chars(u, TEXT, 0, 20)?,
                os: arbitrary_chars(u, TEXT, 0, 20)?,
            },
            5 => RecordTypeWithData::MX {
                priority: u.arbitrary()?,
                exchange: arbitrary_name(u)?,
            },
            6 => RecordTypeWithData::NAPTR {
                order: u.arbitrary()?,
                preference: u.arbitrary()?,
                flags: arbitrary_chars(u, b"SAUP", 0, 1)?,
                service: arbitrary_chars(u, TEXT, 0, 20)?,
                regexp: arbitrary_chars(u, TEXT, 0, 40)?,
                replacement: format!("{}.", arbitrary_name(u)?),
            },
            7 => RecordTypeWithData::NS {
                nameserver: arbitrary_name(u)?,
            },
            8 => RecordTypeWithData::PTR {
                name: arbitrary_name(u)?,
            },
            9 => RecordTypeWithData::SOA {
                nameserver: format!("{}.", arbitrary_name(u)?),
                email: format!("{}.", arbitrary_name(u)?),
                serial: format!("{}", u.arbitrary::<u32>()?),
                refresh_ttl: format!("{}h", u.int_in_range::<u8>(1..=24)?),
                retry_ttl: format!("{}m", u.int_in_range::<u8>(1..=59)?),
                expiry_ttl: format!("{}w", u.int_in_range::<u8>(1..=8)?),
                minimum_ttl: format!("{}", u.int_in_range::<u32>(0..=86_400)?),
            },
            10 => RecordTypeWithData::SPF {
                text: arbitrary_chars(u, TEXT, 0, 450)?,
            },
            11 => RecordTypeWithData::SRV {
                priority: u.arbitrary()?,
                weight: u.arbitrary()?,
                port: u.arbitrary()?,
                target: format!("{}.", arbitrary_name(u)?),
            },
            12 => RecordTypeWithData::SSHFP {
                algorithm: u.arbitrary()?,
                fingerprint_type: u.arbitrary()?,
                fingerprint: arbitrary_chars(u, HEX, 2, 64)?,
            },
            _ => RecordTypeWithData::TXT {
                text: arbitrary_chars(u, TEXT, 0, 450)?,
            },
        };

        Ok(Self {
            label,
            ttl,
            rclass: RecordClass::IN,
            rtype_with_data,
        })
    }
}


#[cfg(any(feature = "test-util", test))]
#[allow(clippy::missing_panics_doc)]
pub mod test_util {
    use super::*;

    use arbitrary::{Arbitrary, Unstructured};
    use rand::Rng;

    /// Printable ASCII which needs no escaping inside a quoted
    /// character-string.
    pub const TEXT: &[u8] =
        b" !#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[]^_`abcdefghijklmnopqrstuvwxyz{|}~";

    pub const HEX: &[u8] = b"0123456789abcdef";

    const LDH: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-";

    pub fn arbitrary_chars(
        u: &mut Unstructured<'_>,
        charset: &[u8],
        min: usize,
        max: usize,
    ) -> arbitrary::Result<String> {
        let len = u.int_in_range(min..=max)?;
        let mut out = String::with_capacity(len);
        for _ in 0..len {
            out.push(*u.choose(charset)? as char);
        }
        Ok(out)
    }

    /// A relative name of one to three labels, each starting with a
    /// letter.
    pub fn arbitrary_name(u: &mut Unstructured<'_>) -> arbitrary::Result<String> {
        let labels = u.int_in_range::<u8>(1..=3)?;
        let mut out = String::new();
        for i in 0..labels {
            if i > 0 {
                out.push('.');
            }
            out.push(*u.choose(&LDH[..26])? as char);
            out.push_str(&arbitrary_chars(u, LDH, 0, 9)?);
        }
        Ok(out)
    }

    pub fn arbitrary_resourcerecord() -> ResourceRecord {
        let mut rng = rand::rng();
        for size in [128, 256, 512, 1024, 2048, 4096] {
            let mut buf = Vec::with_capacity(size);
            for _ in 0..size {
                buf.push(rng.random::<u8>());
            }

            if let Ok(rr) = ResourceRecord::arbitrary(&mut Unstructured::new(&buf)) {
                return rr;
            }
        }

        panic!("could not generate arbitrary value!");
    }

    pub fn a_record(label: &str, address: Ipv4Addr) -> ResourceRecord {
        ResourceRecord {
            label: Some(label.to_string()),
            ttl: None,
            rclass: RecordClass::IN,
            rtype_with_data: RecordTypeWithData::A { address },
        }
    }

    pub fn cname_record(label: &str, domainname: &str) -> ResourceRecord {
        ResourceRecord {
            label: Some(label.to_string()),
            ttl: None,
            rclass: RecordClass::IN,
            rtype_with_data: RecordTypeWithData::CNAME {
                domainname: domainname.to_string(),
            },
        }
    }

    pub fn ns_record(label: &str, nameserver: &str) -> ResourceRecord {
        ResourceRecord {
            label: Some(label.to_string()),
            ttl: None,
            rclass: RecordClass::IN,
            rtype_with_data: RecordTypeWithData::NS {
                nameserver: nameserver.to_string(),
            },
        }
    }

    pub fn txt_record(label: &str, text: &str) -> ResourceRecord {
        ResourceRecord {
            label: Some(label.to_string()),
            ttl: None,
            rclass: RecordClass::IN,
            rtype_with_data: RecordTypeWithData::TXT {
                text: text.to_string(),
            },
        }
    }

    pub fn caa_record(label: &str, flag: u8, tag: &str, value: &str) -> ResourceRecord {
        ResourceRecord {
            label: Some(label.to_string()),
            ttl: None,
            rclass: RecordClass::IN,
            rtype_with_data: RecordTypeWithData::CAA {
                flag,
                tag: tag.to_string(),
                value: value.to_string(),
            },
        }
    }
}
