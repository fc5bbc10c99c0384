use crate::record::types::*;

/// The longest run of text written in a single quoted string.
pub const TXT_CHUNK_LEN: usize = 200;

impl ResourceRecord {
    /// Encode a record as a single zone file entry:
    ///
    /// ```text
    /// <label> [<ttl>] <class> <type> <rdata>
    /// ```
    ///
    /// A record with no label gets an empty one, so the entry starts
    /// with whitespace and inherits the previous label when read.
    pub fn encode(&self) -> String {
        format!("{} {}", self.general_prefix(), self.rtype_with_data.encode_rdata())
    }

    /// Everything up to and including the type.
    pub fn general_prefix(&self) -> String {
        let label = self.label.as_deref().unwrap_or("");
        match &self.ttl {
            Some(ttl) => format!("{label} {ttl} {} {}", self.rclass, self.rtype()),
            None => format!("{label} {} {}", self.rclass, self.rtype()),
        }
    }
}

impl RecordTypeWithData {
    pub fn encode_rdata(&self) -> String {
        match self {
            RecordTypeWithData::A { address } => address.to_string(),
            RecordTypeWithData::AAAA { address } => address.to_string(),
            RecordTypeWithData::CAA { flag, tag, value } => format!("{flag} {tag} {value}"),
            RecordTypeWithData::CNAME { domainname } => domainname.clone(),
            RecordTypeWithData::HINFO { cpu, os } => format!("\"{cpu}\" \"{os}\""),
            RecordTypeWithData::MX { priority, exchange } => format!("{priority} {exchange}"),
            RecordTypeWithData::NAPTR {
                order,
                preference,
                flags,
                service,
                regexp,
                replacement,
            } => format!(
                "{order} {preference} \"{flags}\" \"{service}\" \"{regexp}\" {replacement}"
            ),
            RecordTypeWithData::NS { nameserver } => nameserver.clone(),
            RecordTypeWithData::PTR { name } => name.clone(),
            RecordTypeWithData::SOA {
                nameserver,
                email,
                serial,
                refresh_ttl,
                retry_ttl,
                expiry_ttl,
                minimum_ttl,
            } => format!(
                "{nameserver} {email} {serial} {refresh_ttl} {retry_ttl} {expiry_ttl} {minimum_ttl}"
            ),
            RecordTypeWithData::SPF { text } => quote_text(text),
            RecordTypeWithData::SRV {
                priority,
                weight,
                port,
                target,
            } => format!("{priority} {weight} {port} {target}"),
            RecordTypeWithData::SSHFP {
                algorithm,
                fingerprint_type,
                fingerprint,
            } => format!("{algorithm} {fingerprint_type} {fingerprint}"),
            RecordTypeWithData::TXT { text } => quote_text(text),
        }
    }
}

/// Write text as a sequence of quoted strings of at most
/// `TXT_CHUNK_LEN` characters each.  An escape sequence is never
/// split across two strings.
pub fn quote_text(text: &str) -> String {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        // an escape (`\X` or `\DDD`) counts as one character
        let mut unit = String::from(c);
        if c == '\\' {
            match chars.next() {
                Some(d) if d.is_ascii_digit() => {
                    unit.push(d);
                    for _ in 0..2 {
                        match chars.next_if(char::is_ascii_digit) {
                            Some(d) => unit.push(d),
                            None => break,
                        }
                    }
                }
                Some(escaped) => unit.push(escaped),
                None => (),
            }
        }

        if chunk_len == TXT_CHUNK_LEN {
            chunks.push(std::mem::take(&mut chunk));
            chunk_len = 0;
        }
        chunk.push_str(&unit);
        chunk_len += 1;
    }
    chunks.push(chunk);

    chunks
        .iter()
        .map(|chunk| format!("\"{chunk}\""))
        .collect::<Vec<_>>()
        .join(" ")
}
