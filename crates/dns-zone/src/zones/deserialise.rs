use std::io;

use crate::record::types::*;
use crate::zones::entries::extract_entries;
use crate::zones::types::*;

/// How deeply `$INCLUDE` directives may nest.
pub const MAX_INCLUDE_DEPTH: usize = 16;

impl Zone {
    /// Parse a string of zone data.
    ///
    /// `$INCLUDE` directives are resolved with `resolver`, which maps
    /// a file name to its contents.  If the zone has no `$ORIGIN`
    /// directive of its own, `default_origin` becomes its origin.
    ///
    /// Entries which are not well-formed records of a supported type
    /// are skipped.
    ///
    /// # Errors
    ///
    /// If an included file cannot be resolved, or the includes form a
    /// cycle or nest too deeply.
    pub fn load<R: IncludeResolver>(
        data: &str,
        default_origin: Option<&str>,
        mut resolver: R,
    ) -> Result<Self, Error> {
        let default_origin = default_origin
            .filter(|origin| !origin.is_empty())
            .map(String::from);

        let entries = extract_entries(data);
        let mut zone = Zone::empty();
        let context = ParseContext {
            default_origin: default_origin.clone(),
            ..Default::default()
        };

        load_entries(&entries, &mut zone, &mut resolver, context)?;

        if zone.origin.is_none() {
            zone.origin = default_origin;
        }

        Ok(zone)
    }

    /// Parse a string of zone data which must not use `$INCLUDE`.
    ///
    /// # Errors
    ///
    /// If the data has an `$INCLUDE` directive.
    pub fn load_str(data: &str, default_origin: Option<&str>) -> Result<Self, Error> {
        Self::load(data, default_origin, NoIncludes)
    }
}

/// Load already-extracted entries into a zone.
///
/// The context is taken by value: directives in the entries update
/// this call's copy, and each `$INCLUDE` gets a copy of its own, so
/// nothing an included file does is visible to the file including it
/// (other than the records and `$TTL` it adds to the zone).
///
/// # Errors
///
/// See `Zone::load`.
pub fn load_entries<'a, R: IncludeResolver + ?Sized>(
    entries: &[String],
    zone: &'a mut Zone,
    resolver: &mut R,
    mut context: ParseContext,
) -> Result<&'a mut Zone, Error> {
    for entry in entries {
        if let Some(directive) = parse_directive(entry) {
            match directive {
                Directive::Ttl(ttl) => {
                    tracing::trace!(%ttl, "$TTL");
                    zone.ttl = Some(ttl.to_string());
                }
                Directive::Origin(origin) => {
                    tracing::trace!(%origin, is_included = %context.is_included, "$ORIGIN");
                    if !context.is_included {
                        // only the first top-level $ORIGIN becomes
                        // the zone origin
                        if zone.origin.is_none() {
                            zone.origin = Some(origin.to_string());
                        }
                        if context.origin.is_none() {
                            context.origin = Some(origin.to_string());
                        }
                    }
                    context.last_origin = Some(origin.to_string());
                }
                Directive::Include { filename, origin } => {
                    load_include(filename, origin, zone, resolver, &context)?;
                }
            }
            continue;
        }

        match ResourceRecord::decode(entry, &context) {
            Some(rr) => {
                context.last_label.clone_from(&rr.label);
                zone.records.push(rr);
            }
            None => tracing::debug!(%entry, "skipping entry"),
        }
    }

    Ok(zone)
}

fn load_include<R: IncludeResolver + ?Sized>(
    filename: &str,
    origin: Option<&str>,
    zone: &mut Zone,
    resolver: &mut R,
    context: &ParseContext,
) -> Result<(), Error> {
    let _span = tracing::error_span!("include", %filename).entered();

    if context.includes.iter().any(|active| active == filename) {
        return Err(Error::IncludeCycle {
            filename: filename.to_string(),
            chain: context.includes.clone(),
        });
    }
    if context.includes.len() >= MAX_INCLUDE_DEPTH {
        return Err(Error::IncludeTooDeep {
            filename: filename.to_string(),
            depth: context.includes.len(),
        });
    }

    let data = resolver.resolve(filename).map_err(|error| Error::Include {
        filename: filename.to_string(),
        error,
    })?;
    let entries = extract_entries(&data);
    tracing::trace!(entries = %entries.len(), "loading included file");

    let mut included_context = context.clone();
    if let Some(origin) = origin {
        included_context.last_origin = Some(origin.to_string());
    }
    included_context.is_included = true;
    included_context.includes.push(filename.to_string());

    load_entries(&entries, zone, resolver, included_context)?;
    Ok(())
}

/// Parse a `$TTL`, `$ORIGIN`, or `$INCLUDE` directive.  A directive
/// with no operand is not a directive.
///
/// ```text
/// $TTL <ttl>
/// $ORIGIN <domain-name>
/// $INCLUDE <file-name> [<domain-name>]
/// ```
fn parse_directive(entry: &str) -> Option<Directive<'_>> {
    let entry = entry.trim();
    let (name, operand) = entry.split_once(char::is_whitespace)?;
    let operand = operand.trim();
    if operand.is_empty() {
        return None;
    }

    if name.eq_ignore_ascii_case("$TTL") {
        Some(Directive::Ttl(operand))
    } else if name.eq_ignore_ascii_case("$ORIGIN") {
        Some(Directive::Origin(operand))
    } else if name.eq_ignore_ascii_case("$INCLUDE") {
        let mut operands = operand.split_whitespace();
        let filename = operands.next()?;
        Some(Directive::Include {
            filename,
            origin: operands.next(),
        })
    } else {
        None
    }
}

/// A control entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive<'a> {
    Ttl(&'a str),
    Origin(&'a str),
    Include {
        filename: &'a str,
        origin: Option<&'a str>,
    },
}

/// State carried from one entry to the next while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    /// The origin given to `Zone::load`, if any.
    pub default_origin: Option<String>,

    /// The first top-level `$ORIGIN`: the origin labels are made
    /// relative to.
    pub origin: Option<String>,

    /// The most recent `$ORIGIN`, or the origin given to the
    /// `$INCLUDE` which is being loaded.
    pub last_origin: Option<String>,

    /// The label of the most recent record, for entries which leave
    /// it blank.
    pub last_label: Option<String>,

    /// Whether this is the context of an included file.
    pub is_included: bool,

    /// The chain of `$INCLUDE` file names being loaded, outermost
    /// first.
    pub includes: Vec<String>,
}

impl ParseContext {
    /// The origin relative names in rdata are qualified against:
    /// `last_origin`, unless that is missing or `@`, in which case
    /// `default_origin`.
    pub fn qualifying_origin(&self) -> Option<&str> {
        match self.last_origin.as_deref() {
            Some(origin) if !origin.is_empty() && origin != "@" => Some(origin),
            _ => self.default_origin.as_deref().filter(|o| !o.is_empty()),
        }
    }

    /// What has to be appended to a label so that it is relative to
    /// the zone origin rather than to `last_origin`.  `None` if
    /// `last_origin` is the zone origin.  If `last_origin` is not
    /// under the zone origin, this is `last_origin` itself, making
    /// labels absolute.
    pub fn unrolled_origin(&self) -> Option<String> {
        let last = self
            .last_origin
            .as_deref()
            .filter(|o| !o.is_empty() && *o != "@")?;
        let Some(base) = self.origin.as_deref().or(self.default_origin.as_deref()) else {
            return Some(last.to_string());
        };

        let last_trimmed = last.trim_end_matches('.').to_ascii_lowercase();
        let base_trimmed = base.trim_end_matches('.').to_ascii_lowercase();
        if last_trimmed == base_trimmed {
            None
        } else if let Some(prefix) = last_trimmed.strip_suffix(&format!(".{base_trimmed}")) {
            // keep the original case of the prefix
            Some(last[..prefix.len()].to_string())
        } else {
            Some(last.to_string())
        }
    }
}

/// Something which can turn the file name in an `$INCLUDE` directive
/// into the contents of that file.
pub trait IncludeResolver {
    /// # Errors
    ///
    /// If the file cannot be found or read.
    fn resolve(&mut self, filename: &str) -> io::Result<String>;
}

impl<F: FnMut(&str) -> io::Result<String>> IncludeResolver for F {
    fn resolve(&mut self, filename: &str) -> io::Result<String> {
        self(filename)
    }
}

/// An `IncludeResolver` which refuses every include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(&mut self, _filename: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "'$INCLUDE' directive not supported",
        ))
    }
}

/// An error that can occur loading a zone file.
#[derive(Debug)]
pub enum Error {
    Include {
        filename: String,
        error: io::Error,
    },
    IncludeCycle {
        filename: String,
        chain: Vec<String>,
    },
    IncludeTooDeep {
        filename: String,
        depth: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Include { filename, error } => {
                write!(f, "could not include '{filename}': {error}")
            }
            Error::IncludeCycle { filename, chain } => {
                write!(
                    f,
                    "'$INCLUDE' cycle: '{filename}' is already being included via {chain:?}"
                )
            }
            Error::IncludeTooDeep { filename, depth } => {
                write!(
                    f,
                    "could not include '{filename}': already {depth} includes deep"
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Include { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolver(files: &[(&str, &str)]) -> impl FnMut(&str) -> io::Result<String> {
        let files = files
            .iter()
            .map(|(name, data)| (name.to_string(), data.to_string()))
            .collect::<HashMap<String, String>>();
        move |filename: &str| {
            files
                .get(filename)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, filename.to_string()))
        }
    }

    fn labels(zone: &Zone) -> Vec<Option<&str>> {
        zone.records.iter().map(|rr| rr.label.as_deref()).collect()
    }

    #[test]
    fn parse_directive_all() {
        assert_eq!(Some(Directive::Ttl("3600")), parse_directive("$TTL 3600"));
        assert_eq!(
            Some(Directive::Origin("example.com.")),
            parse_directive("$ORIGIN  example.com.")
        );
        assert_eq!(
            Some(Directive::Include {
                filename: "hosts.zone",
                origin: None
            }),
            parse_directive("$INCLUDE hosts.zone")
        );
        assert_eq!(
            Some(Directive::Include {
                filename: "hosts.zone",
                origin: Some("lan.example.com.")
            }),
            parse_directive("$INCLUDE hosts.zone lan.example.com.")
        );
    }

    #[test]
    fn parse_directive_needs_operand() {
        assert_eq!(None, parse_directive("$TTL"));
        assert_eq!(None, parse_directive("$ORIGIN   "));
        assert_eq!(None, parse_directive("$GENERATE 1-10 host$ A 10.0.0.$"));
        assert_eq!(None, parse_directive("www IN A 10.0.0.1"));
    }

    #[test]
    fn load_sets_ttl_and_origin() {
        let zone = Zone::load_str(
            "$TTL 1h\n$ORIGIN example.com.\n@ IN NS ns1\n",
            Some("fallback.org."),
        )
        .unwrap();
        assert_eq!(Some("1h".to_string()), zone.ttl);
        assert_eq!(Some("example.com.".to_string()), zone.origin);
        assert_eq!(1, zone.records.len());
    }

    #[test]
    fn load_first_origin_wins() {
        let zone = Zone::load_str(
            "$ORIGIN example.com.\n$ORIGIN example.net.\nwww IN A 10.0.0.1\n",
            None,
        )
        .unwrap();
        assert_eq!(Some("example.com.".to_string()), zone.origin);
        assert_eq!(vec![Some("www.example.net.")], labels(&zone));
    }

    #[test]
    fn load_root_origin_makes_labels_absolute() {
        let zone = Zone::load_str(
            "$ORIGIN example.com.\n$ORIGIN .\nwww IN A 10.0.0.1\n@ IN NS ns1\n",
            None,
        )
        .unwrap();
        assert_eq!(Some("example.com.".to_string()), zone.origin);
        assert_eq!(vec![Some("www."), Some(".")], labels(&zone));
    }

    #[test]
    fn load_falls_back_to_default_origin() {
        let zone = Zone::load_str("@ IN CNAME www\n", Some("example.org.")).unwrap();
        assert_eq!(Some("example.org.".to_string()), zone.origin);
        assert_eq!(
            RecordTypeWithData::CNAME {
                domainname: "www.example.org.".to_string()
            },
            zone.records[0].rtype_with_data
        );

        let zone = Zone::load_str("@ IN A 10.0.0.1\n", Some("")).unwrap();
        assert_eq!(None, zone.origin);
    }

    #[test]
    fn load_starts_empty() {
        let zone = Zone::load_str("", None).unwrap();
        assert!(zone.records.is_empty());
        assert_eq!(None, zone.ttl);
        assert_eq!(None, zone.origin);
    }

    #[test]
    fn load_inherits_labels() {
        let zone = Zone::load_str(
            "mail IN A 10.0.0.1\n     IN AAAA ::1\n     IN MX 10 mail\nwww IN A 10.0.0.2\n",
            None,
        )
        .unwrap();
        assert_eq!(
            vec![Some("mail"), Some("mail"), Some("mail"), Some("www")],
            labels(&zone)
        );
    }

    #[test]
    fn load_skips_bad_entries() {
        let zone = Zone::load_str(
            "www IN A 10.0.0.1\n\
             bad IN A not-an-address\n\
             key IN DNSKEY 256 3 8 AwEAAb\n\
             nonsense\n\
             ftp IN A 10.0.0.2\n",
            None,
        )
        .unwrap();
        assert_eq!(vec![Some("www"), Some("ftp")], labels(&zone));
    }

    #[test]
    fn load_skipped_entry_does_not_change_last_label() {
        let zone = Zone::load_str("www IN A 10.0.0.1\nbad IN A nope\n  IN A 10.0.0.2\n", None)
            .unwrap();
        assert_eq!(vec![Some("www"), Some("www")], labels(&zone));
    }

    #[test]
    fn load_include() {
        let zone = Zone::load(
            "$ORIGIN example.com.\n@ IN NS ns1\n$INCLUDE hosts.zone\nftp IN A 10.0.0.3\n",
            None,
            resolver(&[("hosts.zone", "www IN A 10.0.0.1\nmail IN A 10.0.0.2\n")]),
        )
        .unwrap();
        assert_eq!(
            vec![Some("@"), Some("www"), Some("mail"), Some("ftp")],
            labels(&zone)
        );
    }

    #[test]
    fn load_include_with_origin() {
        let zone = Zone::load(
            "$ORIGIN example.com.\n$INCLUDE lan.zone lan.example.com.\nalias IN CNAME www\n",
            None,
            resolver(&[("lan.zone", "www IN A 10.0.0.1\nprinter IN CNAME www\n")]),
        )
        .unwrap();

        assert_eq!(Some("example.com.".to_string()), zone.origin);
        assert_eq!(
            vec![Some("www.lan"), Some("printer.lan"), Some("alias")],
            labels(&zone)
        );
        assert_eq!(
            RecordTypeWithData::CNAME {
                domainname: "www.lan.example.com.".to_string()
            },
            zone.records[1].rtype_with_data
        );
        // the include's origin does not leak back out
        assert_eq!(
            RecordTypeWithData::CNAME {
                domainname: "www.example.com.".to_string()
            },
            zone.records[2].rtype_with_data
        );
    }

    #[test]
    fn load_included_origin_does_not_override_zone_origin() {
        let zone = Zone::load(
            "$ORIGIN example.com.\n$INCLUDE other.zone\n",
            None,
            resolver(&[(
                "other.zone",
                "$ORIGIN sub.example.com.\nalias IN CNAME www\n",
            )]),
        )
        .unwrap();

        assert_eq!(Some("example.com.".to_string()), zone.origin);
        assert_eq!(
            RecordTypeWithData::CNAME {
                domainname: "www.sub.example.com.".to_string()
            },
            zone.records[0].rtype_with_data
        );
        assert_eq!(Some("alias.sub"), zone.records[0].label.as_deref());
    }

    #[test]
    fn load_included_origin_is_not_zone_origin_even_if_unset() {
        let zone = Zone::load(
            "$INCLUDE other.zone\n",
            Some("example.com."),
            resolver(&[("other.zone", "$ORIGIN sub.example.com.\nwww IN A 10.0.0.1\n")]),
        )
        .unwrap();

        assert_eq!(Some("example.com.".to_string()), zone.origin);
        assert_eq!(Some("www.sub"), zone.records[0].label.as_deref());
    }

    #[test]
    fn load_included_ttl_applies_to_zone() {
        let zone = Zone::load(
            "$TTL 1h\n$INCLUDE other.zone\n",
            None,
            resolver(&[("other.zone", "$TTL 5m\nwww IN A 10.0.0.1\n")]),
        )
        .unwrap();
        assert_eq!(Some("5m".to_string()), zone.ttl);
    }

    #[test]
    fn load_include_missing_file() {
        let result = Zone::load("$INCLUDE missing.zone\n", None, resolver(&[]));
        match result {
            Err(Error::Include { filename, error }) => {
                assert_eq!("missing.zone", filename);
                assert_eq!(io::ErrorKind::NotFound, error.kind());
            }
            other => panic!("expected include error, got {other:?}"),
        }
    }

    #[test]
    fn load_str_refuses_includes() {
        assert!(matches!(
            Zone::load_str("$INCLUDE other.zone\n", None),
            Err(Error::Include { .. })
        ));
    }

    #[test]
    fn load_include_cycle() {
        let result = Zone::load(
            "$INCLUDE a.zone\n",
            None,
            resolver(&[
                ("a.zone", "a IN A 10.0.0.1\n$INCLUDE b.zone\n"),
                ("b.zone", "b IN A 10.0.0.2\n$INCLUDE a.zone\n"),
            ]),
        );
        match result {
            Err(Error::IncludeCycle { filename, chain }) => {
                assert_eq!("a.zone", filename);
                assert_eq!(vec!["a.zone".to_string(), "b.zone".to_string()], chain);
            }
            other => panic!("expected include cycle, got {other:?}"),
        }
    }

    #[test]
    fn load_include_same_file_twice_is_not_a_cycle() {
        let zone = Zone::load(
            "$INCLUDE a.zone\n$INCLUDE a.zone\n",
            None,
            resolver(&[("a.zone", "a IN A 10.0.0.1\n")]),
        )
        .unwrap();
        assert_eq!(2, zone.records.len());
    }

    #[test]
    fn load_include_too_deep() {
        let mut files = Vec::new();
        for i in 0..=MAX_INCLUDE_DEPTH {
            files.push((format!("{i}.zone"), format!("$INCLUDE {}.zone\n", i + 1)));
        }
        let files = files
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_str()))
            .collect::<Vec<_>>();

        assert!(matches!(
            Zone::load("$INCLUDE 0.zone\n", None, resolver(&files)),
            Err(Error::IncludeTooDeep { depth: MAX_INCLUDE_DEPTH, .. })
        ));
    }

    #[test]
    fn load_entries_does_not_share_context_between_includes() {
        let mut zone = Zone::empty();
        let entries = vec![
            "$INCLUDE first.zone".to_string(),
            "$INCLUDE second.zone".to_string(),
        ];
        let mut files = resolver(&[
            ("first.zone", "$ORIGIN first.example.com.\nalias IN CNAME www\n"),
            ("second.zone", "alias IN CNAME www\n"),
        ]);
        let context = ParseContext {
            origin: Some("example.com.".to_string()),
            last_origin: Some("example.com.".to_string()),
            ..Default::default()
        };

        load_entries(&entries, &mut zone, &mut files, context).unwrap();

        assert_eq!(
            RecordTypeWithData::CNAME {
                domainname: "www.first.example.com.".to_string()
            },
            zone.records[0].rtype_with_data
        );
        assert_eq!(
            RecordTypeWithData::CNAME {
                domainname: "www.example.com.".to_string()
            },
            zone.records[1].rtype_with_data
        );
    }

    #[test]
    fn unrolled_origin_cases() {
        let mut context = ParseContext {
            origin: Some("example.com.".to_string()),
            ..Default::default()
        };
        assert_eq!(None, context.unrolled_origin());

        context.last_origin = Some("EXAMPLE.com.".to_string());
        assert_eq!(None, context.unrolled_origin());

        context.last_origin = Some("A.b.example.com.".to_string());
        assert_eq!(Some("A.b".to_string()), context.unrolled_origin());

        context.last_origin = Some("example.net.".to_string());
        assert_eq!(Some("example.net.".to_string()), context.unrolled_origin());

        context.last_origin = Some("@".to_string());
        assert_eq!(None, context.unrolled_origin());
    }
}
