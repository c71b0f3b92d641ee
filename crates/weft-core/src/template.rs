//! `{{ path }}` text templates.
//!
//! A [`Template`] is parsed once into a list of literal runs and
//! interpolation markers, then rendered any number of times against a
//! data tree. Rendering is infallible and pure: the same template over
//! the same tree always produces the same string, and every failure mode
//! degrades into visible output instead of an error.
//!
//! # Marker grammar
//!
//! A marker is `{{`, an inner expression containing no `{` or `}`, then
//! `}}`. Scanning is non-overlapping and left-to-right. Two edge cases
//! are part of the stable syntax:
//!
//! - a `{{` whose candidate body runs into a stray brace before `}}` is
//!   not a marker; its first `{` is emitted literally and scanning
//!   resumes one character later (so `{{{x}}}` renders as `{`,
//!   substitution, `}`),
//! - a `{{` with no closing `}}` is left untouched in the output.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unresolved path | Missing key at any step | Marker left verbatim |
//! | Non-scalar value | Path reached a container | Compact literal form |
//! | Unterminated marker | No `}}` before end | Source preserved |
//! | Empty expression | `{{}}` or `{{ }}` | Never resolves; verbatim |

use crate::path::KeyPath;
use crate::resolve::Resolve;

/// One precompiled piece of a template.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// A literal run, emitted as-is.
    Literal(String),
    /// An interpolation marker. `raw` is the inner text exactly as it
    /// appeared (so an unresolved marker can be reproduced verbatim);
    /// `path` is its parsed form.
    Marker { raw: String, path: KeyPath },
}

/// An immutable, precompiled text template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source` into literal runs and markers. Never fails: text
    /// that does not form a well-shaped marker stays literal.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut cursor = 0;

        while let Some(found) = source[cursor..].find("{{") {
            let open = cursor + found;
            literal.push_str(&source[cursor..open]);
            let body_start = open + 2;
            match scan_marker_body(&source[body_start..]) {
                Some(body_len) => {
                    let raw = &source[body_start..body_start + body_len];
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Marker {
                        raw: raw.to_string(),
                        path: KeyPath::parse(raw),
                    });
                    cursor = body_start + body_len + 2;
                }
                None => {
                    // Stray brace or end of input: not a marker. Emit the
                    // first `{` and rescan from the next character.
                    literal.push('{');
                    cursor = open + 1;
                }
            }
        }
        literal.push_str(&source[cursor..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: source.to_string(),
            segments,
        }
    }

    /// Render against `root`, resolving every marker to full depth.
    ///
    /// Scalars substitute bare; containers substitute their compact
    /// literal form; an unresolved path leaves the marker verbatim.
    #[must_use]
    pub fn render<R: Resolve>(&self, root: &R) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Marker { raw, path } => match root.resolve_path(path) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        out.push_str("{{");
                        out.push_str(raw);
                        out.push_str("}}");
                    }
                },
            }
        }
        out
    }

    /// The original template text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed paths of all markers, in template order.
    pub fn markers(&self) -> impl Iterator<Item = &KeyPath> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Marker { path, .. } => Some(path),
            Segment::Literal(_) => None,
        })
    }

    /// Number of markers in the template.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers().count()
    }
}

/// Length of a well-formed marker body starting just after `{{`, or
/// `None` if a stray brace or end of input intervenes before `}}`.
///
/// Byte scanning is UTF-8-safe here: the scan only ever stops at ASCII
/// braces, which cannot occur inside a multi-byte sequence.
fn scan_marker_body(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'}' => {
                return if bytes.get(i + 1) == Some(&b'}') {
                    Some(i)
                } else {
                    None
                };
            }
            b'{' => return None,
            _ => i += 1,
        }
    }
    None
}
