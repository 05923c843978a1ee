//! Route template compilation.
//!
//! A template is split on `/` into segments. A segment wrapped in `{` and `}`
//! is a parameter; everything else is literal text.
//!
//! | Segment        | Kind                                   |
//! |----------------|----------------------------------------|
//! | `users`        | literal                                |
//! | `{id}`         | [`ParamKind::Any`]                     |
//! | `{id:i}`       | [`ParamKind::Int`]                     |
//! | `{name:a}`     | [`ParamKind::Alpha`]                   |
//! | `{slug:an}`    | [`ParamKind::AlphaNumeric`]            |
//! | `{rest:*}`     | [`ParamKind::Wildcard`], named         |
//! | `*rest`        | [`ParamKind::Wildcard`], named         |
//! | `*`            | [`ParamKind::Wildcard`], anonymous     |
//!
//! Unrecognized type tags fall back to [`ParamKind::Any`].

use crate::error::PatternError;

/// Name under which an anonymous `*` wildcard is captured.
pub const ANONYMOUS_WILDCARD: &str = "*";

/// The character class a parameter segment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// One or more ASCII digits.
    Int,
    /// One or more ASCII letters.
    Alpha,
    /// One or more ASCII letters or digits.
    AlphaNumeric,
    /// Any non-empty run of bytes other than `/`.
    Any,
    /// The non-empty remainder of the path, slashes included.
    Wildcard,
}

impl ParamKind {
    /// Order in which the matcher tries parameter branches at one trie node.
    pub const PRIORITY: [ParamKind; 5] = [
        ParamKind::Int,
        ParamKind::Alpha,
        ParamKind::AlphaNumeric,
        ParamKind::Any,
        ParamKind::Wildcard,
    ];

    /// Parses a type tag (the text after `:`).
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "i" => Self::Int,
            "a" => Self::Alpha,
            "an" => Self::AlphaNumeric,
            "*" => Self::Wildcard,
            _ => Self::Any,
        }
    }

    /// Returns the canonical tag, or `None` for [`ParamKind::Any`].
    #[must_use]
    pub const fn tag(self) -> Option<&'static str> {
        match self {
            Self::Int => Some("i"),
            Self::Alpha => Some("a"),
            Self::AlphaNumeric => Some("an"),
            Self::Any => None,
            Self::Wildcard => Some("*"),
        }
    }

    /// Index of this kind's reserved child slot in a trie node.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Int => 0,
            Self::Alpha => 1,
            Self::AlphaNumeric => 2,
            Self::Any => 3,
            Self::Wildcard => 4,
        }
    }

    /// Returns true if a single path segment satisfies this kind.
    ///
    /// Wildcards are not checked here; the matcher decides their extent.
    #[must_use]
    pub fn accepts(self, segment: &[u8]) -> bool {
        if segment.is_empty() {
            return false;
        }
        match self {
            Self::Int => segment.iter().all(u8::is_ascii_digit),
            Self::Alpha => segment.iter().all(u8::is_ascii_alphabetic),
            Self::AlphaNumeric => segment.iter().all(u8::is_ascii_alphanumeric),
            Self::Any | Self::Wildcard => !segment.contains(&b'/'),
        }
    }
}

/// One slash-delimited unit of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Exact text.
    Literal(String),
    /// A typed capture.
    Param {
        /// Parameter name; `None` for an anonymous `*`.
        name: Option<String>,
        /// Accepted character class.
        kind: ParamKind,
    },
}

impl Segment {
    /// Returns the parameter name if this is a named parameter.
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::Param { name, .. } => name.as_deref(),
            Self::Literal(_) => None,
        }
    }

    /// Returns true if this is a parameter (named or not).
    #[must_use]
    pub const fn is_param(&self) -> bool {
        matches!(self, Self::Param { .. })
    }
}

/// Options affecting template compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Allow wildcard segments before the end of the template.
    pub inner_wildcards: bool,
    /// Keep a trailing `/` as a final empty literal segment instead of
    /// dropping it.
    pub keep_trailing_slash: bool,
}

/// A compiled route template.
///
/// # Example
///
/// ```rust
/// use doze_router::{ParamKind, Pattern, Segment};
///
/// let pattern = Pattern::compile("/people/{id:i}/details/{name:a}").unwrap();
/// assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id", "name"]);
/// assert_eq!(
///     pattern.segments()[2],
///     Segment::Param { name: Some("id".into()), kind: ParamKind::Int }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    template: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compiles a template with default options (wildcards must be last).
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        Self::compile_with(template, CompileOptions::default())
    }

    /// Compiles a template.
    ///
    /// A single trailing slash is ignored unless
    /// [`CompileOptions::keep_trailing_slash`] is set, so by default `/users/`
    /// and `/users` compile to the same segments.
    pub fn compile_with(template: &str, options: CompileOptions) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Err(PatternError::Empty);
        }

        let body = match template.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() && !options.keep_trailing_slash => stripped,
            _ => template,
        };

        let raw: Vec<&str> = body.split('/').collect();
        let mut segments = Vec::with_capacity(raw.len());
        let mut seen: Vec<&str> = Vec::new();

        for (i, &part) in raw.iter().enumerate() {
            let segment = parse_segment(part, template)?;

            if let Segment::Param { name, kind } = &segment {
                if *kind == ParamKind::Wildcard && i + 1 != raw.len() && !options.inner_wildcards {
                    return Err(PatternError::WildcardNotLast {
                        template: template.to_string(),
                    });
                }
                if let Some(name) = name {
                    if seen.contains(&name.as_str()) {
                        return Err(PatternError::DuplicateParam {
                            template: template.to_string(),
                            name: name.clone(),
                        });
                    }
                    seen.push(param_name_in(part));
                }
            }

            segments.push(segment);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// The original template text.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled segments, left to right.
    ///
    /// The first segment is the (usually empty) text before the leading `/`.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Named parameters in left-to-right order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::param_name)
    }

    /// Number of named parameters.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.param_names().count()
    }

    /// Returns true if the template contains no parameters at all.
    #[must_use]
    pub fn is_static(&self) -> bool {
        !self.segments.iter().any(Segment::is_param)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}

fn parse_segment(part: &str, template: &str) -> Result<Segment, PatternError> {
    if part == ANONYMOUS_WILDCARD {
        return Ok(Segment::Param {
            name: None,
            kind: ParamKind::Wildcard,
        });
    }

    if let Some(name) = part.strip_prefix('*') {
        return Ok(Segment::Param {
            name: Some(name.to_string()),
            kind: ParamKind::Wildcard,
        });
    }

    let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
        return Ok(Segment::Literal(part.to_string()));
    };

    let (name, kind) = match inner.split_once(':') {
        Some((name, tag)) => (name, ParamKind::from_tag(tag)),
        None => (inner, ParamKind::Any),
    };

    if name.is_empty() {
        return Err(PatternError::EmptyParamName {
            template: template.to_string(),
        });
    }

    Ok(Segment::Param {
        name: Some(name.to_string()),
        kind,
    })
}

/// Extracts the name slice of a parameter segment already known to be named.
fn param_name_in(part: &str) -> &str {
    if let Some(name) = part.strip_prefix('*') {
        return name;
    }
    let inner = part.trim_start_matches('{').trim_end_matches('}');
    inner.split_once(':').map_or(inner, |(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, kind: ParamKind) -> Segment {
        Segment::Param {
            name: Some(name.to_string()),
            kind,
        }
    }

    #[test]
    fn test_compile_static() {
        let pattern = Pattern::compile("/users/list").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal(String::new()),
                Segment::Literal("users".to_string()),
                Segment::Literal("list".to_string()),
            ]
        );
        assert!(pattern.is_static());
        assert_eq!(pattern.param_count(), 0);
    }

    #[test]
    fn test_compile_type_tags() {
        let pattern = Pattern::compile("/{a}/{b:i}/{c:a}/{d:an}/{e:zz}").unwrap();
        assert_eq!(
            &pattern.segments()[1..],
            &[
                param("a", ParamKind::Any),
                param("b", ParamKind::Int),
                param("c", ParamKind::Alpha),
                param("d", ParamKind::AlphaNumeric),
                param("e", ParamKind::Any),
            ]
        );
    }

    #[test]
    fn test_compile_wildcards() {
        let named = Pattern::compile("/files/*path").unwrap();
        assert_eq!(named.segments()[2], param("path", ParamKind::Wildcard));

        let tagged = Pattern::compile("/files/{path:*}").unwrap();
        assert_eq!(tagged.segments()[2], param("path", ParamKind::Wildcard));

        let anonymous = Pattern::compile("/files/*").unwrap();
        assert_eq!(
            anonymous.segments()[2],
            Segment::Param {
                name: None,
                kind: ParamKind::Wildcard
            }
        );
        assert_eq!(anonymous.param_count(), 0);
    }

    #[test]
    fn test_compile_rejects_empty() {
        assert_eq!(Pattern::compile(""), Err(PatternError::Empty));
    }

    #[test]
    fn test_compile_rejects_inner_wildcard() {
        let err = Pattern::compile("/f/*/b/c").unwrap_err();
        assert!(matches!(err, PatternError::WildcardNotLast { .. }));

        let allowed = Pattern::compile_with(
            "/f/*/b/c",
            CompileOptions {
                inner_wildcards: true,
                ..CompileOptions::default()
            },
        );
        assert!(allowed.is_ok());
    }

    #[test]
    fn test_compile_rejects_duplicate_param() {
        let err = Pattern::compile("/a/{id}/b/{id:i}").unwrap_err();
        assert_eq!(
            err,
            PatternError::DuplicateParam {
                template: "/a/{id}/b/{id:i}".to_string(),
                name: "id".to_string(),
            }
        );
    }

    #[test]
    fn test_anonymous_wildcards_are_not_duplicates() {
        let options = CompileOptions {
            inner_wildcards: true,
            ..CompileOptions::default()
        };
        assert!(Pattern::compile_with("/foo/*/baz/*", options).is_ok());
    }

    #[test]
    fn test_trailing_slash_kept_on_request() {
        let loose = Pattern::compile("/users/").unwrap();
        assert_eq!(loose.segments(), Pattern::compile("/users").unwrap().segments());

        let options = CompileOptions {
            keep_trailing_slash: true,
            ..CompileOptions::default()
        };
        let strict = Pattern::compile_with("/users/", options).unwrap();
        assert_eq!(strict.segments().len(), 3);
        assert_eq!(strict.segments()[2], Segment::Literal(String::new()));
        assert!(strict.is_static());

        let root = Pattern::compile_with("/", options).unwrap();
        assert_eq!(root.segments().len(), 2);
    }

    #[test]
    fn test_compile_rejects_nameless_param() {
        let err = Pattern::compile("/a/{:i}").unwrap_err();
        assert!(matches!(err, PatternError::EmptyParamName { .. }));
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let a = Pattern::compile("/users/").unwrap();
        let b = Pattern::compile("/users").unwrap();
        assert_eq!(a.segments(), b.segments());
        assert_eq!(a.template(), "/users/");
    }

    #[test]
    fn test_root_template() {
        let root = Pattern::compile("/").unwrap();
        assert_eq!(
            root.segments(),
            &[Segment::Literal(String::new()), Segment::Literal(String::new())]
        );
    }

    #[test]
    fn test_kind_accepts() {
        assert!(ParamKind::Int.accepts(b"123"));
        assert!(!ParamKind::Int.accepts(b"12a"));
        assert!(ParamKind::Alpha.accepts(b"job"));
        assert!(!ParamKind::Alpha.accepts(b"job1"));
        assert!(ParamKind::AlphaNumeric.accepts(b"job1"));
        assert!(!ParamKind::AlphaNumeric.accepts(b"job-1"));
        assert!(ParamKind::Any.accepts(b"job-1.txt"));
        assert!(!ParamKind::Any.accepts(b""));
    }

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in ParamKind::PRIORITY {
            let tag = kind.tag().unwrap_or("");
            assert_eq!(ParamKind::from_tag(tag), kind);
        }
    }
}
