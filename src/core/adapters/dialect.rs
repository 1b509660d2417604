//! Per-dialect rewrite syntax.

use crate::core::candidate::SpanKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Jsx,
    Vue,
    Svelte,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Jsx => "jsx",
            Dialect::Vue => "vue",
            Dialect::Svelte => "svelte",
        }
    }

    /// Name of the access function as written in this dialect's templates.
    ///
    /// Template dialects reach the function through the `$` store/global
    /// prefix (`$t`); dotted paths and already prefixed names are kept.
    pub fn call_name(self, translation_fn: &str) -> String {
        match self {
            Dialect::Jsx => translation_fn.to_string(),
            Dialect::Vue | Dialect::Svelte => {
                if translation_fn.starts_with('$') || translation_fn.contains('.') {
                    translation_fn.to_string()
                } else {
                    format!("${}", translation_fn)
                }
            }
        }
    }

    /// Span kind used for static attribute values.
    pub fn attribute_span_kind(self) -> SpanKind {
        match self {
            Dialect::Vue => SpanKind::Attribute,
            Dialect::Jsx | Dialect::Svelte => SpanKind::AttributeValue,
        }
    }

    /// Wraps `call` in the syntax the replaced span needs.
    ///
    /// `attribute` is only used for whole-attribute replacements.
    pub fn render(self, span_kind: SpanKind, call: &str, attribute: Option<&str>) -> String {
        match (self, span_kind) {
            (_, SpanKind::Code) => call.to_string(),
            (Dialect::Vue, SpanKind::Markup) => format!("{{{{ {} }}}}", call),
            (_, SpanKind::Markup) | (_, SpanKind::AttributeValue) => format!("{{{}}}", call),
            (_, SpanKind::Attribute) => {
                let name = attribute.unwrap_or_default().trim_start_matches(':');
                match self {
                    Dialect::Vue => format!(":{}=\"{}\"", name, call),
                    Dialect::Jsx | Dialect::Svelte => format!("{}={{{}}}", name, call),
                }
            }
        }
    }

    /// Elements whose content is never prose.
    pub fn is_skipped_element(self, tag: &str) -> bool {
        tag.eq_ignore_ascii_case("style") || tag.eq_ignore_ascii_case("script")
    }

    /// Delimiters of a markup interpolation region.
    pub fn interpolation_delimiters(self) -> (&'static str, &'static str) {
        match self {
            Dialect::Vue => ("{{", "}}"),
            Dialect::Jsx | Dialect::Svelte => ("{", "}"),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
