//! Pattern tables for rejecting non-prose text.
//!
//! Every check here is independently sufficient to reject a string. The
//! tables lean towards precision: a missed sentence is cheap to fix in
//! review, a CSS class in a catalog is not.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use super::SkipReason;

// ============================================================
// Structural shapes
// ============================================================

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z][a-z0-9+.-]*://|//|www\.|mailto:|tel:|sms:|data:|blob:|javascript:)\S+$")
        .unwrap()
});

static LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:true|false|null|undefined|NaN|Infinity)$").unwrap());

static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);\s*)+$").unwrap()
});

static CSS_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:--[A-Za-z0-9_-]+|var\(\s*--[A-Za-z0-9_-]+\s*(?:,[^)]*)?\))$").unwrap()
});

const UNIT: &str = r"(?:px|em|rem|%|vh|vw|vmin|vmax|dvh|svh|lvh|ms|s|deg|rad|turn|pt|pc|cm|mm|in|fr|ch|ex|x)";

static NUMERIC_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    let number = r"-?(?:\d+(?:\.\d+)?|\.\d+)";
    Regex::new(&format!(r"^{number}{UNIT}?(?:\s+{number}{UNIT}?)*$")).unwrap()
});

static CODE_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&&|\|\||===|!==|==|=>").unwrap());

static CODE_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"(?:const|let|var)\s+[\w$]+\s*=",
        r"|(?:async\s+)?function\b\s*[\w$]*\s*\(",
        r"|(?:import|export)\s+(?:\{|\*|default\b|type\b|const\b|function\b)",
        r"|typeof\s+[\w$.]+",
        r"|[\w$]+(?:\.[\w$]+)*\([^()]*\)\s*;?$",
        r")",
    ))
    .unwrap()
});

static THIS_ACCESS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bthis\.[\w$]+").unwrap());

static SVG_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Mm]\s*-?[\d.][\d\sMmLlHhVvCcSsQqTtAaZz.,eE+-]*$").unwrap());

static ICON_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*:[a-z0-9]+(?:[-_][a-z0-9]+)*$").unwrap()
});

static CONSTANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]*(?:_[A-Z0-9]+)+$").unwrap());

static CAMEL_OR_SNAKE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)+|[a-z][a-z0-9]*(?:_[a-z0-9]+)+)$").unwrap()
});

static DOTTED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$-]*(?:\.[A-Za-z_$][\w$-]*){2,}$").unwrap()
});

static FONT_GENERIC_FAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?:^|,)\s*(?:serif|sans-serif|monospace|cursive|fantasy|system-ui|",
        r"ui-sans-serif|ui-serif|ui-monospace|ui-rounded|-apple-system|blinkmacsystemfont|emoji)\s*(?:,|$)",
    ))
    .unwrap()
});

static KEYWORD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS|CONNECT|TRACE|",
        r"_blank|_self|_parent|_top|noopener|noreferrer|nofollow|noopener noreferrer)$",
    ))
    .unwrap()
});

// ============================================================
// Utility-class heuristic
// ============================================================

static CLASS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!?-?[a-z0-9@][a-z0-9:/._%\[\]()#,'-]*$").unwrap());

static BRACKETED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\d[^\]]*\]").unwrap());

static VARIANT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9-]+(?:\[[^\]]*\])?:)+[a-z0-9!-]").unwrap()
});

static STYLING_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^-?(?:p|px|py|pt|pb|pl|pr|ps|pe|m|mx|my|mt|mb|ml|mr|ms|me|w|h|min-w|min-h|max-w|max-h|size|",
        r"text|bg|border|border-[trblxy]|rounded|rounded-[trbl]{1,2}|flex|grid|gap|gap-x|gap-y|space-x|space-y|",
        r"items|justify|font|leading|tracking|shadow|opacity|z|top|left|right|bottom|inset|inset-x|inset-y|",
        r"overflow|overflow-x|overflow-y|col|col-span|row|row-span|order|cursor|transition|duration|delay|ease|",
        r"ring|ring-offset|outline|fill|stroke|divide|divide-x|divide-y|translate-x|translate-y|rotate|scale|",
        r"animate|aspect|basis|grow|shrink|line-clamp|decoration|whitespace|pointer-events|backdrop|blur|",
        r"grid-cols|grid-rows|auto-cols|auto-rows|object|sr|list|align|break)",
        r"-(?:(?:\d+(?:\.\d+)?|xs|sm|md|lg|xl|\dxl|full|auto|none|screen|px|center|start|end|between|around|",
        r"evenly|stretch|baseline|col|row|wrap|nowrap|hidden|visible|scroll|clip|bold|semibold|medium|normal|",
        r"light|thin|extrabold|black|white|transparent|current|inherit|primary|secondary|muted|accent|",
        r"foreground|background|destructive|card|popover|border|input|ring|spin|pulse|bounce|ping|pointer|",
        r"left|right|top|bottom|x|y|t|b|l|r|red|orange|amber|yellow|lime|green|emerald|teal|cyan|sky|blue|",
        r"indigo|violet|purple|fuchsia|pink|rose|slate|gray|grey|zinc|neutral|stone)(?:[-/]|$)|\[)",
    ))
    .unwrap()
});

static UTILITY_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "flex",
        "grid",
        "block",
        "inline",
        "inline-block",
        "inline-flex",
        "inline-grid",
        "hidden",
        "contents",
        "relative",
        "absolute",
        "fixed",
        "sticky",
        "static",
        "underline",
        "italic",
        "uppercase",
        "lowercase",
        "capitalize",
        "truncate",
        "container",
        "rounded",
        "shadow",
        "border",
        "transition",
        "grow",
        "shrink",
        "invisible",
        "visible",
        "antialiased",
        "sr-only",
        "prose",
        "isolate",
        "btn",
        "outline",
        "clearfix",
    ]
    .into_iter()
    .collect()
});

/// Space-separated token lists that look like utility/styling classes.
///
/// All tokens must be class-shaped (lowercase, no sentence punctuation).
/// Then any bracketed numeric token is enough; three or more tokens need at
/// least one strong styling token; shorter lists need a styling majority.
pub fn is_utility_class_list(text: &str) -> bool {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() || !tokens.iter().all(|t| CLASS_TOKEN.is_match(t)) {
        return false;
    }
    if tokens.iter().any(|t| BRACKETED_NUMBER.is_match(t)) {
        return true;
    }

    let strong = tokens.iter().filter(|t| is_strong_styling_token(t)).count();
    let weak = tokens.iter().filter(|t| UTILITY_WORDS.contains(*t)).count();

    if tokens.len() >= 3 {
        strong >= 1
    } else {
        (strong + weak) * 2 > tokens.len()
    }
}

fn is_strong_styling_token(token: &str) -> bool {
    let token = token.trim_start_matches('!');
    VARIANT_PREFIX.is_match(token) || STYLING_PREFIX.is_match(token)
}

/// Runs of one repeated punctuation/symbol character: `...`, `---`, `***`.
fn is_repeated_punctuation(text: &str) -> bool {
    let mut chars = text.chars().filter(|c| !c.is_whitespace());
    let Some(first) = chars.next() else {
        return false;
    };
    if first.is_alphanumeric() {
        return false;
    }
    let mut count = 1;
    for c in chars {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 2
}

/// Returns the first structural reason that disqualifies `text`, if any.
pub fn structural_rejection(text: &str) -> Option<SkipReason> {
    if URL.is_match(text) {
        return Some(SkipReason::Url);
    }
    if LITERAL.is_match(text) {
        return Some(SkipReason::Literal);
    }
    if HTML_ENTITY.is_match(text) {
        return Some(SkipReason::HtmlEntity);
    }
    if CSS_VARIABLE.is_match(text) {
        return Some(SkipReason::CssVariable);
    }
    if NUMERIC_UNIT.is_match(text) && text.chars().any(|c| c.is_alphabetic() || c == '%') {
        return Some(SkipReason::NumericUnit);
    }
    if is_repeated_punctuation(text) {
        return Some(SkipReason::RepeatedPunctuation);
    }
    if CODE_OPERATOR.is_match(text) || CODE_STATEMENT.is_match(text) || THIS_ACCESS.is_match(text)
    {
        return Some(SkipReason::CodeFragment);
    }
    if ICON_IDENTIFIER.is_match(text) {
        return Some(SkipReason::IconIdentifier);
    }
    if is_utility_class_list(text) {
        return Some(SkipReason::UtilityClass);
    }
    if text.len() >= 10 && SVG_PATH.is_match(text) && text.chars().filter(char::is_ascii_digit).count() >= 2
    {
        return Some(SkipReason::SvgPath);
    }
    if CONSTANT.is_match(text) {
        return Some(SkipReason::Constant);
    }
    if CAMEL_OR_SNAKE_IDENTIFIER.is_match(text) {
        return Some(SkipReason::Identifier);
    }
    if DOTTED_KEY.is_match(text) {
        return Some(SkipReason::CatalogKey);
    }
    if text.contains(',') && FONT_GENERIC_FAMILY.is_match(text) {
        return Some(SkipReason::FontFamily);
    }
    if KEYWORD_TOKEN.is_match(text) {
        return Some(SkipReason::KeywordToken);
    }
    None
}

// ============================================================
// Attribute context
// ============================================================

static NON_TEXT_ATTRIBUTES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "style",
        "class",
        "classname",
        "class:list",
        "viewbox",
        "d",
        "path",
        "points",
        "transform",
        "xmlns",
        "fill",
        "stroke",
        "stroke-width",
        "strokewidth",
        "preserveaspectratio",
        "key",
        "ref",
        "id",
        "for",
        "htmlfor",
        "data-testid",
        "tabindex",
        "role",
        "lang",
        "dir",
        "slot",
        "charset",
        "crossorigin",
        "integrity",
        "media",
    ]
    .into_iter()
    .collect()
});

static TYPE_ATTRIBUTES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["type", "inputmode", "autocomplete", "enterkeyhint"]
        .into_iter()
        .collect()
});

static INPUT_TYPE_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "text",
        "password",
        "email",
        "number",
        "tel",
        "url",
        "search",
        "date",
        "time",
        "datetime-local",
        "month",
        "week",
        "color",
        "checkbox",
        "radio",
        "file",
        "hidden",
        "submit",
        "reset",
        "button",
        "image",
        "range",
        "numeric",
        "decimal",
        "none",
        "on",
        "off",
        "name",
        "username",
        "current-password",
        "new-password",
        "one-time-code",
        "given-name",
        "family-name",
        "street-address",
        "postal-code",
        "country",
        "organization",
        "enter",
        "done",
        "go",
        "next",
        "previous",
        "send",
    ]
    .into_iter()
    .collect()
});

static LINK_ATTRIBUTES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "href",
        "src",
        "srcset",
        "to",
        "action",
        "formaction",
        "poster",
        "cite",
        "background",
        "data",
        "xlink:href",
    ]
    .into_iter()
    .collect()
});

static RELATIVE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(?:\.{1,2}/|/|#|\?)\S*",
        r"|[\w-]+(?:/[\w.-]+)+/?",
        r"|[\w-]+\.(?:html?|php|png|jpe?g|svg|gif|webp|ico|pdf|json|css|js))$",
    ))
    .unwrap()
});

/// Returns the reason an attribute's value should not be extracted, if any.
pub fn context_rejection(attribute: &str, text: &str) -> Option<SkipReason> {
    let name = attribute.to_ascii_lowercase();
    let name = name.trim_start_matches(':');

    if NON_TEXT_ATTRIBUTES.contains(name) {
        return Some(SkipReason::NonTextAttribute);
    }
    if TYPE_ATTRIBUTES.contains(name) && INPUT_TYPE_KEYWORDS.contains(text.to_ascii_lowercase().as_str()) {
        return Some(SkipReason::InputType);
    }
    if LINK_ATTRIBUTES.contains(name) && RELATIVE_PATH.is_match(text) {
        return Some(SkipReason::RelativePath);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_class_lists() {
        assert!(is_utility_class_list("flex items-center gap-2"));
        assert!(is_utility_class_list("hover:bg-blue-500 text-white"));
        assert!(is_utility_class_list("w-[320px]"));
        assert!(is_utility_class_list("flex"));
        assert!(is_utility_class_list("md:grid-cols-3 grid"));

        assert!(!is_utility_class_list("Read the docs"));
        assert!(!is_utility_class_list("read more here"));
        assert!(!is_utility_class_list("top-rated products list"));
        assert!(!is_utility_class_list("Hello, world!"));
        assert!(!is_utility_class_list("block the user"));
    }

    #[test]
    fn test_repeated_punctuation() {
        assert!(is_repeated_punctuation("..."));
        assert!(is_repeated_punctuation("- - -"));
        assert!(is_repeated_punctuation("***"));
        assert!(!is_repeated_punctuation("-"));
        assert!(!is_repeated_punctuation("?!"));
        assert!(!is_repeated_punctuation("aaa"));
    }

    #[test]
    fn test_structural_rejections() {
        let cases = [
            ("https://example.com/docs", SkipReason::Url),
            ("mailto:team@example.com", SkipReason::Url),
            ("undefined", SkipReason::Literal),
            ("&nbsp;", SkipReason::HtmlEntity),
            ("&copy; &amp;", SkipReason::HtmlEntity),
            ("--primary-color", SkipReason::CssVariable),
            ("var(--gap, 4px)", SkipReason::CssVariable),
            ("12px", SkipReason::NumericUnit),
            ("0 4px 1.5rem", SkipReason::NumericUnit),
            ("isOpen && count", SkipReason::CodeFragment),
            ("(a) => a + 1", SkipReason::CodeFragment),
            ("const x = 1", SkipReason::CodeFragment),
            ("getValue()", SkipReason::CodeFragment),
            ("M12 2L2 7l10 5 10-5-10-5z", SkipReason::SvgPath),
            ("mdi:account-circle", SkipReason::IconIdentifier),
            ("MAX_RETRY_COUNT", SkipReason::Constant),
            ("userName", SkipReason::Identifier),
            ("user_name", SkipReason::Identifier),
            ("app.header.title", SkipReason::CatalogKey),
            ("Inter, system-ui, sans-serif", SkipReason::FontFamily),
            ("POST", SkipReason::KeywordToken),
            ("_blank", SkipReason::KeywordToken),
        ];
        for (text, expected) in cases {
            assert_eq!(structural_rejection(text), Some(expected), "text: {text}");
        }
    }

    #[test]
    fn test_prose_passes_structural_checks() {
        for text in [
            "Hello, world!",
            "Sign in to continue",
            "Loading...",
            "OK",
            "e.g. your company name",
            "Terms & Conditions",
            "Don't have an account?",
            "Step 1 of 3",
            "Visit https://example.com for details",
        ] {
            assert_eq!(structural_rejection(text), None, "text: {text}");
        }
    }

    #[test]
    fn test_context_rejections() {
        assert_eq!(
            context_rejection("className", "Primary action"),
            Some(SkipReason::NonTextAttribute)
        );
        assert_eq!(context_rejection("viewBox", "0 0 24 24"), Some(SkipReason::NonTextAttribute));
        assert_eq!(context_rejection("type", "password"), Some(SkipReason::InputType));
        assert_eq!(context_rejection("type", "Fancy widget"), None);
        assert_eq!(context_rejection("href", "/settings/profile"), Some(SkipReason::RelativePath));
        assert_eq!(context_rejection("href", "#top"), Some(SkipReason::RelativePath));
        assert_eq!(context_rejection("title", "/settings/profile"), None);
        assert_eq!(context_rejection("placeholder", "Enter your name"), None);
    }
}
