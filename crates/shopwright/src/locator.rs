//! Declarative element locators.
//!
//! A [`Locator`] is an immutable description of how to find elements on the
//! current page. It performs no I/O; resolution happens lazily through
//! [`Session::locate`](crate::Session::locate) every time an action or query
//! runs, so a locator built for one page keeps working across navigations and
//! fails loudly when its target is not there.
//!
//! Selector strategies:
//!
//! - **Css**: plain CSS selector (`input[data-qa="login-email"]`)
//! - **Text**: innermost element whose text contains a string
//! - **Role**: element with an ARIA role (implicit or explicit) and accessible name
//! - **Attribute**: element carrying `name="value"`
//! - **CssWithText**: CSS selector filtered by contained text (`p:has-text("...")`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css {
        /// The CSS expression
        css: String,
    },
    /// Innermost element containing the text
    Text {
        /// Text to look for
        text: String,
    },
    /// ARIA role with accessible name
    Role {
        /// Role name (link, button, heading, ...)
        role: String,
        /// Accessible name the element must contain
        name: String,
    },
    /// Attribute equality
    Attribute {
        /// Attribute name
        name: String,
        /// Attribute value
        value: String,
    },
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            css: selector.into(),
        }
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Create an attribute selector
    #[must_use]
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Compile to a JavaScript expression evaluating to the ordered array of
    /// matching elements.
    #[must_use]
    pub fn to_js_all(&self) -> String {
        match self {
            Self::Css { css } => {
                format!("Array.from(document.querySelectorAll({}))", js_str(css))
            }
            Self::Text { text } => {
                let needle = js_str(&normalize_text(text));
                format!(
                    "(() => {{ const n = {needle}; const has = el => (el.textContent || '').replace(/\\s+/g, ' ').trim().toLowerCase().includes(n); \
                     return Array.from(document.querySelectorAll('body *')).filter(el => has(el) && !Array.from(el.children).some(has)); }})()"
                )
            }
            Self::Role { role, name } => {
                let css = js_str(implicit_role_css(role));
                let needle = js_str(&normalize_text(name));
                format!(
                    "Array.from(document.querySelectorAll({css})).filter(el => \
                     (el.getAttribute('aria-label') || el.textContent || el.value || '').replace(/\\s+/g, ' ').trim().toLowerCase().includes({needle}))"
                )
            }
            Self::Attribute { name, value } => {
                format!(
                    "Array.from(document.querySelectorAll('*')).filter(el => el.getAttribute({}) === {})",
                    js_str(name),
                    js_str(value)
                )
            }
            Self::CssWithText { css, text } => {
                format!(
                    "Array.from(document.querySelectorAll({})).filter(el => (el.textContent || '').replace(/\\s+/g, ' ').trim().toLowerCase().includes({}))",
                    js_str(css),
                    js_str(&normalize_text(text))
                )
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { css } => write!(f, "css={css}"),
            Self::Text { text } => write!(f, "text={text:?}"),
            Self::Role { role, name } => write!(f, "role={role}[name={name:?}]"),
            Self::Attribute { name, value } => write!(f, "[{name}={value:?}]"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
        }
    }
}

/// CSS covering the elements that carry `role` either implicitly or explicitly.
#[must_use]
pub fn implicit_role_css(role: &str) -> &'static str {
    match role {
        "link" => "a[href], [role=\"link\"]",
        "button" => {
            "button, input[type=\"submit\"], input[type=\"button\"], input[type=\"reset\"], [role=\"button\"]"
        }
        "heading" => "h1, h2, h3, h4, h5, h6, [role=\"heading\"]",
        "textbox" => {
            "input:not([type]), input[type=\"text\"], input[type=\"email\"], input[type=\"password\"], textarea, [role=\"textbox\"]"
        }
        "checkbox" => "input[type=\"checkbox\"], [role=\"checkbox\"]",
        "radio" => "input[type=\"radio\"], [role=\"radio\"]",
        "combobox" => "select, [role=\"combobox\"]",
        _ => "[role]",
    }
}

/// Collapse whitespace and lowercase, the normalization used by text matching.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case-insensitive, whitespace-normalized containment.
#[must_use]
pub fn text_matches(haystack: &str, needle: &str) -> bool {
    normalize_text(haystack).contains(&normalize_text(needle))
}

fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Which of the matching elements a locator targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementIndex {
    /// All matches (must be exactly one for interactions in strict mode)
    All,
    /// First match
    First,
    /// Zero-based n-th match
    Nth(usize),
    /// Last match
    Last,
}

impl ElementIndex {
    /// Resolve to a concrete position given the number of matches.
    ///
    /// `All` resolves to the first element; strictness is checked by the caller.
    #[must_use]
    pub const fn resolve(self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        match self {
            Self::All | Self::First => Some(0),
            Self::Nth(k) if k < count => Some(k),
            Self::Nth(_) => None,
            Self::Last => Some(count - 1),
        }
    }
}

/// A locator for finding and interacting with elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    selector: Selector,
    index: ElementIndex,
    timeout: Option<Duration>,
    strict: bool,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(selector))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            index: ElementIndex::All,
            timeout: None,
            strict: true,
        }
    }

    /// Locator for the innermost element containing `text`
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::text(text))
    }

    /// Locator for an element with `role` and accessible `name`
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_selector(Selector::role(role, name))
    }

    /// Locator for an element with attribute `name="value"`
    #[must_use]
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::from_selector(Selector::attribute(name, value))
    }

    /// Filter by text content.
    ///
    /// Only CSS locators can be filtered; other strategies already match on
    /// text or a fixed attribute and are returned unchanged.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css { css } => Selector::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        };
        Self { selector, ..self }
    }

    /// Narrow to the first match
    #[must_use]
    pub const fn first(mut self) -> Self {
        self.index = ElementIndex::First;
        self
    }

    /// Narrow to the zero-based n-th match
    #[must_use]
    pub const fn nth(mut self, n: usize) -> Self {
        self.index = ElementIndex::Nth(n);
        self
    }

    /// Narrow to the last match
    #[must_use]
    pub const fn last(mut self) -> Self {
        self.index = ElementIndex::Last;
        self
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable strict mode (allow multiple matches)
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the element index
    #[must_use]
    pub const fn index(&self) -> ElementIndex {
        self.index
    }

    /// Per-locator timeout override
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether multiple matches are an error for interactions
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict && matches!(self.index, ElementIndex::All)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector)?;
        match self.index {
            ElementIndex::All => Ok(()),
            ElementIndex::First => write!(f, " >> nth=0"),
            ElementIndex::Nth(n) => write!(f, " >> nth={n}"),
            ElementIndex::Last => write!(f, " >> nth=-1"),
        }
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_selector_js() {
            let js = Selector::css("input[data-qa=\"login-email\"]").to_js_all();
            assert!(js.contains("querySelectorAll"));
            assert!(js.contains(r#""input[data-qa=\"login-email\"]""#));
        }

        #[test]
        fn test_text_selector_picks_innermost() {
            let js = Selector::text("Logged in as").to_js_all();
            assert!(js.contains("el.children"));
            assert!(js.contains("logged in as"));
        }

        #[test]
        fn test_role_selector_uses_implicit_role() {
            let js = Selector::role("link", "Contact Us").to_js_all();
            assert!(js.contains("a[href]"));
            assert!(js.contains("contact us"));
        }

        #[test]
        fn test_attribute_selector_js() {
            let js = Selector::attribute("data-qa", "signup-name").to_js_all();
            assert!(js.contains("getAttribute(\"data-qa\") === \"signup-name\""));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("#days").to_string(), "css=#days");
            assert_eq!(
                Selector::role("link", "Cart").to_string(),
                "role=link[name=\"Cart\"]"
            );
            assert_eq!(
                Selector::css_with_text("p", "Email Address already exist!").to_string(),
                "p:has-text(\"Email Address already exist!\")"
            );
        }

        #[test]
        fn test_text_matches_is_case_and_space_insensitive() {
            assert!(text_matches("  Logged in as\n  Jane ", "logged in as jane"));
            assert!(!text_matches("Login", "Logout"));
        }

        #[test]
        fn test_unknown_role_falls_back_to_explicit() {
            assert_eq!(implicit_role_css("tab"), "[role]");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_new() {
            let locator = Locator::new("button");
            assert!(matches!(locator.selector(), Selector::Css { .. }));
            assert!(locator.is_strict());
            assert_eq!(locator.timeout(), None);
        }

        #[test]
        fn test_locator_with_text() {
            let locator = Locator::new("a").with_text("Logout");
            assert!(matches!(locator.selector(), Selector::CssWithText { .. }));
        }

        #[test]
        fn test_with_text_keeps_non_css() {
            let locator = Locator::role("link", "Cart").with_text("ignored");
            assert_eq!(locator.selector(), &Selector::role("link", "Cart"));
        }

        #[test]
        fn test_narrowing_disables_strictness() {
            assert!(!Locator::new("a").first().is_strict());
            assert!(!Locator::new("a").nth(2).is_strict());
            assert!(!Locator::new("a").with_strict(false).is_strict());
        }

        #[test]
        fn test_locator_timeout() {
            let locator = Locator::new("button").with_timeout(Duration::from_secs(10));
            assert_eq!(locator.timeout(), Some(Duration::from_secs(10)));
        }

        #[test]
        fn test_display_includes_index() {
            assert_eq!(Locator::new("a").last().to_string(), "css=a >> nth=-1");
            assert_eq!(Locator::new("a").nth(3).to_string(), "css=a >> nth=3");
        }
    }

    mod index_tests {
        use super::*;

        #[test]
        fn test_resolve() {
            assert_eq!(ElementIndex::All.resolve(0), None);
            assert_eq!(ElementIndex::First.resolve(3), Some(0));
            assert_eq!(ElementIndex::Nth(2).resolve(3), Some(2));
            assert_eq!(ElementIndex::Nth(3).resolve(3), None);
            assert_eq!(ElementIndex::Last.resolve(3), Some(2));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_css_js_is_valid_json_literal(css in "[a-z#.\\[\\]=\"' -]{1,40}") {
                let js = Selector::css(css.clone()).to_js_all();
                let start = js.find('(').unwrap() + 1;
                let inner = &js[start..];
                let inner = inner.strip_prefix("document.querySelectorAll(").unwrap();
                let literal = inner.strip_suffix("))").unwrap();
                let parsed: String = serde_json::from_str(literal).unwrap();
                prop_assert_eq!(parsed, css);
            }

            #[test]
            fn prop_resolve_stays_in_bounds(count in 0usize..50, k in 0usize..60) {
                for index in [ElementIndex::All, ElementIndex::First, ElementIndex::Nth(k), ElementIndex::Last] {
                    if let Some(i) = index.resolve(count) {
                        prop_assert!(i < count);
                    }
                }
            }

            #[test]
            fn prop_text_matches_self(s in "[A-Za-z !]{1,30}") {
                prop_assert!(text_matches(&s, &s));
            }
        }
    }
}
