//! Scripted in-memory browser.
//!
//! [`MockDriver`] renders pages produced by a [`MockSite`] into a flat list of
//! [`MockElement`]s and answers every [`Driver`] primitive against that list.
//! Clicking an element runs its [`ClickAction`]: following a link, submitting
//! a form back to the site, opening a confirm dialog, or toggling a modal.
//!
//! Every call is recorded in a call history so tests can assert which
//! primitives a page object used, in particular that verification methods
//! never mutate the page.

use super::{Driver, ScreenshotTarget};
use crate::dialog::{Dialog, DialogLog, DialogPolicy, DialogType};
use crate::locator::{text_matches, Selector};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// Call-history prefixes of the primitives that change page state
pub const MUTATING_CALLS: &[&str] = &[
    "goto",
    "click",
    "fill",
    "check",
    "select_option",
    "set_input_files",
];

const MAX_REDIRECTS: usize = 10;

/// PNG file signature; mock screenshots start with it
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Cookies kept per mock session
pub type Cookies = BTreeMap<String, String>;

/// Submitted form fields, keyed by field name
pub type FormData = BTreeMap<String, String>;

/// What happens when an element is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Follow a link (absolute or relative to the current URL)
    Navigate(String),
    /// Submit every field tagged with `form` to `action`
    Submit {
        /// Form name
        form: String,
        /// Target path or URL
        action: String,
    },
    /// Open a confirm dialog and run `then` only if it is accepted
    Confirm {
        /// Dialog message
        message: String,
        /// Follow-up when accepted
        then: Box<ClickAction>,
    },
    /// Make matching elements visible
    Show(String),
    /// Hide matching elements
    Hide(String),
}

/// One element in a mock page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    /// Tag name
    pub tag: String,
    /// Attributes (id, class, name, type, data-qa, href, ...)
    pub attributes: BTreeMap<String, String>,
    /// Text content
    pub text: String,
    /// Explicit ARIA role (overrides the implicit one)
    pub role: Option<String>,
    /// Whether the element is rendered
    pub visible: bool,
    /// Current value of inputs and selects
    pub value: String,
    /// Checked state of checkboxes and radios
    pub checked: bool,
    /// Option values of a `<select>`
    pub options: Vec<String>,
    /// Files attached to a file input
    pub files: Vec<PathBuf>,
    /// Form this field belongs to
    pub form: Option<String>,
    /// Click behavior
    pub on_click: Option<ClickAction>,
}

impl MockElement {
    /// Create a visible element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            visible: true,
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an explicit role
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Render hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Set the initial value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the options of a select
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Attach to a form
    #[must_use]
    pub fn in_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    /// Set the click behavior
    #[must_use]
    pub fn on_click(mut self, action: ClickAction) -> Self {
        self.on_click = Some(action);
        self
    }

    /// Link to `href`
    #[must_use]
    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        let href = href.into();
        Self::new("a")
            .attr("href", href.clone())
            .text(text)
            .on_click(ClickAction::Navigate(href))
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Role from the explicit attribute or implied by the tag
    #[must_use]
    pub fn effective_role(&self) -> Option<&str> {
        if let Some(role) = self.role.as_deref() {
            return Some(role);
        }
        let input_type = self.attribute("type").unwrap_or("text");
        match self.tag.as_str() {
            "a" if self.attributes.contains_key("href") => Some("link"),
            "button" => Some("button"),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some("heading"),
            "textarea" => Some("textbox"),
            "select" => Some("combobox"),
            "input" => match input_type {
                "submit" | "button" | "reset" => Some("button"),
                "checkbox" => Some("checkbox"),
                "radio" => Some("radio"),
                "file" | "hidden" => None,
                _ => Some("textbox"),
            },
            _ => None,
        }
    }

    fn accessible_name(&self) -> &str {
        if let Some(label) = self.attribute("aria-label") {
            return label;
        }
        if self.text.trim().is_empty() {
            &self.value
        } else {
            &self.text
        }
    }

    fn field_name(&self) -> Option<&str> {
        self.attribute("name")
            .or_else(|| self.attribute("data-qa"))
            .or_else(|| self.attribute("id"))
    }

    /// Whether the selector matches this element
    #[must_use]
    pub fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Css { css } => css_matches(css, self),
            Selector::Text { text } => text_matches(&self.text, text),
            Selector::Role { role, name } => {
                self.effective_role() == Some(role.as_str())
                    && text_matches(self.accessible_name(), name)
            }
            Selector::Attribute { name, value } => self.attribute(name) == Some(value.as_str()),
            Selector::CssWithText { css, text } => {
                css_matches(css, self) && text_matches(&self.text, text)
            }
        }
    }

    fn is_fillable(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => !matches!(
                self.attribute("type"),
                Some("checkbox" | "radio" | "file" | "submit" | "button")
            ),
            _ => false,
        }
    }
}

/// A rendered mock page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockPage {
    /// URL the page was served from
    pub url: String,
    /// Document title
    pub title: String,
    /// Elements in document order
    pub elements: Vec<MockElement>,
}

impl MockPage {
    /// Create an empty page with a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Append an element
    #[must_use]
    pub fn with(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Append several elements
    #[must_use]
    pub fn with_all(mut self, elements: impl IntoIterator<Item = MockElement>) -> Self {
        self.elements.extend(elements);
        self
    }

    fn matching(&self, selector: &Selector) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.matches(selector))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Request sent by the mock browser to the site
#[derive(Debug, Clone, Copy)]
pub enum Request<'a> {
    /// Page load
    Get {
        /// Requested URL
        url: &'a Url,
    },
    /// Form submission
    Post {
        /// Form action URL
        url: &'a Url,
        /// Form name
        form: &'a str,
        /// Submitted fields
        data: &'a FormData,
    },
}

impl Request<'_> {
    /// Requested URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        match self {
            Self::Get { url } | Self::Post { url, .. } => url,
        }
    }
}

/// Site answer to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteResponse {
    /// Render a page at the requested URL
    Page(MockPage),
    /// Redirect to another path or URL
    Redirect(String),
}

/// Server side of the in-memory browser
pub trait MockSite: Send + Sync + std::fmt::Debug {
    /// Answer a request; `cookies` belong to the requesting session
    fn handle(&self, request: Request<'_>, cookies: &mut Cookies) -> SiteResponse;
}

#[derive(Debug)]
struct MockState {
    page: MockPage,
    cookies: Cookies,
    closed: bool,
}

/// Mock driver for offline runs and unit testing
#[derive(Debug)]
pub struct MockDriver {
    site: Arc<dyn MockSite>,
    state: Mutex<MockState>,
    dialogs: DialogLog,
    call_history: Mutex<Vec<String>>,
}

impl MockDriver {
    /// Create a driver browsing `site`, starting on `about:blank`
    #[must_use]
    pub fn new(site: Arc<dyn MockSite>) -> Self {
        Self {
            site,
            state: Mutex::new(MockState {
                page: MockPage {
                    url: "about:blank".to_string(),
                    ..MockPage::default()
                },
                cookies: Cookies::new(),
                closed: false,
            }),
            dialogs: DialogLog::new(),
            call_history: Mutex::new(Vec::new()),
        }
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.call_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    /// Calls that changed page state
    #[must_use]
    pub fn mutations(&self) -> Vec<String> {
        self.history()
            .into_iter()
            .filter(|call| {
                let name = call.split(':').next().unwrap_or_default();
                MUTATING_CALLS.contains(&name)
            })
            .collect()
    }

    /// Forget the recorded calls
    pub fn clear_history(&self) {
        if let Ok(mut h) = self.call_history.lock() {
            h.clear();
        }
    }

    /// Simulate a crashed or disconnected browser
    pub fn disconnect(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed = true;
        }
    }

    /// Snapshot of the current page
    pub fn page(&self) -> E2eResult<MockPage> {
        Ok(self.lock()?.page.clone())
    }

    fn record(&self, call: String) {
        tracing::trace!(driver = "mock", %call, "driver call");
        if let Ok(mut h) = self.call_history.lock() {
            h.push(call);
        }
    }

    fn lock(&self) -> E2eResult<MutexGuard<'_, MockState>> {
        let state = self
            .state
            .lock()
            .map_err(|_| E2eError::driver("mock driver state poisoned"))?;
        if state.closed {
            return Err(E2eError::driver("browser session is closed"));
        }
        Ok(state)
    }

    fn element_index(
        state: &MockState,
        selector: &Selector,
        index: usize,
        action: &str,
    ) -> E2eResult<usize> {
        state
            .page
            .matching(selector)
            .get(index)
            .copied()
            .ok_or_else(|| E2eError::ElementNotFound {
                selector: format!("{selector} >> nth={index}"),
                action: action.to_string(),
                timeout_ms: 0,
            })
    }

    fn load(&self, state: &mut MockState, url: Url) -> E2eResult<()> {
        self.respond(state, url, None)
    }

    fn respond(
        &self,
        state: &mut MockState,
        mut url: Url,
        mut post: Option<(String, FormData)>,
    ) -> E2eResult<()> {
        for _ in 0..MAX_REDIRECTS {
            let request = match &post {
                Some((form, data)) => Request::Post {
                    url: &url,
                    form,
                    data,
                },
                None => Request::Get { url: &url },
            };
            match self.site.handle(request, &mut state.cookies) {
                SiteResponse::Page(mut page) => {
                    page.url = url.to_string();
                    state.page = page;
                    return Ok(());
                }
                SiteResponse::Redirect(location) => {
                    url = url.join(&location)?;
                    post = None;
                }
            }
        }
        Err(E2eError::Navigation {
            url: url.to_string(),
            message: "too many redirects".to_string(),
        })
    }

    fn run_click_action(&self, state: &mut MockState, action: ClickAction) -> E2eResult<()> {
        match action {
            ClickAction::Navigate(href) => {
                let url = Url::parse(&state.page.url)?.join(&href)?;
                self.load(state, url)
            }
            ClickAction::Submit { form, action } => {
                let data = collect_form(&state.page, &form);
                let url = Url::parse(&state.page.url)?.join(&action)?;
                self.respond(state, url, Some((form, data)))
            }
            ClickAction::Confirm { message, then } => {
                if self.dialogs.handle(DialogType::Confirm, message).accepted() {
                    self.run_click_action(state, *then)
                } else {
                    Ok(())
                }
            }
            ClickAction::Show(css) => {
                set_visibility(&mut state.page, &css, true);
                Ok(())
            }
            ClickAction::Hide(css) => {
                set_visibility(&mut state.page, &css, false);
                Ok(())
            }
        }
    }
}

fn set_visibility(page: &mut MockPage, css: &str, visible: bool) {
    for el in &mut page.elements {
        if css_matches(css, el) {
            el.visible = visible;
        }
    }
}

fn collect_form(page: &MockPage, form: &str) -> FormData {
    let mut data = FormData::new();
    for el in page
        .elements
        .iter()
        .filter(|el| el.form.as_deref() == Some(form))
    {
        let Some(name) = el.field_name() else {
            continue;
        };
        let value = match (el.tag.as_str(), el.attribute("type")) {
            ("input", Some("checkbox" | "radio")) => {
                if !el.checked {
                    continue;
                }
                el.attribute("value").unwrap_or("on").to_string()
            }
            ("input", Some("file")) => el
                .files
                .iter()
                .filter_map(|f| f.file_name())
                .map(|f| f.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(","),
            ("input", Some("submit" | "button")) | ("button", _) => continue,
            _ => el.value.clone(),
        };
        data.insert(name.to_string(), value);
    }
    data
}

#[async_trait]
impl Driver for MockDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.record(format!("goto:{url}"));
        let parsed = Url::parse(url).map_err(|e| E2eError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let mut state = self.lock()?;
        self.load(&mut state, parsed)
    }

    async fn title(&self) -> E2eResult<String> {
        self.record("title".to_string());
        Ok(self.lock()?.page.title.clone())
    }

    async fn url(&self) -> E2eResult<String> {
        self.record("url".to_string());
        Ok(self.lock()?.page.url.clone())
    }

    async fn count(&self, selector: &Selector) -> E2eResult<usize> {
        self.record(format!("count:{selector}"));
        Ok(self.lock()?.page.matching(selector).len())
    }

    async fn is_visible(&self, selector: &Selector, index: usize) -> E2eResult<bool> {
        self.record(format!("is_visible:{selector}#{index}"));
        let state = self.lock()?;
        Ok(state
            .page
            .matching(selector)
            .get(index)
            .is_some_and(|&i| state.page.elements[i].visible))
    }

    async fn text_content(&self, selector: &Selector, index: usize) -> E2eResult<Option<String>> {
        self.record(format!("text_content:{selector}#{index}"));
        let state = self.lock()?;
        Ok(state
            .page
            .matching(selector)
            .get(index)
            .map(|&i| state.page.elements[i].text.clone()))
    }

    async fn click(&self, selector: &Selector, index: usize) -> E2eResult<()> {
        self.record(format!("click:{selector}#{index}"));
        let mut state = self.lock()?;
        let i = Self::element_index(&state, selector, index, "click")?;
        let element = &mut state.page.elements[i];
        if element.tag == "input" && matches!(element.attribute("type"), Some("checkbox")) {
            element.checked = !element.checked;
        }
        let action = element.on_click.clone();
        match action {
            Some(action) => self.run_click_action(&mut state, action),
            None => Ok(()),
        }
    }

    async fn fill(&self, selector: &Selector, index: usize, value: &str) -> E2eResult<()> {
        self.record(format!("fill:{selector}#{index}"));
        let mut state = self.lock()?;
        let i = Self::element_index(&state, selector, index, "fill")?;
        let element = &mut state.page.elements[i];
        if !element.is_fillable() {
            return Err(E2eError::driver(format!(
                "{selector} is a <{}>, not a fillable input",
                element.tag
            )));
        }
        element.value = value.to_string();
        Ok(())
    }

    async fn check(&self, selector: &Selector, index: usize) -> E2eResult<()> {
        self.record(format!("check:{selector}#{index}"));
        let mut state = self.lock()?;
        let i = Self::element_index(&state, selector, index, "check")?;
        let element = state.page.elements[i].clone();
        match element.attribute("type") {
            Some("radio") => {
                let group = element.attribute("name").map(str::to_string);
                for el in &mut state.page.elements {
                    if el.attribute("type") == Some("radio")
                        && el.attribute("name").map(str::to_string) == group
                    {
                        el.checked = false;
                    }
                }
                state.page.elements[i].checked = true;
                Ok(())
            }
            Some("checkbox") => {
                state.page.elements[i].checked = true;
                Ok(())
            }
            _ => Err(E2eError::driver(format!(
                "{selector} is not a checkbox or radio button"
            ))),
        }
    }

    async fn select_option(
        &self,
        selector: &Selector,
        index: usize,
        value: &str,
    ) -> E2eResult<()> {
        self.record(format!("select_option:{selector}#{index}={value}"));
        let mut state = self.lock()?;
        let i = Self::element_index(&state, selector, index, "select_option")?;
        let element = &mut state.page.elements[i];
        if !element.options.iter().any(|o| o == value) {
            return Err(E2eError::ElementNotFound {
                selector: format!("{selector} >> option={value:?}"),
                action: "select_option".to_string(),
                timeout_ms: 0,
            });
        }
        element.value = value.to_string();
        Ok(())
    }

    async fn set_input_files(
        &self,
        selector: &Selector,
        index: usize,
        files: &[PathBuf],
    ) -> E2eResult<()> {
        self.record(format!("set_input_files:{selector}#{index}"));
        let mut state = self.lock()?;
        let i = Self::element_index(&state, selector, index, "set_input_files")?;
        for file in files {
            if !file.exists() {
                return Err(E2eError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("attachment {} does not exist", file.display()),
                )));
            }
        }
        state.page.elements[i].files = files.to_vec();
        Ok(())
    }

    async fn screenshot(&self, target: &ScreenshotTarget) -> E2eResult<Vec<u8>> {
        self.record(format!("screenshot:{}", target.label()));
        let state = self.lock()?;
        if let ScreenshotTarget::Element { selector, index } = target {
            let i = Self::element_index(&state, selector, *index, "screenshot")?;
            if !state.page.elements[i].visible {
                return Err(E2eError::ElementNotFound {
                    selector: selector.to_string(),
                    action: "screenshot".to_string(),
                    timeout_ms: 0,
                });
            }
        }
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(format!("{}:{}", target.label(), state.page.url).as_bytes());
        Ok(png)
    }

    fn set_dialog_policy(&self, policy: DialogPolicy) {
        self.record(format!("set_dialog_policy:{policy:?}"));
        self.dialogs.set_policy(policy);
    }

    fn dialogs(&self) -> Vec<Dialog> {
        self.dialogs.dialogs()
    }

    async fn close(&self) -> E2eResult<()> {
        self.record("close".to_string());
        if let Ok(mut state) = self.state.lock() {
            state.closed = true;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Minimal CSS matching: selector lists of compound selectors built from a
// tag, `#id`, `.class` and `[attr]` / `[attr=value]`. Anything else never
// matches.
// ----------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

/// Whether a CSS selector list matches the element
#[must_use]
pub fn css_matches(css: &str, element: &MockElement) -> bool {
    split_list(css)
        .iter()
        .filter_map(|part| parse_compound(part.trim()))
        .any(|compound| compound.matches(element))
}

fn split_list(css: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for c in css.chars() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(s: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;

    let take_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && chars[i] == '*' {
        i += 1;
    } else if i < chars.len() && is_ident(chars[i]) {
        compound.tag = Some(take_ident(&mut i).to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                compound.id = Some(take_ident(&mut i));
            }
            '.' => {
                i += 1;
                compound.classes.push(take_ident(&mut i));
            }
            '[' => {
                i += 1;
                let name = take_ident(&mut i);
                let value = if i < chars.len() && chars[i] == '=' {
                    i += 1;
                    let quote = chars.get(i).copied().filter(|c| *c == '"' || *c == '\'');
                    if quote.is_some() {
                        i += 1;
                    }
                    let start = i;
                    while i < chars.len() && Some(chars[i]) != quote && (quote.is_some() || chars[i] != ']')
                    {
                        i += 1;
                    }
                    let value: String = chars[start..i].iter().collect();
                    if quote.is_some() {
                        i += 1;
                    }
                    Some(value)
                } else {
                    None
                };
                if chars.get(i) != Some(&']') || name.is_empty() {
                    return None;
                }
                i += 1;
                compound.attrs.push((name, value));
            }
            _ => return None,
        }
    }

    if compound == Compound::default() {
        return None;
    }
    Some(compound)
}

impl Compound {
    fn matches(&self, el: &MockElement) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&el.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        let classes: Vec<&str> = el
            .attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            Some(v) => el.attribute(name) == Some(v.as_str()),
            None => el.attributes.contains_key(name),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Two-page site: a form on `/` that posts to `/echo`.
    #[derive(Debug)]
    struct EchoSite;

    impl MockSite for EchoSite {
        fn handle(&self, request: Request<'_>, cookies: &mut Cookies) -> SiteResponse {
            match (request, request.url().path()) {
                (Request::Get { .. }, "/") => SiteResponse::Page(
                    MockPage::new("Form")
                        .with(MockElement::new("input").attr("id", "q").attr("name", "q").in_form("f"))
                        .with(
                            MockElement::new("input")
                                .attr("type", "checkbox")
                                .attr("id", "opt")
                                .attr("name", "opt")
                                .in_form("f"),
                        )
                        .with(
                            MockElement::new("button")
                                .attr("class", "btn primary")
                                .text("Send")
                                .on_click(ClickAction::Submit {
                                    form: "f".to_string(),
                                    action: "/echo".to_string(),
                                }),
                        )
                        .with(MockElement::new("div").attr("class", "modal").text("Hi").hidden())
                        .with(
                            MockElement::new("button")
                                .text("Open")
                                .on_click(ClickAction::Show(".modal".to_string())),
                        )
                        .with(
                            MockElement::new("button")
                                .text("Leave")
                                .on_click(ClickAction::Confirm {
                                    message: "Sure?".to_string(),
                                    then: Box::new(ClickAction::Navigate("/bye".to_string())),
                                }),
                        ),
                ),
                (Request::Post { data, .. }, "/echo") => {
                    cookies.insert("seen".to_string(), "1".to_string());
                    let summary = data
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect::<Vec<_>>()
                        .join("&");
                    SiteResponse::Page(MockPage::new("Echo").with(MockElement::new("p").text(summary)))
                }
                (_, "/old") => SiteResponse::Redirect("/".to_string()),
                (_, path) => SiteResponse::Page(MockPage::new(format!("Page {path}"))),
            }
        }
    }

    fn driver() -> MockDriver {
        MockDriver::new(Arc::new(EchoSite))
    }

    mod css_tests {
        use super::*;

        fn input() -> MockElement {
            MockElement::new("input")
                .attr("id", "email")
                .attr("class", "form-control wide")
                .attr("data-qa", "login-email")
        }

        #[test]
        fn test_compound_selectors() {
            let el = input();
            assert!(css_matches("#email", &el));
            assert!(css_matches("input#email", &el));
            assert!(css_matches(".form-control.wide", &el));
            assert!(css_matches("input[data-qa=\"login-email\"]", &el));
            assert!(css_matches("input[data-qa='login-email']", &el));
            assert!(css_matches("[data-qa]", &el));
            assert!(!css_matches("textarea#email", &el));
            assert!(!css_matches("input[data-qa=\"signup-email\"]", &el));
        }

        #[test]
        fn test_selector_list() {
            assert!(css_matches("button, input#email", &input()));
        }

        #[test]
        fn test_unsupported_syntax_never_matches() {
            assert!(!css_matches("form input#email", &input()));
            assert!(!css_matches("input:not([type])", &input()));
        }

        #[test]
        fn test_implicit_roles() {
            assert_eq!(MockElement::link("/", "Home").effective_role(), Some("link"));
            assert_eq!(
                MockElement::new("input").attr("type", "submit").effective_role(),
                Some("button")
            );
            assert_eq!(MockElement::new("h2").effective_role(), Some("heading"));
            assert_eq!(MockElement::new("div").role("dialog").effective_role(), Some("dialog"));
        }

        #[test]
        fn test_role_name_uses_value_for_inputs() {
            let el = MockElement::new("input").attr("type", "submit").value("Submit");
            assert!(el.matches(&Selector::role("button", "submit")));
        }
    }

    mod driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_goto_and_title() {
            let driver = driver();
            driver.goto("https://shop.test/").await.unwrap();
            assert_eq!(driver.title().await.unwrap(), "Form");
            assert_eq!(driver.url().await.unwrap(), "https://shop.test/");
        }

        #[tokio::test]
        async fn test_redirect_is_followed() {
            let driver = driver();
            driver.goto("https://shop.test/old").await.unwrap();
            assert_eq!(driver.url().await.unwrap(), "https://shop.test/");
        }

        #[tokio::test]
        async fn test_form_submission_collects_fields() {
            let driver = driver();
            driver.goto("https://shop.test/").await.unwrap();
            driver.fill(&Selector::css("#q"), 0, "shoes").await.unwrap();
            driver.check(&Selector::css("#opt"), 0).await.unwrap();
            driver.click(&Selector::text("Send"), 0).await.unwrap();
            assert_eq!(driver.title().await.unwrap(), "Echo");
            let text = driver.text_content(&Selector::css("p"), 0).await.unwrap();
            assert_eq!(text.as_deref(), Some("opt=on&q=shoes"));
        }

        #[tokio::test]
        async fn test_show_toggles_visibility() {
            let driver = driver();
            driver.goto("https://shop.test/").await.unwrap();
            let modal = Selector::css(".modal");
            assert!(!driver.is_visible(&modal, 0).await.unwrap());
            driver.click(&Selector::text("Open"), 0).await.unwrap();
            assert!(driver.is_visible(&modal, 0).await.unwrap());
        }

        #[tokio::test]
        async fn test_confirm_dismissed_by_default() {
            let driver = driver();
            driver.goto("https://shop.test/").await.unwrap();
            driver.click(&Selector::text("Leave"), 0).await.unwrap();
            assert_eq!(driver.title().await.unwrap(), "Form");
            assert_eq!(driver.dialogs().len(), 1);

            driver.set_dialog_policy(DialogPolicy::AcceptAll);
            driver.click(&Selector::text("Leave"), 0).await.unwrap();
            assert_eq!(driver.title().await.unwrap(), "Page /bye");
        }

        #[tokio::test]
        async fn test_missing_element_is_not_found() {
            let driver = driver();
            driver.goto("https://shop.test/").await.unwrap();
            let err = driver.click(&Selector::css("#nope"), 0).await.unwrap_err();
            assert!(matches!(err, E2eError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_fill_rejects_non_inputs() {
            let driver = driver();
            driver.goto("https://shop.test/").await.unwrap();
            let err = driver.fill(&Selector::text("Send"), 0, "x").await.unwrap_err();
            assert!(matches!(err, E2eError::DriverFault { .. }));
        }

        #[tokio::test]
        async fn test_queries_are_not_mutations() {
            let driver = driver();
            driver.goto("https://shop.test/").await.unwrap();
            driver.clear_history();
            driver.count(&Selector::css("input")).await.unwrap();
            driver.is_visible(&Selector::css("#q"), 0).await.unwrap();
            driver.title().await.unwrap();
            assert!(driver.mutations().is_empty());
            assert!(driver.was_called("count"));
        }

        #[tokio::test]
        async fn test_closed_driver_faults() {
            let driver = driver();
            driver.close().await.unwrap();
            let err = driver.title().await.unwrap_err();
            assert!(matches!(err, E2eError::DriverFault { .. }));
        }

        #[tokio::test]
        async fn test_screenshot_is_png() {
            let driver = driver();
            driver.goto("https://shop.test/").await.unwrap();
            let png = driver.screenshot(&ScreenshotTarget::FullPage).await.unwrap();
            assert_eq!(&png[..8], &PNG_SIGNATURE);
        }
    }
}
