//! Element locators.
//!
//! A [`Locator`] is an ordered list of strategies plus optional scope, text
//! filter and index. Strategies are always tried in the fixed priority
//! `TestId → Role → Label → Text → Css`; the first strategy with any match
//! wins. Resolution happens in the page via the JavaScript produced by
//! [`Locator::to_query_all`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attributes a test id may be carried in.
pub const TEST_ID_ATTRIBUTES: [&str; 3] = ["data-testid", "data-cy", "data-test-id"];

/// One way of finding elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strategy {
    /// `data-testid`, `data-cy` or `data-test-id` equal to the value
    TestId(String),
    /// ARIA role (explicit or implicit) with an accessible name containing `name`
    Role {
        /// e.g. `button`, `link`, `option`
        role: String,
        /// Accessible name fragment
        name: Option<String>,
    },
    /// Form control in the container of a label containing `text`
    Label {
        /// Label text fragment
        text: String,
        /// CSS selector of the control; any form control when `None`
        control: Option<String>,
    },
    /// Deepest element containing the text, optionally restricted to a selector
    Text {
        /// Text fragment
        text: String,
        /// CSS selector the element must match
        selector: Option<String>,
    },
    /// Plain CSS selector
    Css(String),
}

impl Strategy {
    const fn priority(&self) -> u8 {
        match self {
            Self::TestId(_) => 0,
            Self::Role { .. } => 1,
            Self::Label { .. } => 2,
            Self::Text { .. } => 3,
            Self::Css(_) => 4,
        }
    }

    /// JS function `(root) => Element[]` for this strategy.
    fn to_js(&self) -> String {
        match self {
            Self::TestId(id) => format!(
                "(root) => Array.from(root.querySelectorAll({attrs}.map(a => '[' + a + '=' + JSON.stringify({id}) + ']').join(',')))",
                attrs = js(&TEST_ID_ATTRIBUTES),
                id = js(id),
            ),
            Self::Role { role, name } => format!(
                "(root) => __hc.byRole(root, {}, {})",
                js(role),
                name.as_deref().map_or_else(|| "null".to_string(), js),
            ),
            Self::Label { text, control } => format!(
                "(root) => __hc.byLabel(root, {}, {})",
                js(text),
                control.as_deref().map_or_else(|| "null".to_string(), js),
            ),
            Self::Text { text, selector } => format!(
                "(root) => __hc.byText(root, {}, {})",
                js(text),
                selector.as_deref().map_or_else(|| "null".to_string(), js),
            ),
            Self::Css(selector) => {
                format!("(root) => Array.from(root.querySelectorAll({}))", js(selector))
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={name:?}]"),
            Self::Label {
                text,
                control: None,
            } => write!(f, "label={text:?}"),
            Self::Label {
                text,
                control: Some(control),
            } => write!(f, "label={text:?}[{control}]"),
            Self::Text {
                text,
                selector: None,
            } => write!(f, "text={text:?}"),
            Self::Text {
                text,
                selector: Some(sel),
            } => write!(f, "{sel}:text={text:?}"),
            Self::Css(selector) => write!(f, "css={selector}"),
        }
    }
}

/// Which of the matched elements to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Index {
    /// Zero-based position
    Nth(usize),
    /// Last match
    Last,
}

/// Ordered, scoped element query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategies: Vec<Strategy>,
    scope: Option<Box<Locator>>,
    has_text: Option<String>,
    index: Option<Index>,
}

impl Locator {
    fn from_strategy(strategy: Strategy) -> Self {
        Self {
            strategies: vec![strategy],
            scope: None,
            has_text: None,
            index: None,
        }
    }

    /// Match by test id attribute.
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::TestId(id.into()))
    }

    /// Match by role and accessible name.
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::Role {
            role: role.into(),
            name: Some(name.into()),
        })
    }

    /// Match by role only.
    #[must_use]
    pub fn any_role(role: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::Role {
            role: role.into(),
            name: None,
        })
    }

    /// Match the form control belonging to a label.
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::Label {
            text: text.into(),
            control: None,
        })
    }

    /// Match `control` inside the container of a label.
    #[must_use]
    pub fn label_control(text: impl Into<String>, control: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::Label {
            text: text.into(),
            control: Some(control.into()),
        })
    }

    /// Match the deepest element containing `text`.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::Text {
            text: text.into(),
            selector: None,
        })
    }

    /// Match elements of `selector` containing `text`.
    #[must_use]
    pub fn text_in(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::Text {
            text: text.into(),
            selector: Some(selector.into()),
        })
    }

    /// Match by CSS selector.
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::Css(selector.into()))
    }

    /// Add a fallback strategy. Order is decided by strategy priority, not call order.
    #[must_use]
    pub fn or(mut self, strategy: Strategy) -> Self {
        if !self.strategies.contains(&strategy) {
            self.strategies.push(strategy);
            self.strategies.sort_by_key(Strategy::priority);
        }
        self
    }

    /// Add a CSS fallback.
    #[must_use]
    pub fn or_css(self, selector: impl Into<String>) -> Self {
        self.or(Strategy::Css(selector.into()))
    }

    /// Search only inside elements matched by `parent`.
    #[must_use]
    pub fn within(mut self, parent: Locator) -> Self {
        self.scope = Some(Box::new(parent));
        self
    }

    /// Find `child` inside this locator's matches.
    #[must_use]
    pub fn locate(&self, child: Locator) -> Locator {
        child.within(self.clone())
    }

    /// Keep only matches whose text contains `text`.
    #[must_use]
    pub fn has_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    /// Use the zero-based `n`-th match.
    #[must_use]
    pub fn nth(mut self, n: usize) -> Self {
        self.index = Some(Index::Nth(n));
        self
    }

    /// Use the first match.
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Use the last match.
    #[must_use]
    pub fn last(mut self) -> Self {
        self.index = Some(Index::Last);
        self
    }

    /// Strategies in resolution order.
    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// JS expression evaluating to the array of matched elements.
    ///
    /// Without an explicit index all matches are returned.
    #[must_use]
    pub fn to_query_all(&self) -> String {
        let roots = match &self.scope {
            Some(parent) => parent.to_query_all(),
            None => "[document]".to_string(),
        };
        let strategies = self
            .strategies
            .iter()
            .map(Strategy::to_js)
            .collect::<Vec<_>>()
            .join(", ");
        let has_text = self
            .has_text
            .as_deref()
            .map_or_else(|| "null".to_string(), js);
        let index = match self.index {
            None => "null".to_string(),
            Some(Index::Nth(n)) => n.to_string(),
            Some(Index::Last) => "-1".to_string(),
        };
        format!(
            "(() => {{ {HELPERS} return __hc.resolve({roots}, [{strategies}], {has_text}, {index}); }})()"
        )
    }

    /// JS expression evaluating to the selected element or `null`.
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("(({}) [0] ?? null)", self.to_query_all_indexed())
    }

    /// JS expression evaluating to the number of matches.
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("({}).length", self.to_query_all())
    }

    fn to_query_all_indexed(&self) -> String {
        if self.index.is_some() {
            self.to_query_all()
        } else {
            self.clone().first().to_query_all()
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.scope {
            write!(f, "{parent} >> ")?;
        }
        let strategies = self
            .strategies
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ");
        f.write_str(&strategies)?;
        if let Some(text) = &self.has_text {
            write!(f, " :has-text({text:?})")?;
        }
        match self.index {
            None => Ok(()),
            Some(Index::Nth(n)) => write!(f, " >> nth={n}"),
            Some(Index::Last) => write!(f, " >> last"),
        }
    }
}

/// Serialize a value as a JS literal.
fn js<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Resolution helpers shared by every generated query.
const HELPERS: &str = r#"
const __hc = {
  implicitRoles: {
    button: 'button, input[type="button"], input[type="submit"], input[type="reset"], summary',
    link: 'a[href]',
    textbox: 'input:not([type]), input[type="text"], input[type="email"], input[type="password"], input[type="search"], input[type="tel"], textarea',
    checkbox: 'input[type="checkbox"]',
    option: 'option',
    listbox: 'select[multiple]',
    combobox: 'select',
    row: 'tr',
    cell: 'td',
    dialog: 'dialog',
    heading: 'h1, h2, h3, h4, h5, h6',
  },
  name(el) {
    return (el.getAttribute('aria-label') || el.value || el.textContent || '').trim();
  },
  byRole(root, role, name) {
    const implicit = this.implicitRoles[role];
    const selector = implicit ? `[role="${role}"], ${implicit}` : `[role="${role}"]`;
    const found = Array.from(root.querySelectorAll(selector))
      .filter(el => !el.hasAttribute('role') || el.getAttribute('role') === role);
    return name === null ? found : found.filter(el => this.name(el).includes(name));
  },
  byLabel(root, text, selector) {
    const labels = Array.from(root.querySelectorAll('label'))
      .filter(l => l.textContent.trim().includes(text));
    const controls = [];
    for (const label of labels) {
      let control = null;
      if (selector === null) {
        control = label.htmlFor ? document.getElementById(label.htmlFor) : null;
        if (!control) control = label.querySelector('input, textarea, select, button');
      }
      if (!control) {
        const box = label.closest('div');
        control = box ? box.querySelector(selector || 'input, textarea, select, button') : null;
      }
      if (control && !controls.includes(control)) controls.push(control);
    }
    return controls;
  },
  byText(root, text, selector) {
    const found = Array.from(root.querySelectorAll(selector || '*'))
      .filter(el => el.tagName !== 'SCRIPT' && el.tagName !== 'STYLE' && (el.textContent || '').includes(text));
    if (selector) return found;
    return found.filter(el => !found.some(other => other !== el && el.contains(other)));
  },
  resolve(roots, strategies, hasText, index) {
    for (const find of strategies) {
      let found = [];
      for (const root of roots) {
        for (const el of find(root)) if (!found.includes(el)) found.push(el);
      }
      if (hasText !== null) found = found.filter(el => (el.textContent || '').includes(hasText));
      if (found.length === 0) continue;
      if (index === null) return found;
      const el = index < 0 ? found[found.length + index] : found[index];
      return el ? [el] : [];
    }
    return [];
  },
};
"#;
