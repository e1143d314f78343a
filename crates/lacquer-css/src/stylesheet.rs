//! Rule and stylesheet primitives.
//!
//! A [`Stylesheet`] is an insertion-ordered collection of [`Rule`]s, keyed
//! so later phases can address and rewrite individual rules. Each rule
//! carries the keys of its cascade-ancestor rules (`path`), which is what
//! the minimal-diff transform walks to decide which declarations a rule
//! actually needs to restate.

use indexmap::IndexMap;

/// One CSS rule: a selector, optional media gate, custom-property
/// declarations, and the keys of its cascade ancestors (root first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub media: Option<String>,
    /// Custom-property name (including `--`) → value, insertion-ordered.
    pub declarations: IndexMap<String, String>,
    /// Keys of the cascade-ancestor rules, farthest (root) first.
    pub path: Vec<String>,
}

impl Rule {
    pub fn new(selector: impl Into<String>, media: Option<String>, path: Vec<String>) -> Self {
        Rule {
            selector: selector.into(),
            media,
            declarations: IndexMap::new(),
            path,
        }
    }

    /// The stylesheet key for this rule. Media-gated rules are keyed apart
    /// from their ungated counterparts with the same selector.
    pub fn key(&self) -> String {
        match &self.media {
            Some(media) => format!("{}|{}", media, self.selector),
            None => self.selector.clone(),
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.selector);
        out.push('{');
        for (property, value) in &self.declarations {
            out.push_str("\n\t");
            out.push_str(property);
            out.push(':');
            out.push_str(value);
            out.push(';');
        }
        out.push_str("\n}");
        match &self.media {
            Some(media) => format!("@media {} {{\n{}\n}}", media, out),
            None => out,
        }
    }
}

/// An insertion-ordered set of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    rules: IndexMap<String, Rule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule, unless it has no declarations. Empty rules would
    /// render as dead weight; a descendant can still name a never-appended
    /// ancestor in its path, which the minimal transform skips over.
    pub fn append_rule(&mut self, rule: Rule) {
        if rule.declarations.is_empty() {
            return;
        }
        self.rules.insert(rule.key(), rule);
    }

    pub fn get(&self, key: &str) -> Option<&Rule> {
        self.rules.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Rule> {
        self.rules.get_mut(key)
    }

    /// Removes a rule; insertion order of the rest is preserved.
    pub fn remove(&mut self, key: &str) -> Option<Rule> {
        self.rules.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.rules.keys()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Renders the stylesheet as newline-joined rule blocks.
    pub fn render(&self) -> String {
        self.rules
            .values()
            .map(Rule::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
