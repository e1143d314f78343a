//! Structured diagnostics for non-fatal validation issues.
//!
//! Override validation degrades gracefully: offending tokens and contexts
//! are dropped, one warning is recorded per distinct offender, and unrelated
//! theming proceeds. Warnings are collected into a [`Diagnostics`] value so
//! hosts can inspect them programmatically; each distinct warning is also
//! emitted once through `tracing` at warn level.

use std::collections::HashSet;

/// A single non-fatal validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    /// An override names a token outside the themeable allowlist.
    UnthemeableToken { token: String },
    /// An override names a context the theme does not declare.
    InvalidContextId { context: String },
    /// An override value's shape is incompatible with the token's
    /// assignment (e.g. a per-state map for a mode-free token).
    IncompatibleOverrideShape { token: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnthemeableToken { token } => {
                write!(f, "token '{}' is not themeable and was dropped", token)
            }
            Warning::InvalidContextId { context } => {
                write!(f, "context '{}' does not exist and was dropped", context)
            }
            Warning::IncompatibleOverrideShape { token } => {
                write!(
                    f,
                    "override for token '{}' has an incompatible shape and was ignored",
                    token
                )
            }
        }
    }
}

/// Deduplicating collector for [`Warning`]s.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
    seen: HashSet<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning, once per distinct finding.
    pub fn warn(&mut self, warning: Warning) {
        if self.seen.insert(warning.clone()) {
            tracing::warn!(warning = %warning, "override validation");
            self.warnings.push(warning);
        }
    }

    /// The recorded warnings, in first-seen order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_deduplicated() {
        let mut diagnostics = Diagnostics::new();
        for _ in 0..3 {
            diagnostics.warn(Warning::UnthemeableToken {
                token: "fontFamily".to_string(),
            });
        }
        diagnostics.warn(Warning::InvalidContextId {
            context: "sidebar".to_string(),
        });
        assert_eq!(diagnostics.warnings().len(), 2);
    }

    #[test]
    fn test_warning_display_names_the_offender() {
        let warning = Warning::UnthemeableToken {
            token: "fontFamily".to_string(),
        };
        assert!(warning.to_string().contains("fontFamily"));
    }

    #[test]
    fn test_empty_diagnostics() {
        assert!(Diagnostics::new().is_empty());
    }
}
