//! Validator output: a flat list of findings with severities.

mod message;
mod printer;


pub use message::{Diagnostic, DiagnosticKind, Severity};
pub use printer::DiagnosticsPrinter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: Diagnostic,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Start a diagnostic of `kind` with its default message and severity.
    pub fn report(&mut self, kind: DiagnosticKind) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: Diagnostic {
                kind,
                severity: kind.default_severity(),
                message: kind.message(None),
                state: None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.messages.iter().map(|d| d.kind).collect()
    }

    /// Keep only warnings (what a successful compile hands back).
    pub fn warnings(&self) -> Diagnostics {
        Diagnostics {
            messages: self
                .messages
                .iter()
                .filter(|d| d.is_warning())
                .cloned()
                .collect(),
        }
    }

    pub fn render(&self) -> String {
        self.printer().render()
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Detail rendered through the kind's template.
    pub fn message(mut self, detail: impl AsRef<str>) -> Self {
        self.message.message = self.message.kind.message(Some(detail.as_ref()));
        self
    }

    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.message.state = Some(name.into());
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}
