//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use hsm_core::Colors;

use super::{Diagnostics, Severity};

pub struct DiagnosticsPrinter<'d> {
    diagnostics: &'d Diagnostics,
    machine: Option<&'d str>,
    colored: bool,
}

impl<'d> DiagnosticsPrinter<'d> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            machine: None,
            colored: false,
        }
    }

    /// Machine name shown in the location line.
    pub fn machine(mut self, name: &'d str) -> Self {
        self.machine = Some(name);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let c = Colors::new(self.colored);
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            let color = match diag.severity {
                Severity::Error => c.red,
                Severity::Warning => c.yellow,
            };
            writeln!(w, "{color}{}{}: {}", diag.severity, c.reset, diag.message)?;

            let location = match (self.machine, &diag.state) {
                (Some(machine), Some(state)) => Some(format!("{machine}::{state}")),
                (None, Some(state)) => Some(state.clone()),
                (Some(machine), None) => Some(machine.to_string()),
                (None, None) => None,
            };
            if let Some(location) = location {
                writeln!(w, "  {}-->{} {location}", c.blue, c.reset)?;
            }
        }
        Ok(())
    }
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_> {
        DiagnosticsPrinter::new(self)
    }
}
