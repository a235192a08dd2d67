//! Alert message delivery

use std::io::Write;

use crate::error::Result;
use crate::models::AlertOutcome;

/// Writes alert messages to a sink
pub struct AlertNotifier<W: Write> {
    out: W,
}

impl<W: Write> AlertNotifier<W> {
    /// Notifier writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print the message for `outcome`
    pub fn notify(&mut self, outcome: &AlertOutcome) -> Result<()> {
        writeln!(self.out, "{}", outcome.message())?;
        Ok(())
    }

    /// Give back the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}
