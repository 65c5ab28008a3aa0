//! Standard-tier directives: configuration lines run as shell commands.
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

/// A single `STANDARD` line that is not an assignment.
///
/// The text is evaluated with `sh -c` and full privileges; this is the only
/// place configuration content becomes a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirective {
    label: String,
    command: String,
}

impl RawDirective {
    /// Wrap the directive text found on `line`.
    #[must_use]
    pub fn new(command: &str, line: usize) -> Self {
        Self {
            label: format!("directive (line {line})"),
            command: command.to_string(),
        }
    }
}

impl Handler for RawDirective {
    fn name(&self) -> &str {
        &self.label
    }

    fn plan(&self, _ctx: &Context) -> Result<Plan, ProvisionError> {
        let mut plan = Plan::new();
        plan.step(
            self.command.clone(),
            Action::TrustedRaw {
                command: self.command.clone(),
            },
        );
        Ok(plan)
    }
}
