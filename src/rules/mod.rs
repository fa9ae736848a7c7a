// Rule checker components, one module per report category.

use crate::model::Process;
use crate::result::RuleCheckResult;

/// Per-activity diagnostic rules (log wiring, error handling).
pub mod diagnostics;

/// Process-structure and naming rules.
pub mod framework;

/// Code-quality rules (connector hygiene, delays, screens, transforms).
pub mod quality;

/// Capability shared by the three checkers.
///
/// `check_rules` walks the checker's registry in registration order,
/// skipping rules disabled in configuration, and never mutates the model.
/// Running it twice over the same process yields identical results.
pub trait RuleChecker {
    fn category(&self) -> &'static str;
    fn check_rules(&self, process: &Process) -> Vec<RuleCheckResult>;
}
