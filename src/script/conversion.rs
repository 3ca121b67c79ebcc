use super::snapshot::ScriptSnapshot;
use crate::error::ScriptConversionError;

/// A trait for foreign script formats that can be converted into a `ScriptSnapshot`.
///
/// This is the extension point that keeps the resolver independent of how
/// scripts are stored. The builder's JSON export is supported out of the box
/// through [`crate::ui::UiScript`]; other storage formats implement this trait
/// to feed the same resolver.
///
/// # Example
///
/// ```rust,no_run
/// use scriptflow::prelude::*;
/// use scriptflow::error::ScriptConversionError;
///
/// struct Step { id: String, heading: String }
/// struct CallFlow { id: String, steps: Vec<Step> }
///
/// impl IntoScript for CallFlow {
///     fn into_script(self) -> std::result::Result<ScriptSnapshot, ScriptConversionError> {
///         let pages = self
///             .steps
///             .into_iter()
///             .map(|s| Page::new(s.id, PageType::Welcome).with_title(s.heading))
///             .collect();
///         Ok(ScriptSnapshot::new(self.id.clone(), self.id, pages, RuleSet::new())?)
///     }
/// }
/// ```
pub trait IntoScript {
    /// Consumes the object and converts it into a snapshot the resolver can run.
    fn into_script(self) -> Result<ScriptSnapshot, ScriptConversionError>;
}
