use std::fmt;
use std::sync::Arc;

use super::{ContentItem, Parameters, RenderingReference, Tracker};

/// Mutable state for one evaluation pass over a rule list.
///
/// Holds the candidate rendering references, the unique id of the one being
/// personalized, the content item, extra parameters and the optional visitor
/// tracker. Actions mutate it; the `aborted` flag is terminal for the pass.
#[derive(Clone, Default)]
pub struct RuleContext {
    references: Vec<RenderingReference>,
    target: String,
    item: Option<ContentItem>,
    parameters: Parameters,
    tracker: Option<Arc<dyn Tracker>>,
    aborted: bool,
    skip_rule: bool,
}

impl RuleContext {
    /// Context whose only candidate is `reference`.
    #[must_use]
    pub fn for_reference(reference: RenderingReference) -> Self {
        Self {
            target: reference.unique_id.clone(),
            references: vec![reference],
            ..Self::default()
        }
    }

    /// Context over several candidates, personalizing the one whose unique id
    /// is `target`.
    #[must_use]
    pub fn new(references: Vec<RenderingReference>, target: &str) -> Self {
        Self {
            references,
            target: target.to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: ContentItem) -> Self {
        self.item = Some(item);
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker: Arc<dyn Tracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// The reference being personalized, if it is still among the candidates.
    #[must_use]
    pub fn reference(&self) -> Option<&RenderingReference> {
        self.references.iter().find(|r| r.unique_id == self.target)
    }

    pub fn reference_mut(&mut self) -> Option<&mut RenderingReference> {
        let target = &self.target;
        self.references.iter_mut().find(|r| &r.unique_id == target)
    }

    #[must_use]
    pub fn target_id(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn references(&self) -> &[RenderingReference] {
        &self.references
    }

    /// Drop a candidate by unique id. Returns whether anything was removed.
    pub fn remove_reference(&mut self, unique_id: &str) -> bool {
        let before = self.references.len();
        self.references.retain(|r| r.unique_id != unique_id);
        self.references.len() < before
    }

    #[must_use]
    pub fn item(&self) -> Option<&ContentItem> {
        self.item.as_ref()
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn tracker(&self) -> Option<&dyn Tracker> {
        self.tracker.as_deref()
    }

    /// Stop the current pass. No condition or action runs after this.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Ask the evaluator to ignore the verdict of the condition being
    /// evaluated. Cleared once the evaluator has honoured it.
    pub fn set_skip_rule(&mut self, skip: bool) {
        self.skip_rule = skip;
    }

    #[must_use]
    pub fn skip_rule(&self) -> bool {
        self.skip_rule
    }
}

impl fmt::Debug for RuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("references", &self.references)
            .field("target", &self.target)
            .field("item", &self.item)
            .field("parameters", &self.parameters)
            .field("tracker", &self.tracker.is_some())
            .field("aborted", &self.aborted)
            .field("skip_rule", &self.skip_rule)
            .finish()
    }
}
