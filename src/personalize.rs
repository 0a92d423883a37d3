//! Applying rule-list decisions to a render target.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::settings::Settings;
use crate::{
    Action, ContentItem, Parameters, RenderingReference, Rule, RuleContext, RuleEvaluator, RuleList,
    Tracker,
};

/// Supplies the personalization rules configured for a rendering.
pub trait RuleSource: Send + Sync {
    /// Rules for `reference` in the given language and content database.
    /// `None` or an empty list means the rendering is not personalized.
    fn rules_for(
        &self,
        reference: &RenderingReference,
        language: &str,
        database: &str,
    ) -> Option<RuleList>;
}

/// Downstream consumer told about every evaluated condition and every
/// applied action, e.g. an analytics pipeline recording which
/// personalization rules were exposed.
pub trait AuditPipeline: Send + Sync {
    /// An empty pipeline is not wired into the pass at all.
    fn is_empty(&self) -> bool;

    /// A rule's condition was evaluated.
    fn run(&self, rules: &RuleList, ctx: &RuleContext, rule: &Rule);

    /// One of the matching rule's actions was applied.
    fn applied(&self, _rules: &RuleList, _ctx: &RuleContext, _rule: &Rule, _action: &dyn Action) {}
}

/// What ends up rendered in the target placement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Renderer {
    Rendering(RenderingReference),
    /// Render nothing.
    Empty,
}

/// The page being rendered.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub item: Option<ContentItem>,
    pub language: String,
    pub database: String,
}

/// Per-rendering customization state owned by the host's response pipeline.
#[derive(Clone)]
pub struct CustomizationState {
    rendering: RenderingReference,
    page: PageContext,
    parameters: Parameters,
    tracker: Option<Arc<dyn Tracker>>,
    renderer: Option<Renderer>,
    customized: bool,
}

impl CustomizationState {
    #[must_use]
    pub fn new(rendering: RenderingReference, page: PageContext) -> Self {
        Self {
            rendering,
            page,
            parameters: Parameters::new(),
            tracker: None,
            renderer: None,
            customized: false,
        }
    }

    /// Extra parameters passed through to the rule context.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// The visitor tracker for this request, when tracking is active.
    #[must_use]
    pub fn with_tracker(mut self, tracker: Arc<dyn Tracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    #[must_use]
    pub fn rendering(&self) -> &RenderingReference {
        &self.rendering
    }

    #[must_use]
    pub fn page(&self) -> &PageContext {
        &self.page
    }

    #[must_use]
    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.renderer = Some(renderer);
    }

    #[must_use]
    pub fn is_customized(&self) -> bool {
        self.customized
    }

    /// Mark this rendering as customized. There is no way back.
    pub fn mark_customized(&mut self) {
        self.customized = true;
    }
}

impl fmt::Debug for CustomizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomizationState")
            .field("rendering", &self.rendering)
            .field("page", &self.page)
            .field("parameters", &self.parameters)
            .field("tracker", &self.tracker.is_some())
            .field("renderer", &self.renderer)
            .field("customized", &self.customized)
            .finish()
    }
}

/// Decides whether a rendering is personalized and applies the outcome once.
pub struct Personalizer<S> {
    source: S,
    settings: Settings,
    sink: Arc<dyn DiagnosticSink>,
    audit: Option<Arc<dyn AuditPipeline>>,
}

impl<S: RuleSource> Personalizer<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            settings: Settings::default(),
            sink: Arc::new(TracingSink),
            audit: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditPipeline>) -> Self {
        self.audit = Some(audit);
        self
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Personalize the rendering in `state`, at most once.
    ///
    /// Does nothing when the state is already customized, when the page has
    /// no content item, or when no rules are configured for the rendering.
    /// Evaluation failures never escape; see [`RuleEvaluator`]. A pass that
    /// aborts leaves the rendering and renderer as they were, but the state
    /// still counts as customized.
    pub fn process(&self, state: &mut CustomizationState) {
        if state.is_customized() {
            return;
        }
        let Some(item) = state.page.item.clone() else {
            return;
        };

        let Some(rules) = self
            .source
            .rules_for(&state.rendering, &state.page.language, &state.page.database)
            .filter(|rules| !rules.is_empty())
        else {
            return;
        };
        let rules = if rules.name().is_some() {
            rules
        } else {
            let name = format!("rendering {}", state.rendering.unique_id);
            rules.renamed(&name)
        };

        let mut ctx = self.context_for(state, item);
        let executed = self.evaluator().run_first_match(&rules, &mut ctx);
        debug!(
            rendering = %state.rendering,
            executed,
            aborted = ctx.is_aborted(),
            "personalization rules evaluated"
        );

        if !ctx.is_aborted() {
            apply(state, &ctx);
        }
        state.mark_customized();
    }

    fn context_for(&self, state: &CustomizationState, item: ContentItem) -> RuleContext {
        let mut parameters = state.parameters.clone();
        parameters.insert("rendering.id", state.rendering.rendering_id.as_str());
        parameters.insert("rendering.placeholder", state.rendering.placeholder.as_str());
        parameters.insert("item.path", item.path.as_str());
        parameters.insert("item.language", item.language.as_str());

        let ctx = RuleContext::for_reference(state.rendering.clone())
            .with_item(item)
            .with_parameters(parameters);
        match &state.tracker {
            Some(tracker) => ctx.with_tracker(Arc::clone(tracker)),
            None => ctx,
        }
    }

    fn evaluator(&self) -> RuleEvaluator {
        let evaluator =
            RuleEvaluator::with_settings(self.settings.clone()).with_sink(Arc::clone(&self.sink));
        match &self.audit {
            Some(audit) if !audit.is_empty() => {
                let evaluated = Arc::clone(audit);
                let applied = Arc::clone(audit);
                evaluator
                    .on_evaluated(move |rules, ctx, rule| evaluated.run(rules, ctx, rule))
                    .on_applied(move |rules, ctx, rule, action| {
                        applied.applied(rules, ctx, rule, action);
                    })
            }
            _ => evaluator,
        }
    }
}

impl<S> fmt::Debug for Personalizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Personalizer")
            .field("settings", &self.settings)
            .field("audit", &self.audit.is_some())
            .finish_non_exhaustive()
    }
}

/// Write the context's decision back: the target's (possibly swapped)
/// rendering, or an empty renderer when the target was removed.
fn apply(state: &mut CustomizationState, ctx: &RuleContext) {
    match ctx.reference() {
        Some(chosen) => {
            state.rendering = chosen.clone();
            state.set_renderer(Renderer::Rendering(chosen.clone()));
        }
        None => state.set_renderer(Renderer::Empty),
    }
}

/// [`RuleSource`] backed by a map from rendering unique id to rules, with
/// optional per-language overrides. The database is not part of the key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRuleSource {
    rules: HashMap<(String, Option<String>), RuleList>,
}

impl InMemoryRuleSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for a rendering in every language.
    #[must_use]
    pub fn with(mut self, unique_id: &str, rules: RuleList) -> Self {
        self.insert(unique_id, None, rules);
        self
    }

    /// Register rules; a `Some` language takes precedence over `None`.
    pub fn insert(&mut self, unique_id: &str, language: Option<&str>, rules: RuleList) {
        self.rules
            .insert((unique_id.to_owned(), language.map(str::to_owned)), rules);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleSource for InMemoryRuleSource {
    fn rules_for(
        &self,
        reference: &RenderingReference,
        language: &str,
        _database: &str,
    ) -> Option<RuleList> {
        let id = reference.unique_id.clone();
        self.rules
            .get(&(id.clone(), Some(language.to_owned())))
            .or_else(|| self.rules.get(&(id, None)))
            .cloned()
    }
}
