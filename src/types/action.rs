use super::{Action, ActionError, RuleContext};

/// Swap the component that fills the target placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRendering {
    pub rendering_id: String,
}

/// Point the target placement at a different datasource item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDatasource {
    pub datasource: String,
}

/// Remove the target placement from the candidates, so nothing is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HideRendering;

#[must_use]
pub fn set_rendering(rendering_id: &str) -> SetRendering {
    SetRendering {
        rendering_id: rendering_id.to_owned(),
    }
}

#[must_use]
pub fn set_datasource(datasource: &str) -> SetDatasource {
    SetDatasource {
        datasource: datasource.to_owned(),
    }
}

#[must_use]
pub fn hide() -> HideRendering {
    HideRendering
}

fn missing(ctx: &RuleContext) -> ActionError {
    ActionError::MissingReference {
        unique_id: ctx.target_id().to_owned(),
    }
}

impl Action for SetRendering {
    fn apply(&self, ctx: &mut RuleContext) -> Result<(), ActionError> {
        let Some(reference) = ctx.reference_mut() else {
            return Err(missing(ctx));
        };
        reference.rendering_id.clone_from(&self.rendering_id);
        Ok(())
    }

    fn unique_id(&self) -> Option<&str> {
        Some("set_rendering")
    }
}

impl Action for SetDatasource {
    fn apply(&self, ctx: &mut RuleContext) -> Result<(), ActionError> {
        let Some(reference) = ctx.reference_mut() else {
            return Err(missing(ctx));
        };
        reference.datasource = Some(self.datasource.clone());
        Ok(())
    }

    fn unique_id(&self) -> Option<&str> {
        Some("set_datasource")
    }
}

impl Action for HideRendering {
    fn apply(&self, ctx: &mut RuleContext) -> Result<(), ActionError> {
        let target = ctx.target_id().to_owned();
        ctx.remove_reference(&target);
        Ok(())
    }

    fn unique_id(&self) -> Option<&str> {
        Some("hide")
    }
}
