use std::fmt;

/// A placed rendering on a page layout: which component fills a placeholder,
/// and with which datasource.
///
/// `unique_id` identifies the placement itself and never changes during
/// personalization; `rendering_id` and `datasource` are what rules swap.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderingReference {
    pub unique_id: String,
    pub rendering_id: String,
    pub placeholder: String,
    pub datasource: Option<String>,
}

impl RenderingReference {
    #[must_use]
    pub fn new(unique_id: &str, rendering_id: &str) -> Self {
        Self {
            unique_id: unique_id.to_owned(),
            rendering_id: rendering_id.to_owned(),
            placeholder: String::new(),
            datasource: None,
        }
    }

    #[must_use]
    pub fn in_placeholder(mut self, placeholder: &str) -> Self {
        placeholder.clone_into(&mut self.placeholder);
        self
    }

    #[must_use]
    pub fn with_datasource(mut self, datasource: &str) -> Self {
        self.datasource = Some(datasource.to_owned());
        self
    }
}

impl fmt::Display for RenderingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.rendering_id, self.unique_id)?;
        if let Some(ds) = &self.datasource {
            write!(f, " datasource={ds}")?;
        }
        Ok(())
    }
}

/// The content item a page is rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentItem {
    pub id: String,
    pub path: String,
    pub language: String,
}

impl ContentItem {
    #[must_use]
    pub fn new(id: &str, path: &str, language: &str) -> Self {
        Self {
            id: id.to_owned(),
            path: path.to_owned(),
            language: language.to_owned(),
        }
    }
}
