//! HTML rendering for the question form

use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use docqa_core::{Error, Result};

const PAGE_TEMPLATE_NAME: &str = "index.html";
const PAGE_TEMPLATE: &str = include_str!("templates/index.html");

/// Static text shown around the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub title: String,
    pub description: String,
    pub input_label: String,
    pub output_label: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "📚 Document QA".to_string(),
            description: "Answers questions from your document knowledge base using a persisted vector index and a hosted language model.".to_string(),
            input_label: "Ask a question about your documents:".to_string(),
            output_label: "Answer".to_string(),
        }
    }
}

/// Renders the form page; the `.html` template name turns on autoescaping
pub struct PageRenderer {
    env: Environment<'static>,
    config: PageConfig,
}

impl PageRenderer {
    pub fn new(config: PageConfig) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)
            .map_err(template_error)?;
        Ok(Self { env, config })
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// `answer` fills the output area, `failed` styles it as an error
    pub fn render(&self, question: &str, answer: Option<&str>, failed: bool) -> Result<String> {
        let template = self
            .env
            .get_template(PAGE_TEMPLATE_NAME)
            .map_err(template_error)?;
        template
            .render(context! {
                page => &self.config,
                question => question,
                answer => answer.unwrap_or_default(),
                failed => failed,
            })
            .map_err(template_error)
    }
}

fn template_error(e: minijinja::Error) -> Error {
    Error::Other(format!("template error: {}", e))
}
