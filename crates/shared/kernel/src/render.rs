//! Server-side HTML rendering.
//!
//! Templates are compiled into the binary and loaded into a shared
//! [`minijinja::Environment`] at bootstrap, so a rendering problem in a
//! template surfaces at startup instead of on the first request.

use minijinja::Environment;
use std::sync::Arc;
use thiserror::Error;

pub use minijinja::{Value, context};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Ordinal CSS class for a leaderboard position; positions past third place
/// get no special styling.
#[must_use]
pub fn rank(position: u32) -> &'static str {
    match position {
        1 => "first",
        2 => "second",
        3 => "third",
        _ => "",
    }
}

/// A cloneable handle to the compiled template set.
#[derive(Debug, Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    /// Compiles the embedded template set and registers the custom filters.
    ///
    /// # Errors
    /// Returns [`RenderError::Template`] if any embedded template fails to
    /// parse, which would be a packaging defect.
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_filter("rank", |position: u32| rank(position).to_owned());

        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("index.html", include_str!("../templates/index.html"))?;
        env.add_template("news_detail.html", include_str!("../templates/news_detail.html"))?;
        env.add_template("not_found.html", include_str!("../templates/not_found.html"))?;

        Ok(Self { env: Arc::new(env) })
    }

    /// Renders the named template with the given context.
    ///
    /// # Errors
    /// Returns [`RenderError::Template`] if the template is unknown or the
    /// context does not satisfy it.
    pub fn render(&self, name: &str, ctx: Value) -> Result<String, RenderError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }
}
