//! Handlebars templates for the site pages
//!
//! Templates are compiled into the binary. Every page template wraps its
//! body in the `layout` partial and receives `{ layout, page }`.

use handlebars::Handlebars;
use serde::Serialize;

use super::views::LayoutView;
use crate::error::Result;

const LAYOUT_TEMPLATE: &str = include_str!("../../templates/layout.hbs");
const BLOCKS_TEMPLATE: &str = include_str!("../../templates/blocks.hbs");

/// Page templates as `(name, source)`
const PAGE_TEMPLATES: &[(&str, &str)] = &[
    ("home", include_str!("../../templates/home.hbs")),
    ("contents", include_str!("../../templates/contents.hbs")),
    ("content", include_str!("../../templates/content.hbs")),
    ("page", include_str!("../../templates/page.hbs")),
    ("contact", include_str!("../../templates/contact.hbs")),
    ("register", include_str!("../../templates/register.hbs")),
    ("error", include_str!("../../templates/error.hbs")),
];

#[derive(Serialize)]
struct PageData<'a, T: Serialize> {
    layout: &'a LayoutView,
    page: &'a T,
}

/// Compiled page templates
pub struct SiteTemplates {
    handlebars: Handlebars<'static>,
}

impl SiteTemplates {
    /// Compile the built-in templates
    ///
    /// # Errors
    ///
    /// Fails if a template does not parse.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        handlebars.register_partial("layout", LAYOUT_TEMPLATE)?;
        handlebars.register_partial("blocks", BLOCKS_TEMPLATE)?;

        for (name, source) in PAGE_TEMPLATES {
            handlebars.register_template_string(name, *source)?;
        }

        Ok(Self { handlebars })
    }

    /// Names of the registered page templates
    pub fn names(&self) -> Vec<&'static str> {
        PAGE_TEMPLATES.iter().map(|(name, _)| *name).collect()
    }

    /// Render page `name` inside the shared layout
    pub fn render<T: Serialize>(&self, name: &str, layout: &LayoutView, page: &T) -> Result<String> {
        let data = PageData { layout, page };
        Ok(self.handlebars.render(name, &data)?)
    }
}

impl std::fmt::Debug for SiteTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteTemplates")
            .field("templates", &self.names())
            .finish()
    }
}
