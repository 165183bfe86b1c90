//! HTML rendering
//!
//! Compile-time askama templates under `templates/`. All server-provided
//! text is HTML-escaped by the template engine.

use askama::Template;

use super::{ActivityListView, PageView};

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    page: &'a PageView,
    list: &'a ActivityListView,
}

#[derive(Template)]
#[template(path = "activity_list.html")]
struct ActivityListTemplate<'a> {
    list: &'a ActivityListView,
}

/// Render the complete signup page
pub fn render_page_html(page: &PageView) -> Result<String, askama::Error> {
    PageTemplate {
        page,
        list: &page.list,
    }
    .render()
}

/// Render only the activity list fragment
pub fn render_list_html(list: &ActivityListView) -> Result<String, askama::Error> {
    ActivityListTemplate { list }.render()
}
