//! Page rendering
//!
//! Renders a [`PageView`] into a standalone HTML5 document. Rendering is a pure
//! function of the view, so regenerating an unchanged tree yields identical bytes.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::domain::{ChildView, NavLink, PageView};

/// Underline color groups, cycled over a page's child sections.
pub const COLOR_GROUPS: [&str; 4] = ["green", "blue", "purple", "red"];

const STYLE: &str = r#"
    body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; color: #333; }
    .page { max-width: 960px; margin: 0 auto; background: #fff; border-radius: 8px; padding: 24px; }
    .breadcrumb { font-size: 14px; margin-bottom: 16px; color: #666; }
    .breadcrumb a { color: #1976D2; text-decoration: none; }
    .breadcrumb .separator { margin: 0 6px; }
    .breadcrumb .current { font-weight: 600; color: #333; }
    .context { color: #555; margin-bottom: 24px; }
    .child { margin-bottom: 18px; }
    .child > a { font-size: 18px; font-weight: 600; color: #333; text-decoration: none; }
    .underline { height: 3px; border-radius: 2px; margin: 4px 0 8px 0; }
    .color-green { background-color: #388E3C; }
    .color-blue { background-color: #1976D2; }
    .color-purple { background-color: #7B1FA2; }
    .color-red { background-color: #D84315; }
    .grandchildren a { display: inline-block; margin: 0 10px 4px 0; color: #1976D2; text-decoration: none; }
    .siblings { border-top: 1px solid #e0e0e0; margin-top: 24px; padding-top: 12px; font-size: 14px; }
    .siblings a { margin-right: 10px; color: #1976D2; text-decoration: none; }
"#;

/// Turns a page view into a document string.
pub trait PageRenderer: Send + Sync {
    fn render(&self, view: &PageView) -> String;
}

/// Default HTML renderer with embedded CSS.
#[derive(Debug, Default, Clone)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn breadcrumb_bar(&self, view: &PageView) -> String {
        let mut html = String::from("<nav class=\"breadcrumb\">");
        let last = view.breadcrumbs.len().saturating_sub(1);
        for (i, crumb) in view.breadcrumbs.iter().enumerate() {
            if i > 0 {
                html.push_str("<span class=\"separator\">&gt;</span>");
            }
            if i == last {
                html.push_str(&format!(
                    "<span class=\"current\">{}</span>",
                    encode_text(&crumb.title)
                ));
            } else {
                html.push_str(&link(crumb));
            }
        }
        html.push_str("</nav>\n");
        html
    }

    fn child_section(&self, position: usize, child: &ChildView) -> String {
        let color = COLOR_GROUPS[position % COLOR_GROUPS.len()];
        let mut html = format!(
            "<section class=\"child\">{}<div class=\"underline color-{}\"></div>",
            link(&child.link),
            color
        );
        if !child.grandchildren.is_empty() {
            html.push_str("<div class=\"grandchildren\">");
            for grandchild in &child.grandchildren {
                html.push_str(&link(grandchild));
            }
            html.push_str("</div>");
        }
        html.push_str("</section>\n");
        html
    }

    fn sibling_list(&self, siblings: &[NavLink]) -> String {
        if siblings.is_empty() {
            return String::new();
        }
        let links: String = siblings.iter().map(link).collect();
        format!("<footer class=\"siblings\">See also: {}</footer>\n", links)
    }
}

impl PageRenderer for HtmlRenderer {
    fn render(&self, view: &PageView) -> String {
        let title = encode_text(&view.node.title);
        let mut body = self.breadcrumb_bar(view);
        body.push_str(&format!("<h1>{}</h1>\n", title));
        if let Some(context) = &view.context {
            body.push_str(&format!("<p class=\"context\">{}</p>\n", encode_text(context)));
        }
        for (position, child) in view.children.iter().enumerate() {
            body.push_str(&self.child_section(position, child));
        }
        body.push_str(&self.sibling_list(&view.siblings));

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
             <main class=\"page\" data-node-id=\"{id}\" data-level=\"{level}\">\n{body}</main>\n\
             </body>\n</html>\n",
            title = title,
            style = STYLE,
            id = encode_double_quoted_attribute(&view.node.id),
            level = view.level,
            body = body,
        )
    }
}

fn link(target: &NavLink) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        encode_double_quoted_attribute(target.artifact_ref.as_str()),
        encode_text(&target.title)
    )
}
