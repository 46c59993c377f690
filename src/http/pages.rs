//! Inline HTML pages.

use crate::model::Item;

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

pub(super) fn view(item: &Item) -> String {
    let id = item.id;
    let content = String::from_utf8_lossy(&item.body);
    let body = format!(
        "<h1>Item {id}</h1>\n<pre>{}</pre>\n<p><a href=\"/accept/{id}\">Accept</a> | <a href=\"/reject/{id}\">Reject</a></p>",
        escape(&content)
    );
    layout(&format!("Item {id}"), &body)
}

pub(super) fn nothing_to_review() -> String {
    layout("Review", "<h1>Nothing left to review</h1>")
}

pub(super) fn not_found(what: &str) -> String {
    let body = format!(
        "<h1>Not found</h1>\n<p>No item {} is waiting for review.</p>\n<p><a href=\"/\">Next item</a></p>",
        escape(what)
    );
    layout("Not found", &body)
}

pub(super) fn error(message: &str) -> String {
    let body = format!("<h1>Error</h1>\n<p>{}</p>", escape(message));
    layout("Error", &body)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, Stage};

    #[test]
    fn view_escapes_content() {
        let item = Item {
            id: ItemId::new(4).unwrap(),
            stage: Stage::Review,
            body: b"<script>alert('x')</script> & more".to_vec(),
        };
        let html = view(&item);
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
        assert!(html.contains("href=\"/accept/4\""));
        assert!(!html.contains("<script>"));
    }
}
