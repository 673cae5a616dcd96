//! CSS selector generation for a document node.
//!
//! Produces a selector string that uniquely addresses the element within the
//! resource so the position can be serialized into an outbound locator.
//! Prefers a `#id` selector when the element carries an identifier; otherwise
//! builds a `body > tag:nth-of-type(n)` chain rooted at `body`.

use cssparser::serialize_identifier;

use super::arena::{Document, NodeId};

/// Generate a selector for `target`, rooted at `body`.
///
/// Falls back to `"body"` when the node is the body itself, is not an
/// element, or sits outside the body subtree.
pub fn css_selector_for(doc: &Document, target: NodeId) -> String {
    let body = match doc.body() {
        Some(b) => b,
        None => return "body".to_string(),
    };
    if target == body || !doc.is_element(target) {
        return "body".to_string();
    }
    if !doc.contains(body, target) {
        return "body".to_string();
    }

    let mut segments = Vec::new();
    let mut current = target;
    loop {
        if let Some(id) = doc.element_id(current)
            && !id.is_empty()
        {
            segments.push(format!("#{}", escape_ident(id)));
            break;
        }

        let tag = match doc.element_name(current) {
            Some(name) => name.as_ref().to_string(),
            None => break,
        };
        segments.push(format!("{}:nth-of-type({})", tag, nth_of_type(doc, current)));

        match doc.parent_element(current) {
            Some(parent) if parent != body => current = parent,
            _ => {
                segments.push("body".to_string());
                break;
            }
        }
    }

    segments.reverse();
    segments.join(" > ")
}

/// 1-based index of the element among same-tag siblings.
fn nth_of_type(doc: &Document, target: NodeId) -> usize {
    let parent = match doc.get(target).map(|n| n.parent) {
        Some(p) => p,
        None => return 1,
    };
    let tag = doc.element_name(target).cloned();
    let mut index = 0;
    for sibling in doc.element_children(parent) {
        if doc.element_name(sibling).cloned() == tag {
            index += 1;
        }
        if sibling == target {
            return index;
        }
    }
    1
}

/// Escape an identifier for use in a `#id` selector, per CSS serialization
/// rules (leading digits, control characters, and punctuation all covered).
fn escape_ident(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    // Writing into a String cannot fail.
    let _ = serialize_identifier(id, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_document_str, query_selector};

    #[test]
    fn test_id_fast_path() {
        let doc = parse_document_str(r#"<p id="p42">Hello</p>"#);
        let p = doc.find_by_tag("p").unwrap();
        assert_eq!(css_selector_for(&doc, p), "#p42");
    }

    #[test]
    fn test_nth_of_type_chain() {
        let doc = parse_document_str("<div><p>a</p><p>b</p></div>");
        let all: Vec<_> = crate::dom::query_selector_all(&doc, "p").unwrap();
        let selector = css_selector_for(&doc, all[1]);
        assert_eq!(selector, "body > div:nth-of-type(1) > p:nth-of-type(2)");
        // Round-trips through the query engine.
        assert_eq!(query_selector(&doc, &selector).unwrap(), all[1]);
    }

    #[test]
    fn test_ancestor_id_anchors_chain() {
        let doc = parse_document_str(r#"<section id="ch1"><div><p>x</p></div></section>"#);
        let p = doc.find_by_tag("p").unwrap();
        let selector = css_selector_for(&doc, p);
        assert_eq!(selector, "#ch1 > div:nth-of-type(1) > p:nth-of-type(1)");
        assert_eq!(query_selector(&doc, &selector).unwrap(), p);
    }

    #[test]
    fn test_body_fallback() {
        let doc = parse_document_str("<p>x</p>");
        let body = doc.body().unwrap();
        assert_eq!(css_selector_for(&doc, body), "body");
    }

    #[test]
    fn test_escaped_id() {
        let doc = parse_document_str(r#"<p id="ch.1">x</p>"#);
        let p = doc.find_by_tag("p").unwrap();
        let selector = css_selector_for(&doc, p);
        assert_eq!(selector, r"#ch\.1");
        assert_eq!(query_selector(&doc, &selector).unwrap(), p);
    }

    #[test]
    fn test_leading_digit_id() {
        let doc = parse_document_str(r#"<p id="1st">x</p>"#);
        let p = doc.find_by_tag("p").unwrap();
        let selector = css_selector_for(&doc, p);
        assert_eq!(selector, r"#\31 st");
        assert_eq!(query_selector(&doc, &selector).unwrap(), p);
    }
}
