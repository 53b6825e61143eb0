//! Form and link extraction from HTML

use crate::models::{FetchedPage, Form, InputField};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Everything the crawler takes from one page
#[derive(Debug, Default)]
pub struct Extraction {
    pub forms: Vec<Form>,
    /// Absolute link URLs, not yet filtered by origin
    pub links: Vec<String>,
}

/// Extracts forms and links from a fetched page.
/// Malformed markup never fails; html5ever recovers what it can.
pub fn extract(page: &FetchedPage) -> Extraction {
    let document = Html::parse_document(&page.body);
    let base = Url::parse(&page.url).ok();

    Extraction {
        forms: extract_forms(&document, &page.url),
        links: extract_links(&document, base.as_ref()),
    }
}

/// Extracts every `<form>` with its `input`, `textarea` and `select` fields
pub fn extract_forms(document: &Html, source_url: &str) -> Vec<Form> {
    let (Ok(form_sel), Ok(field_sel)) = (
        Selector::parse("form"),
        Selector::parse("input, textarea, select"),
    ) else {
        return Vec::new();
    };

    document
        .select(&form_sel)
        .map(|form| Form {
            source_url: source_url.to_string(),
            action: attr_or(&form, "action", ""),
            method: attr_or(&form, "method", "get"),
            inputs: form
                .select(&field_sel)
                .map(|field| InputField {
                    name: attr_or(&field, "name", ""),
                    input_type: attr_or(&field, "type", "text"),
                    value: attr_or(&field, "value", ""),
                })
                .collect(),
        })
        .collect()
}

/// Extracts `a[href]` targets, resolved against `base`
pub fn extract_links(document: &Html, base: Option<&Url>) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect()
}

/// Resolves one href. Fragment-only and `javascript:` links are dropped;
/// absolute http(s) links are kept verbatim.
pub fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    if href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    base?.join(href).ok().map(|u| u.to_string())
}

fn attr_or(element: &ElementRef<'_>, name: &str, default: &str) -> String {
    element.value().attr(name).unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;

    fn page(url: &str, body: &str) -> FetchedPage {
        FetchedPage {
            url: url.to_string(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_extract_forms_with_defaults() {
        let html = r#"
            <form action="/login">
                <input name="username">
                <input type="password" name="password" value="x">
                <input type="submit">
                <textarea name="comment"></textarea>
                <select name="role"><option>a</option></select>
            </form>
        "#;
        let extraction = extract(&page("https://example.com/", html));
        assert_eq!(extraction.forms.len(), 1);

        let form = &extraction.forms[0];
        assert_eq!(form.method, "get");
        assert_eq!(form.action, "/login");
        assert_eq!(form.source_url, "https://example.com/");
        assert_eq!(form.inputs.len(), 5);
        assert_eq!(form.inputs[0].input_type, "text");
        assert_eq!(form.inputs[1].value, "x");
        // Nameless fields are kept with an empty name
        assert_eq!(form.inputs[2].name, "");
        assert_eq!(form.inputs[2].input_type, "submit");
        assert_eq!(form.inputs[3].name, "comment");
        assert_eq!(form.inputs[4].input_type, "text");
    }

    #[test]
    fn test_extract_links() {
        let html = r##"
            <a href="/about">About</a>
            <a href="contact">Contact</a>
            <a href="https://other.example.org/x">Elsewhere</a>
            <a href="#top">Top</a>
            <a href="javascript:void(0)">Nothing</a>
            <a>No href</a>
        "##;
        let extraction = extract(&page("https://example.com/dir/index.html", html));
        assert_eq!(
            extraction.links,
            vec![
                "https://example.com/about".to_string(),
                "https://example.com/dir/contact".to_string(),
                "https://other.example.org/x".to_string(),
            ]
        );
    }

    #[test]
    fn test_malformed_markup_still_extracts() {
        let html = r#"<html><body><form method="POST"><input name="q" <div></form>
            <a href="/next">next<p><table><tr><td></body>"#;
        let extraction = extract(&page("http://example.com/", html));
        assert_eq!(extraction.forms.len(), 1);
        assert!(extraction.forms[0].is_post());
        assert!(extraction
            .links
            .contains(&"http://example.com/next".to_string()));
    }

    #[test]
    fn test_empty_body() {
        let extraction = extract(&page("http://example.com/", ""));
        assert!(extraction.forms.is_empty());
        assert!(extraction.links.is_empty());
    }
}
