//! Site model condensation for the planning prompt — caps pages/elements so
//! a large crawl still fits the model's context window. Grounded on
//! `examples/original_source/src/planner/planner.py`'s `_summarize_site_model`.

use qa_site_model::SiteModel;
use serde_json::json;

const MAX_PAGES: usize = 30;
const MAX_ELEMENTS_PER_PAGE: usize = 20;
const MAX_ELEMENT_TEXT_CHARS: usize = 50;

pub fn summarize_site_model(site_model: &SiteModel) -> String {
    let pages: Vec<_> = site_model
        .pages
        .iter()
        .take(MAX_PAGES)
        .map(|page| {
            let interactive_elements_count = page.elements.iter().filter(|e| e.is_interactive).count();
            let forms: Vec<_> = page
                .forms
                .iter()
                .map(|f| {
                    json!({
                        "form_id": f.form_id,
                        "method": f.method,
                        "fields": f.fields.iter().map(|ff| json!({
                            "name": ff.name,
                            "type": ff.field_type,
                            "required": ff.required,
                        })).collect::<Vec<_>>(),
                        "submit_selector": f.submit_selector,
                    })
                })
                .collect();
            let key_elements: Vec<_> = page
                .elements
                .iter()
                .filter(|e| e.is_interactive)
                .take(MAX_ELEMENTS_PER_PAGE)
                .map(|e| {
                    let text: String = e.text_content.chars().take(MAX_ELEMENT_TEXT_CHARS).collect();
                    json!({
                        "selector": e.selector,
                        "type": e.element_type,
                        "text": text,
                    })
                })
                .collect();

            json!({
                "page_id": page.page_id,
                "url": page.url,
                "page_type": page.page_type,
                "title": page.title,
                "auth_required": page.auth_required,
                "interactive_elements_count": interactive_elements_count,
                "forms": forms,
                "key_elements": key_elements,
            })
        })
        .collect();

    let summary = json!({
        "base_url": site_model.base_url,
        "pages": pages,
        "api_endpoints_count": site_model.api_endpoints.len(),
        "has_auth": site_model.auth_flow.is_some(),
    });

    serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_site_model::PageModel;

    #[test]
    fn caps_pages_at_thirty() {
        let pages: Vec<_> = (0..40)
            .map(|i| PageModel {
                page_id: format!("p{i}"),
                url: format!("https://example.com/{i}"),
                ..Default::default()
            })
            .collect();
        let model = SiteModel {
            base_url: "https://example.com".to_string(),
            pages,
            ..Default::default()
        };
        let summary = summarize_site_model(&model);
        let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(parsed["pages"].as_array().unwrap().len(), 30);
    }
}
