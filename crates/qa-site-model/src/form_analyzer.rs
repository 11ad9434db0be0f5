//! Form field cataloguing (component F). Grounded on
//! `examples/original_source/src/crawler/form_analyzer.py`.

use md5::{Digest, Md5};
use qa_browser_session::PageHandle;
use tracing::{debug, warn};

use crate::types::{FormField, FormModel};

const ANALYZE_FORMS_SCRIPT: &str = r#"(() => {
    const forms = document.querySelectorAll('form');
    return Array.from(forms).map((form, fi) => {
        const fields = [];
        const inputs = form.querySelectorAll('input, select, textarea');

        for (const inp of inputs) {
            const tag = inp.tagName.toLowerCase();
            let fieldType = 'text';
            let options = null;

            if (tag === 'select') {
                fieldType = 'select';
                options = Array.from(inp.options).map(o => o.value).filter(v => v);
            } else if (tag === 'textarea') {
                fieldType = 'textarea';
            } else if (tag === 'input') {
                fieldType = inp.type || 'text';
            }

            if (['hidden', 'submit', 'button', 'reset', 'image'].includes(fieldType)) continue;

            let selector = '';
            if (inp.id) selector = `#${CSS.escape(inp.id)}`;
            else if (inp.name) selector = `${tag}[name="${inp.name}"]`;
            else selector = `form:nth-of-type(${fi + 1}) ${tag}:nth-of-type(${Array.from(form.querySelectorAll(tag)).indexOf(inp) + 1})`;

            fields.push({
                name: inp.name || inp.id || '',
                field_type: fieldType,
                required: inp.required || inp.getAttribute('aria-required') === 'true',
                validation_pattern: inp.pattern || null,
                options: options,
                selector: selector,
            });
        }

        let submitSelector = '';
        const submitBtn = form.querySelector('button[type="submit"], input[type="submit"]');
        if (submitBtn) {
            if (submitBtn.id) submitSelector = `#${CSS.escape(submitBtn.id)}`;
            else submitSelector = `form:nth-of-type(${fi + 1}) button[type="submit"], form:nth-of-type(${fi + 1}) input[type="submit"]`;
        } else {
            const anyBtn = form.querySelector('button');
            if (anyBtn) {
                if (anyBtn.id) submitSelector = `#${CSS.escape(anyBtn.id)}`;
                else submitSelector = `form:nth-of-type(${fi + 1}) button`;
            }
        }

        return {
            action: form.action || '',
            method: (form.method || 'GET').toUpperCase(),
            fields: fields,
            submit_selector: submitSelector,
        };
    });
})()"#;

/// Catalogs every `<form>` on the page currently loaded in `page`. Fail-soft:
/// analysis errors yield an empty catalogue.
pub async fn analyze_forms(page: &dyn PageHandle) -> Vec<FormModel> {
    let raw = match page.evaluate(ANALYZE_FORMS_SCRIPT).await {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "form analysis failed");
            return Vec::new();
        }
    };

    let Some(array) = raw.as_array() else {
        return Vec::new();
    };

    let mut forms = Vec::with_capacity(array.len());
    for (i, item) in array.iter().enumerate() {
        let action = item
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let form_id = hash_id(&format!("form:{i}:{action}"));

        let fields = item
            .get("fields")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(parse_field).collect())
            .unwrap_or_default();

        forms.push(FormModel {
            form_id,
            action,
            method: item
                .get("method")
                .and_then(|v| v.as_str())
                .unwrap_or("GET")
                .to_string(),
            fields,
            submit_selector: item
                .get("submit_selector")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        });
    }

    debug!(count = forms.len(), "analyzed forms");
    forms
}

fn parse_field(item: &serde_json::Value) -> FormField {
    FormField {
        name: item
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        field_type: item
            .get("field_type")
            .and_then(|v| v.as_str())
            .unwrap_or("text")
            .to_string(),
        required: item
            .get("required")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        validation_pattern: item
            .get("validation_pattern")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        options: item.get("options").and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        }),
        selector: item
            .get("selector")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    }
}

fn hash_id(input: &str) -> String {
    let digest = Md5::digest(input.as_bytes());
    format!("{digest:x}")[..10].to_string()
}

#[cfg(test)]
mod tests {
    use super::hash_id;

    #[test]
    fn form_id_is_ten_hex_chars() {
        let id = hash_id("form:0:/login");
        assert_eq!(id.len(), 10);
    }
}
