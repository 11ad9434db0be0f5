//! Interactive-element cataloguing (component F). Grounded on
//! `examples/original_source/src/crawler/element_extractor.py`.

use md5::{Digest, Md5};
use qa_browser_session::PageHandle;
use tracing::{debug, warn};

use crate::types::ElementModel;

const EXTRACT_ELEMENTS_SCRIPT: &str = r#"(() => {
    const interactiveTags = new Set([
        'a', 'button', 'input', 'select', 'textarea', 'details', 'summary'
    ]);
    const interactiveRoles = new Set([
        'button', 'link', 'textbox', 'checkbox', 'radio', 'combobox',
        'listbox', 'menuitem', 'tab', 'switch', 'slider'
    ]);

    function getSelector(el) {
        if (el.dataset && el.dataset.testid) return `[data-testid="${el.dataset.testid}"]`;
        if (el.id) return `#${CSS.escape(el.id)}`;
        if (el.name && ['input', 'select', 'textarea'].includes(el.tagName.toLowerCase())) {
            return `${el.tagName.toLowerCase()}[name="${el.name}"]`;
        }
        if (el.getAttribute('aria-label')) {
            return `[aria-label="${el.getAttribute('aria-label')}"]`;
        }
        let sel = el.tagName.toLowerCase();
        if (el.className && typeof el.className === 'string') {
            const cls = el.className.trim().split(/\s+/).slice(0, 2).join('.');
            if (cls) sel += '.' + cls;
        }
        return sel;
    }

    function getRole(el) {
        if (el.getAttribute('role')) return el.getAttribute('role');
        const tag = el.tagName.toLowerCase();
        if (tag === 'a') return 'link';
        if (tag === 'button') return 'button';
        if (tag === 'input') {
            const t = el.type || 'text';
            if (t === 'checkbox') return 'checkbox';
            if (t === 'radio') return 'radio';
            if (t === 'submit') return 'button';
            return 'textbox';
        }
        if (tag === 'select') return 'combobox';
        if (tag === 'textarea') return 'textbox';
        return '';
    }

    function getElementType(el) {
        const tag = el.tagName.toLowerCase();
        if (tag === 'a') return 'link';
        if (tag === 'button' || (tag === 'input' && el.type === 'submit')) return 'button';
        if (tag === 'input') return 'input';
        if (tag === 'select') return 'dropdown';
        if (tag === 'textarea') return 'textarea';
        if (el.getAttribute('role') === 'tab') return 'tab';
        if (el.getAttribute('role') === 'menuitem') return 'menuitem';
        return tag;
    }

    const results = [];
    const allElements = document.querySelectorAll('*');
    for (const el of allElements) {
        const tag = el.tagName.toLowerCase();
        const role = el.getAttribute('role') || '';
        const isClickable = el.onclick || el.getAttribute('onclick');
        const isInteractive = interactiveTags.has(tag) ||
            interactiveRoles.has(role) ||
            isClickable ||
            el.getAttribute('tabindex') === '0';

        if (!isInteractive) continue;
        if (el.offsetParent === null && !el.closest('details')) continue;

        const attrs = {};
        for (const attr of el.attributes) {
            if (['class', 'style'].includes(attr.name)) continue;
            attrs[attr.name] = attr.value;
        }

        results.push({
            tag: tag,
            selector: getSelector(el),
            role: getRole(el),
            text_content: (el.textContent || '').trim().substring(0, 100),
            is_interactive: true,
            element_type: getElementType(el),
            attributes: attrs,
        });
    }
    return results;
})()"#;

/// Catalogs interactive elements on the page currently loaded in `page`.
/// Mirrors the original's fail-soft behavior: extraction errors yield an
/// empty catalogue rather than aborting the crawl.
pub async fn extract_elements(page: &dyn PageHandle) -> Vec<ElementModel> {
    let raw = match page.evaluate(EXTRACT_ELEMENTS_SCRIPT).await {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "element extraction failed");
            return Vec::new();
        }
    };

    let Some(array) = raw.as_array() else {
        return Vec::new();
    };

    let mut elements = Vec::with_capacity(array.len());
    for (i, item) in array.iter().enumerate() {
        let selector = item
            .get("selector")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let element_id = hash_id(&format!("{selector}:{i}"));

        let attributes = item
            .get("attributes")
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        elements.push(ElementModel {
            element_id,
            tag: field_str(item, "tag"),
            selector: selector.to_string(),
            role: field_str(item, "role"),
            text_content: field_str(item, "text_content"),
            is_interactive: item
                .get("is_interactive")
                .and_then(|v| v.as_bool())
                .unwrap_or(true),
            element_type: field_str(item, "element_type"),
            attributes,
        });
    }

    debug!(count = elements.len(), "extracted interactive elements");
    elements
}

fn field_str(item: &serde_json::Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn hash_id(input: &str) -> String {
    let digest = Md5::digest(input.as_bytes());
    format!("{digest:x}")[..10].to_string()
}

#[cfg(test)]
mod tests {
    use super::hash_id;

    #[test]
    fn hash_id_is_ten_hex_chars() {
        let id = hash_id("#login-btn:0");
        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_id_is_deterministic() {
        assert_eq!(hash_id("a:1"), hash_id("a:1"));
        assert_ne!(hash_id("a:1"), hash_id("a:2"));
    }
}
