//! Tiers 1 and 2 of selector resolution: explicit overrides, then heuristic
//! form scoring over the already-extracted `FormModel`s. Grounded on
//! `examples/original_source/src/auth/smart_auth.py`'s `_resolve_selectors`,
//! `_auto_detect_login_form`, `_score_login_form`, `_find_password_field`,
//! `_find_username_field` and `_detect_orphan_login_fields`.

use qa_browser_session::PageHandle;
use qa_site_model::FormModel;
use serde_json::Value;
use tracing::debug;

use crate::types::{DetectionMethod, ExplicitSelectors, LoginSelectors};

const LOGIN_ACTION_KEYWORDS: &[&str] = &["login", "signin", "sign-in", "sign_in", "auth", "session"];
const USERNAME_NAME_KEYWORDS: &[&str] = &["user", "email", "login", "account", "identifier"];

const SCORE_THRESHOLD: i32 = 12;

/// Tier 1: honors caller-supplied selectors as-is, requiring at least a
/// password selector (a bare username-only override is not actionable).
pub fn try_explicit(explicit: &ExplicitSelectors) -> Option<LoginSelectors> {
    let password_selector = explicit.password_selector.clone()?;
    Some(LoginSelectors {
        username_selector: explicit.username_selector.clone(),
        password_selector,
        submit_selector: explicit.submit_selector.clone(),
        detection_method: DetectionMethod::Explicit,
    })
}

/// Tier 2: scores every form on the page and, if none clears the threshold,
/// falls back to an orphan-field scan for SPA login widgets with no `<form>`
/// wrapper.
pub async fn auto_detect(
    page: &dyn PageHandle,
    forms: &[FormModel],
) -> Option<LoginSelectors> {
    let mut best: Option<(i32, &FormModel)> = None;
    for form in forms {
        let score = score_login_form(form);
        debug!(form_id = %form.form_id, score, "scored candidate login form");
        if score >= SCORE_THRESHOLD && best.map(|(b, _)| score > b).unwrap_or(true) {
            best = Some((score, form));
        }
    }

    if let Some((_, form)) = best {
        let password = find_password_field(form)?;
        let username = find_username_field(form, &password);
        return Some(LoginSelectors {
            username_selector: username.map(|f| f.selector.clone()),
            password_selector: password.selector.clone(),
            submit_selector: if form.submit_selector.is_empty() {
                None
            } else {
                Some(form.submit_selector.clone())
            },
            detection_method: DetectionMethod::Heuristic,
        });
    }

    detect_orphan_login_fields(page).await
}

/// Mirrors `_score_login_form`'s point system exactly.
fn score_login_form(form: &FormModel) -> i32 {
    let mut score = 0i32;
    let has_password = form.fields.iter().any(|f| f.field_type == "password");
    let has_text_or_email = form
        .fields
        .iter()
        .any(|f| f.field_type == "text" || f.field_type == "email");

    if has_password {
        score += 10;
    }
    if has_text_or_email {
        score += 5;
    }

    let field_count = form.fields.len();
    if (1..=4).contains(&field_count) {
        score += 3;
    }
    if field_count < 6 {
        score += 1;
    }
    if !form.submit_selector.is_empty() {
        score += 2;
    }

    let action_lower = form.action.to_lowercase();
    if LOGIN_ACTION_KEYWORDS.iter().any(|kw| action_lower.contains(kw)) {
        score += 3;
    }

    score
}

/// 4-tier priority: only password-type field always wins (there's exactly
/// one candidate role), kept as a function for symmetry with `find_username_field`.
fn find_password_field(form: &FormModel) -> Option<&qa_site_model::FormField> {
    form.fields.iter().find(|f| f.field_type == "password")
}

/// `_find_username_field`'s 4-tier priority: email-typed field, then a
/// keyword match on the field name, then (if exactly one non-password text
/// field remains) that lone field, then simply the first text-like field.
fn find_username_field<'a>(
    form: &'a FormModel,
    password: &qa_site_model::FormField,
) -> Option<&'a qa_site_model::FormField> {
    if let Some(f) = form.fields.iter().find(|f| f.field_type == "email") {
        return Some(f);
    }

    if let Some(f) = form.fields.iter().find(|f| {
        f.field_type != "password"
            && USERNAME_NAME_KEYWORDS
                .iter()
                .any(|kw| f.name.to_lowercase().contains(kw))
    }) {
        return Some(f);
    }

    let text_fields: Vec<&qa_site_model::FormField> = form
        .fields
        .iter()
        .filter(|f| f.field_type == "text" && f.selector != password.selector)
        .collect();
    if text_fields.len() == 1 {
        return Some(text_fields[0]);
    }

    form.fields
        .iter()
        .find(|f| (f.field_type == "text" || f.field_type == "email") && f.selector != password.selector)
}

const ORPHAN_FIELDS_SCRIPT: &str = r#"
(() => {
    const isVisible = (el) => el.offsetParent !== null;
    const passwordInputs = Array.from(document.querySelectorAll('input[type="password"]')).filter(isVisible);
    if (passwordInputs.length === 0) return null;
    const password = passwordInputs[0];
    if (password.closest('form')) return null;

    const candidateSelector = (el) => {
        if (el.id) return `#${el.id}`;
        if (el.name) return `[name="${el.name}"]`;
        return null;
    };

    const passwordSelector = candidateSelector(password);
    if (!passwordSelector) return null;

    const textInputs = Array.from(document.querySelectorAll('input[type="text"], input[type="email"], input:not([type])')).filter(isVisible);
    let username = null;
    for (const el of textInputs) {
        if (el.closest('form')) continue;
        const sel = candidateSelector(el);
        if (sel) { username = sel; break; }
    }

    let submit = null;
    const buttons = Array.from(document.querySelectorAll('button, input[type="submit"]')).filter(isVisible);
    for (const el of buttons) {
        if (el.closest('form')) continue;
        const text = (el.textContent || el.value || '').toLowerCase();
        if (text.includes('log') || text.includes('sign')) {
            submit = candidateSelector(el) || (el.tagName === 'BUTTON' ? 'button' : null);
            break;
        }
    }

    return { username_selector: username, password_selector: passwordSelector, submit_selector: submit };
})()
"#;

/// SPA login widgets sometimes render fields without wrapping them in a
/// `<form>` element, which `analyze_forms` never sees. This scans the live
/// DOM directly for an un-wrapped password field and its nearby siblings.
async fn detect_orphan_login_fields(page: &dyn PageHandle) -> Option<LoginSelectors> {
    let result = page.evaluate(ORPHAN_FIELDS_SCRIPT).await.ok()?;
    if result.is_null() {
        return None;
    }
    let password_selector = result.get("password_selector")?.as_str()?.to_string();
    let username_selector = extract_str(&result, "username_selector");
    let submit_selector = extract_str(&result, "submit_selector");

    Some(LoginSelectors {
        username_selector,
        password_selector,
        submit_selector,
        detection_method: DetectionMethod::Heuristic,
    })
}

fn extract_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Last-resort tier used when explicit, heuristic and LLM-vision resolution
/// all fail: generic type-based selectors with no confidence that they match
/// a real login form on this particular page.
pub fn partial_fallback() -> LoginSelectors {
    LoginSelectors {
        username_selector: Some("input[type=\"email\"], input[type=\"text\"]".to_string()),
        password_selector: "input[type=\"password\"]".to_string(),
        submit_selector: Some("button[type=\"submit\"], input[type=\"submit\"]".to_string()),
        detection_method: DetectionMethod::PartialFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_site_model::FormField;

    fn field(name: &str, field_type: &str, selector: &str) -> FormField {
        FormField {
            name: name.to_string(),
            field_type: field_type.to_string(),
            required: false,
            validation_pattern: None,
            options: None,
            selector: selector.to_string(),
        }
    }

    #[test]
    fn scores_clear_login_form_above_threshold() {
        let form = FormModel {
            form_id: "f1".to_string(),
            action: "/login".to_string(),
            method: "POST".to_string(),
            fields: vec![field("email", "email", "#email"), field("password", "password", "#password")],
            submit_selector: "#submit".to_string(),
        };
        assert!(score_login_form(&form) >= SCORE_THRESHOLD);
    }

    #[test]
    fn scores_unrelated_form_below_threshold() {
        let form = FormModel {
            form_id: "f2".to_string(),
            action: "/search".to_string(),
            method: "GET".to_string(),
            fields: vec![field("q", "text", "#q")],
            submit_selector: String::new(),
        };
        assert!(score_login_form(&form) < SCORE_THRESHOLD);
    }

    #[test]
    fn finds_username_by_email_type_first() {
        let form = FormModel {
            form_id: "f3".to_string(),
            action: "/login".to_string(),
            method: "POST".to_string(),
            fields: vec![
                field("foo", "text", "#foo"),
                field("email", "email", "#email"),
                field("password", "password", "#password"),
            ],
            submit_selector: String::new(),
        };
        let password = find_password_field(&form).unwrap();
        let username = find_username_field(&form, password).unwrap();
        assert_eq!(username.selector, "#email");
    }
}
