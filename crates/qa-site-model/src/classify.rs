//! Page-type classification (component F). Grounded on
//! `crawler.py`'s `_classify_page`.

use qa_browser_session::PageHandle;

const CLASSIFY_SCRIPT: &str = r#"(() => {
    const forms = document.querySelectorAll('form');
    const inputs = document.querySelectorAll('input, textarea, select');
    const dashWidgets = document.querySelectorAll(
        '[class*="dashboard"], [class*="widget"], [class*="chart"], [class*="metric"]'
    );
    const errorInd = document.querySelectorAll(
        '[class*="error"], [class*="404"], [class*="not-found"]'
    );
    const title = document.title.toLowerCase();
    const h1 = (document.querySelector('h1')?.textContent || '').toLowerCase();

    if (errorInd.length > 0 || title.includes('404') || title.includes('error') ||
        h1.includes('not found') || h1.includes('page not found'))
        return 'error';
    if (forms.length > 0 && inputs.length >= 3)
        return 'form';
    if (dashWidgets.length > 0)
        return 'dashboard';
    if (document.querySelectorAll('table, [role="grid"]').length > 0 &&
        document.querySelectorAll('a').length > 10)
        return 'listing';
    if (document.querySelector(
        'article, [class*="detail"], [class*="product"], [itemtype*="schema.org"]'
    ))
        return 'detail';
    return 'static';
})()"#;

/// Classifies the page currently loaded in `page` as one of: error, form,
/// dashboard, listing, detail, static — in that precedence order.
pub async fn classify_page(page: &dyn PageHandle) -> String {
    match page.evaluate(CLASSIFY_SCRIPT).await {
        Ok(value) => value.as_str().unwrap_or("static").to_string(),
        Err(_) => "static".to_string(),
    }
}
