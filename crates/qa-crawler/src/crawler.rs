//! The crawl loop itself: pops the frontier, navigates, extracts content,
//! discovers links by the union of four strategies, and backfills from the
//! sitemap after the first page. Grounded on
//! `examples/original_source/src/crawler/crawler.py::Crawler`.

use std::collections::HashMap;
use std::time::Duration;

use qa_browser_session::{BrowserSession, BrowserSessionFactory, PageHandle, StorageState, WaitUntil};
use qa_config::FrameworkConfig;
use qa_core_types::{normalize_url, page_id_from_url};
use qa_llm::LlmClient;
use qa_site_model::{
    analyze_forms, classify_page, extract_elements, ApiEndpoint, AuthFlow, AuthRequirement,
    NetworkRequest, PageModel, SiteModel,
};
use qa_smart_auth::{authenticate_and_capture_state, Credentials, ExplicitSelectors};
use tracing::{error, info, warn};

use crate::auth_probe::probe_auth_requirements;
use crate::frontier::{Frontier, PRIORITY_ORGANIC, PRIORITY_START};
use crate::links::{
    detect_spa_type, discover_interactive_links, discover_spa_routes, extract_dynamic_links,
    extract_static_links,
};
use crate::scope::{is_valid_page_url, is_same_origin, url_in_scope};
use crate::sitemap::load_sitemap_backfill;

const NAV_TIMEOUT: Duration = Duration::from_secs(30);
const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const NETWORK_IDLE_FALLBACK_WAIT: Duration = Duration::from_secs(2);
const NAV_RETRIES: u32 = 2;

pub struct Crawler<'a> {
    config: &'a FrameworkConfig,
    factory: &'a BrowserSessionFactory,
    llm: &'a dyn LlmClient,

    visited_pages: Vec<PageModel>,
    nav_graph: HashMap<String, Vec<String>>,
    api_endpoints: HashMap<String, ApiEndpoint>,
    is_spa: bool,
}

impl<'a> Crawler<'a> {
    pub fn new(config: &'a FrameworkConfig, factory: &'a BrowserSessionFactory, llm: &'a dyn LlmClient) -> Self {
        Self {
            config,
            factory,
            llm,
            visited_pages: Vec::new(),
            nav_graph: HashMap::new(),
            api_endpoints: HashMap::new(),
            is_spa: false,
        }
    }

    pub async fn crawl(mut self) -> SiteModel {
        let started = std::time::Instant::now();
        let target = self.config.crawl.target_url.clone();
        info!(target = %target, "starting crawl");

        let (auth_flow, storage_state) = match &self.config.auth {
            Some(auth_config) => self.run_smart_auth(auth_config).await,
            None => (None, None),
        };

        let session = match self.factory.acquire(storage_state).await {
            Ok(session) => session,
            Err(err) => {
                error!(error = %err, "failed to acquire crawl session");
                return self.finish(target, auth_flow, started);
            }
        };

        self.priority_crawl(session.as_ref(), &target).await;

        if self.config.auth.is_some() && auth_flow.is_some() {
            probe_auth_requirements(
                session.as_ref(),
                self.config.auth.as_ref().map(|a| a.login_url.as_str()),
                &mut self.visited_pages,
            )
            .await;
        } else {
            for page in self.visited_pages.iter_mut() {
                page.auth_required = AuthRequirement::NotRequired;
            }
        }

        let _ = session.close().await;
        self.finish(target, auth_flow, started)
    }

    async fn run_smart_auth(
        &self,
        auth_config: &qa_config::AuthConfig,
    ) -> (Option<AuthFlow>, Option<StorageState>) {
        let session = match self.factory.acquire(None).await {
            Ok(session) => session,
            Err(err) => {
                error!(error = %err, "failed to open disposable session for smart-auth");
                return (None, None);
            }
        };

        let credentials = Credentials {
            username: auth_config.username.clone(),
            password: auth_config.password.clone(),
        };
        let explicit = if auth_config.auto_detect {
            None
        } else {
            Some(ExplicitSelectors {
                username_selector: Some(auth_config.username_selector.clone()),
                password_selector: Some(auth_config.password_selector.clone()),
                submit_selector: Some(auth_config.submit_selector.clone()),
            })
        };
        let success_indicator = if auth_config.success_indicator.is_empty() {
            None
        } else {
            Some(auth_config.success_indicator.as_str())
        };

        let result = authenticate_and_capture_state(
            session,
            &auth_config.login_url,
            &credentials,
            explicit.as_ref(),
            self.llm,
            success_indicator,
        )
        .await;

        if !result.success {
            error!(reason = ?result.failure_reason, "authentication failed");
            return (None, None);
        }

        let Some(selectors) = result.selectors else {
            return (None, None);
        };
        let auth_flow = AuthFlow {
            login_url: auth_config.login_url.clone(),
            login_method: "form".to_string(),
            requires_credentials: true,
            detection_method: Some(selectors.detection_method.as_str().to_string()),
            detected_selectors: selectors.to_detected_selectors(),
        };
        (Some(auth_flow), result.storage_state)
    }

    async fn priority_crawl(&mut self, session: &dyn BrowserSession, start_url: &str) {
        let mut frontier = Frontier::new();
        let Some(start_normalized) = normalize(start_url) else { return };
        frontier.enqueue(start_url, 0, PRIORITY_START, &start_normalized);

        let page = match session.new_page().await {
            Ok(page) => page,
            Err(err) => {
                error!(error = %err, "failed to open crawl page");
                return;
            }
        };

        let mut sitemap_loaded = false;

        while !frontier.is_empty() && frontier.visited_count() < self.config.crawl.max_pages {
            let entry = frontier.pop().unwrap();
            let Some(normalized) = normalize(&entry.url) else { continue };

            if frontier.is_visited(&normalized) {
                continue;
            }
            if entry.depth > self.config.crawl.max_depth {
                continue;
            }
            if !self.in_scope(&entry.url) {
                continue;
            }

            frontier.mark_visited(normalized);
            info!(
                n = frontier.visited_count(),
                max = self.config.crawl.max_pages,
                depth = entry.depth,
                priority = PRIORITY_ORGANIC,
                url = %entry.url,
                "crawling"
            );

            let loaded = self.navigate_with_retry(page.as_ref(), &entry.url).await;
            if !loaded {
                warn!(url = %entry.url, "failed to load page");
                continue;
            }

            if frontier.visited_count() == 1 {
                let spa_type = detect_spa_type(page.as_ref()).await;
                self.is_spa = spa_type != "traditional";
                if self.is_spa {
                    info!(routing = %spa_type, "SPA detected");
                }
            }

            let page_model = self.process_page_and_record_endpoints(page.as_ref(), &entry.url).await;
            let page_id = page_model.page_id.clone();
            self.visited_pages.push(page_model);

            let discovered = self.discover_all_links(page.as_ref(), &entry.url).await;
            let mut links_for_page = Vec::new();
            let mut organic_count = 0;
            for link_url in &discovered {
                if !is_valid_page_url(link_url) || !is_same_origin(&self.config.crawl.target_url, link_url) {
                    continue;
                }
                if let Ok(link_id) = page_id_from_url(link_url) {
                    links_for_page.push(link_id);
                }
                if let Some(link_normalized) = normalize(link_url) {
                    if frontier.enqueue(link_url, entry.depth + 1, PRIORITY_ORGANIC, &link_normalized) {
                        organic_count += 1;
                    }
                }
            }
            self.nav_graph.insert(page_id, links_for_page);
            info!(links = discovered.len(), queued = organic_count, url = %entry.url, "link discovery complete");

            if !sitemap_loaded {
                sitemap_loaded = true;
                let count = load_sitemap_backfill(page.as_ref(), start_url, &mut frontier, normalize).await;
                if count > 0 {
                    info!(count, "sitemap backfill queued");
                }
            }
        }

        info!(
            visited = frontier.visited_count(),
            queued_total = frontier.queued_count(),
            "crawl loop finished"
        );
    }

    fn in_scope(&self, url: &str) -> bool {
        url_in_scope(
            &self.config.crawl.target_url,
            url,
            &self.config.crawl.include_patterns,
            &self.config.crawl.exclude_patterns,
        )
    }

    async fn navigate_with_retry(&self, page: &dyn PageHandle, url: &str) -> bool {
        for attempt in 0..=NAV_RETRIES {
            match page.navigate(url, WaitUntil::DomContentLoaded, NAV_TIMEOUT).await {
                Ok(()) => {
                    if self.config.crawl.wait_for_idle {
                        if page
                            .wait_for_load_state(WaitUntil::NetworkIdle, NETWORK_IDLE_TIMEOUT)
                            .await
                            .is_err()
                        {
                            page.wait_for_timeout(NETWORK_IDLE_FALLBACK_WAIT).await;
                        }
                    }
                    return true;
                }
                Err(err) => {
                    if attempt < NAV_RETRIES {
                        warn!(attempt = attempt + 1, url = %url, error = %err, "navigation retry");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    } else {
                        warn!(url = %url, error = %err, "navigation failed after retries");
                    }
                }
            }
        }
        false
    }

    async fn process_page_and_record_endpoints(&mut self, page: &dyn PageHandle, url: &str) -> PageModel {
        let page_model = self.process_page(page, url).await;
        for req in &page_model.network_requests {
            if req.resource_type == "xhr" || req.resource_type == "fetch" {
                let path = url::Url::parse(&req.url).map(|u| u.path().to_string()).unwrap_or_default();
                let key = format!("{}:{path}", req.method);
                match self.api_endpoints.get_mut(&key) {
                    Some(endpoint) => {
                        if let Some(status) = req.status {
                            if !endpoint.status_codes_seen.contains(&status) {
                                endpoint.status_codes_seen.push(status);
                            }
                        }
                    }
                    None => {
                        self.api_endpoints.insert(
                            key,
                            ApiEndpoint {
                                url: req.url.clone(),
                                method: req.method.clone(),
                                request_content_type: None,
                                response_content_type: req.content_type.clone(),
                                status_codes_seen: req.status.into_iter().collect(),
                            },
                        );
                    }
                }
            }
        }
        page_model
    }

    async fn process_page(&self, page: &dyn PageHandle, url: &str) -> PageModel {
        let title = page.title().await;
        let page_type = classify_page(page).await;
        let elements = extract_elements(page).await;
        let forms = analyze_forms(page).await;
        let page_id = page_id_from_url(url).unwrap_or_default();

        let network_requests: Vec<NetworkRequest> = page
            .network_log()
            .into_iter()
            .map(|entry| NetworkRequest {
                url: entry.url,
                method: entry.method,
                resource_type: entry.resource_type,
                status: entry.status,
                content_type: entry.content_type,
            })
            .collect();

        let baselines_dir = self.config.report_output_dir.join("baselines");
        let screenshot_path = match page.screenshot(true).await {
            Ok(bytes) => self.write_baseline(&baselines_dir, &format!("{page_id}_screenshot.png"), &bytes),
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "screenshot failed");
                String::new()
            }
        };
        let dom_snapshot_path = match page.content().await {
            Ok(content) => self.write_baseline(&baselines_dir, &format!("{page_id}_dom.html"), content.as_bytes()),
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "DOM snapshot failed");
                String::new()
            }
        };

        PageModel {
            page_id,
            url: url.to_string(),
            page_type,
            title,
            elements,
            forms,
            network_requests,
            screenshot_path,
            dom_snapshot_path,
            auth_required: AuthRequirement::Unknown,
        }
    }

    fn write_baseline(&self, dir: &std::path::Path, file_name: &str, bytes: &[u8]) -> String {
        if let Err(err) = std::fs::create_dir_all(dir) {
            warn!(error = %err, "failed to create baselines directory");
            return String::new();
        }
        let path = dir.join(file_name);
        match std::fs::write(&path, bytes) {
            Ok(()) => path.to_string_lossy().into_owned(),
            Err(err) => {
                warn!(error = %err, path = %path.display(), "failed to write baseline file");
                String::new()
            }
        }
    }

    async fn discover_all_links(&self, page: &dyn PageHandle, base_url: &str) -> std::collections::HashSet<String> {
        let mut discovered = extract_static_links(page, base_url).await;

        if self.is_spa {
            discovered.extend(discover_spa_routes(page, base_url).await);
        }

        discovered.extend(extract_dynamic_links(page, base_url).await);
        discovered.extend(discover_interactive_links(page, base_url).await);
        discovered
    }

    fn finish(self, target: String, auth_flow: Option<AuthFlow>, started: std::time::Instant) -> SiteModel {
        let duration = started.elapsed();
        info!(pages = self.visited_pages.len(), duration_s = duration.as_secs_f64(), "crawl complete");

        let mut crawl_metadata = HashMap::new();
        crawl_metadata.insert("duration_seconds".to_string(), serde_json::json!((duration.as_secs_f64() * 100.0).round() / 100.0));
        crawl_metadata.insert("pages_found".to_string(), serde_json::json!(self.visited_pages.len()));
        crawl_metadata.insert("is_spa".to_string(), serde_json::json!(self.is_spa));

        SiteModel {
            base_url: target,
            pages: self.visited_pages,
            navigation_graph: self.nav_graph,
            api_endpoints: self.api_endpoints.into_values().collect(),
            auth_flow,
            crawl_metadata,
        }
    }
}

fn normalize(url: &str) -> Option<String> {
    normalize_url(url).ok()
}
