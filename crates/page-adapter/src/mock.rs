//! Scripted in-memory page for tests (feature `mock`)
//!
//! Pages are keyed by URL; elements are keyed by the exact locator
//! expression a test registers them under. State mutations (clicks, typed
//! text, pressed keys) are recorded so tests can assert on interaction
//! order without a browser.

use crate::driver::{ElementHandle, PageDriver, PageElement, Query};
use crate::errors::{DriverError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builder for a scripted element.
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    text: String,
    attrs: HashMap<String, String>,
    hidden: bool,
    disabled: bool,
    poisoned: bool,
    press_fails: bool,
    click_sets_url: Option<String>,
    script_result: Option<serde_json::Value>,
}

impl MockElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Element with rendered text.
    pub fn text(content: &str) -> Self {
        Self {
            text: content.to_string(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Render the element invisible (fails the resolver's visibility gate).
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Render the element disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Every operation on the element errors, simulating a detached node.
    pub fn poisoned(mut self) -> Self {
        self.poisoned = true;
        self
    }

    /// Key presses on the element error while everything else works.
    pub fn press_fails(mut self) -> Self {
        self.press_fails = true;
        self
    }

    /// Clicking moves the page to `url`, as a login redirect would.
    pub fn on_click_url(mut self, url: &str) -> Self {
        self.click_sets_url = Some(url.to_string());
        self
    }

    /// Value returned from element-scoped `evaluate` calls.
    pub fn script_result(mut self, value: serde_json::Value) -> Self {
        self.script_result = Some(value);
        self
    }
}

struct ElementState {
    spec: MockElement,
    value: Mutex<String>,
    typed: Mutex<String>,
    clicks: AtomicUsize,
    keys: Mutex<Vec<String>>,
    shared: Arc<Shared>,
}

#[derive(Default)]
struct Dom {
    elements: HashMap<String, Vec<Arc<ElementState>>>,
}

#[derive(Default)]
struct Shared {
    current_url: Mutex<String>,
    navigations: Mutex<Vec<String>>,
    doms: Mutex<HashMap<String, Dom>>,
    default_dom: Mutex<Dom>,
    nav_failures: Mutex<u32>,
    scripts: Mutex<HashMap<String, serde_json::Value>>,
    mouse_moves: AtomicUsize,
    scrolls: AtomicUsize,
    gestures_fail: AtomicBool,
}

/// Scripted page driver.
#[derive(Clone, Default)]
pub struct MockPage {
    shared: Arc<Shared>,
}

impl MockPage {
    pub fn new() -> Self {
        let page = Self::default();
        *page.shared.current_url.lock().unwrap() = "about:blank".to_string();
        page
    }

    /// Register an element visible on every page.
    pub fn insert(&self, expression: &str, element: MockElement) -> MockHandle {
        let state = self.state_for(element);
        self.shared
            .default_dom
            .lock()
            .unwrap()
            .elements
            .entry(expression.to_string())
            .or_default()
            .push(state.clone());
        MockHandle { state }
    }

    /// Register an element visible only when the page is at `url`.
    pub fn insert_at(&self, url: &str, expression: &str, element: MockElement) -> MockHandle {
        let state = self.state_for(element);
        self.shared
            .doms
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .elements
            .entry(expression.to_string())
            .or_default()
            .push(state.clone());
        MockHandle { state }
    }

    /// Force the next `count` navigations to fail.
    pub fn fail_navigations(&self, count: u32) {
        *self.shared.nav_failures.lock().unwrap() = count;
    }

    /// Make mouse/scroll gestures error (exercises best-effort pacing).
    pub fn fail_gestures(&self, fail: bool) {
        self.shared.gestures_fail.store(fail, Ordering::SeqCst);
    }

    /// Script a page-level `evaluate` result.
    pub fn script_result(&self, script: &str, value: serde_json::Value) {
        self.shared
            .scripts
            .lock()
            .unwrap()
            .insert(script.to_string(), value);
    }

    /// Move the page without recording a navigation (server redirect).
    pub fn set_url(&self, url: &str) {
        *self.shared.current_url.lock().unwrap() = url.to_string();
    }

    /// URLs passed to `navigate`, in order.
    pub fn navigations(&self) -> Vec<String> {
        self.shared.navigations.lock().unwrap().clone()
    }

    pub fn mouse_moves(&self) -> usize {
        self.shared.mouse_moves.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> usize {
        self.shared.scrolls.load(Ordering::SeqCst)
    }

    fn state_for(&self, element: MockElement) -> Arc<ElementState> {
        Arc::new(ElementState {
            spec: element,
            value: Mutex::new(String::new()),
            typed: Mutex::new(String::new()),
            clicks: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
            shared: self.shared.clone(),
        })
    }

    fn lookup(&self, expression: &str) -> Vec<Arc<ElementState>> {
        let url = self.shared.current_url.lock().unwrap().clone();
        let doms = self.shared.doms.lock().unwrap();
        if let Some(dom) = doms.get(&url) {
            if let Some(found) = dom.elements.get(expression) {
                return found.clone();
            }
        }
        self.shared
            .default_dom
            .lock()
            .unwrap()
            .elements
            .get(expression)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        {
            let mut failures = self.shared.nav_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(DriverError::Navigation(format!("scripted failure: {}", url)));
            }
        }
        self.shared
            .navigations
            .lock()
            .unwrap()
            .push(url.to_string());
        *self.shared.current_url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.shared.current_url.lock().unwrap().clone())
    }

    async fn query(&self, query: &Query) -> Result<Option<ElementHandle>> {
        Ok(self
            .lookup(query.expression())
            .into_iter()
            .next()
            .map(|state| Box::new(MockHandle { state }) as ElementHandle))
    }

    async fn query_all(&self, query: &Query) -> Result<Vec<ElementHandle>> {
        Ok(self
            .lookup(query.expression())
            .into_iter()
            .map(|state| Box::new(MockHandle { state }) as ElementHandle)
            .collect())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        Ok(self
            .shared
            .scripts
            .lock()
            .unwrap()
            .get(script)
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn mouse_move(&self, _x: f64, _y: f64) -> Result<()> {
        if self.shared.gestures_fail.load(Ordering::SeqCst) {
            return Err(DriverError::Backend("scripted gesture failure".into()));
        }
        self.shared.mouse_moves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn scroll_by(&self, _dx: i64, _dy: i64) -> Result<()> {
        if self.shared.gestures_fail.load(Ordering::SeqCst) {
            return Err(DriverError::Backend("scripted gesture failure".into()));
        }
        self.shared.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Handle to a scripted element; clones share recorded state.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<ElementState>,
}

impl MockHandle {
    /// Text typed into the element via `type_text`.
    pub fn typed(&self) -> String {
        self.state.typed.lock().unwrap().clone()
    }

    /// Current element value (set by `fill`, appended by `type_text`).
    pub fn value(&self) -> String {
        self.state.value.lock().unwrap().clone()
    }

    pub fn clicks(&self) -> usize {
        self.state.clicks.load(Ordering::SeqCst)
    }

    /// Keys pressed on the element, in order.
    pub fn keys(&self) -> Vec<String> {
        self.state.keys.lock().unwrap().clone()
    }

    fn guard(&self, op: &str) -> Result<()> {
        if self.state.spec.poisoned {
            Err(DriverError::Element(format!("detached node during {}", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageElement for MockHandle {
    async fn is_visible(&self) -> Result<bool> {
        self.guard("is_visible")?;
        Ok(!self.state.spec.hidden)
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.guard("is_enabled")?;
        Ok(!self.state.spec.disabled)
    }

    async fn click(&self) -> Result<()> {
        self.guard("click")?;
        self.state.clicks.fetch_add(1, Ordering::SeqCst);
        if let Some(url) = &self.state.spec.click_sets_url {
            *self.state.shared.current_url.lock().unwrap() = url.clone();
        }
        Ok(())
    }

    async fn fill(&self, text: &str) -> Result<()> {
        self.guard("fill")?;
        *self.state.value.lock().unwrap() = text.to_string();
        Ok(())
    }

    async fn type_text(&self, text: &str, _per_char_delay: Duration) -> Result<()> {
        self.guard("type_text")?;
        self.state.typed.lock().unwrap().push_str(text);
        self.state.value.lock().unwrap().push_str(text);
        Ok(())
    }

    async fn press(&self, key: &str) -> Result<()> {
        self.guard("press")?;
        if self.state.spec.press_fails {
            return Err(DriverError::Element(format!(
                "scripted press failure: {}",
                key
            )));
        }
        self.state.keys.lock().unwrap().push(key.to_string());
        if key == "Delete" {
            self.state.value.lock().unwrap().clear();
        }
        Ok(())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.guard("attribute")?;
        Ok(self.state.spec.attrs.get(name).cloned())
    }

    async fn inner_text(&self) -> Result<String> {
        self.guard("inner_text")?;
        Ok(self.state.spec.text.clone())
    }

    async fn evaluate(&self, _function: &str) -> Result<serde_json::Value> {
        self.guard("evaluate")?;
        Ok(self
            .state
            .spec
            .script_result
            .clone()
            .unwrap_or(serde_json::Value::Null))
    }
}
