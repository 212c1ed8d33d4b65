//! Interception of navigation coming out of embedded vendor widgets.
//!
//! A [`BrowsingContext`] models the host page's window: an open handler
//! (what `open(url, target)` does) and a list of cross-frame message
//! listeners. Vendor widgets running inside it try to open new tabs or post
//! navigation messages. While an interceptor is installed:
//!
//! - vendor URLs carrying a search term (`search`, `q`, or `query`) become an
//!   in-app redirect to the host search route
//! - any other vendor URL is followed in the same context
//! - everything else goes to whatever handler was installed before
//!
//! Malformed URLs and payloads are logged and dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use serde_json::Value;

use crate::shop::ShopConfig;

/// Query parameters that carry a search term.
const SEARCH_PARAMS: [&str; 3] = ["search", "q", "query"];

/// Message payload keys that carry a navigation target.
const MESSAGE_URL_KEYS: [&str; 4] = ["url", "href", "navigate", "link"];

/// Same escaping as the browser's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Route inside the host application.
    InApp { path: String },
    /// Replace the current page.
    SameContext { url: String },
    /// Open a new tab or window.
    NewContext { url: String, target: String },
    /// Nothing happens.
    None,
}

/// What `open(url, target)` does in a browsing context.
pub trait OpenHandler: Send + Sync {
    fn open(&self, url: &str, target: &str) -> Navigation;

    /// The handler that should stand in for this one once it has been
    /// released; `None` while it is still live.
    fn released_into(&self) -> Option<Arc<dyn OpenHandler>> {
        None
    }
}

/// Receives cross-frame messages.
pub trait MessageListener: Send + Sync {
    /// Returns the navigation the message triggers, if any.
    fn on_message(&self, origin: &str, data: &Value) -> Option<Navigation>;
}

/// Browser default: `_self`, `_top` and `_parent` stay in place, anything
/// else opens a new context.
#[derive(Debug, Default)]
pub struct DefaultOpen;

impl OpenHandler for DefaultOpen {
    fn open(&self, url: &str, target: &str) -> Navigation {
        match target {
            "_self" | "_top" | "_parent" => Navigation::SameContext {
                url: url.to_string(),
            },
            _ => Navigation::NewContext {
                url: url.to_string(),
                target: target.to_string(),
            },
        }
    }
}

type Listeners = Vec<(u64, Arc<dyn MessageListener>)>;

/// Shared window state that embedded widgets act on.
pub struct BrowsingContext {
    open_handler: Mutex<Arc<dyn OpenHandler>>,
    listeners: Mutex<Listeners>,
    next_listener_id: AtomicU64,
}

impl Default for BrowsingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BrowsingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowsingContext")
            .field("listeners", &self.lock_listeners().len())
            .finish_non_exhaustive()
    }
}

impl BrowsingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_open_handler(Arc::new(DefaultOpen))
    }

    #[must_use]
    pub fn with_open_handler(handler: Arc<dyn OpenHandler>) -> Self {
        Self {
            open_handler: Mutex::new(handler),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Runs the current open handler.
    pub fn open(&self, url: &str, target: &str) -> Navigation {
        // Clone out so the handler can itself touch the context.
        let handler = Arc::clone(&*self.lock_handler());
        handler.open(url, target)
    }

    /// Delivers a message to every listener and returns the navigations it
    /// triggered.
    pub fn post_message(&self, origin: &str, data: &Value) -> Vec<Navigation> {
        let listeners: Vec<Arc<dyn MessageListener>> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        listeners
            .iter()
            .filter_map(|listener| listener.on_message(origin, data))
            .collect()
    }

    #[must_use]
    pub fn open_handler(&self) -> Arc<dyn OpenHandler> {
        Arc::clone(&*self.lock_handler())
    }

    /// Installs `handler`, returning the one it replaced.
    pub fn replace_open_handler(&self, handler: Arc<dyn OpenHandler>) -> Arc<dyn OpenHandler> {
        std::mem::replace(&mut *self.lock_handler(), handler)
    }

    /// Installs `handler` only if `expected` is the active handler.
    fn replace_open_handler_if(
        &self,
        expected: &Arc<dyn OpenHandler>,
        handler: Arc<dyn OpenHandler>,
    ) -> bool {
        let mut current = self.lock_handler();
        if !Arc::ptr_eq(&current, expected) {
            return false;
        }
        *current = handler;
        true
    }

    pub fn add_listener(&self, listener: Arc<dyn MessageListener>) -> u64 {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().push((id, listener));
        id
    }

    pub fn remove_listener(&self, id: u64) {
        self.lock_listeners().retain(|(existing, _)| *existing != id);
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    // A panicking handler must not wedge navigation for the rest of the page.
    fn lock_handler(&self) -> MutexGuard<'_, Arc<dyn OpenHandler>> {
        self.open_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Which URLs belong to the vendor and where intercepted searches go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptPolicy {
    /// Hosts (and their subdomains) treated as vendor-owned.
    pub vendor_hosts: Vec<String>,
    /// Host route receiving intercepted searches, e.g. `/search`.
    pub search_route: String,
}

impl InterceptPolicy {
    #[must_use]
    pub fn for_shop(shop: &ShopConfig, search_route: &str) -> Self {
        Self {
            vendor_hosts: shop.vendor_hosts(),
            search_route: search_route.to_string(),
        }
    }

    #[must_use]
    pub fn is_vendor_url(&self, url: &Url) -> bool {
        url.host_str()
            .map(str::to_ascii_lowercase)
            .is_some_and(|host| {
                self.vendor_hosts
                    .iter()
                    .any(|vendor| host == *vendor || host.ends_with(&format!(".{vendor}")))
            })
    }

    /// In-app path for a search term.
    #[must_use]
    pub fn search_path(&self, term: &str) -> String {
        format!(
            "{}?q={}",
            self.search_route,
            utf8_percent_encode(term, COMPONENT)
        )
    }

    /// Routes a vendor URL: search-bearing URLs go in-app, others stay in
    /// the current context.
    #[must_use]
    pub fn route_vendor_url(&self, url: &Url) -> Navigation {
        match search_term(url) {
            Some(term) => Navigation::InApp {
                path: self.search_path(&term),
            },
            None => Navigation::SameContext {
                url: url.to_string(),
            },
        }
    }
}

/// First non-blank search parameter of `url`.
fn search_term(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, value)| SEARCH_PARAMS.contains(&key.as_ref()) && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
}

struct InterceptingOpen {
    policy: Arc<InterceptPolicy>,
    previous: Arc<dyn OpenHandler>,
    /// Set when the guard is released while a newer handler still wraps
    /// this one; the handler then passes everything through.
    released: AtomicBool,
}

impl OpenHandler for InterceptingOpen {
    fn open(&self, raw: &str, target: &str) -> Navigation {
        if self.released.load(Ordering::Acquire) {
            return self.previous.open(raw, target);
        }
        match Url::parse(raw) {
            Ok(url) if self.policy.is_vendor_url(&url) => {
                let navigation = self.policy.route_vendor_url(&url);
                tracing::debug!(url = raw, target, ?navigation, "intercepted vendor open");
                navigation
            }
            Ok(_) => self.previous.open(raw, target),
            // Host-relative URLs belong to the host page.
            Err(_) if is_relative(raw) => self.previous.open(raw, target),
            Err(e) => {
                tracing::warn!(url = raw, error = %e, "dropping open() with malformed URL");
                Navigation::None
            }
        }
    }

    fn released_into(&self) -> Option<Arc<dyn OpenHandler>> {
        self.released
            .load(Ordering::Acquire)
            .then(|| Arc::clone(&self.previous))
    }
}

/// Follows released interceptors down to the first live handler.
fn first_live(mut handler: Arc<dyn OpenHandler>) -> Arc<dyn OpenHandler> {
    while let Some(next) = handler.released_into() {
        handler = next;
    }
    handler
}

/// `true` when `raw` has no scheme, i.e. no `:` before the first `/`, `?`
/// or `#`.
fn is_relative(raw: &str) -> bool {
    match (raw.find(':'), raw.find(['/', '?', '#'])) {
        (None, _) => true,
        (Some(colon), Some(separator)) => separator < colon,
        (Some(_), None) => false,
    }
}

struct VendorMessages {
    policy: Arc<InterceptPolicy>,
}

impl MessageListener for VendorMessages {
    fn on_message(&self, origin: &str, data: &Value) -> Option<Navigation> {
        let origin_url = Url::parse(origin).ok()?;
        if !self.policy.is_vendor_url(&origin_url) {
            return None;
        }

        let Some(raw) = message_target(data) else {
            tracing::warn!(origin, "ignoring vendor message without a navigation target");
            return None;
        };

        let target = if raw.starts_with('/') && !raw.starts_with("//") {
            origin_url.join(raw)
        } else {
            Url::parse(raw)
        };
        let target = match target {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                tracing::warn!(origin, scheme = url.scheme(), "ignoring vendor message with non-http target");
                return None;
            }
            Err(e) => {
                tracing::warn!(origin, target = raw, error = %e, "ignoring vendor message with malformed URL");
                return None;
            }
        };

        if !self.policy.is_vendor_url(&target) {
            tracing::debug!(origin, target = %target, "vendor message points off-vendor; ignoring");
            return None;
        }

        Some(self.policy.route_vendor_url(&target))
    }
}

fn message_target(data: &Value) -> Option<&str> {
    match data {
        Value::String(s) => Some(s.as_str()),
        Value::Object(_) => MESSAGE_URL_KEYS
            .iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str)),
        _ => None,
    }
    .map(str::trim)
    .filter(|s| !s.is_empty())
}

/// Restores the browsing context when dropped or uninstalled.
#[must_use = "dropping the guard uninstalls the interceptor immediately"]
pub struct InterceptorGuard<'a> {
    context: &'a BrowsingContext,
    installed: Arc<InterceptingOpen>,
    previous: Option<Arc<dyn OpenHandler>>,
    listener_id: u64,
}

impl std::fmt::Debug for InterceptorGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorGuard")
            .field("listener_id", &self.listener_id)
            .field("installed", &self.previous.is_some())
            .finish()
    }
}

/// Installs the interceptor on `context`.
///
/// Releasing guards in reverse install order puts back the exact handler
/// that was active when each was created. A guard released early goes
/// inert and is unlinked when the guard installed after it is released, so
/// the original handler comes back once every guard is gone, whatever the
/// order.
pub fn install(context: &BrowsingContext, policy: InterceptPolicy) -> InterceptorGuard<'_> {
    let policy = Arc::new(policy);
    let previous = context.open_handler();
    let installed = Arc::new(InterceptingOpen {
        policy: Arc::clone(&policy),
        previous: Arc::clone(&previous),
        released: AtomicBool::new(false),
    });
    context.replace_open_handler(Arc::clone(&installed) as Arc<dyn OpenHandler>);
    let listener_id = context.add_listener(Arc::new(VendorMessages { policy }));
    tracing::debug!(listener_id, "navigation interceptor installed");

    InterceptorGuard {
        context,
        installed,
        previous: Some(previous),
        listener_id,
    }
}

impl InterceptorGuard<'_> {
    pub fn uninstall(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        self.installed.released.store(true, Ordering::Release);
        self.context.remove_listener(self.listener_id);

        let installed: Arc<dyn OpenHandler> = Arc::clone(&self.installed) as _;
        if self
            .context
            .replace_open_handler_if(&installed, first_live(previous))
        {
            tracing::debug!(listener_id = self.listener_id, "navigation interceptor removed");
        } else {
            tracing::debug!(
                listener_id = self.listener_id,
                "navigation interceptor released under a newer one; passing through until unlinked"
            );
        }
    }
}

impl Drop for InterceptorGuard<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}
