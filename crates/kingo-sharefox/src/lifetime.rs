//! Page lifetime tracking for in-flight catalog requests.
//!
//! A page creates a [`PageLifetime`] when it mounts and hands
//! [`PageHandle`]s to the requests it starts. Once the page unmounts (or the
//! lifetime is dropped), the resolver stops before its next candidate
//! instead of delivering results nobody will render.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct PageLifetime {
    mounted: Arc<AtomicBool>,
}

/// Cheap, cloneable view of a [`PageLifetime`].
#[derive(Debug, Clone)]
pub struct PageHandle {
    mounted: Arc<AtomicBool>,
}

impl PageLifetime {
    #[must_use]
    pub fn mount() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn handle(&self) -> PageHandle {
        PageHandle {
            mounted: Arc::clone(&self.mounted),
        }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}

impl Drop for PageLifetime {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl PageHandle {
    /// A handle that is never unmounted, for callers without a page.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_tracks_unmount() {
        let page = PageLifetime::mount();
        let handle = page.handle();
        assert!(handle.is_mounted());
        page.unmount();
        assert!(!handle.is_mounted());
    }

    #[test]
    fn dropping_lifetime_unmounts() {
        let handle = {
            let page = PageLifetime::mount();
            page.handle()
        };
        assert!(!handle.is_mounted());
    }

    #[test]
    fn detached_handle_stays_mounted() {
        assert!(PageHandle::detached().is_mounted());
    }
}
