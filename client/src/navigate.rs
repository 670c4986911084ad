//! Navigation side effects requested by the session.

use std::sync::Arc;

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Profile,
    RegisterSuccess,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Profile => "/profile",
            Self::RegisterSuccess => "/success",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn navigate(&self, route: Route) {
        (**self).navigate(route);
    }
}

/// Forwards routes to whatever UI loop owns the receiver.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        if self.tx.send(route).is_err() {
            tracing::debug!(path = route.path(), "navigation dropped: receiver closed");
        }
    }
}

#[cfg(test)]
#[path = "navigate_test.rs"]
mod tests;
