//! Injectable navigation
//!
//! A [`Navigator`] owns the address history and reports history changes as
//! [`NavigationEvent`]s. [`App`] ties a navigator, a key/value store and the
//! screen model together so routing can be driven without a browser.

use std::fmt;

use crate::router::{transition, QuizMode, Route, Screen, ScreenEvent};
use crate::storage::{keys, KeyValueStore, StoreError};

/// A path plus its query string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: String,
}

impl Location {
    /// Split `"/quiz/3?mode=retake"` into path and query
    pub fn parse(url: &str) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let path = if path.is_empty() { "/" } else { path };

        Self {
            path: path.to_string(),
            query: query.to_string(),
        }
    }

    pub fn route(&self) -> Route {
        Route::parse(&self.path, &self.query)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

/// History changes a navigator reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Moved through existing history (back/forward)
    PopState,

    /// A new entry was pushed
    PathChange,
}

/// Address history
pub trait Navigator {
    /// Current location
    fn location(&self) -> Location;

    /// Push a new entry and make it current
    fn push(&mut self, url: &str);

    /// Step back; returns false at the start of history
    fn back(&mut self) -> bool;

    /// Step forward; returns false at the end of history
    fn forward(&mut self) -> bool;

    /// Take the events recorded since the last call
    fn drain_events(&mut self) -> Vec<NavigationEvent>;
}

/// History kept in memory
#[derive(Debug, Clone)]
pub struct MemoryNavigator {
    history: Vec<Location>,
    cursor: usize,
    events: Vec<NavigationEvent>,
}

impl MemoryNavigator {
    /// Start at `url` with no pending events
    pub fn new(url: &str) -> Self {
        Self {
            history: vec![Location::parse(url)],
            cursor: 0,
            events: Vec::new(),
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn location(&self) -> Location {
        self.history[self.cursor].clone()
    }

    fn push(&mut self, url: &str) {
        self.history.truncate(self.cursor + 1);
        self.history.push(Location::parse(url));
        self.cursor = self.history.len() - 1;
        self.events.push(NavigationEvent::PathChange);
    }

    fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.events.push(NavigationEvent::PopState);
        true
    }

    fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.history.len() {
            return false;
        }
        self.cursor += 1;
        self.events.push(NavigationEvent::PopState);
        true
    }

    fn drain_events(&mut self) -> Vec<NavigationEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Application shell: current screen, history and local cache
pub struct App<N: Navigator, S: KeyValueStore> {
    navigator: N,
    store: S,
    screen: Screen,
    authenticated: bool,
}

impl<N: Navigator, S: KeyValueStore> App<N, S> {
    /// New shell showing the login screen
    pub fn new(navigator: N, store: S) -> Self {
        Self {
            navigator,
            store,
            screen: Screen::Login,
            authenticated: false,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Install the screen chosen by session restoration
    ///
    /// Every screen other than login and sign-up counts as signed in. The
    /// address bar is moved to the screen's path.
    pub fn enter(&mut self, screen: Screen) -> Result<&Screen, StoreError> {
        self.authenticated = !screen.is_public();

        if let Screen::Quiz { quiz_id, mode } = screen {
            mode.remember(&mut self.store, quiz_id)?;
        }

        let path = screen.path();
        if !screen.is_onboarding_flow() && path != self.navigator.location().to_string() {
            self.navigator.push(&path);
        }
        self.navigator.drain_events();

        self.screen = screen;
        Ok(&self.screen)
    }

    /// Re-resolve the screen if history changed since the last call
    pub fn sync(&mut self) -> Result<&Screen, StoreError> {
        let events = self.navigator.drain_events();
        if events.is_empty() || self.screen.is_onboarding_flow() {
            return Ok(&self.screen);
        }

        self.screen = self.resolve_location()?;
        log::debug!("Location {} shows {}", self.navigator.location(), self.screen);
        Ok(&self.screen)
    }

    /// Apply an event, then bring the address bar in line with the new screen
    pub fn dispatch(&mut self, event: ScreenEvent) -> Result<&Screen, StoreError> {
        match &event {
            ScreenEvent::LoggedIn { .. } | ScreenEvent::SignedUp => self.authenticated = true,
            ScreenEvent::LoggedOut => {
                self.authenticated = false;
                for key in keys::SESSION {
                    self.store.remove(key)?;
                }
            }
            _ => {}
        }

        let next = match event {
            ScreenEvent::Navigate(route) => {
                let route = self.with_quiz_mode(route)?;
                transition(&self.screen, ScreenEvent::Navigate(route))
            }
            other => transition(&self.screen, other),
        };

        if let Screen::Quiz { quiz_id, mode } = next {
            mode.remember(&mut self.store, quiz_id)?;
        }

        let path = next.path();
        if path != self.navigator.location().to_string() {
            self.navigator.push(&path);
        }
        self.navigator.drain_events();

        self.screen = next;
        Ok(&self.screen)
    }

    fn resolve_location(&mut self) -> Result<Screen, StoreError> {
        let route = self.with_quiz_mode(self.navigator.location().route())?;
        Ok(Screen::resolve(&route, self.authenticated))
    }

    fn with_quiz_mode(&mut self, route: Route) -> Result<Route, StoreError> {
        match route {
            Route::Quiz { quiz_id, mode } if self.authenticated => {
                let mode = QuizMode::from_address(&mut self.store, quiz_id, mode)?;
                Ok(Route::Quiz {
                    quiz_id,
                    mode: Some(mode),
                })
            }
            other => Ok(other),
        }
    }
}
