//! Screen model and path routing
//!
//! A [`Route`] is what the address says; a [`Screen`] is what is shown.
//! Screens change only through [`transition`], a pure function of the
//! current screen and a [`ScreenEvent`].

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::storage::{keys, KeyValueStore, StoreError};

static QUIZ_PATH: OnceLock<Regex> = OnceLock::new();
static PLAN_PATH: OnceLock<Regex> = OnceLock::new();
static CONCEPT_PATH: OnceLock<Regex> = OnceLock::new();
static SUBJECT_PATH: OnceLock<Regex> = OnceLock::new();

fn quiz_path() -> &'static Regex {
    QUIZ_PATH.get_or_init(|| Regex::new(r"^/quiz/(\d+)$").expect("valid quiz path regex"))
}

fn plan_path() -> &'static Regex {
    PLAN_PATH
        .get_or_init(|| Regex::new(r"^/subject/(\d+)/plan$").expect("valid plan path regex"))
}

fn concept_path() -> &'static Regex {
    CONCEPT_PATH.get_or_init(|| {
        Regex::new(r"^/subject/(\d+)/week/(\d+)/concept$").expect("valid concept path regex")
    })
}

fn subject_path() -> &'static Regex {
    SUBJECT_PATH
        .get_or_init(|| Regex::new(r"^/subject/(\d+)$").expect("valid subject path regex"))
}

/// How a quiz page treats an already graded quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizMode {
    /// Show the previous result
    #[default]
    View,

    /// Answer the questions again
    Retake,
}

impl QuizMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Retake => "retake",
        }
    }

    /// Interpret a `mode` value; anything but `retake` means view
    pub fn from_param(value: &str) -> Self {
        if value == "retake" {
            Self::Retake
        } else {
            Self::View
        }
    }

    /// Pick the mode: the address wins, then the remembered flag, then view
    pub fn resolve(requested: Option<QuizMode>, stored: Option<&str>) -> QuizMode {
        requested
            .or_else(|| stored.map(QuizMode::from_param))
            .unwrap_or_default()
    }

    /// Mirror the mode into the store: the flag exists only for retakes
    pub fn remember<S: KeyValueStore + ?Sized>(
        self,
        store: &mut S,
        quiz_id: u64,
    ) -> Result<(), StoreError> {
        let key = keys::quiz_mode(quiz_id);
        match self {
            Self::Retake => store.set(&key, self.as_str()),
            Self::View => store.remove(&key),
        }
    }

    /// Mode of a quiz opened through an address
    ///
    /// The address alone decides: no `mode=retake` means view. The stored
    /// flag is set for retakes and removed otherwise.
    pub fn from_address<S: KeyValueStore + ?Sized>(
        store: &mut S,
        quiz_id: u64,
        requested: Option<QuizMode>,
    ) -> Result<QuizMode, StoreError> {
        let mode = requested.unwrap_or_default();
        mode.remember(store, quiz_id)?;
        Ok(mode)
    }

    /// Resolve the mode of a quiz opened without an address and mirror the
    /// result into the store
    pub fn sync_store<S: KeyValueStore + ?Sized>(
        store: &mut S,
        quiz_id: u64,
        requested: Option<QuizMode>,
    ) -> Result<QuizMode, StoreError> {
        let stored = store.get(&keys::quiz_mode(quiz_id));
        let mode = Self::resolve(requested, stored.as_deref());
        mode.remember(store, quiz_id)?;
        Ok(mode)
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client-side address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Settings,
    Subject { subject_id: u64 },
    StudyPlan { subject_id: u64 },
    Concept { subject_id: u64, week_id: u64 },
    Quiz { quiz_id: u64, mode: Option<QuizMode> },
    Unknown(String),
}

impl Route {
    /// Match a path against the known patterns, most specific first
    ///
    /// # Parameters
    /// * `path` - Path component, e.g. `/subject/3/plan`
    /// * `query` - Query string without the leading `?` (may be empty)
    pub fn parse(path: &str, query: &str) -> Route {
        if let Some(id) = capture_id(quiz_path(), path, 1) {
            let mode = query_param(query, "mode").map(QuizMode::from_param);
            return Route::Quiz { quiz_id: id, mode };
        }

        if let Some(id) = capture_id(plan_path(), path, 1) {
            return Route::StudyPlan { subject_id: id };
        }

        if let Some(caps) = concept_path().captures(path) {
            if let (Ok(subject_id), Ok(week_id)) = (caps[1].parse(), caps[2].parse()) {
                return Route::Concept {
                    subject_id,
                    week_id,
                };
            }
        }

        if let Some(id) = capture_id(subject_path(), path, 1) {
            return Route::Subject { subject_id: id };
        }

        match path {
            "/settings" => Route::Settings,
            "" | "/" => Route::Dashboard,
            other => Route::Unknown(other.to_string()),
        }
    }
}

fn capture_id(re: &Regex, path: &str, group: usize) -> Option<u64> {
    re.captures(path)
        .and_then(|caps| caps.get(group))
        .and_then(|m| m.as_str().parse().ok())
}

/// First value of a query parameter
pub fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// The screen currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Login,
    SignUp,
    Welcome,
    Onboarding,
    Dashboard,
    Settings,
    Subject { subject_id: u64 },
    Concept { subject_id: u64, week_id: u64 },
    Quiz { quiz_id: u64, mode: QuizMode },
    StudyPlan { subject_id: u64 },
}

impl Screen {
    /// Screen for a route
    ///
    /// Unauthenticated access to any path lands on the login screen, and
    /// unknown paths fall back to the dashboard.
    pub fn resolve(route: &Route, authenticated: bool) -> Screen {
        if !authenticated {
            return Screen::Login;
        }

        match *route {
            Route::Dashboard | Route::Unknown(_) => Screen::Dashboard,
            Route::Settings => Screen::Settings,
            Route::Subject { subject_id } => Screen::Subject { subject_id },
            Route::StudyPlan { subject_id } => Screen::StudyPlan { subject_id },
            Route::Concept {
                subject_id,
                week_id,
            } => Screen::Concept {
                subject_id,
                week_id,
            },
            Route::Quiz { quiz_id, mode } => Screen::Quiz {
                quiz_id,
                mode: mode.unwrap_or_default(),
            },
        }
    }

    /// Canonical address of the screen
    pub fn path(&self) -> String {
        match self {
            Screen::Login
            | Screen::SignUp
            | Screen::Welcome
            | Screen::Onboarding
            | Screen::Dashboard => "/".to_string(),
            Screen::Settings => "/settings".to_string(),
            Screen::Subject { subject_id } => format!("/subject/{}", subject_id),
            Screen::StudyPlan { subject_id } => format!("/subject/{}/plan", subject_id),
            Screen::Concept {
                subject_id,
                week_id,
            } => format!("/subject/{}/week/{}/concept", subject_id, week_id),
            Screen::Quiz { quiz_id, mode } => match mode {
                QuizMode::Retake => format!("/quiz/{}?mode=retake", quiz_id),
                QuizMode::View => format!("/quiz/{}", quiz_id),
            },
        }
    }

    /// Screens shown before a session exists
    pub fn is_public(&self) -> bool {
        matches!(self, Screen::Login | Screen::SignUp)
    }

    /// Screens of the sign-up flow that ignore the address bar
    pub fn is_onboarding_flow(&self) -> bool {
        matches!(self, Screen::Welcome | Screen::Onboarding)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Login => write!(f, "login"),
            Screen::SignUp => write!(f, "signup"),
            Screen::Welcome => write!(f, "welcome"),
            Screen::Onboarding => write!(f, "onboarding"),
            Screen::Dashboard => write!(f, "dashboard"),
            Screen::Settings => write!(f, "settings"),
            Screen::Subject { subject_id } => write!(f, "subject {}", subject_id),
            Screen::Concept {
                subject_id,
                week_id,
            } => write!(f, "concept (subject {}, week {})", subject_id, week_id),
            Screen::Quiz { quiz_id, mode } => write!(f, "quiz {} ({})", quiz_id, mode),
            Screen::StudyPlan { subject_id } => write!(f, "study plan {}", subject_id),
        }
    }
}

/// Something that moves the user between screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    LoggedIn { onboarding_completed: bool },
    ShowSignUp,
    ShowLogin,
    SignedUp,
    WelcomeDone,
    OnboardingDone,
    LoggedOut,
    Navigate(Route),
    OpenSubject(u64),
    OpenSettings,
    OpenConcept { subject_id: u64, week_id: u64 },
    OpenStudyPlan(u64),
    OpenQuiz { quiz_id: u64, mode: QuizMode },
    Back,
}

/// Next screen for an event
///
/// Events that make no sense on the current screen leave it unchanged.
pub fn transition(screen: &Screen, event: ScreenEvent) -> Screen {
    use ScreenEvent as E;

    match (screen, event) {
        (_, E::LoggedOut) => Screen::Login,

        (Screen::Login, E::LoggedIn {
            onboarding_completed,
        }) => {
            if onboarding_completed {
                Screen::Dashboard
            } else {
                Screen::Onboarding
            }
        }
        (Screen::Login, E::ShowSignUp) => Screen::SignUp,
        (Screen::SignUp, E::ShowLogin | E::Back) => Screen::Login,
        (Screen::SignUp, E::SignedUp) => Screen::Welcome,
        (Screen::Welcome, E::WelcomeDone) => Screen::Onboarding,
        (Screen::Onboarding, E::OnboardingDone) => Screen::Dashboard,

        (s, _) if s.is_public() || s.is_onboarding_flow() => s.clone(),

        (_, E::Navigate(route)) => Screen::resolve(&route, true),
        (_, E::OpenSubject(subject_id)) => Screen::Subject { subject_id },
        (_, E::OpenSettings) => Screen::Settings,
        (
            _,
            E::OpenConcept {
                subject_id,
                week_id,
            },
        ) => Screen::Concept {
            subject_id,
            week_id,
        },
        (_, E::OpenStudyPlan(subject_id)) => Screen::StudyPlan { subject_id },
        (_, E::OpenQuiz { quiz_id, mode }) => Screen::Quiz { quiz_id, mode },

        (Screen::Concept { subject_id, .. }, E::Back)
        | (Screen::StudyPlan { subject_id }, E::Back) => Screen::Subject {
            subject_id: *subject_id,
        },
        (_, E::Back) => Screen::Dashboard,

        (s, _) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_parse_routes_by_specificity() {
        assert_eq!(
            Route::parse("/quiz/12", "mode=retake"),
            Route::Quiz {
                quiz_id: 12,
                mode: Some(QuizMode::Retake)
            }
        );
        assert_eq!(
            Route::parse("/subject/3/plan", ""),
            Route::StudyPlan { subject_id: 3 }
        );
        assert_eq!(
            Route::parse("/subject/3/week/9/concept", ""),
            Route::Concept {
                subject_id: 3,
                week_id: 9
            }
        );
        assert_eq!(
            Route::parse("/subject/3", ""),
            Route::Subject { subject_id: 3 }
        );
        assert_eq!(Route::parse("/settings", ""), Route::Settings);
        assert_eq!(Route::parse("/", ""), Route::Dashboard);
        assert_eq!(Route::parse("", ""), Route::Dashboard);
        assert_eq!(
            Route::parse("/nowhere", ""),
            Route::Unknown("/nowhere".to_string())
        );
    }

    #[test]
    fn test_quiz_route_without_mode() {
        assert_eq!(
            Route::parse("/quiz/4", "other=1"),
            Route::Quiz {
                quiz_id: 4,
                mode: None
            }
        );
        assert_eq!(
            Route::parse("/quiz/4", "mode=view"),
            Route::Quiz {
                quiz_id: 4,
                mode: Some(QuizMode::View)
            }
        );
    }

    #[test]
    fn test_non_numeric_ids_do_not_match() {
        assert_eq!(
            Route::parse("/subject/abc", ""),
            Route::Unknown("/subject/abc".to_string())
        );
    }

    #[test]
    fn test_trailing_segments_do_not_match() {
        for path in [
            "/subject/3/planner",
            "/subject/3/weekly",
            "/subject/3/week/9/concepts",
            "/quiz/5/extra",
            "/subject/3/",
        ] {
            assert_eq!(Route::parse(path, ""), Route::Unknown(path.to_string()), "{}", path);
        }
    }

    #[test]
    fn test_unauthenticated_deep_path_resolves_to_login() {
        let route = Route::parse("/subject/3/plan", "");
        assert_eq!(Screen::resolve(&route, false), Screen::Login);
        assert_eq!(
            Screen::resolve(&route, true),
            Screen::StudyPlan { subject_id: 3 }
        );
    }

    #[test]
    fn test_screen_paths_parse_back() {
        let screens = [
            Screen::Dashboard,
            Screen::Settings,
            Screen::Subject { subject_id: 5 },
            Screen::StudyPlan { subject_id: 5 },
            Screen::Concept {
                subject_id: 5,
                week_id: 8,
            },
            Screen::Quiz {
                quiz_id: 2,
                mode: QuizMode::Retake,
            },
        ];

        for screen in screens {
            let path = screen.path();
            let (path, query) = path.split_once('?').unwrap_or((path.as_str(), ""));
            let route = Route::parse(path, query);
            assert_eq!(Screen::resolve(&route, true), screen);
        }
    }

    #[test]
    fn test_signup_flow_transitions() {
        let mut screen = Screen::Login;

        screen = transition(&screen, ScreenEvent::ShowSignUp);
        assert_eq!(screen, Screen::SignUp);

        screen = transition(&screen, ScreenEvent::SignedUp);
        assert_eq!(screen, Screen::Welcome);

        // Navigation does not skip the onboarding flow
        screen = transition(&screen, ScreenEvent::Navigate(Route::Settings));
        assert_eq!(screen, Screen::Welcome);

        screen = transition(&screen, ScreenEvent::WelcomeDone);
        assert_eq!(screen, Screen::Onboarding);

        screen = transition(&screen, ScreenEvent::OnboardingDone);
        assert_eq!(screen, Screen::Dashboard);
    }

    #[test]
    fn test_login_respects_onboarding_flag() {
        assert_eq!(
            transition(
                &Screen::Login,
                ScreenEvent::LoggedIn {
                    onboarding_completed: false
                }
            ),
            Screen::Onboarding
        );
        assert_eq!(
            transition(
                &Screen::Login,
                ScreenEvent::LoggedIn {
                    onboarding_completed: true
                }
            ),
            Screen::Dashboard
        );
    }

    #[test]
    fn test_back_returns_to_parent() {
        let concept = Screen::Concept {
            subject_id: 7,
            week_id: 1,
        };
        assert_eq!(
            transition(&concept, ScreenEvent::Back),
            Screen::Subject { subject_id: 7 }
        );
        assert_eq!(
            transition(&Screen::Subject { subject_id: 7 }, ScreenEvent::Back),
            Screen::Dashboard
        );
    }

    #[test]
    fn test_login_screen_ignores_deep_links() {
        assert_eq!(
            transition(&Screen::Login, ScreenEvent::OpenSubject(3)),
            Screen::Login
        );
    }

    #[test]
    fn test_logout_from_anywhere() {
        let quiz = Screen::Quiz {
            quiz_id: 1,
            mode: QuizMode::View,
        };
        assert_eq!(transition(&quiz, ScreenEvent::LoggedOut), Screen::Login);
    }

    #[test]
    fn test_quiz_mode_resolution_order() {
        assert_eq!(
            QuizMode::resolve(Some(QuizMode::View), Some("retake")),
            QuizMode::View
        );
        assert_eq!(QuizMode::resolve(None, Some("retake")), QuizMode::Retake);
        assert_eq!(QuizMode::resolve(None, None), QuizMode::View);
    }

    #[test]
    fn test_address_mode_mirrored_into_store() {
        // Arrange
        let mut store = MemoryStore::new();

        // Act
        let retake = QuizMode::from_address(&mut store, 5, Some(QuizMode::Retake)).unwrap();
        let flag_after_retake = store.get("quiz_5_mode");
        let plain = QuizMode::from_address(&mut store, 5, None).unwrap();

        // Assert
        assert_eq!(retake, QuizMode::Retake);
        assert_eq!(flag_after_retake.as_deref(), Some("retake"));
        assert_eq!(plain, QuizMode::View);
        assert_eq!(store.get("quiz_5_mode"), None);
    }

    #[test]
    fn test_stored_flag_used_without_address() {
        // Arrange
        let mut store = MemoryStore::new();
        store.set("quiz_5_mode", "retake").unwrap();

        // Act
        let remembered = QuizMode::sync_store(&mut store, 5, None).unwrap();
        let viewed = QuizMode::sync_store(&mut store, 5, Some(QuizMode::View)).unwrap();

        // Assert
        assert_eq!(remembered, QuizMode::Retake);
        assert_eq!(viewed, QuizMode::View);
        assert_eq!(store.get("quiz_5_mode"), None);
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param("?a=1&mode=retake", "mode"), Some("retake"));
        assert_eq!(query_param("mode=", "mode"), None);
        assert_eq!(query_param("", "mode"), None);
    }
}
