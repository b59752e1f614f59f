//! Per-screen view-state controllers.

pub mod auth;
pub mod books;

pub use auth::{LoginController, RegisterController};
pub use books::{BookDetailController, BookListController};

/// Where the shell should route next, as decided by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigate {
    BookList,
    Login { registration_success: bool },
}

/// Outcome of a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// Nothing happened: a submission was already in flight, or there was
    /// nothing armed to submit.
    Ignored,
    /// The screen stays put; state carries any error to show.
    Stayed,
    /// The shell should navigate.
    Navigate(Navigate),
}

/// Lifecycle of one fetched query input.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Loading,
    Ready(T),
    Failed(String),
}

// Hand-written so `Load<T>` defaults to `Loading` without a `T: Default`
// bound.
impl<T> Default for Load<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> Load<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
