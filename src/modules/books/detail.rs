//! Book detail screen: one book, its reviews, and the review form.

use std::sync::{Arc, Mutex};

use bookshelf_gateway::operations::{
    GetBook, GetBookData, GetBookVariables, WriteReview, WriteReviewVariables,
};
use bookshelf_gateway::types::{Book, Review, ReviewInput};
use bookshelf_gateway::{Gateway, OperationError};

use crate::banner::StatusBanner;
use crate::modules::{Load, Navigate, Submit};

struct DetailState {
    book: Load<Book>,
    draft_rating: i32,
    draft_content: String,
    review_error: Option<String>,
    review_submitting: bool,
}

impl Default for DetailState {
    fn default() -> Self {
        Self {
            book: Load::Loading,
            // The form preselects the top rating, like the dropdown it models.
            draft_rating: 5,
            draft_content: String::new(),
            review_error: None,
            review_submitting: false,
        }
    }
}

pub struct BookDetailController {
    gateway: Arc<Gateway>,
    banner: StatusBanner,
    book_id: i32,
    state: Mutex<DetailState>,
}

impl std::fmt::Debug for BookDetailController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookDetailController")
            .field("book_id", &self.book_id)
            .finish_non_exhaustive()
    }
}

impl BookDetailController {
    /// Build the controller for a raw route parameter. Anything that is
    /// not a positive integer is rejected client-side, without a server
    /// round-trip.
    pub fn new(gateway: Arc<Gateway>, raw_id: &str) -> Result<Self, OperationError> {
        let book_id = parse_book_id(raw_id)?;
        Ok(Self {
            gateway,
            banner: StatusBanner::new(),
            book_id,
            state: Mutex::new(DetailState::default()),
        })
    }

    pub fn book_id(&self) -> i32 {
        self.book_id
    }

    pub async fn load(&self) {
        self.state.lock().expect("detail state").book = Load::Loading;
        let result = self
            .gateway
            .execute::<GetBook>(GetBookVariables { id: self.book_id })
            .await;
        self.store_book(result);
    }

    async fn refetch(&self) {
        let result = self
            .gateway
            .refetch::<GetBook>(GetBookVariables { id: self.book_id })
            .await;
        self.store_book(result);
    }

    fn store_book(&self, result: Result<GetBookData, OperationError>) {
        self.state.lock().expect("detail state").book = match result {
            Ok(data) => Load::Ready(data.get_book),
            Err(err) => Load::Failed(err.to_string()),
        };
    }

    pub fn view(&self) -> Load<Book> {
        self.state.lock().expect("detail state").book.clone()
    }

    /// Mean review rating for the loaded book; 0.0 while loading or when
    /// there are no reviews.
    pub fn average_rating(&self) -> f64 {
        let state = self.state.lock().expect("detail state");
        state
            .book
            .ready()
            .map(|book| average_rating(&book.reviews))
            .unwrap_or(0.0)
    }

    pub fn set_draft_rating(&self, rating: i32) {
        self.state.lock().expect("detail state").draft_rating = rating;
    }

    pub fn set_draft_content(&self, content: impl Into<String>) {
        self.state.lock().expect("detail state").draft_content = content.into();
    }

    pub fn draft_content(&self) -> String {
        self.state.lock().expect("detail state").draft_content.clone()
    }

    pub fn review_error(&self) -> Option<String> {
        self.state.lock().expect("detail state").review_error.clone()
    }

    pub fn success_message(&self) -> Option<String> {
        self.banner.message()
    }

    pub fn dismiss_success(&self) {
        self.banner.dismiss();
    }

    pub async fn submit_review(&self) -> Submit {
        let review = {
            let mut state = self.state.lock().expect("detail state");
            if state.review_submitting {
                return Submit::Ignored;
            }
            if !(1..=5).contains(&state.draft_rating) {
                state.review_error =
                    Some(OperationError::validation("rating must be between 1 and 5").to_string());
                return Submit::Stayed;
            }
            if state.draft_content.trim().is_empty() {
                state.review_error =
                    Some(OperationError::validation("review content is required").to_string());
                return Submit::Stayed;
            }
            state.review_submitting = true;
            state.review_error = None;
            ReviewInput {
                book_id: self.book_id,
                content: state.draft_content.clone(),
                rating: state.draft_rating,
            }
        };

        let result = self
            .gateway
            .execute::<WriteReview>(WriteReviewVariables { review })
            .await;

        {
            let mut state = self.state.lock().expect("detail state");
            state.review_submitting = false;
            match &result {
                Ok(_) => state.draft_content.clear(),
                Err(err) if err.is_auth_required() => {}
                Err(err) => state.review_error = Some(err.to_string()),
            }
        }

        match result {
            Ok(_) => {
                self.banner.set("Review submitted successfully!");
                // Pull the fresh review list so the new entry shows without
                // a manual reload.
                self.refetch().await;
                Submit::Stayed
            }
            Err(err) if err.is_auth_required() => Submit::Navigate(Navigate::Login {
                registration_success: false,
            }),
            Err(_) => Submit::Stayed,
        }
    }
}

pub fn parse_book_id(raw: &str) -> Result<i32, OperationError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(OperationError::validation(format!(
            "'{raw}' is not a valid book id"
        ))),
    }
}

pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: i64 = reviews.iter().map(|review| i64::from(review.rating)).sum();
    sum as f64 / reviews.len() as f64
}
