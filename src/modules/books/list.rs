//! Book list screen: filtering, sorting, add/delete, category creation.

use std::sync::{Arc, Mutex};

use bookshelf_gateway::operations::{
    CreateBook, CreateBookVariables, CreateCategory, CreateCategoryVariables, DeleteBook,
    DeleteBookVariables, GetBooks, GetBooksVariables, GetCategories, GetCategoriesVariables,
};
use bookshelf_gateway::types::{
    BookFilterInput, BookInput, BookSortField, BookSortInput, Category, CategoryInput,
    PaginatedBooks, SortOrder,
};
use bookshelf_gateway::{Gateway, OperationError};

use crate::banner::StatusBanner;
use crate::modules::{Load, Navigate, Submit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(i32),
}

impl CategoryFilter {
    fn to_variables(self) -> Option<BookFilterInput> {
        match self {
            Self::All => None,
            Self::Category(id) => Some(BookFilterInput::by_category(id)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    TitleAz,
    AuthorAz,
    #[default]
    DateAddedNewest,
}

impl SortBy {
    fn to_variables(self) -> Option<BookSortInput> {
        let (field, order) = match self {
            Self::TitleAz => (BookSortField::Title, SortOrder::Asc),
            Self::AuthorAz => (BookSortField::Author, SortOrder::Asc),
            Self::DateAddedNewest => (BookSortField::PublishedYear, SortOrder::Desc),
        };
        Some(BookSortInput { field, order })
    }
}

/// Draft state of the add-book form while it is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddBookForm {
    pub title: String,
    pub author: String,
    pub category_id: Option<i32>,
    pub published_year: Option<i32>,
    pub cover_url: String,
}

/// What the screen body should render.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Failed(String),
    Ready {
        books: PaginatedBooks,
        categories: Vec<Category>,
    },
}

#[derive(Default)]
struct ListState {
    filter: CategoryFilter,
    sort: SortBy,
    books: Load<PaginatedBooks>,
    categories: Load<Vec<Category>>,
    books_epoch: u64,
    add_form: Option<AddBookForm>,
    add_error: Option<String>,
    add_submitting: bool,
    delete_target: Option<i32>,
    delete_error: Option<String>,
    delete_submitting: bool,
    category_name: String,
    category_error: Option<String>,
    category_submitting: bool,
}

pub struct BookListController {
    gateway: Arc<Gateway>,
    banner: StatusBanner,
    state: Mutex<ListState>,
}

impl BookListController {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            banner: StatusBanner::new(),
            state: Mutex::new(ListState::default()),
        }
    }

    /// Initial fetch: books and categories run concurrently, and the view
    /// stays `Loading` until both have settled.
    pub async fn load(&self) {
        let (filters, sort, epoch) = {
            let mut state = self.state.lock().expect("list state");
            state.books = Load::Loading;
            state.categories = Load::Loading;
            state.books_epoch += 1;
            (
                state.filter.to_variables(),
                state.sort.to_variables(),
                state.books_epoch,
            )
        };

        let books = self.gateway.execute::<GetBooks>(GetBooksVariables {
            pagination: None,
            filters,
            sort,
        });
        let categories = self
            .gateway
            .execute::<GetCategories>(GetCategoriesVariables {});
        let (books, categories) = tokio::join!(books, categories);

        let mut state = self.state.lock().expect("list state");
        if state.books_epoch == epoch {
            state.books = match books {
                Ok(data) => Load::Ready(data.get_books),
                Err(err) => Load::Failed(err.to_string()),
            };
        }
        state.categories = match categories {
            Ok(data) => Load::Ready(data.get_categories),
            Err(err) => Load::Failed(err.to_string()),
        };
    }

    /// Every list refresh goes through here so the request always carries
    /// the combined current filter and sort, whichever axis changed.
    async fn refetch_books(&self) {
        let (filters, sort, epoch) = {
            let mut state = self.state.lock().expect("list state");
            state.books_epoch += 1;
            (
                state.filter.to_variables(),
                state.sort.to_variables(),
                state.books_epoch,
            )
        };

        let result = self
            .gateway
            .refetch::<GetBooks>(GetBooksVariables {
                pagination: None,
                filters,
                sort,
            })
            .await;

        let mut state = self.state.lock().expect("list state");
        // A newer refetch owns the list; this response is stale.
        if state.books_epoch != epoch {
            return;
        }
        state.books = match result {
            Ok(data) => Load::Ready(data.get_books),
            Err(err) => Load::Failed(err.to_string()),
        };
    }

    pub async fn set_filter(&self, filter: CategoryFilter) {
        self.state.lock().expect("list state").filter = filter;
        self.refetch_books().await;
    }

    pub async fn set_sort(&self, sort: SortBy) {
        self.state.lock().expect("list state").sort = sort;
        self.refetch_books().await;
    }

    pub fn filter(&self) -> CategoryFilter {
        self.state.lock().expect("list state").filter
    }

    pub fn sort(&self) -> SortBy {
        self.state.lock().expect("list state").sort
    }

    pub fn view(&self) -> ListView {
        let state = self.state.lock().expect("list state");
        if let Some(message) = state.books.error() {
            return ListView::Failed(message.to_string());
        }
        if let Some(message) = state.categories.error() {
            return ListView::Failed(message.to_string());
        }
        match (state.books.ready(), state.categories.ready()) {
            (Some(books), Some(categories)) => ListView::Ready {
                books: books.clone(),
                categories: categories.clone(),
            },
            _ => ListView::Loading,
        }
    }

    pub fn success_message(&self) -> Option<String> {
        self.banner.message()
    }

    pub fn dismiss_success(&self) {
        self.banner.dismiss();
    }

    pub fn open_add_form(&self) {
        let mut state = self.state.lock().expect("list state");
        if state.add_form.is_none() {
            state.add_form = Some(AddBookForm::default());
        }
    }

    pub fn cancel_add_form(&self) {
        let mut state = self.state.lock().expect("list state");
        state.add_form = None;
        state.add_error = None;
    }

    /// Apply edits to the open add-book form; ignored while closed.
    pub fn edit_add_form(&self, edit: impl FnOnce(&mut AddBookForm)) {
        let mut state = self.state.lock().expect("list state");
        if let Some(form) = state.add_form.as_mut() {
            edit(form);
        }
    }

    pub fn add_form(&self) -> Option<AddBookForm> {
        self.state.lock().expect("list state").add_form.clone()
    }

    pub fn add_error(&self) -> Option<String> {
        self.state.lock().expect("list state").add_error.clone()
    }

    pub async fn submit_add_book(&self) -> Submit {
        let book = {
            let mut state = self.state.lock().expect("list state");
            if state.add_submitting {
                return Submit::Ignored;
            }
            let Some(form) = state.add_form.as_ref() else {
                return Submit::Ignored;
            };
            match build_book_input(form) {
                Ok(book) => {
                    state.add_submitting = true;
                    state.add_error = None;
                    book
                }
                Err(err) => {
                    state.add_error = Some(err.to_string());
                    return Submit::Stayed;
                }
            }
        };

        let result = self
            .gateway
            .execute::<CreateBook>(CreateBookVariables { book })
            .await;

        {
            let mut state = self.state.lock().expect("list state");
            state.add_submitting = false;
            match &result {
                Ok(_) => state.add_form = None,
                // On auth failure the screen is abandoned for the login
                // page; anything else keeps the form open, values intact.
                Err(err) if err.is_auth_required() => {}
                Err(err) => state.add_error = Some(err.to_string()),
            }
        }

        match result {
            Ok(_) => {
                self.banner.set("Book added successfully!");
                self.refetch_books().await;
                Submit::Stayed
            }
            Err(err) if err.is_auth_required() => Submit::Navigate(Navigate::Login {
                registration_success: false,
            }),
            Err(_) => Submit::Stayed,
        }
    }

    /// Arm the delete confirmation modal for one book.
    pub fn request_delete(&self, id: i32) {
        let mut state = self.state.lock().expect("list state");
        state.delete_target = Some(id);
        state.delete_error = None;
    }

    pub fn cancel_delete(&self) {
        self.state.lock().expect("list state").delete_target = None;
    }

    pub fn delete_target(&self) -> Option<i32> {
        self.state.lock().expect("list state").delete_target
    }

    pub fn delete_error(&self) -> Option<String> {
        self.state.lock().expect("list state").delete_error.clone()
    }

    /// Delete the armed book. Without the prior [`Self::request_delete`]
    /// this is a no-op: no confirmation, no request.
    pub async fn confirm_delete(&self) -> Submit {
        let id = {
            let mut state = self.state.lock().expect("list state");
            if state.delete_submitting {
                return Submit::Ignored;
            }
            let Some(id) = state.delete_target else {
                return Submit::Ignored;
            };
            state.delete_submitting = true;
            id
        };

        let result = self
            .gateway
            .execute::<DeleteBook>(DeleteBookVariables { id })
            .await;

        {
            let mut state = self.state.lock().expect("list state");
            state.delete_submitting = false;
            match &result {
                Ok(_) => state.delete_target = None,
                Err(err) => state.delete_error = Some(err.to_string()),
            }
        }

        match result {
            Ok(_) => {
                self.banner.set("Book deleted successfully!");
                self.refetch_books().await;
                Submit::Stayed
            }
            Err(_) => Submit::Stayed,
        }
    }

    pub fn set_category_name(&self, name: impl Into<String>) {
        self.state.lock().expect("list state").category_name = name.into();
    }

    pub fn category_name(&self) -> String {
        self.state.lock().expect("list state").category_name.clone()
    }

    pub fn category_error(&self) -> Option<String> {
        self.state.lock().expect("list state").category_error.clone()
    }

    /// Create a category. Success clears the input and banners, but does
    /// not refetch the book list; the categories query refreshes on its
    /// own cache terms.
    pub async fn submit_category(&self) -> Submit {
        let name = {
            let mut state = self.state.lock().expect("list state");
            if state.category_submitting {
                return Submit::Ignored;
            }
            let name = state.category_name.trim().to_string();
            if name.is_empty() {
                state.category_error = Some("category name is required".to_string());
                return Submit::Stayed;
            }
            state.category_submitting = true;
            state.category_error = None;
            name
        };

        let result = self
            .gateway
            .execute::<CreateCategory>(CreateCategoryVariables {
                category: CategoryInput { name },
            })
            .await;

        let mut state = self.state.lock().expect("list state");
        state.category_submitting = false;
        match result {
            Ok(_) => {
                state.category_name.clear();
                drop(state);
                self.banner.set("Category added successfully!");
            }
            Err(err) => state.category_error = Some(err.to_string()),
        }
        Submit::Stayed
    }
}

fn build_book_input(form: &AddBookForm) -> Result<BookInput, OperationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(OperationError::validation("title is required"));
    }
    let author = form.author.trim();
    if author.is_empty() {
        return Err(OperationError::validation("author is required"));
    }
    let Some(category_id) = form.category_id else {
        return Err(OperationError::validation("category is required"));
    };
    let cover_url = Some(form.cover_url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_owned);
    Ok(BookInput {
        title: title.to_owned(),
        author: author.to_owned(),
        category_id,
        published_year: form.published_year.unwrap_or_else(current_year),
        cover_url,
    })
}

fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::{scripted_gateway, ScriptedTransport};
    use serde_json::{json, Value};

    fn books_payload() -> Value {
        json!({
            "getBooks": {
                "total": 1,
                "books": [{
                    "id": 1,
                    "title": "Dune",
                    "author": "Frank Herbert",
                    "publishedYear": 1965,
                    "category": {"id": 2, "name": "Science"},
                    "reviews": [],
                }],
            }
        })
    }

    fn categories_payload() -> Value {
        json!({"getCategories": [{"id": 2, "name": "Science"}]})
    }

    fn script_list(transport: &ScriptedTransport) {
        transport.respond("GetBooks", books_payload());
        transport.respond("GetCategories", categories_payload());
    }

    fn default_sort_json() -> Value {
        json!({"field": "published_year", "order": "desc"})
    }

    #[tokio::test]
    async fn load_sends_combined_default_variables() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);

        let controller = BookListController::new(gateway);
        controller.load().await;

        assert_eq!(
            transport.last_variables("GetBooks"),
            json!({"filters": null, "sort": default_sort_json()})
        );
        assert!(matches!(controller.view(), ListView::Ready { .. }));
    }

    #[tokio::test]
    async fn changing_sort_keeps_the_filter() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);

        let controller = BookListController::new(gateway);
        controller.load().await;
        controller.set_filter(CategoryFilter::Category(2)).await;
        assert_eq!(
            transport.last_variables("GetBooks"),
            json!({"filters": {"categoryId": 2}, "sort": default_sort_json()})
        );

        controller.set_sort(SortBy::TitleAz).await;
        assert_eq!(
            transport.last_variables("GetBooks"),
            json!({
                "filters": {"categoryId": 2},
                "sort": {"field": "title", "order": "asc"},
            })
        );
    }

    #[tokio::test]
    async fn changing_filter_keeps_the_sort() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);

        let controller = BookListController::new(gateway);
        controller.load().await;
        controller.set_sort(SortBy::AuthorAz).await;
        controller.set_filter(CategoryFilter::Category(5)).await;

        assert_eq!(
            transport.last_variables("GetBooks"),
            json!({
                "filters": {"categoryId": 5},
                "sort": {"field": "author", "order": "asc"},
            })
        );
    }

    #[tokio::test]
    async fn view_blocks_until_both_queries_settle() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.hold("GetCategories");

        let controller = Arc::new(BookListController::new(gateway));
        let load = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.load().await }
        });

        while transport.count("GetCategories") == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(controller.view(), ListView::Loading);

        transport.release("GetCategories");
        load.await.unwrap();
        assert!(matches!(controller.view(), ListView::Ready { .. }));
    }

    #[tokio::test]
    async fn failed_categories_short_circuit_the_view() {
        let (gateway, transport) = scripted_gateway();
        transport.respond("GetBooks", books_payload());
        transport.fail("GetCategories", "categories unavailable");

        let controller = BookListController::new(gateway);
        controller.load().await;
        assert_eq!(
            controller.view(),
            ListView::Failed("categories unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn add_book_success_closes_form_banners_and_refetches() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.respond(
            "CreateBook",
            json!({"createBook": {"id": 9, "title": "The Hobbit", "author": "J.R.R. Tolkien"}}),
        );

        let controller = BookListController::new(gateway);
        controller.load().await;
        controller.open_add_form();
        controller.edit_add_form(|form| {
            form.title = "The Hobbit".to_string();
            form.author = "J.R.R. Tolkien".to_string();
            form.category_id = Some(2);
            form.published_year = Some(1937);
        });

        assert_eq!(controller.submit_add_book().await, Submit::Stayed);
        assert_eq!(controller.add_form(), None);
        assert_eq!(
            controller.success_message().as_deref(),
            Some("Book added successfully!")
        );
        // Initial load plus the post-mutation refresh.
        assert_eq!(transport.count("GetBooks"), 2);
        assert_eq!(
            transport.last_variables("GetBooks"),
            json!({"filters": null, "sort": default_sort_json()})
        );
    }

    #[tokio::test]
    async fn add_book_omits_empty_cover_url() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.respond(
            "CreateBook",
            json!({"createBook": {"id": 9, "title": "T", "author": "A"}}),
        );

        let controller = BookListController::new(gateway);
        controller.open_add_form();
        controller.edit_add_form(|form| {
            form.title = "T".to_string();
            form.author = "A".to_string();
            form.category_id = Some(2);
            form.published_year = Some(2001);
            form.cover_url = String::new();
        });
        controller.submit_add_book().await;

        assert_eq!(
            transport.last_variables("CreateBook"),
            json!({"book": {
                "title": "T",
                "author": "A",
                "categoryId": 2,
                "publishedYear": 2001,
            }})
        );
    }

    #[tokio::test]
    async fn add_book_sends_non_empty_cover_url() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.respond(
            "CreateBook",
            json!({"createBook": {"id": 9, "title": "T", "author": "A"}}),
        );

        let controller = BookListController::new(gateway);
        controller.open_add_form();
        controller.edit_add_form(|form| {
            form.title = "T".to_string();
            form.author = "A".to_string();
            form.category_id = Some(2);
            form.published_year = Some(2001);
            form.cover_url = "http://x".to_string();
        });
        controller.submit_add_book().await;

        assert_eq!(
            transport.last_variables("CreateBook")["book"]["cover_url"],
            json!("http://x")
        );
    }

    #[tokio::test]
    async fn add_book_defaults_published_year_to_current_year() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.respond(
            "CreateBook",
            json!({"createBook": {"id": 9, "title": "T", "author": "A"}}),
        );

        let controller = BookListController::new(gateway);
        controller.open_add_form();
        controller.edit_add_form(|form| {
            form.title = "T".to_string();
            form.author = "A".to_string();
            form.category_id = Some(2);
        });
        controller.submit_add_book().await;

        assert_eq!(
            transport.last_variables("CreateBook")["book"]["publishedYear"],
            json!(current_year())
        );
    }

    #[tokio::test]
    async fn add_book_requires_a_category_before_any_request() {
        let (gateway, transport) = scripted_gateway();
        let controller = BookListController::new(gateway);
        controller.open_add_form();
        controller.edit_add_form(|form| {
            form.title = "T".to_string();
            form.author = "A".to_string();
        });

        assert_eq!(controller.submit_add_book().await, Submit::Stayed);
        assert_eq!(
            controller.add_error().as_deref(),
            Some("validation error: category is required")
        );
        assert_eq!(transport.count("CreateBook"), 0);
    }

    #[tokio::test]
    async fn add_book_auth_error_redirects_to_login() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.fail("CreateBook", "Authentication required to add books");

        let controller = BookListController::new(gateway);
        controller.open_add_form();
        controller.edit_add_form(|form| {
            form.title = "T".to_string();
            form.author = "A".to_string();
            form.category_id = Some(2);
        });

        assert_eq!(
            controller.submit_add_book().await,
            Submit::Navigate(Navigate::Login {
                registration_success: false
            })
        );
    }

    #[tokio::test]
    async fn add_book_server_error_keeps_the_form_and_values() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.fail("CreateBook", "category does not exist");

        let controller = BookListController::new(gateway);
        controller.load().await;
        controller.open_add_form();
        controller.edit_add_form(|form| {
            form.title = "The Hobbit".to_string();
            form.author = "J.R.R. Tolkien".to_string();
            form.category_id = Some(99);
        });

        assert_eq!(controller.submit_add_book().await, Submit::Stayed);
        let form = controller.add_form().expect("form stays open");
        assert_eq!(form.title, "The Hobbit");
        assert_eq!(form.category_id, Some(99));
        assert_eq!(
            controller.add_error().as_deref(),
            Some("category does not exist")
        );
        // No refresh on failure.
        assert_eq!(transport.count("GetBooks"), 1);
    }

    #[tokio::test]
    async fn delete_without_an_armed_target_is_ignored() {
        let (gateway, transport) = scripted_gateway();
        let controller = BookListController::new(gateway);

        assert_eq!(controller.confirm_delete().await, Submit::Ignored);
        assert_eq!(transport.count("DeleteBook"), 0);
    }

    #[tokio::test]
    async fn cancel_leaves_data_untouched() {
        let (gateway, transport) = scripted_gateway();
        let controller = BookListController::new(gateway);

        controller.request_delete(3);
        controller.cancel_delete();
        assert_eq!(controller.confirm_delete().await, Submit::Ignored);
        assert_eq!(transport.count("DeleteBook"), 0);
    }

    #[tokio::test]
    async fn confirmed_delete_closes_modal_banners_and_refetches() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.respond("DeleteBook", json!({"deleteBook": true}));

        let controller = BookListController::new(gateway);
        controller.load().await;
        controller.request_delete(3);

        assert_eq!(controller.confirm_delete().await, Submit::Stayed);
        assert_eq!(transport.last_variables("DeleteBook"), json!({"id": 3}));
        assert_eq!(controller.delete_target(), None);
        assert_eq!(
            controller.success_message().as_deref(),
            Some("Book deleted successfully!")
        );
        assert_eq!(transport.count("GetBooks"), 2);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_modal_open() {
        let (gateway, transport) = scripted_gateway();
        transport.fail("DeleteBook", "Book not found");

        let controller = BookListController::new(gateway);
        controller.request_delete(3);

        assert_eq!(controller.confirm_delete().await, Submit::Stayed);
        assert_eq!(controller.delete_target(), Some(3));
        assert_eq!(controller.delete_error().as_deref(), Some("Book not found"));
    }

    #[tokio::test]
    async fn category_success_clears_input_without_refetching_books() {
        let (gateway, transport) = scripted_gateway();
        script_list(&transport);
        transport.respond(
            "CreateCategory",
            json!({"createCategory": {"id": 7, "name": "Fantasy"}}),
        );

        let controller = BookListController::new(gateway);
        controller.load().await;
        controller.set_category_name("Fantasy");

        assert_eq!(controller.submit_category().await, Submit::Stayed);
        assert_eq!(controller.category_name(), "");
        assert_eq!(
            controller.success_message().as_deref(),
            Some("Category added successfully!")
        );
        // The book list is deliberately left alone.
        assert_eq!(transport.count("GetBooks"), 1);
    }

    #[tokio::test]
    async fn blank_category_name_blocks_submission() {
        let (gateway, transport) = scripted_gateway();
        let controller = BookListController::new(gateway);
        controller.set_category_name("   ");

        assert_eq!(controller.submit_category().await, Submit::Stayed);
        assert!(controller.category_error().is_some());
        assert_eq!(transport.count("CreateCategory"), 0);
    }
}
