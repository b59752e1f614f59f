//! GraphQL operation definitions.
//!
//! Each operation is pure data: a name, a kind, the document sent over the
//! wire, and the typed variables/result shapes. Result shapes are enforced
//! at first use, since decoding a response that does not match fails fast
//! with a `Schema` error naming the operation; fields are never silently
//! dropped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{
    AuthPayload, Book, BookFilterInput, BookInput, BookSortInput, Category, CategoryInput,
    CreatedBook, LoginInput, PaginatedBooks, PaginationInput, RegisterInput, Review, ReviewInput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A named GraphQL operation with typed variables and result shape.
pub trait Operation {
    const NAME: &'static str;
    const KIND: OperationKind;
    const DOCUMENT: &'static str;
    type Variables: Serialize + Send + Sync;
    type Data: DeserializeOwned + Send;
}

pub struct Register;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterVariables {
    pub input: RegisterInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterData {
    pub register: bool,
}

impl Operation for Register {
    const NAME: &'static str = "Register";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"
mutation Register($input: RegisterInput!) {
  register(input: $input)
}"#;
    type Variables = RegisterVariables;
    type Data = RegisterData;
}

pub struct Login;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginVariables {
    pub input: LoginInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    pub login: AuthPayload,
}

impl Operation for Login {
    const NAME: &'static str = "Login";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"
mutation Login($input: LoginInput!) {
  login(input: $input) {
    accessToken
  }
}"#;
    type Variables = LoginVariables;
    type Data = LoginData;
}

pub struct GetBooks;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetBooksVariables {
    /// Unused by the list screen; skipped when absent so list refetches
    /// carry exactly `{filters, sort}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInput>,
    pub filters: Option<BookFilterInput>,
    pub sort: Option<BookSortInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetBooksData {
    #[serde(rename = "getBooks")]
    pub get_books: PaginatedBooks,
}

impl Operation for GetBooks {
    const NAME: &'static str = "GetBooks";
    const KIND: OperationKind = OperationKind::Query;
    const DOCUMENT: &'static str = r#"
query GetBooks($pagination: BookPaginationInput, $filters: BookFilterInput, $sort: BookSortInput) {
  getBooks(pagination: $pagination, filters: $filters, sort: $sort) {
    total
    books {
      id
      title
      author
      publishedYear
      category {
        id
        name
      }
      reviews {
        id
        content
        rating
      }
    }
  }
}"#;
    type Variables = GetBooksVariables;
    type Data = GetBooksData;
}

pub struct GetBook;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GetBookVariables {
    pub id: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetBookData {
    #[serde(rename = "getBook")]
    pub get_book: Book,
}

impl Operation for GetBook {
    const NAME: &'static str = "GetBook";
    const KIND: OperationKind = OperationKind::Query;
    const DOCUMENT: &'static str = r#"
query GetBook($id: Int!) {
  getBook(id: $id) {
    id
    title
    author
    publishedYear
    category {
      id
      name
    }
    reviews {
      id
      content
      rating
      userId
      username
    }
  }
}"#;
    type Variables = GetBookVariables;
    type Data = GetBookData;
}

pub struct GetCategories;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetCategoriesVariables {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetCategoriesData {
    #[serde(rename = "getCategories")]
    pub get_categories: Vec<Category>,
}

impl Operation for GetCategories {
    const NAME: &'static str = "GetCategories";
    const KIND: OperationKind = OperationKind::Query;
    const DOCUMENT: &'static str = r#"
query GetCategories {
  getCategories {
    id
    name
  }
}"#;
    type Variables = GetCategoriesVariables;
    type Data = GetCategoriesData;
}

pub struct CreateBook;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBookVariables {
    pub book: BookInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateBookData {
    #[serde(rename = "createBook")]
    pub create_book: CreatedBook,
}

impl Operation for CreateBook {
    const NAME: &'static str = "CreateBook";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"
mutation CreateBook($book: BookInput!) {
  createBook(book: $book) {
    id
    title
    author
  }
}"#;
    type Variables = CreateBookVariables;
    type Data = CreateBookData;
}

/// Part of the backend contract; no screen currently issues it.
pub struct UpdateBook;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateBookVariables {
    pub id: i32,
    pub book: BookInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateBookData {
    #[serde(rename = "updateBook")]
    pub update_book: CreatedBook,
}

impl Operation for UpdateBook {
    const NAME: &'static str = "UpdateBook";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"
mutation UpdateBook($id: Int!, $book: BookInput!) {
  updateBook(id: $id, book: $book) {
    id
    title
    author
  }
}"#;
    type Variables = UpdateBookVariables;
    type Data = UpdateBookData;
}

pub struct DeleteBook;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteBookVariables {
    pub id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteBookData {
    #[serde(rename = "deleteBook")]
    pub delete_book: bool,
}

impl Operation for DeleteBook {
    const NAME: &'static str = "DeleteBook";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"
mutation DeleteBook($id: Int!) {
  deleteBook(id: $id)
}"#;
    type Variables = DeleteBookVariables;
    type Data = DeleteBookData;
}

pub struct CreateCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCategoryVariables {
    pub category: CategoryInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCategoryData {
    #[serde(rename = "createCategory")]
    pub create_category: Category,
}

impl Operation for CreateCategory {
    const NAME: &'static str = "CreateCategory";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"
mutation CreateCategory($category: CategoryInput!) {
  createCategory(category: $category) {
    id
    name
  }
}"#;
    type Variables = CreateCategoryVariables;
    type Data = CreateCategoryData;
}

pub struct WriteReview;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReviewVariables {
    pub review: ReviewInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteReviewData {
    #[serde(rename = "writeReview")]
    pub write_review: Review,
}

impl Operation for WriteReview {
    const NAME: &'static str = "WriteReview";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"
mutation WriteReview($review: ReviewInput!) {
  writeReview(review: $review) {
    id
    content
    rating
    userId
    bookId
  }
}"#;
    type Variables = WriteReviewVariables;
    type Data = WriteReviewData;
}
