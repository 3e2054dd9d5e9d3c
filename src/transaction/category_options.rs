//! Swaps the category select when the transaction type changes.

use axum::{
    extract::Query,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::transaction::{category::TransactionType, form::category_select};

#[derive(Debug, Deserialize)]
pub struct CategoryOptionsQuery {
    pub type_: TransactionType,
}

/// Render the category select for the requested transaction type with nothing selected.
pub async fn get_category_options(Query(query): Query<CategoryOptionsQuery>) -> Response {
    Html(category_select(query.type_, None, None).into_string()).into_response()
}
