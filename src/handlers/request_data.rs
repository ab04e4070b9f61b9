use axum::extract::Query;
use axum::response::Html;
use serde::Deserialize;

use crate::pages;

// Query string for the concatenation page; missing values count as empty
#[derive(Debug, Default, Deserialize)]
pub struct ConcatParams {
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub b: String,
}

pub async fn query_handler(Query(params): Query<ConcatParams>) -> Html<String> {
    let result = params.a + &params.b;
    pages::query_result(&result)
}

pub async fn bio_handler() -> Html<&'static str> {
    pages::bio_form()
}
