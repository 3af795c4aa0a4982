use batch_core::{ArticleRecord, CallOutcome, Category, CategoryRecord, ResultRecord};
use serde::Deserialize;
use serde_json::Value;

use crate::sanitize::{sanitize, AllowList};

/// Article fields as returned by the extraction API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
    pub article_body_html: Option<String>,
    pub article_body_raw: Option<String>,
    pub article_body: Option<String>,
    pub headline: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<Value>>,
}

/// One entry of a categorization `category_list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPayload {
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub label: Value,
    #[serde(default)]
    pub relevance: Value,
    #[serde(default)]
    pub abs_relevance: Value,
}

/// Capitalizes the first character of every space-delimited token and keeps
/// the rest verbatim. Runs of spaces are preserved.
pub fn title_case(headline: &str) -> String {
    headline
        .split(' ')
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds an article record, or `NoArticle` when the body is missing.
pub fn format_article(payload: ArticlePayload, target: &str, allow: &AllowList) -> CallOutcome {
    let Some(body_html) = payload.article_body_html else {
        return CallOutcome::NoArticle;
    };

    let record = ArticleRecord {
        title: payload.headline.as_deref().map(title_case).unwrap_or_default(),
        html: sanitize(&body_html, allow),
        raw_html: sanitize(payload.article_body_raw.as_deref().unwrap_or_default(), allow),
        text: payload.article_body,
        url: payload.url.unwrap_or_else(|| target.to_string()),
        description: payload.description,
        images: payload
            .images
            .iter()
            .flatten()
            .filter_map(image_url)
            .collect(),
    };
    CallOutcome::Record(ResultRecord::Article(record))
}

/// Builds a category record; a missing list yields an empty one.
pub fn format_categories(categories: Option<Vec<CategoryPayload>>, target: &str) -> CallOutcome {
    let categories = categories
        .unwrap_or_default()
        .into_iter()
        .map(|entry| Category {
            code: value_text(&entry.code),
            label: value_text(&entry.label),
            relevance: value_text(&entry.relevance),
            abs_relevance: value_text(&entry.abs_relevance),
        })
        .collect();

    CallOutcome::Record(ResultRecord::Categories(CategoryRecord {
        url: target.to_string(),
        categories,
    }))
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(url) => Some(url.clone()),
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
