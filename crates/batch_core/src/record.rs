/// Article-extraction result for one target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleRecord {
    pub title: String,
    /// Sanitized rendered article body.
    pub html: String,
    /// Sanitized original article body.
    pub raw_html: String,
    pub text: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Category {
    pub code: String,
    pub label: String,
    pub relevance: String,
    pub abs_relevance: String,
}

/// Categorization result for one target. `categories` is empty when the
/// remote response carried no category list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryRecord {
    pub url: String,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRecord {
    Article(ArticleRecord),
    Categories(CategoryRecord),
}

impl ResultRecord {
    pub fn source_url(&self) -> &str {
        match self {
            ResultRecord::Article(article) => &article.url,
            ResultRecord::Categories(categories) => &categories.url,
        }
    }

    /// Category entries, in response order. Articles carry none.
    pub fn categories(&self) -> &[Category] {
        match self {
            ResultRecord::Article(_) => &[],
            ResultRecord::Categories(record) => &record.categories,
        }
    }
}

/// Settled outcome of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Record(ResultRecord),
    /// The call succeeded but the response held no article body.
    NoArticle,
    /// Transport failure, non-success status or malformed payload.
    Failed { reason: String },
}
