use serde::{Deserialize, Serialize};

/// Help-center article shown on the support screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpArticle {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub category: Option<String>,
}
