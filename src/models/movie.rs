use serde::{Deserialize, Deserializer, Serialize};

/// A movie document as stored in the backend container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(deserialize_with = "rating_from_number_or_string")]
    pub rating: f64,
    pub year: i32,
    #[serde(default)]
    pub plot_summary: String,
    #[serde(default)]
    pub plot_synopsis: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl MovieRecord {
    /// Projects the record into a ranked result, dropping the embedding
    pub fn to_result(&self, similarity_score: f64) -> SearchResult {
        SearchResult {
            id: self.id.clone(),
            title: self.title.clone(),
            genres: self.genres.clone(),
            rating: self.rating,
            year: self.year,
            plot_summary: self.plot_summary.clone(),
            plot_synopsis: self.plot_synopsis.clone(),
            similarity_score,
        }
    }
}

/// A ranked movie returned from a similarity query
///
/// `similarity_score` is a distance: lower means closer to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(deserialize_with = "rating_from_number_or_string")]
    pub rating: f64,
    pub year: i32,
    #[serde(default)]
    pub plot_summary: String,
    #[serde(default)]
    pub plot_synopsis: String,
    pub similarity_score: f64,
}

/// Some imported documents carry the rating as a string ("7.8")
fn rating_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Rating {
        Number(f64),
        Text(String),
    }

    match Rating::deserialize(deserializer)? {
        Rating::Number(value) => Ok(value),
        Rating::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid rating '{}': {}", text, e))),
    }
}
