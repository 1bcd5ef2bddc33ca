use serde::Deserialize;

pub type PostId = u32;

pub const NEW_POST_READ_TIME: &str = "New post";

const SEED: &str = include_str!("../assets/seed.json");

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub excerpt: String,
    /// Body text. Images are embedded as `![alt](uri)` tags.
    pub content: String,
    pub category: String,
    /// `YYYY-MM-DD`, as produced by a date input.
    pub date: String,
    /// Display label only, never computed.
    pub read_time: String,
}

/// The editable part of a post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub date: String,
}

impl From<&Post> for PostFields {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
            date: post.date.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => post.category == *name,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, Self::Named(n) if n == name)
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct Seed {
    pub categories: Vec<String>,
    pub posts: Vec<Post>,
}

impl Seed {
    /// Posts and categories every session starts from.
    pub fn bundled() -> Self {
        serde_json::from_str(SEED).unwrap_or_else(|err| {
            log::warn!("bundled seed is unreadable, starting empty: {err}");
            Self::default()
        })
    }
}

/// Today's UTC date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
