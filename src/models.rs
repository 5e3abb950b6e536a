//! Records exchanged between the store, the services and the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author recorded when a post does not name one.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An account as held by the auth store. The password hash never leaves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
}

/// Account shape returned to clients alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub blocked: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            blocked: user.blocked,
        }
    }
}

/// The five fixed idea categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Startup,
    ConsumerNeed,
    Project,
    #[default]
    Daydream,
    Wish,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Startup,
        Category::ConsumerNeed,
        Category::Project,
        Category::Daydream,
        Category::Wish,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Startup => "startup",
            Category::ConsumerNeed => "consumer_need",
            Category::Project => "project",
            Category::Daydream => "daydream",
            Category::Wish => "wish",
        }
    }

    /// Lenient parse used on create: anything unknown or missing becomes the default.
    pub fn or_default(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Idea {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    /// Popularity score used by the hot ordering.
    pub fn hot_score(&self) -> i64 {
        self.likes_count * 2 + self.comments_count
    }
}

/// Validated input for a new idea.
#[derive(Debug, Clone)]
pub struct NewIdea {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: Category,
    pub image_url: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    /// `Some(None)` clears the image, `None` leaves it alone.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub image_url: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from a missing field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// `likes*2 + comments`, newest first on ties.
    #[default]
    Hot,
    Latest,
    /// Fallback for any other requested value.
    Likes,
}

impl SortOrder {
    /// Never fails: unknown values select [`SortOrder::Likes`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("hot") => SortOrder::Hot,
            Some("latest") => SortOrder::Latest,
            Some(_) => SortOrder::Likes,
        }
    }
}

/// Filters for listing ideas. All values are bound as query parameters.
#[derive(Debug, Clone, Default)]
pub struct IdeaQuery {
    pub category: Option<Category>,
    pub author: Option<String>,
    /// Half-open `[start, end)` creation window.
    pub created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub sort: SortOrder,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub idea_id: i64,
    pub content: String,
    pub author: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub author: String,
    pub image_url: Option<String>,
}

/// A comment on one of a user's ideas, tagged with that idea's title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub idea_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteState {
    pub favorited: bool,
}
