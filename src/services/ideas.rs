//! Ideas, comments, likes and favorites.

use crate::error::{BoardError, ValidationError};
use crate::filters::{Field, FilterChain};
use crate::models::{
    ANONYMOUS, Category, Comment, FavoriteState, Idea, IdeaPatch, IdeaQuery, LikeState, NewComment,
    NewIdea, ReceivedComment, SortOrder,
};
use crate::storage::DynStorage;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

/// Size of the daily ranking.
pub const DAILY_RANKING_LIMIT: i64 = 50;

/// Request body for a new idea.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdeaForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for a new comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    pub content: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
}

/// Query string of the idea listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub sort: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    non_empty(value)
        .map(str::to_string)
        .ok_or(ValidationError::MissingField(field))
}

/// `None` for an absent or `all` category, otherwise one of the fixed values.
pub fn category_filter(raw: Option<&str>) -> Result<Option<Category>, ValidationError> {
    match non_empty(raw) {
        None | Some("all") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(ValidationError::InvalidCategory),
    }
}

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// The half-open UTC window covering `date` on the server's local calendar.
pub fn local_day_range(date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    let next = date
        .succ_opt()
        .ok_or_else(|| ValidationError::InvalidDate(date.to_string()))?;
    Ok((local_midnight(date), local_midnight(next)))
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

pub struct Ideas {
    storage: DynStorage,
    filters: FilterChain,
}

impl Ideas {
    pub fn new(storage: DynStorage, filters: FilterChain) -> Self {
        Self { storage, filters }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Vec<Idea>, BoardError> {
        let created_between = match non_empty(params.date.as_deref()) {
            Some(raw) => Some(local_day_range(parse_day(raw)?)?),
            None => None,
        };
        let query = IdeaQuery {
            category: category_filter(params.category.as_deref())?,
            author: non_empty(params.author.as_deref()).map(str::to_string),
            created_between,
            sort: SortOrder::parse(params.sort.as_deref()),
            limit: None,
        };
        self.storage
            .list_ideas(&query)
            .await
            .map_err(BoardError::storage)
    }

    /// Top ideas created today (server-local calendar), by hot score.
    pub async fn daily_ranking(&self, category: Option<&str>) -> Result<Vec<Idea>, BoardError> {
        let query = IdeaQuery {
            category: category_filter(category)?,
            author: None,
            created_between: Some(local_day_range(Local::now().date_naive())?),
            sort: SortOrder::Hot,
            limit: Some(DAILY_RANKING_LIMIT),
        };
        self.storage
            .list_ideas(&query)
            .await
            .map_err(BoardError::storage)
    }

    pub async fn get(&self, id: i64) -> Result<Idea, BoardError> {
        self.storage
            .get_idea(id)
            .await
            .map_err(BoardError::storage)?
            .ok_or(BoardError::NotFound("idea"))
    }

    pub async fn create(&self, form: &IdeaForm) -> Result<Idea, BoardError> {
        let title = required(form.title.as_deref(), "title")?;
        let content = required(form.content.as_deref(), "content")?;
        let author = non_empty(form.author.as_deref());

        {
            let mut fields = vec![Field::new("title", &title), Field::new("content", &content)];
            if let Some(author) = author {
                fields.push(Field::new("author", author));
            }
            self.filters.validate(&fields)?;
        }

        let idea = NewIdea {
            title,
            content,
            author: author.unwrap_or(ANONYMOUS).to_string(),
            category: Category::or_default(form.category.as_deref()),
            image_url: non_empty(form.image_url.as_deref()).map(str::to_string),
        };
        let created = self
            .storage
            .create_idea(&idea)
            .await
            .map_err(BoardError::storage)?;
        tracing::info!(id = created.id, category = %created.category, "created idea");
        Ok(created)
    }

    /// Merge `patch` over the stored idea. Omitted fields keep their value;
    /// an explicit null image clears it.
    pub async fn update(&self, id: i64, patch: &IdeaPatch) -> Result<Idea, BoardError> {
        let current = self.get(id).await?;
        let title = match patch.title.as_deref() {
            Some(t) => required(Some(t), "title")?,
            None => current.title,
        };
        let content = match patch.content.as_deref() {
            Some(c) => required(Some(c), "content")?,
            None => current.content,
        };
        let category = match patch.category.as_deref() {
            Some(c) => c.parse().map_err(ValidationError::InvalidCategory)?,
            None => current.category,
        };
        let author = match patch.author.as_deref() {
            Some(a) => non_empty(Some(a)).unwrap_or(ANONYMOUS).to_string(),
            None => current.author,
        };
        let image_url = match &patch.image_url {
            Some(image) => non_empty(image.as_deref()).map(str::to_string),
            None => current.image_url,
        };

        let merged = NewIdea {
            title,
            content,
            author,
            category,
            image_url,
        };
        self.storage
            .update_idea(id, &merged)
            .await
            .map_err(BoardError::storage)?
            .ok_or(BoardError::NotFound("idea"))
    }

    pub async fn delete(&self, id: i64) -> Result<(), BoardError> {
        if self.storage.delete_idea(id).await.map_err(BoardError::storage)? {
            tracing::info!(id, "deleted idea");
            Ok(())
        } else {
            Err(BoardError::NotFound("idea"))
        }
    }

    pub async fn toggle_like(&self, id: i64, origin: &str) -> Result<LikeState, BoardError> {
        self.storage
            .toggle_like(id, origin)
            .await
            .map_err(BoardError::storage)?
            .ok_or(BoardError::NotFound("idea"))
    }

    pub async fn like_status(&self, id: i64, origin: &str) -> Result<LikeState, BoardError> {
        self.storage
            .like_status(id, origin)
            .await
            .map_err(BoardError::storage)?
            .ok_or(BoardError::NotFound("idea"))
    }

    pub async fn toggle_favorite(&self, id: i64, username: &str) -> Result<FavoriteState, BoardError> {
        self.storage
            .toggle_favorite(id, username)
            .await
            .map_err(BoardError::storage)?
            .ok_or(BoardError::NotFound("idea"))
    }

    pub async fn favorite_status(&self, id: i64, username: &str) -> Result<FavoriteState, BoardError> {
        self.storage
            .favorite_status(id, username)
            .await
            .map_err(BoardError::storage)?
            .ok_or(BoardError::NotFound("idea"))
    }

    pub async fn favorites(&self, username: &str) -> Result<Vec<Idea>, BoardError> {
        self.storage
            .list_favorites(username)
            .await
            .map_err(BoardError::storage)
    }

    pub async fn comments(&self, idea_id: i64) -> Result<Vec<Comment>, BoardError> {
        self.storage
            .list_comments(idea_id)
            .await
            .map_err(BoardError::storage)
    }

    /// Add a comment. The author is the supplied one, else `fallback_author`,
    /// else anonymous.
    pub async fn add_comment(
        &self,
        idea_id: i64,
        form: &CommentForm,
        fallback_author: Option<&str>,
    ) -> Result<Comment, BoardError> {
        let content = required(form.content.as_deref(), "content")?;
        let supplied_author = non_empty(form.author.as_deref());

        {
            let mut fields = vec![Field::new("content", &content)];
            if let Some(author) = supplied_author {
                fields.push(Field::new("author", author));
            }
            self.filters.validate(&fields)?;
        }

        let author = supplied_author
            .or_else(|| non_empty(fallback_author))
            .unwrap_or(ANONYMOUS)
            .to_string();
        let comment = NewComment {
            content,
            author,
            image_url: non_empty(form.image_url.as_deref()).map(str::to_string),
        };
        self.storage
            .add_comment(idea_id, &comment)
            .await
            .map_err(BoardError::storage)?
            .ok_or(BoardError::NotFound("idea"))
    }

    pub async fn delete_comment(&self, id: i64) -> Result<(), BoardError> {
        if self.storage.delete_comment(id).await.map_err(BoardError::storage)? {
            tracing::info!(id, "deleted comment");
            Ok(())
        } else {
            Err(BoardError::NotFound("comment"))
        }
    }

    pub async fn comments_received(&self, username: &str) -> Result<Vec<ReceivedComment>, BoardError> {
        self.storage
            .comments_received(username)
            .await
            .map_err(BoardError::storage)
    }
}
