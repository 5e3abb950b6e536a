use super::Storage;
use super::common::{from_millis, now_millis, order_clause, sql};
use super::migrations::sqlite::SqliteStorageMigrator;
use crate::models::{
    Comment, FavoriteState, Idea, IdeaQuery, LikeState, Message, NewComment, NewIdea,
    ReceivedComment,
};
use async_trait::async_trait;
use sqlx::{
    QueryBuilder, Row, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use std::{error::Error, str::FromStr};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn idea_from_row(row: &SqliteRow) -> Result<Idea, sqlx::Error> {
    let category: String = row.try_get("category")?;
    Ok(Idea {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        category: category.parse().unwrap_or_default(),
        image_url: row.try_get("image_url")?,
        likes_count: row.try_get("likes_count")?,
        comments_count: row.try_get("comments_count")?,
        created_at: from_millis(row.try_get("created_at")?),
        updated_at: from_millis(row.try_get("updated_at")?),
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        idea_id: row.try_get("idea_id")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        image_url: row.try_get("image_url")?,
        created_at: from_millis(row.try_get("created_at")?),
    })
}

fn message_from_row(row: &SqliteRow) -> Result<Message, sqlx::Error> {
    Ok(Message {
        id: row.try_get("id")?,
        from_username: row.try_get("from_username")?,
        to_username: row.try_get("to_username")?,
        content: row.try_get("content")?,
        created_at: from_millis(row.try_get("created_at")?),
    })
}

#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    #[tracing::instrument(skip_all)]
    /// Create a new SQLite storage backend and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or the schema
    /// cannot be created or migrated.
    pub async fn new(path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| format!("invalid SQLite database URI '{path}': {e}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        // In-memory databases are private to one connection
        let max_connections = if path.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| format!("failed to connect to SQLite database '{path}': {e}"))?;

        SqliteStorageMigrator::new(pool.clone()).prepare().await?;

        Ok(Self { pool })
    }

    async fn fetch_idea(
        &self,
        select: &str,
        id: i64,
    ) -> Result<Option<Idea>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(&format!("{select} WHERE i.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(idea_from_row).transpose()?)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    #[tracing::instrument(skip_all)]
    async fn list_ideas(&self, query: &IdeaQuery) -> Result<Vec<Idea>, Box<dyn Error + Send + Sync>> {
        let mut qb = QueryBuilder::<Sqlite>::new(sql::IDEA_SELECT_LIVE);
        qb.push(" WHERE 1 = 1");
        if let Some(category) = query.category {
            qb.push(" AND i.category = ").push_bind(category.as_str());
        }
        if let Some(author) = &query.author {
            qb.push(" AND i.author = ").push_bind(author.clone());
        }
        if let Some((start, end)) = query.created_between {
            qb.push(" AND i.created_at >= ")
                .push_bind(start.timestamp_millis())
                .push(" AND i.created_at < ")
                .push_bind(end.timestamp_millis());
        }
        qb.push(order_clause(query.sort));
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(idea_from_row).collect::<Result<_, _>>()?)
    }

    #[tracing::instrument(skip_all)]
    async fn get_idea(&self, id: i64) -> Result<Option<Idea>, Box<dyn Error + Send + Sync>> {
        self.fetch_idea(sql::IDEA_SELECT_LIVE, id).await
    }

    #[tracing::instrument(skip_all)]
    async fn create_idea(&self, idea: &NewIdea) -> Result<Idea, Box<dyn Error + Send + Sync>> {
        let now = now_millis();
        let id = sqlx::query(
            "INSERT INTO ideas (title, content, author, category, image_url, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&idea.title)
        .bind(&idea.content)
        .bind(&idea.author)
        .bind(idea.category.as_str())
        .bind(&idea.image_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Idea {
            id,
            title: idea.title.clone(),
            content: idea.content.clone(),
            author: idea.author.clone(),
            category: idea.category,
            image_url: idea.image_url.clone(),
            likes_count: 0,
            comments_count: 0,
            created_at: from_millis(now),
            updated_at: from_millis(now),
        })
    }

    #[tracing::instrument(skip_all)]
    async fn update_idea(
        &self,
        id: i64,
        idea: &NewIdea,
    ) -> Result<Option<Idea>, Box<dyn Error + Send + Sync>> {
        let updated = sqlx::query(
            "UPDATE ideas SET title = ?, content = ?, author = ?, category = ?, image_url = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&idea.title)
        .bind(&idea.content)
        .bind(&idea.author)
        .bind(idea.category.as_str())
        .bind(&idea.image_url)
        .bind(now_millis())
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }
        self.fetch_idea(sql::IDEA_SELECT_STORED, id).await
    }

    #[tracing::instrument(skip_all)]
    async fn delete_idea(&self, id: i64) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM comments WHERE idea_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM likes WHERE idea_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM favorites WHERE idea_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM ideas WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    #[tracing::instrument(skip_all)]
    async fn toggle_like(
        &self,
        idea_id: i64,
        origin: &str,
    ) -> Result<Option<LikeState>, Box<dyn Error + Send + Sync>> {
        // Every transaction starts with a write so SQLite takes the write lock up front.
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM likes WHERE idea_id = ? AND origin = ?")
            .bind(idea_id)
            .bind(origin)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let liked = if removed > 0 {
            sqlx::query("UPDATE ideas SET likes_count = MAX(likes_count - 1, 0) WHERE id = ?")
                .bind(idea_id)
                .execute(&mut *tx)
                .await?;
            false
        } else {
            let exists = sqlx::query("SELECT 1 FROM ideas WHERE id = ?")
                .bind(idea_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            if !exists {
                return Ok(None);
            }
            let inserted = sqlx::query("INSERT INTO likes (idea_id, origin, created_at) VALUES (?, ?, ?)")
                .bind(idea_id)
                .bind(origin)
                .bind(now_millis())
                .execute(&mut *tx)
                .await;
            match inserted {
                Ok(_) => {
                    sqlx::query("UPDATE ideas SET likes_count = likes_count + 1 WHERE id = ?")
                        .bind(idea_id)
                        .execute(&mut *tx)
                        .await?;
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::debug!(idea_id, "concurrent like already recorded");
                }
                Err(e) => return Err(e.into()),
            }
            true
        };

        let likes: i64 = sqlx::query_scalar("SELECT likes_count FROM ideas WHERE id = ?")
            .bind(idea_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(LikeState { liked, likes }))
    }

    #[tracing::instrument(skip_all)]
    async fn like_status(
        &self,
        idea_id: i64,
        origin: &str,
    ) -> Result<Option<LikeState>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT (SELECT COUNT(*) FROM likes WHERE idea_id = i.id) AS likes, \
                    EXISTS(SELECT 1 FROM likes WHERE idea_id = i.id AND origin = ?) AS liked \
             FROM ideas i WHERE i.id = ?",
        )
        .bind(origin)
        .bind(idea_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(LikeState {
                liked: row.try_get::<i64, _>("liked")? != 0,
                likes: row.try_get("likes")?,
            })),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip_all)]
    async fn toggle_favorite(
        &self,
        idea_id: i64,
        username: &str,
    ) -> Result<Option<FavoriteState>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM favorites WHERE idea_id = ? AND username = ?")
            .bind(idea_id)
            .bind(username)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed > 0 {
            tx.commit().await?;
            return Ok(Some(FavoriteState { favorited: false }));
        }

        let exists = sqlx::query("SELECT 1 FROM ideas WHERE id = ?")
            .bind(idea_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            return Ok(None);
        }

        let inserted = sqlx::query("INSERT INTO favorites (username, idea_id, created_at) VALUES (?, ?, ?)")
            .bind(username)
            .bind(idea_id)
            .bind(now_millis())
            .execute(&mut *tx)
            .await;
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(idea_id, "concurrent favorite already recorded");
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;
        Ok(Some(FavoriteState { favorited: true }))
    }

    #[tracing::instrument(skip_all)]
    async fn favorite_status(
        &self,
        idea_id: i64,
        username: &str,
    ) -> Result<Option<FavoriteState>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE idea_id = i.id AND username = ?) AS favorited \
             FROM ideas i WHERE i.id = ?",
        )
        .bind(username)
        .bind(idea_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(FavoriteState {
                favorited: row.try_get::<i64, _>("favorited")? != 0,
            })),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip_all)]
    async fn list_favorites(&self, username: &str) -> Result<Vec<Idea>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(&format!(
            "{} JOIN favorites f ON f.idea_id = i.id WHERE f.username = ? \
             ORDER BY f.created_at DESC, f.rowid DESC",
            sql::IDEA_SELECT_STORED
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(idea_from_row).collect::<Result<_, _>>()?)
    }

    #[tracing::instrument(skip_all)]
    async fn list_comments(&self, idea_id: i64) -> Result<Vec<Comment>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM comments c WHERE c.idea_id = ? ORDER BY c.created_at DESC, c.id DESC",
            sql::COMMENT_COLUMNS
        ))
        .bind(idea_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(comment_from_row).collect::<Result<_, _>>()?)
    }

    #[tracing::instrument(skip_all)]
    async fn add_comment(
        &self,
        idea_id: i64,
        comment: &NewComment,
    ) -> Result<Option<Comment>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;
        let bumped = sqlx::query("UPDATE ideas SET comments_count = comments_count + 1 WHERE id = ?")
            .bind(idea_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if bumped == 0 {
            return Ok(None);
        }

        let now = now_millis();
        let id = sqlx::query(
            "INSERT INTO comments (idea_id, content, author, image_url, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(idea_id)
        .bind(&comment.content)
        .bind(&comment.author)
        .bind(&comment.image_url)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        tx.commit().await?;

        Ok(Some(Comment {
            id,
            idea_id,
            content: comment.content.clone(),
            author: comment.author.clone(),
            image_url: comment.image_url.clone(),
            created_at: from_millis(now),
        }))
    }

    #[tracing::instrument(skip_all)]
    async fn delete_comment(&self, id: i64) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;
        let idea_id: Option<i64> = sqlx::query_scalar("DELETE FROM comments WHERE id = ? RETURNING idea_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(idea_id) = idea_id else {
            return Ok(false);
        };
        sqlx::query("UPDATE ideas SET comments_count = MAX(comments_count - 1, 0) WHERE id = ?")
            .bind(idea_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    #[tracing::instrument(skip_all)]
    async fn comments_received(
        &self,
        author: &str,
    ) -> Result<Vec<ReceivedComment>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, i.title AS idea_title FROM comments c JOIN ideas i ON i.id = c.idea_id \
             WHERE i.author = ? ORDER BY c.created_at DESC, c.id DESC",
            sql::COMMENT_COLUMNS
        ))
        .bind(author)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(ReceivedComment {
                comment: comment_from_row(row)?,
                idea_title: row.try_get("idea_title")?,
            });
        }
        Ok(out)
    }

    #[tracing::instrument(skip_all)]
    async fn send_message(
        &self,
        from: &str,
        to: &str,
        content: &str,
    ) -> Result<Message, Box<dyn Error + Send + Sync>> {
        let now = now_millis();
        let id = sqlx::query(
            "INSERT INTO messages (from_username, to_username, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(from)
        .bind(to)
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Message {
            id,
            from_username: from.to_string(),
            to_username: to.to_string(),
            content: content.to_string(),
            created_at: from_millis(now),
        })
    }

    #[tracing::instrument(skip_all)]
    async fn inbox(&self, username: &str) -> Result<Vec<Message>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT id, from_username, to_username, content, created_at FROM messages \
             WHERE to_username = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(message_from_row).collect::<Result<_, _>>()?)
    }

    #[tracing::instrument(skip_all)]
    async fn outbox(&self, username: &str) -> Result<Vec<Message>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT id, from_username, to_username, content, created_at FROM messages \
             WHERE from_username = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(message_from_row).collect::<Result<_, _>>()?)
    }
}
