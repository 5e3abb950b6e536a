use crate::models::SortOrder;
use chrono::{DateTime, Utc};

/// Convert a stored millisecond timestamp back into a UTC time.
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// ORDER BY clause for a sort order. Clauses only ever come from this closed
/// set; request text never reaches the query string.
pub fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Hot => " ORDER BY (i.likes_count * 2 + i.comments_count) DESC, i.created_at DESC, i.id DESC",
        SortOrder::Latest => " ORDER BY i.created_at DESC, i.id DESC",
        SortOrder::Likes => " ORDER BY i.likes_count DESC, i.created_at DESC, i.id DESC",
    }
}

/// SQL schemas and queries for the idea store.
pub mod sql {
    pub const IDEAS_TABLE: &str = "CREATE TABLE IF NOT EXISTS ideas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            author TEXT NOT NULL DEFAULT 'anonymous',
            category TEXT NOT NULL DEFAULT 'daydream',
            image_url TEXT,
            likes_count INTEGER NOT NULL DEFAULT 0,
            comments_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )";

    pub const COMMENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            idea_id INTEGER NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            author TEXT NOT NULL DEFAULT 'anonymous',
            image_url TEXT,
            created_at INTEGER NOT NULL
        )";

    pub const LIKES_TABLE: &str = "CREATE TABLE IF NOT EXISTS likes (
            idea_id INTEGER NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
            origin TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            PRIMARY KEY(idea_id, origin)
        )";

    pub const FAVORITES_TABLE: &str = "CREATE TABLE IF NOT EXISTS favorites (
            username TEXT NOT NULL,
            idea_id INTEGER NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            PRIMARY KEY(username, idea_id)
        )";

    pub const MESSAGES_TABLE: &str = "CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            from_username TEXT NOT NULL,
            to_username TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )";

    pub const INDEXES: [&str; 5] = [
        "CREATE INDEX IF NOT EXISTS idx_ideas_created ON ideas(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_comments_idea ON comments(idea_id)",
        "CREATE INDEX IF NOT EXISTS idx_favorites_idea ON favorites(idea_id)",
        "CREATE INDEX IF NOT EXISTS idx_messages_to ON messages(to_username, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_messages_from ON messages(from_username, created_at)",
    ];

    /// Idea columns with live aggregates computed from the child tables,
    /// wrapped so the aggregates are addressable as `i.likes_count`.
    pub const IDEA_SELECT_LIVE: &str = "SELECT i.* FROM (SELECT x.id, x.title, x.content, \
            x.author, x.category, x.image_url, x.created_at, x.updated_at, \
            (SELECT COUNT(*) FROM likes l WHERE l.idea_id = x.id) AS likes_count, \
            (SELECT COUNT(*) FROM comments c WHERE c.idea_id = x.id) AS comments_count \
        FROM ideas x) i";

    /// Idea columns with the stored counters.
    pub const IDEA_SELECT_STORED: &str = "SELECT i.id, i.title, i.content, i.author, i.category, \
            i.image_url, i.created_at, i.updated_at, i.likes_count, i.comments_count \
        FROM ideas i";

    pub const COMMENT_COLUMNS: &str = "c.id, c.idea_id, c.content, c.author, c.image_url, c.created_at";
}
