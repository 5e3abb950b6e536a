//! Per-request permission rules.
//!
//! [`authorize`] is a pure function of the verified token claims and the
//! requested action. A missing identity where one is needed is an
//! authentication failure; an identity without the right is forbidden.

use crate::auth::token::Claims;
use crate::error::{AuthError, BoardError, ForbiddenError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    CreateIdea,
    CreateComment,
    SendMessage,
    UpdateIdea,
    DeleteIdea,
    DeleteComment,
    /// Everything under the admin surface, including block toggling.
    Administer,
    Like,
    Favorite,
    /// Reading the favorites of `owner`.
    ListFavorites { owner: &'a str },
    ReadMessages,
    WhoAmI,
}

pub fn authorize(claims: Option<&Claims>, action: Action<'_>) -> Result<(), BoardError> {
    if action == Action::Like {
        return Ok(());
    }
    let claims = claims.ok_or(AuthError::Required)?;
    match action {
        Action::CreateIdea | Action::CreateComment | Action::SendMessage => {
            if claims.blocked {
                return Err(ForbiddenError::Blocked.into());
            }
        }
        Action::UpdateIdea | Action::DeleteIdea | Action::DeleteComment | Action::Administer => {
            if !claims.is_admin() {
                return Err(ForbiddenError::AdminRequired.into());
            }
        }
        Action::ListFavorites { owner } => {
            if claims.username != owner {
                return Err(ForbiddenError::NotOwner.into());
            }
        }
        Action::Favorite | Action::ReadMessages | Action::WhoAmI | Action::Like => {}
    }
    Ok(())
}
