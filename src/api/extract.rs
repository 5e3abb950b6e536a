//! Identity and client-origin extractors.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;

use super::AppState;
use crate::auth::token::Claims;
use crate::error::{AuthError, BoardError};

fn bearer(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value).trim())
}

/// Claims of the bearer token, if one was sent. A token that is sent but
/// does not verify is rejected rather than treated as anonymous.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<Claims>);

#[axum::async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = BoardError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(Identity(None));
        }
        let token = bearer(parts).filter(|t| !t.is_empty()).ok_or(AuthError::InvalidToken)?;
        let claims = state.accounts.verify(token)?;
        Ok(Identity(Some(claims)))
    }
}

/// Claims of a required bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = BoardError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Identity::from_request_parts(parts, state).await? {
            Identity(Some(claims)) => Ok(Authenticated(claims)),
            Identity(None) => Err(AuthError::Required.into()),
        }
    }
}

/// Client address used to key anonymous likes. Behind a trusted proxy the
/// first `X-Forwarded-For` hop wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for Origin {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.trust_proxy {
            let forwarded = parts
                .headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(hop) = forwarded {
                return Ok(Origin(hop.to_string()));
            }
        }
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(Origin(peer.unwrap_or_else(|| "unknown".to_string())))
    }
}
