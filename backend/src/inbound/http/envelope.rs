//! Success envelope shared by every JSON endpoint.

use actix_web::HttpResponse;
use pagination::PageLinks;
use serde::Serialize;

/// `{ success: true, data?, count?, pagination?, token?, message? }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    fn empty() -> Self {
        Self {
            success: true,
            data: None,
            count: None,
            pagination: None,
            token: None,
            message: None,
        }
    }

    /// Wrap a single record.
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::empty()
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// Wrap a list, reporting its length as `count`.
    pub fn list(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            data: Some(items),
            ..Self::empty()
        }
    }

    /// Wrap one page of a list with its neighbour descriptors.
    pub fn page(items: Vec<T>, links: PageLinks) -> Self {
        Self {
            pagination: Some(links),
            ..Self::list(items)
        }
    }
}

impl Envelope<()> {
    /// Envelope carrying only a session token.
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::empty()
        }
    }

    /// Envelope carrying only a human-readable message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// `{ success: true, data: {} }`, returned after deletions.
    pub fn deleted() -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": {} }))
    }
}
