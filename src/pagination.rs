//! Page/limit pagination over any store that can produce a window of rows
//! and a total count for the same filter.
//!
//! The window and the count are two independent reads issued concurrently.
//! Nothing spans them, so under concurrent writes `total` and `data` may
//! describe slightly different snapshots.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// Raw `?page=&limit=` query parameters. Kept as strings so that garbage
/// input falls back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn from_params(params: &PageParams, cfg: &PaginationConfig) -> Self {
        let page = parse_int(params.page.as_deref()).unwrap_or(1).max(1);
        let limit = parse_int(params.limit.as_deref())
            .unwrap_or(cfg.default_limit)
            .clamp(1, cfg.max_limit.max(1));
        Self { page, limit }
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, req: PageRequest) -> Self {
        Self {
            data,
            total,
            page: req.page,
            limit: req.limit,
            total_pages: total_pages(total, req.limit),
        }
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Runs the window read and the count read concurrently and assembles
/// the page.
pub async fn paginate<T, E, W, C>(req: PageRequest, window: W, count: C) -> Result<Page<T>, E>
where
    W: Future<Output = Result<Vec<T>, E>>,
    C: Future<Output = Result<i64, E>>,
{
    let (data, total) = tokio::try_join!(window, count)?;
    Ok(Page::new(data, total, req))
}
