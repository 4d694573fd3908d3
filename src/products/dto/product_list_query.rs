use serde::Deserialize;

pub const DEFAULT_PAGE: u64 = 0;
pub const DEFAULT_LIMIT: u64 = 10;

/// Raw `page` / `limit` query parameters. Kept as strings so that bad input
/// falls back to the defaults instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
  pub page: Option<String>,
  pub limit: Option<String>,
}

impl ProductListQuery {
  pub fn page(&self) -> u64 {
    positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE)
  }

  pub fn limit(&self) -> u64 {
    positive(self.limit.as_deref()).unwrap_or(DEFAULT_LIMIT)
  }
}

fn positive(value: Option<&str>) -> Option<u64> {
  value?.trim().parse::<u64>().ok().filter(|value| *value > 0)
}
