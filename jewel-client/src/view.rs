//! Admin product list view state
//!
//! Keeps the last fetched page and the rows visible after local filtering.
//! Only a change in the server-side part of the criteria (search, category,
//! active state) or the page triggers a fetch; every other change is
//! recomputed from the fetched page with [`shared::filter::derive`].

use shared::Pagination;
use shared::filter::{FilterCriteria, derive};
use shared::models::Product;

use crate::{ClientResult, HttpClient};

const DEFAULT_LIMIT: u32 = 20;

#[derive(Debug)]
pub struct ProductListView {
    client: HttpClient,
    criteria: FilterCriteria,
    page: u32,
    limit: u32,
    fetched: Vec<Product>,
    pagination: Option<Pagination>,
    visible: Vec<Product>,
    /// Criteria the current page was fetched with
    fetched_with: Option<FilterCriteria>,
}

impl ProductListView {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            criteria: FilterCriteria::default(),
            page: 1,
            limit: DEFAULT_LIMIT,
            fetched: Vec::new(),
            pagination: None,
            visible: Vec::new(),
            fetched_with: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Rows after the local filter/sort passes
    pub fn visible(&self) -> &[Product] {
        &self.visible
    }

    /// Whether moving to `criteria` needs a new fetch
    pub fn needs_refetch(&self, criteria: &FilterCriteria) -> bool {
        self.fetched_with
            .as_ref()
            .is_none_or(|prev| prev.server_filters_differ(criteria))
    }

    /// Replace the criteria, fetching only when a server-side filter changed
    ///
    /// Returns whether a fetch happened. A fetch resets to page 1. When the
    /// fetch fails, criteria, page and rows are left as they were.
    pub async fn set_criteria(&mut self, criteria: FilterCriteria) -> ClientResult<bool> {
        if !self.needs_refetch(&criteria) {
            self.criteria = criteria;
            self.recompute();
            return Ok(false);
        }
        self.fetch(criteria, 1).await?;
        Ok(true)
    }

    /// Move to another page; the view is unchanged when the fetch fails
    pub async fn set_page(&mut self, page: u32) -> ClientResult<()> {
        self.fetch(self.criteria.clone(), page.max(1)).await
    }

    /// Fetch the current page with the current criteria
    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.fetch(self.criteria.clone(), self.page).await
    }

    async fn fetch(&mut self, criteria: FilterCriteria, page: u32) -> ClientResult<()> {
        let query = criteria.to_admin_query(page, self.limit);
        let fetched = self.client.admin_products(&query).await?;
        tracing::debug!(
            page = fetched.pagination.page,
            total = fetched.pagination.total,
            "Fetched product page"
        );
        self.criteria = criteria;
        self.page = page;
        self.load(fetched.items, fetched.pagination);
        Ok(())
    }

    fn load(&mut self, items: Vec<Product>, pagination: Pagination) {
        self.fetched = items;
        self.pagination = Some(pagination);
        self.fetched_with = Some(self.criteria.clone());
        self.recompute();
    }

    fn recompute(&mut self) {
        self.visible = derive(&self.fetched, &self.criteria);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientConfig;
    use shared::filter::{SortKey, SortOrder};
    use shared::models::ProductStatus;

    fn product(id: i64, name: &str, price: f64) -> Product {
        Product {
            id,
            name: name.to_string(),
            code: format!("P-{id}"),
            description: None,
            category_id: Some(1),
            price,
            stock: 1,
            status: ProductStatus::Active,
            is_featured: false,
            is_digital: false,
            show_in_store: true,
            show_in_catalog: true,
            created_at: id,
            updated_at: id,
        }
    }

    fn loaded_view() -> ProductListView {
        let client = HttpClient::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
        let mut view = ProductListView::new(client);
        view.load(
            vec![
                product(1, "Ruby ring", 120.0),
                product(2, "Pearl necklace", 40.0),
                product(3, "Gold chain", 15.0),
            ],
            Pagination::new(1, 20, 3),
        );
        view
    }

    #[test]
    fn test_fresh_view_needs_fetch() {
        let client = HttpClient::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
        let view = ProductListView::new(client);
        assert!(view.needs_refetch(&FilterCriteria::new()));
    }

    #[test]
    fn test_local_only_changes_do_not_refetch() {
        let view = loaded_view();
        let criteria = FilterCriteria::new()
            .with_price_range(Some(20.0), None)
            .with_sort(SortKey::Price, SortOrder::Asc);
        assert!(!view.needs_refetch(&criteria));
        assert!(!view.needs_refetch(&FilterCriteria::new().with_search("   ")));
    }

    #[test]
    fn test_server_changes_refetch() {
        let view = loaded_view();
        assert!(view.needs_refetch(&FilterCriteria::new().with_search("ring")));
        assert!(view.needs_refetch(&FilterCriteria::new().with_category(2)));
        assert!(view.needs_refetch(&FilterCriteria::new().with_active(true)));
    }

    #[tokio::test]
    async fn test_local_change_recomputes_visible() {
        let mut view = loaded_view();
        let criteria = FilterCriteria::new()
            .with_price_range(Some(20.0), None)
            .with_sort(SortKey::Price, SortOrder::Asc);

        // The base URL is unreachable; a fetch here would fail.
        let refetched = view.set_criteria(criteria).await.unwrap();

        assert!(!refetched);
        let names: Vec<_> = view.visible().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Pearl necklace", "Ruby ring"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_view_state() {
        let mut view = loaded_view();
        view.set_criteria(FilterCriteria::new().with_sort(SortKey::Price, SortOrder::Asc))
            .await
            .unwrap();
        let before: Vec<_> = view.visible().iter().map(|p| p.id).collect();

        let err = view
            .set_criteria(FilterCriteria::new().with_search("pearl"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::ClientError::Network(_)), "{err:?}");

        assert_eq!(view.criteria().search, None);
        assert_eq!(view.page(), 1);
        let after: Vec<_> = view.visible().iter().map(|p| p.id).collect();
        assert_eq!(after, before);
        assert_eq!(after, [3, 2, 1]);

        assert!(view.set_page(2).await.is_err());
        assert_eq!(view.page(), 1);
        assert_eq!(view.pagination().map(|p| p.page), Some(1));
    }
}
