//! Report service - snapshots fed through the analytics functions

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::analytics::{self, Bucket, CategoryTotal, Summary};
use crate::domain::{budget_id, BudgetSetting, Category, Record, RecordKind, Session, Table};
use crate::ports::{RecordStore, RecordStoreExt};

/// Sales projection shown on the sales page
#[derive(Debug, Clone, Serialize)]
pub struct SalesForecast {
    pub count: usize,
    pub total: Decimal,
    pub mean: Decimal,
    /// `mean × 30`, a demo heuristic
    pub forecast: Decimal,
}

pub struct ReportService {
    store: Arc<dyn RecordStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    async fn records(&self, session: &Session, kind: RecordKind) -> Result<Vec<Record>> {
        self.store
            .get_entities::<Record>(kind.table(), session.user_id())
            .await
            .with_context(|| format!("Failed to read {}", kind.table()))
    }

    /// Totals, mean expense, balance and the monthly budget
    ///
    /// With a window only records dated inside it are counted. The budget is
    /// reported either way.
    pub async fn summary(
        &self,
        session: &Session,
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Summary> {
        let expenses = self.records(session, RecordKind::Expense).await?;
        let income = self.records(session, RecordKind::Income).await?;

        let key = budget_id(session.user_id());
        let budget = self
            .store
            .get_entities::<BudgetSetting>(Table::Budgets, session.user_id())
            .await
            .context("Failed to read budget")?
            .into_iter()
            .find(|b| b.id == key)
            .map(|b| b.amount);

        let summary = match window {
            Some((start, end)) => analytics::summarize_between(&expenses, &income, budget, start, end),
            None => analytics::summarize(&expenses, &income, budget),
        };
        Ok(summary?)
    }

    /// Totals per category, labelled by the user's categories
    pub async fn category_breakdown(
        &self,
        session: &Session,
        kind: RecordKind,
    ) -> Result<Vec<CategoryTotal>> {
        let records = self.records(session, kind).await?;
        let categories = self
            .store
            .get_entities::<Category>(Table::Categories, session.user_id())
            .await
            .context("Failed to read categories")?;
        Ok(analytics::sum_by_category(&records, &categories)?)
    }

    /// Exactly `days` daily buckets ending at `end`
    pub async fn daily(
        &self,
        session: &Session,
        kind: RecordKind,
        end: NaiveDate,
        days: u32,
    ) -> Result<Vec<Bucket>> {
        let records = self.records(session, kind).await?;
        Ok(analytics::last_n_days(&records, end, days)?)
    }

    /// Monthly buckets for a window, or across all records when none is given
    pub async fn monthly(
        &self,
        session: &Session,
        kind: RecordKind,
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Bucket>> {
        let records = self.records(session, kind).await?;
        let buckets = match window {
            Some((start, end)) => analytics::monthly_series(&records, start, end),
            None => analytics::monthly_series_span(&records),
        };
        Ok(buckets?)
    }

    pub async fn sales_forecast(&self, session: &Session) -> Result<SalesForecast> {
        let sales = self.records(session, RecordKind::Sale).await?;
        Ok(SalesForecast {
            count: sales.len(),
            total: analytics::sum(&sales)?,
            mean: analytics::mean(&sales)?,
            forecast: analytics::naive_forecast(&sales)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DuckDbStore;
    use crate::domain::IdentitySource;

    async fn seeded() -> (ReportService, Session) {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        let session = Session::new("u", IdentitySource::Local);

        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        for amount in [100, 200, 600] {
            let sale = Record::new(RecordKind::Sale, "u", Decimal::from(amount), date);
            store.put_entity(Table::Sales, &sale).await.unwrap();
        }
        let other = Record::new(RecordKind::Sale, "someone_else", Decimal::from(9999), date);
        store.put_entity(Table::Sales, &other).await.unwrap();

        (ReportService::new(Arc::new(store)), session)
    }

    #[tokio::test]
    async fn test_sales_forecast() {
        let (reports, session) = seeded().await;
        let forecast = reports.sales_forecast(&session).await.unwrap();

        assert_eq!(forecast.count, 3);
        assert_eq!(forecast.total, Decimal::from(900));
        assert_eq!(forecast.mean, Decimal::from(300));
        assert_eq!(forecast.forecast, Decimal::from(9000));
    }

    #[tokio::test]
    async fn test_daily_window() {
        let (reports, session) = seeded().await;
        let end = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let series = reports.daily(&session, RecordKind::Sale, end, 30).await.unwrap();
        assert_eq!(series.len(), 30);
        let hit: Vec<_> = series.iter().filter(|b| !b.total.is_zero()).collect();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].key, "2024-03-10");
        assert_eq!(hit[0].total, Decimal::from(900));
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let (reports, session) = seeded().await;
        let summary = reports.summary(&session, None).await.unwrap();
        assert_eq!(summary.total_expenses, Decimal::ZERO);
        assert_eq!(summary.mean_expense, Decimal::ZERO);
        assert_eq!(summary.monthly_budget, None);

        let monthly = reports.monthly(&session, RecordKind::Expense, None).await.unwrap();
        assert!(monthly.is_empty());
    }

    #[tokio::test]
    async fn test_summary_window() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        let session = Session::new("u", IdentitySource::Local);
        for (amount, day) in [(450, 1), (150, 20)] {
            let on = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            let expense = Record::new(RecordKind::Expense, "u", Decimal::from(amount), on);
            store.put_entity(Table::Expenses, &expense).await.unwrap();
        }
        let reports = ReportService::new(Arc::new(store));

        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let windowed = reports.summary(&session, Some((start, end))).await.unwrap();
        assert_eq!(windowed.total_expenses, Decimal::from(150));
        assert_eq!(windowed.balance, Decimal::from(-150));

        let all = reports.summary(&session, None).await.unwrap();
        assert_eq!(all.total_expenses, Decimal::from(600));
    }

    #[tokio::test]
    async fn test_oversized_sales_report_an_error() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        let session = Session::new("u", IdentitySource::Local);
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        // Rows like these can only arrive from a remote table
        for _ in 0..2 {
            let sale = Record::new(RecordKind::Sale, "u", Decimal::MAX, date);
            store.put_entity(Table::Sales, &sale).await.unwrap();
        }
        let reports = ReportService::new(Arc::new(store));

        let err = reports.sales_forecast(&session).await.unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(reports.category_breakdown(&session, RecordKind::Sale).await.is_err());
    }
}
