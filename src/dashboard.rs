//! Dashboard data aggregation.
//!
//! The dashboard screen shows rankings and top-lists derived from raw
//! backend records. This module fetches the four record sets in parallel
//! and reduces them with pure functions so the aggregation logic stays
//! testable without any network.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::models::{PaymentRecord, SaleRecord, StaffMember};

/// How many entries the top-items list keeps.
/// The dashboard card shows five rows; anything beyond that is noise.
const TOP_ITEM_LIMIT: usize = 5;

/// One row of the staff leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffRanking {
    pub staff_id: i64,
    pub name: String,
    pub order_count: u32,
    pub revenue: f64,
}

/// One row of the top-selling items list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRanking {
    pub item_name: String,
    pub quantity: u32,
    pub revenue: f64,
}

/// Revenue bucketed by calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub order_count: u32,
    pub revenue: f64,
}

/// Sales grouped by payment method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    pub method: String,
    pub order_count: u32,
    pub revenue: f64,
}

/// Everything the dashboard screen renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub total_revenue: f64,
    pub order_count: u32,
    pub staff_rankings: Vec<StaffRanking>,
    pub top_items: Vec<ItemRanking>,
    pub daily_revenue: Vec<DailyRevenue>,
    pub payment_methods: Vec<PaymentBreakdown>,
    pub latest_payment: Option<PaymentRecord>,
    pub menu_size: u32,
}

pub struct Dashboard {
    client: ApiClient,
}

impl Dashboard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the raw record sets in parallel and reduce them into the
    /// dashboard overview. Each fetch is an independent authenticated call;
    /// a failure in any of them fails the whole overview.
    pub async fn fetch_overview(&self) -> Result<DashboardOverview, ApiError> {
        let (sales, staff, payments, menu) = futures::try_join!(
            self.client.fetch_sales(),
            self.client.fetch_staff(),
            self.client.fetch_payments(),
            self.client.fetch_menu_items(),
        )?;

        debug!(
            sales = sales.len(),
            staff = staff.len(),
            payments = payments.len(),
            menu = menu.len(),
            "dashboard records fetched"
        );

        Ok(DashboardOverview {
            total_revenue: sales.iter().map(|s| s.amount).sum(),
            order_count: sales.len() as u32,
            staff_rankings: rank_staff(&sales, &staff),
            top_items: top_items(&sales, TOP_ITEM_LIMIT),
            daily_revenue: daily_revenue(&sales),
            payment_methods: payment_breakdown(&sales),
            latest_payment: payments.into_iter().max_by_key(|p| p.paid_at),
            menu_size: menu.len() as u32,
        })
    }
}

/// Descending by revenue, ties broken by name so the order is stable.
fn by_revenue_then_name(a_rev: f64, a_name: &str, b_rev: f64, b_name: &str) -> Ordering {
    b_rev
        .partial_cmp(&a_rev)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_name.cmp(b_name))
}

/// Group sales by staff member, summing revenue and order counts, and join
/// display names from the roster. Staff with no sales still appear with
/// zeroes so the leaderboard shows the whole team.
pub fn rank_staff(sales: &[SaleRecord], staff: &[StaffMember]) -> Vec<StaffRanking> {
    let mut totals: HashMap<i64, (u32, f64)> = HashMap::new();
    for sale in sales {
        let entry = totals.entry(sale.staff_id).or_default();
        entry.0 += 1;
        entry.1 += sale.amount;
    }

    let mut rankings: Vec<StaffRanking> = staff
        .iter()
        .map(|member| {
            let (order_count, revenue) = totals.remove(&member.id).unwrap_or_default();
            StaffRanking {
                staff_id: member.id,
                name: member.name.clone(),
                order_count,
                revenue,
            }
        })
        .collect();

    // Sales by staff missing from the roster (departed accounts) still count
    for (staff_id, (order_count, revenue)) in totals {
        rankings.push(StaffRanking {
            staff_id,
            name: format!("Staff #{staff_id}"),
            order_count,
            revenue,
        });
    }

    rankings.sort_by(|a, b| by_revenue_then_name(a.revenue, &a.name, b.revenue, &b.name));
    rankings
}

/// Top-selling items by revenue, limited to the dashboard card size.
pub fn top_items(sales: &[SaleRecord], limit: usize) -> Vec<ItemRanking> {
    let mut totals: BTreeMap<&str, (u32, f64)> = BTreeMap::new();
    for sale in sales {
        let entry = totals.entry(sale.item_name.as_str()).or_default();
        entry.0 += sale.quantity;
        entry.1 += sale.amount;
    }

    let mut items: Vec<ItemRanking> = totals
        .into_iter()
        .map(|(name, (quantity, revenue))| ItemRanking {
            item_name: name.to_string(),
            quantity,
            revenue,
        })
        .collect();

    items.sort_by(|a, b| by_revenue_then_name(a.revenue, &a.item_name, b.revenue, &b.item_name));
    items.truncate(limit);
    items
}

/// Bucket sales by calendar day, oldest first.
pub fn daily_revenue(sales: &[SaleRecord]) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<NaiveDate, (u32, f64)> = BTreeMap::new();
    for sale in sales {
        let entry = days.entry(sale.created_at.date_naive()).or_default();
        entry.0 += 1;
        entry.1 += sale.amount;
    }

    days.into_iter()
        .map(|(date, (order_count, revenue))| DailyRevenue {
            date,
            order_count,
            revenue,
        })
        .collect()
}

/// Group sales by payment method. Records without one land under "unknown".
pub fn payment_breakdown(sales: &[SaleRecord]) -> Vec<PaymentBreakdown> {
    let mut methods: BTreeMap<&str, (u32, f64)> = BTreeMap::new();
    for sale in sales {
        let method = sale.payment_method.as_deref().unwrap_or("unknown");
        let entry = methods.entry(method).or_default();
        entry.0 += 1;
        entry.1 += sale.amount;
    }

    let mut breakdown: Vec<PaymentBreakdown> = methods
        .into_iter()
        .map(|(method, (order_count, revenue))| PaymentBreakdown {
            method: method.to_string(),
            order_count,
            revenue,
        })
        .collect();

    breakdown.sort_by(|a, b| by_revenue_then_name(a.revenue, &a.method, b.revenue, &b.method));
    breakdown
}
