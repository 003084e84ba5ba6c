use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_quantity() -> u32 {
    1
}

/// One completed sale line as recorded by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: i64,
    #[serde(rename = "staffId")]
    pub staff_id: i64,
    #[serde(rename = "itemId", default)]
    pub item_id: Option<i64>,
    #[serde(rename = "itemName")]
    pub item_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub amount: f64,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Staff roster entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// One subscription payment from the billing history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub amount: f64,
    #[serde(rename = "planName", default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "paidAt")]
    pub paid_at: DateTime<Utc>,
}

/// Menu catalogue entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_record_defaults_quantity_to_one() {
        let sale: SaleRecord = serde_json::from_str(
            r#"{
                "id": 1,
                "staffId": 9,
                "itemName": "Espresso",
                "amount": 3.5,
                "createdAt": "2026-08-01T09:30:00Z"
            }"#,
        )
        .expect("sale should parse");
        assert_eq!(sale.quantity, 1);
        assert!(sale.payment_method.is_none());
    }
}
