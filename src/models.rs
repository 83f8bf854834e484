use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when no customer identity is stored.
pub const GUEST_NAME: &str = "Invité";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    #[serde(rename = "En attente")]
    Pending,
    #[serde(rename = "Prêt")]
    Ready,
}

impl OrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Ready => "Prêt",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderLine {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub qty: u32,
    #[serde(default)]
    pub note: String,
}

impl OrderLine {
    pub fn subtotal(&self) -> f64 {
        self.price * self.qty as f64
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default = "guest_name")]
    pub customer: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    pub items: Vec<OrderLine>,
    pub total: f64,
    pub status: OrderStatus,
}

impl Order {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.qty).sum()
    }
}

fn guest_name() -> String {
    GUEST_NAME.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub cafe_name: String,
    pub location: String,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActivityEntry {
    pub text: String,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Day key (`dd/mm/yyyy`) -> hour key (`HH`) -> visit count.
pub type VisitStats = BTreeMap<String, BTreeMap<String, u32>>;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardStats {
    pub revenue_today: f64,
    pub clients: usize,
    pub items_served: u32,
    pub visits_today: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DrinkCount {
    pub name: String,
    pub qty: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ActivityLine {
    pub timestamp: i64,
    /// `HH:MM` in local time.
    pub time: String,
    pub text: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReadyNotice {
    pub order_id: String,
    pub message: String,
}
