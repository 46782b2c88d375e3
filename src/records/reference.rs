//! Reference data records (tickers, ticker types, holidays)

use super::types::Record;
use crate::output::{date_field, timestamp_ms_field};
use arrow::datatypes::{DataType, Field, Schema};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

fn text(name: &str) -> Field {
    Field::new(name, DataType::Utf8, true)
}

/// One entry of the ticker list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub primary_exchange: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub currency_name: Option<String>,
    #[serde(default)]
    pub cik: Option<String>,
    #[serde(default)]
    pub composite_figi: Option<String>,
    #[serde(default)]
    pub share_class_figi: Option<String>,
    #[serde(default)]
    pub last_updated_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delisted_utc: Option<DateTime<Utc>>,
}

impl Record for TickerInfo {
    fn schema() -> Option<Schema> {
        Some(Schema::new(vec![
            text("ticker"),
            text("name"),
            text("market"),
            text("locale"),
            text("primary_exchange"),
            text("type"),
            Field::new("active", DataType::Boolean, true),
            text("currency_name"),
            text("cik"),
            text("composite_figi"),
            text("share_class_figi"),
            timestamp_ms_field("last_updated_utc"),
            timestamp_ms_field("delisted_utc"),
        ]))
    }
}

/// One security type code (CS, ETF, ADRC, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerType {
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub asset_class: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl Record for TickerType {
    fn schema() -> Option<Schema> {
        Some(Schema::new(vec![
            text("code"),
            text("description"),
            text("asset_class"),
            text("locale"),
        ]))
    }
}

/// An upcoming exchange holiday or early close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketHoliday {
    pub date: NaiveDate,
    pub exchange: String,
    pub name: String,
    pub status: String,
    /// Session open on early-close days
    #[serde(default)]
    pub open: Option<DateTime<Utc>>,
    /// Session close on early-close days
    #[serde(default)]
    pub close: Option<DateTime<Utc>>,
}

impl Record for MarketHoliday {
    fn schema() -> Option<Schema> {
        Some(Schema::new(vec![
            date_field("date"),
            text("exchange"),
            text("name"),
            text("status"),
            timestamp_ms_field("open"),
            timestamp_ms_field("close"),
        ]))
    }
}

/// Company headquarters address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Logo and icon links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Full detail record of one ticker
///
/// `address` and `branding` flatten to `address_*` and `branding_*` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerDetails {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub primary_exchange: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub currency_name: Option<String>,
    #[serde(default)]
    pub cik: Option<String>,
    #[serde(default)]
    pub composite_figi: Option<String>,
    #[serde(default)]
    pub share_class_figi: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sic_code: Option<String>,
    #[serde(default)]
    pub sic_description: Option<String>,
    #[serde(default)]
    pub ticker_root: Option<String>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub total_employees: Option<u64>,
    #[serde(default)]
    pub list_date: Option<NaiveDate>,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub share_class_shares_outstanding: Option<f64>,
    #[serde(default)]
    pub weighted_shares_outstanding: Option<f64>,
    #[serde(default)]
    pub round_lot: Option<u64>,
}

impl Record for TickerDetails {
    fn schema() -> Option<Schema> {
        Some(Schema::new(vec![
            text("ticker"),
            text("name"),
            text("market"),
            text("locale"),
            text("primary_exchange"),
            text("type"),
            Field::new("active", DataType::Boolean, true),
            text("currency_name"),
            text("cik"),
            text("composite_figi"),
            text("share_class_figi"),
            Field::new("market_cap", DataType::Float64, true),
            text("phone_number"),
            text("address_address1"),
            text("address_city"),
            text("address_state"),
            text("address_postal_code"),
            text("description"),
            text("sic_code"),
            text("sic_description"),
            text("ticker_root"),
            text("homepage_url"),
            Field::new("total_employees", DataType::Int64, true),
            date_field("list_date"),
            text("branding_logo_url"),
            text("branding_icon_url"),
            Field::new("share_class_shares_outstanding", DataType::Float64, true),
            Field::new("weighted_shares_outstanding", DataType::Float64, true),
            Field::new("round_lot", DataType::Int64, true),
        ]))
    }
}
