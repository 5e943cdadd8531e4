use serde::{Deserialize, Serialize};

use super::ids::VolumeId;

const UNTITLED: &str = "Untitled";
const UNKNOWN_AUTHOR: &str = "Unknown Author";
const NO_DESCRIPTION: &str = "No description available.";
const UNKNOWN_DATE: &str = "Unknown Date";
const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";
const UNKNOWN_ISBN: &str = "Unknown ISBN";
const UNKNOWN_PAGE_COUNT: &str = "Unknown Page Count";
const UNKNOWN_CATEGORIES: &str = "Unknown Categories";
const UNKNOWN_PRICE: &str = "Unknown Price";
const NOT_FOR_SALE: &str = "Not for sale";

pub const FOR_SALE: &str = "FOR_SALE";

/// Search response envelope. A missing `items` field means zero results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchResults {
    pub items: Vec<Volume>,
}

/// One catalog volume as the remote API returns it. Transient: fetched on
/// demand and never persisted beyond the current view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Volume {
    pub id: VolumeId,
    pub volume_info: VolumeInfo,
    pub sale_info: SaleInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    pub page_count: Option<u32>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub identifier: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaleInfo {
    pub saleability: Option<String>,
    pub list_price: Option<Price>,
    pub retail_price: Option<Price>,
    pub buy_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Price {
    pub amount: Option<f64>,
    pub currency_code: Option<String>,
}

impl Price {
    fn display(&self) -> String {
        match (self.amount, self.currency_code.as_deref()) {
            (Some(amount), Some(currency)) => format!("{amount} {currency}"),
            (Some(amount), None) => amount.to_string(),
            _ => UNKNOWN_PRICE.to_string(),
        }
    }
}

/// Fully defaulted view of a volume. Every missing optional field becomes
/// a human-readable placeholder so rendering never branches on absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeDisplay {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub publisher: String,
    pub published_date: String,
    pub description: String,
    pub isbns: String,
    pub page_count: String,
    pub categories: String,
    pub saleability: String,
    pub list_price: String,
    pub retail_price: String,
    pub buy_link: Option<String>,
    pub cover_url: String,
}

impl VolumeDisplay {
    pub fn from_volume(volume: &Volume) -> Self {
        let info = &volume.volume_info;
        let sale = &volume.sale_info;

        let isbns = info
            .industry_identifiers
            .as_deref()
            .filter(|ids| !ids.is_empty())
            .map(|ids| {
                ids.iter()
                    .map(|id| id.identifier.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            });

        let for_sale = sale.saleability.as_deref() == Some(FOR_SALE);

        Self {
            id: volume.id.to_string(),
            title: or_placeholder(info.title.as_deref(), UNTITLED),
            authors: or_placeholder(joined(info.authors.as_deref()).as_deref(), UNKNOWN_AUTHOR),
            publisher: or_placeholder(info.publisher.as_deref(), UNKNOWN_PUBLISHER),
            published_date: or_placeholder(info.published_date.as_deref(), UNKNOWN_DATE),
            description: or_placeholder(info.description.as_deref(), NO_DESCRIPTION),
            isbns: or_placeholder(isbns.as_deref(), UNKNOWN_ISBN),
            page_count: info
                .page_count
                .map_or_else(|| UNKNOWN_PAGE_COUNT.to_string(), |count| count.to_string()),
            categories: or_placeholder(joined(info.categories.as_deref()).as_deref(), UNKNOWN_CATEGORIES),
            saleability: if for_sale {
                FOR_SALE.to_string()
            } else {
                NOT_FOR_SALE.to_string()
            },
            list_price: if for_sale {
                sale.list_price
                    .as_ref()
                    .map_or_else(|| UNKNOWN_PRICE.to_string(), Price::display)
            } else {
                NOT_FOR_SALE.to_string()
            },
            retail_price: if for_sale {
                sale.retail_price
                    .as_ref()
                    .map_or_else(|| UNKNOWN_PRICE.to_string(), Price::display)
            } else {
                NOT_FOR_SALE.to_string()
            },
            buy_link: if for_sale { sale.buy_link.clone() } else { None },
            cover_url: cover_url(&volume.id),
        }
    }

    pub fn is_for_sale(&self) -> bool {
        self.saleability == FOR_SALE
    }
}

/// Front-cover thumbnail URL for a volume id.
pub fn cover_url(id: &VolumeId) -> String {
    format!(
        "https://books.google.com/books/content?id={id}&printsec=frontcover&img=1&zoom=1&source=gbs_api"
    )
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

fn joined(values: Option<&[String]>) -> Option<String> {
    values.map(|v| v.join(", "))
}
