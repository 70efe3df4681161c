use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing summary as returned by the listing-service resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub price: i64,
    /// "sale" or "rent"
    pub listing_type: String,
    /// Billing period for rentals, e.g. "month"
    pub period: Option<String>,
    pub url: String,
}

impl ListingSummary {
    /// Deterministic human-readable block appended to a message body when it
    /// references a listing. Baked into the ciphertext at send time.
    pub fn summary_block(&self) -> String {
        let price = match self.period.as_deref() {
            Some(period) if self.listing_type == "rent" => {
                format!("${}/{}", self.price, period)
            }
            _ => format!("${}", self.price),
        };
        format!(
            "\n\n--- Listing ---\n{}\n{}\n{} ({})\n{}",
            self.name, self.address, price, self.listing_type, self.url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn villa() -> ListingSummary {
        ListingSummary {
            id: Uuid::new_v4(),
            name: "Lake View Villa".into(),
            address: "12 Shore Rd".into(),
            price: 250000,
            listing_type: "sale".into(),
            period: None,
            url: "https://example.com/listings/lake-view-villa".into(),
        }
    }

    #[test]
    fn sale_block_contains_name_and_price() {
        let block = villa().summary_block();
        assert!(block.contains("Lake View Villa"));
        assert!(block.contains("$250000"));
        assert!(block.contains("(sale)"));
    }

    #[test]
    fn rent_block_includes_period() {
        let mut listing = villa();
        listing.listing_type = "rent".into();
        listing.period = Some("month".into());
        listing.price = 1200;
        assert!(listing.summary_block().contains("$1200/month"));
    }

    #[test]
    fn block_is_deterministic() {
        let listing = villa();
        assert_eq!(listing.summary_block(), listing.summary_block());
    }
}
