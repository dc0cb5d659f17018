use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One tracked instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Canonical key used everywhere in the service.
    pub symbol: String,
    /// Ticker the upstream feed knows the instrument by.
    pub venue_ticker: String,
    /// Human-readable name.
    pub name: String,
    /// Sector tag.
    pub sector: String,
    /// Extra spellings that resolve to this listing (legacy column names etc).
    pub aliases: Vec<String>,
}

impl Listing {
    /// Construct a listing without aliases.
    pub fn new(
        symbol: impl Into<String>,
        venue_ticker: impl Into<String>,
        name: impl Into<String>,
        sector: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            venue_ticker: venue_ticker.into(),
            name: name.into(),
            sector: sector.into(),
            aliases: Vec::new(),
        }
    }

    /// Add an alias that resolves to this listing.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// Ordered set of tracked instruments with loose symbol resolution.
///
/// Lookups are case-insensitive and ignore surrounding whitespace. The
/// canonical key wins over a venue ticker, which wins over an alias, when the
/// same spelling is claimed more than once.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    listings: Vec<Listing>,
    index: HashMap<String, usize>,
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_uppercase()
}

impl Registry {
    /// Build a registry from listings, preserving their order.
    #[must_use]
    pub fn new(listings: Vec<Listing>) -> Self {
        let mut index = HashMap::new();
        // Lowest precedence first so stronger spellings overwrite.
        for (i, l) in listings.iter().enumerate() {
            for a in &l.aliases {
                index.insert(normalize(a), i);
            }
        }
        for (i, l) in listings.iter().enumerate() {
            index.insert(normalize(&l.venue_ticker), i);
        }
        for (i, l) in listings.iter().enumerate() {
            index.insert(normalize(&l.symbol), i);
        }
        Self { listings, index }
    }

    /// All listings in registry order.
    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Number of tracked instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// True when nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Resolve a canonical key, alias or venue ticker to its listing.
    #[must_use]
    pub fn lookup(&self, loose: &str) -> Option<&Listing> {
        self.index
            .get(&normalize(loose))
            .and_then(|&i| self.listings.get(i))
    }

    /// Resolve any accepted spelling to the canonical key.
    #[must_use]
    pub fn resolve(&self, loose: &str) -> Option<&str> {
        self.lookup(loose).map(|l| l.symbol.as_str())
    }

    /// Display name for a spelling, falling back to the input itself.
    #[must_use]
    pub fn display_name(&self, loose: &str) -> String {
        self.lookup(loose)
            .map_or_else(|| loose.trim().to_string(), |l| l.name.clone())
    }

    /// Venue tickers in registry order.
    #[must_use]
    pub fn venue_tickers(&self) -> Vec<String> {
        self.listings.iter().map(|l| l.venue_ticker.clone()).collect()
    }

    /// Listing for a venue ticker, matched exactly as the feed reports it.
    #[must_use]
    pub fn by_venue_ticker(&self, ticker: &str) -> Option<&Listing> {
        self.listings.iter().find(|l| l.venue_ticker == ticker)
    }

    /// The NSE large-cap universe the dashboard tracks by default.
    #[must_use]
    pub fn nse_large_caps() -> Self {
        const TABLE: &[(&str, &str, &str, &str, &str)] = &[
            ("RELIANCE", "RELIANCE.NS", "Reliance Industries", "Oil & Gas", "OILGAS_RELIANCE"),
            ("TCS", "TCS.NS", "Tata Consultancy Services", "IT", "IT_TCS"),
            ("HDFCBANK", "HDFCBANK.NS", "HDFC Bank", "Finance", "FIN_HDFCBANK"),
            ("INFY", "INFY.NS", "Infosys", "IT", "IT_INFY"),
            ("ICICIBANK", "ICICIBANK.NS", "ICICI Bank", "Finance", "FIN_ICICIBANK"),
            ("HINDUNILVR", "HINDUNILVR.NS", "Hindustan Unilever", "FMCG", "FMCG_HINDUNILVR"),
            ("SBIN", "SBIN.NS", "State Bank of India", "Finance", "FIN_SBIN"),
            ("BHARTIARTL", "BHARTIARTL.NS", "Bharti Airtel", "Telecom", "TELL_BHARTIARTL"),
            ("KOTAKBANK", "KOTAKBANK.NS", "Kotak Mahindra Bank", "Finance", "FIN_KOTAKBANK"),
            ("WIPRO", "WIPRO.NS", "Wipro", "IT", "IT_WIPRO"),
            ("HCLTECH", "HCLTECH.NS", "HCL Technologies", "IT", "IT_HCLTECH"),
            ("AXISBANK", "AXISBANK.NS", "Axis Bank", "Finance", "FIN_AXISBANK"),
            ("ASIANPAINT", "ASIANPAINT.NS", "Asian Paints", "Consumer Durables", "CDUR_ASIANPAINT"),
            ("MARUTI", "MARUTI.NS", "Maruti Suzuki", "Auto", "AUTO_MARUTI"),
            ("BAJAJ-AUTO", "BAJAJ-AUTO.NS", "Bajaj Auto", "Auto", "AUTO_BAJAJ-AUTO"),
            ("MM", "M&M.NS", "Mahindra & Mahindra", "Auto", "AUTO_M&M"),
            ("TATASTEEL", "TATASTEEL.NS", "Tata Steel", "Metal", "METAL_TATASTEEL"),
            ("HINDALCO", "HINDALCO.NS", "Hindalco Industries", "Metal", "METAL_HINDALCO"),
            ("SUNPHARMA", "SUNPHARMA.NS", "Sun Pharmaceutical", "Healthcare", "HLTH_SUNPHARMA"),
            ("DRREDDY", "DRREDDY.NS", "Dr. Reddy's Laboratories", "Healthcare", "HLTH_DRREDDY"),
            ("CIPLA", "CIPLA.NS", "Cipla", "Healthcare", "HLTH_CIPLA"),
            ("NTPC", "NTPC.NS", "NTPC", "Power", "PWR_NTPC"),
            ("POWERGRID", "POWERGRID.NS", "Power Grid Corporation", "Power", "PWR_POWERGRID"),
            ("COALINDIA", "COALINDIA.NS", "Coal India", "Oil & Gas", "OILGAS_COALINDIA"),
            ("ONGC", "ONGC.NS", "Oil & Natural Gas Corp", "Oil & Gas", "OILGAS_ONGC"),
            ("ITC", "ITC.NS", "ITC", "FMCG", "FMCG_ITC"),
            ("LT", "LT.NS", "Larsen & Toubro", "Construction", "CONST_LT"),
            ("ULTRACEMCO", "ULTRACEMCO.NS", "UltraTech Cement", "Construction", "CONST_ULTRACEMCO"),
            ("TECHM", "TECHM.NS", "Tech Mahindra", "IT", "IT_TECHM"),
            ("ADANIPORTS", "ADANIPORTS.NS", "Adani Ports & SEZ", "Services", "SERV_ADANIPORTS"),
        ];
        Self::new(
            TABLE
                .iter()
                .map(|&(sym, ticker, name, sector, legacy)| {
                    Listing::new(sym, ticker, name, sector).with_alias(legacy)
                })
                .collect(),
        )
    }
}
