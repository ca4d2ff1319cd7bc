/// Maximum number of portfolios a snapshot may hold
pub const MAX_PORTFOLIOS: usize = 10;

/// Maximum number of holdings per portfolio
pub const MAX_HOLDINGS_PER_PORTFOLIO: usize = 50;

/// Storage key the snapshot is persisted under
pub const SNAPSHOT_STORAGE_KEY: &str = "portfolios";

/// Currency every provider quote is denominated in
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// The single non-base currency values can be displayed in
pub const DEFAULT_DISPLAY_CURRENCY: &str = "EUR";

/// Decimal precision for prices and displayed amounts
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
