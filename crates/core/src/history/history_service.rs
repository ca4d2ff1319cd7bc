use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use rust_decimal::Decimal;
use tickerfolio_market_data::QuoteClient;

use super::chart_color::symbol_color;
use super::history_model::{ChartCurrency, ChartLine, ChartRow, HoldingSeries, PortfolioChart};
use crate::errors::{Error, Result};
use crate::fx::{currency_converter, ExchangeRateService};
use crate::portfolios::PortfolioService;

/// Builds chart data from the provider's daily series.
pub struct HistoryService {
    portfolios: Arc<PortfolioService>,
    quotes: QuoteClient,
    fx: Arc<ExchangeRateService>,
}

impl HistoryService {
    pub fn new(
        portfolios: Arc<PortfolioService>,
        quotes: QuoteClient,
        fx: Arc<ExchangeRateService>,
    ) -> Self {
        Self {
            portfolios,
            quotes,
            fx,
        }
    }

    /// Daily closes of one holding, oldest first, in the base currency.
    pub async fn holding_series(&self, portfolio_id: &str, holding_id: &str) -> Result<HoldingSeries> {
        let symbol = self
            .portfolios
            .portfolio(portfolio_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("portfolio {}", portfolio_id)))?
            .holding(holding_id)
            .map(|h| h.symbol.clone())
            .ok_or_else(|| Error::NotFound(format!("holding {}", holding_id)))?;

        let series = self.quotes.fetch_historical_series(&symbol).await?;
        Ok(HoldingSeries {
            color: symbol_color(&symbol),
            points: series.collect(),
            symbol,
        })
    }

    /// Merged daily closes of every holding in the portfolio.
    ///
    /// Series are fetched one symbol at a time, at most as fast as the
    /// provider's `min_delay` allows; a symbol that fails is left out of the
    /// chart rather than failing it.
    pub async fn portfolio_chart(
        &self,
        portfolio_id: &str,
        currency: ChartCurrency,
    ) -> Result<PortfolioChart> {
        let portfolio = self
            .portfolios
            .portfolio(portfolio_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("portfolio {}", portfolio_id)))?;

        let (rate, currency_code) = match currency {
            ChartCurrency::Base => (None, self.fx.base_currency().to_string()),
            ChartCurrency::Display => {
                let rate = self.fx.cached_rate().await.ok_or_else(|| self.fx.unavailable())?;
                (Some(rate.rate), rate.to_currency)
            }
        };
        let convert = |close: Decimal| match rate {
            Some(rate) => currency_converter::convert(close, rate),
            None => close,
        };

        let mut rows: BTreeMap<_, BTreeMap<String, Decimal>> = BTreeMap::new();
        let mut lines = Vec::new();
        let mut failed_symbols = Vec::new();

        let spacing = self.quotes.rate_limit().min_delay;
        for (index, holding) in portfolio.holdings.iter().enumerate() {
            if index > 0 && !spacing.is_zero() {
                tokio::time::sleep(spacing).await;
            }
            match self.quotes.fetch_historical_series(&holding.symbol).await {
                Ok(series) => {
                    debug!("{}: {} daily closes", holding.symbol, series.len());
                    for point in series {
                        rows.entry(point.date)
                            .or_default()
                            .insert(holding.symbol.clone(), convert(point.close));
                    }
                    lines.push(ChartLine {
                        symbol: holding.symbol.clone(),
                        color: symbol_color(&holding.symbol),
                    });
                }
                Err(e) => {
                    warn!("Skipping {} in chart: {}", holding.symbol, e);
                    failed_symbols.push(holding.symbol.clone());
                }
            }
        }

        Ok(PortfolioChart {
            portfolio_id: portfolio.id,
            currency: currency_code,
            lines,
            rows: rows
                .into_iter()
                .map(|(date, values)| ChartRow { date, values })
                .collect(),
            failed_symbols,
        })
    }
}
