//! Public market data endpoints
//!
//! No API key required except for `historical_trades`, which the exchange
//! scopes to a key.

use serde_json::Value;
use tracing::debug;

use crate::client::FuturesClient;
use crate::error::Result;
use crate::request::{Method, Params, RequestSpec};
use crate::types::{ContractType, KlineInterval, ServerTime, StatsPeriod};
use crate::validate::{
    check_one_of, check_range_opt, require_non_empty, DEPTH_LIMITS, FUNDING_RATE_LIMIT,
    KLINES_LIMIT, LVT_KLINES_LIMIT, STATS_LIMIT, TRADES_LIMIT,
};

/// Parameters shared by kline-style endpoints, in wire order after the
/// endpoint-specific leading fields
fn push_kline_window(
    params: &mut Params,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: Option<u32>,
) -> Result<()> {
    check_range_opt("limit", limit, &KLINES_LIMIT)?;
    params
        .push_opt("limit", limit)
        .push_opt("startTime", start_time)
        .push_opt("endTime", end_time);
    Ok(())
}

fn symbol_only(symbol: Option<&str>) -> Params {
    let mut params = Params::new();
    params.push_str_opt("symbol", symbol);
    params
}

impl FuturesClient {
    /// Test connectivity
    ///
    /// GET /fapi/v1/ping
    pub async fn ping(&self) -> Result<()> {
        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/ping", Params::new()))
            .await?;
        Ok(())
    }

    /// Current server time in milliseconds
    ///
    /// GET /fapi/v1/time
    pub async fn server_time(&self) -> Result<i64> {
        let response: ServerTime = self
            .execute_typed(RequestSpec::public(Method::Get, "/fapi/v1/time", Params::new()))
            .await?;
        Ok(response.server_time)
    }

    /// Trading rules and symbol metadata
    ///
    /// GET /fapi/v1/exchangeInfo
    pub async fn exchange_info(&self) -> Result<Value> {
        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/exchangeInfo", Params::new()))
            .await
    }

    /// Order book snapshot
    ///
    /// GET /fapi/v1/depth
    ///
    /// # Arguments
    /// * `symbol` - Trading pair (e.g., "BTCUSDT")
    /// * `limit` - One of 5, 10, 20, 50, 100, 500, 1000
    pub async fn depth(&self, symbol: &str, limit: Option<u32>) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        if let Some(limit) = limit {
            check_one_of("limit", limit, &DEPTH_LIMITS)?;
        }

        let mut params = Params::new();
        params.push("symbol", symbol).push_opt("limit", limit);

        debug!(symbol = %symbol, limit = ?limit, "Fetching depth snapshot");
        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/depth", params))
            .await
    }

    /// Recent market trades
    ///
    /// GET /fapi/v1/trades
    pub async fn recent_trades(&self, symbol: &str, limit: Option<u32>) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &TRADES_LIMIT)?;

        let mut params = Params::new();
        params.push("symbol", symbol).push_opt("limit", limit);

        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/trades", params))
            .await
    }

    /// Older market trades, starting from `from_id` when given
    ///
    /// GET /fapi/v1/historicalTrades (API key required)
    pub async fn historical_trades(
        &self,
        symbol: &str,
        limit: Option<u32>,
        from_id: Option<i64>,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &TRADES_LIMIT)?;

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push_opt("limit", limit)
            .push_opt("fromId", from_id);

        self.execute(RequestSpec::keyed(Method::Get, "/fapi/v1/historicalTrades", params))
            .await
    }

    /// Compressed/aggregate trades
    ///
    /// GET /fapi/v1/aggTrades
    pub async fn agg_trades(
        &self,
        symbol: &str,
        from_id: Option<i64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &TRADES_LIMIT)?;

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push_opt("limit", limit)
            .push_opt("fromId", from_id)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time);

        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/aggTrades", params))
            .await
    }

    /// Candlesticks for a symbol
    ///
    /// GET /fapi/v1/klines
    ///
    /// # Arguments
    /// * `symbol` - Trading pair (e.g., "BTCUSDT")
    /// * `interval` - Candle interval
    /// * `start_time` - Optional start time in milliseconds
    /// * `end_time` - Optional end time in milliseconds
    /// * `limit` - Optional number of klines (1..=1500)
    pub async fn klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;

        let mut params = Params::new();
        params.push("symbol", symbol).push("interval", interval);
        push_kline_window(&mut params, start_time, end_time, limit)?;

        debug!(symbol = %symbol, interval = %interval, limit = ?limit, "Fetching klines");
        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/klines", params))
            .await
    }

    /// Candlesticks for a continuous contract of a pair
    ///
    /// GET /fapi/v1/continuousKlines
    pub async fn continuous_klines(
        &self,
        pair: &str,
        contract_type: ContractType,
        interval: KlineInterval,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        require_non_empty("pair", pair)?;

        let mut params = Params::new();
        params
            .push("pair", pair)
            .push("contractType", contract_type)
            .push("interval", interval);
        push_kline_window(&mut params, start_time, end_time, limit)?;

        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/continuousKlines", params))
            .await
    }

    /// Index price candlesticks for a pair
    ///
    /// GET /fapi/v1/indexPriceKlines
    pub async fn index_price_klines(
        &self,
        pair: &str,
        interval: KlineInterval,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        require_non_empty("pair", pair)?;

        let mut params = Params::new();
        params.push("pair", pair).push("interval", interval);
        push_kline_window(&mut params, start_time, end_time, limit)?;

        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/indexPriceKlines", params))
            .await
    }

    /// Mark price candlesticks for a symbol
    ///
    /// GET /fapi/v1/markPriceKlines
    pub async fn mark_price_klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;

        let mut params = Params::new();
        params.push("symbol", symbol).push("interval", interval);
        push_kline_window(&mut params, start_time, end_time, limit)?;

        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/markPriceKlines", params))
            .await
    }

    /// Mark price and funding rate; all symbols when `symbol` is `None`
    ///
    /// GET /fapi/v1/premiumIndex
    pub async fn premium_index(&self, symbol: Option<&str>) -> Result<Value> {
        self.execute(RequestSpec::public(
            Method::Get,
            "/fapi/v1/premiumIndex",
            symbol_only(symbol),
        ))
        .await
    }

    /// Funding rate history
    ///
    /// GET /fapi/v1/fundingRate
    pub async fn funding_rate(
        &self,
        symbol: Option<&str>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        check_range_opt("limit", limit, &FUNDING_RATE_LIMIT)?;

        let mut params = symbol_only(symbol);
        params
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", limit);

        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/fundingRate", params))
            .await
    }

    /// 24 hour rolling window price change statistics
    ///
    /// GET /fapi/v1/ticker/24hr
    pub async fn ticker_24hr(&self, symbol: Option<&str>) -> Result<Value> {
        self.execute(RequestSpec::public(
            Method::Get,
            "/fapi/v1/ticker/24hr",
            symbol_only(symbol),
        ))
        .await
    }

    /// Latest price
    ///
    /// GET /fapi/v1/ticker/price
    pub async fn ticker_price(&self, symbol: Option<&str>) -> Result<Value> {
        self.execute(RequestSpec::public(
            Method::Get,
            "/fapi/v1/ticker/price",
            symbol_only(symbol),
        ))
        .await
    }

    /// Best bid/ask on the order book
    ///
    /// GET /fapi/v1/ticker/bookTicker
    pub async fn book_ticker(&self, symbol: Option<&str>) -> Result<Value> {
        self.execute(RequestSpec::public(
            Method::Get,
            "/fapi/v1/ticker/bookTicker",
            symbol_only(symbol),
        ))
        .await
    }

    /// Present open interest of a symbol
    ///
    /// GET /fapi/v1/openInterest
    pub async fn open_interest(&self, symbol: &str) -> Result<Value> {
        require_non_empty("symbol", symbol)?;

        let mut params = Params::new();
        params.push("symbol", symbol);

        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/openInterest", params))
            .await
    }

    /// Shared builder for the `/futures/data` statistics family
    async fn futures_data(
        &self,
        path: &'static str,
        symbol: &str,
        period: StatsPeriod,
        limit: Option<u32>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &STATS_LIMIT)?;

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push("period", period)
            .push_opt("limit", limit)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time);

        self.execute(RequestSpec::public(Method::Get, path, params))
            .await
    }

    /// Open interest history
    ///
    /// GET /futures/data/openInterestHist
    pub async fn open_interest_hist(
        &self,
        symbol: &str,
        period: StatsPeriod,
        limit: Option<u32>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Value> {
        self.futures_data(
            "/futures/data/openInterestHist",
            symbol,
            period,
            limit,
            start_time,
            end_time,
        )
        .await
    }

    /// Top trader long/short ratio (accounts)
    ///
    /// GET /futures/data/topLongShortAccountRatio
    pub async fn top_long_short_account_ratio(
        &self,
        symbol: &str,
        period: StatsPeriod,
        limit: Option<u32>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Value> {
        self.futures_data(
            "/futures/data/topLongShortAccountRatio",
            symbol,
            period,
            limit,
            start_time,
            end_time,
        )
        .await
    }

    /// Top trader long/short ratio (positions)
    ///
    /// GET /futures/data/topLongShortPositionRatio
    pub async fn top_long_short_position_ratio(
        &self,
        symbol: &str,
        period: StatsPeriod,
        limit: Option<u32>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Value> {
        self.futures_data(
            "/futures/data/topLongShortPositionRatio",
            symbol,
            period,
            limit,
            start_time,
            end_time,
        )
        .await
    }

    /// Global long/short account ratio
    ///
    /// GET /futures/data/globalLongShortAccountRatio
    pub async fn global_long_short_account_ratio(
        &self,
        symbol: &str,
        period: StatsPeriod,
        limit: Option<u32>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Value> {
        self.futures_data(
            "/futures/data/globalLongShortAccountRatio",
            symbol,
            period,
            limit,
            start_time,
            end_time,
        )
        .await
    }

    /// Taker buy/sell volume ratio
    ///
    /// GET /futures/data/takerlongshortRatio
    pub async fn taker_long_short_ratio(
        &self,
        symbol: &str,
        period: StatsPeriod,
        limit: Option<u32>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Value> {
        self.futures_data(
            "/futures/data/takerlongshortRatio",
            symbol,
            period,
            limit,
            start_time,
            end_time,
        )
        .await
    }

    /// Leveraged token NAV candlesticks
    ///
    /// GET /fapi/v1/lvtKlines
    pub async fn lvt_klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &LVT_KLINES_LIMIT)?;

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push("interval", interval)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", limit);

        self.execute(RequestSpec::public(Method::Get, "/fapi/v1/lvtKlines", params))
            .await
    }

    /// Composite index constituents
    ///
    /// GET /fapi/v1/indexInfo
    pub async fn index_info(&self, symbol: Option<&str>) -> Result<Value> {
        self.execute(RequestSpec::public(
            Method::Get,
            "/fapi/v1/indexInfo",
            symbol_only(symbol),
        ))
        .await
    }

    /// Multi-assets mode asset index
    ///
    /// GET /fapi/v1/assetIndex
    pub async fn asset_index(&self, symbol: Option<&str>) -> Result<Value> {
        self.execute(RequestSpec::public(
            Method::Get,
            "/fapi/v1/assetIndex",
            symbol_only(symbol),
        ))
        .await
    }
}
