//! Account, position and wallet endpoints

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::client::FuturesClient;
use crate::error::{FapiError, Result};
use crate::request::{Method, Params, RequestSpec, Timing};
use crate::types::{AutoCloseType, IncomeType, MarginAdjustment, MarginType, PositionSide, SnapshotType};
use crate::validate::{
    check_range, check_range_opt, require_non_empty, AMENDMENT_LIMIT, LEVERAGE_RANGE,
    MARGIN_HISTORY_LIMIT, ORDERS_LIMIT, SNAPSHOT_LIMIT, TRADES_LIMIT,
};

fn optional_symbol(symbol: Option<&str>) -> Params {
    let mut params = Params::new();
    params.push_str_opt("symbol", symbol);
    params
}

impl FuturesClient {
    /// Futures wallet balances
    ///
    /// GET /fapi/v2/balance
    pub async fn balance(&self, timing: Timing) -> Result<Value> {
        self.execute(RequestSpec::signed(Method::Get, "/fapi/v2/balance", Params::new(), timing))
            .await
    }

    /// Account information including assets and positions
    ///
    /// GET /fapi/v2/account
    pub async fn account(&self, timing: Timing) -> Result<Value> {
        self.execute(RequestSpec::signed(Method::Get, "/fapi/v2/account", Params::new(), timing))
            .await
    }

    /// Change initial leverage of `symbol`
    ///
    /// POST /fapi/v1/leverage
    ///
    /// # Arguments
    /// * `symbol` - Trading pair (e.g., "BTCUSDT")
    /// * `leverage` - Target leverage, 1..=125
    pub async fn change_leverage(&self, symbol: &str, leverage: u32, timing: Timing) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range("leverage", leverage, &LEVERAGE_RANGE)?;

        let mut params = Params::new();
        params.push("symbol", symbol).push("leverage", leverage);

        info!(symbol = %symbol, leverage = leverage, "Changing leverage");

        self.execute(RequestSpec::signed(Method::Post, "/fapi/v1/leverage", params, timing))
            .await
    }

    /// Switch `symbol` between isolated and cross margin
    ///
    /// POST /fapi/v1/marginType
    pub async fn change_margin_type(
        &self,
        symbol: &str,
        margin_type: MarginType,
        timing: Timing,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;

        let mut params = Params::new();
        params.push("symbol", symbol).push("marginType", margin_type);

        info!(symbol = %symbol, margin_type = %margin_type, "Changing margin type");

        self.execute(RequestSpec::signed(Method::Post, "/fapi/v1/marginType", params, timing))
            .await
    }

    /// Add or remove isolated margin on a position
    ///
    /// POST /fapi/v1/positionMargin
    pub async fn adjust_position_margin(
        &self,
        symbol: &str,
        position_side: Option<PositionSide>,
        amount: Decimal,
        adjustment: MarginAdjustment,
        timing: Timing,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        if amount <= Decimal::ZERO {
            return Err(FapiError::validation(
                "amount",
                format!("{} must be greater than zero", amount),
            ));
        }

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push_opt("positionSide", position_side)
            .push("amount", amount)
            .push("type", adjustment);

        info!(symbol = %symbol, amount = %amount, adjustment = ?adjustment, "Adjusting position margin");

        self.execute(RequestSpec::signed(
            Method::Post,
            "/fapi/v1/positionMargin",
            params,
            timing,
        ))
        .await
    }

    /// GET /fapi/v1/positionMargin/history
    pub async fn position_margin_history(
        &self,
        symbol: &str,
        adjustment: Option<MarginAdjustment>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
        timing: Timing,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &MARGIN_HISTORY_LIMIT)?;

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push_opt("type", adjustment)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", limit);

        self.execute(RequestSpec::signed(
            Method::Get,
            "/fapi/v1/positionMargin/history",
            params,
            timing,
        ))
        .await
    }

    /// Current position information
    ///
    /// GET /fapi/v2/positionRisk
    pub async fn position_risk(&self, symbol: Option<&str>, timing: Timing) -> Result<Value> {
        self.execute(RequestSpec::signed(
            Method::Get,
            "/fapi/v2/positionRisk",
            optional_symbol(symbol),
            timing,
        ))
        .await
    }

    /// Account trade list
    ///
    /// GET /fapi/v1/userTrades
    #[allow(clippy::too_many_arguments)]
    pub async fn user_trades(
        &self,
        symbol: &str,
        order_id: Option<i64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        from_id: Option<i64>,
        limit: Option<u32>,
        timing: Timing,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &TRADES_LIMIT)?;

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push_opt("orderId", order_id)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("fromId", from_id)
            .push_opt("limit", limit);

        self.execute(RequestSpec::signed(Method::Get, "/fapi/v1/userTrades", params, timing))
            .await
    }

    /// Income history (funding, commission, realized PnL, ...)
    ///
    /// GET /fapi/v1/income
    pub async fn income(
        &self,
        symbol: Option<&str>,
        income_type: Option<IncomeType>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
        timing: Timing,
    ) -> Result<Value> {
        check_range_opt("limit", limit, &ORDERS_LIMIT)?;

        let mut params = optional_symbol(symbol);
        params
            .push_opt("incomeType", income_type)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", limit);

        self.execute(RequestSpec::signed(Method::Get, "/fapi/v1/income", params, timing))
            .await
    }

    /// Notional and leverage brackets
    ///
    /// GET /fapi/v1/leverageBracket
    pub async fn leverage_bracket(&self, symbol: Option<&str>, timing: Timing) -> Result<Value> {
        self.execute(RequestSpec::signed(
            Method::Get,
            "/fapi/v1/leverageBracket",
            optional_symbol(symbol),
            timing,
        ))
        .await
    }

    /// Auto-deleveraging queue estimation
    ///
    /// GET /fapi/v1/adlQuantile
    pub async fn adl_quantile(&self, symbol: Option<&str>, timing: Timing) -> Result<Value> {
        self.execute(RequestSpec::signed(
            Method::Get,
            "/fapi/v1/adlQuantile",
            optional_symbol(symbol),
            timing,
        ))
        .await
    }

    /// Liquidation and ADL orders of the account
    ///
    /// GET /fapi/v1/forceOrders
    pub async fn force_orders(
        &self,
        symbol: Option<&str>,
        auto_close_type: Option<AutoCloseType>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
        timing: Timing,
    ) -> Result<Value> {
        check_range_opt("limit", limit, &AMENDMENT_LIMIT)?;

        let mut params = optional_symbol(symbol);
        params
            .push_opt("autoCloseType", auto_close_type)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", limit);

        self.execute(RequestSpec::signed(Method::Get, "/fapi/v1/forceOrders", params, timing))
            .await
    }

    /// Quantitative rules indicators
    ///
    /// GET /fapi/v1/apiTradingStatus
    pub async fn api_trading_status(&self, symbol: Option<&str>, timing: Timing) -> Result<Value> {
        self.execute(RequestSpec::signed(
            Method::Get,
            "/fapi/v1/apiTradingStatus",
            optional_symbol(symbol),
            timing,
        ))
        .await
    }

    /// Maker/taker commission rate for `symbol`
    ///
    /// GET /fapi/v1/commissionRate
    pub async fn commission_rate(&self, symbol: &str, timing: Timing) -> Result<Value> {
        require_non_empty("symbol", symbol)?;

        let mut params = Params::new();
        params.push("symbol", symbol);

        self.execute(RequestSpec::signed(Method::Get, "/fapi/v1/commissionRate", params, timing))
            .await
    }

    /// Spot account information, served from the general host
    ///
    /// GET /api/v3/account
    pub async fn spot_account(&self, timing: Timing) -> Result<Value> {
        self.execute(
            RequestSpec::signed(Method::Get, "/api/v3/account", Params::new(), timing)
                .on_general_host(),
        )
        .await
    }

    /// Daily wallet snapshots, served from the general host
    ///
    /// GET /sapi/v1/accountSnapshot
    pub async fn account_snapshot(
        &self,
        snapshot_type: SnapshotType,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
        timing: Timing,
    ) -> Result<Value> {
        check_range_opt("limit", limit, &SNAPSHOT_LIMIT)?;

        let mut params = Params::new();
        params
            .push("type", snapshot_type)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", limit);

        self.execute(
            RequestSpec::signed(Method::Get, "/sapi/v1/accountSnapshot", params, timing)
                .on_general_host(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_symbol() {
        assert!(optional_symbol(None).is_empty());
        assert!(optional_symbol(Some("")).is_empty());
        assert_eq!(optional_symbol(Some("BTCUSDT")).get("symbol"), Some("BTCUSDT"));
    }

    #[test]
    fn test_margin_adjustment_wire_value() {
        let mut params = Params::new();
        params.push("type", MarginAdjustment::Reduce);
        assert_eq!(params.encode().unwrap(), "type=2");
    }
}
