//! Order entry and order management endpoints
//!
//! All signed; each call takes a trailing [`Timing`].

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::info;

use crate::client::FuturesClient;
use crate::error::{FapiError, Result};
use crate::request::{Method, Params, RequestSpec, Timing};
use crate::types::{
    NewOrderRespType, OrderRef, OrderSide, OrderType, PositionSide, TimeInForce, WorkingType,
};
use crate::validate::{
    check_range, check_range_opt, require_non_empty, AMENDMENT_LIMIT, MAX_BATCH_CANCEL,
    MAX_BATCH_ORDERS, ORDERS_LIMIT,
};

fn require_positive(param: &'static str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(FapiError::validation(
            param,
            format!("{} must be greater than zero", value),
        ));
    }
    Ok(())
}

/// Flatten params into the JSON object shape used inside `batchOrders`
fn to_json_object(params: &Params) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

fn encode_batch(objects: Vec<Map<String, Value>>) -> Result<String> {
    serde_json::to_string(&objects).map_err(|e| FapiError::Encode(e.to_string()))
}

/// New order request for `POST /fapi/v1/order`
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub symbol: String,
    pub side: OrderSide,
    pub position_side: Option<PositionSide>,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Option<Decimal>,
    pub reduce_only: Option<bool>,
    pub price: Option<Decimal>,
    pub new_client_order_id: Option<String>,
    pub stop_price: Option<Decimal>,
    pub close_position: Option<bool>,
    pub activation_price: Option<Decimal>,
    pub callback_rate: Option<Decimal>,
    pub working_type: Option<WorkingType>,
    pub price_protect: Option<bool>,
    pub new_order_resp_type: Option<NewOrderRespType>,
}

impl NewOrder {
    /// Bare order with only the mandatory fields set
    pub fn new(symbol: impl Into<String>, side: OrderSide, order_type: OrderType) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            position_side: None,
            order_type,
            time_in_force: None,
            quantity: None,
            reduce_only: None,
            price: None,
            new_client_order_id: None,
            stop_price: None,
            close_position: None,
            activation_price: None,
            callback_rate: None,
            working_type: None,
            price_protect: None,
            new_order_resp_type: None,
        }
    }

    /// Market order for `quantity`
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::new(symbol, side, OrderType::Market)
        }
    }

    /// Good-till-cancel limit order
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            time_in_force: Some(TimeInForce::Gtc),
            quantity: Some(quantity),
            price: Some(price),
            ..Self::new(symbol, side, OrderType::Limit)
        }
    }

    pub fn with_position_side(mut self, position_side: PositionSide) -> Self {
        self.position_side = Some(position_side);
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = Some(reduce_only);
        self
    }

    /// Set a client order ID for tracking
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(id.into());
        self
    }

    /// Trigger price for STOP/TAKE_PROFIT variants
    pub fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    pub fn with_close_position(mut self, close_position: bool) -> Self {
        self.close_position = Some(close_position);
        self
    }

    /// Activation price and callback rate of a trailing stop
    pub fn with_trailing(mut self, activation_price: Option<Decimal>, callback_rate: Decimal) -> Self {
        self.activation_price = activation_price;
        self.callback_rate = Some(callback_rate);
        self
    }

    pub fn with_working_type(mut self, working_type: WorkingType) -> Self {
        self.working_type = Some(working_type);
        self
    }

    pub fn with_price_protect(mut self, price_protect: bool) -> Self {
        self.price_protect = Some(price_protect);
        self
    }

    pub fn with_response_type(mut self, resp_type: NewOrderRespType) -> Self {
        self.new_order_resp_type = Some(resp_type);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("symbol", &self.symbol)?;
        if let Some(quantity) = self.quantity {
            require_positive("quantity", quantity)?;
        }
        Ok(())
    }

    /// Wire parameters in exchange order
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params
            .push("symbol", &self.symbol)
            .push("side", self.side)
            .push_opt("positionSide", self.position_side)
            .push("type", self.order_type)
            .push_opt("timeInForce", self.time_in_force)
            .push_opt("quantity", self.quantity)
            .push_opt("reduceOnly", self.reduce_only)
            .push_opt("price", self.price)
            .push_str_opt("newClientOrderId", self.new_client_order_id.as_deref())
            .push_opt("stopPrice", self.stop_price)
            .push_opt("closePosition", self.close_position)
            .push_opt("activationPrice", self.activation_price)
            .push_opt("callbackRate", self.callback_rate)
            .push_opt("workingType", self.working_type)
            .push_opt("priceProtect", self.price_protect)
            .push_opt("newOrderRespType", self.new_order_resp_type);
        params
    }
}

/// Price/quantity amendment of an open LIMIT order
#[derive(Debug, Clone, PartialEq)]
pub struct ModifyOrder {
    pub order: OrderRef,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl ModifyOrder {
    pub fn new(
        order: impl Into<OrderRef>,
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            order: order.into(),
            symbol: symbol.into(),
            side,
            quantity,
            price,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("symbol", &self.symbol)?;
        self.order.validate()?;
        require_positive("quantity", self.quantity)
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        self.order.append_to(&mut params);
        params
            .push("symbol", &self.symbol)
            .push("side", self.side)
            .push("quantity", self.quantity)
            .push("price", self.price);
        params
    }
}

fn check_batch_size(len: usize) -> Result<()> {
    if len == 0 || len > MAX_BATCH_ORDERS {
        return Err(FapiError::validation(
            "batchOrders",
            format!("{} orders given, expected 1..={}", len, MAX_BATCH_ORDERS),
        ));
    }
    Ok(())
}

fn symbol_with_order(symbol: &str, order: &OrderRef) -> Result<Params> {
    require_non_empty("symbol", symbol)?;
    order.validate()?;

    let mut params = Params::new();
    params.push("symbol", symbol);
    order.append_to(&mut params);
    Ok(params)
}

impl FuturesClient {
    /// Switch between hedge mode (`true`) and one-way mode
    ///
    /// POST /fapi/v1/positionSide/dual
    pub async fn change_position_mode(&self, dual_side: bool, timing: Timing) -> Result<Value> {
        let mut params = Params::new();
        params.push("dualSidePosition", dual_side);

        self.execute(RequestSpec::signed(
            Method::Post,
            "/fapi/v1/positionSide/dual",
            params,
            timing,
        ))
        .await
    }

    /// GET /fapi/v1/positionSide/dual
    pub async fn position_mode(&self, timing: Timing) -> Result<Value> {
        self.execute(RequestSpec::signed(
            Method::Get,
            "/fapi/v1/positionSide/dual",
            Params::new(),
            timing,
        ))
        .await
    }

    /// Enable or disable multi-assets margin mode
    ///
    /// POST /fapi/v1/multiAssetsMargin
    pub async fn change_multi_assets_mode(&self, enabled: bool, timing: Timing) -> Result<Value> {
        let mut params = Params::new();
        params.push("multiAssetsMargin", enabled);

        self.execute(RequestSpec::signed(
            Method::Post,
            "/fapi/v1/multiAssetsMargin",
            params,
            timing,
        ))
        .await
    }

    /// GET /fapi/v1/multiAssetsMargin
    pub async fn multi_assets_mode(&self, timing: Timing) -> Result<Value> {
        self.execute(RequestSpec::signed(
            Method::Get,
            "/fapi/v1/multiAssetsMargin",
            Params::new(),
            timing,
        ))
        .await
    }

    /// Place a new order
    ///
    /// POST /fapi/v1/order
    pub async fn new_order(&self, order: &NewOrder, timing: Timing) -> Result<Value> {
        order.validate()?;

        info!(
            symbol = %order.symbol,
            side = %order.side,
            order_type = %order.order_type,
            quantity = ?order.quantity,
            price = ?order.price,
            "Placing order"
        );

        self.execute(RequestSpec::signed(
            Method::Post,
            "/fapi/v1/order",
            order.to_params(),
            timing,
        ))
        .await
    }

    /// Amend price/quantity of an open order
    ///
    /// PUT /fapi/v1/order
    pub async fn modify_order(&self, order: &ModifyOrder, timing: Timing) -> Result<Value> {
        order.validate()?;

        info!(symbol = %order.symbol, order = ?order.order, price = %order.price, "Modifying order");

        self.execute(RequestSpec::signed(
            Method::Put,
            "/fapi/v1/order",
            order.to_params(),
            timing,
        ))
        .await
    }

    /// Place up to five orders in one request
    ///
    /// POST /fapi/v1/batchOrders
    pub async fn batch_orders(&self, orders: &[NewOrder], timing: Timing) -> Result<Value> {
        check_batch_size(orders.len())?;
        for order in orders {
            order.validate()?;
        }

        let objects = orders.iter().map(|o| to_json_object(&o.to_params())).collect();
        let mut params = Params::new();
        params.push("batchOrders", encode_batch(objects)?);

        info!(count = orders.len(), "Placing batch orders");

        self.execute(RequestSpec::signed(
            Method::Post,
            "/fapi/v1/batchOrders",
            params,
            timing,
        ))
        .await
    }

    /// Amend up to five orders in one request
    ///
    /// PUT /fapi/v1/batchOrders
    pub async fn batch_modify_orders(&self, orders: &[ModifyOrder], timing: Timing) -> Result<Value> {
        check_batch_size(orders.len())?;
        for order in orders {
            order.validate()?;
        }

        let objects = orders.iter().map(|o| to_json_object(&o.to_params())).collect();
        let mut params = Params::new();
        params.push("batchOrders", encode_batch(objects)?);

        info!(count = orders.len(), "Modifying batch orders");

        self.execute(RequestSpec::signed(
            Method::Put,
            "/fapi/v1/batchOrders",
            params,
            timing,
        ))
        .await
    }

    /// Amendment history of one order, or of all orders on `symbol`
    ///
    /// GET /fapi/v1/orderAmendment
    pub async fn order_amendment_history(
        &self,
        symbol: &str,
        order: Option<&OrderRef>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
        timing: Timing,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &AMENDMENT_LIMIT)?;

        let mut params = Params::new();
        params.push("symbol", symbol);
        if let Some(order) = order {
            order.validate()?;
            order.append_to(&mut params);
        }
        params
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", limit);

        self.execute(RequestSpec::signed(
            Method::Get,
            "/fapi/v1/orderAmendment",
            params,
            timing,
        ))
        .await
    }

    /// GET /fapi/v1/order
    pub async fn query_order(&self, symbol: &str, order: &OrderRef, timing: Timing) -> Result<Value> {
        let params = symbol_with_order(symbol, order)?;
        self.execute(RequestSpec::signed(Method::Get, "/fapi/v1/order", params, timing))
            .await
    }

    /// Cancel an active order
    ///
    /// DELETE /fapi/v1/order
    pub async fn cancel_order(&self, symbol: &str, order: &OrderRef, timing: Timing) -> Result<Value> {
        let params = symbol_with_order(symbol, order)?;

        info!(symbol = %symbol, order = ?order, "Cancelling order");

        self.execute(RequestSpec::signed(Method::Delete, "/fapi/v1/order", params, timing))
            .await
    }

    /// DELETE /fapi/v1/allOpenOrders
    pub async fn cancel_all_open_orders(&self, symbol: &str, timing: Timing) -> Result<Value> {
        require_non_empty("symbol", symbol)?;

        let mut params = Params::new();
        params.push("symbol", symbol);

        info!(symbol = %symbol, "Cancelling all open orders");

        self.execute(RequestSpec::signed(
            Method::Delete,
            "/fapi/v1/allOpenOrders",
            params,
            timing,
        ))
        .await
    }

    /// Cancel several orders by exchange id and/or client id
    ///
    /// DELETE /fapi/v1/batchOrders
    ///
    /// At least one list must be non-empty; each holds at most ten ids.
    pub async fn cancel_batch_orders(
        &self,
        symbol: &str,
        order_ids: &[i64],
        client_order_ids: &[&str],
        timing: Timing,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        if order_ids.is_empty() && client_order_ids.is_empty() {
            return Err(FapiError::validation(
                "orderIdList",
                "either orderIdList or origClientOrderIdList must be given",
            ));
        }
        check_range("orderIdList", order_ids.len(), &(0..=MAX_BATCH_CANCEL))?;
        check_range(
            "origClientOrderIdList",
            client_order_ids.len(),
            &(0..=MAX_BATCH_CANCEL),
        )?;
        for id in client_order_ids {
            require_non_empty("origClientOrderIdList", id)?;
        }

        let mut params = Params::new();
        params.push("symbol", symbol);
        if !order_ids.is_empty() {
            let list = serde_json::to_string(order_ids).map_err(|e| FapiError::Encode(e.to_string()))?;
            params.push("orderIdList", list);
        }
        if !client_order_ids.is_empty() {
            let list = serde_json::to_string(client_order_ids)
                .map_err(|e| FapiError::Encode(e.to_string()))?;
            params.push("origClientOrderIdList", list);
        }

        info!(
            symbol = %symbol,
            order_ids = order_ids.len(),
            client_order_ids = client_order_ids.len(),
            "Cancelling batch orders"
        );

        self.execute(RequestSpec::signed(
            Method::Delete,
            "/fapi/v1/batchOrders",
            params,
            timing,
        ))
        .await
    }

    /// Arm (or with `0`, disarm) the dead-man switch for `symbol`
    ///
    /// POST /fapi/v1/countdownCancelAll
    pub async fn countdown_cancel_all(
        &self,
        symbol: &str,
        countdown_time_ms: u64,
        timing: Timing,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push("countdownTime", countdown_time_ms);

        self.execute(RequestSpec::signed(
            Method::Post,
            "/fapi/v1/countdownCancelAll",
            params,
            timing,
        ))
        .await
    }

    /// GET /fapi/v1/openOrder
    pub async fn open_order(&self, symbol: &str, order: &OrderRef, timing: Timing) -> Result<Value> {
        let params = symbol_with_order(symbol, order)?;
        self.execute(RequestSpec::signed(Method::Get, "/fapi/v1/openOrder", params, timing))
            .await
    }

    /// Open orders on `symbol`, or on every symbol when `None`
    ///
    /// GET /fapi/v1/openOrders
    pub async fn open_orders(&self, symbol: Option<&str>, timing: Timing) -> Result<Value> {
        let mut params = Params::new();
        params.push_str_opt("symbol", symbol);

        self.execute(RequestSpec::signed(Method::Get, "/fapi/v1/openOrders", params, timing))
            .await
    }

    /// All orders, active or historical
    ///
    /// GET /fapi/v1/allOrders
    pub async fn all_orders(
        &self,
        symbol: &str,
        order_id: Option<i64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
        timing: Timing,
    ) -> Result<Value> {
        require_non_empty("symbol", symbol)?;
        check_range_opt("limit", limit, &ORDERS_LIMIT)?;

        let mut params = Params::new();
        params
            .push("symbol", symbol)
            .push_opt("orderId", order_id)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", limit);

        self.execute(RequestSpec::signed(Method::Get, "/fapi/v1/allOrders", params, timing))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_order_params() {
        let order = NewOrder::market("BTCUSDT", OrderSide::Buy, dec!(0.001));
        assert_eq!(
            order.to_params().encode().unwrap(),
            "symbol=BTCUSDT&side=BUY&type=MARKET&quantity=0.001"
        );
    }

    #[test]
    fn test_limit_order_params() {
        let order = NewOrder::limit("ETHUSDT", OrderSide::Sell, dec!(1.5), dec!(2500.25))
            .with_client_order_id("my-order-1")
            .with_reduce_only(true);

        assert_eq!(
            order.to_params().encode().unwrap(),
            "symbol=ETHUSDT&side=SELL&type=LIMIT&timeInForce=GTC&quantity=1.5\
             &reduceOnly=true&price=2500.25&newClientOrderId=my-order-1"
        );
    }

    #[test]
    fn test_trailing_stop_params() {
        let order = NewOrder::new("BTCUSDT", OrderSide::Sell, OrderType::TrailingStopMarket)
            .with_position_side(PositionSide::Long)
            .with_trailing(Some(dec!(30000)), dec!(1.0))
            .with_working_type(WorkingType::MarkPrice);

        let params = order.to_params();
        let keys: Vec<_> = params.keys().collect();
        assert_eq!(
            keys,
            vec![
                "symbol",
                "side",
                "positionSide",
                "type",
                "activationPrice",
                "callbackRate",
                "workingType"
            ]
        );
        assert_eq!(params.get("callbackRate"), Some("1.0"));
    }

    #[test]
    fn test_empty_client_order_id_is_omitted() {
        let order = NewOrder::market("BTCUSDT", OrderSide::Buy, dec!(1)).with_client_order_id("");
        assert!(!order.to_params().contains("newClientOrderId"));
    }

    #[test]
    fn test_new_order_validation() {
        assert!(NewOrder::market("BTCUSDT", OrderSide::Buy, dec!(0.1)).validate().is_ok());
        assert!(NewOrder::market("", OrderSide::Buy, dec!(0.1)).validate().is_err());
        assert!(NewOrder::market("BTCUSDT", OrderSide::Buy, dec!(0)).validate().is_err());
        assert!(NewOrder::market("BTCUSDT", OrderSide::Buy, dec!(-1)).validate().is_err());
        // closePosition orders carry no quantity
        let close_all = NewOrder::new("BTCUSDT", OrderSide::Sell, OrderType::StopMarket)
            .with_stop_price(dec!(25000))
            .with_close_position(true);
        assert!(close_all.validate().is_ok());
    }

    #[test]
    fn test_modify_order_params() {
        let by_id = ModifyOrder::new(42i64, "BTCUSDT", OrderSide::Buy, dec!(0.5), dec!(30000));
        assert_eq!(
            by_id.to_params().encode().unwrap(),
            "orderId=42&symbol=BTCUSDT&side=BUY&quantity=0.5&price=30000"
        );

        let by_client = ModifyOrder::new("abc", "BTCUSDT", OrderSide::Buy, dec!(0.5), dec!(30000));
        assert_eq!(by_client.to_params().get("origClientOrderId"), Some("abc"));

        let blank = ModifyOrder::new("", "BTCUSDT", OrderSide::Buy, dec!(0.5), dec!(30000));
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_batch_encoding() {
        let orders = vec![
            to_json_object(&NewOrder::market("BTCUSDT", OrderSide::Buy, dec!(0.01)).to_params()),
            to_json_object(&NewOrder::limit("BTCUSDT", OrderSide::Sell, dec!(0.01), dec!(40000)).to_params()),
        ];
        let encoded = encode_batch(orders).unwrap();
        let decoded: Vec<Map<String, Value>> = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0]["type"], "MARKET");
        assert_eq!(decoded[0]["quantity"], "0.01");
        assert_eq!(decoded[1]["price"], "40000");
        assert_eq!(decoded[1]["timeInForce"], "GTC");
    }

    #[test]
    fn test_batch_size_bounds() {
        assert!(check_batch_size(0).is_err());
        assert!(check_batch_size(1).is_ok());
        assert!(check_batch_size(MAX_BATCH_ORDERS).is_ok());
        assert!(check_batch_size(MAX_BATCH_ORDERS + 1).is_err());
    }

    #[test]
    fn test_symbol_with_order() {
        let params = symbol_with_order("BTCUSDT", &OrderRef::Id(7)).unwrap();
        assert_eq!(params.encode().unwrap(), "symbol=BTCUSDT&orderId=7");

        assert!(symbol_with_order("", &OrderRef::Id(7)).is_err());
        assert!(symbol_with_order("BTCUSDT", &OrderRef::client("")).is_err());
    }
}
