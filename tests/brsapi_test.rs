mod common;

use chrono::{TimeZone, Utc};
use common::{as_store, config, init_logger, store, MockTransport};
use price_feed::{
    brsapi::{find_instrument, instrument_key, BrsapiAdapter, Category},
    cache::payload_key,
    AdapterKind, Currency, CurrencyUnit, PriceAdapter, PriceFeedError,
};
use serde_json::json;
use std::sync::Arc;

const CRYPTO: &str = "/Api/Market/Cryptocurrency.php";
const GOLD_CURRENCY: &str = "/Api/Market/Gold_Currency.php";
const COMMODITY: &str = "/Api/Market/Commodity.php";

fn routes(transport: &MockTransport) {
    transport.json(
        CRYPTO,
        json!([
            {"name_en": "Bitcoin", "price_toman": "6,250,000,000", "price": "97000", "change_percent": -1.25, "market_cap": 1900000000000.0, "time_unix": 1704103200},
            {"name_en": "Ethereum", "price": "3,400", "change_percent": "2.5"},
            {"name_en": "Tether", "price_toman": null, "price": null}
        ]),
    );
    transport.json(
        GOLD_CURRENCY,
        json!({
            "gold": [
                {"symbol": "IR_GOLD_18K_OLD", "price": "1"},
                {"symbol": "IR_GOLD_18K", "price": "4,125,000", "change_value": "25,000", "change_percent": 0.61, "time_unix": "1704103200"}
            ],
            "currency": [
                {"symbol": "USD_IRT", "price": "59,500", "change_value": -100, "change_percent": -0.17},
                {"symbol": "USDT_IRT", "price": "59,000"},
                {"symbol": "EUR_IRT", "price": "64,100"}
            ]
        }),
    );
    transport.json(
        COMMODITY,
        json!({
            "metal_precious": [
                {"symbol": "xagusd", "price": "30.12", "change_value": "0.2", "change_percent": 0.67},
                {"symbol": "XPTUSD_SPOT", "price": "981.5"}
            ]
        }),
    );
}

fn brsapi(transport: &Arc<MockTransport>, cache: &Arc<price_feed::cache::MemoryCache>) -> BrsapiAdapter {
    let mut config = config(
        AdapterKind::Brsapi,
        "https://brsapi.ir/",
        &[
            Currency::Btc,
            Currency::Eth,
            Currency::Usdt,
            Currency::Usd,
            Currency::Eur,
            Currency::Gold,
            Currency::Silver,
            Currency::Platinum,
            Currency::Palladium,
        ],
    );
    config.api_key = Some("secret".to_owned());
    config.cache_ttl = 120;
    BrsapiAdapter::new("brsapi", config, transport.clone(), as_store(cache))
}

#[tokio::test]
async fn test_brsapi_crypto_prefers_toman_price() {
    init_logger();
    let transport = MockTransport::new();
    routes(&transport);
    let adapter = brsapi(&transport, &store());

    let btc = adapter.get_price(Currency::Btc).await.unwrap();
    assert_eq!(btc.price, 6250000000.0);
    assert_eq!(btc.change_percentage_24h, Some(-1.25));
    assert_eq!(btc.change_24h, None);
    assert_eq!(btc.market_cap, Some(1900000000000.0));
    assert_eq!(btc.unit, Some(CurrencyUnit::Irt));
    assert_eq!(btc.timestamp, Utc.timestamp_opt(1704103200, 0).unwrap());
    assert_eq!(btc.raw["name_en"], json!("Bitcoin"));

    let eth = adapter.get_price(Currency::Eth).await.unwrap();
    assert_eq!(eth.price, 3400.0);
    assert_eq!(eth.change_percentage_24h, Some(2.5));

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, "https://brsapi.ir/Api/Market/Cryptocurrency.php");
    assert_eq!(calls[0].query, vec![("key".to_owned(), "secret".to_owned())]);
}

#[tokio::test]
async fn test_brsapi_category_matching_rules() {
    let transport = MockTransport::new();
    routes(&transport);
    let adapter = brsapi(&transport, &store());

    // exact symbol for gold skips the *_OLD entry
    let gold = adapter.get_price(Currency::Gold).await.unwrap();
    assert_eq!(gold.price, 4125000.0);
    assert_eq!(gold.change_24h, Some(25000.0));
    assert_eq!(gold.timestamp, Utc.timestamp_opt(1704103200, 0).unwrap());

    // containment for suffixed currency symbols
    let usd = adapter.get_price(Currency::Usd).await.unwrap();
    assert_eq!(usd.price, 59500.0);
    assert_eq!(usd.change_24h, Some(-100.0));
    let eur = adapter.get_price(Currency::Eur).await.unwrap();
    assert_eq!(eur.price, 64100.0);

    // case-insensitive containment for commodities
    let silver = adapter.get_price(Currency::Silver).await.unwrap();
    assert_eq!(silver.price, 30.12);
    let platinum = adapter.get_price(Currency::Platinum).await.unwrap();
    assert_eq!(platinum.price, 981.5);
}

#[tokio::test]
async fn test_brsapi_one_fetch_per_category() {
    let transport = MockTransport::new();
    routes(&transport);
    let cache = store();
    let adapter = brsapi(&transport, &cache);

    let prices = adapter
        .get_prices(&[Currency::Btc, Currency::Eth])
        .await
        .unwrap();
    assert_eq!(prices.len(), 2);
    assert_eq!(transport.calls_to(CRYPTO), 1);

    adapter
        .get_prices(&[Currency::Usd, Currency::Eur, Currency::Gold])
        .await
        .unwrap();
    // gold and currency share an endpoint but are cached per category
    assert_eq!(transport.calls_to(GOLD_CURRENCY), 2);
    assert!(cache.contains(&payload_key("price_feed", "brsapi", Some("currency"))));
    assert!(cache.contains(&payload_key("price_feed", "brsapi", Some("gold"))));
    assert!(!cache.contains(&payload_key("price_feed", "brsapi", Some("commodity"))));
    assert_eq!(transport.calls_to(COMMODITY), 0);
}

#[tokio::test]
async fn test_brsapi_failures() {
    let transport = MockTransport::new();
    routes(&transport);
    let adapter = brsapi(&transport, &store());

    let err = adapter.get_price(Currency::Usdt).await.unwrap_err();
    assert!(matches!(
        err,
        PriceFeedError::MalformedData { currency: Currency::Usdt, field: "price", .. }
    ));

    let err = adapter.get_price(Currency::Palladium).await.unwrap_err();
    assert!(matches!(
        err,
        PriceFeedError::Upstream { currency: Some(Currency::Palladium), .. }
    ));

    let err = adapter.get_price(Currency::IrCoinBahar).await.unwrap_err();
    assert!(matches!(err, PriceFeedError::UnsupportedCurrency { .. }));
}

#[tokio::test]
async fn test_brsapi_batch_aborts_on_first_failure() {
    let transport = MockTransport::new();
    routes(&transport);
    let adapter = brsapi(&transport, &store());

    let err = adapter
        .get_prices(&[Currency::Btc, Currency::Usdt, Currency::Eth])
        .await
        .unwrap_err();
    assert!(matches!(err, PriceFeedError::MalformedData { .. }));

    let settled = adapter
        .get_prices_settled(&[Currency::Btc, Currency::Usdt, Currency::Eth])
        .await;
    assert_eq!(settled.len(), 3);
    assert!(settled[&Currency::Btc].is_ok());
    assert!(settled[&Currency::Usdt].is_err());
    assert!(settled[&Currency::Eth].is_ok());
}

#[test]
fn test_brsapi_key_map() {
    let matic = instrument_key(Currency::Matic).unwrap();
    assert_eq!(matic.category, Category::Crypto);
    assert_eq!(matic.key, "Polygon Ecosystem Token");
    assert_eq!(instrument_key(Currency::Gold).unwrap().category, Category::Gold);
    assert!(instrument_key(Currency::Irr).is_none());

    let data = json!({"currency": [{"symbol": "GBP_IRT"}]});
    let gbp = instrument_key(Currency::Gbp).unwrap();
    assert!(find_instrument(&data, &gbp).is_some());
    assert!(find_instrument(&json!({}), &gbp).is_none());
}
