use price_feed::{Currency, FeedSettings, PriceFeed};

#[tokio::test]
#[ignore]
async fn test_live_tgju() {
    let _ = env_logger::builder().is_test(true).try_init();
    let feed = PriceFeed::with_settings(FeedSettings::default()).unwrap();
    let usd = feed
        .get_price(Currency::Usd, Some("tgju"))
        .await
        .map_err(|e| {
            eprintln!("{:?}", e);
            e
        })
        .unwrap();
    assert!(usd.price > 0.0);
}

#[tokio::test]
#[ignore]
async fn test_live_brsapi() {
    dotenv::dotenv().expect("Processing .env");
    let _ = env_logger::builder().is_test(true).try_init();
    let token = std::env::var("BRSAPI_KEY").expect("Getting BrsApi key");
    let mut settings = FeedSettings::default();
    settings.adapters.get_mut("brsapi").unwrap().api_key = Some(token);
    let feed = PriceFeed::with_settings(settings).unwrap();
    assert!(feed
        .get_prices(&[Currency::Btc, Currency::Usd], Some("brsapi"))
        .await
        .is_ok())
}
