//! Console run of the shop form.
//!
//! Plays the presentation layer: subscribes to the store the way the form
//! screen does, then replays a scripted session of user input against a
//! simulated backend.
//!
//! `OPEN_SHOP_DELAY_MS` overrides the backend latency, `RUST_LOG` the log
//! filter.

use std::time::Duration;

use anyhow::Context;
use futures::StreamExt;
use open_shop::shop::{
    city_error_label, district_error_label, shop_store, submission_message, BackendConfig, City,
    District, ShopAction, SimulatedBackend,
};
use open_shop::ActionSender;
use tracing_subscriber::EnvFilter;

const DELAY_ENV: &str = "OPEN_SHOP_DELAY_MS";

fn backend_config() -> anyhow::Result<BackendConfig> {
    let config = BackendConfig::default()
        .with_taken_name("Nook Inc")
        .with_taken_domain("nook.com");
    match std::env::var(DELAY_ENV) {
        Ok(raw) => {
            let millis: u64 = raw.parse().with_context(|| {
                format!("{DELAY_ENV} must be a number of milliseconds, got {raw:?}")
            })?;
            Ok(config.with_delay(Duration::from_millis(millis)))
        }
        Err(std::env::VarError::NotPresent) => Ok(config),
        Err(error) => Err(error).context(DELAY_ENV),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "open_shop=info".into()),
        )
        .init();

    let config = backend_config()?;
    let store = shop_store(SimulatedBackend::new(config));

    let mut renders = Vec::new();
    let mut render = |name: &'static str, mut values: futures::stream::BoxStream<'static, String>| {
        renders.push(tokio::spawn(async move {
            while let Some(value) = values.next().await {
                println!("  [{name}] {value}");
            }
        }));
    };
    render(
        "domain field",
        store
            .select_state(|s| s.selected_domain_name.clone().unwrap_or_default())
            .boxed(),
    );
    render(
        "shop name label",
        store
            .select_state(|s| s.shop_name_error_message.clone().unwrap_or_default())
            .boxed(),
    );
    render(
        "domain label",
        store
            .select_state(|s| s.domain_error_message.clone().unwrap_or_default())
            .boxed(),
    );
    render(
        "city button",
        store
            .select_state(|s| s.city.as_ref().map(|c| c.name.clone()))
            .filter_map(futures::future::ready)
            .boxed(),
    );
    render(
        "city label",
        store
            .select_state(|s| city_error_label(s.city_error).to_owned())
            .boxed(),
    );
    render(
        "district button",
        store
            .select_state(|s| s.district.as_ref().map(|d| d.name.clone()))
            .filter_map(futures::future::ready)
            .boxed(),
    );
    render(
        "district label",
        store
            .select_state(|s| district_error_label(s.district_error).to_owned())
            .boxed(),
    );
    render(
        "submit button",
        store
            .select_state(|s| s.can_submit())
            .map(|enabled| if enabled { "enabled" } else { "disabled" }.to_owned())
            .boxed(),
    );
    render(
        "district picker",
        store
            .select_actions(ShopAction::show_district_selection)
            .map(|()| "presented".to_owned())
            .boxed(),
    );
    render(
        "alert",
        store
            .select_actions(ShopAction::submission_result)
            .map(|result| submission_message(&result))
            .boxed(),
    );

    let session = [
        ShopAction::DistrictDidTapped,
        ShopAction::CityDidDismissed,
        ShopAction::ShopNameDidChange("Nook".into()),
        ShopAction::ShopNameDidChange("Nook Inc".into()),
        ShopAction::ShopDomainDidChange("nook.com".into()),
        ShopAction::ShopDomainDidChange("nook-shop.com".into()),
        ShopAction::CityDidSelected(City::new(2, "Tokyo")),
        ShopAction::DistrictDidTapped,
        ShopAction::DistrictDidSelected(District::new(1, "Shibuya")),
        ShopAction::SubmitButtonDidTap,
        ShopAction::ShopNameDidChange("Nook Shop".into()),
        ShopAction::SubmitButtonDidTap,
    ];

    for action in session {
        println!("> {action:?}");
        store.send(action);
        store.idle().await;
        // Let the render tasks print before the next input.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let summary = store.state(|s| format!("{s:#?}"));
    println!("final state: {summary}");

    store.shutdown();
    for task in renders {
        task.await.context("render task failed")?;
    }
    Ok(())
}
