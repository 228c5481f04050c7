use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use open_shop::shop::{
    just, shop_store, BackendConfig, City, CitySelectionError, District, DistrictSelectionError,
    ShopAction, ShopError, ShopReducer, ShopState, SimulatedBackend, UseCase,
    ValidateShopNameResponse,
};
use open_shop::{ActionSender, TestStore};

fn after<T: Send + 'static>(millis: u64, value: T) -> BoxStream<'static, T> {
    stream::once(async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        value
    })
    .boxed()
}

fn tokyo() -> City {
    City::new(2, "Tokyo")
}

fn shibuya() -> District {
    District::new(1, "Shibuya")
}

#[tokio::test]
async fn test_scenario_a_name_check_fills_suggested_domain() {
    let env = UseCase::mock()
        .with_check_shop_name(|_| just(ValidateShopNameResponse::valid("foo.com")));
    let store = shop_store(env);

    store.send(ShopAction::ShopNameDidChange("foo-shop".into()));
    store.idle().await;

    let state = store.state(Clone::clone);
    assert_eq!(state.shop_name.as_deref(), Some("foo-shop"));
    assert_eq!(state.selected_domain_name.as_deref(), Some("foo.com"));
    assert_eq!(state.shop_name_error_message, None);
}

#[tokio::test]
async fn test_scenario_b_district_without_city() {
    let store = shop_store(UseCase::mock());
    let mut picker = store.select_actions(ShopAction::show_district_selection);

    store.send(ShopAction::DistrictDidTapped);
    store.idle().await;

    assert_eq!(
        store.state(|s| s.district_error),
        Some(DistrictSelectionError::NoCitySelected)
    );
    store.shutdown();
    assert_eq!(picker.next().await, None);
}

#[tokio::test]
async fn test_scenario_c_full_submission_emits_one_result() {
    let env = UseCase::mock()
        .with_check_shop_name(|_| just(ValidateShopNameResponse::valid("nook.com")))
        .with_submit(|_| just(Ok(())));
    let store = shop_store(env);
    let pickers = store.select_actions(ShopAction::show_district_selection);
    let results = store.select_actions(ShopAction::submission_result);

    store.send(ShopAction::ShopNameDidChange("Nook Inc".into()));
    store.idle().await;
    store.send(ShopAction::CityDidSelected(tokyo()));
    store.send(ShopAction::DistrictDidTapped);
    store.send(ShopAction::DistrictDidSelected(shibuya()));
    assert!(store.state(ShopState::can_submit));
    store.send(ShopAction::SubmitButtonDidTap);
    store.idle().await;
    store.shutdown();

    assert_eq!(pickers.collect::<Vec<_>>().await, vec![()]);
    assert_eq!(results.collect::<Vec<_>>().await, vec![Ok(())]);
}

#[tokio::test]
async fn test_scenario_d_taken_domain_blocks_submission() {
    let env = UseCase::mock()
        .with_check_domain_name(|_| just(Err(ShopError::new("taken"))))
        .with_submit(|_| just(Ok(())));
    let store = shop_store(env);
    let results = store.select_actions(ShopAction::submission_result);

    store.send(ShopAction::ShopNameDidChange("Nook".into()));
    store.send(ShopAction::ShopDomainDidChange("taken".into()));
    store.send(ShopAction::CityDidSelected(tokyo()));
    store.send(ShopAction::DistrictDidTapped);
    store.send(ShopAction::DistrictDidSelected(shibuya()));
    store.idle().await;
    assert_eq!(
        store.state(|s| s.domain_error_message.clone()),
        Some("taken".to_owned())
    );

    store.send(ShopAction::SubmitButtonDidTap);
    assert_eq!(store.pending_effects(), 0);
    store.shutdown();
    assert!(results.collect::<Vec<_>>().await.is_empty());
}

#[tokio::test]
async fn test_only_latest_name_check_applies() {
    let env = UseCase::mock().with_check_shop_name(|name| {
        let millis = if name == "first" { 40 } else { 5 };
        after(millis, ValidateShopNameResponse::valid(format!("{name}.com")))
    });
    let store = shop_store(env);
    let validations = store.select_actions(|action| match action {
        ShopAction::DidValidateShopName(response) => Some(response.suggested_domain.clone()),
        _ => None,
    });

    store.send(ShopAction::ShopNameDidChange("first".into()));
    store.send(ShopAction::ShopNameDidChange("second".into()));
    store.idle().await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(
        store.state(|s| s.selected_domain_name.clone()),
        Some("second.com".to_owned())
    );
    store.shutdown();
    assert_eq!(
        validations.collect::<Vec<_>>().await,
        vec!["second.com".to_owned()]
    );
}

#[tokio::test]
async fn test_domain_checks_apply_in_completion_order() {
    let env = UseCase::mock().with_check_domain_name(|domain| {
        let millis = if domain == "slow.com" { 40 } else { 5 };
        after(millis, Err(ShopError::new(format!("{domain} taken"))))
    });
    let store = shop_store(env);

    store.send(ShopAction::ShopDomainDidChange("slow.com".into()));
    store.send(ShopAction::ShopDomainDidChange("fast.com".into()));
    assert_eq!(store.pending_effects(), 2);
    store.idle().await;

    let state = store.state(Clone::clone);
    assert_eq!(state.selected_domain_name.as_deref(), Some("fast.com"));
    assert_eq!(state.domain_error_message.as_deref(), Some("slow.com taken"));
}

#[tokio::test]
async fn test_city_round_trip_and_dismiss_idempotence() {
    let store = shop_store(UseCase::mock());
    let mut city = store.select_state(|s| s.city.clone());
    let mut city_error = store.select_state(|s| s.city_error);

    store.send(ShopAction::CityDidSelected(tokyo()));
    store.send(ShopAction::CityDidDismissed);
    store.send(ShopAction::CityDidDismissed);
    assert_eq!(city.next().await, Some(Some(tokyo())));
    assert_eq!(store.state(|s| s.city_error), None);

    store.shutdown();
    assert_eq!(city.next().await, None);
    assert_eq!(city_error.next().await, None);
}

#[tokio::test]
async fn test_dismiss_before_select_then_select_clears_error() {
    let store = shop_store(UseCase::mock());
    let city_error = store.select_state(|s| s.city_error);

    store.send(ShopAction::CityDidDismissed);
    store.send(ShopAction::CityDidSelected(tokyo()));
    store.send(ShopAction::CityDidDismissed);
    store.shutdown();

    assert_eq!(
        city_error.collect::<Vec<_>>().await,
        vec![Some(CitySelectionError::Dismissed), None]
    );
}

#[tokio::test]
async fn test_simulated_backend_session() {
    let backend = SimulatedBackend::new(
        BackendConfig::default()
            .with_delay(Duration::from_millis(5))
            .with_taken_name("Nook Inc"),
    );
    let store = shop_store(backend);
    let results = store.select_actions(ShopAction::submission_result);

    store.send(ShopAction::ShopNameDidChange("Nook Inc".into()));
    store.idle().await;
    assert_eq!(
        store.state(|s| s.shop_name_error_message.clone()),
        Some("Nook Inc is already taken".to_owned())
    );

    store.send(ShopAction::ShopNameDidChange("Nook Shop".into()));
    store.send(ShopAction::CityDidSelected(tokyo()));
    store.send(ShopAction::DistrictDidSelected(shibuya()));
    store.idle().await;
    assert_eq!(
        store.state(|s| s.selected_domain_name.clone()),
        Some("nook-shop.com".to_owned())
    );

    store.send(ShopAction::SubmitButtonDidTap);
    store.idle().await;
    store.shutdown();
    assert_eq!(results.collect::<Vec<_>>().await, vec![Ok(())]);
}

#[tokio::test]
async fn test_effects_do_not_outlive_store() {
    let env = UseCase::mock()
        .with_check_shop_name(|_| after(20, ValidateShopNameResponse::valid("late.com")));
    let store = shop_store(env);
    let domain = store.select_state(|s| s.selected_domain_name.clone());

    store.send(ShopAction::ShopNameDidChange("late".into()));
    assert_eq!(store.pending_effects(), 1);
    drop(store);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(domain.collect::<Vec<_>>().await.is_empty());
}

#[tokio::test]
async fn test_step_harness_with_slow_environment() {
    let env = UseCase::mock()
        .with_check_shop_name(|_| after(50, ValidateShopNameResponse::valid("slow.com")));
    let mut store = TestStore::new(ShopState::default(), ShopReducer, env)
        .with_timeout(Duration::from_millis(500));

    store.send(ShopAction::ShopNameDidChange("slow".into()), |s| {
        s.shop_name = Some("slow".into());
    });
    store
        .receive(
            ShopAction::DidValidateShopName(ValidateShopNameResponse::valid("slow.com")),
            |s| s.selected_domain_name = Some("slow.com".into()),
        )
        .await;
    assert!(!store.state().can_submit());
    store.finish().await;
}
