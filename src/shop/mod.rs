//! The shop-registration form: state, actions and the reducer tying them to
//! a [`ShopEnvironment`].

mod action;
mod backend;
mod environment;
mod model;
mod presentation;
mod reducer;
mod state;

pub use action::ShopAction;
pub use backend::{suggest_domain, BackendConfig, SimulatedBackend};
pub use environment::{just, ShopEnvironment, UseCase};
pub use model::{
    City, CitySelectionError, District, DistrictSelectionError, Form, ShopError,
    ValidateShopNameResponse,
};
pub use presentation::{city_error_label, district_error_label, submission_message};
pub use reducer::{ShopReducer, SHOP_NAME_CHECK};
pub use state::ShopState;

use crate::{Store, StoreConfig};

pub type ShopStore<E> = Store<ShopState, ShopAction, E>;

/// A store over an empty form. Must be called within a tokio runtime.
pub fn shop_store<E: ShopEnvironment>(environment: E) -> ShopStore<E> {
    Store::with_config(
        ShopState::default(),
        ShopReducer,
        environment,
        StoreConfig::default().with_label("shop"),
    )
}
