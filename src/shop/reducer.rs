use futures::future;
use futures::StreamExt;

use super::action::ShopAction;
use super::environment::ShopEnvironment;
use super::model::{CitySelectionError, DistrictSelectionError};
use super::state::ShopState;
use crate::effect::CancelId;
use crate::{Effect, Reducer};

/// Only the latest name check may report back. Domain checks are not
/// registered under an id and land in completion order.
pub const SHOP_NAME_CHECK: CancelId = CancelId::new("shop-name-check");

#[derive(Debug, Default, Clone, Copy)]
pub struct ShopReducer;

impl<E: ShopEnvironment> Reducer<ShopState, ShopAction, E> for ShopReducer {
    fn reduce(&self, state: &mut ShopState, action: ShopAction, env: &E) -> Vec<Effect<ShopAction>> {
        match action {
            ShopAction::ShopNameDidChange(shop_name) => {
                let check = env
                    .check_shop_name(&shop_name)
                    .map(ShopAction::DidValidateShopName);
                state.shop_name = Some(shop_name);
                state.shop_name_error_message = None;

                vec![Effect::stream(check).cancellable(SHOP_NAME_CHECK)]
            }

            ShopAction::DidValidateShopName(response) => {
                state.shop_name_error_message = response.shop_name_error_message;
                state.selected_domain_name = Some(response.suggested_domain);
                vec![]
            }

            ShopAction::ShopDomainDidChange(domain_name) => {
                let check = env.check_domain_name(&domain_name).filter_map(|result| {
                    future::ready(result.err().map(|error| ShopAction::DomainNameError(error.message)))
                });
                state.selected_domain_name = Some(domain_name);
                state.domain_error_message = None;

                vec![Effect::stream(check)]
            }

            ShopAction::DomainNameError(message) => {
                state.domain_error_message = Some(message);
                vec![]
            }

            ShopAction::CityDidSelected(city) => {
                state.city = Some(city);
                state.city_error = None;
                vec![]
            }

            ShopAction::CityDidDismissed => {
                if state.city.is_none() {
                    state.city_error = Some(CitySelectionError::Dismissed);
                }
                vec![]
            }

            ShopAction::DistrictDidTapped => {
                if state.city.is_none() {
                    state.district_error = Some(DistrictSelectionError::NoCitySelected);
                    vec![]
                } else {
                    vec![Effect::send(ShopAction::ShowDistrictSelection)]
                }
            }

            ShopAction::DistrictDidSelected(district) => {
                state.district = Some(district);
                state.district_error = None;
                vec![]
            }

            ShopAction::DistrictDidDismissed => {
                if state.district.is_none() {
                    state.district_error = Some(DistrictSelectionError::Dismissed);
                }
                vec![]
            }

            ShopAction::SubmitButtonDidTap => match state.form() {
                Some(form) => {
                    let submission = env.submit(form).map(ShopAction::SubmissionResult);
                    vec![Effect::stream(submission)]
                }
                None => vec![],
            },

            ShopAction::ShowDistrictSelection | ShopAction::SubmissionResult(_) => vec![],
        }
    }
}
