//! Texts the form shows for state and one-shot actions.

use super::model::{CitySelectionError, DistrictSelectionError, ShopError};

pub fn city_error_label(error: Option<CitySelectionError>) -> &'static str {
    match error {
        Some(CitySelectionError::Dismissed) => "Please select city",
        None => "",
    }
}

pub fn district_error_label(error: Option<DistrictSelectionError>) -> &'static str {
    match error {
        Some(DistrictSelectionError::Dismissed) => "no district selected",
        Some(DistrictSelectionError::NoCitySelected) => "please select a city first",
        None => "",
    }
}

pub fn submission_message(result: &Result<(), ShopError>) -> String {
    match result {
        Ok(()) => "Success".to_owned(),
        Err(error) => error.message.clone(),
    }
}
