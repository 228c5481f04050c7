#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct City {
    pub id: i64,
    pub name: String,
}

impl City {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct District {
    pub id: i64,
    pub name: String,
}

impl District {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The city picker was closed without a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitySelectionError {
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistrictSelectionError {
    Dismissed,
    NoCitySelected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateShopNameResponse {
    pub suggested_domain: String,
    pub shop_name_error_message: Option<String>,
}

impl ValidateShopNameResponse {
    pub fn valid(suggested_domain: impl Into<String>) -> Self {
        Self {
            suggested_domain: suggested_domain.into(),
            shop_name_error_message: None,
        }
    }

    pub fn rejected(suggested_domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            suggested_domain: suggested_domain.into(),
            shop_name_error_message: Some(message.into()),
        }
    }
}

/// Submission payload, built from a complete and error-free state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub shop_name: String,
    pub domain_name: String,
    pub city_id: i64,
    pub district_id: i64,
}

/// Rejection reported by the shop service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ShopError {
    pub message: String,
}

impl ShopError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
