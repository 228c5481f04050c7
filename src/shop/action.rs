use super::model::{City, District, ShopError, ValidateShopNameResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum ShopAction {
    // Sent by the presentation layer.
    ShopNameDidChange(String),
    ShopDomainDidChange(String),
    CityDidSelected(City),
    CityDidDismissed,
    DistrictDidTapped,
    DistrictDidSelected(District),
    DistrictDidDismissed,
    SubmitButtonDidTap,

    // Produced by effects only.
    DidValidateShopName(ValidateShopNameResponse),
    DomainNameError(String),
    ShowDistrictSelection,
    SubmissionResult(Result<(), ShopError>),
}

impl ShopAction {
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            Self::DidValidateShopName(_)
                | Self::DomainNameError(_)
                | Self::ShowDistrictSelection
                | Self::SubmissionResult(_)
        )
    }

    /// Extractor for [`crate::Store::select_actions`].
    pub fn show_district_selection(&self) -> Option<()> {
        match self {
            Self::ShowDistrictSelection => Some(()),
            _ => None,
        }
    }

    /// Extractor for [`crate::Store::select_actions`].
    pub fn submission_result(&self) -> Option<Result<(), ShopError>> {
        match self {
            Self::SubmissionResult(result) => Some(result.clone()),
            _ => None,
        }
    }
}
