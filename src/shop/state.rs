use super::model::{City, CitySelectionError, District, DistrictSelectionError, Form};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopState {
    pub shop_name: Option<String>,
    pub shop_name_error_message: Option<String>,

    pub selected_domain_name: Option<String>,
    pub domain_error_message: Option<String>,

    pub city: Option<City>,
    pub city_error: Option<CitySelectionError>,

    pub district: Option<District>,
    pub district_error: Option<DistrictSelectionError>,
}

impl ShopState {
    pub fn has_errors(&self) -> bool {
        self.shop_name_error_message.is_some()
            || self.domain_error_message.is_some()
            || self.city_error.is_some()
            || self.district_error.is_some()
    }

    /// The submission payload, if every field is filled and nothing is in
    /// error.
    pub fn form(&self) -> Option<Form> {
        if self.has_errors() {
            return None;
        }
        Some(Form {
            shop_name: self.shop_name.clone()?,
            domain_name: self.selected_domain_name.clone()?,
            city_id: self.city.as_ref()?.id,
            district_id: self.district.as_ref()?.id,
        })
    }

    /// Same predicate the reducer uses to gate submission; the UI uses it
    /// to enable the submit button.
    pub fn can_submit(&self) -> bool {
        self.form().is_some()
    }
}
