use crate::{
    codes::{self, Icon},
    config::DEFAULT_ICON_BASE_URL,
    model::{CurrentConditions, Location, RenderPayload},
};

/// Turns a location and its conditions into a [`RenderPayload`].
#[derive(Debug, Clone)]
pub struct Presenter {
    icon_base_url: String,
}

impl Presenter {
    pub fn new(icon_base_url: impl Into<String>) -> Self {
        Self {
            icon_base_url: icon_base_url.into(),
        }
    }

    pub fn describe(&self, code: i32) -> &'static str {
        codes::describe(code)
    }

    pub fn icon_for(&self, code: i32) -> Icon {
        codes::icon_for(code)
    }

    pub fn icon_ref(&self, code: i32) -> String {
        self.icon_for(code).url(&self.icon_base_url)
    }

    pub fn render(&self, location: Location, conditions: CurrentConditions) -> RenderPayload {
        let code = conditions.weather_code;

        RenderPayload {
            description: self.describe(code).to_string(),
            icon: self.icon_for(code),
            icon_ref: self.icon_ref(code),
            location,
            conditions,
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE_URL)
    }
}
