use bsew::core::schema::InputFormats;

pub struct DefaultsConfig {
    pub interval: f64,
    pub formats: InputFormats,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            interval: 1.0,
            formats: InputFormats::default(),
        }
    }
}
