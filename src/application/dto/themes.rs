use crate::application::render::Theme;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThemeDto {
    pub id: String,
    pub label: String,
}

impl From<&Theme> for ThemeDto {
    fn from(theme: &Theme) -> Self {
        Self {
            id: theme.name().to_string(),
            label: theme.label().to_string(),
        }
    }
}
