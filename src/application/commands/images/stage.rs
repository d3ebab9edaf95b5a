use super::ImageCommandService;
use crate::{
    application::{
        dto::StagedImageDto,
        error::{ApplicationError, ApplicationResult},
    },
    domain::media::ImageFormat,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use tracing::info;

/// Staging accepts more than the platform does; the publish preflight is
/// what enforces the platform limit.
pub const MAX_STAGED_BYTES: usize = 10 * 1024 * 1024;

pub struct StageImageCommand {
    /// Base64 payload, optionally as a `data:` URL.
    pub data: String,
    pub mime_type: Option<String>,
}

impl ImageCommandService {
    pub async fn stage_image(&self, command: StageImageCommand) -> ApplicationResult<StagedImageDto> {
        let (declared, encoded) = split_data_url(&command.data);
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|err| ApplicationError::validation(format!("image data is not base64: {err}")))?;

        if bytes.is_empty() {
            return Err(ApplicationError::validation("image data is empty"));
        }
        if bytes.len() > MAX_STAGED_BYTES {
            return Err(ApplicationError::validation(format!(
                "image exceeds {MAX_STAGED_BYTES} bytes"
            )));
        }

        let format = ImageFormat::sniff(&bytes)
            .or_else(|| command.mime_type.as_deref().and_then(ImageFormat::from_mime))
            .or_else(|| declared.and_then(ImageFormat::from_mime))
            .ok_or_else(|| ApplicationError::validation("unrecognised image format"))?;

        let image = self.store.stage(format, Bytes::from(bytes)).await?;
        let meta = self.store.describe(&image).await?;
        info!(%image, size = meta.size, format = %format, "image staged");
        Ok(StagedImageDto::new(meta, self.locator.url_for(&image)))
    }
}

/// Splits `data:image/png;base64,AAAA` into its MIME type and payload.
fn split_data_url(data: &str) -> (Option<&str>, &str) {
    data.strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .map_or((None, data), |(header, payload)| {
            (header.split(';').next(), payload)
        })
}
