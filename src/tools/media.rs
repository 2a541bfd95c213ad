use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::commands::{MediaDownloadRequest, MediaFormat};
use crate::error::{AideError, AideResult};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DownloadMediaParams {
    #[schemars(description = "http(s) URL of the video or audio page")]
    pub url: String,

    #[schemars(description = "'video' or 'audio'. Defaults to the configured format.")]
    pub format: Option<String>,

    #[schemars(
        description = "Video: maximum height such as '1080'. Audio: bitrate such as '192'. Default: best."
    )]
    pub quality: Option<String>,

    #[schemars(description = "Output file name template, e.g. '%(title)s.%(ext)s'")]
    pub output_template: Option<String>,
}

impl DownloadMediaParams {
    pub fn into_request(self, default_format: &str) -> AideResult<MediaDownloadRequest> {
        let format: MediaFormat = self
            .format
            .as_deref()
            .unwrap_or(default_format)
            .parse()
            .map_err(AideError::InvalidFormat)?;
        Ok(MediaDownloadRequest {
            url: self.url,
            format,
            quality: self.quality,
            output_template: self.output_template,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RunShortcutParams {
    #[schemars(description = "Name of the shortcut to run")]
    pub name: String,

    #[schemars(description = "Input file path passed to the shortcut")]
    pub input_path: Option<String>,

    #[schemars(description = "Where the shortcut writes its output")]
    pub output_path: Option<String>,
}
