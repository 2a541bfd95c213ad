//! Argument builders for the external media downloader and shortcut runner,
//! and a runner that executes a built command.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{AideError, AideResult};

pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    #[default]
    Video,
    Audio,
}

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl std::str::FromStr for MediaFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            _ => Err(format!("unknown media format: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MediaDownloadRequest {
    pub url: String,
    pub format: MediaFormat,
    /// Video: max height such as `1080`; audio: bitrate such as `192`.
    /// `None` or `best` picks the best available.
    pub quality: Option<String>,
    pub output_template: Option<String>,
}

/// Arguments for the downloader (yt-dlp compatible), excluding the program itself.
pub fn media_download_args(request: &MediaDownloadRequest, output_dir: &Path) -> AideResult<Vec<String>> {
    let url = request.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AideError::InvalidFormat(format!("not an http(s) url: {url}")));
    }
    let quality = request
        .quality
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty() && *q != "best");
    if let Some(q) = quality {
        if !q.chars().all(|c| c.is_ascii_digit()) {
            return Err(AideError::InvalidFormat(format!("invalid quality: {q}")));
        }
    }

    let mut args: Vec<String> = Vec::new();
    match (request.format, quality) {
        (MediaFormat::Audio, q) => {
            args.extend(["-x".into(), "--audio-format".into(), "mp3".into()]);
            args.push("--audio-quality".into());
            args.push(q.map_or_else(|| "0".to_string(), |q| format!("{q}K")));
        }
        (MediaFormat::Video, Some(height)) => {
            args.push("-f".into());
            args.push(format!(
                "bestvideo[height<={height}]+bestaudio/best[height<={height}]"
            ));
        }
        (MediaFormat::Video, None) => {
            args.push("-f".into());
            args.push("bestvideo+bestaudio/best".into());
        }
    }

    let template = request
        .output_template
        .as_deref()
        .map(str::trim)
        .unwrap_or(DEFAULT_OUTPUT_TEMPLATE);
    if template.is_empty()
        || !Path::new(template)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(AideError::InvalidFormat(format!(
            "output template must be a relative path inside the download directory: {template}"
        )));
    }
    args.push("-o".into());
    args.push(output_dir.join(template).to_string_lossy().into_owned());
    args.push("--no-playlist".into());
    args.push(url.to_string());
    Ok(args)
}

/// Arguments for the shortcut runner: `run <name> [-i <input>] [-o <output>]`.
pub fn shortcut_args(name: &str, input: Option<&Path>, output: Option<&Path>) -> AideResult<Vec<String>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AideError::InvalidFormat("shortcut name is empty".into()));
    }
    let mut args = vec!["run".to_string(), name.to_string()];
    if let Some(input) = input {
        args.push("-i".into());
        args.push(input.to_string_lossy().into_owned());
    }
    if let Some(output) = output {
        args.push("-o".into());
        args.push(output.to_string_lossy().into_owned());
    }
    Ok(args)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args`. A non-zero exit is an [`AideError::ExternalService`]
/// carrying the tail of stderr.
pub async fn run_command(program: &str, args: &[String]) -> AideResult<CommandOutput> {
    tracing::debug!(program, ?args, "running command");
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| AideError::ExternalService(format!("failed to start {program}: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !output.status.success() {
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(5)..].join("\n");
        return Err(AideError::ExternalService(format!(
            "{program} exited with {}: {tail}",
            output.status
        )));
    }
    Ok(CommandOutput { stdout, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request(format: MediaFormat, quality: Option<&str>) -> MediaDownloadRequest {
        MediaDownloadRequest {
            url: "https://video.example/watch?v=1".into(),
            format,
            quality: quality.map(String::from),
            output_template: None,
        }
    }

    #[test]
    fn video_args_cap_height() {
        let args = media_download_args(&request(MediaFormat::Video, Some("720")), Path::new("/dl")).unwrap();
        assert_eq!(args[0], "-f");
        assert_eq!(args[1], "bestvideo[height<=720]+bestaudio/best[height<=720]");
        assert_eq!(args[2..4], ["-o".to_string(), "/dl/%(title)s.%(ext)s".to_string()]);
        assert_eq!(args.last().unwrap(), "https://video.example/watch?v=1");
    }

    #[test]
    fn audio_args_extract_mp3() {
        let args = media_download_args(&request(MediaFormat::Audio, None), Path::new("/dl")).unwrap();
        assert_eq!(args[..5], ["-x", "--audio-format", "mp3", "--audio-quality", "0"]);
        let args = media_download_args(&request(MediaFormat::Audio, Some("192")), Path::new("/dl")).unwrap();
        assert_eq!(args[4], "192K");
    }

    #[test]
    fn rejects_bad_input() {
        let mut bad = request(MediaFormat::Video, None);
        bad.url = "file:///etc/passwd".into();
        assert!(media_download_args(&bad, Path::new("/dl")).is_err());
        assert!(media_download_args(&request(MediaFormat::Video, Some("hd;rm")), Path::new("/dl")).is_err());
    }

    #[test]
    fn output_template_stays_in_download_dir() {
        let with_template = |template: &str| MediaDownloadRequest {
            output_template: Some(template.into()),
            ..request(MediaFormat::Video, None)
        };
        let args = media_download_args(&with_template("%(uploader)s/%(title)s.%(ext)s"), Path::new("/dl")).unwrap();
        assert_eq!(args[3], "/dl/%(uploader)s/%(title)s.%(ext)s");

        for escape in ["/etc/cron.d/%(title)s", "../../.ssh/%(title)s", "a/../../b", "./x", ""] {
            assert!(
                matches!(
                    media_download_args(&with_template(escape), Path::new("/dl")),
                    Err(AideError::InvalidFormat(_))
                ),
                "{escape}"
            );
        }
    }

    #[test]
    fn shortcut_args_include_paths() {
        let input = PathBuf::from("/tmp/in.txt");
        let args = shortcut_args("Resize", Some(&input), None).unwrap();
        assert_eq!(args, vec!["run", "Resize", "-i", "/tmp/in.txt"]);
        assert!(shortcut_args("  ", None, None).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_external_service_error() {
        let ok = run_command("sh", &["-c".into(), "echo hi".into()]).await.unwrap();
        assert_eq!(ok.stdout.trim(), "hi");
        let err = run_command("sh", &["-c".into(), "echo boom >&2; exit 3".into()]).await.unwrap_err();
        match err {
            AideError::ExternalService(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
