//! Best-effort conversion of the downloaded MPEG-TS file into an MP4 container.
//!
//! The first converter found is run with a plain stream copy; if that fails
//! it is run once more with the AAC ADTS to ASC bitstream filter. Failing
//! both is not an error for the caller, which keeps the raw file instead.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::RemuxConfig;

/// One way of invoking the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemuxAttempt {
    StreamCopy,
    /// Stream copy with `-bsf:a aac_adtstoasc`
    AdtsToAsc,
}

impl RemuxAttempt {
    pub const ORDER: [Self; 2] = [Self::StreamCopy, Self::AdtsToAsc];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemuxOutcome {
    /// `dst` holds the converted file and the source was removed.
    Remuxed { converter: PathBuf },
    /// None of the configured converters is installed.
    ConverterMissing,
    /// Every attempt failed; the source is untouched.
    Failed,
}

impl RemuxOutcome {
    pub fn is_remuxed(&self) -> bool {
        matches!(self, Self::Remuxed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RemuxController {
    config: RemuxConfig,
}

impl RemuxController {
    pub fn new(config: RemuxConfig) -> Self {
        Self { config }
    }

    pub fn find_converter(&self) -> Option<PathBuf> {
        process_utils::find_executable(&self.config.converters)
    }

    /// Convert `src` into `dst`.
    ///
    /// On success `src` is deleted. Otherwise no partial `dst` is left behind
    /// and `src` is left for the caller to relocate.
    pub async fn remux(&self, src: &Path, dst: &Path) -> RemuxOutcome {
        let Some(converter) = self.find_converter() else {
            warn!(
                candidates = ?self.config.converters,
                "No converter found, keeping raw file"
            );
            return RemuxOutcome::ConverterMissing;
        };

        info!("Remuxing to '{}'...", dst.display());
        for attempt in RemuxAttempt::ORDER {
            match self.run(&converter, src, dst, attempt).await {
                Ok(true) => {
                    if let Err(e) = tokio::fs::remove_file(src).await {
                        warn!("Failed to remove '{}' after remux: {e}", src.display());
                    }
                    return RemuxOutcome::Remuxed { converter };
                }
                Ok(false) => debug!(?attempt, "Converter exited with failure"),
                Err(e) => warn!(?attempt, "Failed to run '{}': {e}", converter.display()),
            }
            remove_partial(dst).await;
        }

        warn!("Remuxing failed");
        RemuxOutcome::Failed
    }

    async fn run(
        &self,
        converter: &Path,
        src: &Path,
        dst: &Path,
        attempt: RemuxAttempt,
    ) -> io::Result<bool> {
        let args = build_args(src, dst, attempt, self.config.verbose);
        debug!("Converter args: {:?}", args);
        let status = process_utils::quiet_command(converter, self.config.verbose)
            .args(&args)
            .status()
            .await?;
        Ok(status.success())
    }
}

/// `[-loglevel quiet] -i <src> -c copy [-bsf:a aac_adtstoasc] <dst>`
pub fn build_args(src: &Path, dst: &Path, attempt: RemuxAttempt, verbose: bool) -> Vec<OsString> {
    let mut args = Vec::with_capacity(9);
    if !verbose {
        args.push(OsString::from("-loglevel"));
        args.push(OsString::from("quiet"));
    }
    args.push(OsString::from("-i"));
    args.push(src.as_os_str().to_owned());
    args.push(OsString::from("-c"));
    args.push(OsString::from("copy"));
    if attempt == RemuxAttempt::AdtsToAsc {
        args.push(OsString::from("-bsf:a"));
        args.push(OsString::from("aac_adtstoasc"));
    }
    args.push(dst.as_os_str().to_owned());
    args
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial output '{}'", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output '{}': {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let args = build_args(
            Path::new("in.ts"),
            Path::new("out.mp4"),
            RemuxAttempt::StreamCopy,
            false,
        );
        assert_eq!(
            args,
            ["-loglevel", "quiet", "-i", "in.ts", "-c", "copy", "out.mp4"]
                .map(OsString::from)
                .to_vec()
        );

        let args = build_args(
            Path::new("in.ts"),
            Path::new("out.mp4"),
            RemuxAttempt::AdtsToAsc,
            true,
        );
        assert_eq!(
            args,
            ["-i", "in.ts", "-c", "copy", "-bsf:a", "aac_adtstoasc", "out.mp4"]
                .map(OsString::from)
                .to_vec()
        );
    }

    #[tokio::test]
    async fn test_missing_converter_leaves_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("video.ts");
        let dst = dir.path().join("video.mp4");
        std::fs::write(&src, b"ts data").unwrap();

        let controller = RemuxController::new(RemuxConfig {
            converters: vec!["definitely-not-a-converter-91c2".to_string()],
            verbose: false,
        });
        assert_eq!(
            controller.remux(&src, &dst).await,
            RemuxOutcome::ConverterMissing
        );
        assert!(src.exists());
        assert!(!dst.exists());
    }

    #[cfg(unix)]
    mod fake_converter {
        use super::*;
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        /// Writes a partial output then fails, unless the bitstream filter is
        /// requested and `retry_succeeds` is set.
        fn write_converter(dir: &Path, retry_succeeds: bool) -> PathBuf {
            let path = dir.join("fake-ffmpeg");
            let on_retry = if retry_succeeds {
                "echo remuxed > \"$last\"; exit 0"
            } else {
                "echo partial > \"$last\"; exit 1"
            };
            let script = format!(
                "#!/bin/sh\n\
                 for a in \"$@\"; do last=\"$a\"; done\n\
                 case \"$*\" in *aac_adtstoasc*) {on_retry};; esac\n\
                 echo partial > \"$last\"\n\
                 exit 1\n"
            );
            let mut file = std::fs::File::create(&path).unwrap();
            file.write_all(script.as_bytes()).unwrap();
            file.sync_all().unwrap();
            drop(file);
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn controller(converter: &Path) -> RemuxController {
            RemuxController::new(RemuxConfig {
                converters: vec![
                    "definitely-not-a-converter-91c2".to_string(),
                    converter.to_string_lossy().into_owned(),
                ],
                verbose: false,
            })
        }

        #[tokio::test]
        async fn test_retry_with_bitstream_filter_succeeds() {
            let dir = tempfile::tempdir().unwrap();
            let src = dir.path().join("video.ts");
            let dst = dir.path().join("video.mp4");
            std::fs::write(&src, b"ts data").unwrap();
            let converter = write_converter(dir.path(), true);

            let outcome = controller(&converter).remux(&src, &dst).await;

            assert!(outcome.is_remuxed());
            assert_eq!(std::fs::read_to_string(&dst).unwrap(), "remuxed\n");
            assert!(!src.exists());
        }

        #[tokio::test]
        async fn test_both_attempts_fail() {
            let dir = tempfile::tempdir().unwrap();
            let src = dir.path().join("video.ts");
            let dst = dir.path().join("video.mp4");
            std::fs::write(&src, b"ts data").unwrap();
            let converter = write_converter(dir.path(), false);

            let outcome = controller(&converter).remux(&src, &dst).await;

            assert_eq!(outcome, RemuxOutcome::Failed);
            assert!(!dst.exists());
            assert_eq!(std::fs::read(&src).unwrap(), b"ts data");
        }
    }
}
