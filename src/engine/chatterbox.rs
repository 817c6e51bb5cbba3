//! Chatterbox synthesis via subprocess.
//!
//! The Chatterbox runtime ships as a CLI that reads text and writes a WAV.
//! This adapter shells out to it per call: write the batch text to a temp
//! file, invoke the command, read the WAV it produced. One process per
//! call keeps the GPU state isolated and makes a crashed synthesis an
//! ordinary nonzero exit instead of a poisoned in-process engine.
//!
//! Invocation contract:
//!
//! ```text
//! <command> --text-file <in.txt> --output <out.wav> \
//!     --exaggeration <f> --cfg-weight <f> --temperature <f> \
//!     [--voice-reference <ref.wav>]
//! ```

use crate::audio::{wav, AudioSegment};
use crate::defaults;
use crate::engine::synthesizer::{SynthesisOptions, Synthesizer};
use crate::error::{Result, VoxError};
use std::path::PathBuf;
use std::process::Command;

/// Synthesizer backed by the Chatterbox CLI.
#[derive(Debug, Clone)]
pub struct ProcessSynthesizer {
    command: PathBuf,
    sample_rate: u32,
}

impl ProcessSynthesizer {
    /// Wrap the CLI at `command`. Fails if the command path is empty; a
    /// missing binary surfaces later, on the first synthesis call.
    pub fn new(command: PathBuf) -> Result<Self> {
        if command.as_os_str().is_empty() {
            return Err(VoxError::Config {
                message: "synthesis command must not be empty".to_string(),
            });
        }
        Ok(Self {
            command,
            sample_rate: defaults::SYNTHESIS_SAMPLE_RATE,
        })
    }

    /// The configured CLI path.
    pub fn command(&self) -> &PathBuf {
        &self.command
    }

    fn build_command(
        &self,
        text_path: &std::path::Path,
        output_path: &std::path::Path,
        options: &SynthesisOptions,
    ) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg("--text-file")
            .arg(text_path)
            .arg("--output")
            .arg(output_path)
            .arg("--exaggeration")
            .arg(options.exaggeration.to_string())
            .arg("--cfg-weight")
            .arg(options.cfg_weight.to_string())
            .arg("--temperature")
            .arg(options.temperature.to_string());
        if let Some(reference) = &options.voice_reference {
            cmd.arg("--voice-reference").arg(reference);
        }
        cmd
    }
}

impl Synthesizer for ProcessSynthesizer {
    fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<AudioSegment> {
        let workdir = tempfile::tempdir()?;
        let text_path = workdir.path().join("input.txt");
        let output_path = workdir.path().join("output.wav");
        std::fs::write(&text_path, text)?;

        let output = self
            .build_command(&text_path, &output_path, options)
            .output()
            .map_err(|e| {
                VoxError::generation(
                    "synthesis",
                    format!("failed to start {}: {}", self.command.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoxError::generation(
                "synthesis",
                format!(
                    "{} exited with {}: {}",
                    self.command.display(),
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        wav::read_wav_file(&output_path)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_rejected() {
        let err = ProcessSynthesizer::new(PathBuf::new()).unwrap_err();
        assert!(matches!(err, VoxError::Config { .. }));
    }

    #[test]
    fn test_missing_binary_fails_at_call_time() {
        let synth = ProcessSynthesizer::new(PathBuf::from("/nonexistent/chatterbox")).unwrap();
        assert!(synth.is_ready());

        let err = synth
            .synthesize("hello", &SynthesisOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            VoxError::Generation {
                stage: "synthesis",
                ..
            }
        ));
    }

    #[test]
    fn test_command_arguments_include_parameters() {
        let synth = ProcessSynthesizer::new(PathBuf::from("chatterbox-cli")).unwrap();
        let options = SynthesisOptions {
            voice_reference: Some(PathBuf::from("/tmp/ref.wav")),
            exaggeration: 0.7,
            cfg_weight: 0.0,
            temperature: 0.9,
        };

        let cmd = synth.build_command(
            std::path::Path::new("/tmp/in.txt"),
            std::path::Path::new("/tmp/out.wav"),
            &options,
        );
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(args.contains(&"--exaggeration".to_string()));
        assert!(args.contains(&"0.7".to_string()));
        assert!(args.contains(&"--voice-reference".to_string()));
        assert!(args.contains(&"/tmp/ref.wav".to_string()));
    }

    #[test]
    fn test_voice_reference_omitted_when_absent() {
        let synth = ProcessSynthesizer::new(PathBuf::from("chatterbox-cli")).unwrap();
        let cmd = synth.build_command(
            std::path::Path::new("/tmp/in.txt"),
            std::path::Path::new("/tmp/out.wav"),
            &SynthesisOptions::default(),
        );
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(!args.contains(&"--voice-reference".to_string()));
    }

    // A stand-in "engine" that copies a canned WAV to the output path,
    // exercising the full subprocess round trip without Chatterbox.
    #[test]
    #[cfg(unix)]
    fn test_subprocess_round_trip_with_fake_engine() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let canned = dir.path().join("canned.wav");
        wav::write_wav_file(&canned, &AudioSegment::mono(vec![0.2; 480], 24_000)).unwrap();

        let script = dir.path().join("fake-engine.sh");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--output\" ]; then out=\"$2\"; fi\n  shift\ndone\ncp {} \"$out\"\n",
                canned.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let synth = ProcessSynthesizer::new(script).unwrap();
        let segment = synth
            .synthesize("hello there", &SynthesisOptions::default())
            .unwrap();

        assert_eq!(segment.sample_rate, 24_000);
        assert_eq!(segment.samples.len(), 480);
    }
}
