use crate::caption::{Caption, Transcript};
use crate::error::ConvertError;
use crate::parser;
use crate::serialiser;

use std::path::Path;

use anyhow::{Context, Result};
use log::{error, info};

pub const PARSE_FAILED: u32 = 912_036_478;
pub const WRITE_FAILED: u32 = 201_036_470;

/// Sink for failures caught at the converter boundary.
pub trait Reporter {
    fn report(&self, code: u32, cause: &anyhow::Error, context: &str);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, code: u32, cause: &anyhow::Error, context: &str) {
        (**self).report(code, cause, context)
    }
}

pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, code: u32, cause: &anyhow::Error, context: &str) {
        error!("[{}] {}: {:#}", code, context, cause);
    }
}

/// Converts TTML files to SRT, one file at a time.
///
/// `parse` and `to_srt` never return errors; failures go to the reporter and
/// come back as `false`. A failed `parse` leaves no captions behind.
pub struct Converter<R> {
    reporter: R,
    transcript: Transcript,
}

impl<R: Reporter> Converter<R> {
    pub fn new(reporter: R) -> Self {
        Self {
            reporter,
            transcript: Transcript::default(),
        }
    }

    pub fn parse<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        self.transcript = Transcript::default();
        match load(path) {
            Ok(transcript) => {
                info!(
                    "Read {} styles and {} captions from {}",
                    transcript.styles.len(),
                    transcript.captions.len(),
                    path.display()
                );
                self.transcript = transcript;
                true
            }
            Err(err) => {
                self.reporter
                    .report(PARSE_FAILED, &err, &format!("File: {}", path.display()));
                false
            }
        }
    }

    pub fn to_srt<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        match serialiser::serialise(&self.transcript.captions, path) {
            Ok(()) => true,
            Err(err) => {
                self.reporter
                    .report(WRITE_FAILED, &err, &format!("File: {}", path.display()));
                false
            }
        }
    }

    pub fn cleanup(&mut self) {
        self.transcript.clear();
    }

    pub fn captions(&self) -> &[Caption] {
        &self.transcript.captions
    }
}

fn load(path: &Path) -> Result<Transcript> {
    let data = std::fs::read_to_string(path)
        .map_err(ConvertError::from)
        .context("Failed to read input file")?;
    let transcript = parser::parse_transcript(&data).context("Failed to parse TTML document")?;
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        reports: RefCell<Vec<(u32, String)>>,
        kinds: RefCell<Vec<String>>,
    }

    impl Reporter for Recorder {
        fn report(&self, code: u32, cause: &anyhow::Error, context: &str) {
            self.reports.borrow_mut().push((code, context.to_string()));
            let kind = match cause.downcast_ref::<ConvertError>() {
                Some(ConvertError::Format) => "format",
                Some(ConvertError::UnsupportedVersion(_)) => "version",
                Some(ConvertError::Timestamp { .. }) => "timestamp",
                Some(ConvertError::Io(_)) => "io",
                Some(ConvertError::Xml(_)) => "xml",
                None => "other",
            };
            self.kinds.borrow_mut().push(kind.to_string());
        }
    }

    fn ttml(version: Option<&str>, color: &str, cues: &[(&str, &str, &str)]) -> String {
        let version = version
            .map(|v| format!("<ebuttm:documentEbuttVersion>{}</ebuttm:documentEbuttVersion>", v))
            .unwrap_or_default();
        let cues: String = cues
            .iter()
            .map(|(begin, end, text)| {
                format!(
                    "<tt:p begin=\"{}\" end=\"{}\"><tt:span style=\"s1\">{}</tt:span></tt:p>\n",
                    begin, end, text
                )
            })
            .collect();
        format!(
            "<tt:tt xmlns:tt=\"http://www.w3.org/ns/ttml\" \
             xmlns:tts=\"http://www.w3.org/ns/ttml#styling\" \
             xmlns:ebuttm=\"urn:ebu:tt:metadata\">\n\
             <tt:head><tt:metadata>{}</tt:metadata>\
             <tt:styling><tt:style xml:id=\"s1\" tts:color=\"{}\"/></tt:styling></tt:head>\n\
             <tt:body><tt:div>\n{}</tt:div></tt:body></tt:tt>\n",
            version, color, cues
        )
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_and_write_srt() {
        let dir = TempDir::new().unwrap();
        let input = write_file(
            &dir,
            "in.xml",
            &ttml(
                Some("v1.0"),
                "#FF0000",
                &[("10:00:01.50", "10:00:04.20", "Hi")],
            ),
        );
        let output = dir.path().join("out.srt");
        let recorder = Recorder::default();
        let mut converter = Converter::new(&recorder);

        assert!(converter.parse(&input));
        assert!(converter.to_srt(&output));

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "1\n00:00:01,500 --> 00:00:04,200\n<font color=\"#FF0000\">Hi</font>\n\n"
        );
        assert!(recorder.reports.borrow().is_empty());
    }

    #[test]
    fn test_missing_version_is_reported() {
        let dir = TempDir::new().unwrap();
        let good = write_file(
            &dir,
            "good.xml",
            &ttml(Some("v1.0"), "#FFFFFF", &[("10:00:01.00", "10:00:02.00", "a")]),
        );
        let bad = write_file(
            &dir,
            "bad.xml",
            &ttml(None, "#FFFFFF", &[("10:00:01.00", "10:00:02.00", "b")]),
        );
        let recorder = Recorder::default();
        let mut converter = Converter::new(&recorder);

        assert!(converter.parse(&good));
        assert!(!converter.parse(&bad));

        assert!(converter.captions().is_empty());
        assert_eq!(
            *recorder.reports.borrow(),
            vec![(PARSE_FAILED, format!("File: {}", bad.display()))]
        );
        assert_eq!(*recorder.kinds.borrow(), vec!["format".to_string()]);
    }

    #[test]
    fn test_failure_kinds_are_reported() {
        let dir = TempDir::new().unwrap();
        let old = write_file(
            &dir,
            "old.xml",
            &ttml(Some("v0.9"), "#FFFFFF", &[("10:00:01.00", "10:00:02.00", "a")]),
        );
        let broken = write_file(
            &dir,
            "broken.xml",
            &ttml(Some("V1.0"), "#FFFFFF", &[("10:00:01", "10:00:02.00", "a")]),
        );
        let recorder = Recorder::default();
        let mut converter = Converter::new(&recorder);

        assert!(!converter.parse(&old));
        assert!(!converter.parse(&broken));
        assert!(!converter.parse(dir.path().join("missing.xml")));
        assert!(!converter.to_srt(dir.path().join("no-such-dir").join("out.srt")));

        assert_eq!(
            *recorder.kinds.borrow(),
            vec!["version", "timestamp", "io", "other"]
        );
        let codes: Vec<u32> = recorder.reports.borrow().iter().map(|r| r.0).collect();
        assert_eq!(
            codes,
            vec![PARSE_FAILED, PARSE_FAILED, PARSE_FAILED, WRITE_FAILED]
        );
    }

    #[test]
    fn test_cleanup_between_files() {
        let dir = TempDir::new().unwrap();
        let first = write_file(
            &dir,
            "first.xml",
            &ttml(
                Some("v1.0"),
                "#FFFFFF",
                &[
                    ("10:00:01.00", "10:00:02.00", "one"),
                    ("10:00:03.00", "10:00:04.00", "two"),
                ],
            ),
        );
        let second = write_file(
            &dir,
            "second.xml",
            &ttml(Some("V1.0"), "#00FF00", &[("10:00:05.00", "10:00:06.00", "three")]),
        );
        let output = dir.path().join("second.srt");
        let recorder = Recorder::default();
        let mut converter = Converter::new(&recorder);

        assert!(converter.parse(&first));
        assert_eq!(converter.captions().len(), 2);
        converter.cleanup();
        assert!(converter.captions().is_empty());
        assert!(converter.parse(&second));
        assert!(converter.to_srt(&output));

        assert_eq!(converter.transcript.styles.len(), 1);
        assert_eq!(converter.transcript.styles["s1"], "#00FF00");
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "1\n00:00:05,000 --> 00:00:06,000\n<font color=\"#00FF00\">three</font>\n\n"
        );
    }
}
