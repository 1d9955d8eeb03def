//! Scripted capture sessions
//!
//! A replay script is a JSON-lines file; each line describes a run of
//! identical frames:
//!
//! ```text
//! {"codes": [{"text": "Patient 1", "rect": [120, 80, 160, 160]}], "repeat": 30}
//! {"codes": [], "repeat": 15}
//! {"codes": [{"text": "Patient 2", "polygon": [[0, 0], [90, 2], [88, 91], [1, 89]]}]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. When the script runs
//! out the source reports a frame acquisition failure, exactly like a camera
//! that went away, and the loop shuts down.

use super::{CodeDetector, Frame, FrameSource};
use crate::error::{Result, ScanError};
use crate::pipeline::clock::Clock;
use crate::pipeline::types::{Geometry, ScanObservation};
use log::info;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ScriptLine {
    #[serde(default)]
    codes: Vec<ScriptCode>,
    #[serde(default = "one")]
    repeat: u32,
}

#[derive(Debug, Deserialize)]
struct ScriptCode {
    text: String,
    #[serde(default)]
    rect: Option<[i32; 4]>,
    #[serde(default)]
    polygon: Option<Vec<[i32; 2]>>,
}

fn one() -> u32 {
    1
}

/// A code placed in a scripted frame
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedCode {
    pub text: String,
    pub geometry: Geometry,
}

/// A run of identical frames
#[derive(Debug, Clone, PartialEq)]
struct Run {
    codes: Vec<ScriptedCode>,
    /// Frame index just past the end of this run
    end: u64,
}

/// Parsed replay script, stored as runs of identical frames
#[derive(Debug, Clone, Default)]
pub struct ReplayScript {
    runs: Vec<Run>,
}

impl ReplayScript {
    fn push_run(&mut self, codes: Vec<ScriptedCode>, count: u64) {
        if count == 0 {
            return;
        }
        let end = self.len() + count;
        self.runs.push(Run { codes, end });
    }

    /// Codes scripted for frame `seq`, `None` past the end
    pub fn frame(&self, seq: u64) -> Option<&[ScriptedCode]> {
        let index = self.runs.partition_point(|run| run.end <= seq);
        self.runs.get(index).map(|run| run.codes.as_slice())
    }
}

impl ReplayScript {
    pub fn parse(script: &str) -> Result<Self> {
        let mut parsed_script = Self::default();

        for (index, raw) in script.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parsed: ScriptLine = serde_json::from_str(line)
                .map_err(|e| ScanError::Replay(format!("line {}: {}", index + 1, e)))?;

            let codes = parsed
                .codes
                .into_iter()
                .map(|code| to_scripted(code, index + 1))
                .collect::<Result<Vec<_>>>()?;

            parsed_script.push_run(codes, u64::from(parsed.repeat));
        }

        Ok(parsed_script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let script = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Replay(format!("{}: {}", path.display(), e)))?;
        let parsed = Self::parse(&script)?;
        info!(
            "Loaded replay script {} ({} frames)",
            path.display(),
            parsed.len()
        );
        Ok(parsed)
    }

    pub fn from_frames(frames: Vec<Vec<ScriptedCode>>) -> Self {
        let mut script = Self::default();
        for codes in frames {
            script.push_run(codes, 1);
        }
        script
    }

    /// Number of frames the script plays
    pub fn len(&self) -> u64 {
        self.runs.last().map_or(0, |run| run.end)
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Split into the frame source and the detector that reads it back
    pub fn into_parts<C: Clock>(
        self,
        clock: C,
        width: u32,
        height: u32,
    ) -> (ReplaySource<C>, ScriptedDetector) {
        let source = ReplaySource {
            clock,
            total: self.len(),
            seq: 0,
            width,
            height,
        };
        (source, ScriptedDetector { script: self })
    }
}

fn to_scripted(code: ScriptCode, line: usize) -> Result<ScriptedCode> {
    let geometry = match (code.rect, code.polygon) {
        (Some(_), Some(_)) => {
            return Err(ScanError::Replay(format!(
                "line {}: `{}` has both rect and polygon",
                line, code.text
            )));
        }
        (Some([x, y, width, height]), None) => {
            if width < 0 || height < 0 {
                return Err(ScanError::Replay(format!(
                    "line {}: negative rect size for `{}`",
                    line, code.text
                )));
            }
            Geometry::Rect {
                x,
                y,
                width: width as u32,
                height: height as u32,
            }
        }
        (None, Some(points)) => Geometry::Polygon(points.into_iter().map(|[x, y]| (x, y)).collect()),
        (None, None) => Geometry::Rect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        },
    };

    Ok(ScriptedCode {
        text: code.text,
        geometry,
    })
}

/// Frame source that yields one blank frame per script entry
pub struct ReplaySource<C: Clock> {
    clock: C,
    total: u64,
    seq: u64,
    width: u32,
    height: u32,
}

impl<C: Clock> FrameSource for ReplaySource<C> {
    fn next_frame(&mut self) -> Result<Frame> {
        if self.seq >= self.total {
            return Err(ScanError::FrameAcquisition(format!(
                "replay script exhausted after {} frames",
                self.total
            )));
        }
        let frame = Frame::blank(self.seq, self.clock.now(), self.width, self.height);
        self.seq += 1;
        Ok(frame)
    }

    fn release(&mut self) {
        info!("Replay source released at frame {}/{}", self.seq, self.total);
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Detector that reports the codes scripted for each frame
pub struct ScriptedDetector {
    script: ReplayScript,
}

impl CodeDetector for ScriptedDetector {
    fn detect(&mut self, frame: &Frame) -> Vec<ScanObservation> {
        self.script
            .frame(frame.seq)
            .map(|codes| {
                codes
                    .iter()
                    .map(|code| {
                        ScanObservation::new(
                            code.text.clone(),
                            code.geometry.clone(),
                            frame.captured_at,
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::clock::ManualClock;
    use std::io::Write;

    const SCRIPT: &str = r#"
# patient walks up, leaves, a second patient follows
{"codes": [{"text": "Patient 1", "rect": [120, 80, 160, 160]}], "repeat": 2}
{"repeat": 1}

{"codes": [{"text": "Patient 2", "polygon": [[0, 0], [90, 2], [88, 91], [1, 89]]}, {"text": "Patient 3"}]}
"#;

    #[test]
    fn test_parse_expands_repeats() {
        let script = ReplayScript::parse(SCRIPT).unwrap();
        assert_eq!(script.len(), 4);
        assert_eq!(script.frame(0), script.frame(1));
        assert_eq!(script.frame(2), Some(&[][..]));
        assert_eq!(script.frame(3).map(|codes| codes.len()), Some(2));
        assert_eq!(script.frame(4), None);
        assert_eq!(
            script.frame(0).unwrap()[0].geometry,
            Geometry::Rect {
                x: 120,
                y: 80,
                width: 160,
                height: 160
            }
        );
    }

    #[test]
    fn test_replay_plays_back_then_fails() {
        let clock = ManualClock::new();
        let (mut source, mut detector) = ReplayScript::parse(SCRIPT)
            .unwrap()
            .into_parts(clock.clone(), 640, 360);

        let mut seen = Vec::new();
        for _ in 0..4 {
            let frame = source.next_frame().unwrap();
            let texts: Vec<String> = detector.detect(&frame).into_iter().map(|o| o.text).collect();
            seen.push(texts);
        }

        assert_eq!(
            seen,
            vec![
                vec!["Patient 1".to_string()],
                vec!["Patient 1".to_string()],
                vec![],
                vec!["Patient 2".to_string(), "Patient 3".to_string()],
            ]
        );

        let err = source.next_frame().unwrap_err();
        assert!(matches!(err, ScanError::FrameAcquisition(_)));
    }

    #[test]
    fn test_bad_lines_are_reported_with_position() {
        let err = ReplayScript::parse("{\"codes\": []}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let both = r#"{"codes": [{"text": "x", "rect": [0,0,1,1], "polygon": [[0,0]]}]}"#;
        assert!(matches!(ReplayScript::parse(both), Err(ScanError::Replay(_))));

        let negative = r#"{"codes": [{"text": "x", "rect": [0,0,-1,1]}]}"#;
        assert!(matches!(ReplayScript::parse(negative), Err(ScanError::Replay(_))));
    }

    #[test]
    fn test_huge_repeat_is_not_expanded() {
        let script = ReplayScript::parse(
            r#"{"codes": [{"text": "Patient 1"}], "repeat": 4294967295}
{"codes": [], "repeat": 0}
{"codes": [{"text": "Patient 2"}]}"#,
        )
        .unwrap();

        assert_eq!(script.len(), u64::from(u32::MAX) + 1);
        assert_eq!(script.frame(0).unwrap()[0].text, "Patient 1");
        assert_eq!(script.frame(u64::from(u32::MAX) - 1).unwrap()[0].text, "Patient 1");
        assert_eq!(script.frame(u64::from(u32::MAX)).unwrap()[0].text, "Patient 2");
        assert_eq!(script.frame(u64::from(u32::MAX) + 1), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCRIPT.as_bytes()).unwrap();

        let script = ReplayScript::load(file.path()).unwrap();
        assert_eq!(script.len(), 4);
    }
}
