//! Level files
//!
//! A level is a line-oriented text file. Each non-blank line holds one
//! record; `#` starts a comment:
//!
//! ```text
//! # floor
//! block 0 300 400 50
//! block 400 300
//! start 100 200
//! ```
//!
//! `block x y [w h]` places a static tile with its top-left corner at
//! `(x, y)` pixels, sized to the default tile size unless given.
//! `start x y` is the player start position and must appear exactly once.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::SplitWhitespace;

use glam::Vec2;

use super::rect::Rect;

/// One static tile of a level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDef {
    /// Draw region in pixels
    pub rect: Rect,
}

/// Parsed level data; immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    blocks: Vec<BlockDef>,
    start: Vec2,
}

impl Level {
    /// Parse level text, sizing unsized blocks to `tile_size`.
    ///
    /// # Errors
    ///
    /// Returns the first malformed record, or a start-marker error when the
    /// text has no `start` record or more than one
    pub fn parse(text: &str, tile_size: f32) -> Result<Self, LevelParseError> {
        let mut blocks = Vec::new();
        let mut start: Option<(usize, Vec2)> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split_once('#').map_or(raw, |(before, _)| before);
            let mut fields = content.split_whitespace();

            let Some(kind) = fields.next() else {
                continue;
            };

            match kind {
                "block" => {
                    let values = numbers(fields, line)?;
                    let rect = match values.as_slice() {
                        [x, y] => Rect::new(*x, *y, tile_size, tile_size),
                        [x, y, w, h] => Rect::new(*x, *y, *w, *h),
                        _ => {
                            return Err(LevelParseError::syntax(
                                line,
                                format!("block takes 2 or 4 numbers, found {}", values.len()),
                            ));
                        }
                    };
                    if rect.size.x <= 0.0 || rect.size.y <= 0.0 {
                        return Err(LevelParseError::syntax(line, "block size must be positive"));
                    }
                    blocks.push(BlockDef { rect });
                }
                "start" => {
                    let values = numbers(fields, line)?;
                    let [x, y] = values.as_slice() else {
                        return Err(LevelParseError::syntax(
                            line,
                            format!("start takes 2 numbers, found {}", values.len()),
                        ));
                    };
                    if let Some((first_line, _)) = start {
                        return Err(LevelParseError::DuplicateStart { first_line, line });
                    }
                    start = Some((line, Vec2::new(*x, *y)));
                }
                other => {
                    return Err(LevelParseError::syntax(
                        line,
                        format!("unknown record '{other}'"),
                    ));
                }
            }
        }

        let (_, start) = start.ok_or(LevelParseError::MissingStart)?;
        Ok(Self { blocks, start })
    }

    /// Read and parse a level file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse
    pub fn load(path: impl AsRef<Path>, tile_size: f32) -> Result<Self, LevelParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LevelParseError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let level = Self::parse(&text, tile_size)?;
        log::info!(
            "Loaded level {} ({} blocks)",
            path.display(),
            level.blocks.len()
        );
        Ok(level)
    }

    /// Blocks in file order
    pub fn blocks(&self) -> &[BlockDef] {
        &self.blocks
    }

    /// Player start position in pixels
    pub fn start(&self) -> Vec2 {
        self.start
    }
}

fn numbers(fields: SplitWhitespace<'_>, line: usize) -> Result<Vec<f32>, LevelParseError> {
    fields
        .map(|field| match field.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(LevelParseError::syntax(
                line,
                format!("'{field}' is not a finite number"),
            )),
        })
        .collect()
}

/// Errors that make a level unusable
#[derive(Debug, Clone, PartialEq)]
pub enum LevelParseError {
    /// The level file could not be read
    Io { path: PathBuf, message: String },
    /// A record is malformed
    Syntax { line: usize, reason: String },
    /// No `start` record
    MissingStart,
    /// A second `start` record
    DuplicateStart { first_line: usize, line: usize },
}

impl LevelParseError {
    fn syntax(line: usize, reason: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "Cannot read level {}: {message}", path.display())
            }
            Self::Syntax { line, reason } => write!(f, "Line {line}: {reason}"),
            Self::MissingStart => write!(f, "Level has no start position"),
            Self::DuplicateStart { first_line, line } => write!(
                f,
                "Line {line}: start position already given on line {first_line}"
            ),
        }
    }
}

impl std::error::Error for LevelParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = "\
# ground
block 0 300 400 50
block 400 300   # default size
block 450 250

start 100 200
";

    #[test]
    fn test_parse_blocks_and_start() {
        let level = Level::parse(LEVEL, 50.0).unwrap();

        assert_eq!(level.blocks().len(), 3);
        assert_eq!(level.start(), Vec2::new(100.0, 200.0));
        assert_eq!(level.blocks()[0].rect, Rect::new(0.0, 300.0, 400.0, 50.0));
        assert_eq!(level.blocks()[1].rect, Rect::new(400.0, 300.0, 50.0, 50.0));
    }

    #[test]
    fn test_missing_start() {
        let err = Level::parse("block 0 0\n", 50.0).unwrap_err();
        assert_eq!(err, LevelParseError::MissingStart);
    }

    #[test]
    fn test_duplicate_start() {
        let err = Level::parse("start 0 0\nblock 0 50\nstart 10 10\n", 50.0).unwrap_err();
        assert_eq!(
            err,
            LevelParseError::DuplicateStart {
                first_line: 1,
                line: 3
            }
        );
    }

    #[test]
    fn test_malformed_records() {
        let cases = [
            "block 0\nstart 0 0",
            "block 0 0 10\nstart 0 0",
            "block a 0\nstart 0 0",
            "block 0 0 -5 10\nstart 0 0",
            "block inf 0\nstart 0 0",
            "start 0\n",
            "spawn 0 0\nstart 0 0",
        ];

        for text in cases {
            let err = Level::parse(text, 50.0).unwrap_err();
            assert!(
                matches!(err, LevelParseError::Syntax { line: 1, .. }),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Level::load(dir.path().join("nope.fl"), 50.0).unwrap_err();
        assert!(matches!(err, LevelParseError::Io { .. }));
    }
}
