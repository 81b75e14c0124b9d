//! Editing script parser
//!
//! One command per line; `#` starts a comment. Coordinates are in project
//! units.
//!
//! ```text
//! units m
//! mode column
//! down 2 3 0
//! down 2 3 0
//! dump
//! ```

use thiserror::Error;

use frame_core::model::MemberType;
use frame_core::settings::RenderMode;
use frame_core::units::LengthUnit;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a fresh model in these units
    Units(LengthUnit),
    Mode(Option<MemberType>),
    /// Pointer down on a world point; `chain` holds the placement modifier
    Down { at: [f64; 3], chain: bool },
    Move { at: [f64; 3] },
    Up,
    Escape,
    Delete,
    Render(RenderMode),
    /// Put the camera eye here, looking at the origin
    Camera { eye: [f64; 3] },
    Dump,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Units(_) => "units",
            Command::Mode(_) => "mode",
            Command::Down { .. } => "down",
            Command::Move { .. } => "move",
            Command::Up => "up",
            Command::Escape => "esc",
            Command::Delete => "delete",
            Command::Render(_) => "render",
            Command::Camera { .. } => "camera",
            Command::Dump => "dump",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: {message}")]
    BadArgument { line: usize, message: String },
}

fn bad(line: usize, message: impl Into<String>) -> ScriptError {
    ScriptError::BadArgument {
        line,
        message: message.into(),
    }
}

fn point(line: usize, args: &[&str]) -> Result<[f64; 3], ScriptError> {
    if args.len() < 3 {
        return Err(bad(line, format!("expected x y z, got {} value(s)", args.len())));
    }
    let mut p = [0.0; 3];
    for (slot, raw) in p.iter_mut().zip(args) {
        *slot = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| bad(line, format!("'{}' is not a number", raw)))?;
    }
    Ok(p)
}

/// Parse one line. Blank lines and comments give `Ok(None)`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Command>, ScriptError> {
    let content = line.split('#').next().unwrap_or_default().trim();
    let mut words = content.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "units" => {
            let label = args.first().ok_or_else(|| bad(line_no, "expected mm, m or in"))?;
            let units = LengthUnit::from_label(label).ok_or_else(|| bad(line_no, format!("unknown unit '{}'", label)))?;
            Command::Units(units)
        }
        "mode" => match args.first().map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("beam") => Command::Mode(Some(MemberType::Beam)),
            Some("column") => Command::Mode(Some(MemberType::Column)),
            Some("none") | Some("select") => Command::Mode(None),
            _ => return Err(bad(line_no, "expected beam, column or none")),
        },
        "down" => {
            let at = point(line_no, &args)?;
            let chain = match args.get(3) {
                None => false,
                Some(&"mod") | Some(&"shift") => true,
                Some(other) => return Err(bad(line_no, format!("unexpected '{}'", other))),
            };
            Command::Down { at, chain }
        }
        "move" => Command::Move {
            at: point(line_no, &args)?,
        },
        "up" => Command::Up,
        "esc" | "escape" => Command::Escape,
        "delete" | "del" => Command::Delete,
        "render" => match args.first().map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("box") => Command::Render(RenderMode::Box),
            Some("profile") => Command::Render(RenderMode::Profile),
            _ => return Err(bad(line_no, "expected box or profile")),
        },
        "camera" => Command::Camera {
            eye: point(line_no, &args)?,
        },
        "dump" => Command::Dump,
        other => {
            return Err(ScriptError::UnknownCommand {
                line: line_no,
                command: other.to_string(),
            })
        }
    };
    Ok(Some(command))
}

/// Parse a whole script, collecting every error.
pub fn parse_script(text: &str) -> Result<Vec<(usize, Command)>, Vec<ScriptError>> {
    let mut commands = Vec::new();
    let mut errors = Vec::new();
    for (i, line) in text.lines().enumerate() {
        match parse_line(i + 1, line) {
            Ok(Some(cmd)) => commands.push((i + 1, cmd)),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(commands)
    } else {
        Err(errors)
    }
}
