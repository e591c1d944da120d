//! Line-oriented command scripts driving a scene and its edit log.

use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;

use rewind_core::EditLog;
use rewind_core::edits::{BatchEdit, BatchValues, PointListEdit, PointMoveEdit, ValueEdit};

use crate::scene::{OPACITY, POSITION, Scene};
use crate::view::render_history;

/// One script command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Shape(String),
    Move { name: String, x: f32, y: f32 },
    Opacity { name: String, value: f32 },
    Fade(f32),
    Insert { name: String, index: usize, x: f32, y: f32 },
    Remove { name: String, index: usize },
    Drag { name: String, index: usize, x: f32, y: f32 },
    Boundary,
    Undo,
    Redo,
    Jump(usize),
    Delete(String),
    /// `None` for unlimited.
    Limit(Option<usize>),
    Clear,
    History,
    Show,
}

struct Args<'a> {
    command: &'a str,
    parts: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn word(&mut self, what: &str) -> Result<String, String> {
        self.parts
            .next()
            .map(str::to_string)
            .ok_or_else(|| format!("{}: missing {what}", self.command))
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T, String> {
        let word = self.word(what)?;
        word.parse()
            .map_err(|_| format!("{}: invalid {what} '{word}'", self.command))
    }

    fn finish<T>(mut self, command: T) -> Result<T, String> {
        match self.parts.next() {
            Some(extra) => Err(format!("{}: unexpected argument '{extra}'", self.command)),
            None => Ok(command),
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().ok_or("empty command")?;
        let mut args = Args { command, parts };

        let parsed = match command {
            "shape" => Command::Shape(args.word("name")?),
            "move" => Command::Move {
                name: args.word("name")?,
                x: args.number("x")?,
                y: args.number("y")?,
            },
            "opacity" => Command::Opacity {
                name: args.word("name")?,
                value: args.number("value")?,
            },
            "fade" => Command::Fade(args.number("value")?),
            "insert" => Command::Insert {
                name: args.word("name")?,
                index: args.number("index")?,
                x: args.number("x")?,
                y: args.number("y")?,
            },
            "remove" => Command::Remove {
                name: args.word("name")?,
                index: args.number("index")?,
            },
            "drag" => Command::Drag {
                name: args.word("name")?,
                index: args.number("index")?,
                x: args.number("x")?,
                y: args.number("y")?,
            },
            "boundary" => Command::Boundary,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "jump" => Command::Jump(args.number("entry")?),
            "delete" => Command::Delete(args.word("name")?),
            "limit" => Command::Limit(usize::try_from(args.number::<i64>("limit")?).ok()),
            "clear" => Command::Clear,
            "history" => Command::History,
            "show" => Command::Show,
            other => return Err(format!("unknown command '{other}'")),
        };
        args.finish(parsed)
    }
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(None);
    }
    line.parse().map(Some)
}

/// A scene plus the log recording its edits.
pub struct Session {
    history: Arc<EditLog>,
    scene: Scene,
}

impl Session {
    pub fn new(history: Arc<EditLog>) -> Self {
        Self {
            history,
            scene: Scene::new(),
        }
    }

    pub fn history(&self) -> &EditLog {
        &self.history
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Runs one command, returning text to print for queries.
    pub fn execute(&mut self, command: Command) -> Result<Option<String>, String> {
        let history = &self.history;
        match command {
            Command::Shape(name) => {
                self.scene.add(&name)?;
            }
            Command::Move { name, x, y } => {
                let shape = self.scene.get(&name)?;
                let edit = ValueEdit::perform(shape, POSITION, (x, y))
                    .with_description(format!("Move {name}"));
                history.add_edit(Box::new(edit));
            }
            Command::Opacity { name, value } => {
                let shape = self.scene.get(&name)?;
                let edit = ValueEdit::perform(shape, OPACITY, value)
                    .with_description(format!("Set opacity of {name}"));
                history.add_edit(Box::new(edit));
            }
            Command::Fade(value) => {
                let shapes = self.scene.handles();
                let count = shapes.len();
                let edit = BatchEdit::perform(shapes, OPACITY, BatchValues::Shared(value))
                    .map_err(|e| e.to_string())?
                    .with_description(format!("Fade {count} shapes"));
                history.add_edit(Box::new(edit));
            }
            Command::Insert { name, index, x, y } => {
                let shape = self.scene.get(&name)?;
                history.add_edit(Box::new(PointListEdit::insert(shape, index, (x, y))));
            }
            Command::Remove { name, index } => {
                let shape = self.scene.get(&name)?;
                let edit = PointListEdit::remove(shape, index).map_err(|e| e.to_string())?;
                history.add_edit(Box::new(edit));
            }
            Command::Drag { name, index, x, y } => {
                let shape = self.scene.get(&name)?;
                let edit =
                    PointMoveEdit::perform(shape, index, (x, y)).map_err(|e| e.to_string())?;
                history.add_edit(Box::new(edit));
            }
            Command::Boundary => {
                history.add_boundary();
            }
            Command::Undo => history.undo().map_err(|e| e.to_string())?,
            Command::Redo => history.redo().map_err(|e| e.to_string())?,
            Command::Jump(index) => {
                let entry = history
                    .entries()
                    .into_iter()
                    .nth(index)
                    .ok_or_else(|| format!("jump: no history entry {index}"))?;
                history
                    .undo_or_redo_to(entry.id)
                    .map_err(|e| e.to_string())?;
            }
            Command::Delete(name) => {
                let shape = self.scene.remove(&name)?;
                let discarded = history.discard_edits(shape.id());
                log::info!("deleted {name}, discarding {discarded} edits");
            }
            Command::Limit(limit) => history.set_limit(limit),
            Command::Clear => {
                history.discard_all();
            }
            Command::History => return Ok(Some(render_history(history))),
            Command::Show => return Ok(Some(self.scene.render())),
        }
        Ok(None)
    }

    /// Parses and runs one line.
    pub fn run_line(&mut self, line: &str) -> Result<Option<String>, String> {
        match parse_line(line)? {
            Some(command) => self.execute(command),
            None => Ok(None),
        }
    }

    /// Runs every line of `input`, writing query output to `output`.
    ///
    /// Failing lines are logged and skipped. Returns how many failed.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<usize> {
        let mut failed = 0;
        for (number, line) in input.lines().enumerate() {
            let line = line?;
            match self.run_line(&line) {
                Ok(Some(text)) => writeln!(output, "{text}")?,
                Ok(None) => {}
                Err(e) => {
                    log::error!("line {}: {e}", number + 1);
                    failed += 1;
                }
            }
        }
        Ok(failed)
    }
}
