//! Embedded Lua that issues 2D drawing calls every frame.
//!
//! Scripts get a `SimpleDraw` module (also reachable through `require`) and
//! define a global `Draw(dt)` that is called once per frame. Drawing calls
//! are recorded as [`DrawCommand`]s and turned into overlay batches by
//! [`overlay_batches`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use glam::Vec2;
use log::info;
use mlua::{Lua, Table, Value, Variadic};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::debug_log::{DebugLog, LogLevel, Module};
use crate::error::ScriptError;
use crate::render::{shapes, Batch, Color};

pub const MODULE_NAME: &str = "SimpleDraw";

/// One drawing call made by a script.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Rect {
        origin: Vec2,
        size: Vec2,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
    },
}

type CommandList = Rc<RefCell<Vec<DrawCommand>>>;

/// Reads argument `index` the way `lua_tonumber` does: numbers and numeric
/// strings convert, anything else reads as zero.
fn number_arg(args: &[Value], index: usize) -> f32 {
    match args.get(index) {
        Some(Value::Integer(value)) => *value as f32,
        Some(Value::Number(value)) => *value as f32,
        Some(Value::String(value)) => value
            .to_str()
            .ok()
            .and_then(|text| text.trim().parse::<f64>().ok())
            .unwrap_or(0.0) as f32,
        _ => 0.0,
    }
}

fn channel_arg(args: &[Value], index: usize) -> u8 {
    number_arg(args, index).clamp(0.0, 255.0) as u8
}

fn color_arg(args: &[Value], first: usize) -> Color {
    Color::new(
        channel_arg(args, first),
        channel_arg(args, first + 1),
        channel_arg(args, first + 2),
        channel_arg(args, first + 3),
    )
}

fn vec2_arg(args: &[Value], first: usize) -> Vec2 {
    Vec2::new(number_arg(args, first), number_arg(args, first + 1))
}

fn ordinal_arg(args: &[Value], index: usize) -> u8 {
    let value = number_arg(args, index);
    if (0.0..=f32::from(u8::MAX)).contains(&value) {
        value as u8
    } else {
        u8::MAX
    }
}

fn register_module(lua: &Lua, commands: &CommandList, log: &Rc<RefCell<DebugLog>>) -> mlua::Result<()> {
    let module = lua.create_table()?;

    let sink = Rc::clone(commands);
    module.set(
        "Clear",
        lua.create_function(move |_, args: Variadic<Value>| {
            sink.borrow_mut().push(DrawCommand::Clear(color_arg(&args, 0)));
            Ok(())
        })?,
    )?;

    let sink = Rc::clone(commands);
    module.set(
        "DrawCircle",
        lua.create_function(move |_, args: Variadic<Value>| {
            sink.borrow_mut().push(DrawCommand::Circle {
                center: vec2_arg(&args, 0),
                radius: number_arg(&args, 2),
                color: color_arg(&args, 3),
            });
            Ok(())
        })?,
    )?;

    let sink = Rc::clone(commands);
    module.set(
        "DrawRect",
        lua.create_function(move |_, args: Variadic<Value>| {
            sink.borrow_mut().push(DrawCommand::Rect {
                origin: vec2_arg(&args, 0),
                size: vec2_arg(&args, 2),
                color: color_arg(&args, 4),
            });
            Ok(())
        })?,
    )?;

    let sink = Rc::clone(commands);
    module.set(
        "DrawLine",
        lua.create_function(move |_, args: Variadic<Value>| {
            sink.borrow_mut().push(DrawCommand::Line {
                from: vec2_arg(&args, 0),
                to: vec2_arg(&args, 2),
                color: color_arg(&args, 4),
            });
            Ok(())
        })?,
    )?;

    let log = Rc::clone(log);
    module.set(
        "Log",
        lua.create_function(move |_, args: Variadic<Value>| {
            let message = match args.get(2) {
                Some(Value::String(text)) => text.to_string_lossy().into_owned(),
                _ => String::new(),
            };
            log.borrow_mut()
                .log_raw(ordinal_arg(&args, 0), ordinal_arg(&args, 1), &message);
            Ok(())
        })?,
    )?;

    let globals = lua.globals();
    let loaded: Table = globals.get::<_, Table>("package")?.get("loaded")?;
    loaded.set(MODULE_NAME, module.clone())?;
    globals.set(MODULE_NAME, module)?;
    Ok(())
}

struct ScriptWatch {
    // Dropping the watcher stops the notifications.
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<notify::Event>>,
}

/// A Lua state with the drawing module installed.
pub struct ScriptHost {
    lua: Lua,
    commands: CommandList,
    log: Rc<RefCell<DebugLog>>,
    path: Option<PathBuf>,
    watch: Option<ScriptWatch>,
    missing_draw_reported: bool,
}

impl ScriptHost {
    pub fn new(log: Rc<RefCell<DebugLog>>) -> Result<Self, ScriptError> {
        let lua = Lua::new();
        let commands = CommandList::default();
        register_module(&lua, &commands, &log)?;
        Ok(Self {
            lua,
            commands,
            log,
            path: None,
            watch: None,
            missing_draw_reported: false,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs the file at `path` and remembers it for reloading.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ScriptError> {
        let path = path.as_ref();
        self.path = Some(path.to_path_buf());
        let source = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&path.display().to_string(), &source)
    }

    pub fn load_str(&mut self, name: &str, source: &str) -> Result<(), ScriptError> {
        self.missing_draw_reported = false;
        self.lua.load(source).set_name(name).exec()?;
        Ok(())
    }

    /// Starts watching the loaded script's directory for changes.
    pub fn watch(&mut self) -> Result<(), ScriptError> {
        let path = self.path.as_ref().ok_or(ScriptError::NoScript)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        self.watch = Some(ScriptWatch {
            _watcher: watcher,
            events: rx,
        });
        Ok(())
    }

    /// Drains watcher events and re-runs the script if it was written.
    ///
    /// Returns `true` when the script was reloaded successfully.
    pub fn reload_if_changed(&mut self) -> bool {
        let (Some(watch), Some(path)) = (&self.watch, &self.path) else {
            return false;
        };
        let Some(file_name) = path.file_name() else {
            return false;
        };

        let mut changed = false;
        loop {
            match watch.events.try_recv() {
                Ok(Ok(event)) => {
                    let touches_script = event
                        .paths
                        .iter()
                        .any(|candidate| candidate.file_name() == Some(file_name));
                    if touches_script
                        && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                    {
                        changed = true;
                    }
                }
                Ok(Err(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        if !changed {
            return false;
        }

        let path = path.clone();
        match self.load_file(&path) {
            Ok(()) => {
                info!("reloaded script {}", path.display());
                true
            }
            Err(err) => {
                self.report(LogLevel::Error, format!("Error reloading script: {err}"));
                false
            }
        }
    }

    /// Calls the script's `Draw(dt)` and returns the commands it issued.
    pub fn draw(&mut self, dt: f32) -> Vec<DrawCommand> {
        self.commands.borrow_mut().clear();

        let draw = self.lua.globals().get::<_, Value>("Draw");
        match draw {
            Ok(Value::Function(function)) => {
                if let Err(err) = function.call::<_, ()>(f64::from(dt)) {
                    self.report(LogLevel::Error, format!("Error calling Draw from script: {err}"));
                }
            }
            _ => {
                if !self.missing_draw_reported {
                    self.missing_draw_reported = true;
                    self.report(LogLevel::Warning, "Draw function not found in script");
                }
            }
        }

        std::mem::take(&mut *self.commands.borrow_mut())
    }

    fn report(&self, level: LogLevel, message: impl AsRef<str>) {
        self.log.borrow_mut().log(level, Module::Render, message);
    }
}

/// Turns recorded commands into overlay batches.
///
/// A `Clear` wipes everything drawn earlier in the frame, so only the last
/// clear colour is returned together with the shapes issued after it.
pub fn overlay_batches(commands: &[DrawCommand]) -> (Option<Color>, Vec<Batch<'static>>) {
    let last_clear = commands
        .iter()
        .rposition(|command| matches!(command, DrawCommand::Clear(_)));
    let (clear, visible) = match last_clear {
        Some(index) => {
            let color = match commands[index] {
                DrawCommand::Clear(color) => Some(color),
                _ => None,
            };
            (color, &commands[index + 1..])
        }
        None => (None, commands),
    };

    let mut batches: Vec<Batch<'static>> = Vec::new();
    for command in visible {
        let (topology, vertices) = match *command {
            DrawCommand::Clear(_) => continue,
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => (shapes::Topology::Triangles, shapes::circle(center, radius, color)),
            DrawCommand::Rect {
                origin,
                size,
                color,
            } => (shapes::Topology::Triangles, shapes::rect(origin, size, color)),
            DrawCommand::Line { from, to, color } => {
                (shapes::Topology::Lines, shapes::line(from, to, color))
            }
        };
        match batches.last_mut() {
            Some(batch) if batch.topology == topology && batch.texture.is_none() => {
                batch.vertices.extend(vertices);
            }
            _ => batches.push(Batch {
                topology,
                texture: None,
                vertices,
            }),
        }
    }
    (clear, batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_hides_earlier_commands() {
        let commands = vec![
            DrawCommand::Rect {
                origin: Vec2::ZERO,
                size: Vec2::ONE,
                color: Color::WHITE,
            },
            DrawCommand::Clear(Color::new(1, 2, 3, 255)),
            DrawCommand::Line {
                from: Vec2::ZERO,
                to: Vec2::ONE,
                color: Color::WHITE,
            },
        ];
        let (clear, batches) = overlay_batches(&commands);
        assert_eq!(clear, Some(Color::new(1, 2, 3, 255)));
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].topology, shapes::Topology::Lines);
        assert_eq!(batches[0].vertices.len(), 2);
    }

    #[test]
    fn consecutive_shapes_share_a_batch() {
        let rect = DrawCommand::Rect {
            origin: Vec2::ZERO,
            size: Vec2::splat(4.0),
            color: Color::WHITE,
        };
        let line = DrawCommand::Line {
            from: Vec2::ZERO,
            to: Vec2::ONE,
            color: Color::WHITE,
        };
        let (clear, batches) = overlay_batches(&[rect.clone(), rect, line]);
        assert_eq!(clear, None);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].vertices.len(), 12);
        assert_eq!(batches[1].topology, shapes::Topology::Lines);
    }

    #[test]
    fn channels_clamp() {
        let args = [Value::Number(300.0), Value::Integer(-4), Value::Nil];
        assert_eq!(channel_arg(&args, 0), 255);
        assert_eq!(channel_arg(&args, 1), 0);
        assert_eq!(channel_arg(&args, 2), 0);
        assert_eq!(channel_arg(&args, 9), 0);
        assert_eq!(ordinal_arg(&args, 1), u8::MAX);
    }
}
