//! Page replay: load a page description, drive an editor session, write SVG.
//!
//! A page file is JSON with an optional editor config, an optional starting
//! document and a list of scripted actions in canvas coordinates.

use clap::Parser;
use komaink_core::elements::BubbleKind;
use komaink_core::{ConfigError, EditorConfig, EditorSession, Key, Modifiers, PageDocument, ToolKind};
use komaink_render::{render_svg, PageRenderOptions, RenderError};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid page file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
}

/// Command line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "komaink", about = "Replay a comic page script and export it as SVG")]
pub struct Cli {
    /// Page file to replay.
    pub input: PathBuf,

    /// SVG output path. Defaults to the input path with an `.svg` extension.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the resulting page document as JSON.
    #[arg(long)]
    pub save_page: Option<PathBuf>,

    /// Draw manipulation handles for the final selection.
    #[arg(long)]
    pub handles: bool,

    /// Draw the dashed frame around free text.
    #[arg(long)]
    pub text_frames: bool,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("svg"))
    }
}

/// One scripted editor action. Coordinates are canvas units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SelectTool {
        tool: ToolKind,
    },
    BubbleKind {
        kind: BubbleKind,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    /// DOM key name, e.g. `"Escape"` or `"Delete"`.
    Key {
        key: String,
    },
    /// Replace the text of the selected bubble or text box.
    SetText {
        text: String,
    },
    Undo,
    Redo,
    BringToFront,
    SendToBack,
}

fn modifiers(shift: bool) -> Modifiers {
    if shift { Modifiers::SHIFT } else { Modifiers::NONE }
}

/// Contents of a page file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFile {
    pub config: Option<EditorConfig>,
    pub document: Option<PageDocument>,
    pub actions: Vec<Action>,
}

impl PageFile {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let file: Self = serde_json::from_str(json)?;
        if let Some(config) = &file.config {
            config.validate()?;
        }
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = read(path)?;
        Self::from_json(&json)
    }

    /// Build a session and run every action against it.
    pub fn replay(self) -> EditorSession {
        let config = self.config.unwrap_or_default();
        let document = self
            .document
            .unwrap_or_else(|| PageDocument::new(config.page_size));
        let mut session = EditorSession::from_document(config, document);
        for action in &self.actions {
            apply_action(&mut session, action);
        }
        let events = session.poll_events();
        log::debug!("Replay produced {} editor events", events.len());
        session
    }
}

/// Feed one action into the session.
pub fn apply_action(session: &mut EditorSession, action: &Action) {
    log::trace!("Action: {:?}", action);
    match action {
        Action::SelectTool { tool } => session.set_tool(*tool),
        Action::BubbleKind { kind } => session.set_bubble_kind(*kind),
        Action::PointerDown { x, y, shift } => {
            session.canvas_pointer_down(Point::new(*x, *y), modifiers(*shift));
        }
        Action::PointerMove { x, y, shift } => {
            session.canvas_pointer_move(Point::new(*x, *y), modifiers(*shift));
        }
        Action::PointerUp { x, y } => session.canvas_pointer_up(Point::new(*x, *y)),
        Action::Key { key } => session.key_down(&Key::from_dom(key)),
        Action::SetText { text } => match session.selection() {
            Some(id) => {
                if !session.set_text(id, text.as_str()) {
                    log::warn!("Selected element {} does not hold text", id);
                }
            }
            None => log::warn!("set_text with nothing selected"),
        },
        Action::Undo => {
            session.undo();
        }
        Action::Redo => {
            session.redo();
        }
        Action::BringToFront => {
            if let Some(id) = session.selection() {
                session.bring_to_front(id);
            }
        }
        Action::SendToBack => {
            if let Some(id) = session.selection() {
                session.send_to_back(id);
            }
        }
    }
}

fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), AppError> {
    fs::write(path, contents).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Replay the input page and write the requested outputs.
pub fn run(cli: &Cli) -> Result<(), AppError> {
    let page = PageFile::load(&cli.input)?;
    log::info!("Replaying {} actions from {}", page.actions.len(), cli.input.display());
    let session = page.replay();

    let handles = if cli.handles { session.handles() } else { Vec::new() };
    let options = PageRenderOptions {
        show_text_frames: cli.text_frames,
        ..PageRenderOptions::default()
    };
    let svg = render_svg(session.document(), &handles, &options)?;
    let output = cli.output_path();
    write(&output, &svg)?;
    log::info!("Wrote {}", output.display());

    if let Some(path) = &cli.save_page {
        let json = session.into_document().to_json()?;
        write(path, &json)?;
        log::info!("Saved page to {}", path.display());
    }
    Ok(())
}
