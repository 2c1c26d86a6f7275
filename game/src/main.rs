mod cube;
mod demo;
mod settings;

use std::cell::RefCell;
use std::rc::Rc;

use engine::{resource_dir, DebugLog, EngineContext, Module, VideoConfig};
use log::error;

use crate::demo::DemoGame;
use crate::settings::DemoSettings;

const SETTINGS_FILE: &str = "demo.toml";

fn main() -> anyhow::Result<()> {
    engine::logging::init();

    let settings = DemoSettings::load_or_default(SETTINGS_FILE).unwrap_or_else(|err| {
        error!("{err}, using built-in settings");
        DemoSettings::default()
    });

    let mut log = DebugLog::new(settings.log_file.clone());
    log.set_level(settings.log_level);
    let log = Rc::new(RefCell::new(log));

    let mut video = VideoConfig::default();
    if !video.load_from(&settings.config_file) {
        let message = format!("{} not found", settings.config_file.display());
        log.borrow_mut().error(Module::Files, message);
    }

    let resources = resource_dir::locate(&settings.resource_dir);
    let title = settings.title.clone();
    let game = DemoGame::new(settings, resources, Rc::clone(&log));

    // ---- Create engine context (game owns this) ----
    let ctx = EngineContext::new(title, video, Box::new(game))?;
    ctx.run()?;
    Ok(())
}
