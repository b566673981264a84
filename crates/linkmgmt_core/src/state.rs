use std::time::Duration;

use ratatui::text::Text;

use crate::flows::{AddLinkFlow, MainMenu, ManageLinksFlow};
use crate::screen::{Destination, FlowContext, FlowExit, FlowOutcome};
use crate::{Effect, JobIdAllocator, Msg, Viewport, ViewportConfig};

/// Screen the program opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Launch {
    #[default]
    Menu,
    AddLink,
    ManageLinks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub scrape_timeout: Duration,
    pub launch: Launch,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scrape_timeout: Duration::from_secs(30),
            launch: Launch::Menu,
        }
    }
}

/// Terminal size as last reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveScreen {
    Menu(Viewport<MainMenu>),
    AddLink(Viewport<AddLinkFlow>),
    ManageLinks(Viewport<ManageLinksFlow>),
}

impl ActiveScreen {
    fn menu(geometry: Geometry) -> Self {
        ActiveScreen::Menu(Viewport::new(
            MainMenu::new(),
            ViewportConfig::new("Link Management").without_menu(),
            geometry.width,
            geometry.height,
        ))
    }

    fn open(destination: Destination, geometry: Geometry) -> Self {
        match destination {
            Destination::AddLink => ActiveScreen::AddLink(Viewport::new(
                AddLinkFlow::new(),
                ViewportConfig::new("Add Link"),
                geometry.width,
                geometry.height,
            )),
            Destination::ManageLinks => ActiveScreen::ManageLinks(Viewport::new(
                ManageLinksFlow::new(),
                ViewportConfig::new("Manage Links"),
                geometry.width,
                geometry.height,
            )),
        }
    }

    fn init(&mut self) -> Vec<Effect> {
        match self {
            ActiveScreen::Menu(v) => v.init(),
            ActiveScreen::AddLink(v) => v.init(),
            ActiveScreen::ManageLinks(v) => v.init(),
        }
    }

    fn update(&mut self, msg: Msg, ctx: &mut FlowContext<'_>) -> FlowOutcome {
        match self {
            ActiveScreen::Menu(v) => v.update(msg, ctx),
            ActiveScreen::AddLink(v) => v.update(msg, ctx),
            ActiveScreen::ManageLinks(v) => v.update(msg, ctx),
        }
    }

    fn tick(&mut self) -> bool {
        match self {
            ActiveScreen::Menu(v) => v.tick(),
            ActiveScreen::AddLink(v) => v.tick(),
            ActiveScreen::ManageLinks(v) => v.tick(),
        }
    }

    fn teardown(&mut self) -> Vec<Effect> {
        match self {
            ActiveScreen::Menu(v) => v.teardown(),
            ActiveScreen::AddLink(v) => v.teardown(),
            ActiveScreen::ManageLinks(v) => v.teardown(),
        }
    }

    fn view(&self) -> Text<'static> {
        match self {
            ActiveScreen::Menu(v) => v.view(),
            ActiveScreen::AddLink(v) => v.view(),
            ActiveScreen::ManageLinks(v) => v.view(),
        }
    }

    pub fn is_menu(&self) -> bool {
        matches!(self, ActiveScreen::Menu(_))
    }
}

/// Root model: the active screen plus everything shared across screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    config: AppConfig,
    geometry: Geometry,
    screen: ActiveScreen,
    job_ids: JobIdAllocator,
    quit: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let geometry = Geometry::default();
        let screen = match config.launch {
            Launch::Menu => ActiveScreen::menu(geometry),
            Launch::AddLink => ActiveScreen::open(Destination::AddLink, geometry),
            Launch::ManageLinks => ActiveScreen::open(Destination::ManageLinks, geometry),
        };
        Self {
            config,
            geometry,
            screen,
            job_ids: JobIdAllocator::default(),
            quit: false,
            dirty: true,
        }
    }

    /// Effects the initial screen needs before the first key press.
    pub fn init(&mut self) -> Vec<Effect> {
        self.screen.init()
    }

    pub fn screen(&self) -> &ActiveScreen {
        &self.screen
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn view(&self) -> Text<'static> {
        self.screen.view()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Returns whether a redraw is needed and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub(crate) fn tick(&mut self) -> bool {
        self.screen.tick()
    }

    pub(crate) fn dispatch(&mut self, msg: Msg) -> FlowOutcome {
        let mut ctx = FlowContext {
            job_ids: &mut self.job_ids,
            scrape_timeout: self.config.scrape_timeout,
        };
        self.screen.update(msg, &mut ctx)
    }

    /// Tears down the active screen and stops the program.
    pub(crate) fn quit(&mut self) -> Vec<Effect> {
        let mut effects = self.screen.teardown();
        self.quit = true;
        effects.push(Effect::Quit);
        effects
    }

    /// Applies a screen's exit request, returning effects for teardown and the next screen.
    pub(crate) fn apply_exit(&mut self, exit: FlowExit) -> Vec<Effect> {
        match exit {
            FlowExit::Quit => self.quit(),
            FlowExit::Done if self.config.launch != Launch::Menu => self.quit(),
            FlowExit::Done | FlowExit::Menu => {
                let mut effects = self.screen.teardown();
                self.screen = ActiveScreen::menu(self.geometry);
                effects.extend(self.screen.init());
                effects
            }
            FlowExit::Open(destination) => {
                let mut effects = self.screen.teardown();
                self.screen = ActiveScreen::open(destination, self.geometry);
                effects.extend(self.screen.init());
                effects
            }
        }
    }
}
