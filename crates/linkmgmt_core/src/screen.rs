use std::time::Duration;

use ratatui::text::Line;

use crate::{Effect, HelpItem, JobIdAllocator, Msg};

/// Position of the highlighted item of a list, in content lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub item_height: u16,
    pub list_header_height: u16,
}

impl Selection {
    /// First content line of the selected item.
    pub fn top(&self) -> usize {
        usize::from(self.list_header_height) + self.index * usize::from(self.item_height)
    }

    /// One past the last content line of the selected item.
    pub fn bottom(&self) -> usize {
        self.top() + usize::from(self.item_height)
    }
}

/// Screens reachable from the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    AddLink,
    ManageLinks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowExit {
    /// The flow finished normally.
    Done,
    /// The user asked for the main menu.
    Menu,
    /// Open another screen in place of this one.
    Open(Destination),
    /// Leave the program.
    Quit,
}

/// What a screen wants after handling one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowOutcome {
    pub effects: Vec<Effect>,
    pub exit: Option<FlowExit>,
}

impl FlowOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn effects(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            exit: None,
        }
    }

    pub fn exit(exit: FlowExit) -> Self {
        Self {
            effects: Vec::new(),
            exit: Some(exit),
        }
    }
}

/// Services the root state lends to a screen for one update.
#[derive(Debug)]
pub struct FlowContext<'a> {
    pub job_ids: &'a mut JobIdAllocator,
    pub scrape_timeout: Duration,
}

/// A step machine that can be hosted by a [`crate::Viewport`].
pub trait Screen {
    /// Effects to issue when the screen is first shown.
    fn init(&mut self) -> Vec<Effect> {
        Vec::new()
    }

    fn update(&mut self, msg: Msg, ctx: &mut FlowContext<'_>) -> FlowOutcome;

    /// Full content, top to bottom. The viewport decides which rows are visible.
    fn view(&self, width: u16) -> Vec<Line<'static>>;

    /// Key hint shown in the footer for the current step.
    fn hint(&self) -> &'static str;

    fn help(&self) -> &'static [HelpItem];

    fn selection(&self) -> Option<Selection> {
        None
    }

    /// True while a text field has focus, so printable keys belong to it.
    fn captures_text(&self) -> bool {
        false
    }

    /// Advances animations. Returns true when the view changed.
    fn tick(&mut self) -> bool {
        false
    }

    /// Releases background work before the screen is dropped.
    fn teardown(&mut self) -> Vec<Effect> {
        Vec::new()
    }
}
