//! Link management core: pure state machine, flows and the viewport wrapper.
//!
//! Nothing in this crate performs IO. Every external interaction is requested
//! as an [`Effect`] and its outcome comes back later as a [`Msg`].
mod effect;
pub mod flows;
mod help;
mod key;
mod msg;
mod scrape;
mod screen;
mod state;
pub mod styles;
mod text_input;
mod types;
mod update;
mod validation;
mod viewport;
mod widgets;

pub use effect::Effect;
pub use help::HelpItem;
pub use key::Key;
pub use msg::Msg;
pub use scrape::{JobIdAllocator, ScrapeTracker, ScrapeView};
pub use screen::{Destination, FlowContext, FlowExit, FlowOutcome, Screen, Selection};
pub use state::{ActiveScreen, AppConfig, AppState, Geometry, Launch};
pub use text_input::TextField;
pub use types::{
    ApiFailure, ApiFailureKind, JobId, Link, LinkDraft, LinkId, LinkPatch, ScrapeFailure,
    ScrapeFailureKind, ScrapeStage, ScrapedPage,
};
pub use update::update;
pub use validation::{validate_url, ValidationError};
pub use viewport::{scroll_offset_for, Viewport, ViewportConfig, ViewportState};
