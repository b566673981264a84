use crate::{AppState, Effect, Geometry, Key, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.should_quit() {
        return (state, Vec::new());
    }
    let effects = match msg {
        Msg::Key(Key::Ctrl('c')) => {
            state.mark_dirty();
            state.quit()
        }
        Msg::Resize { width, height } => {
            state.set_geometry(Geometry { width, height });
            forward(&mut state, Msg::Resize { width, height })
        }
        Msg::Tick => {
            if state.tick() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
        msg @ (Msg::Key(_)
        | Msg::LinksLoaded(_)
        | Msg::LinkCreated(_)
        | Msg::LinkUpdated(_)
        | Msg::LinkDeleted(_)
        | Msg::ScrapeProgress { .. }
        | Msg::ScrapeFinished { .. }) => forward(&mut state, msg),
    };

    (state, effects)
}

/// Hands a message to the active screen and applies whatever it asks for.
fn forward(state: &mut AppState, msg: Msg) -> Vec<Effect> {
    let outcome = state.dispatch(msg);
    state.mark_dirty();
    let mut effects = outcome.effects;
    if let Some(exit) = outcome.exit {
        effects.extend(state.apply_exit(exit));
    }
    effects
}
