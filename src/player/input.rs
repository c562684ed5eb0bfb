use crossterm::event::{Event, KeyEvent, KeyEventKind};

use crate::config::matches_binding;

use super::state::StageState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Continue,
    Redraw,
    ToggleFullscreen,
    Quit,
}

pub fn handle_event(state: &mut StageState, event: Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(state, key),
        Event::Resize(_, _) => Action::Redraw,
        _ => Action::Continue,
    }
}

fn handle_key(state: &mut StageState, key: KeyEvent) -> Action {
    let bindings = state.config.key_bindings.clone();
    let is = |binding: &str| matches_binding(binding, &key);

    if is(&bindings.fullscreen) {
        return Action::ToggleFullscreen;
    }
    if is(&bindings.quit) {
        return Action::Quit;
    }

    if is(&bindings.toggle_play) {
        state.toggle_play();
    } else if is(&bindings.next_sprite) {
        state.next_sprite();
    } else if is(&bindings.new_sprite) {
        state.add_sprite();
    } else if is(&bindings.block_up) {
        state.move_block_cursor(-1);
    } else if is(&bindings.block_down) {
        state.move_block_cursor(1);
    } else if is(&bindings.palette_prev) {
        state.cycle_palette(-1);
    } else if is(&bindings.palette_next) {
        state.cycle_palette(1);
    } else if is(&bindings.add_block) {
        state.add_palette_block();
    } else if is(&bindings.remove_block) {
        state.remove_selected_block();
    } else if is(&bindings.increase) {
        state.nudge_selected_block(1.0);
    } else if is(&bindings.decrease) {
        state.nudge_selected_block(-1.0);
    } else if is(&bindings.click_block) {
        state.click_selected_block();
    } else {
        return Action::Continue;
    }
    Action::Redraw
}
