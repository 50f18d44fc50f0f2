//! Key bindings: arrows and vim-style hjkl.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use puyotui::Difficulty;

/// Action from a key press. Menu screens reinterpret `Rotate`/`SoftDrop` as
/// up/down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Confirm,
    Pause,
    Restart,
    Menu,
    Difficulty(Difficulty),
    Quit,
    None,
}

pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char('m' | 'M') => Action::Menu,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Up | KeyCode::Char('k' | ' ') => Action::Rotate,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char(c @ '1'..='3') => Difficulty::from_slot(c as u8 - b'0')
            .map_or(Action::None, Action::Difficulty),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Action {
        key_to_action(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_arrows_and_vim_keys_agree() {
        assert_eq!(press(KeyCode::Left), press(KeyCode::Char('h')));
        assert_eq!(press(KeyCode::Right), press(KeyCode::Char('l')));
        assert_eq!(press(KeyCode::Down), press(KeyCode::Char('j')));
        assert_eq!(press(KeyCode::Up), Action::Rotate);
        assert_eq!(press(KeyCode::Char(' ')), Action::Rotate);
    }

    #[test]
    fn test_number_keys_pick_difficulty() {
        assert_eq!(
            press(KeyCode::Char('1')),
            Action::Difficulty(Difficulty::Beginner)
        );
        assert_eq!(
            press(KeyCode::Char('3')),
            Action::Difficulty(Difficulty::Advanced)
        );
        assert_eq!(press(KeyCode::Char('4')), Action::None);
    }

    #[test]
    fn test_ctrl_c_quits_and_other_chords_are_ignored() {
        let ctrl = |c| key_to_action(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
        assert_eq!(ctrl('c'), Action::Quit);
        assert_eq!(ctrl('r'), Action::None);
    }
}
