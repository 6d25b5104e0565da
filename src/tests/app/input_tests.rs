use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::input::{KeyCommand, classify};

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

#[test]
fn control_chords_drive_the_wizard() {
    let ctrl = KeyModifiers::CONTROL;
    assert_eq!(classify(&key(KeyCode::Char('n'), ctrl)), KeyCommand::Next);
    assert_eq!(classify(&key(KeyCode::Char('b'), ctrl)), KeyCommand::Back);
    assert_eq!(classify(&key(KeyCode::Char('s'), ctrl)), KeyCommand::Save);
    assert_eq!(classify(&key(KeyCode::Char('d'), ctrl)), KeyCommand::Discard);
    assert_eq!(classify(&key(KeyCode::Char('q'), ctrl)), KeyCommand::Quit);
    assert_eq!(classify(&key(KeyCode::Char('c'), ctrl)), KeyCommand::Quit);
    assert_eq!(classify(&key(KeyCode::Char('z'), ctrl)), KeyCommand::None);
}

#[test]
fn alt_digits_jump_to_steps() {
    let alt = KeyModifiers::ALT;
    assert_eq!(classify(&key(KeyCode::Char('1'), alt)), KeyCommand::JumpTo(0));
    assert_eq!(classify(&key(KeyCode::Char('4'), alt)), KeyCommand::JumpTo(3));
    assert_eq!(classify(&key(KeyCode::Char('0'), alt)), KeyCommand::None);
}

#[test]
fn plain_keys_move_between_fields_or_edit() {
    let none = KeyModifiers::NONE;
    assert_eq!(classify(&key(KeyCode::Tab, none)), KeyCommand::NextField);
    assert_eq!(classify(&key(KeyCode::Enter, none)), KeyCommand::NextField);
    assert_eq!(
        classify(&key(KeyCode::BackTab, KeyModifiers::SHIFT)),
        KeyCommand::PrevField
    );
    assert_eq!(classify(&key(KeyCode::Esc, none)), KeyCommand::ResetStatus);
    let typed = key(KeyCode::Char('A'), KeyModifiers::SHIFT);
    assert_eq!(classify(&typed), KeyCommand::Edit(typed));
}
