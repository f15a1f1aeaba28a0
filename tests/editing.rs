// End-to-end editing flows through the model, with prompts answered the
// way a user would type them.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tempfile::tempdir;
use tweak::domain::{Message, TweakConfig};
use tweak::model::{Model, Modus, Status};

fn test_model() -> Model {
    Model::init(&TweakConfig::default(), 80, 24)
}

fn press(model: &mut Model, code: KeyCode) {
    model.update(Message::RawKey(KeyEvent::from(code))).unwrap();
}

fn answer(model: &mut Model, s: &str) {
    for chr in s.chars() {
        press(model, KeyCode::Char(chr));
    }
    press(model, KeyCode::Enter);
}

fn add_field(model: &mut Model, name: &str) {
    model.update(Message::AddField).unwrap();
    answer(model, name);
}

fn add_row(model: &mut Model, values: &[&str]) {
    model.update(Message::AddRow).unwrap();
    for value in values {
        answer(model, value);
    }
}

#[test]
fn build_edit_save_and_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let mut model = test_model();
    add_field(&mut model, "name");
    add_field(&mut model, "age");
    add_row(&mut model, &["Ann", "30"]);
    add_row(&mut model, &["Bob", "41"]);

    // Ctrl+Shift+C flow: column, 1-based row, value
    model.update(Message::AddCellValue).unwrap();
    answer(&mut model, "age");
    answer(&mut model, "1");
    answer(&mut model, "31");
    assert_eq!(model.table().cell(0, "age").unwrap(), "31");

    model.update(Message::DeleteRow).unwrap();
    answer(&mut model, "2");
    assert_eq!(model.table().nrows(), 1);

    model.update(Message::SaveFileAs).unwrap();
    answer(&mut model, path.to_str().unwrap());
    assert_eq!(model.modus(), Modus::POPUP);
    model.update(Message::Exit).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("name,age"));
    assert!(written.contains("Ann,31"));

    // Reopen through the Open prompt in a fresh editor
    let mut reopened = test_model();
    reopened.update(Message::OpenFile).unwrap();
    answer(&mut reopened, path.to_str().unwrap());
    assert_eq!(reopened.modus(), Modus::TABLE);
    assert_eq!(reopened.table().nrows(), 1);
    assert_eq!(reopened.table().cell(0, "name").unwrap(), "Ann");
    assert_eq!(reopened.get_uidata().name, "out.csv");
}

#[test]
fn save_without_a_path_falls_back_to_save_as() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.csv");

    let mut model = test_model();
    add_field(&mut model, "name");

    model.update(Message::SaveFile).unwrap();
    // no file association yet, so a path prompt opens
    assert_eq!(model.modus(), Modus::PROMPT);
    answer(&mut model, path.to_str().unwrap());
    model.update(Message::Exit).unwrap();

    assert!(path.exists());
    assert_eq!(model.filepath(), Some(path.as_path()));
}

#[test]
fn delete_cell_value_clears_only_that_cell() {
    let mut model = test_model();
    add_field(&mut model, "name");
    add_field(&mut model, "age");
    add_row(&mut model, &["Ann", "30"]);

    model.update(Message::DeleteCellValue).unwrap();
    answer(&mut model, "age");
    answer(&mut model, "1");

    assert_eq!(model.table().cell(0, "age").unwrap(), "");
    assert_eq!(model.table().cell(0, "name").unwrap(), "Ann");
    assert_eq!(model.table().nrows(), 1);
}

#[test]
fn failed_open_keeps_the_current_table() {
    let dir = tempdir().unwrap();

    let mut model = test_model();
    add_field(&mut model, "name");
    add_row(&mut model, &["Ann"]);

    model.update(Message::OpenFile).unwrap();
    answer(&mut model, dir.path().join("nope.csv").to_str().unwrap());

    assert_eq!(model.modus(), Modus::POPUP);
    model.update(Message::Exit).unwrap();
    assert_eq!(model.table().nrows(), 1);
    assert_eq!(model.table().cell(0, "name").unwrap(), "Ann");
    assert!(model.filepath().is_none());
}

#[test]
fn quit_message_ends_the_session() {
    let mut model = test_model();
    model.update(Message::Quit).unwrap();
    assert_eq!(model.status, Status::QUITTING);
}
