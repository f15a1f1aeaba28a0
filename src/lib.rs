//! A terminal csv editor: a grid with a synchronized row-number panel,
//! edits through modal prompts, csv in and out through polars.

pub mod command;
pub mod controller;
pub mod domain;
pub mod inputter;
pub mod model;
pub mod table;
pub mod ui;
