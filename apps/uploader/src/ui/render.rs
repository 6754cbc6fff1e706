use std::fmt::Write as _;

use shared::domain::{Athlete, AthleteId, Race, RaceId};
use uploader_core::UploaderView;

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

pub fn render_view(view: &UploaderView) -> String {
    let mut out = String::new();

    let athlete = match (&view.athlete_name, &view.athlete_id) {
        (Some(name), Some(id)) => format!("{name} ({id})"),
        _ => "-".to_string(),
    };
    let _ = writeln!(out, "athlete : {athlete}");

    let race = view.race_name.as_deref().unwrap_or("-");
    let _ = writeln!(out, "race    : {race}");

    match (&view.preview, view.preview_caption()) {
        (Some(preview), Some(caption)) => {
            let _ = writeln!(out, "photo   : {caption} <{preview}>");
        }
        _ => {
            let _ = writeln!(out, "photo   : none");
        }
    }
    if let Some(name) = &view.attachment_name {
        let _ = writeln!(out, "file    : {name}");
    }

    if view.saving {
        let _ = writeln!(out, "status  : Saving...");
    } else if let Some(message) = view.status_message.filter(|_| view.status_visible) {
        let _ = writeln!(out, "status  : {message}");
    }

    let _ = writeln!(
        out,
        "actions : attach [{}] save [{}] clear [{}]",
        on_off(view.attach_enabled),
        on_off(view.save_enabled),
        on_off(view.show_clear)
    );
    out
}

pub fn render_athletes(athletes: &[&Athlete], selected: Option<&AthleteId>) -> String {
    if athletes.is_empty() {
        return "No athletes found\n".to_string();
    }
    let mut out = String::new();
    for athlete in athletes {
        let marker = if Some(&athlete.id) == selected { '*' } else { ' ' };
        let photo = if athlete.existing_photo.is_some() {
            " (photo)"
        } else {
            ""
        };
        let _ = writeln!(out, "{marker} {:<10} {}{photo}", athlete.id, athlete.name);
    }
    out
}

pub fn render_races(races: &[Race], selected: Option<&RaceId>) -> String {
    if races.is_empty() {
        return "No races available\n".to_string();
    }
    let mut out = String::new();
    for race in races {
        let marker = if Some(&race.id) == selected { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {:<20} {}", race.id, race.name);
    }
    out
}
