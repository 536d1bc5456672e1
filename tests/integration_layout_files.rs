use std::fs;

use indoc::indoc;
use viewport_manager::layout::{CameraMode, HudClass, LayoutDefinition, PawnClass, PlayerSlot};
use viewport_manager::settings::DefaultLayoutSource;
use viewport_manager::{
    HeadlessHost, LayoutPreset, ViewportCompositor, ViewportError, ViewportManagerSettings,
    quick_setup,
};

const ARENA_JSON: &str = indoc! {r#"
    {
      "name": "Arena",
      "auto_spawn_players": false,
      "panes": [
        {
          "player_slot": 0,
          "rect": { "origin": [0.0, 0.0], "size": [0.5, 1.0] },
          "hud_class": "ScoreHud"
        },
        {
          "player_slot": 1,
          "rect": { "origin": [0.5, 0.0], "size": [0.5, 1.0] },
          "camera_mode": "free",
          "receives_keyboard_mouse": false
        }
      ]
    }
"#};

#[test]
fn layout_file_loads_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arena.json");
    fs::write(&path, ARENA_JSON).unwrap();

    let layout = LayoutDefinition::load(&path).unwrap();
    assert_eq!(layout.display_name(), "Arena");
    assert!(!layout.auto_spawn_players);
    assert_eq!(layout.panes.len(), 2);
    assert_eq!(layout.panes[0].hud_class, Some(HudClass::new("ScoreHud")));
    assert_eq!(layout.panes[0].orbit_distance, 500.0);
    assert_eq!(layout.panes[1].camera_mode, CameraMode::Free);
    assert!(!layout.panes[1].receives_keyboard_mouse);
    assert!(layout.validate().is_empty());
}

#[test]
fn saved_layout_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quad.json");
    let layout = quick_setup(4, true, Some(HudClass::new("PlayerHud"))).unwrap();
    layout.save(&path).unwrap();

    assert_eq!(LayoutDefinition::load(&path).unwrap(), layout);
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.json");
    match LayoutDefinition::load(&path) {
        Err(ViewportError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn settings_resolve_relative_layout_paths() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("layouts")).unwrap();
    fs::write(dir.path().join("layouts/arena.json"), ARENA_JSON).unwrap();
    let settings_path = dir.path().join("viewports.toml");
    fs::write(
        &settings_path,
        indoc! {r#"
            auto_add_missing_players = false

            [default_layout]
            path = "layouts/arena.json"
        "#},
    )
    .unwrap();

    let settings = ViewportManagerSettings::load(&settings_path).unwrap();
    assert!(!settings.auto_add_missing_players);
    assert_eq!(
        settings.default_layout,
        Some(DefaultLayoutSource::File {
            path: dir.path().join("layouts/arena.json")
        })
    );

    // Neither the settings nor the layout allow creating players, so only
    // players that already exist get a viewport.
    let mut host = HeadlessHost::new(1920, 1080);
    host.ensure_players(1);
    let mut compositor = ViewportCompositor::with_settings(host, &settings);
    let report = compositor.apply_default_layout(&settings).unwrap().unwrap();
    assert_eq!(report.panes_applied, 2);
    assert_eq!(report.provisioning_failures.len(), 1);
    assert_eq!(report.provisioning_failures[0].slot(), PlayerSlot::new(1));
    assert_eq!(compositor.local_player_count(), 1);
    assert!(!compositor.is_player_slot_valid(PlayerSlot::new(1)));
    assert_eq!(
        compositor.pawn(PlayerSlot::new(0)).map(|pawn| pawn.class()),
        Some(PawnClass::Orbit)
    );
}

#[test]
fn default_layout_can_be_disabled() {
    let settings = ViewportManagerSettings {
        apply_default_layout_on_start: false,
        ..ViewportManagerSettings::default()
    }
    .with_default_preset(LayoutPreset::FourPlayerGrid);
    let mut compositor = ViewportCompositor::with_settings(HeadlessHost::new(800, 600), &settings);
    assert!(compositor.apply_default_layout(&settings).unwrap().is_none());
    assert!(compositor.state().active_layout().is_none());
}

#[test]
fn broken_default_layout_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"panes\": [ ").unwrap();
    let settings = ViewportManagerSettings::default().with_default_layout_file(&path);

    let mut compositor = ViewportCompositor::with_settings(HeadlessHost::new(800, 600), &settings);
    let err = compositor.apply_default_layout(&settings).unwrap_err();
    assert!(matches!(err, ViewportError::LayoutFormat(_)));
    assert!(compositor.state().active_layout().is_none());
}

#[test]
fn settings_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("viewports.toml");
    let settings = ViewportManagerSettings {
        click_to_focus: false,
        focus_highlighting: true,
        ..ViewportManagerSettings::default()
    }
    .with_default_preset(LayoutPreset::PictureInPicture);
    fs::write(&path, settings.to_toml_string().unwrap()).unwrap();

    let loaded = ViewportManagerSettings::load(&path).unwrap();
    assert_eq!(loaded, settings);

    let compositor = ViewportCompositor::with_settings(HeadlessHost::new(800, 600), &loaded);
    assert!(!compositor.is_click_to_focus_enabled());
    assert!(compositor.is_focus_highlighting_enabled());
}

#[test]
fn quick_setup_rejects_unsupported_counts() {
    assert!(matches!(
        quick_setup(3, true, None),
        Err(ViewportError::UnsupportedPlayerCount(3))
    ));
    let stacked = quick_setup(2, false, None).unwrap();
    assert_eq!(stacked.panes[1].rect.origin.y, 0.5);
    assert_eq!(stacked.panes[1].rect.size.x, 1.0);
}
