use glam::Vec2;
use log::{debug, info};

use crate::command::UiCommand;
use crate::input::Key;

pub const RESOLUTIONS: [&str; 3] = ["1920x1080", "1280x720", "800x600"];

const TEXT_SCALE: f32 = 0.1;
const SLIDER_SCALE: f32 = 0.3;
const VOLUME_STEP: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    LevelSelect,
    Options,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Music,
    Sfx,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonAction {
    Goto(Screen),
    StartLevel(String),
    ToggleFullscreen,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Label,
    Button(ButtonAction),
    Slider { min: f32, max: f32, value: f32, channel: Channel },
    OptionMenu { items: Vec<String>, selected: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub text: String,
    /// Centre in aspect-corrected screen units: x spans [-aspect, aspect], y [-1, 1].
    pub pos: Vec2,
    pub scale: f32,
    pub kind: WidgetKind,
}

impl Widget {
    fn label(text: &str, y: f32) -> Self {
        Self {
            text: text.to_string(),
            pos: Vec2::new(0.0, y),
            scale: TEXT_SCALE,
            kind: WidgetKind::Label,
        }
    }

    fn button(text: &str, y: f32, action: ButtonAction) -> Self {
        Self {
            text: text.to_string(),
            pos: Vec2::new(0.0, y),
            scale: TEXT_SCALE,
            kind: WidgetKind::Button(action),
        }
    }

    fn slider(text: &str, y: f32, value: f32, channel: Channel) -> Self {
        Self {
            text: text.to_string(),
            pos: Vec2::new(0.0, y),
            scale: SLIDER_SCALE,
            kind: WidgetKind::Slider {
                min: 0.0,
                max: 100.0,
                value,
                channel,
            },
        }
    }

    pub fn is_interactive(&self) -> bool {
        !matches!(self.kind, WidgetKind::Label)
    }

    /// Text as shown, including slider values and the selected option.
    pub fn caption(&self) -> String {
        match &self.kind {
            WidgetKind::Slider { value, .. } => format!("{}: {:.0}", self.text, value),
            WidgetKind::OptionMenu { items, selected } => format!("{}: {}", self.text, items[*selected]),
            _ => self.text.clone(),
        }
    }

    /// Half size in screen units, roughly the footprint of the caption.
    pub fn half_size(&self) -> Vec2 {
        match self.kind {
            WidgetKind::Slider { .. } => Vec2::new(self.scale, self.scale * 0.12),
            _ => {
                let chars = self.caption().chars().count().max(4) as f32;
                Vec2::new(chars * self.scale * 0.28, self.scale * 0.6)
            }
        }
    }

    /// Filled fraction for sliders, `None` for everything else.
    pub fn fill(&self) -> Option<f32> {
        match self.kind {
            WidgetKind::Slider { min, max, value, .. } => Some(((value - min) / (max - min)).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}

/// Values that survive leaving and re-entering the options screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub resolution: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 50.0,
            sfx_volume: 50.0,
            resolution: 0,
        }
    }
}

pub fn parse_resolution(text: &str) -> Option<(u32, u32)> {
    let (w, h) = text.split_once('x')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

#[derive(Debug)]
pub struct UiManager {
    screen: Screen,
    widgets: Vec<Widget>,
    focus: Option<usize>,
    visible: bool,
    levels: Vec<String>,
    settings: Settings,
}

impl UiManager {
    pub fn new(levels: Vec<String>) -> Self {
        let mut ui = Self {
            screen: Screen::MainMenu,
            widgets: Vec::new(),
            focus: None,
            visible: true,
            levels,
            settings: Settings::default(),
        };
        ui.show(Screen::MainMenu);
        ui
    }

    #[cfg(test)]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.focus
    }

    pub fn focused(&self) -> Option<&Widget> {
        self.focus.map(|i| &self.widgets[i])
    }

    #[cfg(test)]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn hide(&mut self) {
        self.clear();
        self.visible = false;
    }

    /// Rebuilds `screen` from scratch, destroying the current widgets first.
    pub fn show(&mut self, screen: Screen) {
        self.clear();
        self.visible = true;
        self.screen = screen;
        match screen {
            Screen::MainMenu => self.main_menu(),
            Screen::LevelSelect => self.level_selection(),
            Screen::Options => self.options_menu(),
            Screen::Leaderboard => self.leaderboard(),
        }
        self.focus = self.widgets.iter().position(Widget::is_interactive);
        info!("menu: {:?}", screen);
    }

    fn clear(&mut self) {
        self.widgets.clear();
        self.focus = None;
    }

    fn main_menu(&mut self) {
        self.widgets = vec![
            Widget::label("My 3D Platformer", 0.8),
            Widget::button("Play", 0.5, ButtonAction::Goto(Screen::LevelSelect)),
            Widget::button("Options", 0.3, ButtonAction::Goto(Screen::Options)),
            Widget::button("Leaderboard", 0.1, ButtonAction::Goto(Screen::Leaderboard)),
            Widget::button("Exit", -0.1, ButtonAction::Exit),
        ];
    }

    fn level_selection(&mut self) {
        self.widgets = self
            .levels
            .iter()
            .enumerate()
            .map(|(i, name)| Widget::button(name, 0.5 - i as f32 * 0.2, ButtonAction::StartLevel(name.clone())))
            .collect();
        self.widgets
            .push(Widget::button("Back", -0.5, ButtonAction::Goto(Screen::MainMenu)));
    }

    fn options_menu(&mut self) {
        let s = self.settings;
        self.widgets = vec![
            Widget::label("Audio Settings", 0.6),
            Widget::slider("Music", 0.4, s.music_volume, Channel::Music),
            Widget::slider("SFX", 0.2, s.sfx_volume, Channel::Sfx),
            Widget::label("Video Settings", -0.1),
            Widget {
                text: "Resolution".to_string(),
                pos: Vec2::new(0.0, -0.3),
                scale: TEXT_SCALE,
                kind: WidgetKind::OptionMenu {
                    items: RESOLUTIONS.iter().map(|r| r.to_string()).collect(),
                    selected: s.resolution,
                },
            },
            Widget::button("Toggle Fullscreen", -0.5, ButtonAction::ToggleFullscreen),
            Widget::button("Back", -0.7, ButtonAction::Goto(Screen::MainMenu)),
        ];
    }

    fn leaderboard(&mut self) {
        self.widgets = vec![
            Widget::label("Leaderboard (Not Implemented)", 0.5),
            Widget::button("Back", -0.5, ButtonAction::Goto(Screen::MainMenu)),
        ];
    }

    /// Feeds this tick's key presses to the menu.
    pub fn handle_keys(&mut self, keys: &[Key]) -> Vec<UiCommand> {
        let mut out = Vec::new();
        for key in keys {
            if !self.visible {
                break;
            }
            let cmd = match key {
                Key::Forward => {
                    self.move_focus(-1);
                    None
                }
                Key::Backward => {
                    self.move_focus(1);
                    None
                }
                Key::Left => self.adjust(-1),
                Key::Right => self.adjust(1),
                Key::Confirm | Key::Jump => self.activate(),
                Key::Back if self.screen != Screen::MainMenu => {
                    self.show(Screen::MainMenu);
                    None
                }
                _ => None,
            };
            out.extend(cmd);
        }
        out
    }

    fn move_focus(&mut self, delta: i32) {
        let Some(current) = self.focus else {
            return;
        };
        let n = self.widgets.len() as i32;
        let mut i = current as i32;
        for _ in 0..n {
            i = (i + delta).rem_euclid(n);
            if self.widgets[i as usize].is_interactive() {
                self.focus = Some(i as usize);
                debug!("focus: {}", self.widgets[i as usize].caption());
                return;
            }
        }
    }

    /// Presses the focused widget.
    pub fn activate(&mut self) -> Option<UiCommand> {
        let widget = self.focused()?.clone();
        match widget.kind {
            WidgetKind::Label | WidgetKind::Slider { .. } => None,
            WidgetKind::OptionMenu { .. } => self.adjust(1),
            WidgetKind::Button(action) => match action {
                ButtonAction::Goto(screen) => {
                    self.show(screen);
                    None
                }
                ButtonAction::StartLevel(name) => {
                    info!("starting {name}");
                    self.hide();
                    Some(UiCommand::StartLevel(name))
                }
                ButtonAction::ToggleFullscreen => Some(UiCommand::ToggleFullscreen),
                ButtonAction::Exit => Some(UiCommand::Exit),
            },
        }
    }

    /// Nudges the focused slider or cycles the focused option menu.
    fn adjust(&mut self, dir: i32) -> Option<UiCommand> {
        let i = self.focus?;
        let settings = &mut self.settings;
        match &mut self.widgets[i].kind {
            WidgetKind::Slider {
                min,
                max,
                value,
                channel,
            } => {
                *value = (*value + dir as f32 * VOLUME_STEP).clamp(*min, *max);
                let v = *value;
                match channel {
                    Channel::Music => {
                        settings.music_volume = v;
                        info!("music volume: {v}");
                        Some(UiCommand::MusicVolume(v))
                    }
                    Channel::Sfx => {
                        settings.sfx_volume = v;
                        info!("sfx volume: {v}");
                        Some(UiCommand::SfxVolume(v))
                    }
                }
            }
            WidgetKind::OptionMenu { items, selected } => {
                let n = items.len() as i32;
                *selected = (*selected as i32 + dir).rem_euclid(n) as usize;
                settings.resolution = *selected;
                let item = &items[*selected];
                info!("resolution: {item}");
                parse_resolution(item).map(|(width, height)| UiCommand::SetResolution { width, height })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui() -> UiManager {
        UiManager::new(vec!["Level 1".into(), "Level 2".into(), "Level 3".into()])
    }

    fn focus_text(ui: &UiManager) -> String {
        ui.focused().unwrap().text.clone()
    }

    #[test]
    fn main_menu_layout() {
        let ui = ui();
        assert_eq!(ui.screen(), Screen::MainMenu);
        let texts: Vec<&str> = ui.widgets().iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["My 3D Platformer", "Play", "Options", "Leaderboard", "Exit"]);
        // title is a label, focus starts on the first button
        assert_eq!(focus_text(&ui), "Play");
    }

    #[test]
    fn focus_skips_labels_and_wraps() {
        let mut ui = ui();
        ui.handle_keys(&[Key::Forward]);
        assert_eq!(focus_text(&ui), "Exit");
        ui.handle_keys(&[Key::Backward]);
        assert_eq!(focus_text(&ui), "Play");
    }

    #[test]
    fn play_leads_to_level_buttons() {
        let mut ui = ui();
        assert!(ui.handle_keys(&[Key::Confirm]).is_empty());
        assert_eq!(ui.screen(), Screen::LevelSelect);
        let texts: Vec<&str> = ui.widgets().iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["Level 1", "Level 2", "Level 3", "Back"]);
    }

    #[test]
    fn choosing_a_level_hides_menu() {
        let mut ui = ui();
        let cmds = ui.handle_keys(&[Key::Confirm, Key::Backward, Key::Confirm]);
        assert_eq!(cmds, vec![UiCommand::StartLevel("Level 2".into())]);
        assert!(!ui.is_visible());
        assert!(ui.widgets().is_empty());
    }

    #[test]
    fn keys_after_hide_are_ignored() {
        let mut ui = ui();
        let cmds = ui.handle_keys(&[Key::Confirm, Key::Confirm, Key::Confirm]);
        assert_eq!(cmds.len(), 1);
    }

    #[test]
    fn back_returns_to_main_menu() {
        let mut ui = ui();
        ui.handle_keys(&[Key::Backward, Key::Confirm]);
        assert_eq!(ui.screen(), Screen::Options);
        ui.handle_keys(&[Key::Back]);
        assert_eq!(ui.screen(), Screen::MainMenu);
    }

    #[test]
    fn exit_button_requests_exit() {
        let mut ui = ui();
        let cmds = ui.handle_keys(&[Key::Forward, Key::Confirm]);
        assert_eq!(cmds, vec![UiCommand::Exit]);
    }

    #[test]
    fn sliders_adjust_and_clamp() {
        let mut ui = ui();
        ui.show(Screen::Options);
        assert_eq!(focus_text(&ui), "Music");
        let cmds = ui.handle_keys(&[Key::Right, Key::Right]);
        assert_eq!(cmds, vec![UiCommand::MusicVolume(55.0), UiCommand::MusicVolume(60.0)]);

        let lefts = vec![Key::Left; 30];
        let cmds = ui.handle_keys(&lefts);
        assert_eq!(cmds.last(), Some(&UiCommand::MusicVolume(0.0)));
        assert_eq!(ui.settings().music_volume, 0.0);
        assert_eq!(ui.focused().unwrap().fill(), Some(0.0));
    }

    #[test]
    fn settings_survive_screen_changes() {
        let mut ui = ui();
        ui.show(Screen::Options);
        ui.handle_keys(&[Key::Backward, Key::Left]);
        assert_eq!(ui.settings().sfx_volume, 45.0);
        ui.show(Screen::MainMenu);
        ui.show(Screen::Options);
        assert_eq!(ui.widgets()[2].caption(), "SFX: 45");
    }

    #[test]
    fn resolution_menu_cycles() {
        let mut ui = ui();
        ui.show(Screen::Options);
        ui.handle_keys(&[Key::Backward, Key::Backward]);
        assert_eq!(focus_text(&ui), "Resolution");

        let cmds = ui.handle_keys(&[Key::Confirm]);
        assert_eq!(cmds, vec![UiCommand::SetResolution { width: 1280, height: 720 }]);
        let cmds = ui.handle_keys(&[Key::Left, Key::Left]);
        assert_eq!(
            cmds,
            vec![
                UiCommand::SetResolution { width: 1920, height: 1080 },
                UiCommand::SetResolution { width: 800, height: 600 },
            ]
        );
        assert_eq!(ui.settings().resolution, 2);
    }

    #[test]
    fn fullscreen_button() {
        let mut ui = ui();
        ui.show(Screen::Options);
        let cmds = ui.handle_keys(&[Key::Forward, Key::Forward, Key::Confirm]);
        assert_eq!(cmds, vec![UiCommand::ToggleFullscreen]);
    }

    #[test]
    fn leaderboard_only_offers_back() {
        let mut ui = ui();
        ui.show(Screen::Leaderboard);
        assert_eq!(ui.widgets().iter().filter(|w| w.is_interactive()).count(), 1);
        assert_eq!(focus_text(&ui), "Back");
        ui.handle_keys(&[Key::Confirm]);
        assert_eq!(ui.screen(), Screen::MainMenu);
    }

    #[test]
    fn resolution_strings_parse() {
        assert_eq!(parse_resolution("1920x1080"), Some((1920, 1080)));
        assert_eq!(parse_resolution("wide"), None);
    }
}
