/// Requests the menu makes of the rest of the program.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    StartLevel(String),
    SetResolution { width: u32, height: u32 },
    ToggleFullscreen,
    MusicVolume(f32),
    SfxVolume(f32),
    Exit,
}
