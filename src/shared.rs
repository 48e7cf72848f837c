// Vocabulary shared between the tui and the middle layer.
//
// The tui resolves key presses into InputEvents and renders whatever
// DisplayState the middle layer hands it; all jukebox state lives in middle.

use seqtone::AudioMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Sequence,
    Song,
    SfxSong, // structured song flagged "sfx": true
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Sequence => "seq",
            EntryKind::Song => "song",
            EntryKind::SfxSong => "sfx",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // list navigation (arrows, j/k)
    SelectPrev,
    SelectNext,

    // play the selected entry (enter = music, s = sfx)
    PlayMusic,
    PlaySfx,

    // transpose the root note (- / =)
    RootDown,
    RootUp,

    // "m" cycles on -> music -> sfx -> off
    CycleMode,

    // "x" stops both channels
    StopAll,

    // quit button (esc)
    Quit,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub entries: Vec<Entry>,
    pub selected: usize,
    pub mode: AudioMode,
    pub root_name: String,
    pub music_active: usize, // live tones per channel
    pub sfx_active: usize,
    pub device_ready: bool,
    pub clock: f64,
    pub status: String, // last thing that happened, shown at the bottom
}
