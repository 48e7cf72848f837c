use seqtone::music::{parse_root, pitch_name};
use seqtone::{AudioManager, Channel, OutputDevice};

use crate::shared::{DisplayState, Entry, EntryKind, InputEvent};

const DEFAULT_ROOT: i32 = 60; // C4

// Owns the audio manager and the jukebox selection; turns input events into
// manager calls and produces what the tui should draw.
pub struct Middle<D: OutputDevice> {
    pub manager: AudioManager<D>,
    entries: Vec<Entry>,
    selected: usize,
    root: i32,
    status: String,
}

impl<D: OutputDevice> Middle<D> {
    pub fn new(manager: AudioManager<D>) -> Self {
        let data = manager.data();
        let mut entries: Vec<Entry> = data
            .sorted_song_names()
            .into_iter()
            .map(|name| Entry {
                name: name.to_string(),
                kind: if data.songs[name].is_sfx() { EntryKind::SfxSong } else { EntryKind::Song },
            })
            .collect();
        entries.extend(data.sorted_sequence_names().into_iter().map(|name| Entry {
            name: name.to_string(),
            kind: EntryKind::Sequence,
        }));
        let status = if entries.is_empty() {
            "no music data loaded".to_string()
        } else {
            format!("{} entries", entries.len())
        };
        Self {
            manager,
            entries,
            selected: 0,
            root: DEFAULT_ROOT,
            status,
        }
    }

    pub fn root_name(&self) -> String {
        pitch_name(self.root)
    }

    pub fn set_root(&mut self, name: &str) {
        if let Some(pitch) = parse_root(name) {
            self.root = pitch;
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        // every key press counts as a user gesture
        self.manager.on_user_gesture();
        match event {
            InputEvent::SelectPrev => self.selected = self.selected.saturating_sub(1),
            InputEvent::SelectNext => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
            }
            InputEvent::RootDown => self.root -= 1,
            InputEvent::RootUp => self.root += 1,
            InputEvent::CycleMode => {
                let next = self.manager.mode().next();
                self.manager.set_mode(next);
                self.status = format!("mode: {next}");
            }
            InputEvent::StopAll => {
                self.manager.stop_all();
                self.status = "stopped".to_string();
            }
            InputEvent::PlayMusic => self.play(Channel::Music),
            InputEvent::PlaySfx => self.play(Channel::Sfx),
            InputEvent::Quit => {}
        }
    }

    fn play(&mut self, channel: Channel) {
        let Some(entry) = self.entries.get(self.selected).cloned() else {
            return;
        };
        let root = self.root_name();
        let result = match (channel, entry.kind) {
            (Channel::Music, EntryKind::Sequence) => self.manager.play_sequence(&entry.name, &root, None),
            (Channel::Music, _) => self.manager.play_song(&entry.name, None),
            (Channel::Sfx, _) => self.manager.play_sfx(&entry.name, &root, None),
        };
        self.status = match result {
            Ok(Some(duration)) => format!("{channel}: {} ({duration:.1}s)", entry.name),
            Ok(None) => format!("{channel}: {} not played (mode {})", entry.name, self.manager.mode()),
            Err(e) => format!("audio device error: {e:#}"),
        };
    }

    pub fn display_state(&mut self) -> DisplayState {
        DisplayState {
            entries: self.entries.clone(),
            selected: self.selected,
            mode: self.manager.mode(),
            root_name: self.root_name(),
            music_active: self.manager.active_tones(Channel::Music),
            sfx_active: self.manager.active_tones(Channel::Sfx),
            device_ready: self.manager.device().is_ready(),
            clock: self.manager.device().now(),
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqtone::{AudioConfig, AudioMode, MusicData, OfflineDevice};

    fn middle() -> Middle<OfflineDevice> {
        let data = MusicData::from_json(
            r#"{
                "sequences": { "blip": { "notes": [[1, 0.5]] } },
                "songs": {
                    "theme": [ { "sequence": "blip", "root": "C4" } ],
                    "coin": { "sfx": true, "steps": [ { "sequence": "blip", "root": "C6" } ] }
                }
            }"#,
        )
        .unwrap();
        Middle::new(AudioManager::with_data(OfflineDevice::new(), data, AudioConfig::default()))
    }

    #[test]
    fn entries_list_songs_then_sequences() {
        let m = middle();
        let names: Vec<_> = m.entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            vec![("coin", EntryKind::SfxSong), ("theme", EntryKind::Song), ("blip", EntryKind::Sequence)]
        );
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut m = middle();
        m.handle_input(InputEvent::SelectPrev);
        assert_eq!(m.selected, 0);
        for _ in 0..10 {
            m.handle_input(InputEvent::SelectNext);
        }
        assert_eq!(m.selected, 2);
    }

    #[test]
    fn plays_on_the_right_channel() {
        let mut m = middle();
        m.handle_input(InputEvent::SelectNext); // theme
        m.handle_input(InputEvent::PlayMusic);
        m.handle_input(InputEvent::SelectPrev); // coin
        m.handle_input(InputEvent::PlaySfx);
        let ds = m.display_state();
        assert_eq!(ds.music_active, 1);
        assert_eq!(ds.sfx_active, 1);
        assert!(ds.device_ready);
        assert!(ds.status.starts_with("sfx: coin"));

        m.handle_input(InputEvent::StopAll);
        let ds = m.display_state();
        assert_eq!(ds.music_active + ds.sfx_active, 0);
    }

    #[test]
    fn mode_cycle_and_transpose() {
        let mut m = middle();
        m.handle_input(InputEvent::CycleMode);
        assert_eq!(m.manager.mode(), AudioMode::Music);
        m.handle_input(InputEvent::RootUp);
        assert_eq!(m.root_name(), "C#4");
        m.set_root("not a note");
        assert_eq!(m.root_name(), "C#4");
        m.set_root("A3");
        m.handle_input(InputEvent::RootDown);
        assert_eq!(m.root_name(), "G#3");
    }
}
