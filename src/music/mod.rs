pub mod data;
pub mod note;
pub mod pitch;
pub mod scale;
pub mod scheduler;
pub mod song;

pub use data::{MusicData, OctaveSplit, Sequence, Song, Step};
pub use note::{Note, NoteEntry};
pub use pitch::{parse_root, pitch_name, pitch_to_frequency};
pub use scale::Scale;
pub use scheduler::{Overrides, ToneRequest, ToneSink, schedule_sequence};
pub use song::schedule_song;
