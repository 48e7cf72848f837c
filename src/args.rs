//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use seqtone::{PlayOptions, Scale, Waveform};

#[derive(Debug, Parser)]
#[command(name = "seqtone", version, about = "Play JSON-defined tone sequences and songs")]
pub struct Cli {
    /// Path to the music data document
    #[arg(long, global = true, default_value = "data/music.json")]
    pub data: PathBuf,

    /// Directory holding .seqtone/ (session and log); defaults to the current directory
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive terminal jukebox (default)
    Jukebox,

    /// List the sequences and songs in the data document
    List,

    /// Play a single sequence
    Sequence {
        name: String,
        /// Root note like C4 or F#3
        root: String,
        #[command(flatten)]
        tune: TuneArgs,
        /// Play on the sfx channel instead of music
        #[arg(long)]
        sfx: bool,
    },

    /// Play a song
    Song {
        name: String,
        #[command(flatten)]
        tune: TuneArgs,
        /// Play on the sfx channel (song must be marked "sfx": true)
        #[arg(long)]
        sfx: bool,
    },

    /// Render a sequence or song to a WAV file
    Render {
        out: PathBuf,
        #[arg(long, conflicts_with = "sequence", required_unless_present = "sequence")]
        song: Option<String>,
        #[arg(long, requires = "root")]
        sequence: Option<String>,
        #[arg(long)]
        root: Option<String>,
        #[command(flatten)]
        tune: TuneArgs,
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
    },
}

#[derive(Clone, Debug, Default, Args)]
pub struct TuneArgs {
    /// Override scale
    #[arg(long, value_parser = ["major", "minor", "diminished"])]
    pub scale: Option<String>,

    /// Override tempo (BPM)
    #[arg(long)]
    pub tempo: Option<f64>,

    /// Override wave (sine, square, sawtooth, triangle)
    #[arg(long)]
    pub wave: Option<String>,
}

impl TuneArgs {
    pub fn options(&self) -> PlayOptions {
        PlayOptions {
            scale: self.scale.as_deref().map(Scale::from_name),
            tempo: self.tempo,
            wave: self.wave.as_deref().map(Waveform::from_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_jukebox() {
        let cli = Cli::try_parse_from(["seqtone"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.data, PathBuf::from("data/music.json"));
    }

    #[test]
    fn sequence_with_overrides() {
        let cli = Cli::try_parse_from([
            "seqtone", "sequence", "fanfare", "F#3", "--scale", "minor", "--tempo", "90", "--wave", "sine", "--sfx",
        ])
        .unwrap();
        let Some(Command::Sequence { name, root, tune, sfx }) = cli.command else {
            panic!("expected sequence command");
        };
        assert_eq!((name.as_str(), root.as_str(), sfx), ("fanfare", "F#3", true));
        let options = tune.options();
        assert_eq!(options.scale, Some(Scale::Minor));
        assert_eq!(options.tempo, Some(90.0));
        assert_eq!(options.wave, Some(Waveform::Sine));
    }

    #[test]
    fn render_needs_a_source() {
        assert!(Cli::try_parse_from(["seqtone", "render", "out.wav"]).is_err());
        assert!(Cli::try_parse_from(["seqtone", "render", "out.wav", "--sequence", "x"]).is_err());
        assert!(Cli::try_parse_from(["seqtone", "render", "out.wav", "--song", "x"]).is_ok());
        assert!(Cli::try_parse_from(["seqtone", "render", "out.wav", "--sequence", "x", "--root", "C4"]).is_ok());
        assert!(Cli::try_parse_from(["seqtone", "sequence", "x", "C4", "--scale", "lydian"]).is_err());
    }
}
