use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Receiver;

use super::voice::ToneVoice;
use crate::audio_api::{AudioCommand, ToneParams};

const MAX_VOICES: usize = 64; // hard cap so we wont malloc in audio callback
const PENDING_CAPACITY: usize = 4096;

// A tone waiting for the clock to reach it.
struct Pending {
    start_frame: u64,
    tone: ToneParams,
}

pub struct Engine {
    sample_rate: u32,
    frame: u64,
    clock: Arc<AtomicU64>, // frames rendered, published once per block
    pending: VecDeque<Pending>, // ordered by start_frame
    voices: Vec<Option<ToneVoice>>, // fixed pool of voices
}

impl Engine {
    pub fn new(sample_rate: u32, clock: Arc<AtomicU64>) -> Self {
        Self {
            sample_rate,
            frame: clock.load(Ordering::Acquire),
            clock,
            pending: VecDeque::with_capacity(PENDING_CAPACITY),
            voices: (0..MAX_VOICES).map(|_| None).collect(),
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    // Pull commands off the queue without letting `pending` outgrow what was
    // reserved up front; anything left over stays queued for the next block.
    pub fn drain(&mut self, rx: &Receiver<AudioCommand>) {
        self.purge_cancelled();
        while self.pending.len() < PENDING_CAPACITY {
            let Ok(cmd) = rx.try_recv() else { break };
            self.handle_cmd(cmd);
        }
    }

    // stopped streams shouldn't hold queue slots until their start time
    fn purge_cancelled(&mut self) {
        self.pending.retain(|p| !p.tone.cancel.is_cancelled());
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Schedule(tone) => self.enqueue(tone),
            AudioCommand::Clear => {
                self.pending.clear();
                self.voices.iter_mut().for_each(|v| *v = None);
            }
        }
    }

    fn enqueue(&mut self, tone: ToneParams) {
        if tone.cancel.is_cancelled() {
            return;
        }
        let start_frame = (tone.start.max(0.0) * self.sample_rate as f64).round() as u64;
        // tones mostly arrive in order, so this is usually a push_back
        let idx = self.pending.partition_point(|p| p.start_frame <= start_frame);
        self.pending.insert(idx, Pending { start_frame, tone });
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }

    fn start_due(&mut self) {
        while let Some(front) = self.pending.front() {
            if front.start_frame > self.frame {
                break;
            }
            let Some(Pending { start_frame, tone }) = self.pending.pop_front() else {
                break;
            };
            // cancelled before it got the chance to sound
            if tone.cancel.is_cancelled() {
                continue;
            }
            let voice = ToneVoice::new(tone, self.sample_rate, self.frame - start_frame);
            if voice.is_done() {
                continue;
            }
            let slot = self
                .voices
                .iter()
                .position(Option::is_none)
                .unwrap_or_else(|| self.quietest_slot());
            self.voices[slot] = Some(voice);
        }
    }

    // when the pool is full, steal the voice closest to finishing
    fn quietest_slot(&self) -> usize {
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.as_ref().map_or(0, ToneVoice::remaining))
            .map_or(0, |(i, _)| i)
    }

    pub fn next_sample(&mut self) -> f32 {
        self.start_due();
        let mut out = 0.0f32;
        for slot in self.voices.iter_mut() {
            let Some(voice) = slot else { continue };
            out += voice.next_sample();
            if voice.is_done() {
                *slot = None;
            }
        }
        self.frame += 1;
        out
    }

    // render one mono block and publish the new clock
    pub fn render_block(&mut self, out: &mut [f32]) {
        for voice in self.voices.iter_mut().flatten() {
            voice.poll_cancel();
        }
        for s in out.iter_mut() {
            *s = self.next_sample().clamp(-1.0, 1.0);
        }
        self.clock.store(self.frame, Ordering::Release);
    }
}
