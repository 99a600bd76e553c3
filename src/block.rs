//! Planar audio storage handed through the effect chain.
//!
//! Samples for each channel sit in one contiguous run so effects can work on
//! `&mut [f32]` slices, the same shape the DSP primitives operate on. Device
//! callbacks usually deliver interleaved frames, so conversion helpers live
//! here as well.

#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    data: Vec<f32>,
    channels: usize,
    frames: usize,
}

impl AudioBlock {
    /// A silent block. Allocates; build blocks outside the audio callback.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            data: vec![0.0; channels * frames],
            channels,
            frames,
        }
    }

    /// Build a block from one `Vec` per channel. All channels must have equal length.
    pub fn from_channels(channels: &[Vec<f32>]) -> Self {
        let frames = channels.first().map_or(0, Vec::len);
        assert!(
            channels.iter().all(|c| c.len() == frames),
            "all channels must have the same frame count"
        );
        let mut data = Vec::with_capacity(channels.len() * frames);
        for channel in channels {
            data.extend_from_slice(channel);
        }
        Self {
            data,
            channels: channels.len(),
            frames,
        }
    }

    pub fn from_mono(samples: &[f32]) -> Self {
        Self {
            data: samples.to_vec(),
            channels: 1,
            frames: samples.len(),
        }
    }

    /// De-interleave `frames * channels` samples.
    pub fn from_interleaved(samples: &[f32], channels: usize) -> Self {
        assert!(channels > 0, "channels must be non-zero");
        let frames = samples.len() / channels;
        let mut block = Self::new(channels, frames);
        block.read_interleaved(samples);
        block
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.channels, self.frames)
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.data[index * self.frames..(index + 1) * self.frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.data[index * self.frames..(index + 1) * self.frames]
    }

    pub fn channels_iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.frames.max(1)).take(self.channels)
    }

    pub fn channels_iter_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let channels = self.channels;
        self.data.chunks_exact_mut(self.frames.max(1)).take(channels)
    }

    /// Left and right channel slices. `None` for mono blocks.
    pub fn stereo_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        if self.channels < 2 {
            return None;
        }
        let (left, rest) = self.data.split_at_mut(self.frames);
        Some((left, &mut rest[..self.frames]))
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    pub fn silence(&mut self) {
        self.fill(0.0);
    }

    /// Copy samples from a block of the same shape. No allocation.
    pub fn copy_from(&mut self, other: &AudioBlock) {
        debug_assert_eq!(self.shape(), other.shape());
        self.data.copy_from_slice(&other.data);
    }

    /// Fill this block from interleaved samples. Missing samples become silence.
    pub fn read_interleaved(&mut self, samples: &[f32]) {
        let channels = self.channels;
        let frames = self.frames;
        for ch in 0..channels {
            let dst = &mut self.data[ch * frames..(ch + 1) * frames];
            for (frame, out) in dst.iter_mut().enumerate() {
                *out = samples.get(frame * channels + ch).copied().unwrap_or(0.0);
            }
        }
    }

    /// Write this block into an interleaved destination of at least `frames * channels`.
    pub fn write_interleaved(&self, out: &mut [f32]) {
        let channels = self.channels;
        for (ch, src) in self.channels_iter().enumerate() {
            for (frame, &sample) in src.iter().enumerate() {
                if let Some(slot) = out.get_mut(frame * channels + ch) {
                    *slot = sample;
                }
            }
        }
    }

    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.data.len()];
        self.write_interleaved(&mut out);
        out
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}
