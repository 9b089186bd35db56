//! Keyframe animation clips and the single-active-clip selector.
//!
//! A clip is a set of channels, each animating one component (translation,
//! rotation or scale) of one scene node, addressed by its GLTF node index.
//! [`AnimationSelector`] owns one [`ClipAction`] per clip and guarantees that
//! at most one of them is playing at any time.

use std::collections::HashMap;

use cgmath::{InnerSpace, Quaternion, Vector3, VectorSpace};

use crate::data_structures::instance::Instance;

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<Vector3<f32>>),
    Rotation(Vec<Quaternion<f32>>),
    Scale(Vec<Vector3<f32>>),
}

impl Keyframes {
    pub fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
            Keyframes::Scale(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
}

#[derive(Clone, Debug)]
pub struct Channel {
    pub node: usize,
    pub interpolation: Interpolation,
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
}

impl Channel {
    /// Index of the key at or before `t` and the blend factor towards the next one.
    fn locate(&self, t: f32) -> (usize, usize, f32) {
        let last = self.timestamps.len().min(self.keyframes.len()).saturating_sub(1);
        if last == 0 || t <= self.timestamps[0] {
            return (0, 0, 0.0);
        }
        if t >= self.timestamps[last] {
            return (last, last, 0.0);
        }
        let next = self.timestamps.partition_point(|&stamp| stamp <= t).min(last);
        let prev = next - 1;
        let span = self.timestamps[next] - self.timestamps[prev];
        let factor = if span > f32::EPSILON {
            (t - self.timestamps[prev]) / span
        } else {
            0.0
        };
        match self.interpolation {
            Interpolation::Linear => (prev, next, factor),
            Interpolation::Step => (prev, prev, 0.0),
        }
    }

    fn sample_into(&self, t: f32, pose: &mut NodePose) {
        if self.keyframes.is_empty() || self.timestamps.is_empty() {
            return;
        }
        let (a, b, f) = self.locate(t);
        match &self.keyframes {
            Keyframes::Translation(v) => pose.translation = Some(v[a].lerp(v[b], f)),
            Keyframes::Scale(v) => pose.scale = Some(v[a].lerp(v[b], f)),
            Keyframes::Rotation(v) => {
                let (from, mut to) = (v[a], v[b]);
                // take the short way round
                if from.dot(to) < 0.0 {
                    to = -to;
                }
                pose.rotation = Some(if a == b { from } else { from.slerp(to, f) });
            }
        }
    }
}

/// Component overrides for one node; `None` keeps the node's rest value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodePose {
    pub translation: Option<Vector3<f32>>,
    pub rotation: Option<Quaternion<f32>>,
    pub scale: Option<Vector3<f32>>,
}

impl NodePose {
    pub fn apply_to(&self, rest: &Instance) -> Instance {
        Instance {
            position: self.translation.unwrap_or(rest.position),
            rotation: self.rotation.map(|r| r.normalize()).unwrap_or(rest.rotation),
            scale: self.scale.unwrap_or(rest.scale),
        }
    }
}

pub type Pose = HashMap<usize, NodePose>;

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub channels: Vec<Channel>,
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.timestamps.last().copied())
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            channels,
            duration,
        }
    }

    pub fn sample(&self, t: f32) -> Pose {
        let mut pose = Pose::new();
        for channel in &self.channels {
            channel.sample_into(t, pose.entry(channel.node).or_default());
        }
        pose
    }
}

/// Playback handle of one clip.
#[derive(Clone, Debug)]
pub struct ClipAction {
    clip: AnimationClip,
    time: f32,
    playing: bool,
}

impl ClipAction {
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            playing: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.clip.name
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Halt playback and rewind.
    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }

    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self
    }

    /// Advance by `dt` seconds, wrapping around the clip's duration.
    pub fn advance(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        self.time += dt.max(0.0);
        if self.clip.duration > 0.0 {
            self.time %= self.clip.duration;
        } else {
            self.time = 0.0;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ActiveAnimationState {
    #[default]
    Idle,
    Playing(String),
}

impl ActiveAnimationState {
    pub fn clip_name(&self) -> Option<&str> {
        match self {
            ActiveAnimationState::Idle => None,
            ActiveAnimationState::Playing(name) => Some(name),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnimationSelector {
    actions: Vec<ClipAction>,
    state: ActiveAnimationState,
}

impl AnimationSelector {
    /// Build the selector from clips in load order and start the first one.
    ///
    /// Clips sharing a name collapse into one entry that keeps the position
    /// of the first occurrence and the content of the last.
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        let mut actions: Vec<ClipAction> = Vec::with_capacity(clips.len());
        for clip in clips {
            match actions.iter_mut().find(|a| a.name() == clip.name) {
                Some(existing) => {
                    log::warn!("Duplicate animation clip {:?}, keeping the later one", clip.name);
                    *existing = ClipAction::new(clip);
                }
                None => actions.push(ClipAction::new(clip)),
            }
        }
        let mut selector = Self {
            actions,
            state: ActiveAnimationState::Idle,
        };
        if let Some(first) = selector.actions.first_mut() {
            first.play();
            selector.state = ActiveAnimationState::Playing(first.name().to_string());
        }
        selector
    }

    pub fn state(&self) -> &ActiveAnimationState {
        &self.state
    }

    pub fn active_clip(&self) -> Option<&str> {
        self.state.clip_name()
    }

    pub fn has_clips(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.actions.iter().map(ClipAction::name).collect()
    }

    pub fn action(&self, name: &str) -> Option<&ClipAction> {
        self.actions.iter().find(|a| a.name() == name)
    }

    pub fn playing_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_playing()).count()
    }

    /// Stop the running clip and play `name` from its first frame.
    ///
    /// Choices only ever come from [`clip_names`](Self::clip_names), so an
    /// unknown name is a caller bug; it is logged and the current clip keeps
    /// playing.
    pub fn select_clip(&mut self, name: &str) -> bool {
        let Some(next) = self.actions.iter().position(|a| a.name() == name) else {
            log::error!("Animation clip {:?} does not exist", name);
            return false;
        };
        if let ActiveAnimationState::Playing(old) = &self.state {
            if let Some(current) = self.actions.iter_mut().find(|a| a.name() == old) {
                current.stop();
            }
        }
        let action = &mut self.actions[next];
        action.reset().play();
        self.state = ActiveAnimationState::Playing(action.name().to_string());
        log::info!("Playing animation {:?}", name);
        true
    }

    /// Advance the playing clip by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.actions
            .iter_mut()
            .filter(|a| a.is_playing())
            .for_each(|a| a.advance(dt));
    }

    /// Node overrides of the playing clip at its current time.
    pub fn pose(&self) -> Pose {
        self.actions
            .iter()
            .find(|a| a.is_playing())
            .map(|a| a.clip.sample(a.time))
            .unwrap_or_default()
    }
}
