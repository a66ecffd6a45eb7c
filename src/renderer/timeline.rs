use std::collections::HashMap;

/// Render targets the frame touches, for write/read ordering bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetId {
    GBuffer,
    ShadowMap(u32),
    SceneColor,
}

/// One encoded pass. The renderer drives its encoder loop directly off this
/// sequence, so the order tested here is the order submitted to the GPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassEvent {
    /// Writes surface attributes into the G-buffer.
    Geometry,
    /// Depth-only render into the given shadow map index.
    Shadow(u32),
    /// Reads G-buffer + shadow maps, writes the scene color target.
    Lighting,
    /// Reads the scene color target, writes the window surface.
    Blit,
}

/// The fixed pass order for one frame: geometry, then every shadow map in
/// index order, then lighting, then the optional window blit.
pub fn frame_passes(shadow_map_count: u32, blit_to_window: bool) -> Vec<PassEvent> {
    let mut passes = Vec::with_capacity(shadow_map_count as usize + 3);
    passes.push(PassEvent::Geometry);
    for index in 0..shadow_map_count {
        passes.push(PassEvent::Shadow(index));
    }
    passes.push(PassEvent::Lighting);
    if blit_to_window {
        passes.push(PassEvent::Blit);
    }
    passes
}

#[derive(Clone, Copy, Debug, Default)]
struct TargetStamps {
    /// (frame, sequence) of the last write / read.
    written: Option<(u64, u32)>,
    read: Option<(u64, u32)>,
}

/// Records, per target, when it was last written and last read within the
/// current frame. The lighting pass must observe a same-frame write stamp on
/// every input it samples.
#[derive(Debug, Default)]
pub struct PassTimeline {
    frame: u64,
    sequence: u32,
    stamps: HashMap<TargetId, TargetStamps>,
}

impl PassTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.sequence = 0;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn mark_written(&mut self, target: TargetId) {
        self.sequence += 1;
        let stamp = (self.frame, self.sequence);
        self.stamps.entry(target).or_default().written = Some(stamp);
    }

    pub fn mark_read(&mut self, target: TargetId) {
        self.sequence += 1;
        let stamp = (self.frame, self.sequence);
        self.stamps.entry(target).or_default().read = Some(stamp);
    }

    /// True if the target was written this frame before being read this
    /// frame. A target that was not read yet counts as satisfied.
    pub fn written_before_read(&self, target: TargetId) -> bool {
        let Some(stamps) = self.stamps.get(&target) else {
            return false;
        };
        let Some((write_frame, write_seq)) = stamps.written else {
            return false;
        };
        if write_frame != self.frame {
            return false;
        }
        match stamps.read {
            Some((read_frame, read_seq)) if read_frame == self.frame => write_seq < read_seq,
            _ => true,
        }
    }

    pub fn written_this_frame(&self, target: TargetId) -> bool {
        matches!(
            self.stamps.get(&target).and_then(|s| s.written),
            Some((frame, _)) if frame == self.frame
        )
    }

    pub fn read_this_frame(&self, target: TargetId) -> bool {
        matches!(
            self.stamps.get(&target).and_then(|s| s.read),
            Some((frame, _)) if frame == self.frame
        )
    }
}

/// Applies a pass's target effects to the timeline. Factored out of the
/// encoder loop so the sequencing is checkable without a GPU device.
pub fn stamp_pass(timeline: &mut PassTimeline, pass: PassEvent) {
    match pass {
        PassEvent::Geometry => timeline.mark_written(TargetId::GBuffer),
        PassEvent::Shadow(index) => timeline.mark_written(TargetId::ShadowMap(index)),
        PassEvent::Lighting => {
            timeline.mark_read(TargetId::GBuffer);
            // The lighting shader binds the whole shadow array; every map is
            // a read input regardless of how many lights sample it.
            for index in 0..crate::renderer::lights::MAX_SHADOW_MAPS as u32 {
                if timeline.written_this_frame(TargetId::ShadowMap(index)) {
                    timeline.mark_read(TargetId::ShadowMap(index));
                }
            }
            timeline.mark_written(TargetId::SceneColor);
        }
        PassEvent::Blit => timeline.mark_read(TargetId::SceneColor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(shadow_maps: u32, blit: bool) -> PassTimeline {
        let mut timeline = PassTimeline::new();
        timeline.begin_frame();
        for pass in frame_passes(shadow_maps, blit) {
            stamp_pass(&mut timeline, pass);
        }
        timeline
    }

    #[test]
    fn geometry_comes_first_then_shadows_then_lighting() {
        let passes = frame_passes(2, true);
        assert_eq!(
            passes,
            vec![
                PassEvent::Geometry,
                PassEvent::Shadow(0),
                PassEvent::Shadow(1),
                PassEvent::Lighting,
                PassEvent::Blit,
            ]
        );
    }

    #[test]
    fn gbuffer_is_written_before_lighting_reads_it() {
        let timeline = run_frame(1, true);
        assert!(timeline.written_before_read(TargetId::GBuffer));
        assert!(timeline.written_before_read(TargetId::ShadowMap(0)));
        assert!(timeline.written_before_read(TargetId::SceneColor));
    }

    #[test]
    fn holds_with_no_shadow_maps() {
        let timeline = run_frame(0, true);
        assert!(timeline.written_before_read(TargetId::GBuffer));
        assert!(!timeline.written_this_frame(TargetId::ShadowMap(0)));
    }

    #[test]
    fn editor_frame_skips_the_blit() {
        let timeline = run_frame(1, false);
        assert!(timeline.written_this_frame(TargetId::SceneColor));
        assert!(!timeline.read_this_frame(TargetId::SceneColor));
    }

    #[test]
    fn stamps_reset_each_frame() {
        let mut timeline = PassTimeline::new();
        timeline.begin_frame();
        for pass in frame_passes(1, true) {
            stamp_pass(&mut timeline, pass);
        }
        timeline.begin_frame();
        // Nothing encoded yet this frame.
        assert!(!timeline.written_this_frame(TargetId::GBuffer));
        assert!(!timeline.written_before_read(TargetId::GBuffer));
    }
}
