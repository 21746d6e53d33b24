//! The pad: owns every control, packs their states and pushes them to the host

use super::bridge::HostBridge;
use super::debug_label::{hex_dump, DebugLabel};
use super::slots::SlotTable;
use crate::config::PadConfig;
use crate::controls::{
    Control, ControlContext, MotionHub, MotionSample, OrientationSample, SensingMode, Touch,
    TouchEvent, TouchPhase, TouchView,
};
use crate::geometry::{Hitbox, Rect};
use crate::haptics::{HapticActuator, HapticScheduler};
use crate::layout::{resolve_layout, LayoutSource, MotionSource};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

pub const EMPTY_LAYOUT_ALERT: &str = "Your gamepad looks empty. Is the layout missing or broken?";

/// A finger that is down, with the control it started on
#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveTouch {
    touch: Touch,
    target: usize,
}

pub struct Joypad {
    controls: Vec<Control>,
    by_id: HashMap<String, usize>,
    slots: SlotTable,
    buffer: Vec<u8>,
    bye: Vec<u8>,
    active: Vec<ActiveTouch>,
    motion: MotionHub,
    haptics: HapticScheduler,
    bridge: Box<dyn HostBridge>,
    debug_label: Option<DebugLabel>,
    config: PadConfig,
    sensing: SensingMode,
}

impl std::fmt::Debug for Joypad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Joypad")
            .field("controls", &self.control_ids())
            .field("buffer", &self.buffer)
            .field("sensing", &self.sensing)
            .finish_non_exhaustive()
    }
}

impl Joypad {
    /// Builds the pad for `layout`.
    ///
    /// Malformed labels are skipped, each with one alert. The bye pattern is
    /// registered before the controls are attached, and the control ids are
    /// announced last.
    pub fn new(
        layout: &dyn LayoutSource,
        config: PadConfig,
        sensing: SensingMode,
        mut bridge: Box<dyn HostBridge>,
        actuator: Box<dyn HapticActuator>,
    ) -> Self {
        let template = layout.grid_template_areas();
        let mut controls = Vec::new();
        let mut debug_label = None;

        for (code, resolved) in resolve_layout(&template) {
            match resolved {
                Ok(kind) => match Control::create(&code, kind) {
                    Some(control) => controls.push(control),
                    None => debug_label = Some(DebugLabel::new()),
                },
                Err(e) => {
                    warn!("Skipping layout label {}: {}", code, e);
                    bridge.alert(&e.to_string());
                }
            }
        }

        if controls.is_empty() {
            warn!("Layout has no controls");
            bridge.alert(EMPTY_LAYOUT_ALERT);
        }

        let slots = SlotTable::assign(controls.iter().map(Control::kind));
        let bye = slots.bye_pattern();
        bridge.set_bye(&bye);

        let mut motion = MotionHub::new();
        let mut by_id = HashMap::new();
        for (index, control) in controls.iter().enumerate() {
            by_id.insert(control.id().to_string(), index);
            if let Control::Motion(m) = control {
                motion.register(index, m.axis());
            }
        }

        let mut pad = Self {
            buffer: slots.empty_buffer(),
            controls,
            by_id,
            slots,
            bye,
            active: Vec::new(),
            motion,
            haptics: HapticScheduler::new(actuator),
            bridge,
            debug_label,
            config,
            sensing,
        };
        pad.attach(layout);
        pad.pack();

        let ids = pad.control_ids().join(",");
        if let Some(label) = pad.debug_label.as_mut() {
            label.show_announcement(&ids);
        }
        pad.bridge.update_vals(ids.as_bytes());
        info!(
            "Joypad ready: {} controls, {} byte state, {:?} sensing",
            pad.controls.len(),
            pad.buffer.len(),
            pad.sensing
        );
        pad
    }

    /// Recomputes hitboxes and button neighbourhoods from `layout`.
    /// States and slots are kept.
    pub fn attach(&mut self, layout: &dyn LayoutSource) {
        for control in &mut self.controls {
            let rect = layout.bounding_rect(control.id()).unwrap_or_else(|| {
                warn!("No geometry for control {}", control.id());
                Rect::default()
            });
            control.attach(rect, &self.config);
        }
        self.link_neighbors();
        debug!("Attached {} controls", self.controls.len());
    }

    fn link_neighbors(&mut self) {
        let buttons: Vec<(usize, Hitbox)> = self
            .controls
            .iter()
            .enumerate()
            .filter_map(|(index, c)| c.as_button().map(|b| (index, b.hitbox())))
            .collect();

        for (index, hitbox) in &buttons {
            let neighbors: Vec<usize> = buttons
                .iter()
                .filter(|(_, other)| hitbox.overlaps(other))
                .map(|(other, _)| *other)
                .collect();
            if let Some(button) = self.controls[*index].as_button_mut() {
                button.set_neighbors(neighbors);
            }
        }
    }

    /// Routes a touch event to the control named by its target, then pushes
    /// the new state. Events for unknown targets are ignored.
    pub fn handle_touch(&mut self, event: &TouchEvent) {
        let Some(&index) = self.by_id.get(&event.target) else {
            debug!("Ignoring touch on {}", event.target);
            return;
        };
        self.track_touches(event, index);

        let touches: Vec<Touch> = self.active.iter().map(|a| a.touch).collect();
        if self.controls[index].as_button().is_some() {
            self.press_buttons(index, event.phase, &touches);
        } else {
            let targeted: Vec<Touch> = self
                .active
                .iter()
                .filter(|a| a.target == index)
                .map(|a| a.touch)
                .collect();
            let view = TouchView {
                touches: &touches,
                targeted: &targeted,
            };
            let mut ctx = ControlContext {
                haptics: &mut self.haptics,
                config: &self.config,
                sensing: self.sensing,
            };
            self.controls[index].on_touch(event.phase, &view, &mut ctx);
        }
        self.update_state();
    }

    fn track_touches(&mut self, event: &TouchEvent, target: usize) {
        for touch in &event.changed {
            let existing = self.active.iter().position(|a| a.touch.id == touch.id);
            match (event.phase, existing) {
                (TouchPhase::Start, Some(position)) => {
                    self.active.remove(position);
                    self.active.push(ActiveTouch {
                        touch: *touch,
                        target,
                    });
                }
                (TouchPhase::Start, None) | (TouchPhase::Move, None) => {
                    self.active.push(ActiveTouch {
                        touch: *touch,
                        target,
                    });
                }
                (TouchPhase::Move, Some(position)) => self.active[position].touch = *touch,
                (TouchPhase::End | TouchPhase::Cancel, Some(position)) => {
                    self.active.remove(position);
                }
                (TouchPhase::End | TouchPhase::Cancel, None) => {}
            }
        }
    }

    fn press_buttons(&mut self, index: usize, phase: TouchPhase, touches: &[Touch]) {
        let Some(button) = self.controls[index].as_button_mut() else {
            return;
        };
        if phase == TouchPhase::Start {
            button.forget_press();
        }
        let neighbors = button.neighbors().to_vec();

        let mut flipped = false;
        for neighbor in neighbors {
            if let Some(button) = self.controls[neighbor].as_button_mut() {
                flipped |= button.evaluate(touches, &self.config, self.sensing);
            }
        }
        if flipped {
            self.haptics.pulse(self.config.haptics.enter());
        }
    }

    pub fn handle_device_motion(&mut self, sample: MotionSample) {
        if self.motion.watchers(MotionSource::Acceleration).is_empty() {
            return;
        }
        self.motion
            .record_motion(sample, self.config.sensing.acceleration_constant);
        self.refresh_motion(MotionSource::Acceleration);
        self.update_state();
    }

    pub fn handle_device_orientation(&mut self, sample: OrientationSample) {
        if self.motion.watchers(MotionSource::Orientation).is_empty() {
            return;
        }
        self.motion.record_orientation(sample);
        self.refresh_motion(MotionSource::Orientation);
        self.update_state();
    }

    fn refresh_motion(&mut self, source: MotionSource) {
        for &index in self.motion.watchers(source) {
            if let Some(motion) = self.controls[index].as_motion_mut() {
                motion.update(self.motion.value(motion.axis()));
            }
        }
    }

    /// One haptic scheduler pass; returns the pulse sent, if any
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        self.haptics.tick(now)
    }

    fn pack(&mut self) {
        if let Some(header) = self.buffer.first_mut() {
            *header = crate::protocol::HEADER_STATUS;
        }
        for (control, range) in self.controls.iter().zip(self.slots.ranges()) {
            if let Some(slot) = self.buffer.get_mut(range.clone()) {
                control.pack(slot);
            }
        }
    }

    fn update_state(&mut self) {
        self.pack();
        self.bridge.update_vals(&self.buffer);
        if let Some(label) = self.debug_label.as_mut() {
            label.refresh(&self.buffer);
        }
        if self.config.debug.log_state_dumps {
            trace!("State {}", hex_dump(&self.buffer));
        }
    }

    pub fn state_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn bye_pattern(&self) -> &[u8] {
        &self.bye
    }

    pub fn control_ids(&self) -> Vec<&str> {
        self.controls.iter().map(Control::id).collect()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, id: &str) -> Option<&Control> {
        self.by_id.get(id).map(|&index| &self.controls[index])
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub fn haptics(&self) -> &HapticScheduler {
        &self.haptics
    }

    pub fn sensing(&self) -> SensingMode {
        self.sensing
    }

    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    pub fn active_touches(&self) -> usize {
        self.active.len()
    }

    /// Text of the debug label, when the layout has one
    pub fn debug_text(&self) -> Option<&str> {
        self.debug_label.as_ref().map(DebugLabel::text)
    }

    pub fn set_debug_message(&mut self, message: impl Into<String>) {
        if let Some(label) = self.debug_label.as_mut() {
            label.set_message(message);
            label.refresh(&self.buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::DPadDirection;
    use crate::haptics::MemoryActuator;
    use crate::joypad::{BridgeCall, MemoryBridge};
    use crate::layout::GridLayout;

    fn pad(template: &str, width: f32, height: f32) -> (Joypad, MemoryBridge, MemoryActuator) {
        let bridge = MemoryBridge::new();
        let actuator = MemoryActuator::new();
        let grid = GridLayout::parse(template, Rect::new(0.0, 0.0, width, height));
        let pad = Joypad::new(
            &grid,
            PadConfig::default(),
            SensingMode::Geometry,
            Box::new(bridge.clone()),
            Box::new(actuator.clone()),
        );
        (pad, bridge, actuator)
    }

    fn event(phase: TouchPhase, target: &str, touches: &[(u64, f32, f32)]) -> TouchEvent {
        TouchEvent {
            phase,
            target: target.to_string(),
            changed: touches
                .iter()
                .map(|&(id, x, y)| Touch {
                    id,
                    x,
                    y,
                    force: None,
                })
                .collect(),
        }
    }

    #[test]
    fn construction_announces_after_bye() {
        let (pad, bridge, _) = pad(r#""j1 b1""#, 200.0, 100.0);
        let calls = bridge.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], BridgeCall::SetBye(vec![255, 0, 0, 0, 0, 0]));
        assert_eq!(calls[1], BridgeCall::UpdateVals(b"j1,b1".to_vec()));
        assert_eq!(pad.state_bytes(), &[0, 0x40, 0x00, 0x40, 0x00, 0]);
    }

    #[test]
    fn overlapping_buttons_are_neighbors() {
        let (pad, _, _) = pad(r#""b1 b2 j1" "b3 b4 j1" ". . a1""#, 300.0, 300.0);
        let neighbors = |id: &str| {
            pad.control(id)
                .and_then(Control::as_button)
                .map(|b| b.neighbors().to_vec())
                .unwrap_or_default()
        };
        let index = |id: &str| pad.control_ids().iter().position(|c| *c == id).unwrap();

        let b1 = neighbors("b1");
        assert!(b1.contains(&index("b1")) && b1.contains(&index("b2")) && b1.contains(&index("b4")));
        assert!(!b1.contains(&index("j1")));
        assert!(!neighbors("a1").contains(&index("b1")));
    }

    #[test]
    fn sliding_between_buttons_clicks_on_each_change() {
        let (mut pad, bridge, actuator) = pad(r#""b1 b2""#, 200.0, 100.0);
        pad.handle_touch(&event(TouchPhase::Start, "b1", &[(1, 50.0, 50.0)]));
        assert_eq!(bridge.last_update(), Some(vec![0, 1, 0]));
        assert_eq!(actuator.pulses().len(), 1);

        // inside both overshoot hitboxes
        pad.handle_touch(&event(TouchPhase::Move, "b1", &[(1, 100.0, 50.0)]));
        assert_eq!(bridge.last_update(), Some(vec![0, 1, 1]));
        assert_eq!(actuator.pulses().len(), 2);

        pad.handle_touch(&event(TouchPhase::Move, "b1", &[(1, 150.0, 50.0)]));
        assert_eq!(bridge.last_update(), Some(vec![0, 0, 1]));
        assert_eq!(actuator.pulses().len(), 3);

        pad.handle_touch(&event(TouchPhase::End, "b1", &[(1, 150.0, 50.0)]));
        assert_eq!(bridge.last_update(), Some(vec![0, 0, 0]));
        assert_eq!(pad.active_touches(), 0);
    }

    #[test]
    fn second_finger_on_a_held_button_still_clicks() {
        let (mut pad, _, actuator) = pad(r#""b1""#, 100.0, 100.0);
        pad.handle_touch(&event(TouchPhase::Start, "b1", &[(1, 50.0, 50.0)]));
        pad.handle_touch(&event(TouchPhase::Start, "b1", &[(2, 60.0, 50.0)]));
        assert_eq!(actuator.pulses().len(), 2);
    }

    #[test]
    fn fingers_are_tracked_per_control() {
        let (mut pad, _, _) = pad(r#""j1 dp""#, 200.0, 100.0);
        pad.handle_touch(&event(TouchPhase::Start, "dp", &[(7, 150.0, 10.0)]));
        pad.handle_touch(&event(TouchPhase::Start, "j1", &[(8, 75.0, 50.0)]));
        pad.handle_touch(&event(TouchPhase::Move, "j1", &[(8, 50.0, 50.0)]));

        match pad.control("dp") {
            Some(Control::DPad(dpad)) => assert_eq!(dpad.direction(), DPadDirection::Up),
            other => panic!("expected dpad, got {:?}", other),
        }
        assert_eq!(pad.active_touches(), 2);
        assert_eq!(&pad.state_bytes()[1..5], &[0x40, 0x00, 0x40, 0x00]);
    }

    #[test]
    fn motion_fans_out_to_watchers() {
        let (mut pad, bridge, _) = pad(r#""mx mb""#, 200.0, 100.0);
        let before = bridge.updates().len();
        pad.handle_device_motion(MotionSample {
            x: 40.0,
            y: 0.0,
            z: 0.0,
        });
        pad.handle_device_orientation(OrientationSample {
            alpha: 0.0,
            beta: -180.0,
            gamma: 0.0,
        });
        assert_eq!(bridge.updates().len(), before + 2);
        // attach order is mb, mx; mb: -0.5 + 0.5 = 0, mx: 40 * 0.0125 + 0.5 saturates
        assert_eq!(pad.control_ids(), vec!["mb", "mx"]);
        assert_eq!(pad.state_bytes(), &[0, 0x00, 0x00, 0x7f, 0xff]);
    }

    #[test]
    fn motion_without_watchers_does_not_push() {
        let (mut pad, bridge, _) = pad(r#""b1""#, 100.0, 100.0);
        let before = bridge.updates().len();
        pad.handle_device_motion(MotionSample::default());
        assert_eq!(bridge.updates().len(), before);
    }

    #[test]
    fn debug_label_shows_dump() {
        let (mut pad, _, _) = pad(r#""b1 dbg""#, 200.0, 100.0);
        assert_eq!(pad.control_ids(), vec!["b1"]);
        assert_eq!(pad.debug_text(), Some("b1\n"));
        pad.handle_touch(&event(TouchPhase::Start, "b1", &[(1, 50.0, 50.0)]));
        pad.set_debug_message("hi");
        assert_eq!(pad.debug_text(), Some(":00:01:\nhi"));
    }

    #[test]
    fn resize_keeps_state() {
        let (mut pad, _, _) = pad(r#""s1""#, 100.0, 100.0);
        pad.handle_touch(&event(TouchPhase::Start, "s1", &[(1, 75.0, 50.0)]));
        pad.handle_touch(&event(TouchPhase::End, "s1", &[(1, 75.0, 50.0)]));
        let before = pad.state_bytes().to_vec();

        pad.attach(&GridLayout::parse(r#""s1""#, Rect::new(0.0, 0.0, 400.0, 400.0)));
        assert_eq!(pad.state_bytes(), before.as_slice());
        match pad.control("s1") {
            Some(Control::Joystick(stick)) => assert_eq!(stick.hitbox().width, 400.0),
            other => panic!("expected joystick, got {:?}", other),
        }
    }
}
