// Global F1-F4 hotkeys mapped onto the control token
use crate::fishing::ControlToken;
use rdev::{Event, EventType, Key, listen};
use std::thread::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    /// Resume a paused run, or start a new one after a stop
    Start,
    TogglePause,
    Stop,
    EmergencyStop,
}

pub fn action_for(key: Key) -> Option<HotkeyAction> {
    match key {
        Key::F1 => Some(HotkeyAction::Start),
        Key::F2 => Some(HotkeyAction::TogglePause),
        Key::F3 => Some(HotkeyAction::Stop),
        Key::F4 => Some(HotkeyAction::EmergencyStop),
        _ => None,
    }
}

pub fn apply(action: HotkeyAction, control: &ControlToken) {
    match action {
        HotkeyAction::Start if control.is_running() => {
            control.resume();
            log::info!("▶️ Resumed (F1)");
        }
        HotkeyAction::Start => {
            control.request_start();
            log::info!("▶️ Start requested (F1)");
        }
        HotkeyAction::TogglePause => {
            if control.toggle_pause() {
                log::info!("⏸️ Paused (F2)");
            } else {
                log::info!("▶️ Resumed (F2)");
            }
        }
        HotkeyAction::Stop => {
            control.stop();
            log::info!("⏹️ Stop requested (F3)");
        }
        HotkeyAction::EmergencyStop => {
            control.emergency_stop();
            log::warn!("🛑 EMERGENCY STOP (F4)");
        }
    }
}

/// Listen for hotkeys on a background thread for the rest of the process.
/// A listener that cannot start only disables hotkeys.
pub fn spawn_listener(control: ControlToken) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("hotkeys".to_string())
        .spawn(move || {
            let result = listen(move |event: Event| {
                if let EventType::KeyPress(key) = event.event_type {
                    if let Some(action) = action_for(key) {
                        apply(action, &control);
                    }
                }
            });
            if let Err(e) = result {
                log::warn!("⚠️ Hotkeys unavailable: {e:?}");
            }
        })
}
