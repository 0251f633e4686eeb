// Platform module - OS-level screen capture and synthetic input
// This module hides the desktop backends behind two small traits so the
// detection and control code can run against scripted fakes in tests.

pub mod desktop;
pub mod error;
pub mod types;

// Re-export the main types for easy access
pub use desktop::{DesktopInput, DesktopScreen};
pub use error::{PlatformError, PlatformResult};
pub use types::{DisplayInfo, InputDriver, ScreenPoint, ScreenSource};
