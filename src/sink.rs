//! Input-injection sinks.
//!
//! The controller drives pointer output through [`InputSink`], a fixed
//! contract of move, click, double-click, drag toggle and scroll. Calls are
//! fire-and-forget: a backend reports success or failure and nothing more.
//!
//! - [`LogSink`] records actions through `tracing` and injects nothing
//!   (dry runs, replays on headless machines).
//! - [`EnigoSink`] synthesizes real OS input (feature `native-input`).

use tracing::info;

use crate::error::Result;

/// Pointer buttons the controller clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// OS-level pointer actuator
#[cfg_attr(test, mockall::automock)]
pub trait InputSink {
    /// Move the pointer to absolute screen coordinates
    fn move_to(&mut self, x: f64, y: f64) -> Result<()>;

    /// Press and release a button
    fn click(&mut self, button: MouseButton) -> Result<()>;

    /// Two left clicks in quick succession
    fn double_click(&mut self) -> Result<()>;

    /// Press (`true`) or release (`false`) the left button
    fn set_drag(&mut self, held: bool) -> Result<()>;

    /// Scroll vertically. Positive scrolls up, negative down.
    fn scroll(&mut self, delta: i32) -> Result<()>;
}

impl<S: InputSink + ?Sized> InputSink for Box<S> {
    fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        (**self).move_to(x, y)
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        (**self).click(button)
    }

    fn double_click(&mut self) -> Result<()> {
        (**self).double_click()
    }

    fn set_drag(&mut self, held: bool) -> Result<()> {
        (**self).set_drag(held)
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        (**self).scroll(delta)
    }
}

/// Sink that only logs what it would do
#[derive(Debug, Default)]
pub struct LogSink {
    calls: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls received
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl InputSink for LogSink {
    fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.calls += 1;
        info!("move to ({:.1}, {:.1})", x, y);
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.calls += 1;
        info!(?button, "click");
        Ok(())
    }

    fn double_click(&mut self) -> Result<()> {
        self.calls += 1;
        info!("double click");
        Ok(())
    }

    fn set_drag(&mut self, held: bool) -> Result<()> {
        self.calls += 1;
        info!(held, "drag");
        Ok(())
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        self.calls += 1;
        info!(delta, "scroll");
        Ok(())
    }
}

#[cfg(feature = "native-input")]
pub use native::EnigoSink;

#[cfg(feature = "native-input")]
mod native {
    use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
    use tracing::debug;

    use super::{InputSink, MouseButton};
    use crate::error::{Error, Result};

    /// Real pointer injection through enigo
    pub struct EnigoSink {
        enigo: Enigo,
    }

    impl EnigoSink {
        /// Connect to the platform input backend
        pub fn new() -> Result<Self> {
            let enigo = Enigo::new(&Settings::default()).map_err(|e| Error::injection("connect", e))?;
            Ok(Self { enigo })
        }

        /// Size of the main display in pixels
        pub fn display_size(&self) -> Result<(u32, u32)> {
            let (width, height) = self
                .enigo
                .main_display()
                .map_err(|e| Error::injection("main_display", e))?;
            debug!("Main display: {}x{}", width, height);
            Ok((width.max(0) as u32, height.max(0) as u32))
        }

        fn press(&mut self, button: Button, direction: Direction, action: &'static str) -> Result<()> {
            self.enigo
                .button(button, direction)
                .map_err(|e| Error::injection(action, e))
        }
    }

    impl InputSink for EnigoSink {
        fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
            self.enigo
                .move_mouse(x.round() as i32, y.round() as i32, Coordinate::Abs)
                .map_err(|e| Error::injection("move_to", e))
        }

        fn click(&mut self, button: MouseButton) -> Result<()> {
            let button = match button {
                MouseButton::Left => Button::Left,
                MouseButton::Right => Button::Right,
            };
            self.press(button, Direction::Click, "click")
        }

        fn double_click(&mut self) -> Result<()> {
            self.press(Button::Left, Direction::Click, "double_click")?;
            self.press(Button::Left, Direction::Click, "double_click")
        }

        fn set_drag(&mut self, held: bool) -> Result<()> {
            let direction = if held {
                Direction::Press
            } else {
                Direction::Release
            };
            self.press(Button::Left, direction, "set_drag")
        }

        fn scroll(&mut self, delta: i32) -> Result<()> {
            // enigo scrolls down for positive lengths
            self.enigo
                .scroll(-delta, Axis::Vertical)
                .map_err(|e| Error::injection("scroll", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sink_counts_calls() {
        let mut sink = LogSink::new();
        sink.move_to(10.0, 20.0).unwrap();
        sink.click(MouseButton::Right).unwrap();
        sink.double_click().unwrap();
        sink.set_drag(true).unwrap();
        sink.scroll(-70).unwrap();
        assert_eq!(sink.calls(), 5);
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let mut mock = MockInputSink::new();
        mock.expect_scroll()
            .withf(|delta| *delta == 70)
            .times(1)
            .returning(|_| Ok(()));

        let mut boxed: Box<dyn InputSink> = Box::new(mock);
        boxed.scroll(70).unwrap();
    }
}
