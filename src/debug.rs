//! Debug stream with `print`/`println` semantics on top of the `log` facade.
//!
//! `debug_print!` appends to a pending line and `debug_println!` terminates it;
//! every completed line becomes one `log` record under [`DEBUG_LOG_TARGET`].
//! Without the `debug` feature both macros expand to nothing and their
//! arguments are never evaluated.

use core::fmt::{self, Write};

use heapless::String;

#[cfg(feature = "debug")]
use crate::constants::DEBUG_LINE_CAPACITY;
#[allow(unused_imports)]
use crate::constants::DEBUG_LOG_TARGET;

/// Pending text of the current debug line.
pub struct LineBuffer<const N: usize> {
    line: String<N>,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
        }
    }

    pub fn pending(&self) -> &str {
        &self.line
    }

    /// Append formatted text. Embedded newlines complete the line and a full
    /// buffer is flushed early, so `emit` may run several times.
    pub fn push<F: FnMut(&str)>(&mut self, args: fmt::Arguments<'_>, emit: &mut F) {
        let mut sink = Sink {
            line: &mut self.line,
            emit,
        };
        // Sink never fails
        let _ = sink.write_fmt(args);
    }

    /// Terminate the current line, emitting it even when empty.
    pub fn finish_line<F: FnMut(&str)>(&mut self, emit: &mut F) {
        emit(self.line.as_str());
        self.line.clear();
    }
}

struct Sink<'a, const N: usize, F: FnMut(&str)> {
    line: &'a mut String<N>,
    emit: &'a mut F,
}

impl<const N: usize, F: FnMut(&str)> Write for Sink<'_, N, F> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            match c {
                '\r' => {}
                '\n' => {
                    (self.emit)(self.line.as_str());
                    self.line.clear();
                }
                c => {
                    if self.line.push(c).is_err() {
                        (self.emit)(self.line.as_str());
                        self.line.clear();
                        // a char wider than the whole buffer is dropped
                        let _ = self.line.push(c);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(feature = "debug")]
mod stream {
    use core::cell::RefCell;

    use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

    use super::*;

    static STREAM: Mutex<CriticalSectionRawMutex, RefCell<LineBuffer<DEBUG_LINE_CAPACITY>>> =
        Mutex::new(RefCell::new(LineBuffer::new()));

    fn emit(line: &str) {
        log::debug!(target: DEBUG_LOG_TARGET, "{}", line);
    }

    pub fn print(args: fmt::Arguments<'_>) {
        STREAM.lock(|stream| stream.borrow_mut().push(args, &mut emit));
    }

    pub fn println(args: fmt::Arguments<'_>) {
        STREAM.lock(|stream| {
            let mut stream = stream.borrow_mut();
            stream.push(args, &mut emit);
            stream.finish_line(&mut emit);
        });
    }
}

#[cfg(feature = "debug")]
pub use stream::{print, println};

/// Print to the debug stream without ending the line.
#[cfg(feature = "debug")]
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        $crate::debug::print(format_args!($($arg)*))
    };
}

/// Print to the debug stream and end the line.
#[cfg(feature = "debug")]
#[macro_export]
macro_rules! debug_println {
    () => {
        $crate::debug::println(format_args!(""))
    };
    ($($arg:tt)*) => {
        $crate::debug::println(format_args!($($arg)*))
    };
}

#[cfg(not(feature = "debug"))]
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "debug"))]
#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {};
}
