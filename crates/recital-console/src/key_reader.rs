//! Blocking single-key input from the controlling terminal.
//!
//! Each read switches the terminal out of canonical mode only for its own
//! duration, so output written between reads and any player started in
//! between see a normal terminal. Ctrl+C arrives as a byte while a read is in
//! progress; at any other time it is delivered as SIGINT.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use recital_core::error::{RecitalError, Result};
use recital_core::traits::KeyReader;
use recital_core::types::KeyPress;

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;

/// How often a waiting read checks the interrupt flag.
const POLL_INTERVAL_MS: i32 = 100;

/// Decode the bytes of one key press.
///
/// No bytes (end of input), Ctrl+C and Ctrl+D map to [`KeyPress::Interrupt`].
/// Undecodable input becomes U+FFFD, which no binding uses.
pub fn decode_key(bytes: &[u8]) -> KeyPress {
    match bytes {
        [] | [CTRL_C] | [CTRL_D] => KeyPress::Interrupt,
        _ => {
            let c = std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            KeyPress::Char(c)
        }
    }
}

/// Length of the UTF-8 sequence that starts with `first`.
fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

fn terminal_error(err: std::io::Error) -> RecitalError {
    RecitalError::Terminal(err.to_string())
}

pub struct TerminalKeyReader {
    #[cfg(unix)]
    fd: libc::c_int,
    interrupted: Option<Arc<AtomicBool>>,
}

impl TerminalKeyReader {
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            fd: libc::STDIN_FILENO,
            interrupted: None,
        }
    }

    /// Return [`KeyPress::Interrupt`] from a waiting read once `flag` is set.
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(flag);
        self
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

impl Default for TerminalKeyReader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unix: termios + poll
// =============================================================================

#[cfg(unix)]
mod unix {
    use libc::c_int;

    pub(super) fn get_termios(fd: c_int) -> std::io::Result<libc::termios> {
        let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
        let result = unsafe { libc::tcgetattr(fd, &mut termios) };
        if result != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(termios)
    }

    pub(super) fn set_termios(fd: c_int, termios: &libc::termios) -> std::io::Result<()> {
        let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
        if result != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(())
    }

    /// Single keys, no echo, Ctrl+C as data.
    pub(super) fn key_mode(original: &libc::termios) -> libc::termios {
        let mut raw = *original;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        raw
    }

    /// True when a read would not block (data or end of input).
    pub(super) fn poll_readable(fd: c_int, timeout_ms: i32) -> std::io::Result<bool> {
        let mut fds = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
        if result < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        Ok(result > 0 && (fds.revents & (libc::POLLIN | libc::POLLHUP)) != 0)
    }

    /// `None` at end of input.
    pub(super) fn read_byte(fd: c_int) -> std::io::Result<Option<u8>> {
        let mut byte = 0u8;
        loop {
            let read_len = unsafe { libc::read(fd, &mut byte as *mut u8 as *mut _, 1) };
            match read_len {
                1 => return Ok(Some(byte)),
                0 => return Ok(None),
                _ => {
                    let err = std::io::Error::last_os_error();
                    if err.kind() != std::io::ErrorKind::Interrupted {
                        return Err(err);
                    }
                }
            }
        }
    }
}

#[cfg(unix)]
impl TerminalKeyReader {
    fn read_sequence(&self) -> Result<Vec<u8>> {
        loop {
            if self.is_interrupted() {
                return Ok(Vec::new());
            }
            if unix::poll_readable(self.fd, POLL_INTERVAL_MS).map_err(terminal_error)? {
                break;
            }
        }

        let Some(first) = unix::read_byte(self.fd).map_err(terminal_error)? else {
            return Ok(Vec::new());
        };
        let mut bytes = vec![first];
        for _ in 1..utf8_len(first) {
            match unix::read_byte(self.fd).map_err(terminal_error)? {
                Some(byte) => bytes.push(byte),
                None => break,
            }
        }
        Ok(bytes)
    }
}

#[cfg(unix)]
impl KeyReader for TerminalKeyReader {
    fn read_key(&mut self) -> Result<KeyPress> {
        // Not a terminal (piped input): read as is.
        let original = unix::get_termios(self.fd).ok();
        if let Some(original) = &original {
            unix::set_termios(self.fd, &unix::key_mode(original)).map_err(terminal_error)?;
        }

        let result = self.read_sequence();

        if let Some(original) = &original {
            if let Err(e) = unix::set_termios(self.fd, original) {
                tracing::warn!(error = %e, "Failed to restore terminal mode");
            }
        }

        let key = decode_key(&result?);
        tracing::trace!(?key, "Key read");
        Ok(key)
    }
}

// =============================================================================
// Windows: CRT console input
// =============================================================================

#[cfg(windows)]
extern "C" {
    fn _kbhit() -> libc::c_int;
    fn _getch() -> libc::c_int;
}

#[cfg(windows)]
impl KeyReader for TerminalKeyReader {
    fn read_key(&mut self) -> Result<KeyPress> {
        loop {
            if self.is_interrupted() {
                return Ok(KeyPress::Interrupt);
            }
            if unsafe { _kbhit() } != 0 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS as u64));
        }

        let first = unsafe { _getch() };
        // Function and arrow keys arrive as a prefix plus a scan code.
        if first == 0 || first == 0xe0 {
            unsafe { _getch() };
            return Ok(KeyPress::Char(char::REPLACEMENT_CHARACTER));
        }
        Ok(decode_key(&[first as u8]))
    }
}

#[cfg(not(any(unix, windows)))]
impl KeyReader for TerminalKeyReader {
    fn read_key(&mut self) -> Result<KeyPress> {
        Err(RecitalError::Terminal(
            "single-key input is not supported on this platform".to_string(),
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        assert_eq!(decode_key(b"l"), KeyPress::Char('l'));
        assert_eq!(decode_key(b"Q"), KeyPress::Char('Q'));
        assert_eq!(decode_key(b" "), KeyPress::Char(' '));
    }

    #[test]
    fn test_decode_interrupts() {
        assert_eq!(decode_key(&[]), KeyPress::Interrupt);
        assert_eq!(decode_key(&[CTRL_C]), KeyPress::Interrupt);
        assert_eq!(decode_key(&[CTRL_D]), KeyPress::Interrupt);
    }

    #[test]
    fn test_decode_multibyte() {
        assert_eq!(decode_key("é".as_bytes()), KeyPress::Char('é'));
        assert_eq!(decode_key("€".as_bytes()), KeyPress::Char('€'));
        assert_eq!(decode_key("🎧".as_bytes()), KeyPress::Char('🎧'));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert_eq!(
            decode_key(&[0xc3]),
            KeyPress::Char(char::REPLACEMENT_CHARACTER)
        );
    }

    #[test]
    fn test_utf8_len() {
        assert_eq!(utf8_len(b'a'), 1);
        assert_eq!(utf8_len(0xc3), 2);
        assert_eq!(utf8_len(0xe2), 3);
        assert_eq!(utf8_len(0xf0), 4);
        assert_eq!(utf8_len(0x80), 1);
    }

    #[cfg(unix)]
    mod pipe {
        use super::*;

        struct Pipe {
            read: libc::c_int,
            write: libc::c_int,
        }

        impl Pipe {
            fn new() -> Self {
                let mut fds = [0 as libc::c_int; 2];
                assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
                Self {
                    read: fds[0],
                    write: fds[1],
                }
            }

            fn send(&self, bytes: &[u8]) {
                let written =
                    unsafe { libc::write(self.write, bytes.as_ptr() as *const _, bytes.len()) };
                assert_eq!(written, bytes.len() as isize);
            }

            fn close_write(&mut self) {
                unsafe { libc::close(self.write) };
                self.write = -1;
            }

            fn reader(&self) -> TerminalKeyReader {
                TerminalKeyReader {
                    fd: self.read,
                    interrupted: None,
                }
            }
        }

        impl Drop for Pipe {
            fn drop(&mut self) {
                unsafe {
                    libc::close(self.read);
                    if self.write >= 0 {
                        libc::close(self.write);
                    }
                }
            }
        }

        #[test]
        fn test_reads_keys_one_at_a_time() {
            let pipe = Pipe::new();
            pipe.send("lé ".as_bytes());
            let mut reader = pipe.reader();

            assert_eq!(reader.read_key().unwrap(), KeyPress::Char('l'));
            assert_eq!(reader.read_key().unwrap(), KeyPress::Char('é'));
            assert_eq!(reader.read_key().unwrap(), KeyPress::Char(' '));
        }

        #[test]
        fn test_ctrl_c_byte_interrupts() {
            let pipe = Pipe::new();
            pipe.send(&[CTRL_C]);
            let mut reader = pipe.reader();

            assert_eq!(reader.read_key().unwrap(), KeyPress::Interrupt);
        }

        #[test]
        fn test_end_of_input_interrupts() {
            let mut pipe = Pipe::new();
            pipe.send(b"q");
            pipe.close_write();
            let mut reader = pipe.reader();

            assert_eq!(reader.read_key().unwrap(), KeyPress::Char('q'));
            assert_eq!(reader.read_key().unwrap(), KeyPress::Interrupt);
        }

        #[test]
        fn test_interrupt_flag_ends_wait() {
            let pipe = Pipe::new();
            let flag = Arc::new(AtomicBool::new(true));
            let mut reader = pipe.reader().with_interrupt_flag(flag);

            assert_eq!(reader.read_key().unwrap(), KeyPress::Interrupt);
        }
    }
}
