//! Terminal stand-ins for the node peripherals.

use doorlock_hardware::mock::VirtualLcd;
use doorlock_hardware::{
    BuzzerDevice, DisplayDevice, HardwareError, KeypadDevice, KeypadInput, MotorDevice,
    MotorDirection, Result,
};
use std::collections::VecDeque;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

/// Character LCD drawn as a framed box on a writer (stdout by default).
///
/// Every change redraws the whole panel.
#[derive(Debug)]
pub struct ConsoleDisplay<W = std::io::Stdout> {
    lcd: VirtualLcd,
    out: W,
}

impl ConsoleDisplay {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            lcd: VirtualLcd::default(),
            out,
        }
    }

    pub fn lcd(&self) -> &VirtualLcd {
        &self.lcd
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self) -> Result<()> {
        let border = format!("+{}+", "-".repeat(self.lcd.columns()));
        let mut frame = String::new();
        frame.push_str(&border);
        frame.push('\n');
        for line in self.lcd.lines() {
            frame.push('|');
            frame.push_str(&line);
            frame.push_str("|\n");
        }
        frame.push_str(&border);
        frame.push('\n');

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send + Sync> DisplayDevice for ConsoleDisplay<W> {
    async fn show(&mut self, text: &str, row: usize, col: usize) -> Result<()> {
        self.lcd.write_at(text, row, col)?;
        self.draw()
    }

    async fn clear(&mut self) -> Result<()> {
        self.lcd.clear();
        self.draw()
    }
}

/// Keypad fed by lines of key legends, e.g. `+12345=`.
///
/// Whitespace is skipped; characters that are not on the keypad are logged
/// and dropped. End of input disconnects the keypad.
#[derive(Debug)]
pub struct LineKeypad<R> {
    reader: R,
    pending: VecDeque<KeypadInput>,
}

impl LineKeypad<tokio::io::BufReader<tokio::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> LineKeypad<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    async fn fill(&mut self) -> Result<()> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                return Err(HardwareError::disconnected("keypad input closed"));
            }
            for c in line.chars().filter(|c| !c.is_whitespace()) {
                match KeypadInput::from_char(c) {
                    Ok(key) => self.pending.push_back(key),
                    Err(_) => warn!(key = %c, "Not a keypad key"),
                }
            }
        }
        Ok(())
    }
}

impl<R: AsyncBufRead + Unpin + Send + Sync> KeypadDevice for LineKeypad<R> {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        self.fill().await?;
        self.pending
            .pop_front()
            .ok_or_else(|| HardwareError::disconnected("keypad input closed"))
    }
}

/// Door motor that logs its direction.
#[derive(Debug, Default)]
pub struct ConsoleMotor {
    direction: MotorDirection,
}

impl ConsoleMotor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> MotorDirection {
        self.direction
    }
}

impl MotorDevice for ConsoleMotor {
    async fn set_direction(&mut self, direction: MotorDirection) -> Result<()> {
        if direction != self.direction {
            info!(%direction, "Door motor");
        }
        self.direction = direction;
        Ok(())
    }
}

/// Buzzer that logs when it sounds.
#[derive(Debug, Default)]
pub struct ConsoleBuzzer {
    sounding: bool,
}

impl ConsoleBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }
}

impl BuzzerDevice for ConsoleBuzzer {
    async fn on(&mut self) -> Result<()> {
        self.sounding = true;
        warn!("Buzzer on");
        Ok(())
    }

    async fn off(&mut self) -> Result<()> {
        self.sounding = false;
        info!("Buzzer off");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_display_draws_frame() {
        let mut display = ConsoleDisplay::new(Vec::new());
        display.show("HELLO", 0, 0).await.unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("+{}+", "-".repeat(40)));
        assert_eq!(lines[1], format!("|HELLO{}|", " ".repeat(35)));
        assert_eq!(lines[2], format!("|{}|", " ".repeat(40)));
    }

    #[tokio::test]
    async fn test_display_rejects_bad_position() {
        let mut display = ConsoleDisplay::new(Vec::new());
        assert!(display.show("X", 2, 0).await.is_err());
        assert!(display.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_keypad_reads_lines() {
        let input: &[u8] = b"+1 2\n\nx345=\n";
        let mut keypad = LineKeypad::new(input);

        let mut keys = Vec::new();
        for _ in 0..6 {
            keys.push(keypad.read_input().await.unwrap().as_char());
        }

        assert_eq!(keys, vec!['+', '1', '2', '3', '4', '5']);
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Equals);
        assert!(matches!(
            keypad.read_input().await,
            Err(HardwareError::Disconnected { .. })
        ));
    }

    #[tokio::test]
    async fn test_motor_and_buzzer_track_state() {
        let mut motor = ConsoleMotor::new();
        motor.set_direction(MotorDirection::Forward).await.unwrap();
        assert_eq!(motor.direction(), MotorDirection::Forward);

        let mut buzzer = ConsoleBuzzer::new();
        buzzer.on().await.unwrap();
        assert!(buzzer.is_sounding());
        buzzer.off().await.unwrap();
        assert!(!buzzer.is_sounding());
    }
}
