//! Virtual character LCD.
//!
//! [`VirtualLcd`] models the display RAM of an HD44780-style controller:
//! `rows` lines of `columns` cells, written at a cursor position. Text that
//! runs past the end of a row is dropped. Only printable ASCII is accepted,
//! as on the real panel.
//!
//! [`MockDisplay`] wraps it as a [`DisplayDevice`] and publishes every
//! change through a [`MockDisplayHandle`]:
//!
//! ```
//! use doorlock_hardware::mock::MockDisplay;
//! use doorlock_hardware::traits::DisplayDevice;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorlock_hardware::Result<()> {
//! let (mut lcd, handle) = MockDisplay::new();
//! lcd.show("(+): Open The Door.", 0, 0).await?;
//!
//! assert_eq!(handle.line(0).trim_end(), "(+): Open The Door.");
//! assert!(handle.contains("Open The Door"));
//! # Ok(())
//! # }
//! ```

use crate::{
    HardwareError, Result,
    mock::EventLog,
    traits::DisplayDevice,
    types::DisplayEvent,
};
use tokio::sync::watch;

/// Number of lines on the panel.
pub const DEFAULT_ROWS: usize = 2;

/// Display RAM cells per line.
pub const DEFAULT_COLUMNS: usize = 40;

/// Character grid of a text LCD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualLcd {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<u8>>,
}

impl VirtualLcd {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![vec![b' '; columns]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Write `text` at (`row`, `col`), dropping what does not fit.
    ///
    /// # Errors
    ///
    /// Returns an error for a position outside the grid or text that is not
    /// printable ASCII. Nothing is written in that case.
    pub fn write_at(&mut self, text: &str, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.columns {
            return Err(HardwareError::InvalidPosition {
                row,
                col,
                rows: self.rows,
                cols: self.columns,
            });
        }
        if let Some(c) = text.chars().find(|c| !(c.is_ascii_graphic() || *c == ' ')) {
            return Err(HardwareError::invalid_data(format!(
                "LCD accepts printable ASCII only, got {c:?}"
            )));
        }

        let line = &mut self.cells[row];
        for (cell, byte) in line[col..].iter_mut().zip(text.bytes()) {
            *cell = byte;
        }
        Ok(())
    }

    /// Blank every cell.
    pub fn clear(&mut self) {
        for line in &mut self.cells {
            line.fill(b' ');
        }
    }

    /// One line, padded to the full width. Empty for a row outside the grid.
    pub fn line(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        (0..self.rows).map(|row| self.line(row)).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|line| line.iter().all(|&b| b == b' '))
    }
}

impl Default for VirtualLcd {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

/// Mock display device backed by a [`VirtualLcd`].
#[derive(Debug)]
pub struct MockDisplay {
    lcd: VirtualLcd,
    frame_tx: watch::Sender<VirtualLcd>,
    log: EventLog<DisplayEvent>,
}

impl MockDisplay {
    /// Create a 2x40 display and its observation handle.
    pub fn new() -> (Self, MockDisplayHandle) {
        Self::with_size(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }

    pub fn with_size(rows: usize, columns: usize) -> (Self, MockDisplayHandle) {
        let lcd = VirtualLcd::new(rows, columns);
        let (frame_tx, frame_rx) = watch::channel(lcd.clone());
        let log = EventLog::new();

        let display = Self {
            lcd,
            frame_tx,
            log: log.clone(),
        };
        (display, MockDisplayHandle { frame_rx, log })
    }

    fn publish(&self) {
        self.frame_tx.send_replace(self.lcd.clone());
    }
}

impl DisplayDevice for MockDisplay {
    async fn show(&mut self, text: &str, row: usize, col: usize) -> Result<()> {
        self.lcd.write_at(text, row, col)?;
        self.log.record(DisplayEvent::Show {
            text: text.to_string(),
            row,
            col,
        });
        self.publish();
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        self.lcd.clear();
        self.log.record(DisplayEvent::Clear);
        self.publish();
        Ok(())
    }
}

/// Read side of a [`MockDisplay`]. Cloneable.
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    frame_rx: watch::Receiver<VirtualLcd>,
    log: EventLog<DisplayEvent>,
}

impl MockDisplayHandle {
    /// Current panel contents.
    pub fn frame(&self) -> VirtualLcd {
        self.frame_rx.borrow().clone()
    }

    pub fn line(&self, row: usize) -> String {
        self.frame_rx.borrow().line(row)
    }

    /// Whether `text` currently appears on any line.
    pub fn contains(&self, text: &str) -> bool {
        self.frame_rx
            .borrow()
            .lines()
            .iter()
            .any(|line| line.contains(text))
    }

    /// Wait until `text` appears on the panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the display is dropped first.
    pub async fn wait_for_text(&mut self, text: &str) -> Result<()> {
        self.frame_rx
            .wait_for(|lcd| lcd.lines().iter().any(|line| line.contains(text)))
            .await
            .map(|_| ())
            .map_err(|_| HardwareError::disconnected("Display dropped"))
    }

    /// Every show/clear call so far.
    pub fn events(&self) -> &EventLog<DisplayEvent> {
        &self.log
    }

    /// Texts passed to `show`, in order.
    pub fn shown_texts(&self) -> Vec<String> {
        self.log
            .events()
            .into_iter()
            .filter_map(|event| match event {
                DisplayEvent::Show { text, .. } => Some(text),
                DisplayEvent::Clear => None,
            })
            .collect()
    }
}
