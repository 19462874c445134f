use apa102_gpio::strip::frame::{end_frame, START_FRAME};
use apa102_gpio::strip::GpioError;
use apa102_gpio::{Apa102, LedOutput, LinePair, StripError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Line pair double that records writes and can fail on demand
#[derive(Clone, Default)]
struct FakeLines {
    waveform: Rc<RefCell<Vec<(bool, bool)>>>,
    released: Rc<Cell<u32>>,
    fail_at: Rc<Cell<Option<usize>>>,
}

impl LinePair for FakeLines {
    fn set_values(&mut self, clock: bool, data: bool) -> Result<(), GpioError> {
        let mut waveform = self.waveform.borrow_mut();
        if self.fail_at.get() == Some(waveform.len()) {
            return Err(GpioError::Write("device gone".to_string()));
        }
        waveform.push((clock, data));
        Ok(())
    }

    fn release(self) -> Result<(), GpioError> {
        self.released.set(self.released.get() + 1);
        Ok(())
    }
}

impl FakeLines {
    fn writes(&self) -> usize {
        self.waveform.borrow().len()
    }

    fn clear(&self) {
        self.waveform.borrow_mut().clear();
    }

    fn latched_bytes(&self) -> Vec<u8> {
        let waveform = self.waveform.borrow();
        let bits: Vec<bool> = waveform
            .windows(2)
            .filter(|w| !w[0].0 && w[1].0)
            .map(|w| w[1].1)
            .collect();
        bits.chunks(8)
            .map(|bits| bits.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
            .collect()
    }
}

fn expected_frame(outputs: &[LedOutput]) -> Vec<u8> {
    let mut frame = START_FRAME.to_vec();
    for output in outputs {
        frame.extend_from_slice(&output.pack());
    }
    frame.extend(end_frame(outputs.len()));
    frame
}

#[test]
fn test_frame_layout_for_various_lengths() {
    for leds in [0, 1, 2, 16, 17, 1000] {
        let strip = Apa102::new(FakeLines::default(), leds, false).unwrap();
        assert_eq!(strip.frame(), expected_frame(&vec![LedOutput::OFF; leds]).as_slice());
        assert_eq!(strip.len(), leds);
    }
}

#[test]
fn test_commit_transmits_frame_on_wire() {
    let lines = FakeLines::default();
    let mut strip = Apa102::new(lines.clone(), 3, false).unwrap();

    let outputs = [
        LedOutput::new(31, 255, 0, 0),
        LedOutput::new(16, 0, 255, 0),
        LedOutput::new(1, 0, 0, 255),
    ];
    for (i, output) in outputs.iter().enumerate() {
        strip.set(i, *output).unwrap();
    }
    assert_eq!(strip.iter().collect::<Vec<_>>(), outputs);

    strip.commit().unwrap();
    assert_eq!(
        lines.latched_bytes(),
        vec![0, 0, 0, 0, 0xFF, 0, 0, 255, 0xF0, 0, 255, 0, 0xE1, 255, 0, 0, 0]
    );
}

#[test]
fn test_data_settles_before_clock_rises() {
    let lines = FakeLines::default();
    let mut strip = Apa102::new(lines.clone(), 4, false).unwrap();
    strip.set(2, LedOutput::new(21, 0xA5, 0x5A, 0xC3)).unwrap();
    strip.commit().unwrap();

    let waveform = lines.waveform.borrow();
    for (t, &(clock, data)) in waveform.iter().enumerate() {
        if clock {
            assert!(t > 0);
            assert_eq!(waveform[t - 1], (false, data), "write {}", t);
        }
    }
}

#[test]
fn test_reset_on_init_commits_once() {
    let lines = FakeLines::default();
    let mut strip = Apa102::new(lines.clone(), 8, true).unwrap();
    assert_eq!(lines.latched_bytes(), strip.frame());

    let sent = lines.writes();
    strip.commit().unwrap();
    assert_eq!(lines.writes(), sent);
}

#[test]
fn test_failed_commit_stays_dirty() {
    let lines = FakeLines::default();
    let mut strip = Apa102::new(lines.clone(), 8, false).unwrap();
    strip.set(5, LedOutput::new(3, 3, 3, 3)).unwrap();

    lines.fail_at.set(Some(100));
    let err = strip.commit().unwrap_err();
    assert!(matches!(err, StripError::Gpio(GpioError::Write(_))));
    assert!(strip.is_dirty());

    lines.fail_at.set(None);
    lines.clear();
    strip.commit().unwrap();
    assert!(!strip.is_dirty());
    assert_eq!(lines.latched_bytes(), strip.frame());
}

#[test]
fn test_failed_reset_releases_lines() {
    let lines = FakeLines::default();
    lines.fail_at.set(Some(0));
    let result = Apa102::new(lines.clone(), 8, true);
    assert!(matches!(result, Err(StripError::Gpio(_))));
    assert_eq!(lines.released.get(), 1);
}

#[test]
fn test_close_releases_lines_once() {
    let lines = FakeLines::default();
    let strip = Apa102::new(lines.clone(), 8, false).unwrap();
    assert_eq!(lines.released.get(), 0);
    strip.close().unwrap();
    assert_eq!(lines.released.get(), 1);
}
