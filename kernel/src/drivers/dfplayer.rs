// DFPlayer Mini MP3 module over UART (9600 8N1)
//
// Every command and report is a 10 byte frame:
//   7E FF 06 cmd fb p_hi p_lo ck_hi ck_lo EF
// with ck = 0 - (FF + 06 + cmd + fb + p_hi + p_lo). Clips live on the
// module's SD card as /FF/TTT.mp3 and are started with "play folder".
// The module reports a finished track on its own; `pump` drains those
// reports so `is_playing` clears without polling the module.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};

use crate::audio::AudioOut;
use crate::config::{ClipBinding, ClipBindings};
use crate::effect::Clip;

pub const BAUD: u32 = 9600;
pub const MAX_VOLUME: u8 = 30;

const FRAME_LEN: usize = 10;
const START: u8 = 0x7E;
const VERSION: u8 = 0xFF;
const LEN: u8 = 0x06;
const END: u8 = 0xEF;

const CMD_VOLUME: u8 = 0x06;
const CMD_RESET: u8 = 0x0C;
const CMD_PLAY_FOLDER: u8 = 0x0F;

const REPORT_TRACK_DONE: u8 = 0x3D;
const REPORT_ONLINE: u8 = 0x3F;
const REPORT_ERROR: u8 = 0x40;

const ONLINE_TIMEOUT_MS: u32 = 3000;
const ONLINE_POLL_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfPlayerError<E> {
    Uart(E),
    /// No "online" report after reset.
    NotResponding,
}

impl<E: fmt::Debug> fmt::Display for DfPlayerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DfPlayerError::Uart(e) => write!(f, "uart error: {:?}", e),
            DfPlayerError::NotResponding => write!(f, "module not responding"),
        }
    }
}

fn checksum(cmd: u8, feedback: u8, param: u16) -> u16 {
    let [hi, lo] = param.to_be_bytes();
    let sum = VERSION as u16 + LEN as u16 + cmd as u16 + feedback as u16 + hi as u16 + lo as u16;
    0u16.wrapping_sub(sum)
}

pub fn encode(cmd: u8, param: u16) -> [u8; FRAME_LEN] {
    let [hi, lo] = param.to_be_bytes();
    let [ck_hi, ck_lo] = checksum(cmd, 0, param).to_be_bytes();
    [START, VERSION, LEN, cmd, 0x00, hi, lo, ck_hi, ck_lo, END]
}

/// A validated frame from the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub cmd: u8,
    pub param: u16,
}

/// Reassembles frames from an arbitrary split byte stream.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: [u8; FRAME_LEN],
    pos: usize,
}

impl FrameReader {
    pub const fn new() -> Self {
        Self {
            buf: [0; FRAME_LEN],
            pos: 0,
        }
    }

    pub fn push(&mut self, byte: u8) -> Option<Report> {
        if self.pos == 0 && byte != START {
            return None;
        }
        self.buf[self.pos] = byte;
        self.pos += 1;
        if self.pos < FRAME_LEN {
            return None;
        }
        self.pos = 0;

        let b = &self.buf;
        if b[1] != VERSION || b[2] != LEN || b[9] != END {
            log::debug!("dfplayer: malformed frame {:02x?}", b);
            return None;
        }
        let param = u16::from_be_bytes([b[5], b[6]]);
        if checksum(b[3], b[4], param) != u16::from_be_bytes([b[7], b[8]]) {
            log::debug!("dfplayer: bad checksum {:02x?}", b);
            return None;
        }
        Some(Report { cmd: b[3], param })
    }
}

pub struct DfPlayer<U> {
    uart: U,
    clips: ClipBindings,
    volume: u8,
    playing: bool,
    reader: FrameReader,
}

impl<U> DfPlayer<U>
where
    U: Read + Write + ReadReady,
{
    pub fn new(uart: U, clips: ClipBindings, volume: u8) -> Self {
        Self {
            uart,
            clips,
            volume: volume.min(MAX_VOLUME),
            playing: false,
            reader: FrameReader::new(),
        }
    }

    /// Reset the module, wait for it to report online, set the volume.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DfPlayerError<U::Error>> {
        self.send(CMD_RESET, 0)?;

        let mut waited = 0;
        loop {
            if self.drain()? {
                break;
            }
            if waited >= ONLINE_TIMEOUT_MS {
                return Err(DfPlayerError::NotResponding);
            }
            delay.delay_ms(ONLINE_POLL_MS);
            waited += ONLINE_POLL_MS;
        }

        self.set_volume(self.volume)?;
        log::info!("dfplayer: online, volume {}", self.volume);
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: u8) -> Result<(), DfPlayerError<U::Error>> {
        self.volume = volume.min(MAX_VOLUME);
        self.send(CMD_VOLUME, self.volume as u16)
    }

    pub fn play_folder(&mut self, binding: ClipBinding) -> Result<(), DfPlayerError<U::Error>> {
        let param = u16::from_be_bytes([binding.folder, binding.track]);
        self.send(CMD_PLAY_FOLDER, param)?;
        self.playing = true;
        Ok(())
    }

    pub fn release(self) -> U {
        self.uart
    }

    fn send(&mut self, cmd: u8, param: u16) -> Result<(), DfPlayerError<U::Error>> {
        self.uart
            .write_all(&encode(cmd, param))
            .map_err(DfPlayerError::Uart)
    }

    // Returns true if an "online" report went by.
    fn drain(&mut self) -> Result<bool, DfPlayerError<U::Error>> {
        let mut online = false;
        let mut chunk = [0u8; 16];
        while self.uart.read_ready().map_err(DfPlayerError::Uart)? {
            let n = self.uart.read(&mut chunk).map_err(DfPlayerError::Uart)?;
            if n == 0 {
                break;
            }
            for &byte in &chunk[..n] {
                let Some(report) = self.reader.push(byte) else {
                    continue;
                };
                match report.cmd {
                    REPORT_TRACK_DONE => {
                        log::debug!("dfplayer: track {} done", report.param);
                        self.playing = false;
                    }
                    REPORT_ONLINE => online = true,
                    REPORT_ERROR => {
                        log::warn!("dfplayer: module error {}", report.param);
                        self.playing = false;
                    }
                    _ => {}
                }
            }
        }
        Ok(online)
    }
}

impl<U> AudioOut for DfPlayer<U>
where
    U: Read + Write + ReadReady,
{
    type Error = DfPlayerError<U::Error>;

    fn play(&mut self, clip: Clip) -> Result<(), Self::Error> {
        let binding = match clip {
            Clip::Win => self.clips.win,
            Clip::Lose => self.clips.lose,
            Clip::Timeout => self.clips.timeout,
        };
        log::info!(
            "dfplayer: {} -> /{:02}/{:03}.mp3",
            clip,
            binding.folder,
            binding.track
        );
        self.play_folder(binding)
    }

    fn pump(&mut self) -> Result<(), Self::Error> {
        self.drain().map(|_| ())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use core::convert::Infallible;
    use embedded_io::ErrorType;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeUart {
        sent: Vec<u8>,
        incoming: VecDeque<u8>,
    }

    impl ErrorType for FakeUart {
        type Error = Infallible;
    }

    impl Read for FakeUart {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
            let n = buf.len().min(self.incoming.len()).min(3);
            for slot in buf.iter_mut().take(n) {
                *slot = self.incoming.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl ReadReady for FakeUart {
        fn read_ready(&mut self) -> Result<bool, Infallible> {
            Ok(!self.incoming.is_empty())
        }
    }

    impl Write for FakeUart {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn player() -> DfPlayer<FakeUart> {
        DfPlayer::new(FakeUart::default(), GameConfig::default().clips, 22)
    }

    #[test]
    fn play_folder_frame_matches_module_format() {
        // play folder 1 track 2
        assert_eq!(
            encode(CMD_PLAY_FOLDER, 0x0102),
            [0x7E, 0xFF, 0x06, 0x0F, 0x00, 0x01, 0x02, 0xFE, 0xE9, 0xEF]
        );
    }

    #[test]
    fn clips_map_to_configured_tracks() {
        let mut p = player();
        p.play(Clip::Timeout).unwrap();
        assert!(p.is_playing());
        let sent = p.release().sent;
        assert_eq!(sent, encode(CMD_PLAY_FOLDER, 0x0103));
    }

    #[test]
    fn volume_is_capped() {
        let mut p = player();
        p.set_volume(99).unwrap();
        assert_eq!(p.volume(), MAX_VOLUME);
        assert_eq!(p.release().sent, encode(CMD_VOLUME, 30));
    }

    #[test]
    fn track_done_report_clears_playing() {
        let mut p = player();
        p.play(Clip::Win).unwrap();
        p.uart.incoming.extend(encode(REPORT_TRACK_DONE, 1));
        p.pump().unwrap();
        assert!(!p.is_playing());
    }

    #[test]
    fn reader_skips_noise_and_bad_checksums() {
        let mut reader = FrameReader::new();
        let mut good = encode(REPORT_ONLINE, 2);
        let mut bad = good;
        bad[8] ^= 0x01;

        let mut reports = Vec::new();
        for byte in [0x00, 0x13].into_iter().chain(bad).chain(good) {
            reports.extend(reader.push(byte));
        }
        assert_eq!(reports, [Report { cmd: REPORT_ONLINE, param: 2 }]);

        good[3] = REPORT_ERROR;
        let [ck_hi, ck_lo] = checksum(REPORT_ERROR, 0, 2).to_be_bytes();
        good[7] = ck_hi;
        good[8] = ck_lo;
        let last = good.iter().filter_map(|&b| reader.push(b)).last();
        assert_eq!(last, Some(Report { cmd: REPORT_ERROR, param: 2 }));
    }

    #[test]
    fn init_waits_for_online_report() {
        let mut p = player();
        p.uart.incoming.extend(encode(REPORT_ONLINE, 2));
        p.init(&mut NoDelay).unwrap();
        let sent = p.release().sent;
        assert_eq!(&sent[..10], &encode(CMD_RESET, 0));
        assert_eq!(&sent[10..], &encode(CMD_VOLUME, 22));
    }

    #[test]
    fn init_gives_up_without_module() {
        let mut p = player();
        assert_eq!(p.init(&mut NoDelay), Err(DfPlayerError::NotResponding));
    }
}
